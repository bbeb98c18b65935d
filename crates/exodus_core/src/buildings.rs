//! Building catalog and construction progress.
//!
//! Costs and construction effort live in a single catalog keyed by
//! [`BuildingType`]. A building is created only once its full cost has been
//! paid, advances only through the Build task, and is frozen on completion.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resources::{ResourceBundle, ResourceKind};

/// Every structure the colony can raise. Closed catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BuildingType {
    /// Basic housing.
    Shelter,
    /// Passive food production; enables the Farm task.
    Farm,
    /// Passive water production.
    WaterPurifier,
    /// Extra recovery for resting survivors.
    Infirmary,
    /// Fabrication space.
    Workshop,
}

impl BuildingType {
    /// All building types in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Shelter,
        Self::Farm,
        Self::WaterPurifier,
        Self::Infirmary,
        Self::Workshop,
    ];

    /// Display label used in day log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shelter => "Shelter",
            Self::Farm => "Farm",
            Self::WaterPurifier => "Water Purifier",
            Self::Infirmary => "Infirmary",
            Self::Workshop => "Workshop",
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed properties of a building type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingBlueprint {
    /// Construction effort needed to complete.
    pub required_progress: u32,
    /// Resources paid up front when construction starts.
    pub cost: ResourceBundle,
}

impl BuildingBlueprint {
    /// Create a blueprint.
    #[must_use]
    pub fn new(required_progress: u32, cost: &[(ResourceKind, u32)]) -> Self {
        Self {
            required_progress,
            cost: cost.iter().copied().collect(),
        }
    }
}

/// Blueprints keyed by building type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingCatalog {
    blueprints: BTreeMap<BuildingType, BuildingBlueprint>,
}

impl BuildingCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            blueprints: BTreeMap::new(),
        }
    }

    /// Register or replace a blueprint.
    pub fn insert(&mut self, building_type: BuildingType, blueprint: BuildingBlueprint) {
        self.blueprints.insert(building_type, blueprint);
    }

    /// Look up a blueprint.
    #[must_use]
    pub fn get(&self, building_type: BuildingType) -> Option<&BuildingBlueprint> {
        self.blueprints.get(&building_type)
    }

    /// Iterate over all blueprints.
    pub fn iter(&self) -> impl Iterator<Item = (BuildingType, &BuildingBlueprint)> {
        self.blueprints.iter().map(|(&ty, bp)| (ty, bp))
    }

    /// Number of blueprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    /// Whether the catalog has no blueprints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        use ResourceKind::{BuildingMaterials, Energy, Medicine, Water};

        let mut catalog = Self::empty();
        catalog.insert(
            BuildingType::Shelter,
            BuildingBlueprint::new(20, &[(BuildingMaterials, 15)]),
        );
        catalog.insert(
            BuildingType::Farm,
            BuildingBlueprint::new(30, &[(BuildingMaterials, 25), (Water, 10)]),
        );
        catalog.insert(
            BuildingType::WaterPurifier,
            BuildingBlueprint::new(25, &[(BuildingMaterials, 20)]),
        );
        catalog.insert(
            BuildingType::Infirmary,
            BuildingBlueprint::new(40, &[(BuildingMaterials, 30), (Medicine, 10)]),
        );
        catalog.insert(
            BuildingType::Workshop,
            BuildingBlueprint::new(50, &[(BuildingMaterials, 40), (Energy, 5)]),
        );
        catalog
    }
}

/// A construction project, complete or not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    building_type: BuildingType,
    progress: u32,
    required_progress: u32,
}

impl Building {
    /// Create a building with no progress.
    ///
    /// A zero requirement is raised to one so a fresh building is never
    /// complete before any work is applied.
    #[must_use]
    pub fn new(building_type: BuildingType, required_progress: u32) -> Self {
        Self {
            building_type,
            progress: 0,
            required_progress: required_progress.max(1),
        }
    }

    /// Create an already completed building.
    #[must_use]
    pub fn completed(building_type: BuildingType, required_progress: u32) -> Self {
        let mut building = Self::new(building_type, required_progress);
        building.progress = building.required_progress;
        building
    }

    /// The type of this building.
    #[must_use]
    pub const fn building_type(&self) -> BuildingType {
        self.building_type
    }

    /// Work applied so far.
    #[must_use]
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    /// Work needed to complete.
    #[must_use]
    pub const fn required_progress(&self) -> u32 {
        self.required_progress
    }

    /// Check if construction is complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.progress >= self.required_progress
    }

    /// Get construction progress as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.required_progress == 0 {
            return 100;
        }
        let pct = u64::from(self.progress) * 100 / u64::from(self.required_progress);
        u32::try_from(pct).unwrap_or(100)
    }

    /// Apply `amount` of construction work, clamped at the requirement.
    ///
    /// Returns `true` if this call completed the building. Has no effect on
    /// a building that is already complete.
    pub fn add_progress(&mut self, amount: u32) -> bool {
        if self.is_complete() {
            return false;
        }
        self.progress = self
            .progress
            .saturating_add(amount)
            .min(self.required_progress);
        self.is_complete()
    }
}
