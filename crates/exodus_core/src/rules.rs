//! Tunable rule set.
//!
//! Every number the turn engine uses lives here, so the canonical rules are
//! a single `Default` and alternatives can be loaded from RON. Fields left
//! out of a RON file keep their canonical value.
//!
//! # Example RON
//!
//! ```ron
//! RuleSet(
//!     event_chance: 0.25,
//!     victory: SurviveDays(60),
//!     starting_resources: {Food: 30, Water: 30, BuildingMaterials: 15},
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingCatalog, BuildingType};
use crate::error::{GameError, Result};
use crate::events::EventTable;
use crate::resources::{ResourceBundle, ResourceKind};
use crate::survivor::{Skill, SurvivorTemplate, STATUS_MAX};

/// Lowest morale a survivor may start with.
pub const STARTING_MORALE_FLOOR: i32 = 60;

/// How the game is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryRule {
    /// Every catalog building complete and Food and Water each strictly
    /// above their thresholds.
    SelfSufficient {
        /// Food reserve that must be exceeded.
        food: u32,
        /// Water reserve that must be exceeded.
        water: u32,
    },
    /// Reach the given day with anyone still alive.
    SurviveDays(u32),
}

impl Default for VictoryRule {
    fn default() -> Self {
        Self::SelfSufficient {
            food: 100,
            water: 100,
        }
    }
}

/// Passive output of a completed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionYield {
    /// Resource produced.
    pub resource: ResourceKind,
    /// Amount produced per day.
    pub amount: u32,
}

/// Inclusive starting morale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoraleRange {
    /// Lowest starting morale.
    pub min: i32,
    /// Highest starting morale.
    pub max: i32,
}

/// The full rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Ledger at day one.
    pub starting_resources: ResourceBundle,
    /// Survivors at day one, in roster order.
    pub starting_roster: Vec<SurvivorTemplate>,
    /// Starting morale is rolled uniformly from this range.
    pub starting_morale: MoraleRange,
    /// Base yield of Scavenge, Build and Farm.
    pub task_base_yield: u32,
    /// Extra yield when the survivor's skill matches the task.
    pub skill_bonus: u32,
    /// Health and morale restored by a day of rest.
    pub rest_recovery: i32,
    /// Extra health for resting survivors while an Infirmary stands.
    pub infirmary_rest_bonus: i32,
    /// Daily output of completed production buildings.
    pub production: BTreeMap<BuildingType, ProductionYield>,
    /// Food and Water each consumed per survivor per day.
    pub consumption_per_survivor: u32,
    /// Health lost by every survivor for each resource that runs short.
    pub shortage_health_penalty: i32,
    /// Morale lost by every survivor for each resource that runs short.
    pub shortage_morale_penalty: i32,
    /// Morale lost by the living on a day with deaths.
    pub grief_morale_penalty: i32,
    /// Probability of one event per day.
    pub event_chance: f64,
    /// Win predicate.
    pub victory: VictoryRule,
    /// Building blueprints.
    pub buildings: BuildingCatalog,
    /// Daily event catalog.
    pub events: EventTable,
}

impl Default for RuleSet {
    fn default() -> Self {
        let mut production = BTreeMap::new();
        production.insert(
            BuildingType::Farm,
            ProductionYield {
                resource: ResourceKind::Food,
                amount: 5,
            },
        );
        production.insert(
            BuildingType::WaterPurifier,
            ProductionYield {
                resource: ResourceKind::Water,
                amount: 5,
            },
        );

        Self {
            starting_resources: [
                (ResourceKind::Food, 50),
                (ResourceKind::Water, 50),
                (ResourceKind::BuildingMaterials, 20),
            ]
            .into_iter()
            .collect(),
            starting_roster: vec![
                SurvivorTemplate::new("Commander Elena", Skill::None),
                SurvivorTemplate::new("Dr. Aris", Skill::Medicine),
                SurvivorTemplate::new("Jax", Skill::Engineering),
                SurvivorTemplate::new("Kara", Skill::Scavenging),
                SurvivorTemplate::new("Leo", Skill::Farming),
            ],
            starting_morale: MoraleRange { min: 60, max: 100 },
            task_base_yield: 5,
            skill_bonus: 3,
            rest_recovery: 10,
            infirmary_rest_bonus: 5,
            production,
            consumption_per_survivor: 1,
            shortage_health_penalty: 10,
            shortage_morale_penalty: 5,
            grief_morale_penalty: 20,
            event_chance: 0.30,
            victory: VictoryRule::default(),
            buildings: BuildingCatalog::default(),
            events: EventTable::default(),
        }
    }
}

impl RuleSet {
    /// Parse a rule set from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::RulesParse`] if the text is not valid RON for
    /// this schema, or [`GameError::InvalidArgument`] if it fails
    /// [`RuleSet::validate`].
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    /// Load a rule set from a RON file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Io`] if the file cannot be read, otherwise as
    /// [`RuleSet::from_ron_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, label: &str) -> Result<Self> {
        let rules: Self = ron::from_str(text).map_err(|e| GameError::RulesParse {
            path: label.to_string(),
            message: e.to_string(),
        })?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check the rule set for values the engine cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(GameError::InvalidArgument(msg));

        if self.starting_roster.is_empty() {
            return invalid("starting roster is empty".to_string());
        }
        let MoraleRange { min, max } = self.starting_morale;
        if min > max || min < STARTING_MORALE_FLOOR || max > STATUS_MAX {
            return invalid(format!(
                "starting morale range {min}..={max} is not within {STARTING_MORALE_FLOOR}..={STATUS_MAX}"
            ));
        }
        if !(0.0..=1.0).contains(&self.event_chance) {
            return invalid(format!("event chance {} is not within 0..=1", self.event_chance));
        }
        for building_type in BuildingType::ALL {
            match self.buildings.get(building_type) {
                None => return invalid(format!("no blueprint for {building_type}")),
                Some(blueprint) if blueprint.required_progress == 0 => {
                    return invalid(format!("{building_type} requires zero progress"));
                }
                Some(_) => {}
            }
        }
        if self.rest_recovery < 0
            || self.infirmary_rest_bonus < 0
            || self.shortage_health_penalty < 0
            || self.shortage_morale_penalty < 0
            || self.grief_morale_penalty < 0
        {
            return invalid("recovery and penalty amounts must be non-negative".to_string());
        }
        if let VictoryRule::SurviveDays(0) = self.victory {
            return invalid("survival target must be at least one day".to_string());
        }
        Ok(())
    }

    /// Yield of a task for a survivor with or without the matching skill.
    #[must_use]
    pub const fn task_yield(&self, skilled: bool) -> u32 {
        if skilled {
            self.task_base_yield.saturating_add(self.skill_bonus)
        } else {
            self.task_base_yield
        }
    }
}
