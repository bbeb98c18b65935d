//! The colony aggregate: ledger, roster and buildings.
//!
//! A colony is the only unit of mutation in a day. It enforces the
//! building invariants itself:
//! - at most one building per type
//! - at most one building under construction at any time
//! - construction costs are paid in full or not at all

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingCatalog, BuildingType};
use crate::error::{GameError, Result};
use crate::resources::ResourceLedger;
use crate::survivor::{Skill, Survivor, SurvivorId, Task, STATUS_MAX};
use crate::world::Location;

/// Resources, survivors and buildings for one playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colony {
    resources: ResourceLedger,
    survivors: Vec<Survivor>,
    buildings: Vec<Building>,
    next_survivor_id: u32,
    scavenge_site: Location,
}

impl Colony {
    /// Create a colony with no survivors or buildings.
    #[must_use]
    pub fn new(resources: ResourceLedger, scavenge_site: Location) -> Self {
        Self {
            resources,
            survivors: Vec::new(),
            buildings: Vec::new(),
            next_survivor_id: 1,
            scavenge_site,
        }
    }

    /// Read-only view of the ledger.
    #[must_use]
    pub const fn resources(&self) -> &ResourceLedger {
        &self.resources
    }

    /// Mutable ledger access.
    pub fn resources_mut(&mut self) -> &mut ResourceLedger {
        &mut self.resources
    }

    /// Add a survivor at full health and return their new id.
    pub fn add_survivor(&mut self, name: impl Into<String>, skill: Skill, morale: i32) -> SurvivorId {
        let id = SurvivorId::new(self.next_survivor_id);
        self.next_survivor_id += 1;
        self.survivors.push(Survivor::new(id, name, skill, morale));
        id
    }

    /// Roster in display order.
    #[must_use]
    pub fn survivors(&self) -> &[Survivor] {
        &self.survivors
    }

    /// Mutable roster access for phase processing.
    pub(crate) fn survivors_mut(&mut self) -> &mut [Survivor] {
        &mut self.survivors
    }

    /// Number of living survivors.
    #[must_use]
    pub fn population(&self) -> usize {
        self.survivors.len()
    }

    /// Look up a survivor by id.
    #[must_use]
    pub fn survivor(&self, id: SurvivorId) -> Option<&Survivor> {
        self.survivors.iter().find(|s| s.id() == id)
    }

    /// Mutable survivor lookup.
    pub fn survivor_mut(&mut self, id: SurvivorId) -> Option<&mut Survivor> {
        self.survivors.iter_mut().find(|s| s.id() == id)
    }

    /// Assign a task to a living survivor.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] if no survivor in the roster has `id`.
    pub fn assign_task(&mut self, id: SurvivorId, task: Task) -> Result<()> {
        let survivor = self
            .survivor_mut(id)
            .ok_or_else(|| GameError::NotFound(format!("survivor {id}")))?;
        survivor.task = task;
        Ok(())
    }

    /// All buildings, complete or not.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// The building of a given type, if one exists.
    #[must_use]
    pub fn building(&self, building_type: BuildingType) -> Option<&Building> {
        self.buildings
            .iter()
            .find(|b| b.building_type() == building_type)
    }

    /// Whether a completed building of `building_type` exists.
    #[must_use]
    pub fn has_completed_building(&self, building_type: BuildingType) -> bool {
        self.building(building_type).is_some_and(Building::is_complete)
    }

    /// The single building under construction, if any.
    #[must_use]
    pub fn in_progress_building(&self) -> Option<&Building> {
        self.buildings.iter().find(|b| !b.is_complete())
    }

    /// Mutable access to the building under construction.
    pub fn in_progress_building_mut(&mut self) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| !b.is_complete())
    }

    /// Completed buildings in construction order.
    pub fn completed_buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter().filter(|b| b.is_complete())
    }

    /// Pay for and start construction of `building_type`.
    ///
    /// # Errors
    ///
    /// - [`GameError::AlreadyExists`] if that type is complete or under
    ///   construction, or if another building is under construction (the
    ///   error then names the in-progress type)
    /// - [`GameError::NotFound`] if the catalog has no blueprint for the type
    /// - [`GameError::InsufficientResources`] if the cost cannot be paid
    ///
    /// On any error nothing is deducted and no building is created.
    pub fn start_building(
        &mut self,
        building_type: BuildingType,
        catalog: &BuildingCatalog,
    ) -> Result<()> {
        self.check_can_add(building_type)?;
        let blueprint = catalog
            .get(building_type)
            .ok_or_else(|| GameError::NotFound(format!("blueprint for {building_type}")))?;

        self.resources.spend(&blueprint.cost)?;
        self.buildings
            .push(Building::new(building_type, blueprint.required_progress));

        tracing::debug!(building = ?building_type, "Construction started");
        Ok(())
    }

    /// Insert a building without paying for it, e.g. when setting up a
    /// scenario.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyExists`] under the same rules as
    /// [`Colony::start_building`]. A completed building may always be
    /// inserted alongside an in-progress one.
    pub fn insert_building(&mut self, building: Building) -> Result<()> {
        let building_type = building.building_type();
        if self.building(building_type).is_some() {
            return Err(GameError::AlreadyExists(building_type));
        }
        if !building.is_complete() {
            if let Some(current) = self.in_progress_building() {
                return Err(GameError::AlreadyExists(current.building_type()));
            }
        }
        self.buildings.push(building);
        Ok(())
    }

    fn check_can_add(&self, building_type: BuildingType) -> Result<()> {
        if self.building(building_type).is_some() {
            return Err(GameError::AlreadyExists(building_type));
        }
        if let Some(current) = self.in_progress_building() {
            return Err(GameError::AlreadyExists(current.building_type()));
        }
        Ok(())
    }

    /// Remove every survivor with health at or below zero.
    ///
    /// Returns the removed survivors; their count is the day's death toll.
    pub fn remove_dead(&mut self) -> Vec<Survivor> {
        let (dead, living): (Vec<_>, Vec<_>) =
            self.survivors.drain(..).partition(Survivor::is_dead);
        self.survivors = living;
        dead
    }

    /// Where scavengers gather.
    #[must_use]
    pub const fn scavenge_site(&self) -> Location {
        self.scavenge_site
    }

    /// Change where scavengers gather. Bounds are checked by the caller,
    /// which owns the world.
    pub fn set_scavenge_site(&mut self, location: Location) {
        self.scavenge_site = location;
    }

    /// Compute a hash of the colony state for determinism checks.
    ///
    /// Two colonies with equal state always produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.resources.hash(&mut hasher);
        self.survivors.len().hash(&mut hasher);
        for survivor in &self.survivors {
            survivor.hash(&mut hasher);
        }
        self.buildings.len().hash(&mut hasher);
        for building in &self.buildings {
            building.hash(&mut hasher);
        }
        self.next_survivor_id.hash(&mut hasher);
        self.scavenge_site.hash(&mut hasher);
        hasher.finish()
    }

    /// Check every structural invariant of the colony.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for s in &self.survivors {
            if !(0..=STATUS_MAX).contains(&s.health()) || !(0..=STATUS_MAX).contains(&s.morale()) {
                return Err(format!(
                    "survivor {} out of range: health {}, morale {}",
                    s.id(),
                    s.health(),
                    s.morale()
                ));
            }
        }
        for (i, b) in self.buildings.iter().enumerate() {
            if self.buildings[..i]
                .iter()
                .any(|other| other.building_type() == b.building_type())
            {
                return Err(format!("duplicate building {}", b.building_type()));
            }
            if b.progress() > b.required_progress() {
                return Err(format!(
                    "{} progress {} exceeds {}",
                    b.building_type(),
                    b.progress(),
                    b.required_progress()
                ));
            }
        }
        let in_progress = self.buildings.iter().filter(|b| !b.is_complete()).count();
        if in_progress > 1 {
            return Err(format!("{in_progress} buildings under construction"));
        }
        Ok(())
    }
}
