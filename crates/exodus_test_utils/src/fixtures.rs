//! Test fixtures and helpers.
//!
//! Pre-built colonies, worlds and rule sets for consistent testing.

use exodus_core::buildings::{Building, BuildingCatalog, BuildingType};
use exodus_core::colony::Colony;
use exodus_core::events::{EventEffect, EventEntry, EventTable};
use exodus_core::resources::{ResourceKind, ResourceLedger};
use exodus_core::rules::RuleSet;
use exodus_core::session::Session;
use exodus_core::survivor::{Skill, SurvivorId};
use exodus_core::world::{Biome, Location, Tile, World, WorldConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded random source matching the one sessions use.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Canonical rules with random events switched off.
#[must_use]
pub fn quiet_rules() -> RuleSet {
    RuleSet {
        event_chance: 0.0,
        ..RuleSet::default()
    }
}

/// Rules where the given effect fires every day.
#[must_use]
pub fn rules_with_certain_event(description: &str, effect: EventEffect) -> RuleSet {
    RuleSet {
        event_chance: 1.0,
        events: EventTable::new(vec![EventEntry::new(description, effect)]),
        ..RuleSet::default()
    }
}

/// A 1x1 world whose only tile is also the crash site.
#[must_use]
pub fn single_tile_world(biome: Biome, stock: &[(ResourceKind, u32)]) -> World {
    let mut ledger = ResourceLedger::new();
    for &(kind, amount) in stock {
        ledger.credit(kind, amount);
    }
    World::from_tiles(1, 1, vec![Tile::new(biome, ledger)], Location::new(0, 0))
        .unwrap_or_else(|| unreachable!("1x1 world with in-bounds crash site"))
}

/// The default generated world for a seed.
#[must_use]
pub fn generated_world(seed: u64) -> World {
    World::generate(WorldConfig::default().with_seed(seed))
}

/// A fresh canonical session.
///
/// # Panics
///
/// Panics if the default rules fail validation.
#[must_use]
pub fn default_session(seed: u64) -> Session {
    Session::new(RuleSet::default(), WorldConfig::default().with_seed(seed), seed)
        .expect("default rules are valid")
}

/// Builder for hand-made colonies.
///
/// # Example
///
/// ```
/// use exodus_core::prelude::*;
/// use exodus_test_utils::fixtures::ColonyBuilder;
///
/// let colony = ColonyBuilder::new()
///     .resource(ResourceKind::Food, 10)
///     .survivor("Kara", Skill::Scavenging)
///     .completed(BuildingType::Farm)
///     .build();
/// assert_eq!(colony.population(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ColonyBuilder {
    resources: ResourceLedger,
    survivors: Vec<PendingSurvivor>,
    buildings: Vec<Building>,
    site: Location,
    catalog: BuildingCatalog,
}

#[derive(Debug, Clone)]
struct PendingSurvivor {
    name: String,
    skill: Skill,
    health: i32,
    morale: i32,
}

impl Default for ColonyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColonyBuilder {
    /// Empty colony at `(0, 0)` with the canonical catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: ResourceLedger::new(),
            survivors: Vec::new(),
            buildings: Vec::new(),
            site: Location::new(0, 0),
            catalog: BuildingCatalog::default(),
        }
    }

    /// Add stock to the ledger.
    #[must_use]
    pub fn resource(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.resources.credit(kind, amount);
        self
    }

    /// Add a healthy survivor with morale 80.
    #[must_use]
    pub fn survivor(self, name: &str, skill: Skill) -> Self {
        self.survivor_with(name, skill, 100, 80)
    }

    /// Add a survivor with explicit health and morale.
    #[must_use]
    pub fn survivor_with(mut self, name: &str, skill: Skill, health: i32, morale: i32) -> Self {
        self.survivors.push(PendingSurvivor {
            name: name.to_string(),
            skill,
            health,
            morale,
        });
        self
    }

    /// Add a completed building.
    #[must_use]
    pub fn completed(mut self, building_type: BuildingType) -> Self {
        let required = self.required(building_type);
        self.buildings
            .push(Building::completed(building_type, required));
        self
    }

    /// Add a building under construction with some progress already made.
    #[must_use]
    pub fn in_progress(mut self, building_type: BuildingType, progress: u32) -> Self {
        let mut building = Building::new(building_type, self.required(building_type));
        building.add_progress(progress);
        self.buildings.push(building);
        self
    }

    /// Set the scavenge site.
    #[must_use]
    pub const fn site(mut self, site: Location) -> Self {
        self.site = site;
        self
    }

    fn required(&self, building_type: BuildingType) -> u32 {
        self.catalog
            .get(building_type)
            .map_or(1, |bp| bp.required_progress)
    }

    /// Build the colony.
    ///
    /// # Panics
    ///
    /// Panics if the buildings break the one-per-type or
    /// one-in-progress rules.
    #[must_use]
    pub fn build(self) -> Colony {
        let mut colony = Colony::new(self.resources, self.site);
        for pending in self.survivors {
            let id = colony.add_survivor(pending.name, pending.skill, pending.morale);
            if let Some(survivor) = colony.survivor_mut(id) {
                survivor.set_health(pending.health);
            }
        }
        for building in self.buildings {
            colony
                .insert_building(building)
                .expect("fixture buildings must respect colony invariants");
        }
        colony
    }
}

/// Ids of every survivor in roster order.
#[must_use]
pub fn roster_ids(colony: &Colony) -> Vec<SurvivorId> {
    colony.survivors().iter().map(|s| s.id()).collect()
}
