//! Command facade over one playthrough.
//!
//! A [`Session`] owns the colony, the world, the turn engine and the seeded
//! random source. Presenters and scripted planners drive the game only
//! through [`Session::execute`] and [`Session::advance_day`]; there is no
//! back door that mutates the colony directly, which keeps every run
//! replayable from its seed and command stream.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingType;
use crate::colony::Colony;
use crate::engine::{DaySummary, GameOutcome, TurnEngine};
use crate::error::Result;
use crate::rules::RuleSet;
use crate::survivor::{SurvivorId, Task};
use crate::world::{Biome, Location, World, WorldConfig};

/// A player instruction issued between days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Give a survivor a new task.
    AssignTask {
        /// Target survivor.
        survivor: SurvivorId,
        /// New assignment.
        task: Task,
    },
    /// Pay for and start a building.
    StartBuilding {
        /// Type to build.
        building: BuildingType,
    },
    /// Send scavengers to another explored tile.
    SetScavengeSite {
        /// Target tile.
        location: Location,
    },
    /// Survey an unexplored tile.
    Explore {
        /// Target tile.
        location: Location,
    },
}

/// One playthrough.
#[derive(Debug, Clone)]
pub struct Session {
    engine: TurnEngine,
    colony: Colony,
    world: World,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Session {
    /// Start a new game: generate the world, found the colony at the crash
    /// site and seed the random source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GameError::InvalidArgument`] if the rules
    /// fail validation.
    pub fn new(rules: RuleSet, world_config: WorldConfig, seed: u64) -> Result<Self> {
        rules.validate()?;
        let world = World::generate(world_config);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let engine = TurnEngine::new(rules);
        let colony = engine.found_colony(world.crash_site(), &mut rng);

        tracing::info!(
            seed,
            survivors = colony.population(),
            "New colony founded"
        );

        Ok(Self {
            engine,
            colony,
            world,
            rng,
            seed,
        })
    }

    /// Resume from an explicit colony and world, e.g. a test scenario.
    #[must_use]
    pub fn from_parts(rules: RuleSet, colony: Colony, world: World, seed: u64) -> Self {
        Self {
            engine: TurnEngine::new(rules),
            colony,
            world,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed the random source was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The next day to be played.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.engine.day()
    }

    /// Current state of the game.
    #[must_use]
    pub const fn outcome(&self) -> GameOutcome {
        self.engine.outcome()
    }

    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.engine.outcome().is_terminal()
    }

    /// The rules in force.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        self.engine.rules()
    }

    /// Read-only colony view.
    #[must_use]
    pub const fn colony(&self) -> &Colony {
        &self.colony
    }

    /// Read-only world view.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Give a survivor a new task.
    ///
    /// # Errors
    ///
    /// `GameOver` after a terminal outcome, `NotFound` for an unknown
    /// survivor.
    pub fn assign_task(&mut self, survivor: SurvivorId, task: Task) -> Result<()> {
        self.engine.assign_task(&mut self.colony, survivor, task)
    }

    /// Pay for and start a building.
    ///
    /// # Errors
    ///
    /// `GameOver`, `AlreadyExists`, `NotFound` or `InsufficientResources`;
    /// the colony is unchanged on error.
    pub fn start_building(&mut self, building: BuildingType) -> Result<()> {
        self.engine.start_building(&mut self.colony, building)
    }

    /// Send scavengers to another tile.
    ///
    /// # Errors
    ///
    /// `GameOver`, `NotFound` if the location is outside the world, or
    /// `InvalidArgument` if it has not been explored.
    pub fn set_scavenge_site(&mut self, location: Location) -> Result<()> {
        self.engine
            .set_scavenge_site(&mut self.colony, &self.world, location)
    }

    /// Survey a tile and reveal its biome.
    ///
    /// # Errors
    ///
    /// `GameOver`, `NotFound` if the location is outside the world, or
    /// `InvalidArgument` if it is already explored.
    pub fn explore(&mut self, location: Location) -> Result<Biome> {
        self.engine.explore(&mut self.world, location)
    }

    /// Apply a single command.
    ///
    /// # Errors
    ///
    /// As the matching command method.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::AssignTask { survivor, task } => self.assign_task(survivor, task),
            Command::StartBuilding { building } => self.start_building(building),
            Command::SetScavengeSite { location } => self.set_scavenge_site(location),
            Command::Explore { location } => self.explore(location).map(|_| ()),
        }
    }

    /// Play one day.
    ///
    /// # Errors
    ///
    /// `GameOver` if the game already ended.
    pub fn advance_day(&mut self) -> Result<DaySummary> {
        self.engine
            .advance_day(&mut self.colony, &mut self.world, &mut self.rng)
    }

    /// Hash of the whole game state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.engine.day().hash(&mut hasher);
        self.engine.outcome().hash(&mut hasher);
        self.colony.state_hash().hash(&mut hasher);
        self.world.hash(&mut hasher);
        hasher.finish()
    }
}
