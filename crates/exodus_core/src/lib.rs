//! # Exodus Core
//!
//! Turn-based survival simulation for a colony ship that crash-landed on an
//! alien world.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No terminal or file IO beyond loading rule files
//! - No system randomness (every random draw goes through an injected RNG)
//!
//! This separation enables:
//! - Text, JSON or any other presenter on top of the same engine
//! - Batch balance runs
//! - Replays from a seed and a command stream
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`resources`] - Resource kinds and the colony ledger
//! - [`survivor`] - Colonists, skills and tasks
//! - [`buildings`] - Building types, blueprints and construction progress
//! - [`colony`] - The colony aggregate and its invariants
//! - [`world`] - Tile grid with finite scavenging stock
//! - [`events`] - Random daily events
//! - [`rules`] - Tunable numbers, loadable from RON
//! - [`engine`] - The day loop and end conditions
//! - [`session`] - Command facade over one playthrough

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buildings;
pub mod colony;
pub mod engine;
pub mod error;
pub mod events;
pub mod resources;
pub mod rules;
pub mod session;
pub mod survivor;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{Building, BuildingBlueprint, BuildingCatalog, BuildingType};
    pub use crate::colony::Colony;
    pub use crate::engine::{DaySummary, GameOutcome, TurnEngine};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{EventEffect, EventEntry, EventTable};
    pub use crate::resources::{ResourceBundle, ResourceKind, ResourceLedger};
    pub use crate::rules::{RuleSet, VictoryRule};
    pub use crate::session::{Command, Session};
    pub use crate::survivor::{Skill, Survivor, SurvivorId, Task};
    pub use crate::world::{Biome, Location, Tile, TileStock, World, WorldConfig};
}
