//! Error types for the colony simulation.
//!
//! Every variant is recoverable: a rejected command leaves the colony
//! exactly as it was before the call.

use thiserror::Error;

use crate::buildings::BuildingType;
use crate::engine::GameOutcome;
use crate::resources::ResourceKind;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all colony simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Malformed command input or rule value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The ledger cannot cover a cost.
    #[error("Insufficient resources: need {required} {resource:?}, have {available}")]
    InsufficientResources {
        /// First resource that fell short.
        resource: ResourceKind,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Reference to a survivor, tile or building that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Construction already completed or under way.
    #[error("Building already exists or is under construction: {0:?}")]
    AlreadyExists(BuildingType),

    /// The game has reached a terminal outcome and accepts no more commands.
    #[error("Game is over: {0:?}")]
    GameOver(GameOutcome),

    /// Rules file parsing error.
    #[error("Failed to parse rules '{path}': {message}")]
    RulesParse {
        /// Path (or source label) that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Rules file could not be read.
    #[error("Failed to read rules file: {0}")]
    Io(#[from] std::io::Error),
}
