//! Error types for Homestead.

use thiserror::Error;

use crate::ids::NpcId;

/// Top-level error type for Homestead operations.
#[derive(Debug, Error)]
pub enum HomesteadError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// World/NPC errors
    #[error("World error: {0}")]
    World(#[from] WorldError),
}

/// Streaming configuration errors, raised when a chunk manager is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Unload radius must not be smaller than load radius
    #[error("unload radius {unload} is smaller than load radius {load}")]
    UnloadRadiusTooSmall {
        /// Configured load radius
        load: u32,
        /// Configured unload radius
        unload: u32,
    },

    /// Chunk budget must be positive
    #[error("max loaded chunks must be greater than zero")]
    ZeroChunkBudget,

    /// Chunk budget cannot hold the square the observer needs
    #[error("max loaded chunks {max} cannot hold the {required} chunks inside the load radius")]
    BudgetBelowLoadArea {
        /// Configured budget
        max: usize,
        /// Chunks inside the load radius
        required: usize,
    },

    /// Config text could not be parsed
    #[error("invalid config: {0}")]
    Parse(String),
}

/// World and NPC bookkeeping errors.
#[derive(Debug, Error)]
pub enum WorldError {
    /// An NPC identity is both active and dormant
    #[error("NPC {0} is both active and dormant")]
    NpcDuplicated(NpcId),

    /// A chunk lists an NPC that is not active
    #[error("NPC {0} is attached to a chunk but not active")]
    NpcOrphaned(NpcId),

    /// NPC snapshot could not be encoded or decoded
    #[error("NPC snapshot error: {0}")]
    Snapshot(String),
}

/// Result type alias for Homestead operations.
pub type HomesteadResult<T> = Result<T, HomesteadError>;
