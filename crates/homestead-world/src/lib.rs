//! # Homestead World
//!
//! Infinite world management for Homestead.
//!
//! This crate handles:
//! - Region generation (farm grid, ponds and lakes) and the region cache
//! - Procedural chunk generation
//! - Chunk streaming around an observer with an LRU and distance budget
//! - Farmer NPC spawn, dormancy and restore
//!
//! Nothing is persisted: every tile is a pure function of the world seed,
//! so an evicted chunk is simply regenerated. NPC poses are the one piece of
//! mutable state, carried across evictions by the NPC manager and across
//! sessions by [`NpcSnapshot`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod config;
pub mod generation;
pub mod noise;
pub mod npc;
pub mod region;
pub mod registry;
pub mod streaming;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk::*;
    pub use crate::config::*;
    pub use crate::generation::*;
    pub use crate::noise::*;
    pub use crate::npc::*;
    pub use crate::region::*;
    pub use crate::registry::*;
    pub use crate::streaming::*;
}

pub use prelude::*;
