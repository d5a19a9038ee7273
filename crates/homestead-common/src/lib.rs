//! # Homestead Common
//!
//! Common types, utilities, and shared abstractions for Homestead.
//!
//! This crate provides the leaves every other crate builds on:
//! - Coordinate types (world, chunk, region, local) with floor semantics
//! - The tile palette
//! - Seed derivation and the seeded generator
//! - Structured ids (FarmId, NpcId)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod seed;
pub mod tile;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::seed::*;
    pub use crate::tile::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coords_conversion() {
        let world = WorldCoord::new(100, 200);
        assert_eq!(world.to_chunk(), ChunkCoord::new(3, 6));
        assert_eq!(world.to_local(), LocalCoord::new(4, 8));
    }

    #[test]
    fn test_id_display() {
        let farm = FarmId::new(RegionCoord::new(-1, 2), 3);
        assert_eq!(farm.to_string(), "farm_-1_2_3");
        assert_eq!(NpcId::new(farm, 1).to_string(), "farm_-1_2_3#1");
    }

    #[test]
    fn test_npc_ids_order_by_farm_then_index() {
        let farm = FarmId::new(RegionCoord::new(0, 0), 0);
        let other = FarmId::new(RegionCoord::new(0, 0), 1);
        assert!(NpcId::new(farm, 5) < NpcId::new(other, 0));
        assert!(NpcId::new(farm, 0) < NpcId::new(farm, 1));
    }

    #[test]
    fn test_config_error_message() {
        let err = HomesteadError::from(ConfigError::UnloadRadiusTooSmall { load: 3, unload: 2 });
        assert_eq!(
            err.to_string(),
            "Config error: unload radius 2 is smaller than load radius 3"
        );
    }
}
