//! Structured identifiers for farms and NPCs.
//!
//! Both are pure functions of where a thing was generated, so the same id
//! names the same farm or farmer after any number of regenerations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::RegionCoord;

/// Identifies a farm by its region and its index within that region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FarmId {
    /// Region the farm was generated in
    pub region: RegionCoord,
    /// Placement order within the region
    pub index: u32,
}

impl FarmId {
    /// Creates a farm id.
    #[must_use]
    pub const fn new(region: RegionCoord, index: u32) -> Self {
        Self { region, index }
    }
}

impl fmt::Display for FarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "farm_{}_{}_{}", self.region.x, self.region.y, self.index)
    }
}

/// Identifies a farmer NPC: home farm plus generation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId {
    /// Farm the NPC belongs to
    pub farm: FarmId,
    /// Generation order among the farm's NPCs
    pub index: u32,
}

impl NpcId {
    /// Creates an NPC id.
    #[must_use]
    pub const fn new(farm: FarmId, index: u32) -> Self {
        Self { farm, index }
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.farm, self.index)
    }
}
