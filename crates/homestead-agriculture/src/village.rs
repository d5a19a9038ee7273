//! Village site selection and shared facilities.

use homestead_common::SeededRng;

use crate::biome::FarmZone;

/// Shared buildings a village may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VillageFacilities {
    /// Grain mill (80%)
    pub mill: bool,
    /// Market square (60%)
    pub market: bool,
    /// Communal storage (always)
    pub storage: bool,
    /// Workshop (40%)
    pub workshop: bool,
    /// Well (always)
    pub well: bool,
}

impl VillageFacilities {
    /// Rolls the facilities for one village.
    pub fn roll(rng: &mut SeededRng) -> Self {
        Self {
            mill: rng.above(0.2),
            market: rng.above(0.4),
            storage: true,
            workshop: rng.above(0.6),
            well: true,
        }
    }
}

/// Zones split into village sites and homestead sites.
#[derive(Debug, Clone, Default)]
pub struct SiteSelection {
    /// Zones flagged as villages
    pub villages: Vec<FarmZone>,
    /// Remaining zones
    pub homesteads: Vec<FarmZone>,
}

/// Promotes the first 2–4 zones (already sorted best-first) to villages.
pub fn select_village_and_homestead_sites(
    mut zones: Vec<FarmZone>,
    rng: &mut SeededRng,
) -> SiteSelection {
    if zones.is_empty() {
        return SiteSelection::default();
    }

    let wanted = rng.below(3) as usize + 2;
    let homesteads = zones.split_off(wanted.min(zones.len()));
    for zone in &mut zones {
        zone.is_village = true;
    }

    SiteSelection {
        villages: zones,
        homesteads,
    }
}
