//! Region cache and the spatial queries chunk generation runs against.

use std::collections::HashMap;

use homestead_common::{ChunkCoord, FarmId, RegionCoord, WorldSeed};
use tracing::trace;

use crate::region::{generate_region, Region, RegionFarm, WaterBody};

/// Lazily generated regions for one world.
///
/// Regions are generated on first query and kept for the registry's
/// lifetime. Every query that answers "what touches this chunk" scans the
/// chunk's region and its eight neighbours, since a farm or pond anchored
/// near a region edge can spill into the next region's chunks.
#[derive(Debug)]
pub struct RegionRegistry {
    world: WorldSeed,
    regions: HashMap<RegionCoord, Region>,
    farm_count: usize,
}

impl RegionRegistry {
    /// Creates an empty registry for `world`.
    #[must_use]
    pub fn new(world: WorldSeed) -> Self {
        Self {
            world,
            regions: HashMap::new(),
            farm_count: 0,
        }
    }

    /// World seed regions are generated from.
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        self.world
    }

    /// Returns the region at `coord`, generating and caching it on first use.
    pub fn get_or_generate(&mut self, coord: RegionCoord) -> &Region {
        let world = self.world;
        let farm_count = &mut self.farm_count;
        self.regions.entry(coord).or_insert_with(|| {
            let region = generate_region(coord, world);
            *farm_count += region.farms.len();
            region
        })
    }

    /// Returns a cached region without generating it.
    #[must_use]
    pub fn region(&self, coord: RegionCoord) -> Option<&Region> {
        self.regions.get(&coord)
    }

    /// Looks a farm up by id.
    ///
    /// The id names its region and index, so this is two direct lookups.
    /// Farms in regions that have not been generated yet are not found.
    #[must_use]
    pub fn farm_by_id(&self, id: FarmId) -> Option<&RegionFarm> {
        self.regions.get(&id.region)?.farms.get(id.index as usize)
    }

    fn ensure_neighborhood(&mut self, chunk: ChunkCoord) {
        for coord in chunk.to_region().neighborhood() {
            self.get_or_generate(coord);
        }
    }

    fn neighborhood(&self, chunk: ChunkCoord) -> impl Iterator<Item = &Region> {
        chunk
            .to_region()
            .neighborhood()
            .filter_map(|coord| self.regions.get(&coord))
    }

    /// Farms that write at least one tile in `chunk`, without duplicates.
    pub fn farms_affecting_chunk(&mut self, chunk: ChunkCoord) -> Vec<&RegionFarm> {
        self.ensure_neighborhood(chunk);

        let mut farms: Vec<&RegionFarm> = Vec::new();
        for farm in self.neighborhood(chunk).flat_map(|r| &r.farms) {
            if farm.affects_chunk(chunk) && !farms.iter().any(|f| f.id == farm.id) {
                farms.push(farm);
            }
        }
        trace!(chunk = %chunk, farms = farms.len(), "farms affecting chunk");
        farms
    }

    /// Water bodies that may reach into `chunk` (bounding-box test).
    pub fn water_bodies_affecting_chunk(&mut self, chunk: ChunkCoord) -> Vec<WaterBody> {
        self.ensure_neighborhood(chunk);

        self.neighborhood(chunk)
            .flat_map(|r| &r.water_bodies)
            .filter(|w| w.may_touch_chunk(chunk))
            .copied()
            .collect()
    }

    /// Drops every cached region.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.farm_count = 0;
    }

    /// Number of cached regions.
    #[must_use]
    pub fn loaded_region_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of farms across cached regions.
    #[must_use]
    pub const fn loaded_farm_count(&self) -> usize {
        self.farm_count
    }
}
