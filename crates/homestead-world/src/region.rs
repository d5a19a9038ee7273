//! Region generation: water bodies and the farm grid for one 128x128 block.
//!
//! [`generate_region`] is a pure function of the region coordinate and the
//! world seed. One generator stream, seeded from the region, drives every
//! decision in a fixed order (water, zones, farm layouts), so a region
//! regenerates identically no matter when or how often it is asked for.

use homestead_agriculture::{
    determine_biome, generate_farm, water_proximity, Farm, FarmCell, FarmZone,
};
use homestead_common::{
    chunks_overlapping_rect, region_seed, ChunkCoord, FarmId, RegionCoord, SeededRng, WorldCoord,
    WorldRect, WorldSeed, CHUNK_SIZE, REGION_TILE_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Farm grid cells per region side.
const GRID_CELLS: i64 = 3;

/// Side of one grid cell in tiles.
const CELL_SIZE: i64 = REGION_TILE_SIZE as i64 / GRID_CELLS;

/// Side of a farm zone in tiles.
const FARM_SIZE: i64 = 16;

/// Offset that centres a zone in its cell.
const CELL_PADDING: i64 = (CELL_SIZE - FARM_SIZE) / 2;

/// Chance that a grid cell stays empty.
const EMPTY_CELL_CHANCE: f64 = 0.3;

/// Distance at which a water body stops influencing biome choice.
const WATER_FALLOFF: f64 = 60.0;

/// Water bodies keep this far from the region edge.
const WATER_MARGIN: i64 = 8;

/// Radius above which a water body is a lake.
const POND_MAX_RADIUS: i64 = 4;

/// Pond or lake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterKind {
    /// Radius up to 4
    Pond,
    /// Radius above 4
    Lake,
}

/// A filled circle of water in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterBody {
    /// Centre tile
    pub center: WorldCoord,
    /// Radius in tiles
    pub radius: i64,
    /// Classification
    pub kind: WaterKind,
}

impl WaterBody {
    /// Creates a water body, classifying it by radius.
    #[must_use]
    pub const fn new(center: WorldCoord, radius: i64) -> Self {
        let kind = if radius > POND_MAX_RADIUS {
            WaterKind::Lake
        } else {
            WaterKind::Pond
        };
        Self {
            center,
            radius,
            kind,
        }
    }

    /// Returns whether the tile lies inside the circle.
    #[must_use]
    pub const fn contains(&self, p: WorldCoord) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Cheap per-axis proximity test against a chunk's centre.
    ///
    /// Errs on the inclusive side; the tile pass does the exact check.
    #[must_use]
    pub fn may_touch_chunk(&self, chunk: ChunkCoord) -> bool {
        let size = f64::from(CHUNK_SIZE);
        let origin = chunk.to_world();
        let reach = (self.radius as f64) + size;
        let dx = (self.center.x as f64 - (origin.x as f64 + size / 2.0)).abs();
        let dy = (self.center.y as f64 - (origin.y as f64 + size / 2.0)).abs();
        dx <= reach && dy <= reach
    }

    /// Every tile inside the circle, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = WorldCoord> + '_ {
        let r = self.radius;
        (-r..=r)
            .flat_map(move |dy| (-r..=r).map(move |dx| self.center.offset(dx, dy)))
            .filter(|p| self.contains(*p))
    }
}

/// A farm anchored in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFarm {
    /// Stable id
    pub id: FarmId,
    /// World position of the zone's top-left corner
    pub origin: WorldCoord,
    /// World rectangle covering every tile the farm writes
    pub bounds: WorldRect,
    /// Layout, in zone frame
    pub farm: Farm,
    /// Chunks whose tiles intersect `bounds`
    pub affected_chunks: Vec<ChunkCoord>,
}

impl RegionFarm {
    fn new(id: FarmId, origin: WorldCoord, farm: Farm) -> Self {
        let local = farm
            .bounds()
            .unwrap_or_else(|| WorldRect::new(farm.zone.x, farm.zone.y, 0, 0));
        let mut anchored = Self {
            id,
            origin,
            bounds: WorldRect::new(0, 0, 0, 0),
            farm,
            affected_chunks: Vec::new(),
        };
        let corner = anchored.to_world(local.x, local.y);
        anchored.bounds = WorldRect::new(corner.x, corner.y, local.width, local.height);
        anchored.affected_chunks = chunks_overlapping_rect(&anchored.bounds);
        anchored
    }

    /// Converts a zone-frame position to world space.
    #[must_use]
    pub const fn to_world(&self, x: i64, y: i64) -> WorldCoord {
        WorldCoord::new(
            self.origin.x + (x - self.farm.zone.x),
            self.origin.y + (y - self.farm.zone.y),
        )
    }

    /// World position of the farmhouse's top-left tile.
    #[must_use]
    pub fn farmhouse_position(&self) -> Option<WorldCoord> {
        self.farm.farmhouse().map(|b| self.to_world(b.x, b.y))
    }

    /// Chunk that owns the farmhouse; the farm's NPCs live here.
    #[must_use]
    pub fn home_chunk(&self) -> Option<ChunkCoord> {
        self.farmhouse_position().map(WorldCoord::to_chunk)
    }

    /// Returns whether this farm writes tiles in `chunk`.
    #[must_use]
    pub fn affects_chunk(&self, chunk: ChunkCoord) -> bool {
        self.affected_chunks.contains(&chunk)
    }

    /// Every tile the farm writes, in world space and stamping order.
    pub fn cells(&self) -> impl Iterator<Item = FarmCell> + '_ {
        self.farm.footprint().map(|cell| FarmCell {
            at: self.to_world(cell.at.x, cell.at.y),
            ..cell
        })
    }
}

/// A generated region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region coordinate
    pub coord: RegionCoord,
    /// Seed the region's stream was built from
    pub seed: u32,
    /// Farms, villages first
    pub farms: Vec<RegionFarm>,
    /// Ponds and lakes
    pub water_bodies: Vec<WaterBody>,
}

/// Generates the region at `coord`.
pub fn generate_region(coord: RegionCoord, world: WorldSeed) -> Region {
    let seed = region_seed(coord, world);
    let mut rng = SeededRng::new(seed);
    let origin = coord.to_world();

    let water_bodies = generate_water_bodies(origin, &mut rng);
    let zones = generate_farm_zones(origin, &water_bodies, &mut rng);

    let (villages, homesteads): (Vec<_>, Vec<_>) = zones.into_iter().partition(|z| z.is_village);
    let farms: Vec<RegionFarm> = villages
        .into_iter()
        .chain(homesteads)
        .enumerate()
        .map(|(index, zone)| {
            let anchor = origin.offset(zone.x, zone.y);
            let farm = generate_farm(zone, &mut rng);
            RegionFarm::new(FarmId::new(coord, index as u32), anchor, farm)
        })
        .collect();

    debug!(
        region = %coord,
        farms = farms.len(),
        water = water_bodies.len(),
        "generated region"
    );

    Region {
        coord,
        seed,
        farms,
        water_bodies,
    }
}

fn generate_water_bodies(origin: WorldCoord, rng: &mut SeededRng) -> Vec<WaterBody> {
    let count = rng.below(3) + 1;
    let span = REGION_TILE_SIZE - 2 * WATER_MARGIN as u32;
    (0..count)
        .map(|_| {
            let x = origin.x + rng.range(WATER_MARGIN, span);
            let y = origin.y + rng.range(WATER_MARGIN, span);
            let radius = rng.range(2, 4);
            WaterBody::new(WorldCoord::new(x, y), radius)
        })
        .collect()
}

/// Zones in region-local coordinates, row-major over the 3x3 grid.
fn generate_farm_zones(
    origin: WorldCoord,
    water: &[WaterBody],
    rng: &mut SeededRng,
) -> Vec<FarmZone> {
    let mut zones = Vec::new();
    for grid_y in 0..GRID_CELLS {
        for grid_x in 0..GRID_CELLS {
            if rng.next_f64() < EMPTY_CELL_CHANCE {
                continue;
            }

            let x = grid_x * CELL_SIZE + CELL_PADDING;
            let y = grid_y * CELL_SIZE + CELL_PADDING;
            let proximity = zone_water_proximity(origin, x, y, water);
            let biome = determine_biome(proximity, false, rng);

            zones.push(FarmZone {
                x,
                y,
                width: FARM_SIZE,
                height: FARM_SIZE,
                biome,
                water_proximity: proximity,
                suitability: 50.0 + proximity * 30.0,
                is_village: grid_x == 1 && grid_y == 1,
            });
        }
    }
    zones
}

fn zone_water_proximity(origin: WorldCoord, x: i64, y: i64, water: &[WaterBody]) -> f64 {
    let half = FARM_SIZE as f64 / 2.0;
    let cx = (origin.x + x) as f64 + half;
    let cy = (origin.y + y) as f64 + half;
    water
        .iter()
        .map(|w| (w.center.x as f64 - cx).hypot(w.center.y as f64 - cy))
        .reduce(f64::min)
        .map_or(0.0, |d| water_proximity(d, WATER_FALLOFF))
}
