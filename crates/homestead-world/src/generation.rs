//! Procedural chunk generation.
//!
//! A chunk is built in three passes, each allowed to overwrite the last:
//! base terrain (grass, noise-driven dirt, paths, the odd ruin), water from
//! nearby regions, then farm structures. Only the chunk's own seeded stream
//! and world-space noise are consulted, so the same coordinate always
//! produces the same tiles.

use ::noise::{NoiseFn, ScalePoint};
use homestead_agriculture::StampLayer;
use homestead_common::{
    chunk_seed, ChunkCoord, LocalCoord, SeededRng, Tile, WorldCoord, WorldSeed, CHUNK_SIZE,
};
use tracing::trace;

use crate::chunk::Chunk;
use crate::noise::ValueNoise;
use crate::region::{RegionFarm, WaterBody};
use crate::registry::RegionRegistry;

/// Frequency of the dirt-patch noise.
const TERRAIN_SCALE: f64 = 0.1;

/// Noise above this turns grass into dirt.
const DIRT_THRESHOLD: f64 = 0.65;

/// Draws at or below this skip the ruin.
const RUIN_THRESHOLD: f64 = 0.7;

/// Procedural chunk generator for one world.
pub struct ChunkGenerator {
    /// World seed
    world: WorldSeed,
    /// Dirt-patch noise, sampled in world space
    terrain: ScalePoint<ValueNoise>,
}

impl std::fmt::Debug for ChunkGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkGenerator")
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

impl ChunkGenerator {
    /// Creates a generator for `world`.
    #[must_use]
    pub fn new(world: WorldSeed) -> Self {
        let terrain = ScalePoint::new(ValueNoise::new(world))
            .set_x_scale(TERRAIN_SCALE)
            .set_y_scale(TERRAIN_SCALE);
        Self { world, terrain }
    }

    /// Returns the world seed.
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        self.world
    }

    /// Generates the chunk at `coord`.
    ///
    /// The returned chunk lists the farms that wrote tiles into it and has no
    /// NPCs attached yet.
    pub fn generate(&self, coord: ChunkCoord, regions: &mut RegionRegistry) -> Chunk {
        let mut chunk = Chunk::new(coord);
        let mut rng = SeededRng::new(chunk_seed(coord, self.world));

        self.fill_base_terrain(&mut chunk, &mut rng);

        let water = regions.water_bodies_affecting_chunk(coord);
        for body in &water {
            apply_water_body(&mut chunk, body);
        }

        let farms = regions.farms_affecting_chunk(coord);
        for farm in &farms {
            apply_farm(&mut chunk, farm);
            chunk.add_farm(farm.id);
        }

        chunk.mark_generated();
        trace!(
            chunk = %coord,
            water = water.len(),
            farms = farms.len(),
            "generated chunk"
        );
        chunk
    }

    fn fill_base_terrain(&self, chunk: &mut Chunk, rng: &mut SeededRng) {
        let coord = chunk.coord();
        for index in 0..chunk.tiles().len() {
            let local = LocalCoord::from_index(index);
            let world = local.to_world(coord);
            if self.terrain.get([world.x as f64, world.y as f64]) > DIRT_THRESHOLD {
                chunk.set_tile(local, Tile::Dirt);
            }
        }

        let paths = rng.below(3) + 1;
        for _ in 0..paths {
            add_dirt_path(chunk, rng);
        }

        if rng.above(RUIN_THRESHOLD) {
            add_ruin(chunk, rng);
        }
    }
}

/// Sets a tile if the local position is inside the chunk.
fn put(chunk: &mut Chunk, x: i64, y: i64, tile: Tile) {
    if let Some(local) = local_in_chunk(x, y) {
        chunk.set_tile(local, tile);
    }
}

fn local_in_chunk(x: i64, y: i64) -> Option<LocalCoord> {
    let size = i64::from(CHUNK_SIZE);
    if (0..size).contains(&x) && (0..size).contains(&y) {
        Some(LocalCoord::new(x as u32, y as u32))
    } else {
        None
    }
}

/// A straight dirt run of 3 to 10 tiles.
fn add_dirt_path(chunk: &mut Chunk, rng: &mut SeededRng) {
    let x = rng.range(2, CHUNK_SIZE - 4);
    let y = rng.range(2, CHUNK_SIZE - 4);
    let length = rng.range(3, 8);
    let horizontal = rng.above(0.5);

    for step in 0..length {
        let (tx, ty) = if horizontal { (x + step, y) } else { (x, y + step) };
        put(chunk, tx, ty, Tile::Dirt);
    }
}

/// A small walled ruin with a floor and one door.
fn add_ruin(chunk: &mut Chunk, rng: &mut SeededRng) {
    let x = rng.range(4, CHUNK_SIZE - 8);
    let y = rng.range(4, CHUNK_SIZE - 8);
    let width = rng.range(2, 3);
    let height = rng.range(2, 3);

    for ty in y..y + height {
        for tx in x..x + width {
            let edge = ty == y || ty == y + height - 1 || tx == x || tx == x + width - 1;
            put(chunk, tx, ty, if edge { Tile::Wall } else { Tile::Floor });
        }
    }

    let (door_x, door_y) = match rng.below(4) {
        0 => (x + width / 2, y + height - 1),
        1 => (x + width / 2, y),
        2 => (x + width - 1, y + height / 2),
        _ => (x, y + height / 2),
    };
    put(chunk, door_x, door_y, Tile::Door);
}

/// Floods grass and dirt inside the circle; anything else is left alone.
fn apply_water_body(chunk: &mut Chunk, body: &WaterBody) {
    let origin = chunk.coord().to_world();
    for p in body.tiles() {
        if let Some(local) = local_in_chunk(p.x - origin.x, p.y - origin.y) {
            if matches!(chunk.tile(local), Tile::Grass | Tile::Dirt) {
                chunk.set_tile(local, Tile::Water);
            }
        }
    }
}

/// Stamps the part of a farm that falls inside the chunk.
fn apply_farm(chunk: &mut Chunk, farm: &RegionFarm) {
    let origin = chunk.coord().to_world();
    for cell in farm.cells() {
        let WorldCoord { x, y } = cell.at;
        let Some(local) = local_in_chunk(x - origin.x, y - origin.y) else {
            continue;
        };
        match cell.layer {
            StampLayer::Structure => chunk.set_tile(local, cell.tile),
            StampLayer::Infrastructure => {
                if let Some(tile) = overlay_infrastructure(chunk.tile(local), cell.tile) {
                    chunk.set_tile(local, tile);
                }
            }
        }
    }
}

/// What an infrastructure tile leaves behind on top of `existing`.
///
/// Buildings are never covered, and a dirt lane crossing water becomes a bridge.
const fn overlay_infrastructure(existing: Tile, infra: Tile) -> Option<Tile> {
    match (existing, infra) {
        (Tile::Wall | Tile::Table, _) => None,
        (Tile::Water, Tile::Dirt) => Some(Tile::Bridge),
        _ => Some(infra),
    }
}

/// Generates a single chunk with a throwaway generator.
pub fn generate_chunk(coord: ChunkCoord, world: WorldSeed, regions: &mut RegionRegistry) -> Chunk {
    ChunkGenerator::new(world).generate(coord, regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_common::RegionCoord;
    use std::collections::HashSet;

    fn generate(coord: ChunkCoord, seed: u32) -> Chunk {
        let world = WorldSeed::new(seed);
        generate_chunk(coord, world, &mut RegionRegistry::new(world))
    }

    #[test]
    fn test_generation_is_deterministic() {
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-5, 3), ChunkCoord::new(40, -41)] {
            let a = generate(coord, 42);
            let b = generate(coord, 42);
            assert_eq!(a.tiles(), b.tiles());
            assert_eq!(a.farm_ids(), b.farm_ids());
            assert!(a.is_generated());
            assert!(a.npcs().is_empty());
        }
    }

    #[test]
    fn test_cached_and_fresh_registries_agree() {
        let world = WorldSeed::new(42);
        let mut warm = RegionRegistry::new(world);
        for cx in -6..6 {
            generate_chunk(ChunkCoord::new(cx, 0), world, &mut warm);
        }
        let coord = ChunkCoord::new(1, 1);
        let from_warm = generate_chunk(coord, world, &mut warm);
        assert_eq!(from_warm.tiles(), generate(coord, 42).tiles());
    }

    #[test]
    fn test_seeds_differ() {
        let coord = ChunkCoord::new(2, 2);
        assert_ne!(generate(coord, 1).tiles(), generate(coord, 2).tiles());
    }

    #[test]
    fn test_every_declared_chunk_gets_farm_tiles() {
        let world = WorldSeed::new(42);
        let mut registry = RegionRegistry::new(world);
        let farms = registry.get_or_generate(RegionCoord::new(0, 0)).farms.clone();
        assert!(!farms.is_empty());

        for farm in &farms {
            for &coord in &farm.affected_chunks {
                let chunk = generate_chunk(coord, world, &mut registry);
                assert!(chunk.farm_ids().contains(&farm.id));
                let origin = coord.to_world();
                let wrote = farm.cells().any(|c| {
                    local_in_chunk(c.at.x - origin.x, c.at.y - origin.y).is_some()
                });
                assert!(wrote, "{} declared {coord} but writes nothing there", farm.id);
            }
        }
    }

    #[test]
    fn test_farm_structures_are_stamped() {
        let world = WorldSeed::new(42);
        let mut registry = RegionRegistry::new(world);
        let farms = registry.get_or_generate(RegionCoord::new(0, 0)).farms.clone();

        for farm in &farms {
            let house = farm.farmhouse_position().expect("farmhouse");
            let chunk = generate_chunk(house.to_chunk(), world, &mut registry);
            assert_eq!(chunk.tile(house.to_local()), Tile::Wall);
        }
    }

    #[test]
    fn test_infrastructure_never_covers_buildings() {
        let world = WorldSeed::new(7);
        let mut registry = RegionRegistry::new(world);
        let farms = registry.get_or_generate(RegionCoord::new(0, 0)).farms.clone();

        for farm in &farms {
            let structures: HashSet<WorldCoord> = farm
                .cells()
                .filter(|c| c.layer == StampLayer::Structure && c.tile != Tile::Plowed)
                .map(|c| c.at)
                .collect();
            for &coord in &farm.affected_chunks {
                let chunk = generate_chunk(coord, world, &mut registry);
                for at in structures.iter().filter(|p| p.to_chunk() == coord) {
                    assert!(matches!(chunk.tile(at.to_local()), Tile::Wall | Tile::Table));
                }
            }
        }
    }

    #[test]
    fn test_infrastructure_overlay() {
        assert_eq!(overlay_infrastructure(Tile::Wall, Tile::Fence), None);
        assert_eq!(overlay_infrastructure(Tile::Table, Tile::Dirt), None);
        assert_eq!(overlay_infrastructure(Tile::Water, Tile::Dirt), Some(Tile::Bridge));
        assert_eq!(overlay_infrastructure(Tile::Grass, Tile::Water), Some(Tile::Water));
        assert_eq!(overlay_infrastructure(Tile::Water, Tile::Fence), Some(Tile::Fence));
    }

    #[test]
    fn test_water_is_continuous_across_chunk_edges() {
        let world = WorldSeed::new(42);
        let mut registry = RegionRegistry::new(world);
        let mut checked = 0;

        let coords: Vec<RegionCoord> = (-3..3)
            .flat_map(|rx| (-2..2).map(move |ry| RegionCoord::new(rx, ry)))
            .collect();
        for coord in coords {
            let region = registry.get_or_generate(coord).clone();
            for body in &region.water_bodies {
                let chunks: HashSet<ChunkCoord> = body.tiles().map(WorldCoord::to_chunk).collect();
                if chunks.len() < 2 {
                    continue;
                }
                let generated: Vec<Chunk> = chunks
                    .iter()
                    .map(|&c| generate_chunk(c, world, &mut registry))
                    .collect();
                for p in body.tiles() {
                    let chunk = generated
                        .iter()
                        .find(|c| c.coord() == p.to_chunk())
                        .expect("chunk generated");
                    // Farms can cover water, but a gap in open land would be a seam.
                    let tile = chunk.tile(p.to_local());
                    assert!(tile == Tile::Water || !matches!(tile, Tile::Grass | Tile::Dirt));
                }
                checked += 1;
            }
        }
        assert!(checked > 0, "no water body straddled a chunk edge");
    }

    #[test]
    fn test_ruins_have_one_door() {
        let mut found = 0;
        for cx in 0..30 {
            let chunk = generate(ChunkCoord::new(cx, 100), 3);
            let doors = chunk.tiles().iter().filter(|t| **t == Tile::Door).count();
            assert!(doors <= 1);
            found += doors;
        }
        assert!(found > 0);
    }
}
