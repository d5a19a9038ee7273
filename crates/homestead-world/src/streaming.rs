//! World streaming and chunk management.

use std::collections::HashMap;

use homestead_common::{
    chunks_in_radius, ChunkCoord, ConfigError, NpcId, Tile, WorldCoord, WorldError, WorldSeed,
};
use tracing::{debug, info};

use crate::chunk::Chunk;
use crate::config::StreamingConfig;
use crate::generation::ChunkGenerator;
use crate::npc::{Npc, NpcManager, NpcSnapshot};
use crate::registry::RegionRegistry;

/// Rings searched around the origin for a spawn point.
const SPAWN_SEARCH_RADIUS: i64 = 10;

/// Counters for diagnostic overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    /// Resident chunks
    pub loaded_chunks: usize,
    /// Cached regions
    pub loaded_regions: usize,
    /// Farms across cached regions
    pub loaded_farms: usize,
    /// Active NPCs
    pub active_npcs: usize,
    /// Dormant NPCs
    pub dormant_npcs: usize,
}

/// Keeps the chunks around an observer resident and everything else regenerable.
///
/// Each [`ChunkManager::update`] loads the square around the observer, evicts
/// what has drifted beyond the unload radius, then trims to the chunk budget
/// furthest first, least recently used among equals. Evicting a chunk sends
/// its NPCs dormant; regenerating it brings them back.
#[derive(Debug)]
pub struct ChunkManager {
    config: StreamingConfig,
    generator: ChunkGenerator,
    regions: RegionRegistry,
    npcs: NpcManager,
    chunks: HashMap<ChunkCoord, Chunk>,
    /// Monotonic access counter
    clock: u64,
}

impl ChunkManager {
    /// Creates a manager for `world`, rejecting invalid streaming settings.
    pub fn new(world: WorldSeed, config: StreamingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            seed = world.raw(),
            load_radius = config.load_radius,
            unload_radius = config.unload_radius,
            max_loaded_chunks = config.max_loaded_chunks,
            "chunk manager created"
        );
        Ok(Self {
            config,
            generator: ChunkGenerator::new(world),
            regions: RegionRegistry::new(world),
            npcs: NpcManager::new(world),
            chunks: HashMap::new(),
            clock: 0,
        })
    }

    /// Streams the world around an observer at a continuous world position.
    pub fn update(&mut self, observer_x: f64, observer_y: f64) {
        let center = WorldCoord::from_position(observer_x, observer_y).to_chunk();

        for coord in chunks_in_radius(center, self.config.load_radius) {
            self.ensure_chunk_loaded(coord);
        }

        let unload = u64::from(self.config.unload_radius);
        let far: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|c| c.distance(center) > unload)
            .copied()
            .collect();
        for coord in &far {
            self.evict(*coord);
        }

        let trimmed = self.enforce_budget(center);
        self.npcs.update();

        if !far.is_empty() || trimmed > 0 {
            debug!(
                observer = %center,
                unloaded = far.len(),
                trimmed,
                loaded = self.chunks.len(),
                "streamed chunks"
            );
        }
    }

    /// Evicts surplus chunks, furthest first, then least recently used.
    ///
    /// Chunks inside the load radius are never candidates.
    fn enforce_budget(&mut self, center: ChunkCoord) -> usize {
        let max = self.config.max_loaded_chunks;
        if self.chunks.len() <= max {
            return 0;
        }

        let protect = u64::from(self.config.load_radius);
        let mut candidates: Vec<(u64, u64, ChunkCoord)> = self
            .chunks
            .values()
            .map(|c| (c.coord().distance(center), c.last_accessed(), c.coord()))
            .filter(|(d, _, _)| *d > protect)
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let surplus = self.chunks.len() - max;
        let mut evicted = 0;
        for (_, _, coord) in candidates.into_iter().take(surplus) {
            self.evict(coord);
            evicted += 1;
        }
        evicted
    }

    fn evict(&mut self, coord: ChunkCoord) {
        if let Some(mut chunk) = self.chunks.remove(&coord) {
            self.npcs.save_for_chunk(&mut chunk);
        }
    }

    /// Returns the chunk at `coord`, generating it and spawning its NPCs on first use.
    pub fn ensure_chunk_loaded(&mut self, coord: ChunkCoord) -> &mut Chunk {
        self.clock += 1;
        let tick = self.clock;

        let chunk = self.chunks.entry(coord).or_insert_with(|| {
            let mut chunk = self.generator.generate(coord, &mut self.regions);
            self.npcs.spawn_for_chunk(&mut chunk, &self.regions);
            chunk
        });
        chunk.touch(tick);
        chunk
    }

    /// Tile at a world position, loading its chunk if needed.
    pub fn tile(&mut self, at: WorldCoord) -> Tile {
        self.ensure_chunk_loaded(at.to_chunk()).tile(at.to_local())
    }

    /// Overwrites a tile in a loaded chunk.
    ///
    /// Returns `false` when the chunk is not resident. Edits last only until
    /// the chunk is evicted; regeneration restores the generated tile.
    pub fn set_tile(&mut self, at: WorldCoord, tile: Tile) -> bool {
        match self.chunks.get_mut(&at.to_chunk()) {
            Some(chunk) => {
                chunk.set_tile(at.to_local(), tile);
                true
            }
            None => false,
        }
    }

    /// A resident chunk.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Returns whether `coord` is resident.
    #[must_use]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Resident chunk coordinates, sorted.
    #[must_use]
    pub fn loaded_chunks(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Chunks covering a viewport centred on the camera, loading any that are missing.
    pub fn visible_chunks(
        &mut self,
        camera_x: f64,
        camera_y: f64,
        viewport_tiles_x: u32,
        viewport_tiles_y: u32,
    ) -> Vec<&Chunk> {
        let half_x = f64::from(viewport_tiles_x) / 2.0;
        let half_y = f64::from(viewport_tiles_y) / 2.0;
        let start = WorldCoord::from_position(camera_x - half_x, camera_y - half_y).to_chunk();
        let end = WorldCoord::from_position(camera_x + half_x, camera_y + half_y).to_chunk();

        let mut coords = Vec::new();
        for cx in start.x..=end.x {
            for cy in start.y..=end.y {
                coords.push(ChunkCoord::new(cx, cy));
            }
        }
        for &coord in &coords {
            self.ensure_chunk_loaded(coord);
        }
        coords.iter().filter_map(|c| self.chunks.get(c)).collect()
    }

    /// Every active NPC. Active NPCs always have their home chunk resident.
    pub fn all_loaded_npcs(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.active_npcs()
    }

    /// NPCs attached to a resident chunk.
    #[must_use]
    pub fn npcs_in_chunk(&self, coord: ChunkCoord) -> Vec<&Npc> {
        self.chunks
            .get(&coord)
            .map(|chunk| chunk.npcs().iter().filter_map(|id| self.npcs.npc(*id)).collect())
            .unwrap_or_default()
    }

    /// An active NPC, for the code that moves NPCs around.
    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.npc_mut(id)
    }

    /// The NPC manager.
    #[must_use]
    pub const fn npcs(&self) -> &NpcManager {
        &self.npcs
    }

    /// Returns whether the tile at `at` blocks movement.
    pub fn is_solid_tile(&mut self, at: WorldCoord) -> bool {
        self.tile(at).is_solid()
    }

    /// Returns whether a mover may step onto a continuous world position.
    ///
    /// Blocked by solid tiles and by any active NPC standing on the same tile.
    pub fn can_move_to(&mut self, x: f64, y: f64) -> bool {
        let at = WorldCoord::from_position(x, y);
        if self.is_solid_tile(at) {
            return false;
        }
        !self.npcs.active_npcs().any(|npc| npc.tile() == at)
    }

    /// First walkable tile in rings around the world origin, or the origin itself.
    pub fn find_spawn_point(&mut self) -> WorldCoord {
        for r in 0..=SPAWN_SEARCH_RADIUS {
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    if self.can_move_to(dx as f64, dy as f64) {
                        return WorldCoord::new(dx, dy);
                    }
                }
            }
        }
        WorldCoord::new(0, 0)
    }

    /// World seed.
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        self.generator.world_seed()
    }

    /// Streaming settings.
    #[must_use]
    pub const fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of cached regions.
    #[must_use]
    pub fn loaded_region_count(&self) -> usize {
        self.regions.loaded_region_count()
    }

    /// Number of farms across cached regions.
    #[must_use]
    pub const fn loaded_farm_count(&self) -> usize {
        self.regions.loaded_farm_count()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            loaded_chunks: self.chunks.len(),
            loaded_regions: self.regions.loaded_region_count(),
            loaded_farms: self.regions.loaded_farm_count(),
            active_npcs: self.npcs.active_count(),
            dormant_npcs: self.npcs.dormant_count(),
        }
    }

    /// Checks NPC bookkeeping: identities are unique across active and
    /// dormant, and every NPC attached to a resident chunk is active.
    pub fn verify_invariants(&self) -> Result<(), WorldError> {
        self.npcs.verify_invariants()?;
        for chunk in self.chunks.values() {
            if let Some(id) = chunk.npcs().iter().find(|id| !self.npcs.is_active(**id)) {
                return Err(WorldError::NpcOrphaned(*id));
            }
        }
        Ok(())
    }

    /// Poses of every NPC spawned so far.
    #[must_use]
    pub fn export_npc_snapshot(&self) -> NpcSnapshot {
        self.npcs.export_snapshot()
    }

    /// Loads NPC poses saved by [`ChunkManager::export_npc_snapshot`].
    pub fn import_npc_snapshot(&mut self, snapshot: NpcSnapshot) {
        self.npcs.import_snapshot(snapshot);
    }
}
