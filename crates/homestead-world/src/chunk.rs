//! Chunk data structure.

use homestead_common::{ChunkCoord, FarmId, LocalCoord, NpcId, Tile, CHUNK_AREA};

/// A 32x32 block of tiles plus the bookkeeping streaming needs.
///
/// Tiles are a pure function of the coordinate, the world seed and the
/// regions around it, so a chunk can be dropped and rebuilt at any time.
/// NPCs are referenced by id; the NPC manager owns their state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Row-major tiles
    tiles: Vec<Tile>,
    /// NPCs whose home is this chunk and who are currently active
    npcs: Vec<NpcId>,
    /// Farms that wrote tiles here
    farm_ids: Vec<FarmId>,
    /// Set once generation has finished
    generated: bool,
    /// Access tick, for eviction ordering
    last_accessed: u64,
}

impl Chunk {
    /// Creates an all-grass, ungenerated chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            tiles: vec![Tile::Grass; CHUNK_AREA],
            npcs: Vec::new(),
            farm_ids: Vec::new(),
            generated: false,
            last_accessed: 0,
        }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Gets the tile at a local coordinate.
    #[must_use]
    pub fn tile(&self, local: LocalCoord) -> Tile {
        self.tiles[local.to_index()]
    }

    /// Sets the tile at a local coordinate.
    pub fn set_tile(&mut self, local: LocalCoord, tile: Tile) {
        self.tiles[local.to_index()] = tile;
    }

    /// Returns all tiles, row-major.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile codes as raw bytes, row-major.
    #[must_use]
    pub fn tile_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tiles)
    }

    /// NPCs attached to this chunk.
    #[must_use]
    pub fn npcs(&self) -> &[NpcId] {
        &self.npcs
    }

    pub(crate) fn attach_npc(&mut self, id: NpcId) {
        self.npcs.push(id);
    }

    pub(crate) fn detach_npcs(&mut self) {
        self.npcs.clear();
    }

    /// Farms that contributed tiles.
    #[must_use]
    pub fn farm_ids(&self) -> &[FarmId] {
        &self.farm_ids
    }

    pub(crate) fn add_farm(&mut self, id: FarmId) {
        self.farm_ids.push(id);
    }

    /// Returns whether generation has finished.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }

    pub(crate) fn mark_generated(&mut self) {
        self.generated = true;
    }

    /// Access tick of the most recent access.
    #[must_use]
    pub const fn last_accessed(&self) -> u64 {
        self.last_accessed
    }

    /// Records an access.
    pub fn touch(&mut self, tick: u64) {
        self.last_accessed = tick;
    }
}
