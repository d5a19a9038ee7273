//! Coordinate types for the three nested grids: world tiles, chunks, and regions.
//!
//! All conversions use floor division (`div_euclid` / `rem_euclid`), so
//! negative coordinates map onto the grid the same way positive ones do:
//! world tile `-1` lives in chunk `-1` at local offset `31`, never in chunk `0`.

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Width and height of a chunk in tiles.
pub const CHUNK_SIZE: u32 = 32;

/// Width and height of a region in chunks.
pub const REGION_SIZE: u32 = 4;

/// Width and height of a region in tiles.
pub const REGION_TILE_SIZE: u32 = CHUNK_SIZE * REGION_SIZE;

/// Number of tiles in one chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Furthest tile from the origin on either axis. Positions beyond it are
/// clamped, so coordinate arithmetic never leaves `i64`.
pub const WORLD_LIMIT: i64 = 1 << 52;

/// World coordinate in tiles (global position).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct WorldCoord {
    /// X coordinate in world space
    pub x: i64,
    /// Y coordinate in world space
    pub y: i64,
}

impl WorldCoord {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the chunk containing this tile.
    #[must_use]
    pub const fn to_chunk(self) -> ChunkCoord {
        let size = CHUNK_SIZE as i64;
        ChunkCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }

    /// Returns the region containing this tile.
    #[must_use]
    pub const fn to_region(self) -> RegionCoord {
        let size = REGION_TILE_SIZE as i64;
        RegionCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }

    /// Returns the position of this tile inside its chunk.
    #[must_use]
    pub const fn to_local(self) -> LocalCoord {
        let size = CHUNK_SIZE as i64;
        LocalCoord {
            x: self.x.rem_euclid(size) as u32,
            y: self.y.rem_euclid(size) as u32,
        }
    }

    /// Returns the tile containing a continuous position.
    #[must_use]
    ///
    /// Clamped to [`WORLD_LIMIT`]; NaN maps to zero.
    pub fn from_position(x: f64, y: f64) -> Self {
        Self {
            x: (x.floor() as i64).clamp(-WORLD_LIMIT, WORLD_LIMIT),
            y: (y.floor() as i64).clamp(-WORLD_LIMIT, WORLD_LIMIT),
        }
    }

    /// Offsets the coordinate.
    #[must_use]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i64,
    /// Y coordinate in chunk space
    pub y: i64,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts to world coordinate (top-left corner of chunk).
    #[must_use]
    pub const fn to_world(self) -> WorldCoord {
        WorldCoord {
            x: self.x.saturating_mul(CHUNK_SIZE as i64),
            y: self.y.saturating_mul(CHUNK_SIZE as i64),
        }
    }

    /// Returns the region containing this chunk.
    #[must_use]
    pub const fn to_region(self) -> RegionCoord {
        let size = REGION_SIZE as i64;
        RegionCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }

    /// Chebyshev distance in chunks.
    #[must_use]
    pub const fn distance(self, other: Self) -> u64 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy {
            dx
        } else {
            dy
        }
    }

    /// World-space rectangle covered by this chunk.
    #[must_use]
    pub const fn bounds(self) -> WorldRect {
        let origin = self.to_world();
        WorldRect::new(origin.x, origin.y, CHUNK_SIZE as i64, CHUNK_SIZE as i64)
    }

    /// Map key in `"x,y"` form.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for ChunkCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = parse_pair(s)?;
        Ok(Self { x, y })
    }
}

/// Region coordinate (identifies a `REGION_SIZE` x `REGION_SIZE` block of chunks).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct RegionCoord {
    /// X coordinate in region space
    pub x: i64,
    /// Y coordinate in region space
    pub y: i64,
}

impl RegionCoord {
    /// Creates a new region coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// World coordinate of the region's top-left tile.
    #[must_use]
    pub const fn to_world(self) -> WorldCoord {
        WorldCoord {
            x: self.x.saturating_mul(REGION_TILE_SIZE as i64),
            y: self.y.saturating_mul(REGION_TILE_SIZE as i64),
        }
    }

    /// Chunk coordinate of the region's top-left chunk.
    #[must_use]
    pub const fn to_chunk(self) -> ChunkCoord {
        ChunkCoord {
            x: self.x.saturating_mul(REGION_SIZE as i64),
            y: self.y.saturating_mul(REGION_SIZE as i64),
        }
    }

    /// This region and its 8 neighbours, x-major.
    pub fn neighborhood(self) -> impl Iterator<Item = RegionCoord> {
        (-1..=1).flat_map(move |dx| (-1..=1).map(move |dy| Self::new(self.x + dx, self.y + dy)))
    }

    /// Map key in `"region_x,y"` form.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region_{},{}", self.x, self.y)
    }
}

impl FromStr for RegionCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("region_").ok_or(ParseCoordError)?;
        let (x, y) = parse_pair(rest)?;
        Ok(Self { x, y })
    }
}

/// Local coordinate within a chunk (0 to `CHUNK_SIZE - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LocalCoord {
    /// X coordinate within chunk
    pub x: u32,
    /// Y coordinate within chunk
    pub y: u32,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Converts to linear index for array access.
    #[must_use]
    pub const fn to_index(self) -> usize {
        (self.y as usize) * (CHUNK_SIZE as usize) + (self.x as usize)
    }

    /// Creates from linear index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        let size = CHUNK_SIZE as usize;
        Self {
            x: (index % size) as u32,
            y: (index / size) as u32,
        }
    }

    /// World coordinate of this cell inside `chunk`.
    #[must_use]
    pub const fn to_world(self, chunk: ChunkCoord) -> WorldCoord {
        let origin = chunk.to_world();
        WorldCoord {
            x: origin.x.saturating_add(self.x as i64),
            y: origin.y.saturating_add(self.y as i64),
        }
    }
}

/// Axis-aligned rectangle of world tiles, `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldRect {
    /// Left edge
    pub x: i64,
    /// Top edge
    pub y: i64,
    /// Width in tiles
    pub width: i64,
    /// Height in tiles
    pub height: i64,
}

impl WorldRect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle covering every tile in `cells`, or `None` if empty.
    #[must_use]
    pub fn covering(cells: impl IntoIterator<Item = WorldCoord>) -> Option<Self> {
        let mut iter = cells.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for c in iter {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        Some(Self::new(min.x, min.y, max.x - min.x + 1, max.y - min.y + 1))
    }

    /// Returns whether the rectangle has no tiles.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns whether the tile lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, p: WorldCoord) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Returns whether two rectangles share at least one tile.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Error returned when parsing a coordinate key fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed coordinate key")]
pub struct ParseCoordError;

fn parse_pair(s: &str) -> Result<(i64, i64), ParseCoordError> {
    let (x, y) = s.split_once(',').ok_or(ParseCoordError)?;
    let x = x.trim().parse().map_err(|_| ParseCoordError)?;
    let y = y.trim().parse().map_err(|_| ParseCoordError)?;
    Ok((x, y))
}

/// Returns whether `chunk`'s tile rectangle intersects `rect`.
#[must_use]
pub const fn chunk_overlaps_rect(chunk: ChunkCoord, rect: &WorldRect) -> bool {
    chunk.bounds().intersects(rect)
}

/// Every chunk whose tile rectangle intersects `rect`, x-major.
#[must_use]
pub fn chunks_overlapping_rect(rect: &WorldRect) -> Vec<ChunkCoord> {
    if rect.is_empty() {
        return Vec::new();
    }
    let start = WorldCoord::new(rect.x, rect.y).to_chunk();
    let end = WorldCoord::new(rect.x + rect.width - 1, rect.y + rect.height - 1).to_chunk();

    let mut chunks = Vec::new();
    for cx in start.x..=end.x {
        for cy in start.y..=end.y {
            chunks.push(ChunkCoord::new(cx, cy));
        }
    }
    chunks
}

/// Square (Chebyshev) neighbourhood of `center`, x-major.
#[must_use]
pub fn chunks_in_radius(center: ChunkCoord, radius: u32) -> Vec<ChunkCoord> {
    let r = i64::from(radius);
    let side = (2 * radius as usize) + 1;
    let mut chunks = Vec::with_capacity(side * side);
    for dx in -r..=r {
        for dy in -r..=r {
            chunks.push(ChunkCoord::new(center.x + dx, center.y + dy));
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_negative_world_floors_to_previous_chunk() {
        let w = WorldCoord::new(-1, -33);
        assert_eq!(w.to_chunk(), ChunkCoord::new(-1, -2));
        assert_eq!(w.to_local(), LocalCoord::new(31, 31));
        assert_eq!(w.to_region(), RegionCoord::new(-1, -1));
    }

    #[test]
    fn test_positions_clamp_to_world_limit() {
        assert_eq!(WorldCoord::from_position(-0.5, 2.9), WorldCoord::new(-1, 2));
        assert_eq!(
            WorldCoord::from_position(1e19, -1e19),
            WorldCoord::new(WORLD_LIMIT, -WORLD_LIMIT)
        );
        assert_eq!(WorldCoord::from_position(f64::NAN, 0.0), WorldCoord::new(0, 0));

        // Everything derived from the edge of the world stays representable.
        let edge = WorldCoord::from_position(f64::INFINITY, f64::NEG_INFINITY);
        for region in edge.to_region().neighborhood() {
            let origin = region.to_world();
            assert!(origin.x > 0 && origin.y < 0);
        }
        assert_eq!(WorldCoord::new(i64::MAX, 0).offset(1, 0).x, i64::MAX);
        assert_eq!(ChunkCoord::new(i64::MIN, 0).to_world().x, i64::MIN);
    }

    #[test]
    fn test_chunk_region_conversions() {
        assert_eq!(ChunkCoord::new(3, -1).to_region(), RegionCoord::new(0, -1));
        assert_eq!(ChunkCoord::new(-4, 4).to_region(), RegionCoord::new(-1, 1));
        assert_eq!(RegionCoord::new(-1, 2).to_chunk(), ChunkCoord::new(-4, 8));
        assert_eq!(RegionCoord::new(-1, 2).to_world(), WorldCoord::new(-128, 256));
    }

    #[test]
    fn test_keys_round_trip() {
        let c = ChunkCoord::new(-7, 12);
        assert_eq!(c.key(), "-7,12");
        assert_eq!("-7,12".parse::<ChunkCoord>(), Ok(c));

        let r = RegionCoord::new(3, -2);
        assert_eq!(r.key(), "region_3,-2");
        assert_eq!("region_3,-2".parse::<RegionCoord>(), Ok(r));
        assert!("3,-2".parse::<RegionCoord>().is_err());
        assert!("nope".parse::<ChunkCoord>().is_err());
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.distance(ChunkCoord::new(3, -5)), 5);
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn test_chunks_in_radius_is_square() {
        let chunks = chunks_in_radius(ChunkCoord::new(10, -10), 3);
        assert_eq!(chunks.len(), 49);
        assert!(chunks
            .iter()
            .all(|c| c.distance(ChunkCoord::new(10, -10)) <= 3));
    }

    #[test]
    fn test_neighborhood_has_nine_distinct_regions() {
        let n: Vec<_> = RegionCoord::new(0, 0).neighborhood().collect();
        assert_eq!(n.len(), 9);
        assert_eq!(n[0], RegionCoord::new(-1, -1));
        assert_eq!(n[4], RegionCoord::new(0, 0));
    }

    #[test]
    fn test_rect_across_chunk_boundary() {
        let rect = WorldRect::new(30, -2, 4, 4);
        let chunks = chunks_overlapping_rect(&rect);
        assert_eq!(
            chunks,
            vec![
                ChunkCoord::new(0, -1),
                ChunkCoord::new(0, 0),
                ChunkCoord::new(1, -1),
                ChunkCoord::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_covering_rect() {
        let rect = WorldRect::covering([
            WorldCoord::new(5, 2),
            WorldCoord::new(-1, 7),
            WorldCoord::new(3, 3),
        ])
        .expect("non-empty");
        assert_eq!(rect, WorldRect::new(-1, 2, 7, 6));
        assert!(WorldRect::covering(Vec::new()).is_none());
    }

    proptest! {
        #[test]
        fn prop_world_chunk_round_trip(x in -1_000_000_000i64..1_000_000_000, y in -1_000_000_000i64..1_000_000_000) {
            let w = WorldCoord::new(x, y);
            let local = w.to_local();
            prop_assert!(local.x < CHUNK_SIZE && local.y < CHUNK_SIZE);

            let origin = w.to_chunk().to_world();
            prop_assert_eq!(origin.x + i64::from(local.x), x);
            prop_assert_eq!(origin.y + i64::from(local.y), y);
            prop_assert!(origin.x <= x && x < origin.x + i64::from(CHUNK_SIZE));
            prop_assert_eq!(local.to_world(w.to_chunk()), w);
        }

        #[test]
        fn prop_region_contains_its_chunks(cx in -100_000i64..100_000, cy in -100_000i64..100_000) {
            let c = ChunkCoord::new(cx, cy);
            let origin = c.to_region().to_chunk();
            prop_assert!(origin.x <= cx && cx < origin.x + i64::from(REGION_SIZE));
            prop_assert!(origin.y <= cy && cy < origin.y + i64::from(REGION_SIZE));
            prop_assert_eq!(c.to_world().to_region(), c.to_region());
        }

        #[test]
        fn prop_overlap_list_matches_predicate(
            x in -200i64..200, y in -200i64..200, w in 1i64..70, h in 1i64..70,
        ) {
            let rect = WorldRect::new(x, y, w, h);
            let listed = chunks_overlapping_rect(&rect);
            for c in &listed {
                prop_assert!(chunk_overlaps_rect(*c, &rect));
            }
            let probe = WorldRect::new(x - 64, y - 64, w + 128, h + 128);
            for c in chunks_overlapping_rect(&probe) {
                prop_assert_eq!(chunk_overlaps_rect(c, &rect), listed.contains(&c));
            }
        }
    }
}
