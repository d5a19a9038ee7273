//! Biome classification and terrain analysis for farm placement.
//!
//! Two paths pick a biome. The infinite world classifies each farm cell from
//! its distance to the region's water bodies and never reports hills. The
//! standalone map path runs [`analyze_terrain_for_farms`] over a finished
//! tile grid, which can detect hills and so is the only way an orchard is
//! produced.

use homestead_common::{SeededRng, Tile, WorldRect};
use serde::{Deserialize, Serialize};

/// Smallest flat area (per side) that can hold a farm.
pub const MIN_FARM_AREA_SIDE: i64 = 8;

/// Distance at which water stops contributing on the standalone map path.
pub const MAP_WATER_FALLOFF: f64 = 20.0;

/// Share of an area's perimeter that must be wall for it to count as hilly.
const HILL_PERIMETER_RATIO: f64 = 0.3;

/// Agricultural character of a farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeType {
    /// Wheat, barley, oats
    Grain,
    /// Fruit trees on slopes
    Orchard,
    /// Root and leaf vegetables near water
    Vegetable,
    /// A bit of everything
    Mixed,
}

/// A rectangle chosen for a farm, with the classification that drives its layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmZone {
    /// Left edge in the caller's frame
    pub x: i64,
    /// Top edge in the caller's frame
    pub y: i64,
    /// Width in tiles
    pub width: i64,
    /// Height in tiles
    pub height: i64,
    /// Biome
    pub biome: BiomeType,
    /// 0 (far from water) to 1 (at the water's edge)
    pub water_proximity: f64,
    /// Ranking score, higher is better
    pub suitability: f64,
    /// Village sites get the shared-facility layout
    pub is_village: bool,
}

impl FarmZone {
    /// Zone rectangle in the caller's frame.
    #[must_use]
    pub const fn rect(&self) -> WorldRect {
        WorldRect::new(self.x, self.y, self.width, self.height)
    }
}

/// Converts a distance to the nearest water into a 0..=1 proximity score.
#[must_use]
pub fn water_proximity(distance: f64, falloff: f64) -> f64 {
    (1.0 - distance / falloff).max(0.0)
}

/// Picks a biome from water proximity and hilliness using the tiered table.
///
/// Hills always become orchards. Near water (> 0.6): 70% vegetable, 30% grain.
/// Medium (> 0.3): 60% grain, 30% vegetable, 10% mixed. Far: 40% grain,
/// 30% mixed, 30% vegetable.
pub fn determine_biome(water_proximity: f64, is_hilly: bool, rng: &mut SeededRng) -> BiomeType {
    if is_hilly {
        return BiomeType::Orchard;
    }

    if water_proximity > 0.6 {
        return if rng.above(0.3) {
            BiomeType::Vegetable
        } else {
            BiomeType::Grain
        };
    }

    let roll = rng.next_f64();
    if water_proximity > 0.3 {
        if roll > 0.4 {
            BiomeType::Grain
        } else if roll > 0.1 {
            BiomeType::Vegetable
        } else {
            BiomeType::Mixed
        }
    } else if roll > 0.6 {
        BiomeType::Grain
    } else if roll > 0.3 {
        BiomeType::Mixed
    } else {
        BiomeType::Vegetable
    }
}

/// What the analyzer found in a tile grid.
#[derive(Debug, Clone, Default)]
pub struct TerrainAnalysis {
    /// Bounding boxes of contiguous grass/dirt areas at least 8x8
    pub flat_areas: Vec<WorldRect>,
    /// Every water tile
    pub water_tiles: Vec<(i64, i64)>,
    /// Flat areas whose perimeter is mostly wall
    pub hill_areas: Vec<WorldRect>,
}

/// Read-only view of a row-major tile grid.
#[derive(Debug, Clone, Copy)]
pub struct TileGrid<'a> {
    tiles: &'a [Tile],
    width: usize,
    height: usize,
}

impl<'a> TileGrid<'a> {
    /// Wraps a row-major slice; returns `None` if the size does not match.
    #[must_use]
    pub fn new(tiles: &'a [Tile], width: usize, height: usize) -> Option<Self> {
        (tiles.len() == width * height).then_some(Self {
            tiles,
            width,
            height,
        })
    }

    /// Tile at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> Option<Tile> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.tiles.get(y as usize * self.width + x as usize).copied()
    }
}

/// Scans a grid for flat areas, water, and hills.
#[must_use]
pub fn analyze_terrain(grid: &TileGrid<'_>) -> TerrainAnalysis {
    let mut analysis = TerrainAnalysis::default();
    let (w, h) = (grid.width as i64, grid.height as i64);

    for y in 0..h {
        for x in 0..w {
            if grid.get(x, y) == Some(Tile::Water) {
                analysis.water_tiles.push((x, y));
            }
        }
    }

    let mut visited = vec![false; grid.width * grid.height];
    for y in 0..h {
        for x in 0..w {
            let idx = y as usize * grid.width + x as usize;
            if visited[idx] || !grid.get(x, y).is_some_and(Tile::is_flat) {
                continue;
            }
            let area = flood_fill_flat_area(grid, &mut visited, x, y);
            if area.width >= MIN_FARM_AREA_SIDE && area.height >= MIN_FARM_AREA_SIDE {
                analysis.flat_areas.push(area);
            }
        }
    }

    analysis.hill_areas = analysis
        .flat_areas
        .iter()
        .filter(|area| has_elevation_variation(grid, area))
        .copied()
        .collect();

    analysis
}

fn flood_fill_flat_area(
    grid: &TileGrid<'_>,
    visited: &mut [bool],
    start_x: i64,
    start_y: i64,
) -> WorldRect {
    let mut stack = vec![(start_x, start_y)];
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (start_x, start_x, start_y, start_y);

    while let Some((x, y)) = stack.pop() {
        if !grid.get(x, y).is_some_and(Tile::is_flat) {
            continue;
        }
        let idx = y as usize * grid.width + x as usize;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        stack.extend([(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]);
    }

    WorldRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

/// Walls just outside an area's edges stand in for elevation data.
fn has_elevation_variation(grid: &TileGrid<'_>, area: &WorldRect) -> bool {
    let is_wall = |x: i64, y: i64| grid.get(x, y) == Some(Tile::Wall);
    let mut obstacles = 0usize;

    for i in 0..area.width {
        obstacles += usize::from(is_wall(area.x + i, area.y - 1));
        obstacles += usize::from(is_wall(area.x + i, area.y + area.height));
    }
    for i in 0..area.height {
        obstacles += usize::from(is_wall(area.x - 1, area.y + i));
        obstacles += usize::from(is_wall(area.x + area.width, area.y + i));
    }

    let perimeter = ((area.width + area.height) * 2) as f64;
    obstacles as f64 / perimeter > HILL_PERIMETER_RATIO
}

fn nearest_water_distance(area: &WorldRect, water: &[(i64, i64)]) -> Option<f64> {
    let cx = area.x as f64 + area.width as f64 / 2.0;
    let cy = area.y as f64 + area.height as f64 / 2.0;
    water
        .iter()
        .map(|&(wx, wy)| (wx as f64 - cx).hypot(wy as f64 - cy))
        .reduce(f64::min)
}

fn suitability(area: &WorldRect, water_proximity: f64, is_hilly: bool) -> f64 {
    let size = (area.width * area.height) as f64;
    let size_score = (size / 200.0).min(1.0) * 40.0;
    let terrain_score = if is_hilly { 20.0 } else { 30.0 };
    size_score + water_proximity * 30.0 + terrain_score
}

/// Turns a finished map into candidate farm zones, best first.
///
/// Zones come back with `is_village == false`; see
/// [`crate::village::select_village_and_homestead_sites`].
pub fn analyze_terrain_for_farms(grid: &TileGrid<'_>, rng: &mut SeededRng) -> Vec<FarmZone> {
    let analysis = analyze_terrain(grid);

    let mut zones: Vec<FarmZone> = analysis
        .flat_areas
        .iter()
        .map(|area| {
            let proximity = nearest_water_distance(area, &analysis.water_tiles)
                .map_or(0.0, |d| water_proximity(d, MAP_WATER_FALLOFF));
            let is_hilly = analysis.hill_areas.iter().any(|hill| hill.intersects(area));
            FarmZone {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height,
                biome: determine_biome(proximity, is_hilly, rng),
                water_proximity: proximity,
                suitability: suitability(area, proximity, is_hilly),
                is_village: false,
            }
        })
        .collect();

    zones.sort_by(|a, b| b.suitability.total_cmp(&a.suitability));
    zones
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(width: usize, height: usize, f: impl Fn(usize, usize) -> Tile) -> Vec<Tile> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect()
    }

    #[test]
    fn test_hills_are_always_orchards() {
        let mut rng = SeededRng::new(1);
        for p in [0.0, 0.5, 1.0] {
            assert_eq!(determine_biome(p, true, &mut rng), BiomeType::Orchard);
        }
    }

    #[test]
    fn test_flat_biomes_never_orchard() {
        let mut rng = SeededRng::new(99);
        for i in 0..300 {
            let p = f64::from(i % 10) / 10.0;
            assert_ne!(determine_biome(p, false, &mut rng), BiomeType::Orchard);
        }
    }

    #[test]
    fn test_wet_zones_skew_vegetable() {
        let mut rng = SeededRng::new(5);
        let veg = (0..1000)
            .filter(|_| determine_biome(0.9, false, &mut rng) == BiomeType::Vegetable)
            .count();
        assert!((600..800).contains(&veg), "vegetable count {veg}");
    }

    #[test]
    fn test_water_proximity_clamps() {
        assert!((water_proximity(0.0, 20.0) - 1.0).abs() < f64::EPSILON);
        assert!((water_proximity(10.0, 20.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(water_proximity(50.0, 20.0), 0.0);
    }

    #[test]
    fn test_open_field_is_one_flat_area() {
        let tiles = grid_with(16, 12, |_, _| Tile::Grass);
        let grid = TileGrid::new(&tiles, 16, 12).expect("size");
        let analysis = analyze_terrain(&grid);
        assert_eq!(analysis.flat_areas, vec![WorldRect::new(0, 0, 16, 12)]);
        assert!(analysis.water_tiles.is_empty());
        assert!(analysis.hill_areas.is_empty());
    }

    #[test]
    fn test_walled_area_is_hilly_orchard() {
        // A 10x10 meadow ringed by wall.
        let tiles = grid_with(12, 12, |x, y| {
            if x == 0 || y == 0 || x == 11 || y == 11 {
                Tile::Wall
            } else {
                Tile::Grass
            }
        });
        let grid = TileGrid::new(&tiles, 12, 12).expect("size");
        let mut rng = SeededRng::new(3);
        let zones = analyze_terrain_for_farms(&grid, &mut rng);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].biome, BiomeType::Orchard);
        assert_eq!(zones[0].rect(), WorldRect::new(1, 1, 10, 10));
    }

    #[test]
    fn test_small_areas_are_ignored() {
        let tiles = grid_with(20, 20, |x, _| if x == 5 { Tile::Wall } else { Tile::Dirt });
        let grid = TileGrid::new(&tiles, 20, 20).expect("size");
        let analysis = analyze_terrain(&grid);
        // Left strip is 5 wide, right strip 14 wide.
        assert_eq!(analysis.flat_areas, vec![WorldRect::new(6, 0, 14, 20)]);
    }

    #[test]
    fn test_zones_sorted_by_suitability_and_water_counts() {
        let tiles = grid_with(30, 10, |x, y| match (x, y) {
            (9 | 10, _) => Tile::Wall,
            (29, 0) => Tile::Water,
            _ => Tile::Grass,
        });
        let grid = TileGrid::new(&tiles, 30, 10).expect("size");
        let mut rng = SeededRng::new(8);
        let zones = analyze_terrain_for_farms(&grid, &mut rng);
        assert_eq!(zones.len(), 2);
        assert!(zones[0].suitability >= zones[1].suitability);
        assert!(zones[0].water_proximity > zones[1].water_proximity);
    }

    #[test]
    fn test_grid_rejects_bad_size() {
        let tiles = vec![Tile::Grass; 10];
        assert!(TileGrid::new(&tiles, 3, 3).is_none());
    }
}
