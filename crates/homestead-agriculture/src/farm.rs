//! Farm layout generation.
//!
//! A [`Farm`] is laid out in the coordinate frame of its [`FarmZone`]: a
//! building at `(zone.x + 1, zone.y + 1)` sits one tile in from the zone's
//! corner. Callers anchoring a farm in the world translate by
//! `world_origin - (zone.x, zone.y)`.

use homestead_common::{SeededRng, Tile, WorldCoord, WorldRect};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::biome::{BiomeType, FarmZone};
use crate::crops::Crop;
use crate::village::VillageFacilities;

/// Largest farm interior per side.
const MAX_FARM_SIDE: i64 = 12;

/// Homesteads at least this close to water dig irrigation channels.
const IRRIGATION_PROXIMITY: f64 = 0.6;

/// Kind of farm building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Where the farmers live; anchors NPC spawning
    Farmhouse,
    /// Animal and tool barn
    Barn,
    /// Grain silo
    Silo,
    /// Storehouse
    Storage,
    /// Village grain mill
    Mill,
    /// Water well
    Well,
    /// Tool shed
    Shed,
}

impl BuildingKind {
    /// Tile stamped over the building's footprint.
    #[must_use]
    pub const fn tile(self) -> Tile {
        match self {
            BuildingKind::Farmhouse
            | BuildingKind::Barn
            | BuildingKind::Silo
            | BuildingKind::Storage
            | BuildingKind::Mill => Tile::Wall,
            BuildingKind::Well | BuildingKind::Shed => Tile::Table,
        }
    }
}

/// A rectangular building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Building kind
    pub kind: BuildingKind,
    /// Left edge (zone frame)
    pub x: i64,
    /// Top edge (zone frame)
    pub y: i64,
    /// Width in tiles
    pub width: i64,
    /// Height in tiles
    pub height: i64,
}

impl Building {
    /// Footprint rectangle (zone frame).
    #[must_use]
    pub const fn rect(&self) -> WorldRect {
        WorldRect::new(self.x, self.y, self.width, self.height)
    }
}

/// One plowed field tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// X (zone frame)
    pub x: i64,
    /// Y (zone frame)
    pub y: i64,
    /// Crop planted here
    pub crop: Crop,
}

/// Kind of decorative farm infrastructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfrastructureKind {
    /// Perimeter fence
    Fence,
    /// Irrigation channel
    Irrigation,
    /// Trodden path
    Path,
    /// Orchard tree
    Orchard,
}

impl InfrastructureKind {
    /// Tile stamped for this infrastructure.
    #[must_use]
    pub const fn tile(self) -> Tile {
        match self {
            InfrastructureKind::Fence => Tile::Fence,
            InfrastructureKind::Irrigation => Tile::Water,
            InfrastructureKind::Path => Tile::Dirt,
            InfrastructureKind::Orchard => Tile::OrchardTree,
        }
    }
}

/// One infrastructure tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    /// Kind
    pub kind: InfrastructureKind,
    /// X (zone frame)
    pub x: i64,
    /// Y (zone frame)
    pub y: i64,
}

/// What a farmer does at a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointAction {
    /// Go home
    Home,
    /// Field work
    Work,
    /// Grind at the mill
    Mill,
    /// Store goods
    Storage,
    /// Fetch water
    Water,
    /// Irrigate fields
    Irrigate,
}

/// A point on a walking route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    /// X (zone frame)
    pub x: i64,
    /// Y (zone frame)
    pub y: i64,
    /// Optional action
    pub action: Option<WaypointAction>,
}

impl Waypoint {
    /// Waypoint without an action.
    #[must_use]
    pub const fn at(x: i64, y: i64) -> Self {
        Self { x, y, action: None }
    }

    /// Waypoint with an action.
    #[must_use]
    pub const fn with_action(x: i64, y: i64, action: WaypointAction) -> Self {
        Self {
            x,
            y,
            action: Some(action),
        }
    }
}

/// How a stamped cell interacts with what is already on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampLayer {
    /// Buildings and fields: always overwrite
    Structure,
    /// Fences and the like: never overwrite a wall or table
    Infrastructure,
}

/// A single tile a farm writes, in zone frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmCell {
    /// Position (zone frame)
    pub at: WorldCoord,
    /// Tile to stamp
    pub tile: Tile,
    /// Overwrite rule
    pub layer: StampLayer,
}

/// A generated farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    /// Zone the farm was laid out in
    pub zone: FarmZone,
    /// Buildings
    pub buildings: Vec<Building>,
    /// Field tiles
    pub fields: Vec<Field>,
    /// Infrastructure tiles
    pub infrastructure: Vec<Infrastructure>,
    /// Walking paths
    pub paths: Vec<Waypoint>,
}

impl Farm {
    /// First building of `kind`.
    #[must_use]
    pub fn building(&self, kind: BuildingKind) -> Option<&Building> {
        self.buildings.iter().find(|b| b.kind == kind)
    }

    /// The farmhouse, if the layout has one.
    #[must_use]
    pub fn farmhouse(&self) -> Option<&Building> {
        self.building(BuildingKind::Farmhouse)
    }

    /// Every tile the farm writes, buildings first, then fields, then infrastructure.
    pub fn footprint(&self) -> impl Iterator<Item = FarmCell> + '_ {
        let buildings = self.buildings.iter().flat_map(|b| {
            let tile = b.kind.tile();
            (0..b.height).flat_map(move |dy| {
                (0..b.width).map(move |dx| FarmCell {
                    at: WorldCoord::new(b.x + dx, b.y + dy),
                    tile,
                    layer: StampLayer::Structure,
                })
            })
        });
        let fields = self.fields.iter().map(|f| FarmCell {
            at: WorldCoord::new(f.x, f.y),
            tile: Tile::Plowed,
            layer: StampLayer::Structure,
        });
        let infrastructure = self.infrastructure.iter().map(|i| FarmCell {
            at: WorldCoord::new(i.x, i.y),
            tile: i.kind.tile(),
            layer: StampLayer::Infrastructure,
        });
        buildings.chain(fields).chain(infrastructure)
    }

    /// Smallest rectangle (zone frame) covering every tile the farm writes.
    #[must_use]
    pub fn bounds(&self) -> Option<WorldRect> {
        WorldRect::covering(self.footprint().map(|c| c.at))
    }
}

/// Lays out a farm inside `zone`: villages get shared facilities, other
/// zones become self-sufficient homesteads.
pub fn generate_farm(zone: FarmZone, rng: &mut SeededRng) -> Farm {
    let mut farm = Farm {
        zone,
        buildings: Vec::new(),
        fields: Vec::new(),
        infrastructure: Vec::new(),
        paths: Vec::new(),
    };

    if farm.zone.is_village {
        lay_out_village(&mut farm, rng);
    } else {
        lay_out_homestead(&mut farm, rng);
    }

    trace!(
        village = farm.zone.is_village,
        biome = ?farm.zone.biome,
        buildings = farm.buildings.len(),
        fields = farm.fields.len(),
        "laid out farm"
    );
    farm
}

fn lay_out_village(farm: &mut Farm, rng: &mut SeededRng) {
    let width = MAX_FARM_SIDE.min(farm.zone.width - 2);
    let height = MAX_FARM_SIDE.min(farm.zone.height - 2);
    let start_x = farm.zone.x + 1;
    let start_y = farm.zone.y + 1;

    farm.buildings.push(Building {
        kind: BuildingKind::Farmhouse,
        x: start_x,
        y: start_y,
        width: 2,
        height: 2,
    });
    farm.buildings.push(Building {
        kind: BuildingKind::Barn,
        x: start_x + 2,
        y: start_y,
        width: 2,
        height: 2,
    });

    // 3x3 plots below the houses.
    let field_y = start_y + 2;
    let plots_wide = 3.min(((width - 4) / 3).max(0));
    let plots_tall = 2.min(((height - 3) / 3).max(0));
    for row in 0..plots_tall {
        for col in 0..plots_wide {
            let crop = Crop::random_for_biome(farm.zone.biome, rng);
            let plot_x = start_x + col * 3;
            let plot_y = field_y + row * 3;
            for dy in 0..3 {
                for dx in 0..3 {
                    farm.fields.push(Field {
                        x: plot_x + dx,
                        y: plot_y + dy,
                        crop,
                    });
                }
            }
        }
    }

    // Lane along the bottom of the plots.
    let lane_y = field_y + plots_tall * 3;
    if lane_y < start_y + height {
        for x in start_x..start_x + width {
            farm.infrastructure.push(Infrastructure {
                kind: InfrastructureKind::Path,
                x,
                y: lane_y,
            });
        }
    }

    add_fence_perimeter(farm, start_x, start_y, width, height);

    for i in 0..4 {
        farm.paths.push(Waypoint::at(start_x + 1, start_y + 2 + i));
    }

    let facilities = VillageFacilities::roll(rng);
    let facility_x = start_x + width + 2;
    if facilities.mill {
        farm.buildings.push(Building {
            kind: BuildingKind::Mill,
            x: facility_x,
            y: start_y,
            width: 3,
            height: 3,
        });
    }
    if facilities.well {
        farm.buildings.push(Building {
            kind: BuildingKind::Well,
            x: facility_x,
            y: start_y + 4,
            width: 1,
            height: 1,
        });
    }
}

fn lay_out_homestead(farm: &mut Farm, rng: &mut SeededRng) {
    let width = MAX_FARM_SIDE.min(farm.zone.width - 2);
    let height = MAX_FARM_SIDE.min(farm.zone.height - 2);
    let start_x = farm.zone.x + 1;
    let start_y = farm.zone.y + 1;

    for (kind, dx, w, h) in [
        (BuildingKind::Silo, 0, 1, 2),
        (BuildingKind::Farmhouse, 1, 2, 2),
        (BuildingKind::Barn, 3, 2, 2),
    ] {
        farm.buildings.push(Building {
            kind,
            x: start_x + dx,
            y: start_y,
            width: w,
            height: h,
        });
    }

    let field_y = start_y + 2;
    let field_width = 9.min(width - 3);
    let rows = 3.min(((height - 4) / 3).max(0));
    for row in 0..rows {
        for x in 0..field_width {
            farm.fields.push(Field {
                x: start_x + x,
                y: field_y + row * 3,
                crop: Crop::random_for_biome(farm.zone.biome, rng),
            });
        }
    }

    // Gaps between field rows: a channel on wet land, then a lane.
    let irrigated = farm.zone.water_proximity >= IRRIGATION_PROXIMITY;
    for row in 0..(rows - 1).max(0) {
        let row_y = field_y + row * 3;
        for x in start_x..start_x + field_width {
            if irrigated {
                farm.infrastructure.push(Infrastructure {
                    kind: InfrastructureKind::Irrigation,
                    x,
                    y: row_y + 1,
                });
            }
            farm.infrastructure.push(Infrastructure {
                kind: InfrastructureKind::Path,
                x,
                y: row_y + 2,
            });
        }
    }

    farm.buildings.push(Building {
        kind: BuildingKind::Shed,
        x: start_x + width - 1,
        y: field_y,
        width: 1,
        height: 1,
    });
    farm.buildings.push(Building {
        kind: BuildingKind::Well,
        x: start_x + width - 1,
        y: field_y + 3,
        width: 1,
        height: 1,
    });

    if matches!(farm.zone.biome, BiomeType::Orchard | BiomeType::Mixed) {
        let orchard_y = field_y + rows * 3;
        for x in 0..6.min(field_width) {
            farm.infrastructure.push(Infrastructure {
                kind: InfrastructureKind::Orchard,
                x: start_x + x,
                y: orchard_y,
            });
        }
    }

    add_fence_perimeter(farm, start_x, start_y, width, height);

    farm.paths.push(Waypoint::at(start_x + 2, start_y + 2));
    farm.paths.push(Waypoint::at(start_x + 2, field_y));
    farm.paths.push(Waypoint::at(start_x + 4, start_y + 2));
}

/// Fence one tile outside the interior, corners left open.
fn add_fence_perimeter(farm: &mut Farm, start_x: i64, start_y: i64, width: i64, height: i64) {
    let fence = |x, y| Infrastructure {
        kind: InfrastructureKind::Fence,
        x,
        y,
    };
    for x in start_x..start_x + width {
        farm.infrastructure.push(fence(x, start_y - 1));
        farm.infrastructure.push(fence(x, start_y + height));
    }
    for y in start_y..start_y + height {
        farm.infrastructure.push(fence(start_x - 1, y));
        farm.infrastructure.push(fence(start_x + width, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(is_village: bool, biome: BiomeType) -> FarmZone {
        FarmZone {
            x: 13,
            y: 13,
            width: 16,
            height: 16,
            biome,
            water_proximity: 0.5,
            suitability: 65.0,
            is_village,
        }
    }

    #[test]
    fn test_homestead_layout() {
        let mut rng = SeededRng::new(42);
        let farm = generate_farm(zone(false, BiomeType::Grain), &mut rng);

        let house = farm.farmhouse().expect("farmhouse");
        assert_eq!((house.x, house.y, house.width, house.height), (15, 14, 2, 2));
        assert!(farm.building(BuildingKind::Silo).is_some());
        assert!(farm.building(BuildingKind::Shed).is_some());
        assert!(farm.building(BuildingKind::Well).is_some());
        // Two rows of nine field tiles.
        assert_eq!(farm.fields.len(), 18);
        // Dry enough that the gap between the rows is only a lane.
        let kinds: Vec<_> = farm.infrastructure.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&InfrastructureKind::Fence));
        assert!(!kinds.contains(&InfrastructureKind::Irrigation));
        let lane: Vec<_> = farm
            .infrastructure
            .iter()
            .filter(|i| i.kind == InfrastructureKind::Path)
            .collect();
        assert_eq!(lane.len(), 9);
        assert!(lane.iter().all(|i| i.y == 18));
        assert_eq!(farm.paths.len(), 3);
    }

    #[test]
    fn test_wet_homestead_is_irrigated() {
        let mut wet = zone(false, BiomeType::Vegetable);
        wet.water_proximity = 0.8;
        let farm = generate_farm(wet, &mut SeededRng::new(42));

        let channel: Vec<_> = farm
            .infrastructure
            .iter()
            .filter(|i| i.kind == InfrastructureKind::Irrigation)
            .collect();
        assert_eq!(channel.len(), 9);
        assert!(channel.iter().all(|i| i.y == 17));
        assert_eq!(InfrastructureKind::Irrigation.tile(), Tile::Water);

        // Channels run beside fields, never over them.
        assert!(channel
            .iter()
            .all(|c| !farm.fields.iter().any(|f| (f.x, f.y) == (c.x, c.y))));
        assert!(channel
            .iter()
            .any(|c| farm.fields.iter().any(|f| f.x == c.x && f.y == c.y - 1)));
    }

    #[test]
    fn test_village_lane_runs_below_plots() {
        let farm = generate_farm(zone(true, BiomeType::Grain), &mut SeededRng::new(7));
        let lane: Vec<_> = farm
            .infrastructure
            .iter()
            .filter(|i| i.kind == InfrastructureKind::Path)
            .collect();
        let lowest_field = farm.fields.iter().map(|f| f.y).max().expect("fields");
        assert_eq!(lane.len(), 12);
        assert!(lane.iter().all(|i| i.y == lowest_field + 1));
    }

    #[test]
    fn test_mixed_homestead_has_orchard_row() {
        let mut rng = SeededRng::new(42);
        let farm = generate_farm(zone(false, BiomeType::Mixed), &mut rng);
        let trees = farm
            .infrastructure
            .iter()
            .filter(|i| i.kind == InfrastructureKind::Orchard)
            .count();
        assert_eq!(trees, 6);
    }

    #[test]
    fn test_village_layout() {
        let mut rng = SeededRng::new(7);
        let farm = generate_farm(zone(true, BiomeType::Vegetable), &mut rng);

        assert!(farm.farmhouse().is_some());
        assert!(farm.building(BuildingKind::Barn).is_some());
        // 2x2 plots of 3x3 tiles.
        assert_eq!(farm.fields.len(), 36);
        assert!(farm.building(BuildingKind::Well).is_some());
        assert_eq!(farm.paths.len(), 4);
        assert!(farm.fields.iter().all(|f| f.crop.biome() == BiomeType::Vegetable));
    }

    #[test]
    fn test_fence_leaves_corners_open() {
        let mut rng = SeededRng::new(1);
        let farm = generate_farm(zone(false, BiomeType::Grain), &mut rng);
        let fenced = |x, y| farm.infrastructure.iter().any(|i| i.x == x && i.y == y);
        assert!(!fenced(13, 13));
        assert!(fenced(14, 13));
        assert!(fenced(13, 14));
        assert!(fenced(26, 20));
    }

    #[test]
    fn test_bounds_cover_footprint() {
        let mut rng = SeededRng::new(9);
        for is_village in [false, true] {
            let farm = generate_farm(zone(is_village, BiomeType::Grain), &mut rng);
            let bounds = farm.bounds().expect("non-empty farm");
            assert!(farm.footprint().all(|c| bounds.contains(c.at)));
            assert_eq!((bounds.x, bounds.y), (13, 13));
        }
    }

    #[test]
    fn test_footprint_order_and_layers() {
        let mut rng = SeededRng::new(3);
        let farm = generate_farm(zone(false, BiomeType::Grain), &mut rng);
        let cells: Vec<_> = farm.footprint().collect();
        let first_infra = cells
            .iter()
            .position(|c| c.layer == StampLayer::Infrastructure)
            .expect("fence");
        assert!(cells[..first_infra]
            .iter()
            .all(|c| c.layer == StampLayer::Structure));
        assert!(cells[first_infra..]
            .iter()
            .all(|c| c.layer == StampLayer::Infrastructure));
    }

    #[test]
    fn test_same_seed_same_farm() {
        let a = generate_farm(zone(true, BiomeType::Grain), &mut SeededRng::new(5));
        let b = generate_farm(zone(true, BiomeType::Grain), &mut SeededRng::new(5));
        assert_eq!(a, b);
    }
}
