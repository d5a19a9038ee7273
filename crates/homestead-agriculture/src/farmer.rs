//! Farmer generation: roles, spawn positions, routes, schedules, dialogue.
//!
//! Farmers are produced in the farm's zone frame, like the [`Farm`] they
//! belong to. Everything is drawn from the caller's generator, so a farm
//! and a seed always produce the same people.

use homestead_common::SeededRng;
use serde::{Deserialize, Serialize};

use crate::biome::BiomeType;
use crate::farm::{BuildingKind, Farm, Waypoint, WaypointAction};

const FARMER_NAMES: &[&str] = &[
    "Tom", "Mary", "Will", "Sarah", "Jack", "Emma", "George", "Anne", "Henry", "Rose", "Peter",
    "Kate", "Sam", "Lucy", "Ben", "Molly",
];

/// What a farmer spends the day doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FarmerRole {
    /// Sows fields
    Planter,
    /// Brings in crops
    Harvester,
    /// Works the village mill
    Miller,
    /// Keeps water flowing
    Irrigator,
    /// A bit of everything
    Generalist,
}

/// Facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// North
    Up,
    /// South
    #[default]
    Down,
    /// West
    Left,
    /// East
    Right,
}

impl Direction {
    /// All facings.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Part of the day a schedule entry covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    /// Dawn
    Dawn,
    /// Morning
    Morning,
    /// Noon
    Noon,
    /// Afternoon
    Afternoon,
    /// Dusk
    Dusk,
    /// Night
    Night,
}

/// One slot of a farmer's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// When
    pub time: TimeOfDay,
    /// What
    pub action: &'static str,
    /// Where
    pub target: &'static str,
}

impl ScheduleEntry {
    const fn new(time: TimeOfDay, action: &'static str, target: &'static str) -> Self {
        Self {
            time,
            action,
            target,
        }
    }
}

/// A hardship the farm's surroundings impose on its crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TroubleKind {
    /// Far from water
    DrySoil,
    /// Vegetables too close to water
    SoggyGround,
    /// Nutrient-poor grain land
    PoorSoil,
    /// Grain that matures too late
    ShortSeason,
    /// Stony orchard hillside
    RockySoil,
    /// Insects in the vegetables
    PestPressure,
    /// Mixed farm default
    UnpredictableWeather,
}

impl TroubleKind {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TroubleKind::DrySoil => "Dry Soil",
            TroubleKind::SoggyGround => "Soggy Ground",
            TroubleKind::PoorSoil => "Poor Soil",
            TroubleKind::ShortSeason => "Short Season",
            TroubleKind::RockySoil => "Rocky Soil",
            TroubleKind::PestPressure => "Pest Pressure",
            TroubleKind::UnpredictableWeather => "Unpredictable Weather",
        }
    }

    /// Player-facing description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            TroubleKind::DrySoil => "The soil is too dry here. Crops need more water to thrive.",
            TroubleKind::SoggyGround => {
                "Too much water makes the soil muddy. Crops need better drainage."
            }
            TroubleKind::PoorSoil => {
                "The soil lacks nutrients. Grain yields are lower than expected."
            }
            TroubleKind::ShortSeason => {
                "The growing season is too short. Grain needs to mature faster."
            }
            TroubleKind::RockySoil => {
                "The hillside has rocky soil. Fruit trees struggle to take root."
            }
            TroubleKind::PestPressure => {
                "Insects are damaging the vegetables. Crops need resilience."
            }
            TroubleKind::UnpredictableWeather => "The weather changes too quickly. Crops must adapt.",
        }
    }

    /// Severity, 1 (mild) to 3.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            TroubleKind::ShortSeason | TroubleKind::UnpredictableWeather => 1,
            _ => 2,
        }
    }

    /// Seed stat bonuses that would solve the trouble.
    #[must_use]
    pub const fn stat_modifiers(self) -> &'static [(&'static str, i8)] {
        match self {
            TroubleKind::DrySoil => &[("hardiness", 2), ("efficiency", 1)],
            TroubleKind::SoggyGround => &[("hardiness", 2), ("speed", -1)],
            TroubleKind::PoorSoil => &[("yield", 2), ("efficiency", 1)],
            TroubleKind::ShortSeason => &[("speed", 2)],
            TroubleKind::RockySoil => &[("hardiness", 3), ("yield", 1)],
            TroubleKind::PestPressure => &[("hardiness", 2), ("yield", 1)],
            TroubleKind::UnpredictableWeather => &[("hardiness", 1), ("speed", 1)],
        }
    }

    /// Seed feature granted by solving the trouble.
    #[must_use]
    pub const fn grants_feature(self) -> &'static str {
        match self {
            TroubleKind::DrySoil => "Drought Resistant",
            TroubleKind::SoggyGround => "Waterlogged Tolerant",
            TroubleKind::PoorSoil => "Hardy Roots",
            TroubleKind::ShortSeason => "Fast Growing",
            TroubleKind::RockySoil => "Deep Roots",
            TroubleKind::PestPressure => "Pest Resistant",
            TroubleKind::UnpredictableWeather => "Adaptable",
        }
    }

    /// UI color as a hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            TroubleKind::DrySoil => "#d4a574",
            TroubleKind::SoggyGround => "#7a9eb5",
            TroubleKind::PoorSoil => "#8b7355",
            TroubleKind::ShortSeason => "#f4a460",
            TroubleKind::RockySoil => "#a0826d",
            TroubleKind::PestPressure => "#6b8e23",
            TroubleKind::UnpredictableWeather => "#b8b8b8",
        }
    }
}

/// A generated farmer, positioned in the farm's zone frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Farmer {
    /// X (zone frame)
    pub x: i64,
    /// Y (zone frame)
    pub y: i64,
    /// Sprite key
    pub sprite: &'static str,
    /// Initial facing
    pub direction: Direction,
    /// Given name
    pub name: &'static str,
    /// Role
    pub role: FarmerRole,
    /// Patrol route, starting and ending at home
    pub waypoints: Vec<Waypoint>,
    /// Daily schedule
    pub schedule: Vec<ScheduleEntry>,
    /// Dialogue lines, greeting first
    pub dialogue: Vec<String>,
    /// Optional hardship
    pub trouble: Option<TroubleKind>,
}

/// Generates the farmers working `farm`: two for villages, one or two for homesteads.
pub fn generate_farmers_for_farm(farm: &Farm, rng: &mut SeededRng) -> Vec<Farmer> {
    let count = if farm.zone.is_village {
        2
    } else {
        rng.below(2) + 1
    };

    (0..count)
        .map(|index| {
            let role = select_role(farm, index, rng);
            create_farmer(farm, role, rng)
        })
        .collect()
}

fn select_role(farm: &Farm, index: u32, rng: &mut SeededRng) -> FarmerRole {
    if index == 0 {
        return FarmerRole::Planter;
    }

    if farm.zone.is_village {
        if farm.building(BuildingKind::Mill).is_some() && rng.above(0.5) {
            return FarmerRole::Miller;
        }
        return if rng.above(0.5) {
            FarmerRole::Harvester
        } else {
            FarmerRole::Planter
        };
    }

    if farm.zone.biome == BiomeType::Vegetable {
        return if rng.above(0.6) {
            FarmerRole::Irrigator
        } else {
            FarmerRole::Generalist
        };
    }

    if rng.above(0.5) {
        FarmerRole::Harvester
    } else {
        FarmerRole::Generalist
    }
}

fn create_farmer(farm: &Farm, role: FarmerRole, rng: &mut SeededRng) -> Farmer {
    let name = rng.pick(FARMER_NAMES).copied().unwrap_or("Tom");
    let sprite = if rng.above(0.5) {
        "farmer man"
    } else {
        "farmer woman"
    };
    let (x, y) = spawn_position(farm, rng);
    let direction = rng.pick(&Direction::ALL).copied().unwrap_or_default();
    let trouble = generate_trouble(farm, rng);
    let dialogue = generate_dialogue(role, farm.zone.biome, trouble, rng);

    Farmer {
        x,
        y,
        sprite,
        direction,
        name,
        role,
        waypoints: generate_waypoints(farm, role),
        schedule: generate_schedule(role),
        dialogue,
        trouble,
    }
}

/// Near a field, inside a building, or at the farmhouse door.
fn spawn_position(farm: &Farm, rng: &mut SeededRng) -> (i64, i64) {
    if rng.above(0.5) && !farm.fields.is_empty() {
        let field = farm.fields[rng.below(farm.fields.len() as u32) as usize];
        let dx = i64::from(rng.above(0.5));
        let dy = i64::from(rng.above(0.5));
        return (field.x + dx, field.y + dy);
    }

    if rng.above(0.4) && farm.buildings.len() > 1 {
        let building = &farm.buildings[rng.below(farm.buildings.len() as u32) as usize];
        let x = building.x + i64::from(rng.below(building.width as u32));
        let y = building.y + i64::from(rng.below(building.height as u32));
        return (x, y);
    }

    if let Some(house) = farm.farmhouse() {
        let dx = i64::from(!rng.above(0.5));
        let dy = i64::from(!rng.above(0.5));
        return (house.x + dx, house.y + dy);
    }

    let zone = &farm.zone;
    let x = zone.x + i64::from(rng.below(zone.width.min(5) as u32)) + 2;
    let y = zone.y + i64::from(rng.below(zone.height.min(5) as u32)) + 2;
    (x, y)
}

fn generate_waypoints(farm: &Farm, role: FarmerRole) -> Vec<Waypoint> {
    let house = farm.farmhouse();
    let barn = farm.building(BuildingKind::Barn);
    let mill = farm.building(BuildingKind::Mill);
    let well = farm.building(BuildingKind::Well);
    let fields = &farm.fields;

    let mut route = Vec::new();
    if let Some(h) = house {
        route.push(Waypoint::with_action(h.x + 1, h.y + 1, WaypointAction::Home));
    }

    match role {
        FarmerRole::Planter | FarmerRole::Harvester => {
            if let (Some(first), Some(last)) = (fields.first(), fields.last()) {
                let middle = fields[fields.len() / 2];
                for f in [first, &middle, last] {
                    route.push(Waypoint::with_action(f.x, f.y, WaypointAction::Work));
                }
            }
        }
        FarmerRole::Miller => {
            if let Some(m) = mill {
                route.push(Waypoint::with_action(m.x + 1, m.y + 1, WaypointAction::Mill));
            }
            if let Some(b) = barn {
                route.push(Waypoint::with_action(b.x + 1, b.y + 1, WaypointAction::Storage));
            }
        }
        FarmerRole::Irrigator => {
            if let Some(w) = well {
                route.push(Waypoint::with_action(w.x, w.y, WaypointAction::Water));
            }
            if let Some(f) = fields.first() {
                route.push(Waypoint::with_action(f.x, f.y, WaypointAction::Irrigate));
            }
        }
        FarmerRole::Generalist => {
            if let Some(b) = barn {
                route.push(Waypoint::at(b.x + 1, b.y + 1));
            }
            if let Some(f) = fields.first() {
                route.push(Waypoint::at(f.x, f.y));
            }
            if let Some(w) = well {
                route.push(Waypoint::at(w.x, w.y));
            }
        }
    }

    if let Some(h) = house {
        route.push(Waypoint::with_action(h.x + 1, h.y + 1, WaypointAction::Home));
    }
    route
}

fn generate_schedule(role: FarmerRole) -> Vec<ScheduleEntry> {
    let (morning, afternoon) = match role {
        FarmerRole::Planter => (("plant", "fields"), ("plant", "fields")),
        FarmerRole::Harvester => (("harvest", "fields"), ("harvest", "fields")),
        FarmerRole::Miller => (("grind", "mill"), ("grind", "mill")),
        FarmerRole::Irrigator => (("water", "fields"), ("maintain", "irrigation")),
        FarmerRole::Generalist => (("work", "fields"), ("work", "fields")),
    };

    vec![
        ScheduleEntry::new(TimeOfDay::Dawn, "wake", "farmhouse"),
        ScheduleEntry::new(TimeOfDay::Morning, morning.0, morning.1),
        ScheduleEntry::new(TimeOfDay::Noon, "rest", "farmhouse"),
        ScheduleEntry::new(TimeOfDay::Afternoon, afternoon.0, afternoon.1),
        ScheduleEntry::new(TimeOfDay::Dusk, "return", "farmhouse"),
        ScheduleEntry::new(TimeOfDay::Night, "sleep", "farmhouse"),
    ]
}

/// 60% of farms have a trouble; the rest only want better yields.
fn generate_trouble(farm: &Farm, rng: &mut SeededRng) -> Option<TroubleKind> {
    if rng.above(0.6) {
        return None;
    }

    let biome = farm.zone.biome;
    let water = farm.zone.water_proximity;
    if water < 0.3 && biome != BiomeType::Orchard {
        return Some(TroubleKind::DrySoil);
    }
    if water > 0.7 && biome == BiomeType::Vegetable {
        return Some(TroubleKind::SoggyGround);
    }

    Some(match biome {
        BiomeType::Grain => *rng
            .pick(&[TroubleKind::PoorSoil, TroubleKind::ShortSeason])
            .unwrap_or(&TroubleKind::PoorSoil),
        BiomeType::Orchard => TroubleKind::RockySoil,
        BiomeType::Vegetable => TroubleKind::PestPressure,
        BiomeType::Mixed => TroubleKind::UnpredictableWeather,
    })
}

const GREETINGS: &[&str] = &[
    "Good day to you!",
    "Fine weather we're having.",
    "Hard work, but honest work.",
    "Ah, a traveler!",
    "Welcome to our farm.",
    "Greetings, stranger.",
];

const HINTS: &[&str] = &[
    "Old ways don't always work anymore.",
    "Sometimes I wonder if different seeds might fare better.",
    "The old varieties struggle these days.",
];

const CASUAL: &[&str] = &[
    "Can't complain. The crops do well enough.",
    "We get by just fine.",
    "The land provides.",
    "Some years are better than others, but we manage.",
];

fn role_lines(role: FarmerRole) -> &'static [[&'static str; 2]] {
    match role {
        FarmerRole::Planter => &[
            [
                "Been working these fields for years now.",
                "The soil tells you what it needs, if you listen.",
            ],
            [
                "Each seed has its own character.",
                "Some take to the ground better than others.",
            ],
            [
                "Planting season keeps me busy from dawn to dusk.",
                "But there's satisfaction in the work.",
            ],
        ],
        FarmerRole::Harvester => &[
            [
                "The harvest determines everything.",
                "A good yield means we eat well through winter.",
            ],
            [
                "Been watching the crops carefully.",
                "They're coming along, slowly but surely.",
            ],
            [
                "There's an art to knowing when to harvest.",
                "Too early or too late ruins everything.",
            ],
        ],
        FarmerRole::Miller => &[
            [
                "The mill's been in my family for generations.",
                "Grain from all around comes through here.",
            ],
            [
                "I can tell the quality of grain just by the sound it makes.",
                "Each type has its own voice.",
            ],
            [
                "Grinding grain is simple work, but important.",
                "Without flour, there's no bread.",
            ],
        ],
        FarmerRole::Irrigator => &[
            ["Water is everything in farming.", "Without it, nothing grows."],
            [
                "I maintain the channels and keep the water flowing.",
                "Simple work, but crucial.",
            ],
            [
                "The crops drink deep when properly watered.",
                "You can see the difference in days.",
            ],
        ],
        FarmerRole::Generalist => &[
            [
                "A bit of everything on this farm.",
                "Keeps life interesting, never the same day twice.",
            ],
            [
                "Farm work never truly ends.",
                "Always something needing attention.",
            ],
            [
                "Been farming all my life.",
                "Wouldn't know what else to do.",
            ],
        ],
    }
}

fn biome_lines(biome: BiomeType) -> &'static [&'static str] {
    match biome {
        BiomeType::Grain => &[
            "The grain fields go on for acres.",
            "Wheat and barley, mostly. Good reliable crops.",
            "These fields have fed the region for generations.",
        ],
        BiomeType::Orchard => &[
            "The fruit trees are beautiful in spring.",
            "Takes years for a tree to bear fruit, but worth the wait.",
            "The hillside gives the fruit a particular sweetness.",
        ],
        BiomeType::Vegetable => &[
            "We grow a variety here. Carrots, onions, potatoes.",
            "Root vegetables do well in this soil.",
            "Fresh vegetables fetch good prices at market.",
        ],
        BiomeType::Mixed => &[
            "We grow whatever seems to thrive.",
            "A little of this, a little of that.",
            "Variety keeps the soil healthy, they say.",
        ],
    }
}

fn generate_dialogue(
    role: FarmerRole,
    biome: BiomeType,
    trouble: Option<TroubleKind>,
    rng: &mut SeededRng,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(6);
    let mut say = |line: Option<&&str>| {
        if let Some(line) = line {
            lines.push((*line).to_owned());
        }
    };

    say(rng.pick(GREETINGS));
    if let Some(pair) = rng.pick(role_lines(role)) {
        for line in pair {
            say(Some(line));
        }
    }
    say(rng.pick(biome_lines(biome)));

    match trouble {
        Some(trouble) => {
            let name = trouble.name().to_lowercase();
            let intros = [
                format!("The {name} has been... challenging."),
                format!("We manage, despite the {name}."),
                trouble.description().to_owned(),
                format!("It's not easy with the {name} we have here."),
            ];
            if let Some(intro) = rng.pick(&intros) {
                lines.push(intro.clone());
            }
            if rng.above(0.5) {
                if let Some(hint) = rng.pick(HINTS) {
                    lines.push((*hint).to_owned());
                }
            }
        }
        None => {
            let hopeful = rng.above(0.7);
            if let Some(line) = rng.pick(CASUAL) {
                lines.push((*line).to_owned());
            }
            if hopeful && rng.above(0.6) {
                lines.push("Though better yields never hurt anyone.".to_owned());
            }
        }
    }

    // Greeting stays first; the rest is lightly shuffled.
    if lines.len() > 2 {
        let rest = &mut lines[1..];
        for i in (1..rest.len()).rev() {
            if rng.above(0.5) {
                let j = rng.below(i as u32 + 1) as usize;
                rest.swap(i, j);
            }
        }
    }
    lines
}
