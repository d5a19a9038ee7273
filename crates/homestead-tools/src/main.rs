//! # Homestead View
//!
//! Prints an ASCII map of the world around the spawn point, followed by the
//! farmers on the map and a stats line.
//!
//! ```text
//! homestead-view --seed 42 --radius 24
//! RUST_LOG=homestead=debug homestead-view --config streaming.toml
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use homestead_common::{HomesteadResult, WorldCoord, WorldSeed};
use homestead_world::{ChunkManager, Npc, StreamingConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a Homestead world as ASCII", long_about = None)]
struct Args {
    /// World seed
    #[arg(long, default_value_t = 42)]
    seed: u32,
    /// Half-width of the rendered square, in tiles
    #[arg(long, default_value_t = 24)]
    radius: i64,
    /// Streaming settings (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let text = match &args.config {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        None => None,
    };
    let mut world = open_world(args.seed, text.as_deref()).context("creating world")?;

    world.update(0.0, 0.0);
    let spawn = world.find_spawn_point();
    world.update(spawn.x as f64, spawn.y as f64);
    info!(x = spawn.x, y = spawn.y, "spawn point");

    let radius = args.radius.max(0);
    print!("{}", render(&mut world, spawn, radius));

    for npc in world
        .all_loaded_npcs()
        .filter(|n| n.tile().x.abs_diff(spawn.x) <= radius as u64)
        .filter(|n| n.tile().y.abs_diff(spawn.y) <= radius as u64)
    {
        println!("{}", describe(npc));
    }

    let stats = world.stats();
    println!(
        "seed {} | chunks {} | regions {} | farms {} | npcs {} active, {} dormant",
        args.seed,
        stats.loaded_chunks,
        stats.loaded_regions,
        stats.loaded_farms,
        stats.active_npcs,
        stats.dormant_npcs,
    );

    world
        .verify_invariants()
        .context("NPC bookkeeping is inconsistent")?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homestead=info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Builds a world from an optional TOML streaming config.
fn open_world(seed: u32, config: Option<&str>) -> HomesteadResult<ChunkManager> {
    let config = match config {
        Some(text) => StreamingConfig::from_toml_str(text)?,
        None => StreamingConfig::default(),
    };
    Ok(ChunkManager::new(WorldSeed::new(seed), config)?)
}

/// Draws the square around `center`; `S` marks the spawn point, `@` an NPC.
///
/// Reading tiles loads chunks outside the streaming pass, so a large radius
/// can briefly exceed the chunk budget. The world is streamed around
/// `center` again afterwards, which trims it back.
fn render(world: &mut ChunkManager, center: WorldCoord, radius: i64) -> String {
    let npcs: HashSet<WorldCoord> = world.all_loaded_npcs().map(Npc::tile).collect();

    let mut out = String::new();
    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            let at = WorldCoord::new(x, y);
            let glyph = if at == center {
                'S'
            } else if npcs.contains(&at) {
                '@'
            } else {
                world.tile(at).glyph()
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    world.update(center.x as f64, center.y as f64);
    out
}

/// One line per farmer: who, where, and what would fix their trouble.
fn describe(npc: &Npc) -> String {
    let at = npc.tile();
    let mut line = format!("{} {} ({:?}) at {},{}", npc.id, npc.name, npc.role, at.x, at.y);
    if let Some(trouble) = npc.trouble {
        let wants: Vec<String> = trouble
            .stat_modifiers()
            .iter()
            .map(|(stat, bonus)| format!("{stat} {bonus:+}"))
            .collect();
        line.push_str(&format!(
            " | {}: wants {} ({})",
            trouble.name(),
            trouble.grants_feature(),
            wants.join(", ")
        ));
    }
    line
}
