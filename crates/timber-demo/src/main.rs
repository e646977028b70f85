//! Timber demo: chops down an in-memory tree and reports what happened.
//!
//! Wires the config, logging, grid, and chopping crates together the way
//! a host integration would: load config, resolve the tool blacklist and
//! multipliers once, build a `Feller`, then swing until the tree falls.

use std::path::PathBuf;

use clap::Parser;
use glam::IVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use timber_chop::{ChopSettings, Feller, scan_tree};
use timber_config::{CliArgs, Config};
use timber_grid::{Actor, AllowAll, Grid, MemoryGrid, Tool};
use tracing::{info, warn};

const MAX_SWINGS: u32 = 64;

/// A 6-block trunk with a 5×5×2 canopy, roughly an oak.
fn plant_tree(grid: &mut MemoryGrid, base: IVec3) {
    for y in 0..6 {
        grid.place_log(base + IVec3::new(0, y, 0));
    }
    for y in 4..6 {
        for x in -2..=2 {
            for z in -2..=2 {
                let pos = base + IVec3::new(x, y + 1, z);
                if grid.block_state(pos) == timber_grid::BlockState::AIR {
                    grid.place_leaf(pos);
                }
            }
        }
    }
}

fn main() {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}; falling back to defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);
    if let Err(err) = config.validate() {
        eprintln!("invalid configuration: {err}");
        std::process::exit(1);
    }

    timber_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    let blacklist = config.resolve_blacklist();
    let mut tool = Tool::plain("iron_axe");
    tool.chops_per_use = config.chop_multiplier_for(&tool.id);
    if !blacklist.can_chop_with(&tool.id) {
        warn!(tool = %tool.id, "tool is blacklisted from chopping");
        return;
    }

    let mut grid = MemoryGrid::new();
    grid.xp_per_log = 1;
    let base = IVec3::new(0, 64, 0);
    plant_tree(&mut grid, base);

    let feller = Feller::new(
        config.tree_detection.to_limits(),
        config.chop_counting.to_counting(),
        config.compatibility.prevent_chop_recursion,
    );
    let settings = ChopSettings {
        break_leaves: config.tree_detection.break_leaves,
        ..ChopSettings::default()
    };
    let actor = Actor::named("demo");
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let tree = scan_tree(&grid, base, feller.limits(), true);
    info!(logs = tree.size(), leaves = tree.leaves.len(), "tree detected");

    for swing in 1..=MAX_SWINGS {
        let result = feller.chop(
            &mut grid,
            &AllowAll,
            &settings,
            base,
            &actor,
            &tool,
            &mut rng,
        );
        if result.is_felling() {
            info!(swing, "tree felled");
            break;
        }
        if result.is_ignored() {
            warn!(swing, "chop ignored, giving up");
            break;
        }
        info!(swing, progress = grid.chop_progress(base), "chopped");
    }

    info!(
        harvested = grid.harvests.len(),
        effects = grid.effects.len(),
        experience = grid.experience.iter().map(|&(_, xp)| xp).sum::<u32>(),
        remaining_blocks = grid.block_count(),
        "done"
    );
}
