// Headless runner for the machina builder.
//
// Builds the demo scene from `scenario.rs` (a stone plain with a trench
// across the builder's path), activates one builder through `BuilderSim`,
// runs it for a number of ticks, and prints every narrative event plus a
// final summary.
//
// Usage:
//   machina_headless [OPTIONS]
//     --ticks <N>       Ticks to simulate (default: 2000)
//     --config <PATH>   JSON config file (default: built-in defaults)
//     --left            Add the left side module
//     --right           Add the right side module
//     --fuel <N>        Coal in the furnace (default: 8)
//     --stock <N>       Cobblestone in the chest (default: 64)
//     --verbose, -v     Debug logging

use std::path::PathBuf;

use machina_builder::blueprint::{ModuleId, ModuleSet};
use machina_builder::command::{SimAction, SimCommand};
use machina_builder::config::MachinaConfig;
use machina_builder::logging;
use machina_builder::scenario::{RIG_OPERATOR, RigSpec, demo_world};
use machina_builder::sim::BuilderSim;
use machina_builder::storage::ItemStack;
use machina_builder::types::{Face, Material, VoxelCoord, Yaw};

struct Options {
    ticks: u64,
    config_path: Option<PathBuf>,
    modules: ModuleSet,
    fuel: u32,
    stock: u32,
    verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ticks: 2000,
            config_path: None,
            modules: ModuleSet::base_only(),
            fuel: 8,
            stock: 64,
            verbose: false,
        }
    }
}

fn main() {
    let options = parse_args();
    logging::init(options.verbose);

    let config = match &options.config_path {
        Some(path) => MachinaConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => MachinaConfig::default(),
    };

    let (sx, sy, sz) = config.world_size;
    let anchor = VoxelCoord::new(sx as i32 / 4, sy as i32 / 2, sz as i32 / 2);
    let spec = RigSpec::new(anchor, Yaw::East)
        .with_modules(options.modules)
        .with_fuel(Some(ItemStack::new(Material::Coal, options.fuel)))
        .with_stock(vec![ItemStack::new(Material::Cobblestone, options.stock)])
        .with_pit_depth(0);

    let world = demo_world(config.world_size, &spec);
    let mut sim = BuilderSim::new(config, world);
    sim.permissions.grant_all(RIG_OPERATOR);

    let activate = SimCommand {
        operator: RIG_OPERATOR,
        tick: 1,
        action: SimAction::Activate {
            anchor,
            activation_face: Face::Up,
        },
    };
    let result = sim.step(&[activate], options.ticks);
    for event in &result.events {
        println!("[{:>6}] {:?}", event.tick, event.kind);
    }

    println!();
    println!("Ran {} ticks, {} events.", options.ticks, result.events.len());
    for (id, builder) in sim.builders() {
        println!(
            "Builder {id}: anchor {} facing {:?}, energy {}, queued {:?}",
            builder.anchor(),
            builder.yaw(),
            builder.energy_balance(),
            builder.queued_target()
        );
    }
}

/// Parse command-line arguments with plain `std::env::args()` matching.
fn parse_args() -> Options {
    let mut options = Options::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--ticks" => {
                i += 1;
                options.ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--ticks requires a valid number");
                    std::process::exit(1);
                });
            }
            "--config" => {
                i += 1;
                options.config_path = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--left" => options.modules.insert(ModuleId::Left),
            "--right" => options.modules.insert(ModuleId::Right),
            "--fuel" => {
                i += 1;
                options.fuel = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--fuel requires a valid number");
                    std::process::exit(1);
                });
            }
            "--stock" => {
                i += 1;
                options.stock = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--stock requires a valid number");
                    std::process::exit(1);
                });
            }
            "--verbose" | "-v" => options.verbose = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_usage() {
    println!("Usage: machina_headless [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --ticks <N>       Ticks to simulate (default: 2000)");
    println!("  --config <PATH>   JSON config file (default: built-in defaults)");
    println!("  --left            Add the left side module");
    println!("  --right           Add the right side module");
    println!("  --fuel <N>        Coal in the furnace (default: 8)");
    println!("  --stock <N>       Cobblestone in the chest (default: 64)");
    println!("  --verbose, -v     Debug logging");
    println!("  --help, -h        Show this help");
}
