// machina_builder: a self-propelled bridge builder for voxel worlds.
//
// A builder is a small block structure (wooden anchor, lever, furnace,
// chest, iron "heads") that, once activated, crawls forward one cell at a
// time and drops blocks from its chest into the gaps below its heads. It
// burns fuel from its furnace to pay for every move and every placed block.
//
// The core never owns the world: everything it touches goes through the
// collaborator traits in `host.rs`, and a host drives it by calling
// `Builder::heartbeat()` on its own clock.
//
// Module overview:
// - `types.rs`:     VoxelCoord, Offset, Face, Yaw, Material, Block, ids.
// - `blueprint.rs`: Blueprint data model, key-cell handles, the builder pattern.
// - `detect.rs`:    Pattern matching an activation gesture against the grid.
// - `host.rs`:      GridView / Inventory / FuelSource / PlacementVeto / Permissions.
// - `storage.rs`:   SlotInventory (chests), FuelBin (furnaces), block entities.
// - `world.rs`:     VoxelWorld, the bundled dense-grid `GridView`.
// - `policy.rs`:    ProtectedRegions veto and PermissionTable.
// - `energy.rs`:    EnergyLedger, the fuel-backed tick budget.
// - `builder.rs`:   Builder lifecycle and the heartbeat state machine.
// - `movement.rs`:  Moving and rotating the structure.
// - `build.rs`:     Build-target search and block placement.
// - `sim.rs`:       BuilderSim, a discrete-event host scheduler.
// - `event.rs`:     HeartbeatQueue (due-tick order) + narrative SimEvents.
// - `command.rs`:   SimCommand / SimAction, operator requests.
// - `config.rs`:    MachinaConfig + BuilderConfig, all tunable parameters.
// - `error.rs`:     BuilderError, ConfigError.
// - `scenario.rs`:  Rig layout helpers and the demo world.
// - `logging.rs`:   env_logger setup for the headless runner.
//
// **Determinism.** Given the same world and commands, the sim produces the
// same events: `BTreeMap` registries, a `(tick, sequence)` ordered event
// queue, and fully sorted relocation order. Hash sets are only used for
// membership tests.

pub mod blueprint;
pub mod build;
pub mod builder;
pub mod command;
pub mod config;
pub mod detect;
pub mod energy;
pub mod error;
pub mod event;
pub mod host;
pub mod logging;
pub mod movement;
pub mod policy;
pub mod scenario;
pub mod sim;
pub mod storage;
pub mod types;
pub mod world;
