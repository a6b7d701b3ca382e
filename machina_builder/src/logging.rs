// Logger setup for the headless runner.
//
// The library only emits through the `log` facade; binaries pick the
// backend. `RUST_LOG` overrides the level chosen here.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialize the global logger: debug level when `verbose`, info
/// otherwise.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // Fails only if a logger is already installed; tests may call this more
    // than once.
    let _ = Builder::from_env(env).try_init();
}
