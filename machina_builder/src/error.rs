// Error types for the builder core and its configuration.
//
// Every `BuilderError` is an expected, recoverable outcome: the action that
// hit it did nothing, and the builder is still structurally intact. The
// heartbeat absorbs these into "no event this tick" (see `builder.rs`); only
// hosts that want the reason call `try_heartbeat()` directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a builder action did not happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BuilderError {
    /// No valid blueprint instance at the probed location.
    #[error("no builder structure matches at this location")]
    NoStructuralMatch,
    /// The fuel source ran dry before enough energy was collected.
    #[error("not enough fuel to pay for the action")]
    InsufficientEnergy,
    /// Onboard storage holds no placeable solid block.
    #[error("no placeable material left in storage")]
    InsufficientMaterial,
    /// The placement-veto collaborator rejected the simulated placement.
    #[error("placement denied by policy")]
    PlacementDenied,
    /// A collision or a non-solid occupant blocks the action.
    #[error("path is obstructed")]
    Obstructed,
    /// No solid ground where the builder needs it.
    #[error("no solid ground beneath the target")]
    Unsupported,
    /// The operator lacks the capability the request needs.
    #[error("operator lacks the required capability")]
    PermissionDenied,
}

/// Failure to load a `MachinaConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}
