// Operator commands into the builder simulation.
//
// All external requests go through `SimCommand`: an operator, the tick at
// which to apply it, and a `SimAction`. Current actions:
// - `Activate`: the activation gesture on an anchor block; runs detection
//   and, on a match, starts a builder.
// - `Deactivate`: shut a builder down (permission-checked).
// - `Rotate`: turn a builder in place (permission- and collision-checked).
//
// Rejected commands are logged and otherwise ignored.
//
// See also: `sim.rs` for `apply_command()`.

use crate::types::{BuilderId, Face, OperatorId, VoxelCoord, Yaw};
use serde::{Deserialize, Serialize};

/// An operator-issued command targeting a specific simulation tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimCommand {
    pub operator: OperatorId,
    pub tick: u64,
    pub action: SimAction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimAction {
    /// The activation gesture on `anchor`'s `activation_face`.
    Activate {
        anchor: VoxelCoord,
        activation_face: Face,
    },
    Deactivate { builder_id: BuilderId },
    /// Turn by `delta` quarter turns (clockwise seen from above).
    Rotate { builder_id: BuilderId, delta: Yaw },
}
