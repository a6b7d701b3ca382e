// Structural recognition: is there a builder at this anchor, and which way
// does it face?
//
// Detection runs when an operator performs the activation gesture (flipping
// the lever on top of the wooden anchor block). It is read-only:
//
// 1. Fail fast if the operator lacks `Capability::Activate`, before reading
//    the grid at all.
// 2. The gesture must be on the anchor's top face, the anchor must be wood
//    with the lever above it, and the cell below the anchor must be solid.
// 3. Search the four horizontal neighbors for an unlit furnace. The builder
//    faces away from it; the pattern is asymmetric, so at most one yaw can
//    match. The rest of the base module (head in front, chest above the
//    head) must match under that yaw.
// 4. Probe each side module: its head cell must be iron *and* the whole
//    module footprint must match.
//
// See also: `blueprint.rs` for the pattern, `builder.rs` for
// `Builder::activate()` which turns a `Detection` into a running builder.

use crate::blueprint::{
    BURNING_FURNACE_MATERIAL, FURNACE_MATERIAL, HEAD_MATERIAL, ModuleId, ModuleSet,
    builder_blueprint,
};
use crate::error::BuilderError;
use crate::host::{Capability, GridView, Permissions};
use crate::types::{Face, Material, OperatorId, VoxelCoord, Yaw};
use serde::{Deserialize, Serialize};

/// A recognized builder structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub anchor: VoxelCoord,
    pub yaw: Yaw,
    pub modules: ModuleSet,
}

/// Whether a grid material satisfies a blueprint cell. A burning-furnace
/// cell also accepts an unlit furnace, since builders are detected cold.
fn cell_matches(expected: Material, actual: Material) -> bool {
    actual == expected || (expected == BURNING_FURNACE_MATERIAL && actual == FURNACE_MATERIAL)
}

/// Whether every cell of `module`, rotated for `yaw` and placed at
/// `anchor`, holds the expected material.
pub fn detect_module<G: GridView + ?Sized>(
    grid: &G,
    anchor: VoxelCoord,
    yaw: Yaw,
    module: ModuleId,
) -> bool {
    builder_blueprint()
        .blueprint
        .footprint(module, yaw)
        .iter()
        .all(|cell| cell_matches(cell.material, grid.material(anchor.offset(cell.offset))))
}

/// Look for a builder anchored at `anchor`.
pub fn detect<G, P>(
    grid: &G,
    permissions: &P,
    operator: OperatorId,
    anchor: VoxelCoord,
    activation_face: Face,
) -> Result<Detection, BuilderError>
where
    G: GridView + ?Sized,
    P: Permissions + ?Sized,
{
    if !permissions.has_capability(operator, Capability::Activate) {
        return Err(BuilderError::PermissionDenied);
    }
    if activation_face != Face::Up {
        return Err(BuilderError::NoStructuralMatch);
    }
    if !grid.classify(anchor.below()).is_solid() {
        return Err(BuilderError::Unsupported);
    }

    let bp = builder_blueprint();
    for toward_furnace in Yaw::ALL {
        if grid.material(anchor.relative(toward_furnace.facing())) != FURNACE_MATERIAL {
            continue;
        }
        let yaw = toward_furnace.opposite();
        if !detect_module(grid, anchor, yaw, ModuleId::Base) {
            continue;
        }

        let primary_head = bp.resolve(anchor, bp.primary_head, yaw, ModuleId::Base);
        let mut modules = ModuleSet::base_only();
        for (module, side) in [(ModuleId::Left, yaw.left()), (ModuleId::Right, yaw.right())] {
            let probe = primary_head.relative(side.facing());
            if grid.material(probe) == HEAD_MATERIAL && detect_module(grid, anchor, yaw, module) {
                modules.insert(module);
            }
        }
        log::debug!("detected builder at {anchor} facing {yaw:?} with {modules:?}");
        return Ok(Detection {
            anchor,
            yaw,
            modules,
        });
    }
    Err(BuilderError::NoStructuralMatch)
}
