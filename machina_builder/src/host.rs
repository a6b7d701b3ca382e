// Collaborator interfaces between the builder core and its host.
//
// The builder never owns the world. Everything it reads or mutates goes
// through the narrow traits below, so the core can run against the bundled
// `VoxelWorld` (see `world.rs`), a game server's block store, or a test fake:
//
// - `GridView`: cell classification, block writes, and relocation. Chest and
//   furnace cells expose their storage through `inventory()` and
//   `fuel_source_mut()`.
// - `Inventory`: ordered item slots (peek, take one).
// - `FuelSource`: burn one fuel unit, and set the lit/facing state.
// - `PlacementVeto`: simulated block placement so third-party policy (region
//   protection and the like) can deny a move or a build.
// - `Permissions`: capability checks for activation, deactivation, rotation.
//
// See also: `storage.rs` for `SlotInventory`/`FuelBin`, `policy.rs` for
// `ProtectedRegions`/`PermissionTable`.

use crate::storage::{ItemStack, LiftedBlock};
use crate::types::{Block, Classification, Face, Material, OperatorId, VoxelCoord};
use serde::{Deserialize, Serialize};

/// Read/write access to the voxel grid around a builder.
pub trait GridView {
    /// The block at a coordinate.
    fn block(&self, coord: VoxelCoord) -> Block;

    /// Overwrite a block's material and data. Attached storage survives only
    /// if the new material can still hold it.
    fn set_block(&mut self, coord: VoxelCoord, block: Block);

    /// Remove a block (and its attached storage), leaving air behind.
    fn lift_block(&mut self, coord: VoxelCoord) -> LiftedBlock;

    /// Put a previously lifted block down, replacing whatever was there.
    fn drop_block(&mut self, coord: VoxelCoord, lifted: LiftedBlock);

    /// Storage exposed by a container cell, if any.
    fn inventory(&self, coord: VoxelCoord) -> Option<&dyn Inventory>;

    fn inventory_mut(&mut self, coord: VoxelCoord) -> Option<&mut dyn Inventory>;

    /// Fuel exposed by a furnace cell, if any.
    fn fuel_source_mut(&mut self, coord: VoxelCoord) -> Option<&mut dyn FuelSource>;

    fn classify(&self, coord: VoxelCoord) -> Classification {
        self.block(coord).material.classify()
    }

    fn material(&self, coord: VoxelCoord) -> Material {
        self.block(coord).material
    }

    /// Move a block and its storage from `src` to `dst`; `src` becomes air.
    fn relocate_block(&mut self, src: VoxelCoord, dst: VoxelCoord) {
        let lifted = self.lift_block(src);
        self.drop_block(dst, lifted);
    }
}

/// An ordered list of item slots.
pub trait Inventory {
    fn slot_count(&self) -> usize;

    /// The stack in a slot, or `None` if the slot is empty or out of range.
    fn peek(&self, slot: usize) -> Option<ItemStack>;

    /// Remove one item from a slot, clearing it when the stack runs out.
    /// Returns the removed unit.
    fn take_one(&mut self, slot: usize) -> Option<ItemStack>;
}

/// A consumable energy supply (the builder's furnace).
pub trait FuelSource {
    /// Burn one fuel unit and return the ticks of energy it grants, or 0 if
    /// nothing is left to burn.
    fn consume_fuel(&mut self) -> u32;

    /// Set the lit state and the facing shown to observers.
    fn arm(&mut self, facing: Face, burning: bool);
}

/// Third-party placement policy.
pub trait PlacementVeto {
    /// Whether `operator` may place `material` at `target`, resting against
    /// `support`.
    fn can_place(
        &self,
        operator: OperatorId,
        target: VoxelCoord,
        material: Material,
        support: VoxelCoord,
    ) -> bool;
}

/// Operator capability lookup.
pub trait Permissions {
    fn has_capability(&self, operator: OperatorId, capability: Capability) -> bool;
}

/// Operator capabilities consulted by the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    Activate,
    DeactivateOwn,
    DeactivateAll,
    Rotate,
}

/// Veto and permission policy that allows everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl PlacementVeto for AllowAll {
    fn can_place(&self, _: OperatorId, _: VoxelCoord, _: Material, _: VoxelCoord) -> bool {
        true
    }
}

impl Permissions for AllowAll {
    fn has_capability(&self, _: OperatorId, _: Capability) -> bool {
        true
    }
}
