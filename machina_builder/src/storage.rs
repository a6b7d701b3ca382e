// Onboard storage: item stacks, chest-style slot inventories, and the
// furnace fuel bin.
//
// These are the reference implementations of the `Inventory` and
// `FuelSource` collaborator traits (see `host.rs`). The host grid keeps them
// as `BlockEntity` values attached to the chest and furnace cells, and moves
// them together with their block whenever the builder relocates (see
// `LiftedBlock` and `VoxelWorld::lift_block()`).
//
// See also: `energy.rs` for the ledger that drains `FuelBin`, `build.rs`
// for the slot scan over `SlotInventory`.

use crate::host::{FuelSource, Inventory};
use crate::types::{Block, Face, Material};
use serde::{Deserialize, Serialize};

/// Slot count of a single chest.
pub const CHEST_SLOTS: usize = 27;

/// A stack of identical items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: Material,
    pub count: u32,
    /// Data value carried onto the placed block.
    pub variant: u8,
}

impl ItemStack {
    pub const fn new(material: Material, count: u32) -> Self {
        Self {
            material,
            count,
            variant: 0,
        }
    }

    pub const fn with_variant(material: Material, count: u32, variant: u8) -> Self {
        Self {
            material,
            count,
            variant,
        }
    }
}

// ---------------------------------------------------------------------------
// Slot inventory
// ---------------------------------------------------------------------------

/// An ordered list of item slots, each empty or holding one stack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
}

impl SlotInventory {
    /// Create an inventory with `slot_count` empty slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// A chest-sized inventory filled front to back with the given stacks.
    pub fn chest_with(stacks: &[ItemStack]) -> Self {
        let mut inventory = Self::new(CHEST_SLOTS.max(stacks.len()));
        for (slot, stack) in stacks.iter().enumerate() {
            inventory.set(slot, Some(*stack));
        }
        inventory
    }

    /// Overwrite a slot. Out-of-range slots are ignored; zero-count stacks
    /// clear the slot.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = stack.filter(|s| s.count > 0);
        }
    }

    /// Total number of items of the given material across all slots.
    pub fn count_of(&self, material: Material) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.material == material)
            .map(|s| s.count)
            .sum()
    }

    /// Total number of items across all slots.
    pub fn total_items(&self) -> u32 {
        self.slots.iter().flatten().map(|s| s.count).sum()
    }
}

impl Inventory for SlotInventory {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn peek(&self, slot: usize) -> Option<ItemStack> {
        self.slots.get(slot).copied().flatten().filter(|s| s.count > 0)
    }

    /// Remove one item. A zero-count stack is cleared and yields nothing.
    fn take_one(&mut self, slot: usize) -> Option<ItemStack> {
        let entry = self.slots.get_mut(slot)?;
        let stack = entry.as_mut()?;
        if stack.count == 0 {
            *entry = None;
            return None;
        }
        stack.count -= 1;
        let taken = ItemStack::with_variant(stack.material, 1, stack.variant);
        if stack.count == 0 {
            *entry = None;
        }
        Some(taken)
    }
}

// ---------------------------------------------------------------------------
// Fuel bin
// ---------------------------------------------------------------------------

/// The fuel slot of a furnace, plus its lit state and facing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelBin {
    fuel: Option<ItemStack>,
    burning: bool,
    facing: Face,
}

impl FuelBin {
    pub fn new(fuel: Option<ItemStack>) -> Self {
        Self {
            fuel: fuel.filter(|s| s.count > 0),
            burning: false,
            facing: Face::North,
        }
    }

    pub fn fuel(&self) -> Option<ItemStack> {
        self.fuel
    }

    pub fn is_burning(&self) -> bool {
        self.burning
    }

    pub fn facing(&self) -> Face {
        self.facing
    }
}

impl Default for FuelBin {
    fn default() -> Self {
        Self::new(None)
    }
}

impl FuelSource for FuelBin {
    /// Burn one unit of fuel. Non-fuel items in the slot are left alone and
    /// yield nothing; a zero-count stack is cleared.
    fn consume_fuel(&mut self) -> u32 {
        let Some(stack) = self.fuel.as_mut() else {
            return 0;
        };
        if stack.count == 0 {
            self.fuel = None;
            return 0;
        }
        let Some(ticks) = stack.material.burn_ticks() else {
            return 0;
        };
        stack.count -= 1;
        if stack.count == 0 {
            self.fuel = None;
        }
        ticks
    }

    fn arm(&mut self, facing: Face, burning: bool) {
        self.facing = facing;
        self.burning = burning;
    }
}

// ---------------------------------------------------------------------------
// Block entities
// ---------------------------------------------------------------------------

/// Extra state attached to a grid cell beyond its material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockEntity {
    Container(SlotInventory),
    Furnace(FuelBin),
}

/// A block taken out of the grid, carrying any attached entity, ready to be
/// dropped somewhere else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiftedBlock {
    pub block: Block,
    pub entity: Option<BlockEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_one_decrements_then_clears() {
        let mut inv = SlotInventory::new(3);
        inv.set(1, Some(ItemStack::new(Material::Cobblestone, 2)));

        let taken = inv.take_one(1).unwrap();
        assert_eq!(taken.count, 1);
        assert_eq!(inv.peek(1).unwrap().count, 1);

        inv.take_one(1).unwrap();
        assert_eq!(inv.peek(1), None);
        assert_eq!(inv.take_one(1), None);
    }

    #[test]
    fn take_one_out_of_range_is_none() {
        let mut inv = SlotInventory::new(2);
        assert_eq!(inv.take_one(5), None);
        assert_eq!(inv.peek(5), None);
    }

    #[test]
    fn chest_with_fills_front_slots() {
        let inv = SlotInventory::chest_with(&[
            ItemStack::new(Material::Coal, 4),
            ItemStack::new(Material::Dirt, 10),
        ]);
        assert_eq!(inv.slot_count(), CHEST_SLOTS);
        assert_eq!(inv.peek(0).unwrap().material, Material::Coal);
        assert_eq!(inv.count_of(Material::Dirt), 10);
        assert_eq!(inv.total_items(), 14);
    }

    #[test]
    fn fuel_bin_burns_one_unit_per_call() {
        let mut bin = FuelBin::new(Some(ItemStack::new(Material::Coal, 2)));
        assert_eq!(bin.consume_fuel(), 1600);
        assert_eq!(bin.consume_fuel(), 1600);
        assert_eq!(bin.consume_fuel(), 0);
        assert_eq!(bin.fuel(), None);
    }

    #[test]
    fn fuel_bin_ignores_non_fuel() {
        let mut bin = FuelBin::new(Some(ItemStack::new(Material::Cobblestone, 5)));
        assert_eq!(bin.consume_fuel(), 0);
        assert_eq!(bin.fuel().unwrap().count, 5);
    }

    #[test]
    fn zero_count_slot_reads_as_empty() {
        let json = r#"{"slots":[{"material":"Stone","count":0,"variant":0},null]}"#;
        let mut inv: SlotInventory = serde_json::from_str(json).unwrap();
        assert_eq!(inv.peek(0), None);
        assert_eq!(inv.take_one(0), None);
        assert_eq!(inv.slot_count(), 2);
    }

    #[test]
    fn zero_count_fuel_yields_nothing() {
        let json = r#"{"fuel":{"material":"Coal","count":0,"variant":0},"burning":false,"facing":"North"}"#;
        let mut bin: FuelBin = serde_json::from_str(json).unwrap();
        assert_eq!(bin.consume_fuel(), 0);
        assert_eq!(bin.fuel(), None);
    }

    #[test]
    fn arm_sets_facing_and_state() {
        let mut bin = FuelBin::default();
        bin.arm(Face::West, true);
        assert!(bin.is_burning());
        assert_eq!(bin.facing(), Face::West);
        bin.arm(Face::West, false);
        assert!(!bin.is_burning());
    }
}
