// Dense 3D voxel grid: the bundled `GridView` host.
//
// The world is stored as a flat `Vec<Block>` indexed by
// `x + z * size_x + y * size_x * size_z`, giving O(1) read/write access.
// Out-of-bounds reads return air (but classify as solid, see `classify()`);
// out-of-bounds writes are no-ops. Chest and
// furnace cells carry a `BlockEntity` (inventory or fuel bin) in a side
// table keyed by coordinate. Lifting a block takes its entity with it, so a
// relocated chest keeps its contents.
//
// Game servers embedding the builder supply their own `GridView`; this one
// backs the headless runner (`main.rs`), the scheduler (`sim.rs`), and the
// tests.
//
// See also: `host.rs` for the trait, `storage.rs` for the entity types,
// `scenario.rs` for helpers that lay out a builder rig in a world.

use crate::host::{FuelSource, GridView, Inventory};
use crate::storage::{BlockEntity, FuelBin, LiftedBlock, SlotInventory};
use crate::types::{Block, Classification, Material, VoxelCoord};
use std::collections::BTreeMap;

/// Dense 3D voxel grid with attached block entities.
#[derive(Clone, Debug, Default)]
pub struct VoxelWorld {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    blocks: Vec<Block>,
    /// Chest inventories and furnace fuel bins, keyed by cell.
    entities: BTreeMap<VoxelCoord, BlockEntity>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
}

impl VoxelWorld {
    /// Create a new world filled with air.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            blocks: vec![Block::AIR; total],
            entities: BTreeMap::new(),
            size_x,
            size_y,
            size_z,
        }
    }

    /// Check whether a coordinate is within bounds.
    pub fn in_bounds(&self, coord: VoxelCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.size_x
            && (coord.y as u32) < self.size_y
            && (coord.z as u32) < self.size_z
    }

    /// Convert a coordinate to a flat index. Returns `None` if out of bounds.
    fn index(&self, coord: VoxelCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            let x = coord.x as usize;
            let y = coord.y as usize;
            let z = coord.z as usize;
            let sx = self.size_x as usize;
            let sz = self.size_z as usize;
            Some(x + z * sx + y * sx * sz)
        } else {
            None
        }
    }

    /// Read a block. Returns air for out-of-bounds coordinates.
    pub fn get(&self, coord: VoxelCoord) -> Block {
        self.index(coord)
            .and_then(|i| self.blocks.get(i).copied())
            .unwrap_or(Block::AIR)
    }

    /// Fill the inclusive box between two corners with one material.
    pub fn fill(&mut self, min: VoxelCoord, max: VoxelCoord, material: Material) {
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                for x in min.x..=max.x {
                    self.set_block(VoxelCoord::new(x, y, z), Block::of(material));
                }
            }
        }
    }

    /// Place a chest holding the given inventory.
    pub fn place_chest(&mut self, coord: VoxelCoord, inventory: SlotInventory) {
        self.set_block(coord, Block::of(Material::Chest));
        if self.in_bounds(coord) {
            self.entities.insert(coord, BlockEntity::Container(inventory));
        }
    }

    /// Place an unlit furnace holding the given fuel.
    pub fn place_furnace(&mut self, coord: VoxelCoord, fuel: FuelBin) {
        self.set_block(coord, Block::of(Material::Furnace));
        if self.in_bounds(coord) {
            self.entities.insert(coord, BlockEntity::Furnace(fuel));
        }
    }

    /// Read-only access to a chest's concrete inventory.
    pub fn chest(&self, coord: VoxelCoord) -> Option<&SlotInventory> {
        match self.entities.get(&coord) {
            Some(BlockEntity::Container(inventory)) => Some(inventory),
            _ => None,
        }
    }

    /// Read-only access to a furnace's concrete fuel bin.
    pub fn furnace(&self, coord: VoxelCoord) -> Option<&FuelBin> {
        match self.entities.get(&coord) {
            Some(BlockEntity::Furnace(bin)) => Some(bin),
            _ => None,
        }
    }

    /// Number of non-air cells. Used by tests to detect stray writes.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.material.is_empty()).count()
    }
}

/// Whether a block entity can stay attached to a cell of this material.
fn entity_fits(entity: &BlockEntity, material: Material) -> bool {
    match entity {
        BlockEntity::Container(_) => material == Material::Chest,
        BlockEntity::Furnace(_) => {
            matches!(material, Material::Furnace | Material::BurningFurnace)
        }
    }
}

impl GridView for VoxelWorld {
    fn block(&self, coord: VoxelCoord) -> Block {
        self.get(coord)
    }

    /// Cells outside the world classify as solid, so a builder stalls at the
    /// edge instead of walking its blocks off into the void.
    fn classify(&self, coord: VoxelCoord) -> Classification {
        if self.in_bounds(coord) {
            self.get(coord).material.classify()
        } else {
            Classification::Solid
        }
    }

    fn set_block(&mut self, coord: VoxelCoord, block: Block) {
        let Some(i) = self.index(coord) else {
            return;
        };
        if let Some(slot) = self.blocks.get_mut(i) {
            *slot = block;
        }
        if self
            .entities
            .get(&coord)
            .is_some_and(|e| !entity_fits(e, block.material))
        {
            self.entities.remove(&coord);
        }
    }

    fn lift_block(&mut self, coord: VoxelCoord) -> LiftedBlock {
        let block = self.get(coord);
        let entity = self.entities.remove(&coord);
        self.set_block(coord, Block::AIR);
        LiftedBlock { block, entity }
    }

    fn drop_block(&mut self, coord: VoxelCoord, lifted: LiftedBlock) {
        self.set_block(coord, lifted.block);
        self.entities.remove(&coord);
        let material = lifted.block.material;
        if let Some(entity) = lifted
            .entity
            .filter(|e| self.in_bounds(coord) && entity_fits(e, material))
        {
            self.entities.insert(coord, entity);
        }
    }

    fn inventory(&self, coord: VoxelCoord) -> Option<&dyn Inventory> {
        match self.entities.get(&coord) {
            Some(BlockEntity::Container(inventory)) => Some(inventory as &dyn Inventory),
            _ => None,
        }
    }

    fn inventory_mut(&mut self, coord: VoxelCoord) -> Option<&mut dyn Inventory> {
        match self.entities.get_mut(&coord) {
            Some(BlockEntity::Container(inventory)) => Some(inventory as &mut dyn Inventory),
            _ => None,
        }
    }

    fn fuel_source_mut(&mut self, coord: VoxelCoord) -> Option<&mut dyn FuelSource> {
        match self.entities.get_mut(&coord) {
            Some(BlockEntity::Furnace(bin)) => Some(bin as &mut dyn FuelSource),
            _ => None,
        }
    }
}
