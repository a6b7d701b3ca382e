// World-building helpers: lay out a builder rig and the ground around it.
//
// `RigSpec` describes one builder structure (anchor, yaw, modules, starting
// fuel and chest stock). `place_rig()` writes it into a `VoxelWorld` exactly
// as a player would build it by hand: unlit furnace, lever on top, chest
// above the head. `demo_world()` builds the headless runner's scene, a flat
// stone plain with a trench across the builder's path for it to bridge.
//
// See also: `blueprint.rs` for the cell layout, `main.rs` and `sim.rs` for
// the callers.

use crate::blueprint::{
    BURNING_FURNACE_MATERIAL, CONTAINER_MATERIAL, ModuleId, ModuleSet, builder_blueprint,
};
use crate::host::GridView;
use crate::storage::{FuelBin, ItemStack, SlotInventory};
use crate::types::{Block, Material, OperatorId, VoxelCoord, Yaw};
use crate::world::VoxelWorld;

/// Operator used by rigs that tests and the headless runner activate.
pub const RIG_OPERATOR: OperatorId = OperatorId(1);

/// Layout and starting contents of a builder structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RigSpec {
    pub anchor: VoxelCoord,
    pub yaw: Yaw,
    pub modules: ModuleSet,
    /// Contents of the furnace's fuel slot.
    pub fuel: Option<ItemStack>,
    /// Chest contents, front to back.
    pub stock: Vec<ItemStack>,
    /// Cells dug out of the ground below each head. Only `test_rig()` and
    /// `demo_world()` look at this.
    pub pit_depth: u32,
}

impl RigSpec {
    /// A base-only rig with eight coal and a stack of cobblestone.
    pub fn new(anchor: VoxelCoord, yaw: Yaw) -> Self {
        Self {
            anchor,
            yaw,
            modules: ModuleSet::base_only(),
            fuel: Some(ItemStack::new(Material::Coal, 8)),
            stock: vec![ItemStack::new(Material::Cobblestone, 64)],
            pit_depth: 1,
        }
    }

    pub fn with_modules(mut self, modules: ModuleSet) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_fuel(mut self, fuel: Option<ItemStack>) -> Self {
        self.fuel = fuel;
        self
    }

    pub fn with_stock(mut self, stock: Vec<ItemStack>) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_pit_depth(mut self, pit_depth: u32) -> Self {
        self.pit_depth = pit_depth;
        self
    }

    pub fn furnace(&self) -> VoxelCoord {
        let bp = builder_blueprint();
        bp.resolve(self.anchor, bp.furnace, self.yaw, ModuleId::Base)
    }

    pub fn container(&self) -> VoxelCoord {
        let bp = builder_blueprint();
        bp.resolve(self.anchor, bp.container, self.yaw, ModuleId::Base)
    }

    pub fn head(&self, module: ModuleId) -> VoxelCoord {
        let bp = builder_blueprint();
        bp.resolve(self.anchor, bp.head_of(module), self.yaw, module)
    }
}

/// Fill the whole horizontal layer at height `y`.
pub fn lay_floor(world: &mut VoxelWorld, y: i32, material: Material) {
    let max_x = world.size_x as i32 - 1;
    let max_z = world.size_z as i32 - 1;
    world.fill(VoxelCoord::new(0, y, 0), VoxelCoord::new(max_x, y, max_z), material);
}

/// Write a cold (unlit) builder structure into the world.
pub fn place_rig(world: &mut VoxelWorld, spec: &RigSpec) {
    let bp = &builder_blueprint().blueprint;
    for module in spec.modules.iter() {
        for cell in bp.footprint(module, spec.yaw) {
            let coord = spec.anchor.offset(cell.offset);
            match cell.material {
                BURNING_FURNACE_MATERIAL => world.place_furnace(coord, FuelBin::new(spec.fuel)),
                CONTAINER_MATERIAL => world.place_chest(coord, SlotInventory::chest_with(&spec.stock)),
                material => world.set_block(coord, Block::of(material)),
            }
        }
    }
}

/// Clear `spec.pit_depth` cells of ground under every head.
pub fn dig_pits(world: &mut VoxelWorld, spec: &RigSpec) {
    for module in spec.modules.iter() {
        let mut cell = spec.head(module);
        for _ in 0..spec.pit_depth {
            cell = cell.below();
            world.set_block(cell, Block::AIR);
        }
    }
}

/// The headless runner's scene: solid stone up to just below the anchor, the
/// rig on top, and a trench three cells deep crossing the builder's path a
/// few cells ahead.
pub fn demo_world(size: (u32, u32, u32), spec: &RigSpec) -> VoxelWorld {
    let (sx, sy, sz) = size;
    let mut world = VoxelWorld::new(sx, sy, sz);
    world.fill(
        VoxelCoord::new(0, 0, 0),
        VoxelCoord::new(sx as i32 - 1, spec.anchor.y - 1, sz as i32 - 1),
        Material::Stone,
    );
    lay_floor(&mut world, spec.anchor.y - 1, Material::Grass);
    place_rig(&mut world, spec);
    dig_pits(&mut world, spec);

    let forward = spec.yaw.facing().offset();
    let lateral = spec.yaw.right().facing().offset();
    for step in 4..8 {
        for side in -3..=3 {
            for depth in 1..=3 {
                let coord = VoxelCoord::new(
                    spec.anchor.x + forward.x * step + lateral.x * side,
                    spec.anchor.y - depth,
                    spec.anchor.z + forward.z * step + lateral.z * side,
                );
                world.set_block(coord, Block::AIR);
            }
        }
    }
    world
}

/// Build a world around `spec`, detect the rig, and activate it with
/// default settings.
#[cfg(test)]
pub fn test_rig(spec: &RigSpec) -> (VoxelWorld, crate::builder::Builder) {
    use crate::config::BuilderConfig;
    use crate::detect::detect;
    use crate::host::AllowAll;
    use crate::types::Face;

    let mut world = VoxelWorld::new(32, 16, 32);
    world.fill(
        VoxelCoord::new(0, 0, 0),
        VoxelCoord::new(31, spec.anchor.y - 1, 31),
        Material::Stone,
    );
    place_rig(&mut world, spec);
    dig_pits(&mut world, spec);
    let detection = detect(&world, &AllowAll, RIG_OPERATOR, spec.anchor, Face::Up).unwrap();
    assert_eq!(detection.yaw, spec.yaw);
    assert_eq!(detection.modules, spec.modules);
    let builder =
        crate::builder::Builder::activate(detection, RIG_OPERATOR, &mut world, BuilderConfig::default());
    (world, builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect;
    use crate::host::AllowAll;
    use crate::types::{Face, Offset};

    #[test]
    fn placed_rig_is_cold_and_stocked() {
        let spec = RigSpec::new(VoxelCoord::new(5, 3, 5), Yaw::West);
        let mut world = VoxelWorld::new(16, 8, 16);
        place_rig(&mut world, &spec);
        assert_eq!(world.material(spec.furnace()), Material::Furnace);
        assert_eq!(world.furnace(spec.furnace()).unwrap().fuel(), spec.fuel);
        assert_eq!(world.chest(spec.container()).unwrap().count_of(Material::Cobblestone), 64);
        assert_eq!(world.material(spec.head(ModuleId::Base)), Material::IronBlock);
    }

    #[test]
    fn demo_world_rig_is_detectable() {
        for yaw in Yaw::ALL {
            let spec = RigSpec::new(VoxelCoord::new(32, 10, 32), yaw).with_modules(ModuleSet::full());
            let world = demo_world((64, 32, 64), &spec);
            let found = detect(&world, &AllowAll, RIG_OPERATOR, spec.anchor, Face::Up).unwrap();
            assert_eq!(found.yaw, yaw);
            assert_eq!(found.modules, ModuleSet::full());
            // Trench cells start four steps ahead.
            let f = yaw.facing().offset();
            let ahead = spec.anchor.offset(Offset::new(f.x * 5, -1, f.z * 5));
            assert!(world.material(ahead).is_empty());
        }
    }
}
