// Build subsystem: find where to drop a block, then drop one.
//
// ## Target search
//
// Each active head looks straight down, in fixed priority order (base head,
// then left, then right; the first head that yields a target wins). Below a
// head the scan visits up to `max_build_depth` cells:
//
// - empty: remember it and keep descending;
// - solid: the last empty cell is the target (none if the very first cell
//   below the head is already solid);
// - anything else (water, torches, levers): this head yields nothing, no
//   matter what lies deeper.
//
// Running out of depth yields nothing.
//
// ## Placement
//
// `Builder::build()` takes the first slot in the chest holding a solid block,
// asks the placement veto (with the target's lower neighbor as the
// supporting surface), pays the build cost, and only then takes one item and
// writes the block. Any failure leaves the chest, the grid, and the energy
// balance untouched.

use crate::blueprint::{ModuleId, builder_blueprint};
use crate::builder::Builder;
use crate::error::BuilderError;
use crate::host::{GridView, PlacementVeto};
use crate::types::{Block, Classification, Material, VoxelCoord};

/// Scan below one head for a buildable cell.
pub fn next_head_build<G: GridView + ?Sized>(
    grid: &G,
    head: VoxelCoord,
    max_depth: u32,
) -> Option<VoxelCoord> {
    let mut target = None;
    let mut cell = head;
    for _ in 0..max_depth {
        cell = cell.below();
        match grid.classify(cell) {
            Classification::Empty => target = Some(cell),
            Classification::Solid => return target,
            Classification::Other(_) => return None,
        }
    }
    None
}

impl Builder {
    /// The cell this builder would build on next, if any.
    pub fn next_build_target<G: GridView + ?Sized>(&self, grid: &G) -> Option<VoxelCoord> {
        let bp = builder_blueprint();
        self.modules.iter().find_map(|module| {
            let head = bp.resolve(self.anchor, bp.head_of(module), self.yaw, module);
            next_head_build(grid, head, self.config.max_build_depth)
        })
    }

    /// Place one block from onboard storage at `target`. Returns the
    /// material placed.
    pub fn build<G, V>(
        &mut self,
        grid: &mut G,
        veto: &V,
        target: VoxelCoord,
    ) -> Result<Material, BuilderError>
    where
        G: GridView + ?Sized,
        V: PlacementVeto + ?Sized,
    {
        let bp = builder_blueprint();
        let container = bp.resolve(self.anchor, bp.container, self.yaw, ModuleId::Base);
        let furnace = bp.resolve(self.anchor, bp.furnace, self.yaw, ModuleId::Base);

        let inventory = grid
            .inventory(container)
            .ok_or(BuilderError::InsufficientMaterial)?;
        let (slot, stack) = (0..inventory.slot_count())
            .find_map(|slot| {
                inventory
                    .peek(slot)
                    .filter(|s| s.count > 0 && s.material.is_solid())
                    .map(|s| (slot, s))
            })
            .ok_or(BuilderError::InsufficientMaterial)?;

        if !veto.can_place(self.operator, target, stack.material, target.below()) {
            return Err(BuilderError::PlacementDenied);
        }

        // Energy last: everything above must pass first.
        self.energy
            .use_energy(self.config.build_energy_cost, grid.fuel_source_mut(furnace))?;

        let placed = grid
            .inventory_mut(container)
            .and_then(|inventory| inventory.take_one(slot))
            .ok_or(BuilderError::InsufficientMaterial)?;
        grid.set_block(target, Block::new(placed.material, placed.variant));
        log::debug!("builder at {} placed {:?} at {target}", self.anchor, placed.material);
        Ok(placed.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AllowAll;
    use crate::scenario::{RigSpec, test_rig};
    use crate::storage::ItemStack;
    use crate::types::Yaw;
    use crate::world::VoxelWorld;

    struct DenyAll;

    impl PlacementVeto for DenyAll {
        fn can_place(
            &self,
            _: crate::types::OperatorId,
            _: VoxelCoord,
            _: Material,
            _: VoxelCoord,
        ) -> bool {
            false
        }
    }

    fn column_world(empty_cells: i32, floor: Material) -> (VoxelWorld, VoxelCoord) {
        let mut world = VoxelWorld::new(8, 32, 8);
        let head = VoxelCoord::new(3, 20, 3);
        world.set_block(head.offset(crate::types::Offset::new(0, -(empty_cells + 1), 0)), Block::of(floor));
        (world, head)
    }

    #[test]
    fn column_shorter_than_depth_returns_cell_above_floor() {
        let depth = 6;
        for n in 1..depth {
            let (world, head) = column_world(n as i32, Material::Stone);
            let expected = VoxelCoord::new(head.x, head.y - n as i32, head.z);
            assert_eq!(next_head_build(&world, head, depth), Some(expected), "n = {n}");
        }
    }

    #[test]
    fn column_at_or_beyond_depth_returns_none() {
        let depth = 6;
        for n in depth..depth + 3 {
            let (world, head) = column_world(n as i32, Material::Stone);
            assert_eq!(next_head_build(&world, head, depth), None, "n = {n}");
        }
    }

    #[test]
    fn obstruction_stops_the_scan() {
        let mut world = VoxelWorld::new(8, 32, 8);
        let head = VoxelCoord::new(3, 20, 3);
        // Water two cells down, solid floor below that.
        world.set_block(VoxelCoord::new(3, 18, 3), Block::of(Material::Water));
        world.set_block(VoxelCoord::new(3, 17, 3), Block::of(Material::Stone));
        assert_eq!(next_head_build(&world, head, 6), None);
    }

    #[test]
    fn solid_directly_below_head_yields_nothing() {
        let mut world = VoxelWorld::new(8, 32, 8);
        let head = VoxelCoord::new(3, 20, 3);
        world.set_block(head.below(), Block::of(Material::Dirt));
        assert_eq!(next_head_build(&world, head, 6), None);
    }

    #[test]
    fn base_head_takes_priority_over_side_heads() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East)
            .with_modules(crate::blueprint::ModuleSet::full())
            .with_pit_depth(2);
        let (mut world, builder) = test_rig(&spec);
        // Pits are dug under every head; base head wins.
        assert_eq!(builder.next_build_target(&world), Some(VoxelCoord::new(11, 3, 10)));

        // Fill the base pit: the left head (north, -Z) is next.
        world.fill(VoxelCoord::new(11, 3, 10), VoxelCoord::new(11, 4, 10), Material::Stone);
        assert_eq!(builder.next_build_target(&world), Some(VoxelCoord::new(11, 3, 9)));
    }

    #[test]
    fn build_places_one_block_and_consumes_one_item() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East)
            .with_stock(vec![ItemStack::new(Material::Cobblestone, 3)]);
        let (mut world, mut builder) = test_rig(&spec);
        let target = builder.next_build_target(&world).unwrap();
        let cells_before = world.solid_count();

        let placed = builder.build(&mut world, &AllowAll, target).unwrap();

        assert_eq!(placed, Material::Cobblestone);
        assert_eq!(world.get(target).material, Material::Cobblestone);
        assert_eq!(world.solid_count(), cells_before + 1);
        assert_eq!(world.chest(spec.container()).unwrap().count_of(Material::Cobblestone), 2);
        assert_eq!(builder.energy_balance(), 1600 - 10);
    }

    #[test]
    fn build_skips_non_placeable_slots() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East).with_stock(vec![
            ItemStack::new(Material::Coal, 5),
            ItemStack::new(Material::Torch, 5),
            ItemStack::with_variant(Material::Planks, 1, 2),
        ]);
        let (mut world, mut builder) = test_rig(&spec);
        let target = builder.next_build_target(&world).unwrap();

        builder.build(&mut world, &AllowAll, target).unwrap();

        assert_eq!(world.get(target), Block::new(Material::Planks, 2));
        let chest = world.chest(spec.container()).unwrap();
        assert_eq!(chest.count_of(Material::Planks), 0);
        assert_eq!(chest.count_of(Material::Coal), 5);
        assert_eq!(chest.count_of(Material::Torch), 5);
    }

    fn restored_chest(json: &str) -> crate::storage::SlotInventory {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn build_skips_zero_count_stacks() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East);
        let (mut world, mut builder) = test_rig(&spec);
        world.place_chest(
            spec.container(),
            restored_chest(
                r#"{"slots":[{"material":"Stone","count":0,"variant":0},{"material":"Cobblestone","count":3,"variant":0}]}"#,
            ),
        );
        let target = builder.next_build_target(&world).unwrap();

        let placed = builder.build(&mut world, &AllowAll, target).unwrap();

        assert_eq!(placed, Material::Cobblestone);
        assert_eq!(world.get(target).material, Material::Cobblestone);
        assert_eq!(world.chest(spec.container()).unwrap().total_items(), 2);
        assert_eq!(builder.energy_balance(), 1600 - 10);
    }

    #[test]
    fn only_zero_count_stacks_is_no_material() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East);
        let (mut world, mut builder) = test_rig(&spec);
        world.place_chest(
            spec.container(),
            restored_chest(r#"{"slots":[{"material":"Stone","count":0,"variant":0}]}"#),
        );
        let target = builder.next_build_target(&world).unwrap();

        let result = builder.build(&mut world, &AllowAll, target);

        assert_eq!(result, Err(BuilderError::InsufficientMaterial));
        assert!(world.get(target).material.is_empty());
        assert_eq!(builder.energy_balance(), 0);
        assert_eq!(world.furnace(spec.furnace()).unwrap().fuel().unwrap().count, 8);
    }

    #[test]
    fn no_material_fails_without_side_effects() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East)
            .with_stock(vec![ItemStack::new(Material::Stick, 4)]);
        let (mut world, mut builder) = test_rig(&spec);
        let target = builder.next_build_target(&world).unwrap();
        let cells_before = world.solid_count();

        let result = builder.build(&mut world, &AllowAll, target);

        assert_eq!(result, Err(BuilderError::InsufficientMaterial));
        assert_eq!(world.solid_count(), cells_before);
        assert_eq!(builder.energy_balance(), 0);
        assert_eq!(world.furnace(spec.furnace()).unwrap().fuel().unwrap().count, 8);
    }

    #[test]
    fn veto_fails_without_side_effects() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East);
        let (mut world, mut builder) = test_rig(&spec);
        let target = builder.next_build_target(&world).unwrap();
        let items_before = world.chest(spec.container()).unwrap().total_items();

        let result = builder.build(&mut world, &DenyAll, target);

        assert_eq!(result, Err(BuilderError::PlacementDenied));
        assert!(world.get(target).material.is_empty());
        assert_eq!(world.chest(spec.container()).unwrap().total_items(), items_before);
        assert_eq!(builder.energy_balance(), 0);
    }

    #[test]
    fn empty_fuel_fails_without_consuming_material() {
        let spec = RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East).with_fuel(None);
        let (mut world, mut builder) = test_rig(&spec);
        let target = builder.next_build_target(&world).unwrap();
        let items_before = world.chest(spec.container()).unwrap().total_items();

        let result = builder.build(&mut world, &AllowAll, target);

        assert_eq!(result, Err(BuilderError::InsufficientEnergy));
        assert!(world.get(target).material.is_empty());
        assert_eq!(world.chest(spec.container()).unwrap().total_items(), items_before);
    }
}
