// Movement and rotation: relocating the whole builder structure.
//
// ## Moving
//
// `Builder::try_move()` advances the builder one cell in its facing
// direction. Checks run in order, and the first failure aborts with nothing
// changed:
//
// 1. ground: the cell below the central base's destination must be solid;
// 2. collision: every destination cell not currently occupied by the
//    builder itself must be empty;
// 3. veto: the host must accept a simulated placement of the primary head at
//    its new cell, resting against its current cell;
// 4. energy: the move cost must be paid from the furnace.
//
// Cells are then relocated leading edge first (sorted by projection onto the
// move direction, descending), so no cell is ever written over a builder
// cell that has not moved yet. Attached storage (fuel, chest contents)
// travels with its block.
//
// ## Rotating
//
// `Builder::rotate()` turns the structure about its anchor. Rotation
// changes no anchor and costs no energy, but needs `Capability::Rotate` and
// a collision-free destination footprint. Since a rotation can map builder
// cells onto each other in cycles, every cell is lifted first and then
// dropped at its rotated position. The furnace is re-armed afterwards so its
// facing follows the new yaw.

use crate::blueprint::{HEAD_MATERIAL, ModuleId, builder_blueprint};
use crate::builder::Builder;
use crate::error::BuilderError;
use crate::host::{Capability, GridView, Permissions, PlacementVeto};
use crate::storage::LiftedBlock;
use crate::types::{Face, OperatorId, VoxelCoord, Yaw};
use smallvec::SmallVec;
use std::cmp::Reverse;

/// Cells of a full builder, with room to spare.
type CellList<T> = SmallVec<[T; 16]>;

impl Builder {
    /// Move one cell forward. Returns the new anchor.
    pub fn try_move<G, V>(&mut self, grid: &mut G, veto: &V) -> Result<VoxelCoord, BuilderError>
    where
        G: GridView + ?Sized,
        V: PlacementVeto + ?Sized,
    {
        let bp = builder_blueprint();
        let face = self.yaw.facing();
        let new_anchor = self.anchor.relative(face);

        let new_base = bp.resolve(new_anchor, bp.central_base, self.yaw, ModuleId::Base);
        if !grid.classify(new_base.below()).is_solid() {
            return Err(BuilderError::Unsupported);
        }
        if self.collides(grid, new_anchor, self.yaw) {
            return Err(BuilderError::Obstructed);
        }

        let old_head = bp.resolve(self.anchor, bp.primary_head, self.yaw, ModuleId::Base);
        let new_head = bp.resolve(new_anchor, bp.primary_head, self.yaw, ModuleId::Base);
        if !veto.can_place(self.operator, new_head, HEAD_MATERIAL, old_head) {
            return Err(BuilderError::PlacementDenied);
        }

        let furnace = bp.resolve(self.anchor, bp.furnace, self.yaw, ModuleId::Base);
        self.energy
            .use_energy(self.config.move_energy_cost, grid.fuel_source_mut(furnace))?;

        self.translate(grid, face);
        log::debug!("builder moved {} -> {new_anchor}", self.anchor);
        self.anchor = new_anchor;
        Ok(new_anchor)
    }

    /// Turn the builder by `delta` about its anchor.
    pub fn rotate<G, P>(
        &mut self,
        grid: &mut G,
        permissions: &P,
        operator: OperatorId,
        delta: Yaw,
    ) -> Result<(), BuilderError>
    where
        G: GridView + ?Sized,
        P: Permissions + ?Sized,
    {
        if !permissions.has_capability(operator, Capability::Rotate) {
            return Err(BuilderError::PermissionDenied);
        }
        let new_yaw = self.yaw.rotate_by(delta);
        if new_yaw == self.yaw {
            return Ok(());
        }
        if self.collides(grid, self.anchor, new_yaw) {
            return Err(BuilderError::Obstructed);
        }

        let bp = &builder_blueprint().blueprint;
        let mut lifted: CellList<(VoxelCoord, LiftedBlock)> = SmallVec::new();
        for module in self.modules.iter() {
            let before = bp.footprint(module, self.yaw);
            let after = bp.footprint(module, new_yaw);
            for (src, dst) in before.iter().zip(after) {
                let block = grid.lift_block(self.anchor.offset(src.offset));
                lifted.push((self.anchor.offset(dst.offset), block));
            }
        }
        for (dst, block) in lifted {
            grid.drop_block(dst, block);
        }

        log::debug!(
            "builder at {} rotated {:?} -> {new_yaw:?}",
            self.anchor,
            self.yaw
        );
        self.yaw = new_yaw;
        self.arm_furnace(grid, true);
        Ok(())
    }

    /// Whether the builder's footprint at (`anchor`, `yaw`) would overlap
    /// anything other than empty cells and the builder's current cells.
    fn collides<G: GridView + ?Sized>(&self, grid: &G, anchor: VoxelCoord, yaw: Yaw) -> bool {
        let bp = &builder_blueprint().blueprint;
        let current = bp.occupied(self.anchor, self.yaw, self.modules);
        self.modules.iter().any(|module| {
            bp.footprint(module, yaw)
                .iter()
                .map(|cell| anchor.offset(cell.offset))
                .any(|cell| !current.contains(&cell) && !grid.classify(cell).is_empty())
        })
    }

    /// Shift every builder cell one step toward `face`, leading edge first.
    fn translate<G: GridView + ?Sized>(&self, grid: &mut G, face: Face) {
        let dir = face.offset();
        let bp = &builder_blueprint().blueprint;
        let mut cells: CellList<VoxelCoord> = bp
            .occupied(self.anchor, self.yaw, self.modules)
            .into_iter()
            .collect();
        // Ties broken by coordinate so relocation order is deterministic.
        cells.sort_by_key(|c| (Reverse(c.offset_from(self.anchor).dot(dir)), *c));
        for src in cells {
            grid.relocate_block(src, src.relative(face));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::ModuleSet;
    use crate::host::AllowAll;
    use crate::policy::{PermissionTable, ProtectedRegions, Region};
    use crate::scenario::{RigSpec, test_rig};
    use crate::types::{Block, Material};
    use crate::world::VoxelWorld;

    fn moving_rig(yaw: Yaw, modules: ModuleSet) -> (RigSpec, VoxelWorld, Builder) {
        // No pits: nothing to build, so heads stay over solid floor.
        let spec = RigSpec::new(VoxelCoord::new(12, 5, 12), yaw)
            .with_modules(modules)
            .with_pit_depth(0);
        let (world, builder) = test_rig(&spec);
        (spec, world, builder)
    }

    #[test]
    fn move_translates_every_cell() {
        for yaw in Yaw::ALL {
            let (spec, mut world, mut builder) = moving_rig(yaw, ModuleSet::full());
            let before: Vec<(VoxelCoord, Block)> = builder_blueprint()
                .blueprint
                .occupied(spec.anchor, yaw, ModuleSet::full())
                .into_iter()
                .map(|c| (c, world.get(c)))
                .collect();
            let solid_before = world.solid_count();

            let new_anchor = builder.try_move(&mut world, &AllowAll).unwrap();

            assert_eq!(new_anchor, spec.anchor.relative(yaw.facing()));
            for (cell, block) in before {
                assert_eq!(world.get(cell.relative(yaw.facing())), block, "{yaw:?} {cell}");
            }
            assert_eq!(world.solid_count(), solid_before);
            assert!(
                detect_after_move(&world, new_anchor),
                "{yaw:?}: moved structure no longer matches"
            );
        }
    }

    fn detect_after_move(world: &VoxelWorld, anchor: VoxelCoord) -> bool {
        let bp = builder_blueprint();
        Yaw::ALL.iter().any(|&yaw| {
            crate::detect::detect_module(world, anchor, yaw, ModuleId::Base)
                && world.material(bp.resolve(anchor, bp.furnace, yaw, ModuleId::Base))
                    == Material::BurningFurnace
        })
    }

    #[test]
    fn move_carries_storage() {
        let (spec, mut world, mut builder) = moving_rig(Yaw::South, ModuleSet::base_only());
        let chest_items = world.chest(spec.container()).unwrap().total_items();
        builder.try_move(&mut world, &AllowAll).unwrap();

        let moved = spec.anchor.relative(Face::South);
        let bp = builder_blueprint();
        let chest = bp.resolve(moved, bp.container, Yaw::South, ModuleId::Base);
        let furnace = bp.resolve(moved, bp.furnace, Yaw::South, ModuleId::Base);
        assert_eq!(world.chest(chest).unwrap().total_items(), chest_items);
        assert!(world.furnace(furnace).unwrap().is_burning());
        // 1600 from one coal, minus one move.
        assert_eq!(builder.energy_balance(), 1580);
        assert_eq!(world.furnace(furnace).unwrap().fuel().unwrap().count, 7);
    }

    #[test]
    fn move_needs_ground() {
        let (spec, mut world, mut builder) = moving_rig(Yaw::East, ModuleSet::base_only());
        let under_next = spec.anchor.relative(Face::East).below();
        world.set_block(under_next, Block::AIR);
        let solid_before = world.solid_count();

        assert_eq!(
            builder.try_move(&mut world, &AllowAll),
            Err(BuilderError::Unsupported)
        );
        assert_eq!(builder.anchor(), spec.anchor);
        assert_eq!(world.solid_count(), solid_before);
        assert_eq!(builder.energy_balance(), 0);
        assert_eq!(world.furnace(spec.furnace()).unwrap().fuel().unwrap().count, 8);
    }

    #[test]
    fn move_blocked_by_obstacle() {
        let (spec, mut world, mut builder) = moving_rig(Yaw::East, ModuleSet::base_only());
        // Right in front of the head.
        world.set_block(VoxelCoord::new(14, 5, 12), Block::of(Material::Glass));

        assert_eq!(
            builder.try_move(&mut world, &AllowAll),
            Err(BuilderError::Obstructed)
        );
        assert_eq!(builder.anchor(), spec.anchor);
        assert_eq!(builder.energy_balance(), 0);
    }

    #[test]
    fn veto_blocks_move_without_spending_energy() {
        let (spec, mut world, mut builder) = moving_rig(Yaw::East, ModuleSet::base_only());
        let veto = ProtectedRegions::new(vec![Region {
            min: VoxelCoord::new(14, 0, 0),
            max: VoxelCoord::new(31, 15, 31),
            owner: OperatorId(7),
        }]);

        assert_eq!(
            builder.try_move(&mut world, &veto),
            Err(BuilderError::PlacementDenied)
        );
        assert_eq!(builder.anchor(), spec.anchor);
        assert_eq!(builder.energy_balance(), 0);
        assert_eq!(world.furnace(spec.furnace()).unwrap().fuel().unwrap().count, 8);
    }

    #[test]
    fn move_without_fuel_changes_nothing() {
        let spec = RigSpec::new(VoxelCoord::new(12, 5, 12), Yaw::East)
            .with_pit_depth(0)
            .with_fuel(None);
        let (mut world, mut builder) = test_rig(&spec);
        let head = VoxelCoord::new(13, 5, 12);

        assert_eq!(
            builder.try_move(&mut world, &AllowAll),
            Err(BuilderError::InsufficientEnergy)
        );
        assert_eq!(world.get(head).material, Material::IronBlock);
        assert!(world.get(head.relative(Face::East)).material.is_empty());
    }

    #[test]
    fn rotate_turns_structure_and_furnace() {
        let (spec, mut world, mut builder) = moving_rig(Yaw::East, ModuleSet::full());
        let chest_items = world.chest(spec.container()).unwrap().total_items();

        builder
            .rotate(&mut world, &AllowAll, OperatorId(1), Yaw::South)
            .unwrap();

        assert_eq!(builder.yaw(), Yaw::South);
        assert_eq!(builder.anchor(), spec.anchor);
        assert_eq!(builder.energy_balance(), 0);
        for module in ModuleId::ALL {
            assert!(crate::detect::detect_module(&world, spec.anchor, Yaw::South, module));
        }
        let bp = builder_blueprint();
        let furnace = bp.resolve(spec.anchor, bp.furnace, Yaw::South, ModuleId::Base);
        assert_eq!(world.get(furnace).variant, Face::North.facing_variant());
        assert_eq!(world.furnace(furnace).unwrap().facing(), Face::North);
        let chest = bp.resolve(spec.anchor, bp.container, Yaw::South, ModuleId::Base);
        assert_eq!(world.chest(chest).unwrap().total_items(), chest_items);
    }

    #[test]
    fn half_turn_swaps_cells_in_place() {
        // With both side modules, a half turn maps the side wood blocks onto
        // each other.
        let (spec, mut world, mut builder) = moving_rig(Yaw::North, ModuleSet::full());
        let solid_before = world.solid_count();
        builder
            .rotate(&mut world, &AllowAll, OperatorId(1), Yaw::West)
            .unwrap();
        assert_eq!(builder.yaw(), Yaw::South);
        assert_eq!(world.solid_count(), solid_before);
        for module in ModuleId::ALL {
            assert!(crate::detect::detect_module(&world, spec.anchor, Yaw::South, module));
        }
    }

    #[test]
    fn colliding_rotation_changes_nothing() {
        let (spec, mut world, mut builder) = moving_rig(Yaw::East, ModuleSet::base_only());
        // Where the head would land after a quarter turn to the south.
        world.set_block(VoxelCoord::new(12, 5, 13), Block::of(Material::Stone));
        let furnace_before = world.get(spec.furnace());
        let head_before = world.get(VoxelCoord::new(13, 5, 12));

        assert_eq!(
            builder.rotate(&mut world, &AllowAll, OperatorId(1), Yaw::South),
            Err(BuilderError::Obstructed)
        );
        assert_eq!(builder.yaw(), Yaw::East);
        assert_eq!(world.get(spec.furnace()), furnace_before);
        assert_eq!(world.get(VoxelCoord::new(13, 5, 12)), head_before);
        assert!(world.furnace(spec.furnace()).unwrap().is_burning());
    }

    #[test]
    fn rotation_needs_permission() {
        let (_, mut world, mut builder) = moving_rig(Yaw::East, ModuleSet::base_only());
        assert_eq!(
            builder.rotate(&mut world, &PermissionTable::new(), OperatorId(1), Yaw::North),
            Err(BuilderError::PermissionDenied)
        );
        assert_eq!(builder.yaw(), Yaw::East);
    }
}
