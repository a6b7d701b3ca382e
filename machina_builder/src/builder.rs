// A running builder: lifecycle and the per-tick heartbeat.
//
// `Builder::activate()` turns a `Detection` into a live instance and lights
// its furnace. From then on the host calls `heartbeat()` whenever the delay
// returned by the previous heartbeat has elapsed.
//
// ## Heartbeat
//
// Builds go through a two-step propose/confirm so a target is never acted
// on in the same tick it was discovered:
//
// 1. Compute the current build target `T` and compare it with the target
//    `Q` queued by the previous heartbeat.
//    - No target and nothing queued: try to move one cell forward.
//    - `T == Q` and the cell is still empty: build there.
//    - Otherwise do nothing this tick (a new target was just found, or the
//      queued cell changed under us).
// 2. Recompute the target from the (possibly new) anchor, store it as the
//    queued target, and return the build delay if one exists, otherwise the
//    move delay.
//
// If the action in step 1 fails, the heartbeat aborts: no event, no delay,
// and the queued target is left as it was. What to do with a stalled
// builder is the host's call (see `sim.rs`).
//
// See also: `movement.rs` (`try_move()`, `rotate()`), `build.rs`
// (`next_build_target()`, `build()`), `energy.rs`.

use crate::blueprint::{ModuleId, ModuleSet, builder_blueprint};
use crate::config::BuilderConfig;
use crate::detect::Detection;
use crate::energy::EnergyLedger;
use crate::error::BuilderError;
use crate::host::{Capability, GridView, Permissions, PlacementVeto};
use crate::types::{Block, Material, OperatorId, VoxelCoord, Yaw};
use serde::{Deserialize, Serialize};

/// What a successful heartbeat did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuilderAction {
    Moved { from: VoxelCoord, to: VoxelCoord },
    Built { at: VoxelCoord, material: Material },
    /// Nothing happened this tick beyond queueing the next target.
    Queued,
}

/// Result of a successful heartbeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatEvent {
    /// Ticks until the next heartbeat.
    pub delay: u64,
    /// Set when the builder moved this tick.
    pub new_anchor: Option<VoxelCoord>,
    pub action: BuilderAction,
}

/// A live builder instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Builder {
    pub(crate) anchor: VoxelCoord,
    pub(crate) yaw: Yaw,
    pub(crate) modules: ModuleSet,
    /// The operator who activated this builder.
    pub(crate) operator: OperatorId,
    pub(crate) energy: EnergyLedger,
    pub(crate) queued_target: Option<VoxelCoord>,
    pub(crate) config: BuilderConfig,
}

impl Builder {
    /// Start a builder from a successful detection and light its furnace.
    pub fn activate<G: GridView + ?Sized>(
        detection: Detection,
        operator: OperatorId,
        grid: &mut G,
        config: BuilderConfig,
    ) -> Self {
        let builder = Self {
            anchor: detection.anchor,
            yaw: detection.yaw,
            modules: detection.modules,
            operator,
            energy: EnergyLedger::new(),
            queued_target: None,
            config,
        };
        builder.arm_furnace(grid, true);
        log::info!(
            "builder activated at {} facing {:?} by operator {operator}",
            builder.anchor,
            builder.yaw
        );
        builder
    }

    pub fn anchor(&self) -> VoxelCoord {
        self.anchor
    }

    pub fn yaw(&self) -> Yaw {
        self.yaw
    }

    pub fn modules(&self) -> ModuleSet {
        self.modules
    }

    pub fn operator(&self) -> OperatorId {
        self.operator
    }

    pub fn energy_balance(&self) -> u32 {
        self.energy.balance()
    }

    pub fn queued_target(&self) -> Option<VoxelCoord> {
        self.queued_target
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Run one heartbeat, reporting why it aborted if it did.
    pub fn try_heartbeat<G, V>(
        &mut self,
        grid: &mut G,
        veto: &V,
    ) -> Result<HeartbeatEvent, BuilderError>
    where
        G: GridView + ?Sized,
        V: PlacementVeto + ?Sized,
    {
        let target = self.next_build_target(grid);
        let action = match (target, self.queued_target) {
            (None, None) => {
                let from = self.anchor;
                let to = self.try_move(grid, veto)?;
                BuilderAction::Moved { from, to }
            }
            (Some(t), Some(q)) if t == q && grid.classify(t).is_empty() => {
                let material = self.build(grid, veto, t)?;
                BuilderAction::Built { at: t, material }
            }
            _ => BuilderAction::Queued,
        };

        let delay = self.queue_next_target(grid);
        let new_anchor = match action {
            BuilderAction::Moved { to, .. } => Some(to),
            _ => None,
        };
        Ok(HeartbeatEvent {
            delay,
            new_anchor,
            action,
        })
    }

    /// Run one heartbeat. `None` means the builder stalled this tick; the
    /// reason is logged at debug level.
    pub fn heartbeat<G, V>(&mut self, grid: &mut G, veto: &V) -> Option<HeartbeatEvent>
    where
        G: GridView + ?Sized,
        V: PlacementVeto + ?Sized,
    {
        match self.try_heartbeat(grid, veto) {
            Ok(event) => Some(event),
            Err(err) => {
                log::debug!("builder at {} stalled: {err}", self.anchor);
                None
            }
        }
    }

    /// Recompute and store the queued target; return the delay until the
    /// next heartbeat.
    fn queue_next_target<G: GridView + ?Sized>(&mut self, grid: &G) -> u64 {
        self.queued_target = self.next_build_target(grid);
        match self.queued_target {
            Some(_) => self.config.build_delay_ticks,
            None => self.config.move_delay_ticks,
        }
    }

    /// Whether `operator` may shut this builder down. The activating
    /// operator needs `DeactivateOwn`; anyone else needs `DeactivateAll`.
    pub fn may_deactivate<P: Permissions + ?Sized>(
        &self,
        operator: OperatorId,
        permissions: &P,
    ) -> bool {
        let needed = if operator == self.operator {
            Capability::DeactivateOwn
        } else {
            Capability::DeactivateAll
        };
        permissions.has_capability(operator, needed)
    }

    /// Put out the furnace. The structure itself stays where it is.
    pub fn on_deactivate<G: GridView + ?Sized>(&self, grid: &mut G) {
        let bp = builder_blueprint();
        let furnace = bp.resolve(self.anchor, bp.furnace, self.yaw, ModuleId::Base);
        if grid.material(furnace) == Material::BurningFurnace {
            self.arm_furnace(grid, false);
        }
        log::info!("builder at {} deactivated", self.anchor);
    }

    /// Write the furnace block lit or unlit, facing away from the heads.
    pub(crate) fn arm_furnace<G: GridView + ?Sized>(&self, grid: &mut G, burning: bool) {
        let bp = builder_blueprint();
        let furnace = bp.resolve(self.anchor, bp.furnace, self.yaw, ModuleId::Base);
        let facing = self.yaw.opposite().facing();
        let material = if burning {
            Material::BurningFurnace
        } else {
            Material::Furnace
        };
        grid.set_block(furnace, Block::new(material, facing.facing_variant()));
        if let Some(source) = grid.fuel_source_mut(furnace) {
            source.arm(facing, burning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AllowAll;
    use crate::policy::PermissionTable;
    use crate::scenario::{RigSpec, test_rig};
    use crate::storage::ItemStack;
    use crate::types::Face;

    fn east_rig() -> RigSpec {
        RigSpec::new(VoxelCoord::new(10, 5, 10), Yaw::East)
    }

    #[test]
    fn activation_lights_furnace_facing_backward() {
        let spec = east_rig();
        let (world, builder) = test_rig(&spec);
        let furnace = world.get(spec.furnace());
        assert_eq!(furnace.material, Material::BurningFurnace);
        assert_eq!(furnace.variant, Face::West.facing_variant());
        let bin = world.furnace(spec.furnace()).unwrap();
        assert!(bin.is_burning());
        assert_eq!(bin.facing(), Face::West);
        assert_eq!(builder.energy_balance(), 0);
        assert_eq!(builder.queued_target(), None);
    }

    #[test]
    fn queue_then_build_then_move() {
        let spec = east_rig();
        let (mut world, mut builder) = test_rig(&spec);
        let target = VoxelCoord::new(11, 4, 10);

        let first = builder.heartbeat(&mut world, &AllowAll).unwrap();
        assert_eq!(first.action, BuilderAction::Queued);
        assert_eq!(first.delay, 10);
        assert_eq!(builder.queued_target(), Some(target));
        assert!(world.get(target).material.is_empty());

        let second = builder.heartbeat(&mut world, &AllowAll).unwrap();
        assert_eq!(
            second.action,
            BuilderAction::Built {
                at: target,
                material: Material::Cobblestone
            }
        );
        assert_eq!(second.delay, 20);
        assert_eq!(builder.queued_target(), None);
        assert_eq!(builder.energy_balance(), 1600 - 10);

        let third = builder.heartbeat(&mut world, &AllowAll).unwrap();
        assert_eq!(third.new_anchor, Some(VoxelCoord::new(11, 5, 10)));
        assert_eq!(builder.anchor(), VoxelCoord::new(11, 5, 10));
        assert_eq!(builder.energy_balance(), 1600 - 30);
    }

    #[test]
    fn stale_queued_target_is_not_built() {
        let spec = east_rig();
        let (mut world, mut builder) = test_rig(&spec);
        builder.heartbeat(&mut world, &AllowAll).unwrap();
        let queued = builder.queued_target().unwrap();

        // Someone else fills the cell between ticks.
        world.set_block(queued, Block::of(Material::Dirt));
        let items_before = world.chest(spec.container()).unwrap().total_items();

        let event = builder.heartbeat(&mut world, &AllowAll).unwrap();
        assert_eq!(event.action, BuilderAction::Queued);
        assert_eq!(world.get(queued).material, Material::Dirt);
        assert_eq!(world.chest(spec.container()).unwrap().total_items(), items_before);
        assert_eq!(builder.energy_balance(), 0);
        assert_eq!(builder.queued_target(), None);
        assert_eq!(event.delay, 20);
    }

    #[test]
    fn failed_build_aborts_and_keeps_queue() {
        let spec = east_rig().with_stock(vec![ItemStack::new(Material::Torch, 3)]);
        let (mut world, mut builder) = test_rig(&spec);
        builder.heartbeat(&mut world, &AllowAll).unwrap();
        let queued = builder.queued_target();

        assert_eq!(
            builder.try_heartbeat(&mut world, &AllowAll),
            Err(BuilderError::InsufficientMaterial)
        );
        assert_eq!(builder.heartbeat(&mut world, &AllowAll), None);
        assert_eq!(builder.queued_target(), queued);
    }

    #[test]
    fn deactivation_permissions() {
        let (_, builder) = test_rig(&east_rig());
        let owner = builder.operator();
        let other = OperatorId(99);

        let mut perms = PermissionTable::new();
        assert!(!builder.may_deactivate(owner, &perms));

        perms.grant(owner, Capability::DeactivateOwn);
        perms.grant(other, Capability::DeactivateOwn);
        assert!(builder.may_deactivate(owner, &perms));
        assert!(!builder.may_deactivate(other, &perms));

        perms.grant(other, Capability::DeactivateAll);
        assert!(builder.may_deactivate(other, &perms));
    }

    #[test]
    fn owner_needs_deactivate_own_even_with_deactivate_all() {
        let (_, builder) = test_rig(&east_rig());
        let owner = builder.operator();

        let mut perms = PermissionTable::new();
        perms.grant(owner, Capability::DeactivateAll);
        assert!(!builder.may_deactivate(owner, &perms));

        perms.grant(owner, Capability::DeactivateOwn);
        assert!(builder.may_deactivate(owner, &perms));
    }

    #[test]
    fn deactivation_puts_out_furnace() {
        let spec = east_rig();
        let (mut world, builder) = test_rig(&spec);
        builder.on_deactivate(&mut world);
        assert_eq!(world.get(spec.furnace()).material, Material::Furnace);
        assert!(!world.furnace(spec.furnace()).unwrap().is_burning());
        // Fuel stays with the furnace.
        assert_eq!(world.furnace(spec.furnace()).unwrap().fuel().unwrap().count, 8);
    }
}
