// Builder simulation: the reference host scheduler.
//
// `BuilderSim` owns a `VoxelWorld`, the placement veto and permission
// policies, the config, every live `Builder`, and the `HeartbeatQueue`
// that drives them. The sim is a function `(state, commands) -> (new_state,
// events)`: `step()` applies operator commands and fires due heartbeats up
// to a target tick, returning the narrative events it produced.
//
// ## Heartbeat chain
//
// Activation schedules a builder's first heartbeat on the next tick. Every
// heartbeat that succeeds schedules the next one `delay` ticks later, so
// each builder has exactly one pending heartbeat while it lives. A heartbeat
// that aborts emits `BuilderStalled` and then, depending on
// `stall_retry_ticks`, either reschedules after that many ticks or
// deactivates the builder. Deactivation cancels the builder's pending
// heartbeat.
//
// ## Double activation
//
// A running builder's furnace is lit, and detection only accepts an unlit
// furnace, so repeating the activation gesture on a live builder is
// rejected as `NoStructuralMatch`.
//
// See also: `command.rs`, `event.rs`, `builder.rs`.

use crate::builder::{Builder, BuilderAction};
use crate::command::{SimAction, SimCommand};
use crate::config::MachinaConfig;
use crate::detect::detect;
use crate::event::{DeactivationReason, HeartbeatQueue, SimEvent, SimEventKind};
use crate::policy::{PermissionTable, ProtectedRegions};
use crate::types::{BuilderId, Face, OperatorId, VoxelCoord, Yaw};
use crate::world::VoxelWorld;
use std::collections::BTreeMap;

/// The result of processing commands and advancing the simulation.
#[derive(Debug, Default)]
pub struct StepResult {
    pub events: Vec<SimEvent>,
}

#[derive(Debug)]
pub struct BuilderSim {
    /// Current simulation tick.
    pub tick: u64,
    pub world: VoxelWorld,
    pub veto: ProtectedRegions,
    pub permissions: PermissionTable,
    pub config: MachinaConfig,
    builders: BTreeMap<BuilderId, Builder>,
    heartbeats: HeartbeatQueue,
    next_builder_id: u32,
}

impl BuilderSim {
    /// A sim over `world` with no protected regions and no granted
    /// capabilities.
    pub fn new(config: MachinaConfig, world: VoxelWorld) -> Self {
        Self {
            tick: 0,
            world,
            veto: ProtectedRegions::default(),
            permissions: PermissionTable::new(),
            config,
            builders: BTreeMap::new(),
            heartbeats: HeartbeatQueue::new(),
            next_builder_id: 1,
        }
    }

    pub fn builder(&self, builder_id: BuilderId) -> Option<&Builder> {
        self.builders.get(&builder_id)
    }

    /// Live builders in id order.
    pub fn builders(&self) -> impl Iterator<Item = (BuilderId, &Builder)> {
        self.builders.iter().map(|(id, b)| (*id, b))
    }

    pub fn heartbeats(&self) -> &HeartbeatQueue {
        &self.heartbeats
    }

    /// Apply `commands` (sorted by tick) and process scheduled events until
    /// `target_tick`.
    pub fn step(&mut self, commands: &[SimCommand], target_tick: u64) -> StepResult {
        let mut events = Vec::new();
        let mut cmd_idx = 0;

        while self.tick < target_tick {
            let next_event_tick = self.heartbeats.next_due();
            let next_cmd_tick = commands
                .get(cmd_idx)
                .filter(|c| c.tick <= target_tick)
                .map(|c| c.tick);

            let next_tick = match (next_event_tick, next_cmd_tick) {
                (Some(et), Some(ct)) => et.min(ct).min(target_tick),
                (Some(et), None) => et.min(target_tick),
                (None, Some(ct)) => ct.min(target_tick),
                (None, None) => target_tick,
            };
            // Never move backwards for commands stamped in the past.
            self.tick = next_tick.max(self.tick);

            while cmd_idx < commands.len() && commands[cmd_idx].tick <= self.tick {
                let cmd = &commands[cmd_idx];
                cmd_idx += 1;
                self.apply_command(cmd, &mut events);
            }

            while let Some(heartbeat) = self.heartbeats.pop_due(self.tick) {
                self.process_heartbeat(heartbeat.builder_id, &mut events);
            }
        }

        self.tick = target_tick;
        StepResult { events }
    }

    fn apply_command(&mut self, cmd: &SimCommand, events: &mut Vec<SimEvent>) {
        match cmd.action {
            SimAction::Activate {
                anchor,
                activation_face,
            } => self.activate(cmd.operator, anchor, activation_face, events),
            SimAction::Deactivate { builder_id } => {
                self.deactivate_by(cmd.operator, builder_id, events);
            }
            SimAction::Rotate { builder_id, delta } => {
                self.rotate(cmd.operator, builder_id, delta, events);
            }
        }
    }

    fn activate(
        &mut self,
        operator: OperatorId,
        anchor: VoxelCoord,
        activation_face: Face,
        events: &mut Vec<SimEvent>,
    ) {
        let detection = match detect(
            &self.world,
            &self.permissions,
            operator,
            anchor,
            activation_face,
        ) {
            Ok(detection) => detection,
            Err(err) => {
                log::info!("activation at {anchor} by operator {operator} rejected: {err}");
                return;
            }
        };

        let builder_id = BuilderId(self.next_builder_id);
        self.next_builder_id += 1;
        let builder = Builder::activate(
            detection,
            operator,
            &mut self.world,
            self.config.builder.clone(),
        );
        self.builders.insert(builder_id, builder);
        self.heartbeats.schedule(self.tick + 1, builder_id);
        events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::BuilderActivated {
                builder_id,
                anchor: detection.anchor,
                yaw: detection.yaw,
                modules: detection.modules,
            },
        });
    }

    fn deactivate_by(
        &mut self,
        operator: OperatorId,
        builder_id: BuilderId,
        events: &mut Vec<SimEvent>,
    ) {
        let Some(builder) = self.builders.get(&builder_id) else {
            return;
        };
        if !builder.may_deactivate(operator, &self.permissions) {
            log::info!("operator {operator} may not deactivate builder {builder_id}");
            return;
        }
        self.remove_builder(builder_id, DeactivationReason::Operator, events);
    }

    fn rotate(
        &mut self,
        operator: OperatorId,
        builder_id: BuilderId,
        delta: Yaw,
        events: &mut Vec<SimEvent>,
    ) {
        let Some(builder) = self.builders.get_mut(&builder_id) else {
            return;
        };
        match builder.rotate(&mut self.world, &self.permissions, operator, delta) {
            Ok(()) => events.push(SimEvent {
                tick: self.tick,
                kind: SimEventKind::BuilderRotated {
                    builder_id,
                    yaw: builder.yaw(),
                },
            }),
            Err(err) => log::info!("rotation of builder {builder_id} rejected: {err}"),
        }
    }

    fn remove_builder(
        &mut self,
        builder_id: BuilderId,
        reason: DeactivationReason,
        events: &mut Vec<SimEvent>,
    ) {
        if let Some(builder) = self.builders.remove(&builder_id) {
            self.heartbeats.cancel(builder_id);
            builder.on_deactivate(&mut self.world);
            events.push(SimEvent {
                tick: self.tick,
                kind: SimEventKind::BuilderDeactivated { builder_id, reason },
            });
        }
    }

    fn process_heartbeat(&mut self, builder_id: BuilderId, events: &mut Vec<SimEvent>) {
        let Some(builder) = self.builders.get_mut(&builder_id) else {
            return;
        };
        let heartbeat = builder.try_heartbeat(&mut self.world, &self.veto);

        let reason = match heartbeat {
            Ok(hb) => {
                let kind = match hb.action {
                    BuilderAction::Moved { from, to } => Some(SimEventKind::BuilderMoved {
                        builder_id,
                        from,
                        to,
                    }),
                    BuilderAction::Built { at, material } => Some(SimEventKind::BuilderActed {
                        builder_id,
                        at,
                        material,
                    }),
                    BuilderAction::Queued => None,
                };
                if let Some(kind) = kind {
                    events.push(SimEvent {
                        tick: self.tick,
                        kind,
                    });
                }
                self.heartbeats.schedule(self.tick + hb.delay, builder_id);
                return;
            }
            Err(reason) => reason,
        };

        log::debug!("builder {builder_id} stalled: {reason}");
        events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::BuilderStalled { builder_id, reason },
        });
        match self.config.stall_retry_ticks {
            Some(retry) => self.heartbeats.schedule(self.tick + retry, builder_id),
            None => self.remove_builder(builder_id, DeactivationReason::Stalled, events),
        }
    }
}
