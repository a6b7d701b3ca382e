// Heartbeat scheduling and host-visible narrative events.
//
// A live builder has exactly one pending `Heartbeat` in the
// `HeartbeatQueue`. When it comes due the sim runs that builder once and
// schedules the next heartbeat after the delay the builder asked for.
// Ticks with nothing due are skipped outright. `SimEvent`s are the output
// side: moves, placed blocks, stalls and lifecycle changes.
//
// See also: `sim.rs` for the loop that drains the queue, `builder.rs` for
// `HeartbeatEvent`.
//
// **Determinism.** Heartbeats sort by `(due, order)` and `order` is unique,
// so builders due on the same tick always run in the order they were
// scheduled.

use crate::blueprint::ModuleSet;
use crate::error::BuilderError;
use crate::types::{BuilderId, Material, VoxelCoord, Yaw};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

// ---------------------------------------------------------------------------
// Heartbeat schedule
// ---------------------------------------------------------------------------

/// One pending builder heartbeat.
///
/// Field order matters: the derived `Ord` compares `due` first and then
/// `order`, which is unique per queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Tick at which the builder runs.
    pub due: u64,
    /// Insertion counter, breaking ties between builders due together.
    pub order: u64,
    pub builder_id: BuilderId,
}

/// Pending heartbeats, earliest `(due, order)` first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HeartbeatQueue {
    heap: BinaryHeap<Reverse<Heartbeat>>,
    next_order: u64,
}

impl HeartbeatQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, builder_id: BuilderId) {
        let order = self.next_order;
        self.next_order += 1;
        self.heap.push(Reverse(Heartbeat {
            due,
            order,
            builder_id,
        }));
    }

    /// Tick of the earliest pending heartbeat.
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(hb)| hb.due)
    }

    /// Take the earliest heartbeat if it is due at or before `tick`.
    pub fn pop_due(&mut self, tick: u64) -> Option<Heartbeat> {
        match self.heap.peek() {
            Some(Reverse(hb)) if hb.due <= tick => self.heap.pop().map(|Reverse(hb)| hb),
            _ => None,
        }
    }

    /// Drop every pending heartbeat of a builder that has shut down.
    pub fn cancel(&mut self, builder_id: BuilderId) {
        self.heap.retain(|Reverse(hb)| hb.builder_id != builder_id);
    }

    pub fn pending_for(&self, builder_id: BuilderId) -> usize {
        self.heap
            .iter()
            .filter(|Reverse(hb)| hb.builder_id == builder_id)
            .count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Narrative events (output)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

/// Why a builder stopped running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeactivationReason {
    /// An operator shut it down.
    Operator,
    /// A heartbeat failed and the sim is configured not to retry.
    Stalled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventKind {
    BuilderActivated {
        builder_id: BuilderId,
        anchor: VoxelCoord,
        yaw: Yaw,
        modules: ModuleSet,
    },
    BuilderMoved {
        builder_id: BuilderId,
        from: VoxelCoord,
        to: VoxelCoord,
    },
    /// A block was placed.
    BuilderActed {
        builder_id: BuilderId,
        at: VoxelCoord,
        material: Material,
    },
    /// A heartbeat aborted; nothing changed.
    BuilderStalled {
        builder_id: BuilderId,
        reason: BuilderError,
    },
    BuilderRotated { builder_id: BuilderId, yaw: Yaw },
    BuilderDeactivated {
        builder_id: BuilderId,
        reason: DeactivationReason,
    },
}
