// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifier registry: the table of currently pressed pointer sessions.
//!
//! The registry belongs to the [`InputCoordinator`](crate::coordinator::InputCoordinator),
//! not to a surface, because a session may move from one surface to another
//! while it is pressed. It holds at most one [`PressRecord`] per [`PointerId`].
//!
//! Every record carries a session serial. Cleanup code removes a record with
//! [`Registry::remove_session`], which leaves a newer session that reused the
//! identifier (for example one started from inside a handler) untouched.

use hashbrown::HashMap;
use unipoint_event_state::direction::{Direction, DirectionTracker};

use crate::timer::TaskId;
use crate::types::{DeviceClass, PointerId, Position, SurfaceId, TargetId, UnifiedPointerEvent};

/// State of one pressed pointer session.
#[derive(Clone, Debug)]
pub struct PressRecord {
    pub(crate) pointer: PointerId,
    pub(crate) owner: SurfaceId,
    pub(crate) session: u64,
    pub(crate) target: Option<TargetId>,
    pub(crate) press_position: Position,
    pub(crate) press_time: u64,
    pub(crate) position: Position,
    pub(crate) tracker: DirectionTracker,
    pub(crate) dragged: bool,
    pub(crate) group: usize,
    pub(crate) stub: UnifiedPointerEvent,
    pub(crate) release_task: Option<TaskId>,
    pub(crate) completing: bool,
}

impl PressRecord {
    /// Identifier of the session.
    pub fn pointer(&self) -> PointerId {
        self.pointer
    }

    /// Surface whose adapter owns the session.
    pub fn owner(&self) -> SurfaceId {
        self.owner
    }

    /// Serial number distinguishing this session from earlier ones with the same identifier.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Element the press originated from.
    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    /// Where the session was pressed.
    pub fn press_position(&self) -> Position {
        self.press_position
    }

    /// When the session was pressed.
    pub fn press_time(&self) -> u64 {
        self.press_time
    }

    /// Last known position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current drag direction.
    pub fn direction(&self) -> Option<Direction> {
        self.tracker.direction()
    }

    /// Whether the session has started dragging.
    pub fn is_dragged(&self) -> bool {
        self.dragged
    }

    /// Number of presses dispatched in the same batch.
    pub fn group_size(&self) -> usize {
        self.group
    }

    /// Device class of the press.
    pub fn device(&self) -> DeviceClass {
        self.stub.device
    }

    /// Contact pressure of the most recent signal.
    pub fn pressure(&self) -> f32 {
        self.stub.pressure
    }

    /// Whether completion has been deferred by the release-feedback delay.
    pub fn is_release_pending(&self) -> bool {
        self.release_task.is_some()
    }
}

/// Table of live press records keyed by pointer identifier.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    records: HashMap<PointerId, PressRecord>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `pointer` has a live session.
    pub fn has(&self, pointer: PointerId) -> bool {
        self.records.contains_key(&pointer)
    }

    /// The live session for `pointer`.
    pub fn get(&self, pointer: PointerId) -> Option<&PressRecord> {
        self.records.get(&pointer)
    }

    pub(crate) fn get_mut(&mut self, pointer: PointerId) -> Option<&mut PressRecord> {
        self.records.get_mut(&pointer)
    }

    /// Register a session, returning the one it replaced.
    ///
    /// The engine completes an earlier session before registering a new one
    /// for the same identifier, so a replacement indicates a bookkeeping bug.
    pub fn put(&mut self, record: PressRecord) -> Option<PressRecord> {
        let replaced = self.records.insert(record.pointer, record);
        debug_assert!(
            replaced.is_none(),
            "a pointer identifier must never hold two press records"
        );
        replaced
    }

    /// Remove the live session for `pointer`.
    pub fn remove(&mut self, pointer: PointerId) -> Option<PressRecord> {
        self.records.remove(&pointer)
    }

    /// Remove `pointer` only if its live session is `session`.
    pub fn remove_session(&mut self, pointer: PointerId, session: u64) -> Option<PressRecord> {
        match self.records.get(&pointer) {
            Some(record) if record.session == session => self.records.remove(&pointer),
            _ => None,
        }
    }

    /// Remove every session owned by `surface`.
    pub(crate) fn remove_owned_by(&mut self, surface: SurfaceId) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.owner != surface);
        before - self.records.len()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over live sessions in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &PressRecord> {
        self.records.values()
    }
}
