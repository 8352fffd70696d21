// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event adapter: the per-surface state machine turning DOWN/DRAG/UP/MOVE
//! signals into destination calls.
//!
//! ## Lifecycle of a session
//!
//! Each pointer identifier goes **Idle → Pressed → (Dragging) → Idle**:
//!
//! - [`EventAdapter::down`] queues the press. It is dispatched when the batch
//!   window elapses, or earlier when a release for it arrives.
//! - Dispatching registers a [`PressRecord`](crate::registry::PressRecord) with
//!   the coordinator and calls `pointer_pressed`.
//! - [`EventAdapter::drag`] fires `pointer_drag_started` on the first movement
//!   and `pointer_dragged` on every non-zero movement.
//! - [`EventAdapter::up`] completes the session: `pointer_drag_ended` for a drag,
//!   otherwise `pointer_clicked` or `pointer_double_clicked` when the pointer
//!   was released where it was pressed. `pointer_released` always comes last.
//!
//! Per identifier, a destination therefore sees
//! `Pressed → [DragStarted → Dragged*] → (DragEnded | Clicked | DoubleClicked)? → Released`.
//!
//! ## Timing
//!
//! Every operation first advances the coordinator clock to the signal's
//! timestamp so overdue timers fire before the signal is processed. A release
//! that forced its own press out of the batch queue is completed after
//! [`RELEASE_FEEDBACK_DELAY`] so the pressed state is visible for a moment.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use smallvec::SmallVec;
use unipoint_event_state::click::ReleaseKind;
use unipoint_event_state::direction::DirectionTracker;

use crate::coordinator::{BATCH_WINDOW, InputCoordinator, RELEASE_FEEDBACK_DELAY, Task};
use crate::destination::{Destination, HandlerKind, PressOutcome};
use crate::error::ConfigError;
use crate::queue::{PendingPress, PendingPresses};
use crate::registry::PressRecord;
use crate::surface::Surface;
use crate::types::{PointerId, Position, RawPointer, SurfaceId, UnifiedPointerEvent};

#[derive(Debug, Default)]
struct AdapterState {
    pending: PendingPresses,
    last_mouse: Option<Position>,
}

pub(crate) struct AdapterShared {
    pub(crate) id: SurfaceId,
    coordinator: InputCoordinator,
    surface: Box<dyn Surface>,
    destination: Rc<dyn Destination>,
    state: RefCell<AdapterState>,
}

impl Drop for AdapterShared {
    fn drop(&mut self) {
        let timer = self.state.get_mut().pending.take_timer();
        self.coordinator.detach(self.id, timer);
    }
}

/// Builder for an [`EventAdapter`].
pub struct AdapterBuilder {
    coordinator: InputCoordinator,
    surface: Option<Box<dyn Surface>>,
    destination: Option<Rc<dyn Destination>>,
}

impl core::fmt::Debug for AdapterBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdapterBuilder")
            .field("has_surface", &self.surface.is_some())
            .field("has_destination", &self.destination.is_some())
            .finish_non_exhaustive()
    }
}

impl AdapterBuilder {
    /// Start building an adapter attached to `coordinator`.
    pub fn new(coordinator: &InputCoordinator) -> Self {
        Self {
            coordinator: coordinator.clone(),
            surface: None,
            destination: None,
        }
    }

    /// The region the adapter listens on.
    pub fn surface(mut self, surface: impl Surface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// The receiver of unified events.
    pub fn destination<D: Destination + 'static>(mut self, destination: Rc<D>) -> Self {
        let destination: Rc<dyn Destination> = destination;
        self.destination = Some(destination);
        self
    }

    /// Attach the adapter to the coordinator.
    pub fn build(self) -> Result<EventAdapter, ConfigError> {
        let surface = self.surface.ok_or(ConfigError::MissingSurface)?;
        let destination = self.destination.ok_or(ConfigError::MissingDestination)?;
        let inner = Rc::new(AdapterShared {
            id: self.coordinator.allocate_surface(),
            coordinator: self.coordinator,
            surface,
            destination,
            state: RefCell::new(AdapterState::default()),
        });
        inner.coordinator.attach(&inner);
        tracing::debug!(surface = ?inner.id, "event adapter attached");
        Ok(EventAdapter { inner })
    }
}

/// Binds one surface to one destination. Cheap to clone.
///
/// The adapter detaches from its coordinator when the last clone is dropped;
/// sessions it still owned are discarded without further events.
#[derive(Clone)]
pub struct EventAdapter {
    inner: Rc<AdapterShared>,
}

impl core::fmt::Debug for EventAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("EventAdapter");
        s.field("id", &self.inner.id);
        if let Ok(state) = self.inner.state.try_borrow() {
            s.field("pending", &state.pending.len());
        }
        s.finish_non_exhaustive()
    }
}

/// Non-owning handle to an [`EventAdapter`].
#[derive(Clone, Debug, Default)]
pub struct WeakEventAdapter {
    inner: Weak<AdapterShared>,
}

impl WeakEventAdapter {
    /// The adapter, if it is still alive.
    pub fn upgrade(&self) -> Option<EventAdapter> {
        self.inner.upgrade().map(EventAdapter::from_shared)
    }
}

impl EventAdapter {
    /// Start building an adapter attached to `coordinator`.
    pub fn builder(coordinator: &InputCoordinator) -> AdapterBuilder {
        AdapterBuilder::new(coordinator)
    }

    pub(crate) fn from_shared(inner: Rc<AdapterShared>) -> Self {
        Self { inner }
    }

    /// Identifier of the adapter's surface.
    pub fn id(&self) -> SurfaceId {
        self.inner.id
    }

    /// The coordinator the adapter is attached to.
    pub fn coordinator(&self) -> &InputCoordinator {
        &self.inner.coordinator
    }

    /// The adapter's surface.
    pub fn surface(&self) -> &dyn Surface {
        &*self.inner.surface
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakEventAdapter {
        WeakEventAdapter {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Number of presses waiting for the batch window.
    pub fn pending_len(&self) -> usize {
        self.inner.state.borrow().pending.len()
    }

    /// Whether a batch flush is scheduled.
    pub fn has_scheduled_flush(&self) -> bool {
        self.inner.state.borrow().pending.has_timer()
    }

    pub(crate) fn is_pending(&self, pointer: PointerId) -> bool {
        self.inner.state.borrow().pending.contains(pointer)
    }

    pub(crate) fn remove_if_pending(&self, pointer: PointerId) -> bool {
        self.inner.state.borrow_mut().pending.remove_if_pending(pointer)
    }

    pub(crate) fn reset_move_dedup(&self) {
        self.inner.state.borrow_mut().last_mouse = None;
    }

    /// A pointer was pressed.
    ///
    /// The press is queued for the batch window. A press of an identifier that
    /// is still pressed first completes the earlier session.
    pub fn down(&self, pointer: PointerId, raw: &RawPointer) {
        let coordinator = self.coordinator();
        coordinator.advance_to(raw.time);
        coordinator.clean_outside_drag();
        if coordinator.drop_pending(pointer) {
            tracing::trace!(surface = ?self.id(), ?pointer, "superseded an unflushed press");
        }
        if coordinator.is_pressed(pointer) {
            coordinator.force_release(pointer, raw);
        }

        let needs_timer = self
            .inner
            .state
            .borrow_mut()
            .pending
            .enqueue(PendingPress::new(pointer, raw));
        if needs_timer {
            let timer = coordinator.schedule(BATCH_WINDOW, Task::FlushPresses(self.id()));
            self.inner.state.borrow_mut().pending.set_timer(timer);
        }
        tracing::trace!(surface = ?self.id(), ?pointer, "press queued");
    }

    /// Dispatch every queued press now, in arrival order.
    pub fn flush(&self) {
        let timer = self.inner.state.borrow_mut().pending.take_timer();
        if let Some(timer) = timer {
            self.coordinator().cancel(timer);
        }
        let batch = self.inner.state.borrow_mut().pending.promote();
        if batch > 0 {
            tracing::trace!(surface = ?self.id(), batch, "flushing presses");
        }
        loop {
            let next = self.inner.state.borrow_mut().pending.next_in_flight();
            let Some(entry) = next else { break };
            self.dispatch_press(entry);
        }
    }

    fn dispatch_press(&self, entry: PendingPress) {
        let coordinator = self.coordinator();
        let pointer = entry.pointer;
        if coordinator.is_pressed(pointer) {
            coordinator.force_release(pointer, &entry.raw);
        }

        let session = coordinator.next_session();
        let mut stub = UnifiedPointerEvent::from_raw(pointer, &entry.raw);
        stub.group_size = entry.group;
        let event = coordinator.with_state(|st| {
            stub.touch_counter = st.registry.len() + 1;
            st.registry.put(PressRecord {
                pointer,
                owner: self.id(),
                session,
                target: entry.raw.target,
                press_position: entry.position,
                press_time: entry.raw.time,
                position: entry.position,
                tracker: DirectionTracker::new(),
                dragged: false,
                group: entry.group,
                stub,
                release_task: None,
                completing: false,
            });
            stub
        });

        tracing::debug!(surface = ?self.id(), ?pointer, session, group = entry.group, "pressed");
        match self.inner.destination.pointer_pressed(&event) {
            Ok(PressOutcome::AwaitRelease) => {}
            Ok(PressOutcome::Handled) => {
                coordinator.retire(pointer, session);
            }
            Err(err) => {
                coordinator.retire(pointer, session);
                coordinator.report(self.id(), pointer, HandlerKind::Pressed, &err);
            }
        }
    }

    /// A pressed pointer moved.
    ///
    /// Ignored without a live session. A session owned by another surface is
    /// forwarded to that surface's adapter.
    pub fn drag(&self, pointer: PointerId, raw: &RawPointer) {
        let coordinator = self.coordinator();
        coordinator.advance_to(raw.time);
        let Some(owner) = coordinator.owning_adapter(pointer) else {
            tracing::trace!(surface = ?self.id(), ?pointer, "drag without a press ignored");
            return;
        };
        if owner.id() != self.id() {
            owner.drag(pointer, raw);
            return;
        }
        if self.has_scheduled_flush() {
            tracing::trace!(
                surface = ?self.id(),
                ?pointer,
                "drag ignored while presses are batched"
            );
            return;
        }

        let position = Position::from_point(raw.position);
        let update = coordinator.with_state(|st| {
            let live = st.registry.len();
            let record = st.registry.get_mut(pointer)?;
            if record.release_task.is_some() || record.completing {
                return None;
            }
            let dx = position.x.saturating_sub(record.position.x);
            let dy = position.y.saturating_sub(record.position.y);
            record.tracker.push(dx, dy);
            record.position = position;
            record.stub.fill_from(pointer, raw);
            record.stub.dx = dx;
            record.stub.dy = dy;
            record.stub.direction = record.tracker.direction();
            record.stub.touch_counter = live;
            let first = !record.dragged;
            record.dragged = true;
            Some((record.stub, first))
        });
        let Some((event, first)) = update else {
            return;
        };

        tracing::trace!(surface = ?self.id(), ?pointer, dx = event.dx, dy = event.dy, "dragged");
        if first {
            self.deliver(HandlerKind::DragStarted, &event);
        }
        if first || event.dx != 0 || event.dy != 0 {
            self.deliver(HandlerKind::Dragged, &event);
        }
    }

    /// A pointer was released.
    ///
    /// Pending presses are dispatched first so a press is always seen before
    /// its release. A release on a surface other than the one that owns the
    /// session hands the pointer over and lets the owner complete it.
    pub fn up(&self, pointer: PointerId, raw: &RawPointer) {
        let coordinator = self.coordinator();
        coordinator.advance_to(raw.time);
        let was_queued = self.is_pending(pointer);
        self.flush();
        if !coordinator.is_pressed(pointer)
            && let Some(other) = coordinator.adapter_with_pending(pointer)
        {
            other.flush();
        }

        let Some(owner) = coordinator.owning_adapter(pointer) else {
            tracing::trace!(surface = ?self.id(), ?pointer, "release without a press ignored");
            return;
        };
        if owner.id() != self.id() {
            self.hand_off(&owner, pointer, raw);
            return;
        }

        let pending = coordinator.with_state(|st| {
            st.registry
                .get(pointer)
                .map(|r| (r.session, r.release_task.is_some()))
        });
        match pending {
            None => {}
            Some((_, true)) => self.release_now(pointer, raw),
            Some((session, false)) if was_queued => {
                let task = coordinator.schedule(
                    RELEASE_FEEDBACK_DELAY,
                    Task::CompleteRelease {
                        surface: self.id(),
                        pointer,
                        session,
                        raw: *raw,
                    },
                );
                coordinator.with_state(|st| {
                    if let Some(record) = st.registry.get_mut(pointer) {
                        record.release_task = Some(task);
                    }
                });
                tracing::debug!(surface = ?self.id(), ?pointer, session, "release deferred");
            }
            Some(_) => self.complete(pointer, raw),
        }
    }

    /// Complete a session immediately, preferring the raw signal of a release
    /// that is still waiting for its feedback delay.
    pub(crate) fn release_now(&self, pointer: PointerId, raw: &RawPointer) {
        let coordinator = self.coordinator();
        let task = coordinator.with_state(|st| {
            st.registry
                .get_mut(pointer)
                .and_then(|r| r.release_task.take())
        });
        let deferred = match task.and_then(|task| coordinator.cancel(task)) {
            Some(Task::CompleteRelease { raw, .. }) => Some(raw),
            _ => None,
        };
        self.complete(pointer, deferred.as_ref().unwrap_or(raw));
    }

    /// Fire the end-of-session events and retire the session.
    pub(crate) fn complete(&self, pointer: PointerId, raw: &RawPointer) {
        let coordinator = self.coordinator();
        let position = Position::from_point(raw.position);
        let snapshot = coordinator.with_state(|st| {
            let live = st.registry.len();
            let record = st.registry.get_mut(pointer)?;
            if record.completing {
                return None;
            }
            record.completing = true;
            record.position = position;
            record.stub.fill_from(pointer, raw);
            record.stub.press_position = Some(record.press_position);
            record.stub.direction = record.tracker.direction();
            record.stub.touch_counter = live;
            Some((
                record.stub,
                record.session,
                record.dragged,
                record.group,
                record.release_task.take(),
            ))
        });
        let Some((event, session, dragged, group, release_task)) = snapshot else {
            return;
        };
        if let Some(task) = release_task {
            coordinator.cancel(task);
        }

        let _cleanup = SessionCleanup {
            coordinator,
            pointer,
            session,
        };
        tracing::debug!(surface = ?self.id(), ?pointer, session, dragged, "released");
        if dragged {
            self.deliver(HandlerKind::DragEnded, &event);
        } else {
            let kind = coordinator.record_release(pointer, event.time);
            if event.press_position == Some(event.position) {
                match kind {
                    ReleaseKind::Double => self.deliver(HandlerKind::DoubleClicked, &event),
                    ReleaseKind::Single if group == event.touch_counter => {
                        self.deliver(HandlerKind::Clicked, &event);
                    }
                    ReleaseKind::Single => {
                        tracing::trace!(
                            ?pointer,
                            group,
                            live = event.touch_counter,
                            "click suppressed, live sessions changed since the press"
                        );
                    }
                }
            }
        }
        self.deliver(HandlerKind::Released, &event);
    }

    /// The mouse moved.
    ///
    /// While a mouse button is pressed this drags that button's session;
    /// otherwise it fires `pointer_moved`. Repeated positions are dropped.
    pub fn moved(&self, raw: &RawPointer) {
        let coordinator = self.coordinator();
        coordinator.advance_to(raw.time);
        let position = Position::from_point(raw.position);
        {
            let mut state = self.inner.state.borrow_mut();
            if state.last_mouse == Some(position) {
                return;
            }
            state.last_mouse = Some(position);
        }

        let pressed: SmallVec<[PointerId; 2]> = [PointerId::LeftMouse, PointerId::RightMouse]
            .into_iter()
            .filter(|p| coordinator.is_pressed(*p))
            .collect();
        if !pressed.is_empty() {
            for pointer in pressed {
                self.drag(pointer, raw);
            }
            return;
        }
        let event = coordinator.event_for(PointerId::Mouse, raw);
        self.deliver(HandlerKind::Moved, &event);
    }

    /// Call one destination handler, reporting a failure.
    pub(crate) fn deliver(&self, handler: HandlerKind, event: &UnifiedPointerEvent) {
        let destination = &*self.inner.destination;
        let result = match handler {
            HandlerKind::Pressed => destination.pointer_pressed(event).map(drop),
            HandlerKind::Released => destination.pointer_released(event),
            HandlerKind::Clicked => destination.pointer_clicked(event),
            HandlerKind::DoubleClicked => destination.pointer_double_clicked(event),
            HandlerKind::Moved => destination.pointer_moved(event),
            HandlerKind::DragStarted => destination.pointer_drag_started(event),
            HandlerKind::Dragged => destination.pointer_dragged(event),
            HandlerKind::DragEnded => destination.pointer_drag_ended(event),
            HandlerKind::Entered => destination.pointer_entered(event),
            HandlerKind::Exited => destination.pointer_exited(event),
        };
        if let Err(err) = result {
            self.coordinator()
                .report(self.id(), event.identifier, handler, &err);
        }
    }
}

/// Retires a completed session even when a handler panics.
struct SessionCleanup<'a> {
    coordinator: &'a InputCoordinator,
    pointer: PointerId,
    session: u64,
}

impl Drop for SessionCleanup<'_> {
    fn drop(&mut self) {
        self.coordinator.finish_session(self.pointer, self.session);
    }
}
