// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input coordination service: the state shared by every surface.
//!
//! ## Overview
//!
//! An [`InputCoordinator`] owns everything that outlives a single surface:
//!
//! - the [`Registry`] of pressed sessions (a session can migrate between
//!   surfaces mid-press),
//! - the double-click memory of the last completed release,
//! - the deferred task table and its clock,
//! - entry tracking (which surface the cursor was last recorded inside) and the
//!   outside-drag listener used when a mouse drag leaves every surface.
//!
//! It starts empty. Adapters are attached to it when they are built and detach
//! themselves when dropped; there is no other teardown.
//!
//! ## Clock
//!
//! Time is supplied by the host. Every adapter operation advances the clock to
//! the timestamp of its raw signal first, so timers that were due before the
//! signal run before it. Hosts call [`InputCoordinator::advance_to`] from their
//! own tick to fire timers when no signal arrives; [`InputCoordinator::next_deadline`]
//! tells them when the next one is due.
//!
//! ## Threading
//!
//! The coordinator is `!Send`: all signals for one coordinator are processed on
//! one dispatch sequence. Handlers may reenter the engine; no internal borrow
//! is held while a destination runs.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::HashMap;
use unipoint_event_state::click::{DEFAULT_DOUBLE_CLICK_DELTA, DoubleClickState, ReleaseKind};

use crate::adapter::{AdapterShared, EventAdapter};
use crate::destination::HandlerKind;
use crate::error::{ErrorReporter, HandlerError, HandlerFailure, TracingReporter};
use crate::registry::{PressRecord, Registry};
use crate::timer::{TaskId, Timers};
use crate::types::{
    DeviceClass, PointerId, Position, RawPointer, SurfaceId, TargetId, UnifiedPointerEvent,
};

/// Delay, in milliseconds, used to coalesce near-simultaneous presses.
pub const BATCH_WINDOW: u64 = 25;

/// Delay, in milliseconds, before completing a release whose press was still
/// waiting in the batch queue, so the pressed state gets a chance to render.
pub const RELEASE_FEEDBACK_DELAY: u64 = 50;

/// Tunable engine settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnifierConfig {
    /// Maximum time between two releases of the same pointer for them to count
    /// as a double click, in milliseconds.
    pub double_click_delta: u64,
}

impl Default for UnifierConfig {
    fn default() -> Self {
        Self {
            double_click_delta: DEFAULT_DOUBLE_CLICK_DELTA,
        }
    }
}

impl UnifierConfig {
    /// Set the double-click window.
    pub fn with_double_click_delta(mut self, delta: u64) -> Self {
        self.double_click_delta = delta;
        self
    }
}

/// Snapshot of one live session, as returned by [`InputCoordinator::touches`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchPoint {
    /// Session identifier.
    pub identifier: PointerId,
    /// Last known position.
    pub position: Position,
    /// Element the press originated from.
    pub target: Option<TargetId>,
    /// Contact pressure of the most recent signal.
    pub pressure: f32,
    /// Device class of the session.
    pub device: DeviceClass,
}

#[derive(Clone, Debug)]
pub(crate) enum Task {
    FlushPresses(SurfaceId),
    CompleteRelease {
        surface: SurfaceId,
        pointer: PointerId,
        session: u64,
        raw: RawPointer,
    },
}

pub(crate) struct CoordinatorState {
    pub(crate) now: u64,
    pub(crate) registry: Registry,
    pub(crate) clicks: DoubleClickState<PointerId>,
    pub(crate) timers: Timers<Task>,
    pub(crate) adapters: HashMap<SurfaceId, Weak<AdapterShared>>,
    pub(crate) entered: Option<SurfaceId>,
    pub(crate) outside_drag: Option<SurfaceId>,
    next_surface: u32,
    next_session: u64,
}

struct Shared {
    config: UnifierConfig,
    state: RefCell<CoordinatorState>,
    reporter: Box<dyn ErrorReporter>,
}

/// Shared input state for a set of surfaces. Cheap to clone.
#[derive(Clone)]
pub struct InputCoordinator {
    shared: Rc<Shared>,
}

impl core::fmt::Debug for InputCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.shared.state.try_borrow();
        let mut s = f.debug_struct("InputCoordinator");
        s.field("config", &self.shared.config);
        if let Ok(state) = state {
            s.field("now", &state.now)
                .field("live", &state.registry.len())
                .field("timers", &state.timers.len())
                .field("surfaces", &state.adapters.len());
        }
        s.finish_non_exhaustive()
    }
}

impl Default for InputCoordinator {
    fn default() -> Self {
        Self::new(UnifierConfig::default())
    }
}

impl InputCoordinator {
    /// Create a coordinator that reports handler failures through `tracing`.
    pub fn new(config: UnifierConfig) -> Self {
        Self::with_reporter(config, TracingReporter)
    }

    /// Create a coordinator with a custom failure reporter.
    pub fn with_reporter(config: UnifierConfig, reporter: impl ErrorReporter + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                config,
                state: RefCell::new(CoordinatorState {
                    now: 0,
                    registry: Registry::new(),
                    clicks: DoubleClickState::with_delta(config.double_click_delta),
                    timers: Timers::new(),
                    adapters: HashMap::new(),
                    entered: None,
                    outside_drag: None,
                    next_surface: 0,
                    next_session: 0,
                }),
                reporter: Box::new(reporter),
            }),
        }
    }

    /// The configuration the coordinator was created with.
    pub fn config(&self) -> UnifierConfig {
        self.shared.config
    }

    /// Current clock value in milliseconds.
    pub fn now(&self) -> u64 {
        self.with_state(|st| st.now)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.with_state(|st| st.timers.next_deadline())
    }

    /// Advance the clock to `now` and run every timer due by then, in deadline order.
    ///
    /// The clock never moves backwards; an earlier `now` only runs timers that
    /// are already overdue.
    pub fn advance_to(&self, now: u64) {
        loop {
            let due = self.with_state(|st| {
                st.now = st.now.max(now);
                let now = st.now;
                st.timers.pop_due(now)
            });
            let Some((_, task)) = due else { break };
            self.run_task(task);
        }
    }

    /// Whether `pointer` has a live session.
    pub fn is_pressed(&self, pointer: PointerId) -> bool {
        self.with_state(|st| st.registry.has(pointer))
    }

    /// A copy of the live session for `pointer`.
    pub fn press_record(&self, pointer: PointerId) -> Option<PressRecord> {
        self.with_state(|st| st.registry.get(pointer).cloned())
    }

    /// Number of live sessions.
    pub fn live_count(&self) -> usize {
        self.with_state(|st| st.registry.len())
    }

    /// Snapshot of every live session.
    pub fn touches(&self) -> Vec<TouchPoint> {
        self.with_state(|st| {
            st.registry
                .iter()
                .map(|r| TouchPoint {
                    identifier: r.pointer,
                    position: r.position,
                    target: r.target,
                    pressure: r.stub.pressure,
                    device: r.stub.device,
                })
                .collect()
        })
    }

    /// Surface the cursor was last recorded inside.
    pub fn entered_surface(&self) -> Option<SurfaceId> {
        self.with_state(|st| st.entered)
    }

    /// Surface whose mouse drag is being continued outside every surface.
    pub fn outside_drag_surface(&self) -> Option<SurfaceId> {
        self.with_state(|st| st.outside_drag)
    }

    /// The live adapter bound to `surface`.
    pub fn adapter(&self, surface: SurfaceId) -> Option<EventAdapter> {
        let weak = self.with_state(|st| st.adapters.get(&surface).cloned())?;
        weak.upgrade().map(EventAdapter::from_shared)
    }

    /// Every live adapter, in surface creation order.
    pub fn adapters(&self) -> Vec<EventAdapter> {
        let mut weak: Vec<(SurfaceId, Weak<AdapterShared>)> = self.with_state(|st| {
            st.adapters
                .iter()
                .map(|(id, w)| (*id, w.clone()))
                .collect()
        });
        weak.sort_by_key(|(id, _)| *id);
        weak.into_iter()
            .filter_map(|(_, w)| w.upgrade().map(EventAdapter::from_shared))
            .collect()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut CoordinatorState) -> R) -> R {
        f(&mut self.shared.state.borrow_mut())
    }

    pub(crate) fn attach(&self, shared: &Rc<AdapterShared>) {
        self.with_state(|st| {
            st.adapters.insert(shared.id, Rc::downgrade(shared));
        });
    }

    pub(crate) fn allocate_surface(&self) -> SurfaceId {
        self.with_state(|st| {
            let id = SurfaceId(st.next_surface);
            st.next_surface += 1;
            id
        })
    }

    /// Forget a dropped adapter and everything it owned.
    ///
    /// Runs from `Drop`, so it backs off instead of panicking when the state is
    /// already borrowed.
    pub(crate) fn detach(&self, surface: SurfaceId, flush_timer: Option<TaskId>) {
        let Ok(mut st) = self.shared.state.try_borrow_mut() else {
            tracing::warn!(?surface, "adapter dropped while coordinator state was borrowed");
            return;
        };
        st.adapters.remove(&surface);
        if let Some(timer) = flush_timer {
            st.timers.cancel(timer);
        }
        let orphaned = st.registry.remove_owned_by(surface);
        if orphaned > 0 {
            tracing::warn!(?surface, orphaned, "dropped live sessions of a detached surface");
        }
        if st.entered == Some(surface) {
            st.entered = None;
        }
        if st.outside_drag == Some(surface) {
            st.outside_drag = None;
        }
    }

    pub(crate) fn next_session(&self) -> u64 {
        self.with_state(|st| {
            st.next_session += 1;
            st.next_session
        })
    }

    pub(crate) fn schedule(&self, delay: u64, task: Task) -> TaskId {
        self.with_state(|st| {
            let deadline = st.now.saturating_add(delay);
            st.timers.schedule(deadline, task)
        })
    }

    pub(crate) fn cancel(&self, task: TaskId) -> Option<Task> {
        self.with_state(|st| st.timers.cancel(task))
    }

    pub(crate) fn owner_of(&self, pointer: PointerId) -> Option<SurfaceId> {
        self.with_state(|st| st.registry.get(pointer).map(|r| r.owner))
    }

    pub(crate) fn session_of(&self, pointer: PointerId) -> Option<u64> {
        self.with_state(|st| st.registry.get(pointer).map(|r| r.session))
    }

    /// The adapter owning the live session of `pointer`.
    ///
    /// A session whose adapter is gone is removed on the spot.
    pub(crate) fn owning_adapter(&self, pointer: PointerId) -> Option<EventAdapter> {
        let owner = self.owner_of(pointer)?;
        let adapter = self.adapter(owner);
        if adapter.is_none() {
            tracing::warn!(?pointer, ?owner, "removing session of a detached surface");
            self.with_state(|st| st.registry.remove(pointer));
        }
        adapter
    }

    /// Complete the live session of `pointer` on its owning adapter.
    ///
    /// A session that is already completing further up the stack cannot be
    /// completed twice; it is dropped so the identifier is free again.
    pub(crate) fn force_release(&self, pointer: PointerId, raw: &RawPointer) {
        let Some(session) = self.session_of(pointer) else {
            return;
        };
        if let Some(owner) = self.owning_adapter(pointer) {
            tracing::debug!(
                ?pointer,
                session,
                "completing previous session of a pressed identifier"
            );
            owner.release_now(pointer, raw);
        }
        if self.retire(pointer, session) {
            tracing::trace!(?pointer, session, "dropped a session that was still completing");
        }
    }

    /// Cleanup at the end of a completed session.
    ///
    /// Runs from a drop guard, so it backs off instead of panicking when the
    /// state is already borrowed.
    pub(crate) fn finish_session(&self, pointer: PointerId, session: u64) {
        let Ok(mut st) = self.shared.state.try_borrow_mut() else {
            tracing::warn!(
                ?pointer,
                session,
                "session cleanup skipped, coordinator state borrowed"
            );
            return;
        };
        st.registry.remove_session(pointer, session);
        if !mouse_button_pressed(&st.registry) {
            st.outside_drag = None;
        }
    }

    /// Remove `pointer` if `session` is still its live session.
    pub(crate) fn retire(&self, pointer: PointerId, session: u64) -> bool {
        self.with_state(|st| st.registry.remove_session(pointer, session).is_some())
    }

    /// Drop unflushed presses of `pointer` from every adapter's queue.
    pub(crate) fn drop_pending(&self, pointer: PointerId) -> bool {
        let mut dropped = false;
        for adapter in self.adapters() {
            dropped |= adapter.remove_if_pending(pointer);
        }
        dropped
    }

    /// An adapter whose batch queue still holds a press of `pointer`.
    pub(crate) fn adapter_with_pending(&self, pointer: PointerId) -> Option<EventAdapter> {
        self.adapters()
            .into_iter()
            .find(|adapter| adapter.is_pending(pointer))
    }

    pub(crate) fn record_release(&self, pointer: PointerId, time: u64) -> ReleaseKind {
        self.with_state(|st| st.clicks.on_release(pointer, time))
    }

    /// Build an event for `pointer` from `raw` with the current live count.
    pub(crate) fn event_for(&self, pointer: PointerId, raw: &RawPointer) -> UnifiedPointerEvent {
        let mut event = UnifiedPointerEvent::from_raw(pointer, raw);
        event.touch_counter = self.live_count();
        event
    }

    pub(crate) fn set_entered(&self, surface: Option<SurfaceId>) {
        self.with_state(|st| st.entered = surface);
    }

    pub(crate) fn take_entered(&self) -> Option<SurfaceId> {
        self.with_state(|st| st.entered.take())
    }

    pub(crate) fn mouse_button_pressed(&self) -> bool {
        self.with_state(|st| mouse_button_pressed(&st.registry))
    }

    /// Drop the outside-drag listener once no mouse button is pressed.
    pub(crate) fn clean_outside_drag(&self) {
        self.with_state(|st| {
            if !mouse_button_pressed(&st.registry) {
                st.outside_drag = None;
            }
        });
    }

    pub(crate) fn start_outside_drag(&self, surface: SurfaceId) {
        self.with_state(|st| st.outside_drag = Some(surface));
    }

    pub(crate) fn stop_outside_drag(&self) {
        self.with_state(|st| st.outside_drag = None);
    }

    /// Whether a live touch or pen session sits at `position`.
    pub(crate) fn session_at(&self, position: Position) -> bool {
        self.with_state(|st| {
            st.registry
                .iter()
                .any(|r| r.pointer.is_session() && r.position == position)
        })
    }

    pub(crate) fn report(
        &self,
        surface: SurfaceId,
        pointer: PointerId,
        handler: HandlerKind,
        error: &HandlerError,
    ) {
        self.shared.reporter.report(&HandlerFailure {
            surface,
            pointer,
            handler,
            error,
        });
    }

    fn run_task(&self, task: Task) {
        match task {
            Task::FlushPresses(surface) => {
                if let Some(adapter) = self.adapter(surface) {
                    tracing::trace!(?surface, "batch window elapsed");
                    adapter.flush();
                }
            }
            Task::CompleteRelease {
                surface,
                pointer,
                session,
                raw,
            } => {
                if self.session_of(pointer) != Some(session) {
                    return;
                }
                if let Some(adapter) = self.adapter(surface) {
                    adapter.complete(pointer, &raw);
                }
            }
        }
    }
}

fn mouse_button_pressed(registry: &Registry) -> bool {
    registry.iter().any(|record| record.pointer().is_mouse_button())
}
