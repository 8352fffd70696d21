// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared recording destination for integration tests.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Point, Rect};
use unipoint_unifier::{
    Destination, ErrorReporter, EventAdapter, HandlerError, HandlerFailure, HandlerKind,
    HandlerResult, InputCoordinator, PointerId, PressOutcome, RawPointer, RectSurface, SurfaceId,
    TargetId, UnifiedPointerEvent,
};

/// One handler call as seen by a [`Recorder`].
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) surface: &'static str,
    pub(crate) kind: HandlerKind,
    pub(crate) event: UnifiedPointerEvent,
    /// Live session count observed while the handler ran.
    pub(crate) live: usize,
}

pub(crate) type Journal = Rc<RefCell<Vec<Entry>>>;

type Hook = Box<dyn Fn(HandlerKind, &UnifiedPointerEvent)>;

/// Destination that appends every call to a shared journal.
pub(crate) struct Recorder {
    name: &'static str,
    coordinator: InputCoordinator,
    journal: Journal,
    fail: Cell<Option<(HandlerKind, PointerId)>>,
    handled: Cell<Option<PointerId>>,
    hook: RefCell<Option<Hook>>,
}

impl Recorder {
    pub(crate) fn new(
        name: &'static str,
        coordinator: &InputCoordinator,
        journal: &Journal,
    ) -> Self {
        Self {
            name,
            coordinator: coordinator.clone(),
            journal: journal.clone(),
            fail: Cell::new(None),
            handled: Cell::new(None),
            hook: RefCell::new(None),
        }
    }

    /// Make `kind` fail for `pointer`.
    pub(crate) fn fail_on(&self, kind: HandlerKind, pointer: PointerId) {
        self.fail.set(Some((kind, pointer)));
    }

    /// Answer presses of `pointer` with [`PressOutcome::Handled`].
    pub(crate) fn handle_presses_of(&self, pointer: PointerId) {
        self.handled.set(Some(pointer));
    }

    /// Run `hook` after every recorded call.
    pub(crate) fn set_hook(&self, hook: impl Fn(HandlerKind, &UnifiedPointerEvent) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    fn record(&self, kind: HandlerKind, event: &UnifiedPointerEvent) -> HandlerResult {
        self.journal.borrow_mut().push(Entry {
            surface: self.name,
            kind,
            event: *event,
            live: self.coordinator.live_count(),
        });
        if let Some(hook) = self.hook.borrow().as_ref() {
            hook(kind, event);
        }
        if self.fail.get() == Some((kind, event.identifier)) {
            return Err(HandlerError::msg("recorder told to fail"));
        }
        Ok(())
    }
}

impl Destination for Recorder {
    fn pointer_pressed(&self, event: &UnifiedPointerEvent) -> HandlerResult<PressOutcome> {
        self.record(HandlerKind::Pressed, event)?;
        if self.handled.get() == Some(event.identifier) {
            return Ok(PressOutcome::Handled);
        }
        Ok(PressOutcome::AwaitRelease)
    }

    fn pointer_released(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::Released, event)
    }

    fn pointer_clicked(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::Clicked, event)
    }

    fn pointer_double_clicked(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::DoubleClicked, event)
    }

    fn pointer_moved(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::Moved, event)
    }

    fn pointer_drag_started(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::DragStarted, event)
    }

    fn pointer_dragged(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::Dragged, event)
    }

    fn pointer_drag_ended(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::DragEnded, event)
    }

    fn pointer_entered(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::Entered, event)
    }

    fn pointer_exited(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        self.record(HandlerKind::Exited, event)
    }
}

/// Reporter that keeps every failure.
#[derive(Clone, Default)]
pub(crate) struct Failures(
    pub(crate) Rc<RefCell<Vec<(SurfaceId, PointerId, HandlerKind, String)>>>,
);

impl ErrorReporter for Failures {
    fn report(&self, failure: &HandlerFailure<'_>) {
        self.0.borrow_mut().push((
            failure.surface,
            failure.pointer,
            failure.handler,
            failure.error.to_string(),
        ));
    }
}

/// A surface rooted at `root` covering `bounds`, with its recorder.
pub(crate) fn surface(
    coordinator: &InputCoordinator,
    journal: &Journal,
    name: &'static str,
    root: u64,
    bounds: Rect,
) -> (EventAdapter, Rc<Recorder>) {
    let recorder = Rc::new(Recorder::new(name, coordinator, journal));
    let adapter = EventAdapter::builder(coordinator)
        .surface(RectSurface::new(TargetId(root), bounds))
        .destination(recorder.clone())
        .build()
        .expect("surface and destination are set");
    (adapter, recorder)
}

/// Raw signal at `(x, y)` aimed at `target`.
pub(crate) fn at(x: f64, y: f64, target: u64, time: u64) -> RawPointer {
    RawPointer::new(Point::new(x, y), time).with_target(TargetId(target))
}

/// `(surface, kind, identifier)` triples of the journal, draining it.
pub(crate) fn drain(journal: &Journal) -> Vec<(&'static str, HandlerKind, PointerId)> {
    journal
        .borrow_mut()
        .drain(..)
        .map(|e| (e.surface, e.kind, e.event.identifier))
        .collect()
}
