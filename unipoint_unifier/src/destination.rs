// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The destination contract: named handlers a surface owner implements.
//!
//! Every handler receives one [`UnifiedPointerEvent`] and defaults to doing
//! nothing, so a destination only implements what it cares about. Handlers are
//! called synchronously on the dispatch sequence and take `&self`; keep any
//! state behind `Cell`/`RefCell`. A handler may feed new signals into any
//! adapter while it runs (for example to synthesize a press); the engine holds
//! no borrows across handler calls.
//!
//! A handler that returns `Err` loses only its own event: the error goes to the
//! coordinator's [`ErrorReporter`](crate::error::ErrorReporter) and dispatch
//! carries on.
//!
//! ```
//! use core::cell::Cell;
//! use unipoint_unifier::destination::{Destination, HandlerResult, PressOutcome};
//! use unipoint_unifier::types::UnifiedPointerEvent;
//!
//! #[derive(Default)]
//! struct ClickCounter {
//!     clicks: Cell<u32>,
//! }
//!
//! impl Destination for ClickCounter {
//!     fn pointer_clicked(&self, _: &UnifiedPointerEvent) -> HandlerResult {
//!         self.clicks.set(self.clicks.get() + 1);
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::HandlerError;
use crate::types::UnifiedPointerEvent;

/// Result type returned by destination handlers.
pub type HandlerResult<T = ()> = Result<T, HandlerError>;

/// What a press handler wants the engine to do with the new session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PressOutcome {
    /// Track the session until its release.
    #[default]
    AwaitRelease,
    /// The press was fully handled; retire the session without a release.
    Handled,
}

/// Identifies a destination handler, for error reports and logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// [`Destination::pointer_pressed`].
    Pressed,
    /// [`Destination::pointer_released`].
    Released,
    /// [`Destination::pointer_clicked`].
    Clicked,
    /// [`Destination::pointer_double_clicked`].
    DoubleClicked,
    /// [`Destination::pointer_moved`].
    Moved,
    /// [`Destination::pointer_drag_started`].
    DragStarted,
    /// [`Destination::pointer_dragged`].
    Dragged,
    /// [`Destination::pointer_drag_ended`].
    DragEnded,
    /// [`Destination::pointer_entered`].
    Entered,
    /// [`Destination::pointer_exited`].
    Exited,
}

/// Logical receiver of unified pointer events for one surface.
pub trait Destination {
    /// A session started.
    fn pointer_pressed(&self, event: &UnifiedPointerEvent) -> HandlerResult<PressOutcome> {
        let _ = event;
        Ok(PressOutcome::AwaitRelease)
    }

    /// A session ended. Always the last event of a session.
    fn pointer_released(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// A session ended where it started without dragging.
    fn pointer_clicked(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// A click that closely followed a release of the same pointer.
    fn pointer_double_clicked(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// The mouse moved with no button pressed.
    fn pointer_moved(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// First movement of a pressed session.
    fn pointer_drag_started(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// Movement of a pressed session.
    fn pointer_dragged(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// A dragged session ended.
    fn pointer_drag_ended(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// The pointer entered the surface.
    fn pointer_entered(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }

    /// The pointer left the surface.
    fn pointer_exited(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        let _ = event;
        Ok(())
    }
}
