// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unipoint Unifier: one ordered stream of pointer events from mouse, touch and pen.
//!
//! ## Overview
//!
//! Platforms deliver pointer input as separate, inconsistent families of
//! signals. This crate turns them into a single [`UnifiedPointerEvent`]
//! type and a fixed set of logical handlers on a [`Destination`]: pressed,
//! released, clicked, double-clicked, moved, drag start/drag/drag end, entered
//! and exited.
//!
//! It does not hit test and does not render. Hosts tell it which surface a
//! signal landed on; each surface has one [`EventAdapter`] bound to one
//! destination.
//!
//! ## Pieces
//!
//! - [`InputCoordinator`]: state shared by all surfaces, including the registry
//!   of pressed sessions, double-click memory, timers and entry tracking.
//!   Create one and hand it to every adapter.
//! - [`EventAdapter`]: per-surface DOWN/DRAG/UP/MOVE state machine, built with
//!   [`AdapterBuilder`]. The [`input`] module adds mouse, touch and pointer
//!   front-ends on top.
//! - [`Destination`]: the handler trait a surface owner implements.
//! - [`Surface`]: containment queries; [`RectSurface`] is a ready-made one.
//!
//! ## Guarantees
//!
//! For each pointer identifier a destination sees
//! `Pressed → [DragStarted → Dragged*] → (DragEnded | Clicked | DoubleClicked)? → Released`.
//! At most one session per identifier is live; pressing a pressed identifier
//! completes the earlier session first. `touch_counter` on every event is the
//! number of live sessions at that moment. Presses landing within the batch
//! window are dispatched together, in arrival order, and share a group size.
//! A failing handler loses only its own event.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::{Point, Rect};
//! use unipoint_unifier::{
//!     Destination, EventAdapter, HandlerResult, InputCoordinator, MouseButton, RawPointer,
//!     RectSurface, TargetId, UnifiedPointerEvent, UnifierConfig,
//! };
//!
//! struct Button;
//!
//! impl Destination for Button {
//!     fn pointer_clicked(&self, event: &UnifiedPointerEvent) -> HandlerResult {
//!         assert!(event.is_action());
//!         Ok(())
//!     }
//! }
//!
//! let coordinator = InputCoordinator::new(UnifierConfig::default());
//! let adapter = EventAdapter::builder(&coordinator)
//!     .surface(RectSurface::new(TargetId(1), Rect::new(0.0, 0.0, 80.0, 24.0)))
//!     .destination(Rc::new(Button))
//!     .build()?;
//!
//! let at = |time| RawPointer::new(Point::new(10.0, 10.0), time).with_target(TargetId(1));
//! adapter.mouse_down(MouseButton::Left, &at(0));
//! adapter.mouse_up(MouseButton::Left, &at(120));
//! assert_eq!(coordinator.live_count(), 0);
//! # Ok::<(), unipoint_unifier::ConfigError>(())
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` floating-point math for `kurbo`.
//!
//! This crate is `no_std` and uses `alloc`. Logging goes through `tracing`.

#![no_std]

extern crate alloc;

pub mod adapter;
pub mod coordinator;
pub mod destination;
pub mod error;
pub mod input;
pub mod registry;
pub mod surface;
pub mod timer;
pub mod types;

mod handoff;
mod queue;

pub use adapter::{AdapterBuilder, EventAdapter, WeakEventAdapter};
pub use coordinator::{
    BATCH_WINDOW, InputCoordinator, RELEASE_FEEDBACK_DELAY, TouchPoint, UnifierConfig,
};
pub use destination::{Destination, HandlerKind, HandlerResult, PressOutcome};
pub use error::{ConfigError, ErrorReporter, HandlerError, HandlerFailure, TracingReporter};
pub use input::{Outcome, TOUCH_DRAG_THRESHOLD, Touch};
pub use surface::{RectSurface, Surface};
pub use types::{
    DeviceClass, Modifiers, MouseButton, PointerId, Position, RawPointer, SurfaceId, TargetId,
    UnifiedPointerEvent,
};
pub use unipoint_event_state::click::ReleaseKind;
pub use unipoint_event_state::direction::Direction;
