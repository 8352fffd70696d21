// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mouse drag that leaves its surface, crosses empty space and is released
//! over a second surface.
//!
//! This example shows how to combine:
//! - `mouse_out` with a button held, which keeps the drag alive outside,
//! - `InputCoordinator::move_outside` for moves over no surface,
//! - a release on another surface, which hands the pointer over with an
//!   exited/entered pair before the owner completes the drag,
//! - a custom `ErrorReporter` catching a failing handler.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p unipoint_demos --example cross_surface_drag`

use std::rc::Rc;

use kurbo::{Point, Rect};
use tracing_subscriber::EnvFilter;
use unipoint_unifier::{
    Destination, ErrorReporter, EventAdapter, HandlerError, HandlerFailure, HandlerResult,
    InputCoordinator, MouseButton, RawPointer, RectSurface, TargetId, UnifiedPointerEvent,
    UnifierConfig,
};

/// A palette the drag starts from.
struct Palette;

impl Destination for Palette {
    fn pointer_drag_started(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        println!("palette: drag started at {:?}", event.position);
        Ok(())
    }

    fn pointer_dragged(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        println!(
            "palette: dragged by ({}, {}) heading {:?}",
            event.dx, event.dy, event.direction
        );
        Ok(())
    }

    fn pointer_drag_ended(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        println!(
            "palette: drag ended at {:?}, pressed at {:?}",
            event.position, event.press_position
        );
        Ok(())
    }

    fn pointer_exited(&self, _: &UnifiedPointerEvent) -> HandlerResult {
        Err(HandlerError::msg("palette has no exit animation"))
    }
}

/// A canvas the drag is dropped on.
struct Canvas;

impl Destination for Canvas {
    fn pointer_entered(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        println!("canvas: pointer {:?} entered", event.identifier);
        Ok(())
    }
}

/// Prints failures instead of logging them.
struct PrintReporter;

impl ErrorReporter for PrintReporter {
    fn report(&self, failure: &HandlerFailure<'_>) {
        println!(
            "error: {:?} handler of {:?} failed: {}",
            failure.handler, failure.surface, failure.error
        );
    }
}

fn at(x: f64, y: f64, target: u64, time: u64) -> RawPointer {
    RawPointer::new(Point::new(x, y), time).with_target(TargetId(target))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let coordinator = InputCoordinator::with_reporter(UnifierConfig::default(), PrintReporter);
    let palette = EventAdapter::builder(&coordinator)
        .surface(RectSurface::new(
            TargetId(1),
            Rect::new(0.0, 0.0, 100.0, 400.0),
        ))
        .destination(Rc::new(Palette))
        .build()
        .expect("surface and destination are set");
    let canvas = EventAdapter::builder(&coordinator)
        .surface(RectSurface::new(
            TargetId(2),
            Rect::new(200.0, 0.0, 800.0, 400.0),
        ))
        .destination(Rc::new(Canvas))
        .build()
        .expect("surface and destination are set");

    palette.mouse_over(&at(50.0, 50.0, 1, 0));
    palette.mouse_down(MouseButton::Left, &at(50.0, 50.0, 1, 10));
    palette.mouse_move(&at(70.0, 52.0, 1, 40));
    palette.mouse_move(&at(99.0, 55.0, 1, 60));
    palette.mouse_out(&at(101.0, 55.0, 1, 70), None);

    // Nothing under the cursor between the two surfaces.
    coordinator.move_outside(&at(150.0, 60.0, 0, 80));

    canvas.mouse_over(&at(210.0, 60.0, 2, 90));
    canvas.mouse_move(&at(230.0, 64.0, 2, 100));
    canvas.mouse_up(MouseButton::Left, &at(230.0, 64.0, 2, 120));

    assert_eq!(coordinator.entered_surface(), Some(canvas.id()));
    assert_eq!(coordinator.live_count(), 0);
}
