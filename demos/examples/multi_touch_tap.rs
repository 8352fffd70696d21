// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched touches, taps and a double tap on one surface.
//!
//! This example shows:
//! - two fingers landing within the batch window dispatched as one group,
//! - the tap of the second finger suppressed because the group changed,
//! - a double tap detected from two quick single-finger taps,
//! - driving the engine's clock from a host tick with `next_deadline`.
//!
//! Run:
//! - `RUST_LOG=unipoint_unifier=trace cargo run -p unipoint_demos --example multi_touch_tap`

use std::rc::Rc;

use kurbo::{Point, Rect};
use tracing_subscriber::EnvFilter;
use unipoint_unifier::{
    Destination, EventAdapter, HandlerResult, InputCoordinator, PressOutcome, RawPointer,
    RectSurface, TargetId, Touch, UnifiedPointerEvent, UnifierConfig,
};

/// Prints every handler call.
struct Printer;

fn show(name: &str, event: &UnifiedPointerEvent) {
    println!(
        "{name:>14} {:?} at ({}, {}) t={} live={} group={}",
        event.identifier,
        event.position.x,
        event.position.y,
        event.time,
        event.touch_counter,
        event.group_size,
    );
}

impl Destination for Printer {
    fn pointer_pressed(&self, event: &UnifiedPointerEvent) -> HandlerResult<PressOutcome> {
        show("pressed", event);
        Ok(PressOutcome::AwaitRelease)
    }

    fn pointer_released(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        show("released", event);
        Ok(())
    }

    fn pointer_clicked(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        show("clicked", event);
        Ok(())
    }

    fn pointer_double_clicked(&self, event: &UnifiedPointerEvent) -> HandlerResult {
        show("double clicked", event);
        Ok(())
    }
}

fn touch(id: u64, x: f64, y: f64, time: u64) -> Touch {
    Touch::new(
        id,
        RawPointer::new(Point::new(x, y), time).with_target(TargetId(1)),
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let coordinator = InputCoordinator::new(UnifierConfig::default());
    let adapter = EventAdapter::builder(&coordinator)
        .surface(RectSurface::new(
            TargetId(1),
            Rect::new(0.0, 0.0, 320.0, 480.0),
        ))
        .destination(Rc::new(Printer))
        .build()
        .expect("surface and destination are set");

    println!("-- two fingers, 8 ms apart");
    adapter.touch_start(&[touch(1, 100.0, 100.0, 0)], &[1]);
    adapter.touch_start(&[touch(2, 200.0, 100.0, 8)], &[1, 2]);
    // Host tick: fire the batch flush when it is due.
    if let Some(deadline) = coordinator.next_deadline() {
        coordinator.advance_to(deadline);
    }
    adapter.touch_end(&[touch(1, 100.0, 100.0, 120)]);
    adapter.touch_end(&[touch(2, 200.0, 100.0, 130)]);

    println!("-- double tap");
    adapter.touch_start(&[touch(3, 50.0, 50.0, 1000)], &[3]);
    adapter.touch_end(&[touch(3, 50.0, 50.0, 1060)]);
    // Platforms that reuse contact ids report the second tap under the same id.
    adapter.touch_start(&[touch(3, 50.0, 50.0, 1150)], &[3]);
    adapter.touch_end(&[touch(3, 50.0, 50.0, 1200)]);
    while let Some(deadline) = coordinator.next_deadline() {
        coordinator.advance_to(deadline);
    }

    assert_eq!(coordinator.live_count(), 0, "every touch was released");
}
