// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end session behavior across adapters sharing one coordinator.

mod common;

use common::{Failures, Journal, at, drain, surface};
use kurbo::Rect;
use unipoint_unifier::{
    BATCH_WINDOW, HandlerKind, InputCoordinator, MouseButton, Outcome, PointerId, Position,
    RELEASE_FEEDBACK_DELAY, UnifierConfig,
};

use HandlerKind::*;

const LEFT: PointerId = PointerId::LeftMouse;

fn square(x0: f64) -> Rect {
    Rect::new(x0, 0.0, x0 + 100.0, 100.0)
}

#[test]
fn click_double_click_click_timing() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.down(LEFT, &at(10.0, 10.0, 1, 0));
    a.up(LEFT, &at(10.0, 10.0, 1, 50));
    a.down(LEFT, &at(10.0, 10.0, 1, 200));
    a.up(LEFT, &at(10.0, 10.0, 1, 300));
    a.down(LEFT, &at(10.0, 10.0, 1, 600));
    a.up(LEFT, &at(10.0, 10.0, 1, 700));

    let kinds: Vec<HandlerKind> = drain(&journal).into_iter().map(|(_, k, _)| k).collect();
    assert_eq!(
        kinds,
        [
            Pressed,
            Clicked,
            Released,
            Pressed,
            DoubleClicked,
            Released,
            Pressed,
            Clicked,
            Released
        ]
    );
}

#[test]
fn double_click_window_is_configurable() {
    let coordinator = InputCoordinator::new(UnifierConfig::default().with_double_click_delta(100));
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.down(LEFT, &at(10.0, 10.0, 1, 0));
    a.up(LEFT, &at(10.0, 10.0, 1, 50));
    a.down(LEFT, &at(10.0, 10.0, 1, 200));
    a.up(LEFT, &at(10.0, 10.0, 1, 300));

    let kinds: Vec<HandlerKind> = drain(&journal).into_iter().map(|(_, k, _)| k).collect();
    assert_eq!(kinds, [Pressed, Clicked, Released, Pressed, Clicked, Released]);
}

#[test]
fn batched_presses_keep_arrival_order_and_share_group_size() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.down(PointerId::Session(7), &at(10.0, 10.0, 1, 0));
    a.down(PointerId::Session(3), &at(40.0, 10.0, 1, 10));
    assert!(journal.borrow().is_empty());
    coordinator.advance_to(BATCH_WINDOW);

    let entries = journal.borrow().clone();
    let presses: Vec<(PointerId, usize, usize)> = entries
        .iter()
        .map(|e| (e.event.identifier, e.event.group_size, e.event.touch_counter))
        .collect();
    assert_eq!(
        presses,
        [(PointerId::Session(7), 2, 1), (PointerId::Session(3), 2, 2)]
    );
    assert!(entries.iter().all(|e| e.event.touch_counter == e.live));
}

#[test]
fn second_finger_release_does_not_click() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.down(PointerId::Session(1), &at(10.0, 10.0, 1, 0));
    a.down(PointerId::Session(2), &at(40.0, 10.0, 1, 5));
    coordinator.advance_to(BATCH_WINDOW);
    drain(&journal);

    a.up(PointerId::Session(1), &at(10.0, 10.0, 1, 100));
    a.up(PointerId::Session(2), &at(40.0, 10.0, 1, 110));
    assert_eq!(
        drain(&journal),
        [
            ("a", Clicked, PointerId::Session(1)),
            ("a", Released, PointerId::Session(1)),
            ("a", Released, PointerId::Session(2)),
        ]
    );
}

#[test]
fn handled_press_retires_the_session() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, recorder) = surface(&coordinator, &journal, "a", 1, square(0.0));
    let pointer = PointerId::Session(1);
    recorder.handle_presses_of(pointer);

    a.down(pointer, &at(10.0, 10.0, 1, 0));
    coordinator.advance_to(BATCH_WINDOW);
    assert_eq!(drain(&journal), [("a", Pressed, pointer)]);
    assert_eq!(coordinator.live_count(), 0);
    assert!(!coordinator.is_pressed(pointer));

    a.up(pointer, &at(10.0, 10.0, 1, 40));
    assert!(drain(&journal).is_empty());
    assert_eq!(coordinator.next_deadline(), None);
}

#[test]
fn press_during_a_flush_waits_for_its_own_batch() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, recorder) = surface(&coordinator, &journal, "a", 1, square(0.0));
    let weak = a.downgrade();
    let late = PointerId::Session(9);
    recorder.set_hook(move |kind, event| {
        if kind == Pressed
            && event.identifier == PointerId::Session(1)
            && let Some(adapter) = weak.upgrade()
        {
            adapter.down(late, &at(60.0, 10.0, 1, BATCH_WINDOW));
        }
    });

    a.down(PointerId::Session(1), &at(10.0, 10.0, 1, 0));
    a.down(PointerId::Session(2), &at(30.0, 10.0, 1, 5));
    coordinator.advance_to(BATCH_WINDOW);

    let groups = |journal: &Journal| -> Vec<(PointerId, usize)> {
        journal
            .borrow_mut()
            .drain(..)
            .map(|e| (e.event.identifier, e.event.group_size))
            .collect()
    };
    assert_eq!(
        groups(&journal),
        [(PointerId::Session(1), 2), (PointerId::Session(2), 2)]
    );
    assert_eq!(a.pending_len(), 1);
    assert_eq!(coordinator.next_deadline(), Some(2 * BATCH_WINDOW));

    coordinator.advance_to(2 * BATCH_WINDOW);
    assert_eq!(groups(&journal), [(late, 1)]);
    assert_eq!(coordinator.live_count(), 3);
}

#[test]
fn press_on_a_pressed_identifier_completes_the_previous_session() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.down(LEFT, &at(10.0, 10.0, 1, 0));
    coordinator.advance_to(BATCH_WINDOW);
    let first = coordinator.press_record(LEFT).unwrap().session();

    a.down(LEFT, &at(20.0, 20.0, 1, 40));
    assert_eq!(drain(&journal), [("a", Pressed, LEFT), ("a", Released, LEFT)]);
    assert!(!coordinator.is_pressed(LEFT));

    coordinator.advance_to(40 + BATCH_WINDOW);
    assert_eq!(drain(&journal), [("a", Pressed, LEFT)]);
    let record = coordinator.press_record(LEFT).unwrap();
    assert_ne!(record.session(), first);
    assert_eq!(record.press_position(), Position::new(20, 20));
    assert_eq!(coordinator.live_count(), 1);
}

#[test]
fn press_supersedes_a_deferred_release() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.down(LEFT, &at(10.0, 10.0, 1, 0));
    a.up(LEFT, &at(10.0, 10.0, 1, 5));
    assert!(coordinator.press_record(LEFT).unwrap().is_release_pending());

    // The pending completion runs with the original release signal.
    a.down(LEFT, &at(30.0, 30.0, 1, 10));
    let released = journal
        .borrow()
        .iter()
        .find(|e| e.kind == Released)
        .map(|e| (e.event.position, e.event.time));
    assert_eq!(released, Some((Position::new(10, 10), 5)));
    assert_eq!(
        drain(&journal),
        [("a", Pressed, LEFT), ("a", Clicked, LEFT), ("a", Released, LEFT)]
    );

    coordinator.advance_to(10 + RELEASE_FEEDBACK_DELAY);
    assert_eq!(drain(&journal), [("a", Pressed, LEFT)]);
}

#[test]
fn failing_press_handler_does_not_stop_the_batch() {
    let failures = Failures::default();
    let coordinator = InputCoordinator::with_reporter(UnifierConfig::default(), failures.clone());
    let journal = Journal::default();
    let (a, recorder) = surface(&coordinator, &journal, "a", 1, square(0.0));
    recorder.fail_on(Pressed, PointerId::Session(1));

    a.down(PointerId::Session(1), &at(10.0, 10.0, 1, 0));
    a.down(PointerId::Session(2), &at(40.0, 10.0, 1, 0));
    coordinator.advance_to(BATCH_WINDOW);

    assert_eq!(
        drain(&journal),
        [
            ("a", Pressed, PointerId::Session(1)),
            ("a", Pressed, PointerId::Session(2)),
        ]
    );
    assert!(!coordinator.is_pressed(PointerId::Session(1)));
    assert!(coordinator.is_pressed(PointerId::Session(2)));

    let reported = failures.0.borrow().clone();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].0, a.id());
    assert_eq!(reported[0].1, PointerId::Session(1));
    assert_eq!(reported[0].2, Pressed);
    assert_eq!(reported[0].3, "recorder told to fail");

    // Releasing the failed identifier is a no-op.
    a.up(PointerId::Session(1), &at(10.0, 10.0, 1, 60));
    assert!(drain(&journal).is_empty());
}

#[test]
fn failing_click_handler_still_releases() {
    let failures = Failures::default();
    let coordinator = InputCoordinator::with_reporter(UnifierConfig::default(), failures.clone());
    let journal = Journal::default();
    let (a, recorder) = surface(&coordinator, &journal, "a", 1, square(0.0));
    recorder.fail_on(Clicked, LEFT);

    a.down(LEFT, &at(10.0, 10.0, 1, 0));
    a.up(LEFT, &at(10.0, 10.0, 1, 60));

    assert_eq!(
        drain(&journal),
        [("a", Pressed, LEFT), ("a", Clicked, LEFT), ("a", Released, LEFT)]
    );
    assert_eq!(coordinator.live_count(), 0);
    assert_eq!(failures.0.borrow().len(), 1);
}

#[test]
fn release_on_another_surface_hands_the_pointer_over() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));
    let (b, _) = surface(&coordinator, &journal, "b", 2, square(200.0));

    a.down(LEFT, &at(10.0, 10.0, 1, 0));
    coordinator.advance_to(BATCH_WINDOW);
    b.up(LEFT, &at(250.0, 10.0, 2, 60));

    assert_eq!(
        drain(&journal),
        [
            ("a", Pressed, LEFT),
            ("a", Exited, LEFT),
            ("b", Entered, LEFT),
            ("a", Released, LEFT),
        ]
    );
    assert_eq!(coordinator.entered_surface(), Some(b.id()));
    assert_eq!(coordinator.live_count(), 0);
}

#[test]
fn drag_signals_on_another_surface_reach_the_owner() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));
    let (b, _) = surface(&coordinator, &journal, "b", 2, square(200.0));

    a.down(LEFT, &at(10.0, 10.0, 1, 0));
    b.drag(LEFT, &at(210.0, 10.0, 2, 30));
    b.up(LEFT, &at(210.0, 10.0, 2, 40));

    assert_eq!(
        drain(&journal),
        [
            ("a", Pressed, LEFT),
            ("a", DragStarted, LEFT),
            ("a", Dragged, LEFT),
            ("a", Exited, LEFT),
            ("b", Entered, LEFT),
            ("a", DragEnded, LEFT),
            ("a", Released, LEFT),
        ]
    );
}

#[test]
fn release_outside_every_surface() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.mouse_over(&at(10.0, 10.0, 1, 0));
    a.mouse_down(MouseButton::Left, &at(10.0, 10.0, 1, 0));
    coordinator.advance_to(BATCH_WINDOW);

    // A release the surface itself will see is left alone.
    assert_eq!(
        coordinator.release_outside(MouseButton::Left, &at(10.0, 10.0, 1, 40)),
        Outcome::Ignored
    );
    assert!(coordinator.is_pressed(LEFT));

    assert_eq!(
        coordinator.release_outside(MouseButton::Left, &at(500.0, 10.0, 99, 50)),
        Outcome::Consumed
    );
    assert_eq!(
        drain(&journal),
        [
            ("a", Entered, PointerId::Mouse),
            ("a", Pressed, LEFT),
            ("a", Released, LEFT),
            ("a", Exited, LEFT),
        ]
    );
    assert_eq!(coordinator.entered_surface(), None);
    assert_eq!(
        coordinator.release_outside(MouseButton::Middle, &at(500.0, 10.0, 99, 60)),
        Outcome::Ignored
    );
}

#[test]
fn release_handler_may_press_the_same_identifier_again() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, recorder) = surface(&coordinator, &journal, "a", 1, square(0.0));
    let weak = a.downgrade();
    let pointer = PointerId::Session(4);
    recorder.set_hook(move |kind, event| {
        if kind == Released
            && event.time == 60
            && let Some(adapter) = weak.upgrade()
        {
            adapter.down(pointer, &at(50.0, 50.0, 1, 60));
            adapter.flush();
        }
    });

    a.down(pointer, &at(10.0, 10.0, 1, 0));
    a.up(pointer, &at(10.0, 10.0, 1, 60));

    assert_eq!(
        drain(&journal),
        [
            ("a", Pressed, pointer),
            ("a", Clicked, pointer),
            ("a", Released, pointer),
            ("a", Pressed, pointer),
        ]
    );
    let record = coordinator.press_record(pointer).unwrap();
    assert_eq!(record.press_position(), Position::new(50, 50));
    assert_eq!(coordinator.live_count(), 1);
}

#[test]
fn events_report_the_live_session_count() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));

    a.down(PointerId::Session(1), &at(10.0, 10.0, 1, 0));
    coordinator.advance_to(BATCH_WINDOW);
    a.down(PointerId::Session(2), &at(30.0, 10.0, 1, 40));
    a.drag(PointerId::Session(1), &at(20.0, 10.0, 1, 70));
    a.up(PointerId::Session(2), &at(30.0, 10.0, 1, 80));
    a.up(PointerId::Session(1), &at(20.0, 10.0, 1, 90));
    a.moved(&at(5.0, 5.0, 1, 100));

    let entries = journal.borrow();
    assert!(!entries.is_empty());
    for entry in entries.iter() {
        assert_eq!(entry.event.touch_counter, entry.live, "{entry:?}");
    }
    assert_eq!(entries.last().map(|e| e.event.touch_counter), Some(0));
}

#[test]
fn dropped_adapter_forgets_its_sessions() {
    let coordinator = InputCoordinator::default();
    let journal = Journal::default();
    let (a, _) = surface(&coordinator, &journal, "a", 1, square(0.0));
    let (b, _) = surface(&coordinator, &journal, "b", 2, square(200.0));

    a.down(PointerId::Session(1), &at(10.0, 10.0, 1, 0));
    b.down(PointerId::Session(2), &at(210.0, 10.0, 2, 0));
    coordinator.advance_to(BATCH_WINDOW);
    assert_eq!(coordinator.live_count(), 2);

    drop(a);
    assert_eq!(coordinator.live_count(), 1);
    assert_eq!(coordinator.adapters().len(), 1);
}
