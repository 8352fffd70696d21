// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device front-ends: mapping platform mouse, touch and pointer signals onto
//! the adapter's DOWN/DRAG/UP/MOVE operations.
//!
//! Each method returns an [`Outcome`] telling the host whether the signal was
//! taken over by the engine, in which case the host should stop propagating it
//! and suppress the platform's default action.

use smallvec::SmallVec;

use crate::adapter::EventAdapter;
use crate::destination::HandlerKind;
use crate::types::{DeviceClass, MouseButton, PointerId, Position, RawPointer, TargetId};

/// Manhattan distance a touch must travel before its first drag.
pub const TOUCH_DRAG_THRESHOLD: u32 = 4;

/// Whether the engine took over a platform signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Stop propagation and suppress the default action.
    Consumed,
    /// Let the platform handle the signal.
    Ignored,
}

impl Outcome {
    /// Whether the signal was consumed.
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// One changed touch contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Touch {
    /// Platform session id of the contact.
    pub identifier: u64,
    /// The contact's signal.
    pub raw: RawPointer,
}

impl Touch {
    /// Create a touch record.
    pub fn new(identifier: u64, raw: RawPointer) -> Self {
        Self { identifier, raw }
    }

    fn pointer(&self) -> PointerId {
        PointerId::Session(self.identifier)
    }

    fn signal(&self) -> RawPointer {
        with_default_device(&self.raw, DeviceClass::Touch)
    }
}

fn with_default_device(raw: &RawPointer, device: DeviceClass) -> RawPointer {
    match raw.device {
        DeviceClass::Unknown => raw.with_device(device),
        _ => *raw,
    }
}

impl EventAdapter {
    /// Mouse button pressed on the surface.
    ///
    /// Mouse signals emulated from a touch (same rounded position as a live
    /// touch session) are ignored.
    pub fn mouse_down(&self, button: MouseButton, raw: &RawPointer) -> Outcome {
        let Some(pointer) = button.pointer_id() else {
            return Outcome::Ignored;
        };
        if self
            .coordinator()
            .session_at(Position::from_point(raw.position))
        {
            tracing::trace!(surface = ?self.id(), "mouse press emulated from touch ignored");
            return Outcome::Ignored;
        }
        self.down(pointer, &with_default_device(raw, DeviceClass::Mouse));
        Outcome::Consumed
    }

    /// Mouse button released on the surface.
    pub fn mouse_up(&self, button: MouseButton, raw: &RawPointer) -> Outcome {
        let Some(pointer) = button.pointer_id() else {
            return Outcome::Ignored;
        };
        self.up(pointer, &with_default_device(raw, DeviceClass::Mouse));
        Outcome::Consumed
    }

    /// Mouse moved over the surface.
    pub fn mouse_move(&self, raw: &RawPointer) -> Outcome {
        let dragging = self.coordinator().mouse_button_pressed();
        self.moved(&with_default_device(raw, DeviceClass::Mouse));
        if dragging {
            Outcome::Consumed
        } else {
            Outcome::Ignored
        }
    }

    /// Mouse cursor entered an element of the surface.
    pub fn mouse_over(&self, raw: &RawPointer) -> Outcome {
        let coordinator = self.coordinator();
        coordinator.advance_to(raw.time);
        if coordinator.session_at(Position::from_point(raw.position)) {
            return Outcome::Ignored;
        }
        if coordinator.mouse_button_pressed() {
            coordinator.stop_outside_drag();
            return Outcome::Ignored;
        }
        coordinator.clean_outside_drag();
        if coordinator.entered_surface() == Some(self.id()) {
            return Outcome::Ignored;
        }
        coordinator.set_entered(Some(self.id()));
        let raw = with_default_device(raw, DeviceClass::Mouse);
        let event = coordinator.event_for(PointerId::Mouse, &raw);
        self.deliver(HandlerKind::Entered, &event);
        Outcome::Consumed
    }

    /// Mouse cursor left an element of the surface for `related`.
    ///
    /// Moving between elements of the same surface is not an exit. Leaving
    /// with a button pressed keeps the drag alive through
    /// [`InputCoordinator::move_outside`](crate::coordinator::InputCoordinator::move_outside).
    pub fn mouse_out(&self, raw: &RawPointer, related: Option<TargetId>) -> Outcome {
        let coordinator = self.coordinator();
        coordinator.advance_to(raw.time);
        self.reset_move_dedup();
        let leaving = related.is_none_or(|target| !self.surface().contains_target(target));
        if !leaving {
            return Outcome::Ignored;
        }
        if coordinator.mouse_button_pressed() {
            coordinator.start_outside_drag(self.id());
            return Outcome::Ignored;
        }

        coordinator.set_entered(None);
        let raw = with_default_device(raw, DeviceClass::Mouse);
        let position = Position::from_point(raw.position);
        if self.surface().contains_position(position) {
            return Outcome::Ignored;
        }
        let event = coordinator.event_for(PointerId::Mouse, &raw);
        self.deliver(HandlerKind::Exited, &event);
        Outcome::Consumed
    }

    /// Touches started. `active` lists every contact the platform still
    /// reports; live touch sessions missing from it lost their end signal and
    /// are released.
    pub fn touch_start(&self, changed: &[Touch], active: &[u64]) -> Outcome {
        let coordinator = self.coordinator();
        for touch in changed {
            self.down(touch.pointer(), &touch.signal());
        }

        let now = coordinator.now();
        let lost: SmallVec<[(PointerId, RawPointer); 4]> = coordinator.with_state(|st| {
            st.registry
                .iter()
                .filter(|r| r.device() == DeviceClass::Touch)
                .filter(|r| matches!(r.pointer(), PointerId::Session(id) if !active.contains(&id)))
                .map(|r| {
                    let raw = RawPointer {
                        position: r.position().to_point(),
                        target: r.target(),
                        modifiers: None,
                        pressure: Some(r.pressure()),
                        device: DeviceClass::Touch,
                        time: now,
                    };
                    (r.pointer(), raw)
                })
                .collect()
        });
        for (pointer, raw) in lost {
            tracing::debug!(?pointer, "releasing touch that lost its end signal");
            if let Some(owner) = coordinator.owning_adapter(pointer) {
                owner.up(pointer, &raw);
            }
        }

        if changed.is_empty() {
            Outcome::Ignored
        } else {
            Outcome::Consumed
        }
    }

    /// Touches ended.
    pub fn touch_end(&self, changed: &[Touch]) -> Outcome {
        for touch in changed {
            self.up(touch.pointer(), &touch.signal());
        }
        if changed.is_empty() {
            Outcome::Ignored
        } else {
            Outcome::Consumed
        }
    }

    /// Touches moved.
    ///
    /// A contact starts dragging only once it moved more than
    /// [`TOUCH_DRAG_THRESHOLD`] from its last position.
    pub fn touch_move(&self, changed: &[Touch]) -> Outcome {
        let coordinator = self.coordinator();
        for touch in changed {
            let pointer = touch.pointer();
            let raw = touch.signal();
            coordinator.advance_to(raw.time);
            let position = Position::from_point(raw.position);
            let moved = coordinator.with_state(|st| {
                st.registry.get(pointer).is_some_and(|r| {
                    r.position() != position
                        && (r.is_dragged()
                            || r.position().manhattan_distance(position) > TOUCH_DRAG_THRESHOLD)
                })
            });
            if moved {
                self.drag(pointer, &raw);
            }
        }
        if changed.is_empty() {
            Outcome::Ignored
        } else {
            Outcome::Consumed
        }
    }

    /// Unified platform pointer pressed. Mouse-class pointers are handled by
    /// the mouse front-end and ignored here.
    pub fn pointer_down(&self, device: DeviceClass, pointer_id: u64, raw: &RawPointer) -> Outcome {
        if device == DeviceClass::Mouse {
            return Outcome::Ignored;
        }
        self.down(PointerId::Session(pointer_id), &raw.with_device(device));
        Outcome::Consumed
    }

    /// Unified platform pointer released.
    pub fn pointer_up(&self, device: DeviceClass, pointer_id: u64, raw: &RawPointer) -> Outcome {
        if device == DeviceClass::Mouse {
            return Outcome::Ignored;
        }
        self.up(PointerId::Session(pointer_id), &raw.with_device(device));
        Outcome::Consumed
    }

    /// Unified platform pointer moved.
    pub fn pointer_move(&self, device: DeviceClass, pointer_id: u64, raw: &RawPointer) -> Outcome {
        if device == DeviceClass::Mouse {
            return self.mouse_move(raw);
        }
        let pointer = PointerId::Session(pointer_id);
        if !self.coordinator().is_pressed(pointer) {
            return Outcome::Ignored;
        }
        self.drag(pointer, &raw.with_device(device));
        Outcome::Consumed
    }
}
