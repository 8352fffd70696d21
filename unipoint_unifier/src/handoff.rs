// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving a pressed pointer between surfaces, and releases outside all of them.

use crate::adapter::EventAdapter;
use crate::coordinator::InputCoordinator;
use crate::destination::HandlerKind;
use crate::input::Outcome;
use crate::types::{MouseButton, PointerId, RawPointer};

impl EventAdapter {
    /// Release of a session owned by `owner` over this surface.
    pub(crate) fn hand_off(&self, owner: &Self, pointer: PointerId, raw: &RawPointer) {
        let coordinator = self.coordinator();
        tracing::debug!(
            from = ?owner.id(),
            to = ?self.id(),
            ?pointer,
            "released over another surface"
        );
        let event = coordinator.event_for(pointer, raw);

        coordinator.set_entered(None);
        owner.deliver(HandlerKind::Exited, &event);
        coordinator.set_entered(Some(self.id()));
        self.deliver(HandlerKind::Entered, &event);

        owner.up(pointer, raw);
    }
}

impl InputCoordinator {
    /// A mouse button was released outside every surface.
    ///
    /// Only the left and right buttons are tracked. When the owning surface
    /// contains the release target the surface sees the release itself and
    /// this returns [`Outcome::Ignored`].
    pub fn release_outside(&self, button: MouseButton, raw: &RawPointer) -> Outcome {
        let Some(pointer) = button.pointer_id() else {
            return Outcome::Ignored;
        };
        self.advance_to(raw.time);
        let Some(owner) = self.owning_adapter(pointer) else {
            return Outcome::Ignored;
        };
        if raw
            .target
            .is_some_and(|target| owner.surface().contains_target(target))
        {
            return Outcome::Ignored;
        }

        tracing::debug!(surface = ?owner.id(), ?pointer, "released outside every surface");
        owner.up(pointer, raw);
        if self.take_entered().is_some() {
            let event = self.event_for(pointer, raw);
            owner.deliver(HandlerKind::Exited, &event);
        }
        Outcome::Consumed
    }

    /// The mouse moved outside every surface.
    ///
    /// While a drag that left its surface is in progress this continues it,
    /// keeping the press target.
    pub fn move_outside(&self, raw: &RawPointer) -> Outcome {
        self.advance_to(raw.time);
        self.clean_outside_drag();
        let Some(surface) = self.outside_drag_surface() else {
            return Outcome::Ignored;
        };
        let Some(adapter) = self.adapter(surface) else {
            self.stop_outside_drag();
            return Outcome::Ignored;
        };
        for pointer in [PointerId::LeftMouse, PointerId::RightMouse] {
            let Some(target) = self.press_record(pointer).map(|r| r.target()) else {
                continue;
            };
            let raw = RawPointer { target, ..*raw };
            adapter.drag(pointer, &raw);
        }
        Outcome::Consumed
    }
}
