// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending-press queue: per-surface batching of near-simultaneous presses.
//!
//! Presses wait here for the batch window so that two fingers landing in the
//! same tick are dispatched together and both see the final group size.
//! Flushing happens in two steps. [`PendingPresses::promote`] moves every
//! queued entry to the in-flight list, stamping the batch size. Entries are
//! then taken one at a time with [`PendingPresses::next_in_flight`], so a press
//! handler that enqueues or flushes again never reorders older entries.

use alloc::collections::VecDeque;

use smallvec::SmallVec;

use crate::timer::TaskId;
use crate::types::{PointerId, Position, RawPointer};

/// A press that has not been dispatched yet.
#[derive(Clone, Debug)]
pub(crate) struct PendingPress {
    pub(crate) pointer: PointerId,
    pub(crate) raw: RawPointer,
    pub(crate) position: Position,
    pub(crate) group: usize,
}

impl PendingPress {
    pub(crate) fn new(pointer: PointerId, raw: &RawPointer) -> Self {
        Self {
            pointer,
            raw: *raw,
            position: Position::from_point(raw.position),
            group: 0,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PendingPresses {
    queued: SmallVec<[PendingPress; 4]>,
    in_flight: VecDeque<PendingPress>,
    timer: Option<TaskId>,
}

impl PendingPresses {
    /// Append an entry. Returns `true` when no flush is scheduled yet.
    pub(crate) fn enqueue(&mut self, entry: PendingPress) -> bool {
        self.queued.push(entry);
        self.timer.is_none()
    }

    /// Drop a stale entry for `pointer`, queued or in flight.
    pub(crate) fn remove_if_pending(&mut self, pointer: PointerId) -> bool {
        if let Some(i) = self.queued.iter().position(|e| e.pointer == pointer) {
            self.queued.remove(i);
            return true;
        }
        if let Some(i) = self.in_flight.iter().position(|e| e.pointer == pointer) {
            self.in_flight.remove(i);
            return true;
        }
        false
    }

    pub(crate) fn contains(&self, pointer: PointerId) -> bool {
        self.queued.iter().any(|e| e.pointer == pointer)
            || self.in_flight.iter().any(|e| e.pointer == pointer)
    }

    /// Move queued entries behind any in-flight ones, stamping the batch size.
    pub(crate) fn promote(&mut self) -> usize {
        let group = self.queued.len();
        for mut entry in self.queued.drain(..) {
            entry.group = group;
            self.in_flight.push_back(entry);
        }
        group
    }

    pub(crate) fn next_in_flight(&mut self) -> Option<PendingPress> {
        self.in_flight.pop_front()
    }

    pub(crate) fn set_timer(&mut self, timer: TaskId) {
        self.timer = Some(timer);
    }

    pub(crate) fn take_timer(&mut self) -> Option<TaskId> {
        self.timer.take()
    }

    pub(crate) fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.queued.len() + self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Timers;
    use kurbo::Point;

    fn press(id: u64) -> PendingPress {
        PendingPress::new(
            PointerId::Session(id),
            &RawPointer::new(Point::new(id as f64, 0.0), 0),
        )
    }

    #[test]
    fn enqueue_reports_when_a_timer_is_needed() {
        let mut timers = Timers::new();
        let mut queue = PendingPresses::default();

        assert!(queue.enqueue(press(1)));
        queue.set_timer(timers.schedule(25, ()));
        assert!(!queue.enqueue(press(2)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn promote_stamps_batch_size_and_keeps_order() {
        let mut queue = PendingPresses::default();
        queue.enqueue(press(1));
        queue.enqueue(press(2));

        assert_eq!(queue.promote(), 2);
        queue.enqueue(press(3));
        queue.promote();

        let order: alloc::vec::Vec<(PointerId, usize)> =
            core::iter::from_fn(|| queue.next_in_flight())
                .map(|e| (e.pointer, e.group))
                .collect();
        assert_eq!(
            order,
            alloc::vec![
                (PointerId::Session(1), 2),
                (PointerId::Session(2), 2),
                (PointerId::Session(3), 1),
            ]
        );
    }

    #[test]
    fn remove_if_pending_searches_queued_and_in_flight() {
        let mut queue = PendingPresses::default();
        queue.enqueue(press(1));
        queue.promote();
        queue.enqueue(press(2));

        assert!(queue.contains(PointerId::Session(1)));
        assert!(queue.remove_if_pending(PointerId::Session(1)));
        assert!(queue.remove_if_pending(PointerId::Session(2)));
        assert!(!queue.remove_if_pending(PointerId::Session(2)));
        assert_eq!(queue.len(), 0);
    }
}
