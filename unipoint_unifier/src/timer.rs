// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred, cancellable tasks on a caller-driven clock.
//!
//! The engine never sleeps or blocks. A task is stored with a deadline and a
//! [`TaskId`] handle; the owner of the clock pops due tasks with
//! [`Timers::pop_due`] and may cancel a task through its handle before then.
//! Tasks with equal deadlines run in scheduling order.

use alloc::collections::BTreeMap;

use hashbrown::HashMap;

/// Handle of a scheduled task, used to cancel it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Deadline-ordered table of pending tasks.
#[derive(Clone, Debug)]
pub struct Timers<T> {
    next_id: u64,
    queue: BTreeMap<(u64, TaskId), T>,
    deadlines: HashMap<TaskId, u64>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> Timers<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to become due at `deadline`.
    pub fn schedule(&mut self, deadline: u64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending task, returning it. Cancelling a task that already ran
    /// or was already cancelled returns `None`.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let deadline = self.deadlines.remove(&id)?;
        self.queue.remove(&(deadline, id))
    }

    /// Remove and return the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(TaskId, T)> {
        let (&(deadline, id), _) = self.queue.first_key_value()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.queue.remove(&(deadline, id)).map(|task| (id, task))
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.first_key_value().map(|(&(deadline, _), _)| deadline)
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no task is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
