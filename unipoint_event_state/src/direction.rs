// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compass direction of a drag gesture.
//!
//! [`classify`] maps a displacement to one of four [`Direction`] buckets using
//! the polar angle `atan2(dy, dx)` in screen coordinates (y grows downward):
//!
//! | Direction | Angle range |
//! |---|---|
//! | [`Direction::Right`]  | (−45°, 45°) |
//! | [`Direction::Bottom`] | [45°, 135°) |
//! | [`Direction::Left`]   | [135°, 180°] and [−180°, −135°] |
//! | [`Direction::Top`]    | (−135°, −45°] |
//!
//! Exact diagonals resolve clockwise from the horizontal axis: 45° is `Bottom`,
//! −45° is `Top`, and both ±135° are `Left`.
//!
//! [`DirectionTracker`] makes the classification sticky. Small movements are
//! accumulated and the direction is only recomputed once the accumulated
//! displacement exceeds [`DIRECTION_THRESHOLD`] on either axis.
//!
//! ```
//! use unipoint_event_state::direction::{Direction, DirectionTracker};
//!
//! let mut tracker = DirectionTracker::new();
//! assert_eq!(tracker.push(3, 0), None); // not enough movement yet
//! assert_eq!(tracker.push(3, 0), Some(Direction::Right));
//! assert_eq!(tracker.push(0, 1), Some(Direction::Right)); // sticky
//! ```

use core::f64::consts::FRAC_PI_4;

use kurbo::Vec2;

/// Accumulated displacement, in either axis, needed before the direction is recomputed.
pub const DIRECTION_THRESHOLD: i32 = 4;

const FRAC_3_PI_4: f64 = 3.0 * FRAC_PI_4;

/// Direction of a drag gesture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward increasing x.
    Right,
    /// Toward increasing y.
    Bottom,
    /// Toward decreasing x.
    Left,
    /// Toward decreasing y.
    Top,
}

/// Classify a displacement into a [`Direction`].
///
/// A zero displacement has angle 0 and classifies as [`Direction::Right`];
/// callers normally only classify after a threshold has been crossed.
pub fn classify(dx: f64, dy: f64) -> Direction {
    let gamma = Vec2::new(dx, dy).atan2();
    if gamma > -FRAC_PI_4 {
        if gamma < FRAC_PI_4 {
            Direction::Right
        } else if gamma < FRAC_3_PI_4 {
            Direction::Bottom
        } else {
            Direction::Left
        }
    } else if gamma > -FRAC_3_PI_4 {
        Direction::Top
    } else {
        Direction::Left
    }
}

/// Sticky direction state for one pointer session.
#[derive(Clone, Debug, Default)]
pub struct DirectionTracker {
    adx: i32,
    ady: i32,
    direction: Option<Direction>,
}

impl DirectionTracker {
    /// Create a tracker with no direction yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a movement delta and return the current direction.
    ///
    /// The direction is recomputed from the accumulated displacement only when
    /// it exceeds [`DIRECTION_THRESHOLD`] on either axis, after which the
    /// accumulator restarts from zero.
    pub fn push(&mut self, dx: i32, dy: i32) -> Option<Direction> {
        self.adx = self.adx.saturating_add(dx);
        self.ady = self.ady.saturating_add(dy);
        if self.adx.saturating_abs() > DIRECTION_THRESHOLD
            || self.ady.saturating_abs() > DIRECTION_THRESHOLD
        {
            self.direction = Some(classify(f64::from(self.adx), f64::from(self.ady)));
            self.adx = 0;
            self.ady = 0;
        }
        self.direction
    }

    /// The last computed direction, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Displacement accumulated since the last recompute.
    pub fn accumulated(&self) -> (i32, i32) {
        (self.adx, self.ady)
    }

    /// Forget the direction and accumulated displacement.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
