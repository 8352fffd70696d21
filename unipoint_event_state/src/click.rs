// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-click timing for completed pointer releases.
//!
//! This module decides whether a release completes a *double* click. It only
//! looks at time and pointer identity: the caller is responsible for deciding
//! whether the release was a tap at all (for example, whether the pointer was
//! released where it was pressed and never dragged).
//!
//! ## Usage
//!
//! ```
//! use unipoint_event_state::click::{DoubleClickState, ReleaseKind};
//!
//! let mut state: DoubleClickState<u32> = DoubleClickState::new();
//!
//! // First release of pointer 7: nothing to pair with.
//! assert_eq!(state.on_release(7, 50), ReleaseKind::Single);
//!
//! // Second release 250ms later is inside the default 280ms window.
//! assert_eq!(state.on_release(7, 300), ReleaseKind::Double);
//!
//! // Third release 400ms after the second is not.
//! assert_eq!(state.on_release(7, 700), ReleaseKind::Single);
//! ```
//!
//! ## Rules
//!
//! 1. **Same pointer**: only a release by the same pointer identifier as the
//!    previous release can pair with it.
//! 2. **Window**: the elapsed time since the previous release must be less than
//!    or equal to [`DoubleClickState::delta`].
//! 3. **Always recorded**: every call to [`DoubleClickState::on_release`]
//!    becomes the new previous release, whatever the outcome. A quick third tap
//!    therefore pairs with the second one.
//!
//! Timestamps are caller-supplied milliseconds. Going backwards in time is
//! treated as zero elapsed time.

/// Default double-click window in milliseconds.
pub const DEFAULT_DOUBLE_CLICK_DELTA: u64 = 280;

/// The release that a following release may pair with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastRelease<K> {
    /// Pointer that was released.
    pub pointer: K,
    /// Release timestamp in milliseconds.
    pub time: u64,
}

/// Result of release timing classification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReleaseKind {
    /// Not paired with an earlier release.
    Single,
    /// Paired with the previous release of the same pointer.
    Double,
}

/// Double-click detector keyed by pointer identifier `K`.
#[derive(Clone, Debug)]
pub struct DoubleClickState<K> {
    /// Maximum time between two releases of the same pointer, in milliseconds.
    pub delta: u64,
    last_release: Option<LastRelease<K>>,
}

impl<K: PartialEq + Clone> DoubleClickState<K> {
    /// Create a detector with the default 280ms window.
    pub fn new() -> Self {
        Self::with_delta(DEFAULT_DOUBLE_CLICK_DELTA)
    }

    /// Create a detector with a custom window in milliseconds.
    pub fn with_delta(delta: u64) -> Self {
        Self {
            delta,
            last_release: None,
        }
    }

    /// Classify a completed release and remember it as the previous release.
    ///
    /// # Arguments
    /// * `pointer` - Identifier of the released pointer
    /// * `time` - Release timestamp in milliseconds
    pub fn on_release(&mut self, pointer: K, time: u64) -> ReleaseKind {
        let kind = match &self.last_release {
            Some(last)
                if last.pointer == pointer && time.saturating_sub(last.time) <= self.delta =>
            {
                ReleaseKind::Double
            }
            _ => ReleaseKind::Single,
        };
        self.last_release = Some(LastRelease { pointer, time });
        kind
    }

    /// The previously recorded release, if any.
    pub fn last_release(&self) -> Option<&LastRelease<K>> {
        self.last_release.as_ref()
    }

    /// Forget the previous release.
    pub fn clear(&mut self) {
        self.last_release = None;
    }
}

impl<K: PartialEq + Clone> Default for DoubleClickState<K> {
    fn default() -> Self {
        Self::new()
    }
}
