// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input surfaces: regions that own a destination.
//!
//! The engine never hit-tests. It only needs to know whether a signal's target
//! belongs to a surface (to tell a release on the surface from one elsewhere)
//! and whether a position lies inside it (to decide whether leaving a child
//! element really left the surface).

use hashbrown::HashSet;
use kurbo::Rect;

use crate::types::{Position, TargetId};

/// Containment queries the engine asks of a surface.
pub trait Surface {
    /// Whether `target` is the surface itself or one of its descendants.
    fn contains_target(&self, target: TargetId) -> bool;

    /// Whether a page position lies inside the surface bounds.
    fn contains_position(&self, position: Position) -> bool;
}

/// A rectangular surface with an explicit set of descendant targets.
#[derive(Clone, Debug)]
pub struct RectSurface {
    root: TargetId,
    bounds: Rect,
    descendants: HashSet<TargetId>,
}

impl RectSurface {
    /// Create a surface whose own element is `root`, covering `bounds` in page space.
    pub fn new(root: TargetId, bounds: Rect) -> Self {
        Self {
            root,
            bounds,
            descendants: HashSet::new(),
        }
    }

    /// Add a descendant element.
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.descendants.insert(target);
        self
    }

    /// Add a descendant element.
    pub fn insert_target(&mut self, target: TargetId) {
        self.descendants.insert(target);
    }

    /// Remove a descendant element. Returns `true` if it was present.
    pub fn remove_target(&mut self, target: TargetId) -> bool {
        self.descendants.remove(&target)
    }

    /// The surface's own element.
    pub fn root(&self) -> TargetId {
        self.root
    }

    /// Page-space bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Replace the page-space bounds.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }
}

impl Surface for RectSurface {
    fn contains_target(&self, target: TargetId) -> bool {
        target == self.root || self.descendants.contains(&target)
    }

    fn contains_position(&self, position: Position) -> bool {
        self.bounds.contains(position.to_point())
    }
}
