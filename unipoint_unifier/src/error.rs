// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors and the process-wide handler failure reporter.

use alloc::borrow::Cow;
use alloc::boxed::Box;

use crate::destination::HandlerKind;
use crate::types::{PointerId, SurfaceId};

/// Misconfiguration detected while building an
/// [`EventAdapter`](crate::adapter::EventAdapter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No surface was supplied.
    #[error("event adapter requires a surface")]
    MissingSurface,
    /// No destination was supplied.
    #[error("event adapter requires a destination")]
    MissingDestination,
}

/// Failure returned by a destination handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A plain message.
    #[error("{0}")]
    Message(Cow<'static, str>),
    /// An underlying error.
    #[error("destination handler failed: {0}")]
    Source(#[source] Box<dyn core::error::Error + 'static>),
}

impl HandlerError {
    /// Build an error from a message.
    pub fn msg(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap an underlying error.
    pub fn new(source: impl core::error::Error + 'static) -> Self {
        Self::Source(Box::new(source))
    }
}

/// One failed handler call.
#[derive(Debug)]
pub struct HandlerFailure<'a> {
    /// Surface whose destination failed.
    pub surface: SurfaceId,
    /// Session the event belonged to.
    pub pointer: PointerId,
    /// Handler that failed.
    pub handler: HandlerKind,
    /// The returned error.
    pub error: &'a HandlerError,
}

/// Receives every destination handler failure.
///
/// One reporter is installed per
/// [`InputCoordinator`](crate::coordinator::InputCoordinator).
pub trait ErrorReporter {
    /// Record a failure. Must not feed signals back into the engine.
    fn report(&self, failure: &HandlerFailure<'_>);
}

/// Reporter that logs failures through `tracing` at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, failure: &HandlerFailure<'_>) {
        tracing::error!(
            surface = ?failure.surface,
            pointer = ?failure.pointer,
            handler = ?failure.handler,
            error = %failure.error,
            "destination handler failed"
        );
    }
}
