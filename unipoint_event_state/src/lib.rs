// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unipoint Event State: small pointer state machines.
//!
//! These helpers hold no references to surfaces or destinations. They are fed
//! plain numbers (deltas, timestamps, identifiers) and answer one question each:
//!
//! - [`direction`]: which compass bucket a drag is heading toward, with a sticky
//!   accumulator so jitter does not flip the answer.
//! - [`click`]: whether a completed release pairs with the previous one as a
//!   double click.
//!
//! `unipoint_unifier` drives both from its per-pointer press records.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` floating-point math for `kurbo` (needed for `atan2`).
//!
//! This crate is `no_std`.

#![no_std]

pub mod click;
pub mod direction;
