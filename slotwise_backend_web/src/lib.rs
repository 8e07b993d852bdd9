// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for slotwise.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`WebHost`]: [`SlotHost`] over `setTimeout`, `IntersectionObserver`,
//!   and `MutationObserver`
//! - [`WebRotation`]: owns a controller and its host, and keeps the JS
//!   callbacks alive
//! - [`ConsoleSink`]: trace events to the browser console
//! - [`page`]: loading notifications, the referrer gate, and loading-screen
//!   teardown for a whole page

#![no_std]

extern crate alloc;

mod console;
mod host;
pub mod page;
mod rotation;
mod units;

pub use console::ConsoleSink;
pub use host::WebHost;
pub use rotation::WebRotation;
pub use slotwise_core::backend::SlotHost;
pub use units::{AdUnit, AdUnits};

use slotwise_core::time::HostTime;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;
}

/// Returns the current host time from `performance.now()`, in milliseconds.
#[must_use]
pub fn now() -> HostTime {
    let ms = performance_now();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns small positive f64; ms fits in u64"
    )]
    let ms = ms as u64;
    HostTime(ms)
}
