// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotation configuration presets.

use crate::time::Duration;

/// Tunables for a [`RotationController`](crate::controller::RotationController).
///
/// The values are compiled in; [`RotationConfig::standard`] matches what the
/// game pages ship with. Fields are public so embedders and tests can adjust
/// individual knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationConfig {
    /// Consecutive unfilled responses retried with a toggled size before the
    /// retry counter is reset.
    pub max_retries: u8,
    /// Accumulated on-screen time a filled ad is shown before reloading.
    pub display_target: Duration,
    /// Intersection ratio at which the slot counts as visible.
    pub slot_threshold: f64,
    /// Intersection ratio at which the container opens the initial gate.
    pub container_threshold: f64,
    /// Delay between a `done` status and reading the slot's rendered height.
    pub settle_delay: Duration,
    /// Rendered height, in CSS pixels, above which a `done` slot is filled.
    pub min_filled_height: f64,
}

impl RotationConfig {
    /// The shipped configuration: 3 retries, 20 s display, 50 % slot and 20 %
    /// container visibility, 100 ms settle delay, 10 px fill height.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            max_retries: 3,
            display_target: Duration::from_millis(20_000),
            slot_threshold: 0.5,
            container_threshold: 0.2,
            settle_delay: Duration::from_millis(100),
            min_filled_height: 10.0,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self::standard()
    }
}
