// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic simulated host for slotwise rotation.
//!
//! - [`SimHost`]: an in-memory [`SlotHost`](slotwise_core::backend::SlotHost)
//!   with a virtual clock, a timer queue, and viewport geometry computed
//!   with `kurbo`.
//! - [`Simulation`]: pairs a host with a
//!   [`RotationController`](slotwise_core::controller::RotationController)
//!   and delivers queued callbacks as virtual time advances.
//!
//! Nothing here touches a real clock, so scenario and property tests are
//! reproducible.

mod driver;
mod host;

pub use driver::Simulation;
pub use host::{HostToggles, Notice, SimHost, SimRequest, SlotSizes};
