// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for host integrations.
//!
//! A backend gives the controller five things:
//!
//! - **Clock** — [`SlotHost::now`], monotonic milliseconds.
//! - **Timers** — [`SlotHost::arm_timer`] / [`SlotHost::cancel_timer`].
//!   When a timer fires the backend calls
//!   [`RotationController::on_timer`](crate::controller::RotationController::on_timer)
//!   with the id it handed out.
//! - **Observers** — container and slot intersection, slot fill attributes.
//!   Reports go to `on_container_visibility`, `on_slot_visibility`, and
//!   `on_fill_signal` respectively. Intersection observers report the
//!   current state once right after observation starts, as browsers do.
//! - **Slot markup** — [`SlotHost::mount_slot`] replaces the container's
//!   content with a fresh slot for the given size.
//! - **Ad request** — [`SlotHost::send_request`] asks the network to fill
//!   the mounted slot.
//!
//! Callbacks must be delivered from the host's event loop, never from
//! inside a `SlotHost` method.
//!
//! # Crate boundaries
//!
//! `slotwise_core` owns the state machine and this contract. Backend crates
//! (`slotwise_backend_web`, `slotwise_sim`) implement it and wire host events
//! back into the controller.

use crate::fault::SlotFault;
use crate::session::SizeVariant;
use crate::time::{Duration, HostTime};

/// Opaque handle for a pending host timer.
///
/// Backends assign ids; the controller compares them and hands them back for
/// cancellation without interpreting the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Host primitives the rotation controller drives.
///
/// Disconnect and cancel methods must tolerate being called when nothing is
/// connected or pending.
pub trait SlotHost {
    /// Current monotonic host time.
    fn now(&self) -> HostTime;

    /// Whether the ad container element currently exists.
    fn has_container(&self) -> bool;

    /// Whether viewport-intersection observation is available.
    fn supports_intersection(&self) -> bool;

    /// Whether the page is framed by a cross-origin parent.
    fn is_cross_origin(&self) -> bool;

    /// Starts reporting container visibility at `threshold`.
    ///
    /// Fails with [`SlotFault::ObservationUnsupported`] when the observer
    /// could not be created.
    fn observe_container(&mut self, threshold: f64) -> Result<(), SlotFault>;

    /// Stops reporting container visibility.
    fn unobserve_container(&mut self);

    /// Replaces the container's content with a slot sized for `size`.
    fn mount_slot(&mut self, size: SizeVariant) -> Result<(), SlotFault>;

    /// Hides the mounted slot (used for unfilled ads).
    fn hide_slot(&mut self);

    /// Rendered height of the mounted slot, if one exists.
    fn slot_height(&self) -> Option<f64>;

    /// Starts reporting fill-status attribute changes on the slot.
    fn observe_fill(&mut self);

    /// Stops reporting fill-status changes.
    fn unobserve_fill(&mut self);

    /// Starts reporting slot visibility at `threshold`.
    fn observe_slot(&mut self, threshold: f64) -> Result<(), SlotFault>;

    /// Stops reporting slot visibility.
    fn unobserve_slot(&mut self);

    /// Sends the ad-network request for the mounted slot.
    fn send_request(&mut self) -> Result<(), SlotFault>;

    /// Schedules a callback after `delay`.
    ///
    /// Fails with [`SlotFault::TimerUnavailable`] when the host refused to
    /// schedule it; no callback will arrive for a failed timer.
    fn arm_timer(&mut self, delay: Duration) -> Result<TimerId, SlotFault>;

    /// Cancels a pending timer.
    fn cancel_timer(&mut self, id: TimerId);
}
