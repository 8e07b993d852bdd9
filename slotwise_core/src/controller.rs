// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ad visibility/retry state machine.
//!
//! [`RotationController`] owns one [`AdSlotSession`] and drives a
//! [`SlotHost`]. Each host callback is a method on the controller; the
//! controller answers by mutating the session and calling back into the
//! host.
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──start──► AwaitingContainer ──container visible──┐
//!                                                          ▼
//!        ┌──────────────── unfilled (retry / reset) ── FillPending ◄─┐
//!        │                                                  │        │
//!        └─────────────────────────────────────────►        │ filled │
//!                                                           ▼        │
//!                                                      Displaying ───┘
//!                                                       (expiry)
//!   any ──stop──► Stopped ──start──► AwaitingContainer
//! ```
//!
//! Every new request first cancels both timers and disconnects the fill and
//! slot observers, so at most one display timer, one settle timer and one
//! set of observers are live at a time.

use alloc::boxed::Box;

use crate::backend::{SlotHost, TimerId};
use crate::config::RotationConfig;
use crate::fault::SlotFault;
use crate::fill::{FillOutcome, FillSignal, FillSource};
use crate::session::AdSlotSession;
use crate::time::{Duration, HostTime};
use crate::trace::{
    ExpiryEvent, FaultEvent, FillEvent, RequestEvent, RetryEvent, TimerArmedEvent, TraceSink,
    Tracer, TransitionEvent, VisibilityEvent,
};

/// Where the controller is in the slot lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not started, or a request could not be placed.
    Idle,
    /// Waiting for the container to scroll into view before the first
    /// request.
    AwaitingContainer,
    /// A request is out; waiting for the fill status.
    FillPending,
    /// A filled ad is on the page and accumulating visible time.
    Displaying,
    /// Stopped externally. Only [`RotationController::start`] leaves this.
    Stopped,
}

impl Phase {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingContainer => "awaiting_container",
            Self::FillPending => "fill_pending",
            Self::Displaying => "displaying",
            Self::Stopped => "stopped",
        }
    }
}

/// Rotation state machine for a single ad slot.
///
/// # Usage
///
/// ```rust,ignore
/// let mut controller = RotationController::new(RotationConfig::standard());
/// controller.start(&mut host);
/// // host event loop:
/// controller.on_container_visibility(&mut host, true);
/// controller.on_fill_signal(&mut host, FillSignal::Filled);
/// controller.on_slot_visibility(&mut host, true);
/// controller.on_timer(&mut host, id);
/// ```
#[derive(Debug)]
pub struct RotationController {
    config: RotationConfig,
    session: AdSlotSession,
    phase: Phase,
    display_timer: Option<TimerId>,
    settle_timer: Option<TimerId>,
    tracer: Tracer,
}

impl RotationController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(config: RotationConfig) -> Self {
        Self {
            session: AdSlotSession::new(config.display_target),
            phase: Phase::Idle,
            display_timer: None,
            settle_timer: None,
            tracer: Tracer::none(),
            config,
        }
    }

    /// Routes trace events to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.set_sink(sink);
        self
    }

    /// Replaces the trace sink.
    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// The slot session.
    #[must_use]
    pub fn session(&self) -> &AdSlotSession {
        &self.session
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the controller is past `start` and not stopped or idle.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::Stopped)
    }

    /// Display time still owed to the current ad.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.session.remaining()
    }

    /// The pending display timer, if any.
    #[must_use]
    pub fn display_timer(&self) -> Option<TimerId> {
        self.display_timer
    }

    /// The pending settle timer, if any.
    #[must_use]
    pub fn settle_timer(&self) -> Option<TimerId> {
        self.settle_timer
    }

    /// Activates the session and opens the container visibility gate.
    ///
    /// Without intersection support the gate is skipped and the first ad is
    /// requested immediately. Calling `start` while running is a no-op.
    pub fn start<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        if self.is_running() {
            return;
        }
        self.session.activate();
        let now = host.now();
        if !host.has_container() {
            self.fault(now, SlotFault::MissingContainer);
            return;
        }
        if host.is_cross_origin() {
            self.fault(now, SlotFault::CrossOriginRestricted);
        }
        if !host.supports_intersection() {
            self.fault(now, SlotFault::ObservationUnsupported);
            self.request(host);
            return;
        }
        match host.observe_container(self.config.container_threshold) {
            Ok(()) => self.set_phase(now, Phase::AwaitingContainer),
            Err(fault) => {
                self.fault(now, fault);
                self.request(host);
            }
        }
    }

    /// Deactivates the session, cancels all timers and disconnects all
    /// observers. Idempotent.
    pub fn stop<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        self.session.deactivate();
        self.cancel_display_timer(host);
        self.cancel_settle_timer(host);
        host.unobserve_container();
        host.unobserve_fill();
        host.unobserve_slot();
        let now = host.now();
        self.set_phase(now, Phase::Stopped);
    }

    /// Container visibility report. The first visible report while waiting
    /// closes the gate and places the first request.
    pub fn on_container_visibility<H: SlotHost + ?Sized>(&mut self, host: &mut H, visible: bool) {
        if !visible || self.phase != Phase::AwaitingContainer || !self.session.is_active() {
            return;
        }
        host.unobserve_container();
        self.request(host);
    }

    /// A batch of fill-status reports for the current slot, in delivery
    /// order.
    ///
    /// Processing stops at the first report that places a new request; the
    /// rest of the batch belongs to the slot that was just replaced.
    pub fn on_fill_batch<H, I>(&mut self, host: &mut H, signals: I)
    where
        H: SlotHost + ?Sized,
        I: IntoIterator<Item = FillSignal>,
    {
        let cycle = self.session.cycles();
        for signal in signals {
            self.on_fill_signal(host, signal);
            if self.session.cycles() != cycle {
                break;
            }
        }
    }

    /// Fill-status report. Ignored unless a request is pending.
    pub fn on_fill_signal<H: SlotHost + ?Sized>(&mut self, host: &mut H, signal: FillSignal) {
        if self.phase != Phase::FillPending || !self.session.is_active() {
            return;
        }
        match signal {
            FillSignal::Filled => self.resolve_fill(host, FillOutcome::Filled, FillSource::Status),
            FillSignal::Unfilled => {
                self.resolve_fill(host, FillOutcome::Unfilled, FillSource::Status);
            }
            FillSignal::Done => {
                if self.settle_timer.is_some() {
                    return;
                }
                match host.arm_timer(self.config.settle_delay) {
                    Ok(id) => self.settle_timer = Some(id),
                    Err(fault) => {
                        // No settle delay available: judge the height now.
                        self.fault(host.now(), fault);
                        self.resolve_by_height(host);
                    }
                }
            }
        }
    }

    /// Slot visibility report. Only meaningful while displaying.
    pub fn on_slot_visibility<H: SlotHost + ?Sized>(&mut self, host: &mut H, visible: bool) {
        if self.phase != Phase::Displaying || !self.session.is_active() {
            return;
        }
        let now = host.now();
        if visible {
            if !self.session.mark_visible(now) {
                return;
            }
            self.trace_visibility(now, true, Duration::ZERO);
            if self.display_timer.is_none() {
                self.arm_display_timer(host, now);
            }
        } else {
            let Some(span) = self.session.mark_hidden(now) else {
                return;
            };
            self.cancel_display_timer(host);
            self.trace_visibility(now, false, span);
        }
    }

    /// Timer callback. Ids that are no longer pending are ignored.
    pub fn on_timer<H: SlotHost + ?Sized>(&mut self, host: &mut H, id: TimerId) {
        if self.settle_timer == Some(id) {
            self.settle_timer = None;
            if self.phase == Phase::FillPending && self.session.is_active() {
                self.resolve_by_height(host);
            }
        } else if self.display_timer == Some(id) {
            self.display_timer = None;
            if self.phase == Phase::Displaying && self.session.is_active() {
                self.expire(host);
            }
        }
    }

    fn request<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        if !self.session.is_active() {
            return;
        }
        let now = host.now();
        self.release(host);
        if !host.has_container() {
            self.fault(now, SlotFault::MissingContainer);
            self.set_phase(now, Phase::Idle);
            return;
        }

        let size = self.session.size();
        if let Err(fault) = host.mount_slot(size) {
            self.fault(now, fault);
            self.set_phase(now, Phase::Idle);
            return;
        }
        host.observe_fill();
        self.session.note_request();
        self.set_phase(now, Phase::FillPending);
        self.tracer.request(&RequestEvent {
            at: now,
            size,
            retry_count: self.session.retry_count(),
            cycle: self.session.cycles(),
        });

        if let Err(fault) = host.send_request() {
            self.fault(now, fault);
        }
    }

    fn resolve_by_height<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        let outcome = FillOutcome::from_height(host.slot_height(), self.config.min_filled_height);
        self.resolve_fill(host, outcome, FillSource::Height);
    }

    fn resolve_fill<H: SlotHost + ?Sized>(
        &mut self,
        host: &mut H,
        outcome: FillOutcome,
        source: FillSource,
    ) {
        let now = host.now();
        self.cancel_settle_timer(host);
        self.tracer.fill(&FillEvent {
            at: now,
            outcome,
            source,
        });

        match outcome {
            FillOutcome::Filled => {
                self.session.record_filled();
                self.set_phase(now, Phase::Displaying);
                if !host.supports_intersection() {
                    self.fault(now, SlotFault::ObservationUnsupported);
                    self.arm_display_timer(host, now);
                } else if let Err(fault) = host.observe_slot(self.config.slot_threshold) {
                    self.fault(now, fault);
                    self.arm_display_timer(host, now);
                }
            }
            FillOutcome::Unfilled => {
                self.fault(
                    now,
                    SlotFault::UnfilledAd {
                        attempt: self.session.retry_count(),
                    },
                );
                host.hide_slot();
                let decision = self.session.record_unfilled(self.config.max_retries);
                self.tracer.retry(&RetryEvent {
                    at: now,
                    decision,
                    max_retries: self.config.max_retries,
                });
                self.request(host);
            }
        }
    }

    fn expire<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        let now = host.now();
        let accumulated = self.session.visible_total(now);
        let next_size = self.session.complete_cycle();
        self.tracer.expiry(&ExpiryEvent {
            at: now,
            accumulated,
            next_size,
        });
        host.unobserve_fill();
        host.unobserve_slot();
        self.request(host);
    }

    /// Cancels timers and disconnects the per-request observers.
    fn release<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        self.cancel_display_timer(host);
        self.cancel_settle_timer(host);
        host.unobserve_fill();
        host.unobserve_slot();
    }

    fn arm_display_timer<H: SlotHost + ?Sized>(&mut self, host: &mut H, now: HostTime) {
        let delay = self.session.remaining();
        match host.arm_timer(delay) {
            Ok(id) => {
                self.display_timer = Some(id);
                self.tracer.timer_armed(&TimerArmedEvent { at: now, delay });
            }
            // Left unarmed; the slot becoming visible again retries.
            Err(fault) => self.fault(now, fault),
        }
    }

    fn cancel_display_timer<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(id) = self.display_timer.take() {
            host.cancel_timer(id);
        }
    }

    fn cancel_settle_timer<H: SlotHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(id) = self.settle_timer.take() {
            host.cancel_timer(id);
        }
    }

    fn set_phase(&mut self, now: HostTime, to: Phase) {
        if self.phase == to {
            return;
        }
        let from = core::mem::replace(&mut self.phase, to);
        self.tracer.transition(&TransitionEvent { at: now, from, to });
    }

    fn fault(&mut self, now: HostTime, fault: SlotFault) {
        self.tracer.fault(&FaultEvent { at: now, fault });
    }

    fn trace_visibility(&mut self, now: HostTime, visible: bool, span: Duration) {
        self.tracer.visibility(&VisibilityEvent {
            at: now,
            visible,
            span,
            accumulated: self.session.accumulated(),
            remaining: self.session.remaining(),
        });
    }
}
