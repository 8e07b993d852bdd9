// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event-loop driver pairing a [`RotationController`] with a [`SimHost`].

use slotwise_core::config::RotationConfig;
use slotwise_core::controller::{Phase, RotationController};
use slotwise_core::fill::FillSignal;
use slotwise_core::time::{Duration, HostTime};
use slotwise_core::trace::TraceSink;

use crate::host::{Notice, SimHost};

/// A controller and its simulated host, advanced in virtual time.
///
/// Every public method that can produce host callbacks drains the notice
/// queue before returning, so assertions always see a settled state.
#[derive(Debug)]
pub struct Simulation {
    controller: RotationController,
    host: SimHost,
}

impl Simulation {
    /// Pairs a fresh controller using `config` with `host`.
    #[must_use]
    pub fn new(config: RotationConfig, host: SimHost) -> Self {
        Self {
            controller: RotationController::new(config),
            host,
        }
    }

    /// Standard configuration over [`SimHost::above_the_fold`].
    #[must_use]
    pub fn standard() -> Self {
        Self::new(RotationConfig::standard(), SimHost::above_the_fold())
    }

    /// Routes controller trace events to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.controller = self.controller.with_sink(sink);
        self
    }

    /// The controller under test.
    #[must_use]
    pub fn controller(&self) -> &RotationController {
        &self.controller
    }

    /// The simulated host.
    #[must_use]
    pub fn host(&self) -> &SimHost {
        &self.host
    }

    /// Mutable access to the host. Call [`flush`](Self::flush) after
    /// changing anything that can queue notices.
    pub fn host_mut(&mut self) -> &mut SimHost {
        &mut self.host
    }

    /// Current controller phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        slotwise_core::backend::SlotHost::now(&self.host)
    }

    /// Starts rotation.
    pub fn start(&mut self) {
        self.controller.start(&mut self.host);
        self.flush();
    }

    /// Stops rotation.
    pub fn stop(&mut self) {
        self.controller.stop(&mut self.host);
        self.flush();
    }

    /// Delivers queued notices until the queue is empty.
    pub fn flush(&mut self) {
        while let Some(notice) = self.host.next_notice() {
            match notice {
                Notice::Container(visible) => {
                    self.controller
                        .on_container_visibility(&mut self.host, visible);
                }
                Notice::Slot(visible) => {
                    self.controller.on_slot_visibility(&mut self.host, visible);
                }
                Notice::Fill(signal) => self.controller.on_fill_signal(&mut self.host, signal),
                Notice::FillBatch(signals) => {
                    self.controller.on_fill_batch(&mut self.host, signals);
                }
                Notice::Timer(id) => self.controller.on_timer(&mut self.host, id),
            }
        }
    }

    /// Runs every timer due at or before `until`, then sets the clock to
    /// `until`. Times in the past are ignored.
    pub fn advance_to(&mut self, until: HostTime) {
        self.flush();
        while let Some((id, due)) = self.host.next_due() {
            if due > until {
                break;
            }
            self.host.fire(id);
            self.flush();
        }
        self.host.set_now(until);
    }

    /// Advances the clock by `delta`.
    pub fn advance_by(&mut self, delta: Duration) {
        let until = self.now() + delta;
        self.advance_to(until);
    }

    /// Scrolls the viewport top edge to `y`.
    pub fn scroll_to(&mut self, y: f64) {
        self.host.scroll_to(y);
        self.flush();
    }

    /// Has the ad network report `signal` for the mounted slot. Returns
    /// whether a fill observer was listening.
    pub fn report_fill(&mut self, signal: FillSignal) -> bool {
        let queued = self.host.report_fill(signal);
        self.flush();
        queued
    }

    /// Reports several fill attribute changes in one batch. Returns whether
    /// they were delivered.
    pub fn report_fill_batch(&mut self, signals: Vec<FillSignal>) -> bool {
        let queued = self.host.report_fill_batch(signals);
        self.flush();
        queued
    }

    /// Sets the rendered height of the mounted slot.
    pub fn set_slot_height(&mut self, height: f64) {
        self.host.set_slot_height(height);
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_run_at_their_due_time() {
        let mut sim = Simulation::standard();
        sim.start();
        assert!(sim.report_fill(FillSignal::Filled));
        assert_eq!(sim.phase(), Phase::Displaying);

        sim.advance_by(Duration::from_millis(19_999));
        assert_eq!(sim.host().requests().len(), 1);
        sim.advance_by(Duration::from_millis(1));
        assert_eq!(sim.host().requests().len(), 2);
        assert_eq!(sim.host().requests()[1].at, HostTime(20_000));
    }

    #[test]
    fn advancing_backwards_is_ignored() {
        let mut sim = Simulation::standard();
        sim.advance_to(HostTime(1_000));
        sim.advance_to(HostTime(500));
        assert_eq!(sim.now(), HostTime(1_000));
    }
}
