// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end rotation scenarios against the simulated host.

use std::cell::RefCell;
use std::rc::Rc;

use slotwise_core::config::RotationConfig;
use slotwise_core::controller::Phase;
use slotwise_core::fault::SlotFault;
use slotwise_core::fill::FillSignal;
use slotwise_core::session::SizeVariant;
use slotwise_core::time::{Duration, HostTime};
use slotwise_core::trace::{FaultEvent, TraceSink};
use slotwise_sim::{HostToggles, SimHost, Simulation};

const OFF_SCREEN: f64 = 2_000.0;

fn request_times(sim: &Simulation) -> Vec<u64> {
    sim.host().requests().iter().map(|r| r.at.millis()).collect()
}

fn toggles(sizes: &[SizeVariant]) -> usize {
    sizes.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

#[derive(Default)]
struct FaultLog(Rc<RefCell<Vec<SlotFault>>>);

impl TraceSink for FaultLog {
    fn on_fault(&mut self, e: &FaultEvent) {
        self.0.borrow_mut().push(e.fault);
    }
}

#[test]
fn expiry_counts_only_visible_time() {
    let mut sim = Simulation::standard();
    sim.start();
    sim.report_fill(FillSignal::Filled);
    assert_eq!(sim.phase(), Phase::Displaying);

    sim.advance_to(HostTime(5_000));
    sim.scroll_to(OFF_SCREEN);
    assert_eq!(sim.controller().session().accumulated(), Duration(5_000));
    assert_eq!(sim.host().pending_timers().count(), 0);

    sim.advance_to(HostTime(8_000));
    sim.scroll_to(0.0);
    assert_eq!(sim.controller().remaining(), Duration(15_000));

    sim.advance_to(HostTime(22_999));
    assert_eq!(request_times(&sim), [0]);
    sim.advance_to(HostTime(23_000));
    assert_eq!(request_times(&sim), [0, 23_000]);
    assert_eq!(sim.host().mounted_size(), Some(SizeVariant::Alternate));
    assert_eq!(sim.phase(), Phase::FillPending);
}

#[test]
fn partially_visible_slot_below_threshold_does_not_count() {
    let mut sim = Simulation::standard();
    sim.start();
    // Slot spans y 100..350; a viewport starting at 250 shows 40% of it.
    sim.scroll_to(250.0);
    sim.report_fill(FillSignal::Filled);
    sim.advance_to(HostTime(60_000));
    assert_eq!(request_times(&sim), [0]);
    assert_eq!(sim.controller().session().accumulated(), Duration::ZERO);

    // 60% visible.
    sim.scroll_to(200.0);
    sim.advance_to(HostTime(80_000));
    assert_eq!(request_times(&sim), [0, 80_000]);
}

#[test]
fn four_unfilled_reports_reset_the_retry_count() {
    let mut sim = Simulation::standard();
    sim.start();
    for _ in 0..4 {
        assert!(sim.report_fill(FillSignal::Unfilled));
    }

    assert_eq!(sim.host().requests().len(), 5);
    assert_eq!(sim.controller().session().retry_count(), 0);
    assert_eq!(toggles(sim.host().mounts()), 3);
    assert_eq!(
        sim.host().mounts(),
        [
            SizeVariant::Standard,
            SizeVariant::Alternate,
            SizeVariant::Standard,
            SizeVariant::Alternate,
            SizeVariant::Alternate,
        ]
    );
}

#[test]
fn each_expiry_toggles_size_once() {
    let mut sim = Simulation::standard();
    sim.start();
    for round in 1..=3_usize {
        sim.report_fill(FillSignal::Filled);
        sim.advance_by(Duration::from_secs(20));
        assert_eq!(sim.host().requests().len(), round + 1);
    }
    assert_eq!(
        sim.host().mounts(),
        [
            SizeVariant::Standard,
            SizeVariant::Alternate,
            SizeVariant::Standard,
            SizeVariant::Alternate,
        ]
    );
}

#[test]
fn stop_mid_display_halts_everything() {
    let mut sim = Simulation::standard();
    sim.start();
    sim.report_fill(FillSignal::Filled);
    sim.advance_to(HostTime(5_000));

    sim.stop();
    assert_eq!(sim.phase(), Phase::Stopped);
    assert_eq!(sim.host().pending_timers().count(), 0);
    assert!(!sim.host().is_observing());

    sim.advance_to(HostTime(120_000));
    assert!(!sim.report_fill(FillSignal::Unfilled), "observer disconnected");
    sim.scroll_to(OFF_SCREEN);
    sim.scroll_to(0.0);
    assert_eq!(request_times(&sim), [0]);

    sim.start();
    assert_eq!(request_times(&sim), [0, 120_000]);
}

#[test]
fn container_gate_waits_for_scroll() {
    let mut sim = Simulation::new(RotationConfig::standard(), SimHost::below_the_fold());
    sim.start();
    assert_eq!(sim.phase(), Phase::AwaitingContainer);
    sim.advance_to(HostTime(30_000));
    assert!(sim.host().requests().is_empty());

    // Container spans y 1200..1500; this shows 10% of it.
    sim.scroll_to(630.0);
    assert!(sim.host().requests().is_empty());

    sim.advance_to(HostTime(31_000));
    sim.scroll_to(700.0);
    assert_eq!(request_times(&sim), [31_000]);
    assert!(!sim.host().is_watching_container());
}

#[test]
fn without_intersection_support_timer_runs_unconditionally() {
    let host = SimHost::below_the_fold().with_toggles(HostToggles {
        intersection: false,
        ..HostToggles::default()
    });
    let faults = Rc::new(RefCell::new(Vec::new()));
    let mut sim = Simulation::new(RotationConfig::standard(), host)
        .with_sink(Box::new(FaultLog(Rc::clone(&faults))));

    sim.start();
    assert_eq!(request_times(&sim), [0], "no gate without intersection");
    sim.report_fill(FillSignal::Filled);
    sim.advance_to(HostTime(20_000));
    assert_eq!(request_times(&sim), [0, 20_000]);
    assert!(faults.borrow().contains(&SlotFault::ObservationUnsupported));
}

#[test]
fn missing_container_is_a_silent_no_op() {
    let mut sim = Simulation::new(
        RotationConfig::standard(),
        SimHost::above_the_fold().without_container(),
    );
    sim.start();
    sim.advance_to(HostTime(60_000));
    assert_eq!(sim.phase(), Phase::Idle);
    assert!(sim.host().requests().is_empty());
    assert!(!sim.host().is_observing());
}

#[test]
fn done_marker_falls_back_to_height() {
    let mut sim = Simulation::standard();
    sim.start();

    sim.set_slot_height(4.0);
    sim.report_fill(FillSignal::Done);
    sim.advance_by(Duration::from_millis(99));
    assert_eq!(sim.phase(), Phase::FillPending);
    sim.advance_by(Duration::from_millis(1));
    assert_eq!(sim.host().mounts(), [SizeVariant::Standard, SizeVariant::Alternate]);
    assert_eq!(sim.host().requests().len(), 2);

    // The alternate unit renders at its full 90px.
    sim.report_fill(FillSignal::Done);
    sim.advance_by(Duration::from_millis(100));
    assert_eq!(sim.phase(), Phase::Displaying);
}

#[test]
fn exact_minimum_height_counts_as_unfilled() {
    let mut sim = Simulation::standard();
    sim.start();
    sim.set_slot_height(10.0);
    sim.report_fill(FillSignal::Done);
    sim.advance_by(Duration::from_millis(100));
    assert_eq!(sim.phase(), Phase::FillPending);
    assert_eq!(sim.host().requests().len(), 2);
}

#[test]
fn explicit_status_during_settle_delay_wins() {
    let mut sim = Simulation::standard();
    sim.start();
    sim.set_slot_height(0.0);
    sim.report_fill(FillSignal::Done);
    sim.report_fill(FillSignal::Filled);
    sim.advance_by(Duration::from_millis(500));
    assert_eq!(sim.phase(), Phase::Displaying);
    assert_eq!(sim.host().requests().len(), 1);
    assert_eq!(sim.host().cancelled_timers(), 1);
}

#[test]
fn rejected_requests_are_logged_and_absorbed() {
    let host = SimHost::above_the_fold().with_toggles(HostToggles {
        reject_requests: true,
        cross_origin: true,
        ..HostToggles::default()
    });
    let faults = Rc::new(RefCell::new(Vec::new()));
    let mut sim = Simulation::new(RotationConfig::standard(), host)
        .with_sink(Box::new(FaultLog(Rc::clone(&faults))));
    sim.start();

    assert_eq!(sim.phase(), Phase::FillPending);
    assert!(sim.host().is_watching_fill());
    assert_eq!(
        *faults.borrow(),
        [SlotFault::CrossOriginRestricted, SlotFault::RequestRejected]
    );
}

#[test]
fn custom_config_changes_retry_limit_and_target() {
    let config = RotationConfig {
        max_retries: 1,
        display_target: Duration::from_secs(5),
        ..RotationConfig::standard()
    };
    let mut sim = Simulation::new(config, SimHost::above_the_fold());
    sim.start();
    sim.report_fill(FillSignal::Unfilled);
    sim.report_fill(FillSignal::Unfilled);
    assert_eq!(
        sim.host().mounts(),
        [
            SizeVariant::Standard,
            SizeVariant::Alternate,
            SizeVariant::Alternate,
        ]
    );

    sim.report_fill(FillSignal::Filled);
    let filled_at = sim.now();
    sim.advance_by(Duration::from_secs(5));
    assert_eq!(
        sim.host().requests().last().map(|r| r.at),
        Some(filled_at + Duration::from_secs(5))
    );
}

#[test]
fn stale_status_in_the_same_batch_does_not_touch_the_next_slot() {
    let mut sim = Simulation::standard();
    sim.start();
    assert!(sim.report_fill_batch(vec![FillSignal::Unfilled, FillSignal::Done]));

    assert_eq!(sim.phase(), Phase::FillPending);
    assert_eq!(
        sim.host().mounts(),
        [SizeVariant::Standard, SizeVariant::Alternate]
    );
    assert_eq!(sim.controller().settle_timer(), None);

    sim.advance_by(Duration::from_millis(500));
    assert_eq!(sim.phase(), Phase::FillPending, "new slot still awaits its own status");
    assert_eq!(sim.host().requests().len(), 2);
    assert_eq!(sim.controller().session().retry_count(), 1);
}

#[test]
fn broken_observers_fall_back_to_unconditional_timing() {
    let host = SimHost::below_the_fold().with_toggles(HostToggles {
        reject_observers: true,
        ..HostToggles::default()
    });
    let faults = Rc::new(RefCell::new(Vec::new()));
    let mut sim = Simulation::new(RotationConfig::standard(), host)
        .with_sink(Box::new(FaultLog(Rc::clone(&faults))));

    sim.start();
    assert_eq!(request_times(&sim), [0], "gate skipped when it cannot be observed");
    sim.report_fill(FillSignal::Filled);
    assert!(!sim.host().is_watching_slot());
    sim.advance_to(HostTime(20_000));
    assert_eq!(request_times(&sim), [0, 20_000]);
    assert!(faults.borrow().contains(&SlotFault::ObservationUnsupported));
}

#[test]
fn refused_timers_are_reported_not_swallowed() {
    let mut sim = Simulation::standard();
    let faults = Rc::new(RefCell::new(Vec::new()));
    sim = sim.with_sink(Box::new(FaultLog(Rc::clone(&faults))));
    sim.start();
    sim.report_fill(FillSignal::Filled);
    sim.scroll_to(OFF_SCREEN);

    sim.host_mut().toggles_mut().reject_timers = true;
    sim.scroll_to(0.0);
    assert_eq!(sim.controller().display_timer(), None);
    assert_eq!(*faults.borrow(), [SlotFault::TimerUnavailable]);

    sim.host_mut().toggles_mut().reject_timers = false;
    sim.advance_by(Duration::from_secs(1));
    sim.scroll_to(OFF_SCREEN);
    sim.scroll_to(0.0);
    assert!(sim.controller().display_timer().is_some());
}
