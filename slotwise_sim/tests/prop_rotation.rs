// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Randomized rotation sequences checked against the session invariants.

use proptest::prelude::*;
use slotwise_core::config::RotationConfig;
use slotwise_core::controller::Phase;
use slotwise_core::fill::FillSignal;
use slotwise_core::time::Duration;
use slotwise_sim::{HostToggles, SimHost, Simulation};

#[derive(Clone, Debug)]
enum Op {
    Advance(u64),
    Scroll { visible: bool },
    Fill(FillSignal),
    Height(f64),
    Stop,
    Start,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0_u64..25_000).prop_map(Op::Advance),
        3 => any::<bool>().prop_map(|visible| Op::Scroll { visible }),
        4 => prop_oneof![
            Just(FillSignal::Filled),
            Just(FillSignal::Unfilled),
            Just(FillSignal::Done),
        ]
        .prop_map(Op::Fill),
        1 => (0.0_f64..120.0).prop_map(Op::Height),
        1 => Just(Op::Stop),
        1 => Just(Op::Start),
    ]
}

fn apply(sim: &mut Simulation, op: &Op) {
    match op {
        Op::Advance(ms) => sim.advance_by(Duration(*ms)),
        Op::Scroll { visible } => sim.scroll_to(if *visible { 0.0 } else { 2_000.0 }),
        Op::Fill(signal) => {
            let _ = sim.report_fill(*signal);
        }
        Op::Height(h) => sim.set_slot_height(*h),
        Op::Stop => sim.stop(),
        Op::Start => sim.start(),
    }
}

proptest! {
    #[test]
    fn prop_session_invariants(
        ops in prop::collection::vec(op_strategy(), 1..80),
        intersection in any::<bool>(),
    ) {
        let host = SimHost::above_the_fold().with_toggles(HostToggles {
            intersection,
            ..HostToggles::default()
        });
        let mut sim = Simulation::new(RotationConfig::standard(), host);
        sim.start();

        let max_retries = sim.controller().config().max_retries;
        let target = sim.controller().config().display_target;
        let mut prev = (sim.phase(), sim.controller().session().cycles(), Duration::ZERO);

        for op in &ops {
            let size_before = sim.controller().session().size();
            let phase_before = sim.phase();
            apply(&mut sim, op);

            let session = sim.controller().session();
            prop_assert!(session.retry_count() <= max_retries);
            prop_assert_eq!(session.remaining(), target.saturating_sub(session.accumulated()));
            prop_assert!(sim.host().pending_timers().count() <= 2);

            if matches!(op, Op::Fill(FillSignal::Filled)) && phase_before == Phase::FillPending {
                prop_assert_eq!(session.size(), size_before, "a fill never toggles size");
            }

            let now = (sim.phase(), session.cycles(), session.accumulated());
            if prev.0 == Phase::Displaying && now.0 == Phase::Displaying && prev.1 == now.1 {
                prop_assert!(now.2 >= prev.2, "visible time went backwards");
            }
            prev = now;

            if sim.phase() == Phase::Stopped {
                prop_assert_eq!(sim.host().pending_timers().count(), 0);
                prop_assert!(!sim.host().is_observing());
            }
        }
    }

    #[test]
    fn prop_unfilled_streak_toggles_between_resets(streak in 1_usize..20) {
        let mut sim = Simulation::standard();
        sim.start();
        for _ in 0..streak {
            prop_assert!(sim.report_fill(FillSignal::Unfilled));
        }
        let mounts = sim.host().mounts();
        prop_assert_eq!(mounts.len(), streak + 1);

        // Every fourth miss resets the counter without toggling.
        let toggles = mounts.windows(2).filter(|pair| pair[0] != pair[1]).count();
        prop_assert_eq!(toggles, streak - streak / 4);
        prop_assert_eq!(usize::from(sim.controller().session().retry_count()), streak % 4);
    }
}
