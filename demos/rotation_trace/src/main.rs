// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted rotation session that exercises the tracing pipeline.
//!
//! Drives a [`Simulation`] through the container gate, an unfilled retry, a
//! height-checked fill, a visibility pause, an expiry, and a stop. Events go
//! to a [`PrettyPrintSink`](slotwise_debug::pretty::PrettyPrintSink) on stdout
//! and a [`JsonLinesSink`](slotwise_debug::json::JsonLinesSink) written to
//! `rotation.jsonl`.

use std::fs::File;
use std::io::{BufWriter, Write};

use slotwise_core::config::RotationConfig;
use slotwise_core::fill::FillSignal;
use slotwise_core::time::{Duration, HostTime};
use slotwise_core::trace::{
    ExpiryEvent, FaultEvent, FillEvent, RequestEvent, RetryEvent, TimerArmedEvent, TraceSink,
    TransitionEvent, VisibilityEvent,
};
use slotwise_debug::json::JsonLinesSink;
use slotwise_debug::pretty::PrettyPrintSink;
use slotwise_sim::{SimHost, Simulation};

const OUTPUT: &str = "rotation.jsonl";
/// Viewport offset that puts the below-the-fold container on screen.
const CONTAINER_IN_VIEW: f64 = 1_000.0;

/// Forwards every event to two sinks.
struct Tee<A, B>(A, B);

macro_rules! tee {
    ($($method:ident: $event:ty),* $(,)?) => {
        $(
            fn $method(&mut self, e: &$event) {
                self.0.$method(e);
                self.1.$method(e);
            }
        )*
    };
}

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    tee!(
        on_transition: TransitionEvent,
        on_request: RequestEvent,
        on_fill: FillEvent,
        on_retry: RetryEvent,
        on_visibility: VisibilityEvent,
        on_timer_armed: TimerArmedEvent,
        on_expiry: ExpiryEvent,
        on_fault: FaultEvent,
    );
}

/// Writer that hands its bytes to a shared buffer so they survive the sink.
#[derive(Clone, Default)]
struct Shared(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

impl Write for Shared {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn main() -> std::io::Result<()> {
    // -- sinks -------------------------------------------------------------
    let json = Shared::default();
    let sink = Tee(
        PrettyPrintSink::new(Box::new(std::io::stdout())),
        JsonLinesSink::new(json.clone()),
    );

    // -- simulation --------------------------------------------------------
    let mut sim = Simulation::new(RotationConfig::standard(), SimHost::below_the_fold())
        .with_sink(Box::new(sink));

    // 1. Gate: nothing is requested until the container scrolls in.
    sim.start();
    sim.advance_to(HostTime(2_000));
    sim.scroll_to(CONTAINER_IN_VIEW);

    // 2. First request comes back empty; retry with the alternate size.
    sim.advance_by(Duration::from_millis(300));
    sim.report_fill(FillSignal::Unfilled);

    // 3. Second request only reports "done"; the height check decides.
    sim.advance_by(Duration::from_millis(500));
    sim.report_fill(FillSignal::Done);
    sim.advance_by(Duration::from_millis(100));

    // 4. Visible for 5s, scrolled away for 3s, then back until expiry.
    sim.advance_by(Duration::from_secs(5));
    sim.scroll_to(0.0);
    sim.advance_by(Duration::from_secs(3));
    sim.scroll_to(CONTAINER_IN_VIEW);
    sim.advance_by(Duration::from_secs(15));

    // 5. Next ad fills; stop partway through its display time.
    sim.report_fill(FillSignal::Filled);
    sim.advance_by(Duration::from_secs(4));
    sim.stop();
    sim.advance_by(Duration::from_secs(60));

    // -- export ------------------------------------------------------------
    let mut writer = BufWriter::new(File::create(OUTPUT)?);
    writer.write_all(&json.0.borrow())?;
    writer.flush()?;

    println!(
        "Wrote {OUTPUT} ({} requests, final phase {})",
        sim.host().requests().len(),
        sim.phase().as_str()
    );
    Ok(())
}
