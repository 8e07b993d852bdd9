// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in milliseconds of host time.

use std::io::Write;

use slotwise_core::session::RetryDecision;
use slotwise_core::trace::{
    ExpiryEvent, FaultEvent, FillEvent, RequestEvent, RetryEvent, TimerArmedEvent, TraceSink,
    TransitionEvent, VisibilityEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_transition(&mut self, e: &TransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[phase] {} -> {} at {}ms",
            e.from.as_str(),
            e.to.as_str(),
            e.at.millis(),
        );
    }

    fn on_request(&mut self, e: &RequestEvent) {
        let _ = writeln!(
            self.writer,
            "[request] cycle={} size={} retry={} at {}ms",
            e.cycle,
            e.size.as_str(),
            e.retry_count,
            e.at.millis(),
        );
    }

    fn on_fill(&mut self, e: &FillEvent) {
        let _ = writeln!(
            self.writer,
            "[fill] {} via {} at {}ms",
            e.outcome.as_str(),
            e.source.as_str(),
            e.at.millis(),
        );
    }

    fn on_retry(&mut self, e: &RetryEvent) {
        let _ = match e.decision {
            RetryDecision::Retry { attempt, size } => writeln!(
                self.writer,
                "[retry] attempt {}/{} size={} at {}ms",
                attempt,
                e.max_retries,
                size.as_str(),
                e.at.millis(),
            ),
            RetryDecision::Exhausted { size } => writeln!(
                self.writer,
                "[retry] exhausted after {} size={} at {}ms",
                e.max_retries,
                size.as_str(),
                e.at.millis(),
            ),
        };
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        let _ = writeln!(
            self.writer,
            "[visibility] {} span={}ms accumulated={}ms remaining={}ms at {}ms",
            if e.visible { "visible" } else { "hidden" },
            e.span.millis(),
            e.accumulated.millis(),
            e.remaining.millis(),
            e.at.millis(),
        );
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        let _ = writeln!(
            self.writer,
            "[timer] display timer {}ms at {}ms",
            e.delay.millis(),
            e.at.millis(),
        );
    }

    fn on_expiry(&mut self, e: &ExpiryEvent) {
        let _ = writeln!(
            self.writer,
            "[expiry] shown {}ms, next size={} at {}ms",
            e.accumulated.millis(),
            e.next_size.as_str(),
            e.at.millis(),
        );
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        let _ = writeln!(self.writer, "[fault] {} at {}ms", e.fault, e.at.millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotwise_core::controller::Phase;
    use slotwise_core::fault::SlotFault;
    use slotwise_core::session::SizeVariant;
    use slotwise_core::time::HostTime;

    #[test]
    fn pretty_print_transition() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_transition(&TransitionEvent {
            at: HostTime(1_500),
            from: Phase::FillPending,
            to: Phase::Displaying,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[phase] fill_pending -> displaying at 1500ms\n");
    }

    #[test]
    fn pretty_print_retry_and_fault() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_retry(&RetryEvent {
            at: HostTime(0),
            decision: RetryDecision::Retry {
                attempt: 2,
                size: SizeVariant::Alternate,
            },
            max_retries: 3,
        });
        sink.on_fault(&FaultEvent {
            at: HostTime(7),
            fault: SlotFault::UnfilledAd { attempt: 2 },
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("attempt 2/3 size=alternate"), "got: {output}");
        assert!(output.contains("[fault]"), "got: {output}");
        assert_eq!(output.lines().count(), 2);
    }
}
