// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines trace output.
//!
//! [`JsonLinesSink`] writes one compact JSON object per event. Every object
//! has an `"event"` name and an `"at_ms"` host timestamp; the remaining keys
//! depend on the event.

use std::io::Write;

use serde_json::{Value, json};
use slotwise_core::session::RetryDecision;
use slotwise_core::trace::{
    ExpiryEvent, FaultEvent, FillEvent, RequestEvent, RetryEvent, TimerArmedEvent, TraceSink,
    TransitionEvent, VisibilityEvent,
};

/// Writes one JSON object per trace event.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, value: &Value) {
        if serde_json::to_writer(&mut self.writer, value).is_ok() {
            let _ = self.writer.write_all(b"\n");
        }
    }
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_transition(&mut self, e: &TransitionEvent) {
        self.emit(&json!({
            "event": "transition",
            "at_ms": e.at.millis(),
            "from": e.from.as_str(),
            "to": e.to.as_str(),
        }));
    }

    fn on_request(&mut self, e: &RequestEvent) {
        self.emit(&json!({
            "event": "request",
            "at_ms": e.at.millis(),
            "size": e.size.as_str(),
            "retry_count": e.retry_count,
            "cycle": e.cycle,
        }));
    }

    fn on_fill(&mut self, e: &FillEvent) {
        self.emit(&json!({
            "event": "fill",
            "at_ms": e.at.millis(),
            "outcome": e.outcome.as_str(),
            "source": e.source.as_str(),
        }));
    }

    fn on_retry(&mut self, e: &RetryEvent) {
        let (exhausted, attempt, size) = match e.decision {
            RetryDecision::Retry { attempt, size } => (false, Some(attempt), size),
            RetryDecision::Exhausted { size } => (true, None, size),
        };
        self.emit(&json!({
            "event": "retry",
            "at_ms": e.at.millis(),
            "exhausted": exhausted,
            "attempt": attempt,
            "max_retries": e.max_retries,
            "size": size.as_str(),
        }));
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.emit(&json!({
            "event": "visibility",
            "at_ms": e.at.millis(),
            "visible": e.visible,
            "span_ms": e.span.millis(),
            "accumulated_ms": e.accumulated.millis(),
            "remaining_ms": e.remaining.millis(),
        }));
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        self.emit(&json!({
            "event": "timer_armed",
            "at_ms": e.at.millis(),
            "delay_ms": e.delay.millis(),
        }));
    }

    fn on_expiry(&mut self, e: &ExpiryEvent) {
        self.emit(&json!({
            "event": "expiry",
            "at_ms": e.at.millis(),
            "accumulated_ms": e.accumulated.millis(),
            "next_size": e.next_size.as_str(),
        }));
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        self.emit(&json!({
            "event": "fault",
            "at_ms": e.at.millis(),
            "kind": e.fault.as_str(),
            "message": e.fault.to_string(),
        }));
    }
}
