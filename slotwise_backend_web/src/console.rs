// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.

use alloc::format;

use wasm_bindgen::JsValue;
use web_sys::console;

use slotwise_core::session::RetryDecision;
use slotwise_core::trace::{
    ExpiryEvent, FaultEvent, FillEvent, RequestEvent, RetryEvent, TimerArmedEvent, TraceSink,
    TransitionEvent, VisibilityEvent,
};

/// Writes one console line per trace event. Faults go to `console.warn`.
///
/// Events only arrive when the `trace` feature is enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

fn log(line: &str) {
    console::log_1(&JsValue::from_str(line));
}

impl TraceSink for ConsoleSink {
    fn on_transition(&mut self, e: &TransitionEvent) {
        log(&format!(
            "[slotwise] {} -> {}",
            e.from.as_str(),
            e.to.as_str()
        ));
    }

    fn on_request(&mut self, e: &RequestEvent) {
        log(&format!(
            "[slotwise] ad request sent ({} size, cycle {})",
            e.size.as_str(),
            e.cycle
        ));
    }

    fn on_fill(&mut self, e: &FillEvent) {
        log(&format!(
            "[slotwise] ad {} ({})",
            e.outcome.as_str(),
            e.source.as_str()
        ));
    }

    fn on_retry(&mut self, e: &RetryEvent) {
        let line = match e.decision {
            RetryDecision::Retry { attempt, size } => format!(
                "[slotwise] retry {attempt} of {} with {} size",
                e.max_retries,
                size.as_str()
            ),
            RetryDecision::Exhausted { .. } => {
                format!("[slotwise] {} retries used, starting over", e.max_retries)
            }
        };
        log(&line);
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        if e.visible {
            log("[slotwise] ad visible");
        } else {
            log(&format!(
                "[slotwise] ad hidden after {}ms, {}ms remaining",
                e.span.millis(),
                e.remaining.millis()
            ));
        }
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        log(&format!(
            "[slotwise] display timer armed for {}ms",
            e.delay.millis()
        ));
    }

    fn on_expiry(&mut self, e: &ExpiryEvent) {
        log(&format!(
            "[slotwise] display complete after {}ms visible, loading next ad",
            e.accumulated.millis()
        ));
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        console::warn_1(&JsValue::from_str(&format!("[slotwise] {}", e.fault)));
    }
}
