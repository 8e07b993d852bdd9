// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-slot session state.
//!
//! [`AdSlotSession`] is plain data plus the transitions the controller
//! applies to it. It never talks to a host, which keeps the retry and
//! visible-time bookkeeping testable on its own.
//!
//! # Visible time
//!
//! `accumulated` only grows when a visible span is folded in by
//! [`mark_hidden`](AdSlotSession::mark_hidden). The remaining display time is
//! always derived as `display_target - accumulated`, clamped at zero.

use crate::time::{Duration, HostTime};

/// Which of the two ad sizes the next request uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SizeVariant {
    /// The primary unit.
    #[default]
    Standard,
    /// The fallback unit, tried to improve fill.
    Alternate,
}

impl SizeVariant {
    /// Returns the other variant.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Standard => Self::Alternate,
            Self::Alternate => Self::Standard,
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Alternate => "alternate",
        }
    }
}

/// What the session decided after an unfilled response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry with the toggled size. `attempt` is the new retry count.
    Retry {
        /// Retry count after this decision (1-based).
        attempt: u8,
        /// Size the retry will use.
        size: SizeVariant,
    },
    /// Retries exhausted; the counter was reset and the size kept.
    Exhausted {
        /// Size the next request will use.
        size: SizeVariant,
    },
}

/// State of one ad slot across request, fill, and display cycles.
#[derive(Clone, Debug)]
pub struct AdSlotSession {
    retry_count: u8,
    size: SizeVariant,
    display_target: Duration,
    accumulated: Duration,
    last_visible_at: Option<HostTime>,
    active: bool,
    cycles: u64,
}

impl AdSlotSession {
    /// Creates an inactive session with the given display target.
    #[must_use]
    pub const fn new(display_target: Duration) -> Self {
        Self {
            retry_count: 0,
            size: SizeVariant::Standard,
            display_target,
            accumulated: Duration::ZERO,
            last_visible_at: None,
            active: false,
            cycles: 0,
        }
    }

    /// Consecutive unfilled retries since the last reset.
    #[must_use]
    pub const fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Size the next (or current) request uses.
    #[must_use]
    pub const fn size(&self) -> SizeVariant {
        self.size
    }

    /// On-screen time required before the ad reloads.
    #[must_use]
    pub const fn display_target(&self) -> Duration {
        self.display_target
    }

    /// Visible time folded in since the last reset.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// `display_target - accumulated`, clamped at zero.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.display_target.saturating_sub(self.accumulated)
    }

    /// When the current visible span started, if the slot is visible.
    #[must_use]
    pub const fn last_visible_at(&self) -> Option<HostTime> {
        self.last_visible_at
    }

    /// Whether the session may issue requests and fire timers.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Number of ad requests issued over the session's lifetime.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Visible time including the span in progress at `now`, if any.
    #[must_use]
    pub fn visible_total(&self, now: HostTime) -> Duration {
        match self.last_visible_at {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }

    pub(crate) fn activate(&mut self) {
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.reset_display();
    }

    pub(crate) fn note_request(&mut self) {
        self.cycles = self.cycles.saturating_add(1);
    }

    /// Applies an unfilled response. The size toggles only while retries
    /// remain.
    pub fn record_unfilled(&mut self, max_retries: u8) -> RetryDecision {
        if self.retry_count < max_retries {
            self.retry_count += 1;
            self.size = self.size.toggled();
            RetryDecision::Retry {
                attempt: self.retry_count,
                size: self.size,
            }
        } else {
            self.retry_count = 0;
            RetryDecision::Exhausted { size: self.size }
        }
    }

    /// Applies a filled response: the retry counter and display clock reset,
    /// the size is left alone.
    pub fn record_filled(&mut self) {
        self.retry_count = 0;
        self.reset_display();
    }

    /// Starts a visible span. Returns `false` if one is already open.
    pub fn mark_visible(&mut self, now: HostTime) -> bool {
        if self.last_visible_at.is_some() {
            return false;
        }
        self.last_visible_at = Some(now);
        true
    }

    /// Closes the open visible span, folding it into `accumulated`.
    ///
    /// Returns the length of the span, or `None` if the slot was not visible.
    pub fn mark_hidden(&mut self, now: HostTime) -> Option<Duration> {
        let since = self.last_visible_at.take()?;
        let span = now.saturating_duration_since(since);
        self.accumulated = self.accumulated.saturating_add(span);
        Some(span)
    }

    /// Finishes a display cycle: toggles the size for the next ad, clears the
    /// retry counter and resets the display clock. Returns the new size.
    pub fn complete_cycle(&mut self) -> SizeVariant {
        self.retry_count = 0;
        self.size = self.size.toggled();
        self.reset_display();
        self.size
    }

    fn reset_display(&mut self) {
        self.accumulated = Duration::ZERO;
        self.last_visible_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AdSlotSession {
        AdSlotSession::new(Duration::from_millis(20_000))
    }

    #[test]
    fn unfilled_retries_toggle_then_reset() {
        let mut s = session();
        assert_eq!(
            s.record_unfilled(3),
            RetryDecision::Retry {
                attempt: 1,
                size: SizeVariant::Alternate
            }
        );
        assert_eq!(
            s.record_unfilled(3),
            RetryDecision::Retry {
                attempt: 2,
                size: SizeVariant::Standard
            }
        );
        assert_eq!(
            s.record_unfilled(3),
            RetryDecision::Retry {
                attempt: 3,
                size: SizeVariant::Alternate
            }
        );
        // Fourth miss: counter resets, size is kept.
        assert_eq!(
            s.record_unfilled(3),
            RetryDecision::Exhausted {
                size: SizeVariant::Alternate
            }
        );
        assert_eq!(s.retry_count(), 0);
    }

    #[test]
    fn fill_resets_retries_but_not_size() {
        let mut s = session();
        let _ = s.record_unfilled(3);
        assert_eq!(s.size(), SizeVariant::Alternate);
        s.record_filled();
        assert_eq!(s.retry_count(), 0);
        assert_eq!(s.size(), SizeVariant::Alternate, "fill never toggles");
        assert_eq!(s.remaining(), Duration::from_millis(20_000));
    }

    #[test]
    fn hidden_spans_fold_into_accumulated() {
        let mut s = session();
        assert!(s.mark_visible(HostTime(0)));
        assert!(!s.mark_visible(HostTime(100)), "duplicate visible ignored");
        assert_eq!(s.mark_hidden(HostTime(5_000)), Some(Duration(5_000)));
        assert_eq!(s.mark_hidden(HostTime(6_000)), None, "already hidden");
        assert_eq!(s.accumulated(), Duration(5_000));
        assert_eq!(s.remaining(), Duration(15_000));
        assert_eq!(s.visible_total(HostTime(9_000)), Duration(5_000));

        assert!(s.mark_visible(HostTime(8_000)));
        assert_eq!(s.visible_total(HostTime(9_000)), Duration(6_000));
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let mut s = session();
        s.mark_visible(HostTime(0));
        s.mark_hidden(HostTime(25_000));
        assert_eq!(s.accumulated(), Duration(25_000));
        assert_eq!(s.remaining(), Duration::ZERO);
    }

    #[test]
    fn complete_cycle_toggles_and_resets() {
        let mut s = session();
        let _ = s.record_unfilled(3);
        s.mark_visible(HostTime(0));
        assert_eq!(s.complete_cycle(), SizeVariant::Standard);
        assert_eq!(s.retry_count(), 0);
        assert_eq!(s.accumulated(), Duration::ZERO);
        assert_eq!(s.last_visible_at(), None);
    }

    #[test]
    fn deactivate_clears_display_clock() {
        let mut s = session();
        s.activate();
        s.mark_visible(HostTime(10));
        s.deactivate();
        assert!(!s.is_active());
        assert_eq!(s.last_visible_at(), None);
    }
}
