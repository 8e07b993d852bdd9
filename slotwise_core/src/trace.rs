// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the rotation loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! controller calls at each transition. All method bodies default to no-ops,
//! so implementing only the events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed [`TraceSink`]. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Trace output is advisory; nothing in the rotation contract depends on it.

use alloc::boxed::Box;

use crate::controller::Phase;
use crate::fault::SlotFault;
use crate::fill::{FillOutcome, FillSource};
use crate::session::{RetryDecision, SizeVariant};
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the controller changes phase.
#[derive(Clone, Copy, Debug)]
pub struct TransitionEvent {
    /// Host time of the change.
    pub at: HostTime,
    /// Phase before the change.
    pub from: Phase,
    /// Phase after the change.
    pub to: Phase,
}

/// Emitted after a slot is mounted and the ad request sent.
#[derive(Clone, Copy, Debug)]
pub struct RequestEvent {
    /// Host time of the request.
    pub at: HostTime,
    /// Size requested.
    pub size: SizeVariant,
    /// Retry count at request time.
    pub retry_count: u8,
    /// Requests issued so far, including this one.
    pub cycle: u64,
}

/// Emitted when a request's fill outcome is known.
#[derive(Clone, Copy, Debug)]
pub struct FillEvent {
    /// Host time of resolution.
    pub at: HostTime,
    /// Resolved outcome.
    pub outcome: FillOutcome,
    /// How the outcome was determined.
    pub source: FillSource,
}

/// Emitted after an unfilled response was handled.
#[derive(Clone, Copy, Debug)]
pub struct RetryEvent {
    /// Host time of the decision.
    pub at: HostTime,
    /// What the session decided.
    pub decision: RetryDecision,
    /// Configured retry limit.
    pub max_retries: u8,
}

/// Emitted when a displayed slot enters or leaves the viewport.
#[derive(Clone, Copy, Debug)]
pub struct VisibilityEvent {
    /// Host time of the change.
    pub at: HostTime,
    /// Whether the slot is now visible.
    pub visible: bool,
    /// Length of the span that just closed (zero when becoming visible).
    pub span: Duration,
    /// Folded visible time after the change.
    pub accumulated: Duration,
    /// Display time still owed after the change.
    pub remaining: Duration,
}

/// Emitted when the display timer is armed or resumed.
#[derive(Clone, Copy, Debug)]
pub struct TimerArmedEvent {
    /// Host time of arming.
    pub at: HostTime,
    /// Delay until the timer fires.
    pub delay: Duration,
}

/// Emitted when a displayed ad has been on screen long enough.
#[derive(Clone, Copy, Debug)]
pub struct ExpiryEvent {
    /// Host time of expiry.
    pub at: HostTime,
    /// Visible time the ad accumulated.
    pub accumulated: Duration,
    /// Size the next request will use.
    pub next_size: SizeVariant,
}

/// Emitted when the controller absorbs a fault.
#[derive(Clone, Copy, Debug)]
pub struct FaultEvent {
    /// Host time of the fault.
    pub at: HostTime,
    /// What happened.
    pub fault: SlotFault,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the rotation controller.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called on every phase change.
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }

    /// Called after an ad request is sent.
    fn on_request(&mut self, e: &RequestEvent) {
        _ = e;
    }

    /// Called when a fill outcome is resolved.
    fn on_fill(&mut self, e: &FillEvent) {
        _ = e;
    }

    /// Called after the retry policy handled an unfilled ad.
    fn on_retry(&mut self, e: &RetryEvent) {
        _ = e;
    }

    /// Called when a displayed slot changes visibility.
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        _ = e;
    }

    /// Called when the display timer is armed.
    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        _ = e;
    }

    /// Called when a displayed ad expires.
    fn on_expiry(&mut self, e: &ExpiryEvent) {
        _ = e;
    }

    /// Called when a fault is absorbed.
    fn on_fault(&mut self, e: &FaultEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing and
/// the sink handed to [`Tracer::new`] is dropped immediately.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident, $method:ident, $event:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl Tracer {
    /// Creates a tracer that dispatches to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    dispatch!(
        /// Emits a [`TransitionEvent`].
        transition, on_transition, TransitionEvent
    );
    dispatch!(
        /// Emits a [`RequestEvent`].
        request, on_request, RequestEvent
    );
    dispatch!(
        /// Emits a [`FillEvent`].
        fill, on_fill, FillEvent
    );
    dispatch!(
        /// Emits a [`RetryEvent`].
        retry, on_retry, RetryEvent
    );
    dispatch!(
        /// Emits a [`VisibilityEvent`].
        visibility, on_visibility, VisibilityEvent
    );
    dispatch!(
        /// Emits a [`TimerArmedEvent`].
        timer_armed, on_timer_armed, TimerArmedEvent
    );
    dispatch!(
        /// Emits an [`ExpiryEvent`].
        expiry, on_expiry, ExpiryEvent
    );
    dispatch!(
        /// Emits a [`FaultEvent`].
        fault, on_fault, FaultEvent
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fault() -> FaultEvent {
        FaultEvent {
            at: HostTime(5),
            fault: SlotFault::MissingContainer,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_fault(&sample_fault());
        sink.on_timer_armed(&TimerArmedEvent {
            at: HostTime(0),
            delay: Duration(20_000),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.fault(&sample_fault());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        struct RecordingSink {
            faults: Rc<RefCell<Vec<SlotFault>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_fault(&mut self, e: &FaultEvent) {
                self.faults.borrow_mut().push(e.fault);
            }
        }

        let faults = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::new(Box::new(RecordingSink {
            faults: Rc::clone(&faults),
        }));
        tracer.fault(&sample_fault());
        assert_eq!(*faults.borrow(), [SlotFault::MissingContainer]);
    }
}
