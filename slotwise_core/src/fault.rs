// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable faults.
//!
//! Nothing the controller encounters is fatal. Every fault is reported to the
//! trace sink and then absorbed into the next transition or a no-op.

use core::fmt;

/// A condition the controller worked around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotFault {
    /// The network had no ad for the request. Drives the retry policy.
    UnfilledAd {
        /// Retry count at the time of the miss (0 for the first request).
        attempt: u8,
    },
    /// The host cannot observe viewport intersection; display time runs
    /// unconditionally.
    ObservationUnsupported,
    /// The page is framed cross-origin. Detected and logged only.
    CrossOriginRestricted,
    /// The container element is absent; the operation was skipped.
    MissingContainer,
    /// The slot markup was mounted but produced no slot element.
    MissingSlot,
    /// The ad-network request threw. Fill observation continues.
    RequestRejected,
    /// The host could not schedule a timer.
    TimerUnavailable,
}

impl SlotFault {
    /// Returns a short machine-friendly label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnfilledAd { .. } => "unfilled_ad",
            Self::ObservationUnsupported => "observation_unsupported",
            Self::CrossOriginRestricted => "cross_origin_restricted",
            Self::MissingContainer => "missing_container",
            Self::MissingSlot => "missing_slot",
            Self::RequestRejected => "request_rejected",
            Self::TimerUnavailable => "timer_unavailable",
        }
    }
}

impl fmt::Display for SlotFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnfilledAd { attempt } => write!(f, "ad unfilled (retry {attempt})"),
            Self::ObservationUnsupported => {
                write!(f, "intersection observation unsupported; timer runs unconditionally")
            }
            Self::CrossOriginRestricted => write!(f, "cross-origin iframe detected"),
            Self::MissingContainer => write!(f, "ad container element not found"),
            Self::MissingSlot => write!(f, "ad slot element not found after mounting"),
            Self::RequestRejected => write!(f, "ad network rejected the request"),
            Self::TimerUnavailable => write!(f, "host refused to schedule a timer"),
        }
    }
}

impl core::error::Error for SlotFault {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString as _;

    #[test]
    fn display_includes_attempt() {
        let fault = SlotFault::UnfilledAd { attempt: 2 };
        assert_eq!(fault.to_string(), "ad unfilled (retry 2)");
        assert_eq!(fault.as_str(), "unfilled_ad");
    }
}
