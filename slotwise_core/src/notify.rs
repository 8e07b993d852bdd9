// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading-status messages for the embedding frame.
//!
//! The game page tells its parent when it starts and finishes loading. The
//! messages are fire-and-forget: no acknowledgment, no retry.

/// Value of the message's `type` field.
pub const MESSAGE_TYPE: &str = "loading_status";

/// Target origin used when posting to the parent.
pub const TARGET_ORIGIN: &str = "*";

/// Page loading phase reported to the parent frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadingStatus {
    /// The page script was installed.
    Started,
    /// The document finished parsing.
    Complete,
}

impl LoadingStatus {
    /// Returns the wire value of the `status` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Complete => "complete",
        }
    }
}

/// One `{ type, status, timestamp }` message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadingMessage {
    /// Loading phase.
    pub status: LoadingStatus,
    /// Wall-clock milliseconds since the Unix epoch. Unrelated to the
    /// monotonic [`HostTime`](crate::time::HostTime) clock.
    pub timestamp_ms: u64,
}

impl LoadingMessage {
    /// Creates a message stamped with `timestamp_ms`.
    #[must_use]
    pub const fn new(status: LoadingStatus, timestamp_ms: u64) -> Self {
        Self {
            status,
            timestamp_ms,
        }
    }

    /// The `(key, value)` string fields of the message; `timestamp` is
    /// numeric and carried separately.
    #[must_use]
    pub const fn fields(&self) -> [(&'static str, &'static str); 2] {
        [("type", MESSAGE_TYPE), ("status", self.status.as_str())]
    }
}
