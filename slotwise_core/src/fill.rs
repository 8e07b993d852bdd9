// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fill-status classification.
//!
//! Ad networks report fill through attributes on the slot element. Two
//! dialects exist:
//!
//! - `data-ad-status="filled" | "unfilled"` states the outcome directly.
//! - `data-adsbygoogle-status="done"` only says the request finished. Some
//!   finished slots render nothing, so the outcome is inferred from the
//!   rendered height once layout has settled.

/// Attribute carrying an explicit fill outcome.
pub const AD_STATUS_ATTR: &str = "data-ad-status";

/// Attribute carrying the request-finished marker.
pub const REQUEST_STATUS_ATTR: &str = "data-adsbygoogle-status";

/// Attributes a fill observer should watch.
pub const WATCHED_ATTRIBUTES: [&str; 2] = [AD_STATUS_ATTR, REQUEST_STATUS_ATTR];

/// A fill-related status change reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FillSignal {
    /// The network explicitly reported content.
    Filled,
    /// The network explicitly reported no content.
    Unfilled,
    /// The request finished; the outcome needs the height check.
    Done,
}

impl FillSignal {
    /// Maps an attribute change to a signal. Unrelated attributes and
    /// values return `None`.
    #[must_use]
    pub fn from_attribute(name: &str, value: Option<&str>) -> Option<Self> {
        match (name, value?) {
            (AD_STATUS_ATTR, "filled") => Some(Self::Filled),
            (AD_STATUS_ATTR, "unfilled") => Some(Self::Unfilled),
            (REQUEST_STATUS_ATTR, "done") => Some(Self::Done),
            _ => None,
        }
    }
}

/// The resolved outcome of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FillOutcome {
    /// Renderable content arrived.
    Filled,
    /// Nothing to show.
    Unfilled,
}

impl FillOutcome {
    /// Infers the outcome from the slot's rendered height.
    ///
    /// A missing slot counts as unfilled. The comparison is strict: a slot
    /// exactly `min_height` tall is unfilled.
    #[must_use]
    pub fn from_height(height: Option<f64>, min_height: f64) -> Self {
        match height {
            Some(h) if h > min_height => Self::Filled,
            _ => Self::Unfilled,
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filled => "filled",
            Self::Unfilled => "unfilled",
        }
    }
}

/// How an outcome was determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FillSource {
    /// An explicit `data-ad-status` value.
    Status,
    /// The rendered-height check after a `done` marker.
    Height,
}

impl FillSource {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Height => "height",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_status_values() {
        assert_eq!(
            FillSignal::from_attribute(AD_STATUS_ATTR, Some("filled")),
            Some(FillSignal::Filled)
        );
        assert_eq!(
            FillSignal::from_attribute(AD_STATUS_ATTR, Some("unfilled")),
            Some(FillSignal::Unfilled)
        );
        assert_eq!(FillSignal::from_attribute(AD_STATUS_ATTR, Some("")), None);
        assert_eq!(FillSignal::from_attribute(AD_STATUS_ATTR, None), None);
    }

    #[test]
    fn done_marker_only_on_request_status() {
        assert_eq!(
            FillSignal::from_attribute(REQUEST_STATUS_ATTR, Some("done")),
            Some(FillSignal::Done)
        );
        assert_eq!(FillSignal::from_attribute(AD_STATUS_ATTR, Some("done")), None);
        assert_eq!(FillSignal::from_attribute("class", Some("filled")), None);
    }

    #[test]
    fn height_threshold_is_strict() {
        assert_eq!(FillOutcome::from_height(Some(90.0), 10.0), FillOutcome::Filled);
        assert_eq!(
            FillOutcome::from_height(Some(10.0), 10.0),
            FillOutcome::Unfilled
        );
        assert_eq!(FillOutcome::from_height(Some(0.0), 10.0), FillOutcome::Unfilled);
        assert_eq!(FillOutcome::from_height(None, 10.0), FillOutcome::Unfilled);
    }
}
