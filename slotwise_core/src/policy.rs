// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Referrer-based rotation gate.
//!
//! Pages embedded by certain portals must not show their own ads, and a page
//! opened without any referrer is treated the same way. The check runs once
//! at install time.

use alloc::string::String;
use alloc::vec::Vec;

use url::Url;

/// Decides whether ads may run for a given referrer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferrerPolicy {
    disallowed: Vec<String>,
}

impl ReferrerPolicy {
    /// Creates a policy that blocks any referrer host containing one of
    /// `domains`. Matching ignores ASCII case.
    #[must_use]
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            disallowed: domains
                .into_iter()
                .map(|domain| domain.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// The blocked domain fragments, lowercased.
    #[must_use]
    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }

    /// Whether rotation may start for `referrer` (a full URL, possibly
    /// empty).
    ///
    /// Matching is by substring on the host, so `example.com` also blocks
    /// `cdn.example.com`.
    #[must_use]
    pub fn allows(&self, referrer: &str) -> bool {
        let Some(host) = referrer_host(referrer) else {
            return false;
        };
        !self
            .disallowed
            .iter()
            .any(|domain| host.contains(domain.as_str()))
    }
}

/// Extracts the host from an absolute URL, lowercased.
///
/// Returns `None` for empty input, relative URLs, or URLs without a host.
#[must_use]
pub fn referrer_host(referrer: &str) -> Option<String> {
    let url = Url::parse(referrer).ok()?;
    let host = url.host_str()?;
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}
