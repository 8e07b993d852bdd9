// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ad unit descriptions.

use alloc::format;
use alloc::string::String;

use slotwise_core::session::SizeVariant;

/// One ad-network unit: publisher id, slot id, and fixed pixel size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdUnit {
    /// Value for `data-ad-client`.
    pub client: String,
    /// Value for `data-ad-slot`.
    pub slot: String,
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl AdUnit {
    /// Creates a unit.
    #[must_use]
    pub fn new(client: impl Into<String>, slot: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            client: client.into(),
            slot: slot.into(),
            width,
            height,
        }
    }

    /// Inline style for the slot element.
    #[must_use]
    pub fn style(&self) -> String {
        format!(
            "display:inline-block;width:{}px;height:{}px",
            self.width, self.height
        )
    }
}

/// The two units rotated between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdUnits {
    /// Unit for [`SizeVariant::Standard`].
    pub standard: AdUnit,
    /// Unit for [`SizeVariant::Alternate`].
    pub alternate: AdUnit,
}

impl AdUnits {
    /// Returns the unit for `size`.
    #[must_use]
    pub fn get(&self, size: SizeVariant) -> &AdUnit {
        match size {
            SizeVariant::Standard => &self.standard,
            SizeVariant::Alternate => &self.alternate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> AdUnits {
        AdUnits {
            standard: AdUnit::new("ca-pub-1", "100", 728, 90),
            alternate: AdUnit::new("ca-pub-1", "200", 468, 60),
        }
    }

    #[test]
    fn unit_per_variant() {
        let units = units();
        assert_eq!(units.get(SizeVariant::Standard).slot, "100");
        assert_eq!(units.get(SizeVariant::Alternate).width, 468);
    }

    #[test]
    fn inline_style() {
        assert_eq!(
            units().standard.style(),
            "display:inline-block;width:728px;height:90px"
        );
    }
}
