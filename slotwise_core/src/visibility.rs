// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport-intersection classification.
//!
//! Hosts with a native intersection observer report a ratio directly.
//! Hosts that only know geometry (the simulator, tests) can compute the same
//! ratio with [`intersection_ratio`].

use kurbo::Rect;

/// Fraction of `target`'s area that lies inside `root`, in `0.0..=1.0`.
///
/// A zero-area target is fully visible when its origin lies inside `root`
/// and invisible otherwise, matching how browsers treat empty elements.
#[must_use]
pub fn intersection_ratio(target: Rect, root: Rect) -> f64 {
    let target = target.abs();
    let root = root.abs();
    let area = target.area();
    if area <= 0.0 {
        return if root.contains(target.origin()) { 1.0 } else { 0.0 };
    }
    let overlap = target.intersect(root);
    (overlap.area() / area).clamp(0.0, 1.0)
}

/// Whether `ratio` counts as visible at `threshold`.
///
/// A zero ratio never counts, even with a zero threshold.
#[must_use]
pub fn meets_threshold(ratio: f64, threshold: f64) -> bool {
    ratio > 0.0 && ratio >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_partial_overlap() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let slot = Rect::new(0.0, 550.0, 728.0, 650.0);
        let ratio = intersection_ratio(slot, viewport);
        assert!((ratio - 0.5).abs() < 1e-9, "half the slot is on screen");
        assert!(meets_threshold(ratio, 0.5));
        assert!(!meets_threshold(ratio, 0.6));
    }

    #[test]
    fn disjoint_rects_are_invisible() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let slot = Rect::new(0.0, 900.0, 728.0, 990.0);
        assert_eq!(intersection_ratio(slot, viewport), 0.0);
        assert!(!meets_threshold(0.0, 0.0));
    }

    #[test]
    fn empty_target_uses_origin() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(
            intersection_ratio(Rect::new(10.0, 10.0, 10.0, 10.0), viewport),
            1.0
        );
        assert_eq!(
            intersection_ratio(Rect::new(10.0, 900.0, 10.0, 900.0), viewport),
            0.0
        );
    }
}
