// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The simulated [`SlotHost`].
//!
//! Geometry is a scrolled viewport over a page with one container. The
//! mounted slot sits at the container's origin with the size of the current
//! [`SizeVariant`]. Observer reports and timer expiries are never delivered
//! directly; they queue up as [`Notice`]s for the driver to hand to the
//! controller, the same way a browser queues observer callbacks.

use std::collections::{BTreeMap, VecDeque};

use kurbo::{Rect, Size, Vec2};
use slotwise_core::backend::{SlotHost, TimerId};
use slotwise_core::fault::SlotFault;
use slotwise_core::fill::FillSignal;
use slotwise_core::session::SizeVariant;
use slotwise_core::time::{Duration, HostTime};
use slotwise_core::visibility::{intersection_ratio, meets_threshold};

/// Capability and failure toggles for a [`SimHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostToggles {
    /// Viewport intersection observation is available.
    pub intersection: bool,
    /// The page is framed by a cross-origin parent.
    pub cross_origin: bool,
    /// The ad-network push fails.
    pub reject_requests: bool,
    /// Intersection observers fail to construct.
    pub reject_observers: bool,
    /// The host refuses to schedule timers.
    pub reject_timers: bool,
}

impl Default for HostToggles {
    fn default() -> Self {
        Self {
            intersection: true,
            cross_origin: false,
            reject_requests: false,
            reject_observers: false,
            reject_timers: false,
        }
    }
}

/// Slot dimensions per size variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSizes {
    /// Box used for [`SizeVariant::Standard`].
    pub standard: Size,
    /// Box used for [`SizeVariant::Alternate`].
    pub alternate: Size,
}

impl SlotSizes {
    /// Returns the box for `variant`.
    #[must_use]
    pub fn get(&self, variant: SizeVariant) -> Size {
        match variant {
            SizeVariant::Standard => self.standard,
            SizeVariant::Alternate => self.alternate,
        }
    }
}

impl Default for SlotSizes {
    fn default() -> Self {
        Self {
            standard: Size::new(300.0, 250.0),
            alternate: Size::new(728.0, 90.0),
        }
    }
}

/// A host callback waiting to be delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Container visibility changed (or initial report).
    Container(bool),
    /// Slot visibility changed (or initial report).
    Slot(bool),
    /// A watched fill attribute changed.
    Fill(FillSignal),
    /// Several fill attributes changed in one mutation batch.
    FillBatch(Vec<FillSignal>),
    /// A timer fired.
    Timer(TimerId),
}

/// One ad request seen by the simulated network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimRequest {
    /// When the request was sent.
    pub at: HostTime,
    /// Size of the slot it was sent for.
    pub size: SizeVariant,
}

#[derive(Clone, Copy, Debug)]
struct MountedSlot {
    size: SizeVariant,
    hidden: bool,
    /// Overrides the variant's box height once the "network" has rendered.
    rendered_height: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Watch {
    threshold: f64,
    /// Last state reported, `None` until the initial report is queued.
    reported: Option<bool>,
}

/// Deterministic in-memory host.
#[derive(Debug)]
pub struct SimHost {
    now: HostTime,
    toggles: HostToggles,
    sizes: SlotSizes,
    viewport: Rect,
    container: Option<Rect>,
    slot: Option<MountedSlot>,
    container_watch: Option<Watch>,
    slot_watch: Option<Watch>,
    fill_watch: bool,
    next_timer: u64,
    timers: BTreeMap<TimerId, HostTime>,
    cancelled: usize,
    notices: VecDeque<Notice>,
    requests: Vec<SimRequest>,
    mounts: Vec<SizeVariant>,
}

impl SimHost {
    /// Creates a host at time zero with the given viewport and container.
    #[must_use]
    pub fn new(viewport: Rect, container: Rect) -> Self {
        Self {
            now: HostTime(0),
            toggles: HostToggles::default(),
            sizes: SlotSizes::default(),
            viewport,
            container: Some(container),
            slot: None,
            container_watch: None,
            slot_watch: None,
            fill_watch: false,
            next_timer: 0,
            timers: BTreeMap::new(),
            cancelled: 0,
            notices: VecDeque::new(),
            requests: Vec::new(),
            mounts: Vec::new(),
        }
    }

    /// An 800×600 viewport with the container at the top of the page.
    #[must_use]
    pub fn above_the_fold() -> Self {
        Self::new(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            Rect::new(0.0, 100.0, 800.0, 400.0),
        )
    }

    /// An 800×600 viewport with the container two screens down.
    #[must_use]
    pub fn below_the_fold() -> Self {
        Self::new(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            Rect::new(0.0, 1_200.0, 800.0, 1_500.0),
        )
    }

    /// Replaces the capability toggles.
    #[must_use]
    pub fn with_toggles(mut self, toggles: HostToggles) -> Self {
        self.toggles = toggles;
        self
    }

    /// Replaces the per-variant slot sizes.
    #[must_use]
    pub fn with_sizes(mut self, sizes: SlotSizes) -> Self {
        self.sizes = sizes;
        self
    }

    /// Removes the container from the page.
    #[must_use]
    pub fn without_container(mut self) -> Self {
        self.container = None;
        self
    }

    /// Current capability toggles.
    #[must_use]
    pub fn toggles(&self) -> HostToggles {
        self.toggles
    }

    /// Mutable access to the capability toggles.
    pub fn toggles_mut(&mut self) -> &mut HostToggles {
        &mut self.toggles
    }

    /// Current viewport rectangle in page coordinates.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Container rectangle, if the container exists.
    #[must_use]
    pub fn container(&self) -> Option<Rect> {
        self.container
    }

    /// Rectangle of the mounted slot, if any. Hidden slots have zero height.
    #[must_use]
    pub fn slot_rect(&self) -> Option<Rect> {
        let slot = self.slot?;
        let origin = self.container?.origin();
        let size = self.sizes.get(slot.size);
        let height = if slot.hidden {
            0.0
        } else {
            slot.rendered_height.unwrap_or(size.height)
        };
        Some(Rect::from_origin_size(origin, (size.width, height)))
    }

    /// Size variant of the mounted slot.
    #[must_use]
    pub fn mounted_size(&self) -> Option<SizeVariant> {
        self.slot.map(|slot| slot.size)
    }

    /// Whether the mounted slot has been hidden.
    #[must_use]
    pub fn is_slot_hidden(&self) -> bool {
        self.slot.is_some_and(|slot| slot.hidden)
    }

    /// Every size mounted so far, in order.
    #[must_use]
    pub fn mounts(&self) -> &[SizeVariant] {
        &self.mounts
    }

    /// Every request sent so far, in order.
    #[must_use]
    pub fn requests(&self) -> &[SimRequest] {
        &self.requests
    }

    /// Pending timers and their due times.
    pub fn pending_timers(&self) -> impl Iterator<Item = (TimerId, HostTime)> + '_ {
        self.timers.iter().map(|(id, due)| (*id, *due))
    }

    /// Number of timers cancelled while still pending.
    #[must_use]
    pub fn cancelled_timers(&self) -> usize {
        self.cancelled
    }

    /// Whether any observer is connected.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.container_watch.is_some() || self.slot_watch.is_some() || self.fill_watch
    }

    /// Whether the fill observer is connected.
    #[must_use]
    pub fn is_watching_fill(&self) -> bool {
        self.fill_watch
    }

    /// Whether the slot visibility observer is connected.
    #[must_use]
    pub fn is_watching_slot(&self) -> bool {
        self.slot_watch.is_some()
    }

    /// Whether the container visibility observer is connected.
    #[must_use]
    pub fn is_watching_container(&self) -> bool {
        self.container_watch.is_some()
    }

    /// Moves the viewport so its top edge is at `y`, queueing visibility
    /// changes.
    pub fn scroll_to(&mut self, y: f64) {
        let delta = Vec2::new(0.0, y - self.viewport.y0);
        self.viewport = self.viewport + delta;
        self.refresh_visibility();
    }

    /// Sets the rendered height of the mounted slot, queueing visibility
    /// changes. Ignored when nothing is mounted.
    pub fn set_slot_height(&mut self, height: f64) {
        if let Some(slot) = &mut self.slot {
            slot.rendered_height = Some(height);
            self.refresh_visibility();
        }
    }

    /// Removes the container and any slot inside it.
    pub fn remove_container(&mut self) {
        self.container = None;
        self.slot = None;
        self.refresh_visibility();
    }

    /// Queues a fill attribute change if the fill observer is connected.
    /// Returns whether the signal was queued.
    pub fn report_fill(&mut self, signal: FillSignal) -> bool {
        if self.fill_watch && self.slot.is_some() {
            self.notices.push_back(Notice::Fill(signal));
            true
        } else {
            false
        }
    }

    /// Queues several fill attribute changes as one delivery, the way a
    /// mutation observer batches records. Returns whether they were queued.
    pub fn report_fill_batch(&mut self, signals: Vec<FillSignal>) -> bool {
        if self.fill_watch && self.slot.is_some() {
            self.notices.push_back(Notice::FillBatch(signals));
            true
        } else {
            false
        }
    }

    /// Pops the next queued notice.
    pub fn next_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// Earliest pending timer, ties broken by arming order.
    #[must_use]
    pub fn next_due(&self) -> Option<(TimerId, HostTime)> {
        self.timers
            .iter()
            .min_by_key(|(id, due)| (**due, **id))
            .map(|(id, due)| (*id, *due))
    }

    /// Advances the clock to `due` and queues the timer `id`.
    ///
    /// The driver calls this for each timer in due order.
    pub fn fire(&mut self, id: TimerId) {
        if let Some(due) = self.timers.remove(&id) {
            self.now = self.now.max(due);
            self.notices.push_back(Notice::Timer(id));
        }
    }

    /// Moves the clock forward without firing anything.
    pub fn set_now(&mut self, now: HostTime) {
        self.now = self.now.max(now);
    }

    fn container_visible(&self, threshold: f64) -> bool {
        self.container.is_some_and(|rect| {
            meets_threshold(intersection_ratio(rect, self.viewport), threshold)
        })
    }

    fn slot_visible(&self, threshold: f64) -> bool {
        self.slot_rect().is_some_and(|rect| {
            !self.is_slot_hidden()
                && meets_threshold(intersection_ratio(rect, self.viewport), threshold)
        })
    }

    fn refresh_visibility(&mut self) {
        if let Some(watch) = self.container_watch {
            let visible = self.container_visible(watch.threshold);
            if watch.reported != Some(visible) {
                self.container_watch = Some(Watch {
                    reported: Some(visible),
                    ..watch
                });
                self.notices.push_back(Notice::Container(visible));
            }
        }
        if let Some(watch) = self.slot_watch {
            let visible = self.slot_visible(watch.threshold);
            if watch.reported != Some(visible) {
                self.slot_watch = Some(Watch {
                    reported: Some(visible),
                    ..watch
                });
                self.notices.push_back(Notice::Slot(visible));
            }
        }
    }
}

impl SlotHost for SimHost {
    fn now(&self) -> HostTime {
        self.now
    }

    fn has_container(&self) -> bool {
        self.container.is_some()
    }

    fn supports_intersection(&self) -> bool {
        self.toggles.intersection
    }

    fn is_cross_origin(&self) -> bool {
        self.toggles.cross_origin
    }

    fn observe_container(&mut self, threshold: f64) -> Result<(), SlotFault> {
        if self.toggles.reject_observers {
            return Err(SlotFault::ObservationUnsupported);
        }
        self.container_watch = Some(Watch {
            threshold,
            reported: None,
        });
        self.refresh_visibility();
        Ok(())
    }

    fn unobserve_container(&mut self) {
        self.container_watch = None;
    }

    fn mount_slot(&mut self, size: SizeVariant) -> Result<(), SlotFault> {
        if self.container.is_none() {
            return Err(SlotFault::MissingContainer);
        }
        self.slot = Some(MountedSlot {
            size,
            hidden: false,
            rendered_height: None,
        });
        self.mounts.push(size);
        Ok(())
    }

    fn hide_slot(&mut self) {
        if let Some(slot) = &mut self.slot {
            slot.hidden = true;
            self.refresh_visibility();
        }
    }

    fn slot_height(&self) -> Option<f64> {
        self.slot_rect().map(|rect| rect.height())
    }

    fn observe_fill(&mut self) {
        self.fill_watch = true;
    }

    fn unobserve_fill(&mut self) {
        self.fill_watch = false;
        self.notices
            .retain(|notice| !matches!(notice, Notice::Fill(_) | Notice::FillBatch(_)));
    }

    fn observe_slot(&mut self, threshold: f64) -> Result<(), SlotFault> {
        if self.toggles.reject_observers {
            return Err(SlotFault::ObservationUnsupported);
        }
        self.slot_watch = Some(Watch {
            threshold,
            reported: None,
        });
        self.refresh_visibility();
        Ok(())
    }

    fn unobserve_slot(&mut self) {
        self.slot_watch = None;
        self.notices.retain(|notice| !matches!(notice, Notice::Slot(_)));
    }

    fn send_request(&mut self) -> Result<(), SlotFault> {
        if self.toggles.reject_requests {
            return Err(SlotFault::RequestRejected);
        }
        self.requests.push(SimRequest {
            at: self.now,
            size: self.slot.map_or(SizeVariant::Standard, |slot| slot.size),
        });
        Ok(())
    }

    fn arm_timer(&mut self, delay: Duration) -> Result<TimerId, SlotFault> {
        if self.toggles.reject_timers {
            return Err(SlotFault::TimerUnavailable);
        }
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        self.timers.insert(id, self.now + delay);
        Ok(id)
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if self.timers.remove(&id).is_some() {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_report_on_observe() {
        let mut host = SimHost::below_the_fold();
        host.observe_container(0.2).unwrap();
        assert_eq!(host.next_notice(), Some(Notice::Container(false)));
        assert_eq!(host.next_notice(), None);

        host.scroll_to(1_000.0);
        assert_eq!(host.next_notice(), Some(Notice::Container(true)));
        host.scroll_to(1_050.0);
        assert_eq!(host.next_notice(), None, "no change, no report");
    }

    #[test]
    fn hidden_slot_has_zero_height() {
        let mut host = SimHost::above_the_fold();
        assert_eq!(host.slot_height(), None);
        host.mount_slot(SizeVariant::Alternate).unwrap();
        assert_eq!(host.slot_height(), Some(90.0));
        host.hide_slot();
        assert_eq!(host.slot_height(), Some(0.0));
        host.mount_slot(SizeVariant::Standard).unwrap();
        assert_eq!(host.slot_height(), Some(250.0), "remount clears hidden");
    }

    #[test]
    fn timers_fire_in_due_order() {
        let mut host = SimHost::above_the_fold();
        let late = host.arm_timer(Duration(500)).unwrap();
        let early = host.arm_timer(Duration(100)).unwrap();
        assert_eq!(host.next_due(), Some((early, HostTime(100))));
        host.cancel_timer(early);
        host.cancel_timer(early);
        assert_eq!(host.cancelled_timers(), 1);
        assert_eq!(host.next_due(), Some((late, HostTime(500))));
        host.fire(late);
        assert_eq!(host.now(), HostTime(500));
        assert_eq!(host.next_notice(), Some(Notice::Timer(late)));
    }

    #[test]
    fn fill_reports_need_an_observer() {
        let mut host = SimHost::above_the_fold();
        host.mount_slot(SizeVariant::Standard).unwrap();
        assert!(!host.report_fill(FillSignal::Filled));
        host.observe_fill();
        assert!(host.report_fill(FillSignal::Filled));
        assert!(host.report_fill_batch(vec![FillSignal::Unfilled, FillSignal::Done]));
        host.unobserve_fill();
        assert_eq!(host.next_notice(), None, "disconnect drops queued records");
    }

    #[test]
    fn rejecting_toggles_fail_the_contract_calls() {
        let mut host = SimHost::above_the_fold().with_toggles(HostToggles {
            reject_observers: true,
            reject_timers: true,
            ..HostToggles::default()
        });
        assert_eq!(
            host.observe_container(0.2),
            Err(SlotFault::ObservationUnsupported)
        );
        assert!(!host.is_watching_container());
        assert_eq!(host.arm_timer(Duration(100)), Err(SlotFault::TimerUnavailable));
        assert_eq!(host.next_due(), None);
    }
}
