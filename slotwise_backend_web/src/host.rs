// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM implementation of [`SlotHost`].
//!
//! Timers are `setTimeout` handles, visibility comes from
//! `IntersectionObserver`, and fill status from a `MutationObserver` on the
//! slot's status attributes. The JS closures the observers call are owned by
//! [`HostCallbacks`] and live as long as the host; observers are created and
//! disconnected freely without touching them.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MutationObserver, MutationObserverInit, MutationRecord, Node,
    Window,
};

use slotwise_core::backend::{SlotHost, TimerId};
use slotwise_core::fault::SlotFault;
use slotwise_core::fill::{FillSignal, WATCHED_ATTRIBUTES};
use slotwise_core::session::SizeVariant;
use slotwise_core::time::{Duration, HostTime};
use slotwise_core::visibility::meets_threshold;

use crate::units::AdUnits;

/// Global the ad network reads its request queue from.
const QUEUE_GLOBAL: &str = "adsbygoogle";

pub(crate) type EntriesClosure = Closure<dyn FnMut(Array)>;
pub(crate) type TimerClosure = Closure<dyn FnMut(JsValue)>;

/// JS entry points handed to the browser.
pub(crate) struct HostCallbacks {
    pub(crate) container: EntriesClosure,
    pub(crate) slot: EntriesClosure,
    pub(crate) fill: EntriesClosure,
    pub(crate) timer: TimerClosure,
}

/// A [`SlotHost`] backed by the browser DOM.
pub struct WebHost {
    window: Window,
    document: Document,
    container_id: String,
    units: AdUnits,
    slot: Option<HtmlElement>,
    container_observer: Option<IntersectionObserver>,
    container_threshold: f64,
    slot_observer: Option<IntersectionObserver>,
    slot_threshold: f64,
    fill_observer: Option<MutationObserver>,
    timers: BTreeMap<TimerId, i32>,
    next_timer: u64,
    callbacks: HostCallbacks,
}

impl core::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebHost")
            .field("container_id", &self.container_id)
            .field("slot", &self.slot.is_some())
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl WebHost {
    pub(crate) fn new(
        window: Window,
        document: Document,
        container_id: String,
        units: AdUnits,
        callbacks: HostCallbacks,
    ) -> Self {
        Self {
            window,
            document,
            container_id,
            units,
            slot: None,
            container_observer: None,
            container_threshold: 0.0,
            slot_observer: None,
            slot_threshold: 0.0,
            fill_observer: None,
            timers: BTreeMap::new(),
            next_timer: 0,
            callbacks,
        }
    }

    /// The ad container element, if present in the document.
    #[must_use]
    pub fn container(&self) -> Option<Element> {
        self.document.get_element_by_id(&self.container_id)
    }

    /// The currently mounted slot element.
    #[must_use]
    pub fn slot(&self) -> Option<&HtmlElement> {
        self.slot.as_ref()
    }

    /// Latest container visibility in an intersection batch.
    pub(crate) fn container_visibility(&self, entries: &Array) -> Option<bool> {
        latest_visibility(entries, self.container_threshold, |_| true)
    }

    /// Latest visibility of the current slot in an intersection batch.
    /// Entries for replaced slots are skipped.
    pub(crate) fn slot_visibility(&self, entries: &Array) -> Option<bool> {
        let slot = self.slot.as_ref()?;
        latest_visibility(entries, self.slot_threshold, |target| {
            let target: &Node = target;
            slot.is_same_node(Some(target))
        })
    }

    /// Fill signals in a mutation batch, in order. Records whose target is not
    /// the slot mounted at delivery time are skipped; the controller stops
    /// consuming the batch once it replaces that slot.
    pub(crate) fn fill_signals(&self, records: &Array) -> Vec<FillSignal> {
        let Some(slot) = self.slot.as_ref() else {
            return Vec::new();
        };
        records
            .iter()
            .filter_map(|record| {
                let record: MutationRecord = record.unchecked_into();
                let target = record.target()?;
                if !slot.is_same_node(Some(&target)) {
                    return None;
                }
                let name = record.attribute_name()?;
                let value = slot.get_attribute(&name);
                FillSignal::from_attribute(&name, value.as_deref())
            })
            .collect()
    }

    /// Forgets a timer that has fired. Returns `false` for unknown ids.
    pub(crate) fn forget_timer(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    fn intersection_observer(
        callback: &EntriesClosure,
        threshold: f64,
    ) -> Result<IntersectionObserver, JsValue> {
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
    }

    fn build_slot(&self, container: &Element, size: SizeVariant) -> Result<HtmlElement, JsValue> {
        let unit = self.units.get(size);
        let slot: HtmlElement = self.document.create_element("ins")?.unchecked_into();
        slot.set_class_name("adsbygoogle");
        slot.set_attribute("style", &unit.style())?;
        slot.set_attribute("data-ad-client", &unit.client)?;
        slot.set_attribute("data-ad-slot", &unit.slot)?;
        container.set_inner_html("");
        container.append_child(&slot)?;
        Ok(slot)
    }

    fn push_request(&self) -> Result<(), JsValue> {
        let key = JsValue::from_str(QUEUE_GLOBAL);
        let mut queue = Reflect::get(&self.window, &key)?;
        if queue.is_undefined() || queue.is_null() {
            queue = Array::new().into();
            Reflect::set(&self.window, &key, &queue)?;
        }
        let push: Function = Reflect::get(&queue, &JsValue::from_str("push"))?.dyn_into()?;
        push.call1(&queue, &Object::new())?;
        Ok(())
    }
}

fn latest_visibility(
    entries: &Array,
    threshold: f64,
    mut is_target: impl FnMut(&Element) -> bool,
) -> Option<bool> {
    entries
        .iter()
        .rev()
        .map(|value| value.unchecked_into::<IntersectionObserverEntry>())
        .find(|entry| is_target(&entry.target()))
        .map(|entry| {
            entry.is_intersecting() && meets_threshold(entry.intersection_ratio(), threshold)
        })
}

impl SlotHost for WebHost {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn has_container(&self) -> bool {
        self.container().is_some()
    }

    fn supports_intersection(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }

    fn is_cross_origin(&self) -> bool {
        match self.window.parent() {
            Ok(Some(parent)) => parent.location().href().is_err(),
            _ => false,
        }
    }

    fn observe_container(&mut self, threshold: f64) -> Result<(), SlotFault> {
        self.unobserve_container();
        let container = self.container().ok_or(SlotFault::MissingContainer)?;
        let observer = Self::intersection_observer(&self.callbacks.container, threshold)
            .map_err(|_| SlotFault::ObservationUnsupported)?;
        observer.observe(&container);
        self.container_threshold = threshold;
        self.container_observer = Some(observer);
        Ok(())
    }

    fn unobserve_container(&mut self) {
        if let Some(observer) = self.container_observer.take() {
            observer.disconnect();
        }
    }

    fn mount_slot(&mut self, size: SizeVariant) -> Result<(), SlotFault> {
        let container = self.container().ok_or(SlotFault::MissingContainer)?;
        self.slot = None;
        let slot = self
            .build_slot(&container, size)
            .map_err(|_| SlotFault::MissingSlot)?;
        self.slot = Some(slot);
        Ok(())
    }

    fn hide_slot(&mut self) {
        if let Some(slot) = &self.slot {
            let _ = slot.style().set_property("display", "none");
        }
    }

    fn slot_height(&self) -> Option<f64> {
        self.slot.as_ref().map(|slot| f64::from(slot.client_height()))
    }

    fn observe_fill(&mut self) {
        self.unobserve_fill();
        let Some(slot) = &self.slot else {
            return;
        };
        let Ok(observer) = MutationObserver::new(self.callbacks.fill.as_ref().unchecked_ref())
        else {
            return;
        };
        let init = MutationObserverInit::new();
        init.set_attributes(true);
        let filter: Array = WATCHED_ATTRIBUTES
            .iter()
            .map(|name| JsValue::from_str(name))
            .collect();
        init.set_attribute_filter(&filter);
        if observer.observe_with_options(slot, &init).is_ok() {
            self.fill_observer = Some(observer);
        }
    }

    fn unobserve_fill(&mut self) {
        if let Some(observer) = self.fill_observer.take() {
            observer.disconnect();
        }
    }

    fn observe_slot(&mut self, threshold: f64) -> Result<(), SlotFault> {
        self.unobserve_slot();
        let slot = self.slot.as_ref().ok_or(SlotFault::MissingSlot)?;
        let observer = Self::intersection_observer(&self.callbacks.slot, threshold)
            .map_err(|_| SlotFault::ObservationUnsupported)?;
        observer.observe(slot);
        self.slot_threshold = threshold;
        self.slot_observer = Some(observer);
        Ok(())
    }

    fn unobserve_slot(&mut self) {
        if let Some(observer) = self.slot_observer.take() {
            observer.disconnect();
        }
    }

    fn send_request(&mut self) -> Result<(), SlotFault> {
        self.push_request().map_err(|_| SlotFault::RequestRejected)
    }

    fn arm_timer(&mut self, delay: Duration) -> Result<TimerId, SlotFault> {
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        let timeout = i32::try_from(delay.millis()).unwrap_or(i32::MAX);
        let arg = JsValue::from_f64(id.0 as f64);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_1(
                self.callbacks.timer.as_ref().unchecked_ref(),
                timeout,
                &arg,
            )
            .map_err(|_| SlotFault::TimerUnavailable)?;
        self.timers.insert(id, handle);
        Ok(id)
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

/// Decodes the argument a timer callback receives back into its id.
pub(crate) fn timer_id_from_arg(arg: &JsValue) -> Option<TimerId> {
    let value = arg.as_f64()?;
    if !(value.is_finite() && value >= 1.0) {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "checked positive and finite; ids are small integers"
    )]
    let id = value as u64;
    Some(TimerId(id))
}
