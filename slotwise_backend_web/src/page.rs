// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-page wiring for a framed game page.
//!
//! [`install`] does everything the page script needs on load:
//!
//! 1. Posts a `started` loading message to the parent frame.
//! 2. Starts rotation unless the [`ReferrerPolicy`] rejects the referrer.
//! 3. On `DOMContentLoaded`, posts `complete` and watches the loading screen.
//!    Once the loading screen is hidden, rotation stops and the ad container
//!    is removed.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Event, HtmlElement, MutationObserver, MutationObserverInit,
    Window, console,
};

use slotwise_core::config::RotationConfig;
use slotwise_core::notify::{LoadingMessage, LoadingStatus, TARGET_ORIGIN};
use slotwise_core::policy::ReferrerPolicy;

use crate::rotation::WebRotation;
use crate::units::AdUnits;

/// Element ids and policies for [`install`].
#[derive(Clone, Debug)]
pub struct PageConfig {
    /// Id of the element ads are mounted in.
    pub container_id: String,
    /// Id of the loading screen whose `hidden` attribute ends rotation.
    pub loading_screen_id: String,
    /// Units rotated between.
    pub units: AdUnits,
    /// Controller configuration.
    pub rotation: RotationConfig,
    /// Referrer gate.
    pub policy: ReferrerPolicy,
    /// Route controller trace events to the browser console.
    pub console_trace: bool,
}

impl PageConfig {
    /// Default ids (`ads-container`, `loading`), standard rotation, and a
    /// policy that only rejects empty referrers.
    #[must_use]
    pub fn new(units: AdUnits) -> Self {
        Self {
            container_id: String::from("ads-container"),
            loading_screen_id: String::from("loading"),
            units,
            rotation: RotationConfig::standard(),
            policy: ReferrerPolicy::default(),
            console_trace: false,
        }
    }
}

/// Posts a loading-status message to the parent frame.
///
/// Fire-and-forget: failures are logged to the console.
pub fn notify_loading(window: &Window, status: LoadingStatus) {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Date.now() is a positive integral f64 well inside u64"
    )]
    let timestamp_ms = js_sys::Date::now() as u64;
    let message = LoadingMessage::new(status, timestamp_ms);
    if let Err(err) = post_loading(window, &message) {
        console::error_2(&JsValue::from_str("[slotwise] loading message failed:"), &err);
    }
}

fn post_loading(window: &Window, message: &LoadingMessage) -> Result<(), JsValue> {
    let payload = Object::new();
    for (key, value) in message.fields() {
        Reflect::set(&payload, &JsValue::from_str(key), &JsValue::from_str(value))?;
    }
    let timestamp = JsValue::from_f64(message.timestamp_ms as f64);
    Reflect::set(&payload, &JsValue::from_str("timestamp"), &timestamp)?;
    let parent = window.parent()?.unwrap_or_else(|| window.clone());
    parent.post_message(&payload, TARGET_ORIGIN)
}

/// Installs the page script: loading notifications, referrer gate, rotation,
/// and loading-screen teardown.
///
/// Page-lifetime state is leaked; there is no uninstall.
///
/// # Errors
///
/// Returns an error when there is no `window`/`document` or a listener could
/// not be registered.
pub fn install(config: PageConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    notify_loading(&window, LoadingStatus::Started);

    let rotation = if config.policy.allows(&document.referrer()) {
        let mut rotation = WebRotation::new(
            config.container_id.clone(),
            config.units.clone(),
            config.rotation,
        )?;
        if config.console_trace {
            rotation = rotation.with_sink(Box::new(crate::ConsoleSink));
        }
        rotation.start();
        Some(rotation)
    } else {
        console::log_1(&JsValue::from_str("[slotwise] ads disabled for this referrer"));
        None
    };
    let rotation = Rc::new(RefCell::new(rotation));

    if document.ready_state() == "loading" {
        let ready_window = window.clone();
        let ready_document = document.clone();
        let ready_rotation = Rc::clone(&rotation);
        let ready_config = config.clone();
        let on_ready = Closure::once(move |_event: Event| {
            on_content_loaded(&ready_window, &ready_document, &ready_config, ready_rotation);
        });
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
        on_ready.forget();
    } else {
        on_content_loaded(&window, &document, &config, Rc::clone(&rotation));
    }

    core::mem::forget(rotation);
    Ok(())
}

fn on_content_loaded(
    window: &Window,
    document: &Document,
    config: &PageConfig,
    rotation: Rc<RefCell<Option<WebRotation>>>,
) {
    notify_loading(window, LoadingStatus::Complete);
    if let Err(err) = watch_loading_screen(document, config, rotation) {
        console::error_2(&JsValue::from_str("[slotwise] loading screen watch failed:"), &err);
    }
}

fn watch_loading_screen(
    document: &Document,
    config: &PageConfig,
    rotation: Rc<RefCell<Option<WebRotation>>>,
) -> Result<(), JsValue> {
    let (Some(loading), Some(_)) = (
        document.get_element_by_id(&config.loading_screen_id),
        document.get_element_by_id(&config.container_id),
    ) else {
        return Ok(());
    };
    let loading: HtmlElement = loading.dyn_into()?;

    let screen = loading.clone();
    let teardown_document = document.clone();
    let container_id = config.container_id.clone();
    let on_change = Closure::wrap(Box::new(move |_records: Array, observer: MutationObserver| {
        if !screen.hidden() {
            return;
        }
        if let Some(rotation) = rotation.borrow_mut().take() {
            rotation.stop();
        }
        if let Some(container) = teardown_document.get_element_by_id(&container_id) {
            container.remove();
        }
        observer.disconnect();
    }) as Box<dyn FnMut(Array, MutationObserver)>);

    let observer = MutationObserver::new(on_change.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_attributes(true);
    init.set_attribute_filter(&Array::of1(&JsValue::from_str("hidden")));
    observer.observe_with_options(&loading, &init)?;
    on_change.forget();
    Ok(())
}
