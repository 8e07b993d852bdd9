// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser-driven rotation handle.
//!
//! [`WebRotation`] keeps a [`RotationController`] and its [`WebHost`] in one
//! `Rc<RefCell<_>>`. The JS closures registered with the browser hold only a
//! `Weak` reference, so dropping the handle releases everything once the
//! pending callbacks are cancelled.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;

use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use slotwise_core::config::RotationConfig;
use slotwise_core::controller::{Phase, RotationController};
use slotwise_core::trace::TraceSink;

use crate::host::{HostCallbacks, WebHost, timer_id_from_arg};
use crate::units::AdUnits;

struct Shared {
    controller: RotationController,
    host: WebHost,
}

type SharedCell = RefCell<Shared>;

/// Runs `f` against the live controller and host, if the rotation still
/// exists and is not already borrowed.
fn with_shared(weak: &Weak<SharedCell>, f: impl FnOnce(&mut RotationController, &mut WebHost)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut guard) = shared.try_borrow_mut() else {
        return;
    };
    let Shared { controller, host } = &mut *guard;
    f(controller, host);
}

fn callbacks(weak: &Weak<SharedCell>) -> HostCallbacks {
    let container_weak = weak.clone();
    let container = Closure::wrap(Box::new(move |entries: Array| {
        with_shared(&container_weak, |controller, host| {
            if let Some(visible) = host.container_visibility(&entries) {
                controller.on_container_visibility(host, visible);
            }
        });
    }) as Box<dyn FnMut(Array)>);

    let slot_weak = weak.clone();
    let slot = Closure::wrap(Box::new(move |entries: Array| {
        with_shared(&slot_weak, |controller, host| {
            if let Some(visible) = host.slot_visibility(&entries) {
                controller.on_slot_visibility(host, visible);
            }
        });
    }) as Box<dyn FnMut(Array)>);

    let fill_weak = weak.clone();
    let fill = Closure::wrap(Box::new(move |records: Array| {
        with_shared(&fill_weak, |controller, host| {
            let signals = host.fill_signals(&records);
            controller.on_fill_batch(host, signals);
        });
    }) as Box<dyn FnMut(Array)>);

    let timer_weak = weak.clone();
    let timer = Closure::wrap(Box::new(move |arg: JsValue| {
        let Some(id) = timer_id_from_arg(&arg) else {
            return;
        };
        with_shared(&timer_weak, |controller, host| {
            if host.forget_timer(id) {
                controller.on_timer(host, id);
            }
        });
    }) as Box<dyn FnMut(JsValue)>);

    HostCallbacks {
        container,
        slot,
        fill,
        timer,
    }
}

/// Ad rotation for one container element.
///
/// Create with [`WebRotation::new`], then call [`start`](Self::start). The
/// rotation runs until [`stop`](Self::stop) is called or the handle is
/// dropped.
pub struct WebRotation {
    shared: Rc<SharedCell>,
}

impl WebRotation {
    /// Creates a stopped rotation for the element with id `container_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no global `window` or `document`.
    pub fn new(
        container_id: impl Into<String>,
        units: AdUnits,
        config: RotationConfig,
    ) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let container_id = container_id.into();
        let shared = Rc::new_cyclic(|weak| {
            RefCell::new(Shared {
                controller: RotationController::new(config),
                host: WebHost::new(window, document, container_id, units, callbacks(weak)),
            })
        });
        Ok(Self { shared })
    }

    /// Routes controller trace events to `sink`.
    #[must_use]
    pub fn with_sink(self, sink: Box<dyn TraceSink>) -> Self {
        self.shared.borrow_mut().controller.set_sink(sink);
        self
    }

    /// Starts rotation. A no-op while already running.
    pub fn start(&self) {
        let mut guard = self.shared.borrow_mut();
        let Shared { controller, host } = &mut *guard;
        controller.start(host);
    }

    /// Stops rotation, cancelling timers and disconnecting observers.
    pub fn stop(&self) {
        let mut guard = self.shared.borrow_mut();
        let Shared { controller, host } = &mut *guard;
        controller.stop(host);
    }

    /// Current controller phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.borrow().controller.phase()
    }

    /// Whether the session is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared.borrow().controller.session().is_active()
    }
}

impl Drop for WebRotation {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.shared.try_borrow_mut() {
            let Shared { controller, host } = &mut *guard;
            controller.stop(host);
        }
    }
}

impl core::fmt::Debug for WebRotation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.shared.try_borrow() {
            Ok(shared) => f
                .debug_struct("WebRotation")
                .field("phase", &shared.controller.phase())
                .field("host", &shared.host)
                .finish(),
            Err(_) => f.debug_struct("WebRotation").finish_non_exhaustive(),
        }
    }
}
