//! `setTimeout`-backed timers.

use super::log;
use crate::scheduler::{TimerEvent, TimerId, Timers};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Performance, Window, window};

/// Pending events keyed by slot. The slot doubles as the [`TimerId`].
type Pending = Rc<RefCell<HashMap<i32, (i32, TimerEvent)>>>;

/// Every timeout calls back into one shared closure with its slot number, so
/// cancelled timeouts leave nothing behind.
pub struct WindowTimers {
    window: Window,
    performance: Option<Performance>,
    pending: Pending,
    next_slot: i32,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl WindowTimers {
    pub fn new(window: Window) -> Self {
        let performance = window.performance();
        let pending: Pending = Rc::new(RefCell::new(HashMap::new()));
        let slots = pending.clone();
        let callback = Closure::wrap(Box::new(move |slot: JsValue| {
            let Some(slot) = slot.as_f64() else {
                return;
            };
            let event = slots.borrow_mut().remove(&(slot as i32)).map(|(_, event)| event);
            if let Some(event) = event {
                super::fire(event);
            }
        }) as Box<dyn FnMut(JsValue)>);
        Self {
            window,
            performance,
            pending,
            next_slot: 0,
            callback,
        }
    }

    /// Timeouts scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Timers for WindowTimers {
    fn now_ms(&self) -> f64 {
        self.performance
            .as_ref()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn schedule(&mut self, delay_ms: f64, event: TimerEvent) -> TimerId {
        let slot = self.next_slot;
        self.next_slot = self.next_slot.wrapping_add(1) & i32::MAX;
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_1(
            self.callback.as_ref().unchecked_ref(),
            delay_ms.max(0.0).round() as i32,
            &JsValue::from(slot),
        ) {
            Ok(handle) => {
                self.pending.borrow_mut().insert(slot, (handle, event));
                TimerId(slot)
            }
            Err(err) => {
                log!("setTimeout failed: {:?}", err);
                TimerId(-1)
            }
        }
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some((handle, _)) = self.pending.borrow_mut().remove(&id.0) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for WindowTimers {
    fn drop(&mut self) {
        let pending = self.pending();
        if pending > 0 {
            tracing::debug!(pending, "clearing timeouts of a replaced engine");
        }
        for (_, (handle, _)) in self.pending.borrow_mut().drain() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

/// Fire-and-forget view housekeeping (class removal and the like). Never
/// touches the engine.
pub(crate) fn defer(delay_ms: f64, f: impl FnOnce() + 'static) {
    let Some(win) = window() else {
        return;
    };
    let callback = Closure::once_into_js(f);
    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms.max(0.0) as i32);
}
