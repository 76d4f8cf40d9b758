use crate::haptics::Haptics;
use wasm_bindgen::JsValue;
use web_sys::{Navigator, Window};

/// `navigator.vibrate`, when the browser has it.
pub struct NavigatorHaptics {
    navigator: Option<Navigator>,
}

impl NavigatorHaptics {
    pub fn new(window: &Window) -> Self {
        let navigator = window.navigator();
        let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("vibrate")).unwrap_or(false);
        Self {
            navigator: supported.then_some(navigator),
        }
    }
}

impl Haptics for NavigatorHaptics {
    fn vibrate(&mut self, pattern: &[u32]) {
        if let Some(navigator) = &self.navigator {
            let pattern: js_sys::Array = pattern.iter().map(|ms| JsValue::from(*ms)).collect();
            let _ = navigator.vibrate_with_pattern(&pattern);
        }
    }
}
