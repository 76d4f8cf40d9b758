//! Browser bindings: mounts an [`Engine`] into the current document and feeds
//! it DOM events and fired timers.

mod audio;
mod dom;
mod haptics;
mod storage;
mod timers;

pub use audio::WebAudio;
pub use dom::DomSurface;
pub use haptics::NavigatorHaptics;
pub use storage::LocalStorageStore;
pub use timers::WindowTimers;

use crate::clock::LocalDayClock;
use crate::config::GameRules;
use crate::keys::command_for;
use crate::machine::{Command, Engine, Ports};
use crate::scheduler::TimerEvent;
use crate::store::{KeyValueStore, MemoryStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::{Cell, RefCell};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::web::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

thread_local! {
    static ENGINE: RefCell<Option<Engine>> = const { RefCell::new(None) };
    static KEYS_BOUND: Cell<bool> = const { Cell::new(false) };
}

/// Mount EchoKeys. `config_json` optionally overrides `timing` / `scoring`.
#[wasm_bindgen]
pub fn start_echokeys(config_json: Option<String>) -> Result<(), JsValue> {
    mount(GameRules::echokeys(), config_json.as_deref())
}

/// Mount ScaleTrainer. `config_json` optionally overrides `timing` / `scoring`.
#[wasm_bindgen]
pub fn start_scale_trainer(config_json: Option<String>) -> Result<(), JsValue> {
    mount(GameRules::scale_trainer(), config_json.as_deref())
}

fn mount(rules: GameRules, config_json: Option<&str>) -> Result<(), JsValue> {
    let rules = match config_json {
        Some(json) => rules
            .with_overrides(json)
            .map_err(|err| JsValue::from_str(&err.to_string()))?,
        None => rules,
    };
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let surface = DomSurface::attach(&doc, &rules)?;
    let store: Box<dyn KeyValueStore> = match LocalStorageStore::open(&win) {
        Ok(store) => Box::new(store),
        Err(err) => {
            log!("{}; records kept for this session only", err);
            Box::new(MemoryStore::new())
        }
    };
    let ports = Ports {
        store,
        clock: Box::new(LocalDayClock),
        audio: Box::new(WebAudio::new(rules.timing.master_volume)),
        haptics: Box::new(NavigatorHaptics::new(&win)),
        timers: Box::new(WindowTimers::new(win.clone())),
        surface: Box::new(surface),
        rng: Box::new(StdRng::from_entropy()),
    };
    let title = rules.title;
    let mut engine = Engine::new(rules, ports);
    engine.boot();
    if let Some(mut previous) = ENGINE.with(|cell| cell.replace(Some(engine))) {
        previous.halt();
    }

    if !KEYS_BOUND.with(|bound| bound.replace(true)) {
        bind_keys(&doc)?;
    }
    log!("{} mounted", title);
    Ok(())
}

fn bind_keys(doc: &web_sys::Document) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        if evt.repeat() || evt.ctrl_key() || evt.meta_key() || evt.alt_key() {
            return;
        }
        let command = ENGINE.with(|cell| {
            cell.borrow()
                .as_ref()
                .and_then(|engine| command_for(&evt.key(), engine.phase(), engine.run().tier.symbol_count()))
        });
        if let Some(command) = command {
            evt.prevent_default();
            dispatch(command);
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub(crate) fn dispatch(command: Command) {
    ENGINE.with(|cell| {
        if let Some(engine) = cell.borrow_mut().as_mut() {
            engine.dispatch(command);
        }
    });
}

pub(crate) fn fire(event: TimerEvent) {
    ENGINE.with(|cell| {
        if let Some(engine) = cell.borrow_mut().as_mut() {
            engine.on_timer(event);
        }
    });
}
