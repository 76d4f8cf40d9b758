//! DOM rendering of the game view.
//!
//! Reuses elements already on the page by id and creates the missing ones,
//! so a bare `<body>` is enough to play.

use super::timers::defer;
use crate::config::GameRules;
use crate::content::Symbol;
use crate::machine::Command;
use crate::records::Settings;
use crate::surface::{Action, Flash, Prompt, Scoreboard, StatusTone, Surface};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement};

const ACTION_BUTTONS: [(Action, &str, &str); 4] = [
    (Action::Replay, "replay-btn", "🔁 Replay"),
    (Action::Next, "next-btn", "Next ▶"),
    (Action::Retry, "retry-btn", "Try again"),
    (Action::Restart, "restart-btn", "Restart"),
];

const FLASH_MS: f64 = 200.0;
const RESULT_FLASH_MS: f64 = 600.0;
const TOAST_MS: f64 = 2200.0;

pub struct DomSurface {
    doc: Document,
    keys: Element,
    key_buttons: Vec<Element>,
    status: Element,
    prompt: Element,
    toast: Element,
    toast_seq: Rc<Cell<u32>>,
    unlock: Element,
    actions: Vec<(Action, Element)>,
    level: Option<Element>,
    score: Option<Element>,
    best: Option<Element>,
    daily: Option<Element>,
    combo: Option<Element>,
    question: Option<Element>,
    haptics_toggle: Option<HtmlInputElement>,
    sound_toggle: Option<HtmlInputElement>,
    cue_ms: f64,
}

impl DomSurface {
    /// Find or build the view and wire every control to [`super::dispatch`].
    pub fn attach(doc: &Document, rules: &GameRules) -> Result<Self, JsValue> {
        let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
        let container = ensure(doc, &body, "game-container", "div")?;
        let unlock = ensure(doc, &container, "audio-unlock", "button")?;
        if unlock.text_content().unwrap_or_default().is_empty() {
            unlock.set_text_content(Some(&format!("▶ Start {}", rules.title)));
        }
        on_click(&unlock, Command::Start)?;

        let status = ensure(doc, &container, "status-message", "div")?;
        let prompt = ensure(doc, &container, "prompt", "div")?;
        let keys = ensure(doc, &container, "keys-container", "div")?;
        on_key_row(&keys)?;
        let action_row = ensure(doc, &container, "action-buttons", "div")?;
        let mut actions = Vec::with_capacity(ACTION_BUTTONS.len());
        for (action, id, label) in ACTION_BUTTONS {
            let button = ensure(doc, &action_row, id, "button")?;
            if button.text_content().unwrap_or_default().is_empty() {
                button.set_text_content(Some(label));
            }
            let command = match action {
                Action::Replay => Command::Replay,
                Action::Next => Command::Next,
                Action::Retry => Command::Retry,
                Action::Restart => Command::Restart,
            };
            on_click(&button, command)?;
            actions.push((action, button));
        }
        let toast = ensure(doc, &body, "toast", "div")?;

        if rules.modes.len() > 1 {
            for &mode in rules.modes {
                if let Some(button) = doc.get_element_by_id(&format!("mode-{}", mode.as_str())) {
                    on_click(&button, Command::SetMode(mode))?;
                }
            }
        }

        let haptics_toggle = toggle(doc, "vibration-toggle", Command::SetHaptics)?;
        let sound_toggle = toggle(doc, "sound-toggle", Command::SetSound)?;

        Ok(Self {
            doc: doc.clone(),
            keys,
            key_buttons: Vec::new(),
            status,
            prompt,
            toast,
            toast_seq: Rc::new(Cell::new(0)),
            unlock,
            actions,
            level: doc.get_element_by_id("level-display"),
            score: doc.get_element_by_id("score-display"),
            best: doc.get_element_by_id("best-display"),
            daily: doc.get_element_by_id("daily-display"),
            combo: doc.get_element_by_id("combo-display"),
            question: doc.get_element_by_id("question-display"),
            haptics_toggle,
            sound_toggle,
            cue_ms: rules.timing.note_s * 1000.0,
        })
    }
}

fn ensure(doc: &Document, parent: &Element, id: &str, tag: &str) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let el = doc.create_element(tag)?;
    el.set_id(id);
    parent.append_child(&el)?;
    Ok(el)
}

/// Listeners survive a remount; bind each element once.
fn claim(el: &Element) -> bool {
    if el.has_attribute("data-bound") {
        return false;
    }
    let _ = el.set_attribute("data-bound", "");
    true
}

fn on_click(target: &Element, command: Command) -> Result<(), JsValue> {
    if !claim(target) {
        return Ok(());
    }
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        super::dispatch(command);
    }) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// One listener for the whole key row; buttons carry their index in `data-index`.
fn on_key_row(row: &Element) -> Result<(), JsValue> {
    if !claim(row) {
        return Ok(());
    }
    let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
        let index = evt
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("[data-index]").ok().flatten())
            .and_then(|button| button.get_attribute("data-index"))
            .and_then(|raw| raw.parse::<usize>().ok());
        if let Some(index) = index {
            super::dispatch(Command::Select(index));
        }
    }) as Box<dyn FnMut(_)>);
    row.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn toggle(doc: &Document, id: &str, command: fn(bool) -> Command) -> Result<Option<HtmlInputElement>, JsValue> {
    let Some(el) = doc.get_element_by_id(id) else {
        return Ok(None);
    };
    let input: HtmlInputElement = el.dyn_into()?;
    if !claim(&input) {
        return Ok(Some(input));
    }
    let source = input.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        super::dispatch(command(source.checked()));
    }) as Box<dyn FnMut(_)>);
    input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(Some(input))
}

fn set_class(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

fn set_text(el: &Option<Element>, text: &str) {
    if let Some(el) = el {
        el.set_text_content(Some(text));
    }
}

/// Add `class` now and drop it after `ms`.
fn pulse_class(el: &Element, class: &'static str, ms: f64) {
    set_class(el, class, true);
    let el = el.clone();
    defer(ms, move || set_class(&el, class, false));
}

impl Surface for DomSurface {
    fn show_unlock(&mut self, visible: bool) {
        set_class(&self.unlock, "hidden", !visible);
    }

    fn render_symbols(&mut self, symbols: &'static [Symbol]) {
        self.keys.set_inner_html("");
        self.key_buttons.clear();
        for (index, symbol) in symbols.iter().enumerate() {
            let Ok(button) = self.doc.create_element("button") else {
                continue;
            };
            button.set_class_name("key-btn");
            button.set_text_content(Some(symbol.label));
            let _ = button.set_attribute("data-index", &index.to_string());
            if self.keys.append_child(&button).is_err() {
                continue;
            }
            self.key_buttons.push(button);
        }
        self.keys
            .set_class_name(&format!("keys-container keys-{}", symbols.len()));
    }

    fn set_symbols_enabled(&mut self, enabled: bool) {
        for button in &self.key_buttons {
            if let Some(button) = button.dyn_ref::<HtmlButtonElement>() {
                button.set_disabled(!enabled);
            }
        }
        set_class(&self.keys, "disabled", !enabled);
    }

    fn flash(&mut self, index: usize, flash: Flash) {
        let Some(button) = self.key_buttons.get(index) else {
            return;
        };
        match flash {
            Flash::Press => pulse_class(button, "pressed", FLASH_MS),
            Flash::Correct => pulse_class(button, "correct", RESULT_FLASH_MS),
            Flash::Wrong => pulse_class(button, "wrong", RESULT_FLASH_MS),
        }
    }

    fn cue(&mut self, _step: usize, index: Option<usize>) {
        match index.and_then(|i| self.key_buttons.get(i)) {
            Some(button) => pulse_class(button, "playing", self.cue_ms),
            None => pulse_class(&self.prompt, "pulse", self.cue_ms),
        }
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        self.status.set_text_content(Some(text));
        let class = match tone {
            StatusTone::Plain => "",
            StatusTone::Pulse => " pulse",
            StatusTone::Success => " success",
            StatusTone::Error => " error",
        };
        self.status.set_class_name(&format!("status-message{}", class));
    }

    fn set_scoreboard(&mut self, board: &Scoreboard) {
        set_text(&self.level, &board.level.to_string());
        set_text(&self.score, &board.score.to_string());
        set_text(&self.best, &board.best.to_string());
        set_text(&self.daily, &board.daily_best.to_string());
        set_text(&self.combo, &board.combo.to_string());
        if let Some((question, of)) = board.question {
            set_text(&self.question, &format!("{}/{}", question, of));
        }
    }

    fn show_actions(&mut self, actions: &[Action]) {
        for (action, button) in &self.actions {
            set_class(button, "hidden", !actions.contains(action));
        }
    }

    fn show_prompt(&mut self, prompt: &Prompt) {
        let _ = self.prompt.remove_attribute("data-staff-position");
        let _ = self.prompt.remove_attribute("data-sharp");
        match prompt {
            Prompt::Listen => self.prompt.set_text_content(Some("🎧")),
            Prompt::Staff(staff) => {
                // the page draws the staff from these
                self.prompt.set_text_content(None);
                let _ = self
                    .prompt
                    .set_attribute("data-staff-position", &staff.position.to_string());
                let _ = self
                    .prompt
                    .set_attribute("data-sharp", if staff.sharp { "true" } else { "false" });
            }
            Prompt::Name(label) => self.prompt.set_text_content(Some(*label)),
            Prompt::Hidden => self.prompt.set_text_content(None),
        }
    }

    fn toast(&mut self, message: &str) {
        let seq = self.toast_seq.get().wrapping_add(1);
        self.toast_seq.set(seq);
        self.toast.set_text_content(Some(message));
        set_class(&self.toast, "show", true);
        let (toast, latest) = (self.toast.clone(), self.toast_seq.clone());
        defer(TOAST_MS, move || {
            if latest.get() == seq {
                set_class(&toast, "show", false);
            }
        });
    }

    fn set_settings(&mut self, settings: &Settings) {
        if let Some(input) = &self.haptics_toggle {
            input.set_checked(settings.haptics);
        }
        if let Some(input) = &self.sound_toggle {
            input.set_checked(settings.sound);
        }
    }
}
