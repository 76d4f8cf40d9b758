// Shared harness for the native integration tests: recording ports and a
// driver that fires `VirtualTimers` into the engine.
#![allow(dead_code)]

use chrono::NaiveDate;
use noteloop::content::{Staff, Symbol};
use noteloop::{
    Action, AudioError, AudioOut, Command, Engine, FixedDayClock, Flash, GameRules, Haptics, MemoryStore, Phase,
    Ports, Prompt, Scoreboard, Settings, SilentAudio, StatusTone, Surface, Timers, Tone, VirtualTimers,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

/// Collects formatted `tracing` output while a closure runs.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.text().lines().filter(|l| l.contains(needle)).map(str::to_string).collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct View {
    pub unlock_visible: bool,
    pub symbols: Vec<&'static str>,
    pub renders: usize,
    pub enabled: bool,
    pub flashes: Vec<(usize, Flash)>,
    pub cues: Vec<(usize, Option<usize>)>,
    pub status: String,
    pub tone: Option<StatusTone>,
    pub board: Scoreboard,
    pub actions: Vec<Action>,
    pub prompts: Vec<Prompt>,
    pub toasts: Vec<String>,
    pub settings: Option<Settings>,
}

pub struct RecordingSurface(pub Rc<RefCell<View>>);

impl Surface for RecordingSurface {
    fn show_unlock(&mut self, visible: bool) {
        self.0.borrow_mut().unlock_visible = visible;
    }

    fn render_symbols(&mut self, symbols: &'static [Symbol]) {
        let mut view = self.0.borrow_mut();
        view.symbols = symbols.iter().map(|s| s.label).collect();
        view.renders += 1;
    }

    fn set_symbols_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().enabled = enabled;
    }

    fn flash(&mut self, index: usize, flash: Flash) {
        self.0.borrow_mut().flashes.push((index, flash));
    }

    fn cue(&mut self, step: usize, index: Option<usize>) {
        self.0.borrow_mut().cues.push((step, index));
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        let mut view = self.0.borrow_mut();
        view.status = text.to_string();
        view.tone = Some(tone);
    }

    fn set_scoreboard(&mut self, board: &Scoreboard) {
        self.0.borrow_mut().board = *board;
    }

    fn show_actions(&mut self, actions: &[Action]) {
        self.0.borrow_mut().actions = actions.to_vec();
    }

    fn show_prompt(&mut self, prompt: &Prompt) {
        self.0.borrow_mut().prompts.push(*prompt);
    }

    fn toast(&mut self, message: &str) {
        self.0.borrow_mut().toasts.push(message.to_string());
    }

    fn set_settings(&mut self, settings: &Settings) {
        self.0.borrow_mut().settings = Some(*settings);
    }
}

/// Audio whose clock is moved by the driver.
pub struct RecordingAudio {
    pub time: Rc<Cell<f64>>,
    pub tones: Rc<RefCell<Vec<Tone>>>,
    unlocked: bool,
}

impl AudioOut for RecordingAudio {
    fn unlock(&mut self) -> Result<(), AudioError> {
        self.unlocked = true;
        Ok(())
    }

    fn current_time(&self) -> Option<f64> {
        self.unlocked.then(|| self.time.get())
    }

    fn play_tone(&mut self, tone: &Tone) -> Result<(), AudioError> {
        if !self.unlocked {
            return Err(AudioError::Unavailable);
        }
        self.tones.borrow_mut().push(*tone);
        Ok(())
    }
}

pub struct RecordingHaptics(pub Rc<RefCell<Vec<Vec<u32>>>>);

impl Haptics for RecordingHaptics {
    fn vibrate(&mut self, pattern: &[u32]) {
        self.0.borrow_mut().push(pattern.to_vec());
    }
}

pub struct Game {
    pub engine: Engine,
    pub timers: VirtualTimers,
    pub store: MemoryStore,
    pub clock: FixedDayClock,
    pub view: Rc<RefCell<View>>,
    pub tones: Rc<RefCell<Vec<Tone>>>,
    pub vibrations: Rc<RefCell<Vec<Vec<u32>>>>,
    audio_time: Rc<Cell<f64>>,
}

pub struct Setup {
    pub rules: GameRules,
    pub store: MemoryStore,
    pub clock: FixedDayClock,
    pub audio: bool,
    pub seed: u64,
}

impl Setup {
    pub fn new(rules: GameRules) -> Self {
        Self {
            rules,
            store: MemoryStore::new(),
            clock: FixedDayClock::new(today()),
            audio: true,
            seed: 7,
        }
    }

    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn clock(mut self, clock: FixedDayClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn without_audio(mut self) -> Self {
        self.audio = false;
        self
    }

    pub fn build(self) -> Game {
        let timers = VirtualTimers::new();
        let view = Rc::new(RefCell::new(View::default()));
        let tones = Rc::new(RefCell::new(Vec::new()));
        let vibrations = Rc::new(RefCell::new(Vec::new()));
        let audio_time = Rc::new(Cell::new(0.0));
        let audio: Box<dyn AudioOut> = if self.audio {
            Box::new(RecordingAudio {
                time: audio_time.clone(),
                tones: tones.clone(),
                unlocked: false,
            })
        } else {
            Box::new(SilentAudio)
        };
        let ports = Ports {
            store: Box::new(self.store.clone()),
            clock: Box::new(self.clock.clone()),
            audio,
            haptics: Box::new(RecordingHaptics(vibrations.clone())),
            timers: Box::new(timers.clone()),
            surface: Box::new(RecordingSurface(view.clone())),
            rng: Box::new(StdRng::seed_from_u64(self.seed)),
        };
        let mut engine = Engine::new(self.rules, ports);
        engine.boot();
        Game {
            engine,
            timers,
            store: self.store,
            clock: self.clock,
            view,
            tones,
            vibrations,
            audio_time,
        }
    }
}

impl Game {
    pub fn echokeys() -> Self {
        Setup::new(GameRules::echokeys()).build()
    }

    pub fn scale_trainer() -> Self {
        Setup::new(GameRules::scale_trainer()).build()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn send(&mut self, command: Command) {
        self.engine.dispatch(command);
    }

    /// Unlock and wait for the first input phase.
    pub fn start(&mut self) {
        self.send(Command::Start);
        assert!(self.run_until(|p| p == Phase::Input), "first round never opened input");
    }

    pub fn challenge(&self) -> Vec<usize> {
        self.engine.run().challenge.as_slice().to_vec()
    }

    /// A key that is not the one expected at `step`.
    pub fn wrong_key(&self, step: usize) -> usize {
        let count = self.engine.run().tier.symbol_count();
        (self.challenge()[step] + 1) % count
    }

    pub fn answer(&mut self) {
        for index in self.challenge() {
            self.send(Command::Select(index));
        }
    }

    pub fn answer_wrong(&mut self) {
        let mut keys = self.challenge();
        let last = keys.len() - 1;
        keys[last] = self.wrong_key(last);
        for index in keys {
            self.send(Command::Select(index));
        }
    }

    /// Solve the current round and wait for the next one to accept input.
    pub fn clear_round(&mut self) {
        self.answer();
        assert_eq!(self.phase(), Phase::Result { success: true });
        if self.engine.rules().timing.auto_next_ms.is_none() {
            self.send(Command::Next);
        }
        assert!(self.run_until(|p| p == Phase::Input));
    }

    fn fire_next(&mut self, deadline: f64) -> bool {
        match self.timers.pop_due(deadline) {
            Some(event) => {
                self.audio_time.set(self.timers.now_ms() / 1000.0);
                self.engine.on_timer(event);
                true
            }
            None => false,
        }
    }

    /// Fire every timer due within `ms` from now, then move the clock there.
    pub fn advance(&mut self, ms: f64) {
        let deadline = self.timers.now_ms() + ms;
        while self.fire_next(deadline) {}
        self.timers.set_now(deadline);
        self.audio_time.set(deadline / 1000.0);
    }

    /// Fire timers one at a time until `done` holds or nothing is pending.
    pub fn run_until(&mut self, done: impl Fn(Phase) -> bool) -> bool {
        loop {
            if done(self.phase()) {
                return true;
            }
            if !self.fire_next(f64::INFINITY) {
                return done(self.phase());
            }
        }
    }

    /// Drain the timer queue.
    pub fn settle(&mut self) {
        while self.fire_next(f64::INFINITY) {}
    }

    pub fn toasts(&self) -> Vec<String> {
        self.view.borrow().toasts.clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.view.borrow().actions.clone()
    }

    pub fn staff_prompts(&self) -> Vec<Staff> {
        self.view
            .borrow()
            .prompts
            .iter()
            .filter_map(|p| match p {
                Prompt::Staff(staff) => Some(*staff),
                _ => None,
            })
            .collect()
    }
}
