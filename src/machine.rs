//! The game state machine: boot, unlock, playback, input, result.
//!
//! [`Engine`] owns the run, the records and every port. It is driven from
//! outside by exactly two things: user [`Command`]s and fired [`TimerEvent`]s.
//! Commands that the current phase does not accept are ignored.

use crate::audio::{AudioOut, FAILURE_TONES, FeedbackNote, SUCCESS_CHORD, Tone};
use crate::challenge::{Entry, is_match};
use crate::clock::DayClock;
use crate::config::{GameRules, Progression, PromptMode};
use crate::content::Tier;
use crate::haptics::{self, Haptics};
use crate::level;
use crate::records::{RecordBreak, Records};
use crate::scheduler::{Scheduler, TimerEvent, TimerKind, Timers};
use crate::scoring::{QuizSummary, RunState};
use crate::store::KeyValueStore;
use crate::surface::{Action, Flash, Prompt, Scoreboard, StatusTone, Surface};
use rand::RngCore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Boot,
    AudioUnlock,
    Playback,
    Input,
    Result { success: bool },
}

impl Phase {
    pub fn in_game(self) -> bool {
        matches!(self, Phase::Playback | Phase::Input | Phase::Result { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Select(usize),
    Next,
    Replay,
    Retry,
    Restart,
    SetMode(PromptMode),
    SetHaptics(bool),
    SetSound(bool),
}

/// Everything the engine needs from its environment.
pub struct Ports {
    pub store: Box<dyn KeyValueStore>,
    pub clock: Box<dyn DayClock>,
    pub audio: Box<dyn AudioOut>,
    pub haptics: Box<dyn Haptics>,
    pub timers: Box<dyn Timers>,
    pub surface: Box<dyn Surface>,
    pub rng: Box<dyn RngCore>,
}

/// Evaluated round waiting for its deferred feedback.
#[derive(Clone, Copy, Debug)]
struct Outcome {
    success: bool,
    award: u32,
    record: RecordBreak,
    quiz: Option<QuizSummary>,
}

const SUCCESS_ACTIONS: &[Action] = &[Action::Next, Action::Restart];
const FAILURE_ACTIONS: &[Action] = &[Action::Replay, Action::Retry, Action::Restart];

pub struct Engine {
    rules: GameRules,
    phase: Phase,
    mode: PromptMode,
    run: RunState,
    records: Records,
    scheduler: Scheduler,
    outcome: Option<Outcome>,
    audio: Box<dyn AudioOut>,
    haptics: Box<dyn Haptics>,
    timers: Box<dyn Timers>,
    surface: Box<dyn Surface>,
    rng: Box<dyn RngCore>,
}

impl Engine {
    pub fn new(rules: GameRules, ports: Ports) -> Self {
        let Ports {
            store,
            clock,
            audio,
            haptics,
            timers,
            surface,
            rng,
        } = ports;
        Self {
            phase: Phase::Boot,
            mode: rules.default_mode(),
            run: RunState::new(rules.tier(1)),
            records: Records::new(rules.id, store, clock),
            scheduler: Scheduler::new(),
            outcome: None,
            rules,
            audio,
            haptics,
            timers,
            surface,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn generation(&self) -> u64 {
        self.scheduler.generation()
    }

    /// Load records and settings, render the idle view and wait for `Start`.
    pub fn boot(&mut self) {
        if self.phase != Phase::Boot {
            return;
        }
        self.records.load();
        self.phase = Phase::AudioUnlock;
        self.surface.render_symbols(self.run.tier.symbols);
        self.surface.set_symbols_enabled(false);
        self.surface.show_actions(&[]);
        self.surface.show_prompt(&Prompt::Hidden);
        self.surface.set_settings(self.records.settings());
        self.refresh_scoreboard();
        self.surface
            .set_status(&format!("Tap start to play {}", self.rules.title), StatusTone::Plain);
        self.surface.show_unlock(true);
        tracing::debug!(game = self.rules.id, "booted, waiting for unlock");
    }

    /// Cancel every pending timer and stop reacting to input. Used when the
    /// engine is being replaced.
    pub fn halt(&mut self) {
        self.scheduler.supersede(self.timers.as_mut());
        self.phase = Phase::Boot;
        self.outcome = None;
    }

    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Select(index) => self.select(index),
            Command::Next => self.next(),
            Command::Replay => self.replay(),
            Command::Retry => self.retry(),
            Command::Restart => self.restart(),
            Command::SetMode(mode) => self.set_mode(mode),
            Command::SetHaptics(enabled) => self.set_haptics(enabled),
            Command::SetSound(enabled) => self.set_sound(enabled),
        }
    }

    /// The user gesture that may create audio. Starts a run at level 1.
    pub fn start(&mut self) {
        if self.phase != Phase::AudioUnlock {
            tracing::debug!(phase = ?self.phase, "start ignored");
            return;
        }
        if let Err(err) = self.audio.unlock() {
            tracing::warn!(%err, "audio unavailable, playing visual-only");
        }
        self.surface.show_unlock(false);
        self.new_run();
    }

    pub fn select(&mut self, index: usize) {
        if self.phase != Phase::Input {
            tracing::debug!(index, phase = ?self.phase, "selection ignored");
            return;
        }
        let Some(symbol) = self.run.tier.symbol(index) else {
            tracing::debug!(index, "selection out of range");
            return;
        };
        self.chime(&[(symbol.frequency, 0.0, self.rules.timing.note_s)]);
        self.buzz(haptics::TAP);
        self.surface.flash(index, Flash::Press);
        match self.run.input.push(index, &self.run.challenge) {
            Entry::Partial { entered, needed } => {
                self.surface
                    .set_status(&format!("{} / {}", entered, needed), StatusTone::Plain);
            }
            Entry::Complete => self.evaluate(),
            Entry::Full => {}
        }
    }

    pub fn next(&mut self) {
        if self.phase != (Phase::Result { success: true }) {
            tracing::debug!(phase = ?self.phase, "next ignored");
            return;
        }
        self.new_round(self.run.level);
        self.enter_playback(true, "🎵 Listen carefully...");
    }

    /// Hear the same challenge again without the pre-roll.
    pub fn replay(&mut self) {
        if !matches!(self.phase, Phase::Input | Phase::Result { success: false }) {
            tracing::debug!(phase = ?self.phase, "replay ignored");
            return;
        }
        self.enter_playback(false, "🎵 Listen again...");
    }

    pub fn retry(&mut self) {
        if self.phase != (Phase::Result { success: false }) {
            tracing::debug!(phase = ?self.phase, "retry ignored");
            return;
        }
        self.enter_playback(true, "🎵 Listen carefully...");
    }

    /// Back to level 1 with a fresh challenge. Records are kept.
    pub fn restart(&mut self) {
        if !self.phase.in_game() {
            tracing::debug!(phase = ?self.phase, "restart ignored");
            return;
        }
        tracing::info!(game = self.rules.id, level = self.run.level, score = self.run.score, "run restarted");
        self.new_run();
    }

    /// Switch the prompt mode. In game the current level restarts its quiz.
    pub fn set_mode(&mut self, mode: PromptMode) {
        if !self.rules.supports(mode) || mode == self.mode {
            return;
        }
        self.mode = mode;
        tracing::debug!(?mode, "prompt mode changed");
        if self.phase.in_game() {
            self.run.quiz = Default::default();
            self.new_round(self.run.level);
            self.enter_playback(true, "🎵 Listen carefully...");
        }
    }

    pub fn set_haptics(&mut self, enabled: bool) {
        self.records.set_haptics(enabled);
        if enabled {
            self.haptics.vibrate(haptics::TAP);
        }
        self.surface.set_settings(self.records.settings());
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.records.set_sound(enabled);
        self.surface.set_settings(self.records.settings());
    }

    /// Entry point for every fired timer. Events from a superseded round are dropped.
    pub fn on_timer(&mut self, event: TimerEvent) {
        if !self.scheduler.accepts(&event) {
            tracing::debug!(
                stale = event.generation,
                current = self.scheduler.generation(),
                "stale timer ignored"
            );
            return;
        }
        match (event.kind, self.phase) {
            (TimerKind::BeginPlayback, Phase::Playback) => self.begin_playback(),
            (TimerKind::Cue { step }, Phase::Playback) => self.cue(step),
            (TimerKind::PlaybackDone, Phase::Playback) => self.enter_input(),
            (TimerKind::Reveal, Phase::Result { .. }) => self.reveal(),
            (TimerKind::ShowActions, Phase::Result { success }) => {
                self.surface
                    .show_actions(if success { SUCCESS_ACTIONS } else { FAILURE_ACTIONS });
            }
            (TimerKind::AutoNext, Phase::Result { success: true }) => self.next(),
            (kind, phase) => tracing::debug!(?kind, ?phase, "timer not applicable"),
        }
    }

    fn new_run(&mut self) {
        let round = level::generate(self.rules.tier_for_level, 1, &mut *self.rng);
        self.render_symbols_for(&round.tier);
        self.run.restart(round.tier);
        self.run.begin_round(round);
        self.outcome = None;
        self.enter_playback(true, "🎵 Listen carefully...");
    }

    fn new_round(&mut self, level: u32) {
        let round = level::generate(self.rules.tier_for_level, level, &mut *self.rng);
        self.render_symbols_for(&round.tier);
        self.run.begin_round(round);
        self.outcome = None;
    }

    /// The key row always shows `run.tier`; rebuild it only when the table changes.
    fn render_symbols_for(&mut self, tier: &Tier) {
        if !tier.same_symbols(&self.run.tier) {
            self.surface.render_symbols(tier.symbols);
        }
    }

    fn enter_playback(&mut self, pre_roll: bool, status: &str) {
        self.scheduler.supersede(self.timers.as_mut());
        self.run.input.clear();
        self.phase = Phase::Playback;
        self.surface.set_symbols_enabled(false);
        self.surface.show_actions(&[Action::Restart]);
        self.surface.show_prompt(if self.mode.audible() {
            &Prompt::Listen
        } else {
            &Prompt::Hidden
        });
        self.surface.set_status(status, StatusTone::Pulse);
        self.refresh_scoreboard();
        if pre_roll && self.rules.timing.pre_roll_ms > 0.0 {
            let delay = self.rules.timing.pre_roll_ms;
            self.scheduler
                .after(self.timers.as_mut(), delay, TimerKind::BeginPlayback);
        } else {
            self.begin_playback();
        }
    }

    fn begin_playback(&mut self) {
        let audible = self.mode.audible() && self.records.settings().sound;
        let plan = self.scheduler.schedule_playback(
            self.timers.as_mut(),
            self.audio.as_mut(),
            &self.run.tier,
            self.run.challenge.as_slice(),
            &self.rules.timing,
            audible,
        );
        if plan.degraded {
            tracing::debug!("playback running visual-only");
        }
    }

    fn cue(&mut self, step: usize) {
        let Some(index) = self.run.challenge.get(step) else {
            return;
        };
        self.surface
            .cue(step, self.rules.reveal_cues.then_some(index));
        if let Some(symbol) = self.run.tier.symbol(index) {
            match self.mode {
                PromptMode::Listen => {}
                PromptMode::Staff => match symbol.staff {
                    Some(staff) => self.surface.show_prompt(&Prompt::Staff(staff)),
                    None => self.surface.show_prompt(&Prompt::Name(symbol.label)),
                },
                PromptMode::Name => self.surface.show_prompt(&Prompt::Name(symbol.label)),
            }
        }
        self.buzz(haptics::TAP);
    }

    fn enter_input(&mut self) {
        self.phase = Phase::Input;
        self.surface.set_symbols_enabled(true);
        self.surface.show_actions(&[Action::Replay, Action::Restart]);
        let status = if self.rules.reveal_cues {
            let n = self.run.challenge.len();
            format!("Repeat the {} note{}", n, if n == 1 { "" } else { "s" })
        } else {
            String::from("Which note is it?")
        };
        self.surface.set_status(&status, StatusTone::Plain);
    }

    /// Runs synchronously on the last entry; only the feedback is deferred.
    fn evaluate(&mut self) {
        let success = is_match(self.run.challenge.as_slice(), self.run.input.as_slice());
        self.phase = Phase::Result { success };
        self.surface.set_symbols_enabled(false);
        self.surface.show_actions(&[]);
        let outcome = if success {
            let advance = self
                .run
                .on_success(&self.rules.scoring, self.rules.progression);
            let record = self.records.submit(self.run.score);
            tracing::info!(
                level = self.run.level,
                score = self.run.score,
                combo = self.run.combo,
                award = advance.award,
                level_up = advance.level_up,
                ?record,
                "round solved"
            );
            Outcome {
                success,
                award: advance.award,
                record,
                quiz: advance.quiz,
            }
        } else {
            self.run.on_failure();
            tracing::info!(level = self.run.level, score = self.run.score, "round missed");
            Outcome {
                success,
                award: 0,
                record: RecordBreak::None,
                quiz: None,
            }
        };
        self.outcome = Some(outcome);
        self.refresh_scoreboard();
        let delay = self.rules.timing.result_delay_ms;
        self.scheduler
            .after(self.timers.as_mut(), delay, TimerKind::Reveal);
    }

    fn reveal(&mut self) {
        let Some(outcome) = self.outcome.take() else {
            return;
        };
        let flash = if outcome.success {
            Flash::Correct
        } else {
            Flash::Wrong
        };
        let entered: Vec<usize> = self.run.input.as_slice().to_vec();
        for index in entered {
            self.surface.flash(index, flash);
        }
        if outcome.success {
            self.chime(&SUCCESS_CHORD);
            self.buzz(haptics::SUCCESS);
            self.surface
                .set_status(&format!("✨ Perfect! +{}", outcome.award), StatusTone::Success);
            if let Some(message) = outcome.record.message() {
                self.surface.toast(message);
            }
            if let Some(quiz) = outcome.quiz {
                let message = self.quiz_message(&quiz);
                self.surface.toast(&message);
            }
            // Auto-advancing rounds never offer Next.
            if let Some(delay) = self.rules.timing.auto_next_ms {
                self.surface.show_actions(&[Action::Restart]);
                self.scheduler
                    .after(self.timers.as_mut(), delay, TimerKind::AutoNext);
                return;
            }
        } else {
            self.chime(&FAILURE_TONES);
            self.buzz(haptics::ERROR);
            self.surface
                .set_status("❌ Not quite... Listen again or retry", StatusTone::Error);
        }
        let delay = self.rules.timing.actions_delay_ms;
        self.scheduler
            .after(self.timers.as_mut(), delay, TimerKind::ShowActions);
    }

    fn quiz_message(&self, quiz: &QuizSummary) -> String {
        let need = match self.rules.progression {
            Progression::Quiz { pass_percent, .. } => pass_percent,
            Progression::EveryRound => 0,
        };
        if quiz.passed {
            format!("Level {} complete! {}% first try", quiz.level, quiz.accuracy)
        } else {
            format!("Try again: {}% (need {}%)", quiz.accuracy, need)
        }
    }

    fn refresh_scoreboard(&mut self) {
        let record = self.records.record();
        let question = match self.rules.progression {
            Progression::Quiz { questions, .. } => Some((self.run.quiz.question, questions)),
            Progression::EveryRound => None,
        };
        let board = Scoreboard {
            level: self.run.level,
            score: self.run.score,
            best: record.best,
            daily_best: record.daily_best,
            combo: self.run.combo,
            question,
        };
        self.surface.set_scoreboard(&board);
    }

    fn buzz(&mut self, pattern: &[u32]) {
        if self.records.settings().haptics {
            self.haptics.vibrate(pattern);
        }
    }

    /// Feedback tones relative to the audio clock. Silent without audio or with sound off.
    fn chime(&mut self, notes: &[FeedbackNote]) {
        if !self.records.settings().sound {
            return;
        }
        let Some(now) = self.audio.current_time() else {
            return;
        };
        let envelope = self.rules.timing.envelope;
        for &(frequency, offset, duration) in notes {
            let tone = Tone {
                frequency,
                start: now + offset,
                duration,
                envelope,
            };
            if let Err(err) = self.audio.play_tone(&tone) {
                tracing::warn!(%err, "feedback tone failed");
                return;
            }
        }
    }
}
