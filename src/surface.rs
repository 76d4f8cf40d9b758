//! Presentation boundary. The machine pushes view updates through [`Surface`];
//! user activations come back in as [`crate::machine::Command`]s.

use crate::content::{Staff, Symbol};
use crate::records::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Plain,
    /// Playback in progress.
    Pulse,
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flash {
    Press,
    Correct,
    Wrong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    Replay,
    Next,
    Retry,
    Restart,
}

/// What the player is given to recognise during playback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Prompt {
    Listen,
    Staff(Staff),
    Name(&'static str),
    Hidden,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub level: u32,
    pub score: u32,
    pub best: u32,
    pub daily_best: u32,
    pub combo: u32,
    /// `(question, of)` while a quiz level is running.
    pub question: Option<(u32, u32)>,
}

pub trait Surface {
    /// Show or hide the start/unlock gate.
    fn show_unlock(&mut self, visible: bool);
    /// Rebuild the row of selectable symbols; activation of key `i` must be
    /// reported back as `Command::Select(i)`.
    fn render_symbols(&mut self, symbols: &'static [Symbol]);
    fn set_symbols_enabled(&mut self, enabled: bool);
    fn flash(&mut self, index: usize, flash: Flash);
    /// Playback cue `step` started. `index` is the cued key when it may be revealed.
    fn cue(&mut self, step: usize, index: Option<usize>);
    fn set_status(&mut self, text: &str, tone: StatusTone);
    fn set_scoreboard(&mut self, board: &Scoreboard);
    /// Exactly these action buttons are visible afterwards.
    fn show_actions(&mut self, actions: &[Action]);
    fn show_prompt(&mut self, prompt: &Prompt);
    fn toast(&mut self, message: &str);
    fn set_settings(&mut self, settings: &Settings);
}
