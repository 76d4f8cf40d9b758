//! Per-game rules: content table, timing, scoring and progression.
//!
//! Each game is compiled in with its own constants. The `timing` and `scoring`
//! blocks can be overridden at mount time with a partial JSON document, e.g.
//! `{"timing": {"note_s": 0.25}, "scoring": {"combo_step": 10}}`; keys that
//! are not given keep the game's value.

use crate::audio::Envelope;
use crate::content::{self, Tier};
use crate::error::ConfigError;
use crate::scoring::ScoreTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Durations used by the playback scheduler and the result flow.
/// `*_s` are on the audio clock, `*_ms` are timer delays.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Wait before a fresh (non-replay) playback starts.
    pub pre_roll_ms: f64,
    pub lead_in_s: f64,
    pub note_s: f64,
    pub gap_s: f64,
    /// Wait after the last cue before input opens.
    pub input_delay_ms: f64,
    /// Wait between the last input and the result feedback.
    pub result_delay_ms: f64,
    /// Wait between the result feedback and the action buttons.
    pub actions_delay_ms: f64,
    /// When set, a success advances on its own after this delay.
    pub auto_next_ms: Option<f64>,
    pub envelope: Envelope,
    pub master_volume: f64,
}

impl Timing {
    pub fn echokeys() -> Self {
        Self {
            pre_roll_ms: 1000.0,
            lead_in_s: 0.1,
            note_s: 0.3,
            gap_s: 0.15,
            input_delay_ms: 500.0,
            result_delay_ms: 300.0,
            actions_delay_ms: 500.0,
            auto_next_ms: None,
            envelope: Envelope::default(),
            master_volume: 0.3,
        }
    }

    pub fn scale_trainer() -> Self {
        Self {
            pre_roll_ms: 250.0,
            note_s: 0.5,
            input_delay_ms: 0.0,
            auto_next_ms: Some(650.0),
            envelope: Envelope {
                release: 0.2,
                ..Envelope::default()
            },
            ..Self::echokeys()
        }
    }

    /// Seconds between two cue starts.
    pub fn step_s(&self) -> f64 {
        self.note_s + self.gap_s
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("pre_roll_ms", self.pre_roll_ms),
            ("lead_in_s", self.lead_in_s),
            ("gap_s", self.gap_s),
            ("input_delay_ms", self.input_delay_ms),
            ("result_delay_ms", self.result_delay_ms),
            ("actions_delay_ms", self.actions_delay_ms),
            ("auto_next_ms", self.auto_next_ms.unwrap_or(0.0)),
            ("envelope.attack", self.envelope.attack),
            ("envelope.decay", self.envelope.decay),
            ("envelope.release", self.envelope.release),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name,
                    message: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        if !self.note_s.is_finite() || self.note_s <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "note_s",
                message: format!("must be positive, got {}", self.note_s),
            });
        }
        for (name, value) in [
            ("envelope.sustain", self.envelope.sustain),
            ("master_volume", self.master_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    message: format!("must be within 0..=1, got {}", value),
                });
            }
        }
        Ok(())
    }
}

/// How levels advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progression {
    /// Every solved challenge moves up one level.
    EveryRound,
    /// A level is a quiz of `questions` challenges; it is passed when at least
    /// `pass_percent` of them were solved on the first attempt.
    Quiz { questions: u32, pass_percent: u32 },
}

/// What the player is shown during playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Hear the challenge.
    Listen,
    /// See the note on a staff; no sound.
    Staff,
    /// Read the note name; no sound.
    Name,
}

impl PromptMode {
    pub fn audible(self) -> bool {
        matches!(self, PromptMode::Listen)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PromptMode::Listen => "listen",
            PromptMode::Staff => "staff",
            PromptMode::Name => "name",
        }
    }
}

/// The overridable part of a game's rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub timing: Timing,
    pub scoring: ScoreTable,
}

#[derive(Clone, Copy, Debug)]
pub struct GameRules {
    /// Storage key prefix.
    pub id: &'static str,
    pub title: &'static str,
    pub tier_for_level: fn(u32) -> Tier,
    pub timing: Timing,
    pub scoring: ScoreTable,
    pub progression: Progression,
    /// First entry is the default.
    pub modes: &'static [PromptMode],
    /// Highlight the cued key during playback (memory game) instead of only
    /// pulsing the prompt (recognition game, where it would give the answer away).
    pub reveal_cues: bool,
}

impl GameRules {
    pub fn echokeys() -> Self {
        Self {
            id: "echokeys",
            title: "EchoKeys",
            tier_for_level: content::echokeys::tier_for_level,
            timing: Timing::echokeys(),
            scoring: ScoreTable {
                per_symbol: 10,
                combo_step: 5,
                level_step: 10,
                level_band: 5,
            },
            progression: Progression::EveryRound,
            modes: &[PromptMode::Listen],
            reveal_cues: true,
        }
    }

    pub fn scale_trainer() -> Self {
        Self {
            id: "scaletrainer",
            title: "ScaleTrainer",
            tier_for_level: content::scale::tier_for_level,
            timing: Timing::scale_trainer(),
            scoring: ScoreTable {
                per_symbol: 15,
                combo_step: 2,
                level_step: 5,
                level_band: 5,
            },
            progression: Progression::Quiz {
                questions: 10,
                pass_percent: 80,
            },
            modes: &[PromptMode::Staff, PromptMode::Listen, PromptMode::Name],
            reveal_cues: false,
        }
    }

    pub fn tier(&self, level: u32) -> Tier {
        (self.tier_for_level)(level.max(1))
    }

    pub fn default_mode(&self) -> PromptMode {
        self.modes.first().copied().unwrap_or(PromptMode::Listen)
    }

    pub fn supports(&self, mode: PromptMode) -> bool {
        self.modes.contains(&mode)
    }

    pub fn config(&self) -> GameConfig {
        GameConfig {
            timing: self.timing,
            scoring: self.scoring,
        }
    }

    /// Apply a partial JSON override on top of the compiled-in values.
    pub fn with_overrides(mut self, json: &str) -> Result<Self, ConfigError> {
        let patch: Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(self.config())?;
        merge(&mut merged, patch);
        let config: GameConfig = serde_json::from_value(merged)?;
        config.timing.validate()?;
        self.timing = config.timing;
        self.scoring = config.scoring;
        Ok(self)
    }
}

fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
