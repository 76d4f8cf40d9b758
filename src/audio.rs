//! Audio boundary: envelope-shaped tones scheduled on an audio clock.

use crate::error::AudioError;
use serde::{Deserialize, Serialize};

/// Attack/decay/sustain/release envelope. Times in seconds, sustain as gain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.05,
            sustain: 0.7,
            release: 0.1,
        }
    }
}

/// One sine tone. `start` is on the audio clock (seconds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency: f64,
    pub start: f64,
    pub duration: f64,
    pub envelope: Envelope,
}

/// Automation step on the gain parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GainStep {
    Set { value: f32, at: f64 },
    Ramp { value: f32, at: f64 },
}

impl Tone {
    /// Gain automation for this tone: silence, linear attack to full, decay to
    /// sustain, hold, linear release to silence at `start + duration`.
    pub fn gain_steps(&self) -> [GainStep; 5] {
        let env = self.envelope;
        let t0 = self.start;
        let sustain = env.sustain as f32;
        [
            GainStep::Set { value: 0.0, at: t0 },
            GainStep::Ramp { value: 1.0, at: t0 + env.attack },
            GainStep::Ramp {
                value: sustain,
                at: t0 + env.attack + env.decay,
            },
            GainStep::Set {
                value: sustain,
                at: t0 + (self.duration - env.release).max(0.0),
            },
            GainStep::Ramp {
                value: 0.0,
                at: t0 + self.duration,
            },
        ]
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

pub trait AudioOut {
    /// Create/resume the output. Only valid from a user gesture in browsers.
    fn unlock(&mut self) -> Result<(), AudioError>;

    /// Current audio clock time in seconds, `None` while unavailable.
    fn current_time(&self) -> Option<f64>;

    fn play_tone(&mut self, tone: &Tone) -> Result<(), AudioError>;
}

/// Output that never becomes available. Playback degrades to visual-only.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioOut for SilentAudio {
    fn unlock(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }

    fn current_time(&self) -> Option<f64> {
        None
    }

    fn play_tone(&mut self, _tone: &Tone) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }
}

/// (frequency, offset seconds, duration seconds)
pub type FeedbackNote = (f64, f64, f64);

/// Ascending C major arpeggio played on a correct answer.
pub const SUCCESS_CHORD: [FeedbackNote; 3] = [(523.0, 0.0, 0.15), (659.0, 0.08, 0.15), (784.0, 0.16, 0.2)];

/// Falling pair played on a wrong answer.
pub const FAILURE_TONES: [FeedbackNote; 2] = [(330.0, 0.0, 0.2), (262.0, 0.15, 0.3)];
