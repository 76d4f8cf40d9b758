//! Run state, round awards, combo streak and level progression.

use crate::challenge::{Challenge, PlayerInput};
use crate::config::Progression;
use crate::content::Tier;
use crate::level::Round;
use serde::{Deserialize, Serialize};

/// Award constants. `award = per_symbol * len + combo_step * combo + level_step * (level / level_band)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub per_symbol: u32,
    pub combo_step: u32,
    pub level_step: u32,
    pub level_band: u32,
}

impl ScoreTable {
    pub fn base_points(&self, challenge_len: usize) -> u32 {
        self.per_symbol.saturating_mul(challenge_len as u32)
    }

    pub fn combo_bonus(&self, combo: u32) -> u32 {
        self.combo_step.saturating_mul(combo)
    }

    pub fn level_bonus(&self, level: u32) -> u32 {
        if self.level_band == 0 {
            0
        } else {
            self.level_step.saturating_mul(level / self.level_band)
        }
    }

    pub fn award(&self, challenge_len: usize, combo: u32, level: u32) -> u32 {
        self.base_points(challenge_len)
            .saturating_add(self.combo_bonus(combo))
            .saturating_add(self.level_bonus(level))
    }
}

/// Position within a quiz-style level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based number of the question being asked.
    pub question: u32,
    pub first_try: u32,
    /// The current question has already been missed once.
    pub missed: bool,
}

impl Default for QuizProgress {
    fn default() -> Self {
        Self {
            question: 1,
            first_try: 0,
            missed: false,
        }
    }
}

/// End-of-quiz verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSummary {
    pub level: u32,
    pub accuracy: u32,
    pub passed: bool,
}

/// What a solved round produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advance {
    pub award: u32,
    pub level_up: bool,
    pub quiz: Option<QuizSummary>,
}

/// Mutable state of one run. Owned by the machine; never persisted.
#[derive(Clone, Debug)]
pub struct RunState {
    pub level: u32,
    pub score: u32,
    pub combo: u32,
    pub tier: Tier,
    pub challenge: Challenge,
    pub input: PlayerInput,
    pub quiz: QuizProgress,
}

impl RunState {
    pub fn new(tier: Tier) -> Self {
        Self {
            level: 1,
            score: 0,
            combo: 0,
            tier,
            challenge: Challenge::default(),
            input: PlayerInput::default(),
            quiz: QuizProgress::default(),
        }
    }

    /// Install a freshly generated round; the previous input is discarded.
    pub fn begin_round(&mut self, round: Round) {
        self.level = round.level;
        self.tier = round.tier;
        self.challenge = round.challenge;
        self.input.clear();
        self.quiz.missed = false;
    }

    /// Back to level 1 with no score or streak. Records are untouched.
    pub fn restart(&mut self, tier: Tier) {
        *self = Self::new(tier);
    }

    pub fn on_success(&mut self, table: &ScoreTable, progression: Progression) -> Advance {
        let len = self.challenge.len();
        match progression {
            Progression::EveryRound => {
                self.level += 1;
                self.combo += 1;
                let award = table.award(len, self.combo, self.level);
                self.score = self.score.saturating_add(award);
                Advance {
                    award,
                    level_up: true,
                    quiz: None,
                }
            }
            Progression::Quiz {
                questions,
                pass_percent,
            } => {
                self.combo += 1;
                let award = table.award(len, self.combo, self.level);
                self.score = self.score.saturating_add(award);
                if !self.quiz.missed {
                    self.quiz.first_try += 1;
                }
                self.quiz.missed = false;
                if self.quiz.question < questions.max(1) {
                    self.quiz.question += 1;
                    return Advance {
                        award,
                        level_up: false,
                        quiz: None,
                    };
                }
                let accuracy = self.quiz.first_try * 100 / questions.max(1);
                let passed = accuracy >= pass_percent;
                let summary = QuizSummary {
                    level: self.level,
                    accuracy,
                    passed,
                };
                if passed {
                    self.level += 1;
                }
                self.quiz = QuizProgress::default();
                Advance {
                    award,
                    level_up: passed,
                    quiz: Some(summary),
                }
            }
        }
    }

    /// Streak resets; level and score stand so the same challenge can be retried.
    pub fn on_failure(&mut self) {
        self.combo = 0;
        self.quiz.missed = true;
    }
}
