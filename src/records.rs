//! Best / daily-best records and settings, written through to the store.
//!
//! Every read tolerates missing or malformed values and every write failure
//! is swallowed: when storage is denied the values simply live in memory for
//! the rest of the session.

use crate::clock::{DayClock, day_id, parse_day_id};
use crate::store::KeyValueStore;
use chrono::NaiveDate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BestRecord {
    pub best: u32,
    pub daily_best: u32,
    /// Day the daily best was captured under.
    pub day: NaiveDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub haptics: bool,
    pub sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            haptics: true,
            sound: true,
        }
    }
}

/// Which records a score broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordBreak {
    None,
    Daily,
    AllTime,
    Both,
}

impl RecordBreak {
    fn from_flags(all_time: bool, daily: bool) -> Self {
        match (all_time, daily) {
            (true, true) => RecordBreak::Both,
            (true, false) => RecordBreak::AllTime,
            (false, true) => RecordBreak::Daily,
            (false, false) => RecordBreak::None,
        }
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            RecordBreak::Both => Some("New best and daily best!"),
            RecordBreak::AllTime => Some("New best score!"),
            RecordBreak::Daily => Some("New daily best!"),
            RecordBreak::None => None,
        }
    }
}

/// Storage keys for one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordKeys {
    pub best: String,
    pub daily_best: String,
    pub daily_date: String,
    pub haptics: String,
    pub sound: String,
}

impl RecordKeys {
    pub fn for_game(prefix: &str) -> Self {
        Self {
            best: format!("{}_best", prefix),
            daily_best: format!("{}_daily_best", prefix),
            daily_date: format!("{}_daily_date", prefix),
            haptics: format!("{}_vibration", prefix),
            sound: format!("{}_sound", prefix),
        }
    }
}

pub struct Records {
    keys: RecordKeys,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn DayClock>,
    record: BestRecord,
    settings: Settings,
}

impl Records {
    /// Defaults only; call [`Records::load`] to read the store.
    pub fn new(prefix: &str, store: Box<dyn KeyValueStore>, clock: Box<dyn DayClock>) -> Self {
        let today = clock.today();
        Self {
            keys: RecordKeys::for_game(prefix),
            store,
            clock,
            record: BestRecord {
                best: 0,
                daily_best: 0,
                day: today,
            },
            settings: Settings::default(),
        }
    }

    pub fn load(&mut self) {
        let today = self.clock.today();
        let best = self.read(&self.keys.best).and_then(|v| parse_score(&v)).unwrap_or(0);
        let daily_best = self
            .read(&self.keys.daily_best)
            .and_then(|v| parse_score(&v))
            .unwrap_or(0);
        let day = self
            .read(&self.keys.daily_date)
            .and_then(|v| parse_day_id(&v))
            .unwrap_or(today);
        self.record = BestRecord {
            best,
            daily_best,
            day,
        };
        self.settings = Settings {
            haptics: self
                .read(&self.keys.haptics)
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),
            sound: self
                .read(&self.keys.sound)
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),
        };
        self.roll_day();
        tracing::debug!(
            best = self.record.best,
            daily_best = self.record.daily_best,
            day = %day_id(self.record.day),
            "records loaded"
        );
    }

    /// Reset the daily best when the calendar day changed. Returns true on rollover.
    pub fn roll_day(&mut self) -> bool {
        let today = self.clock.today();
        if self.record.day == today {
            return false;
        }
        tracing::debug!(from = %day_id(self.record.day), to = %day_id(today), "daily best rollover");
        self.record.day = today;
        self.record.daily_best = 0;
        self.write_daily();
        true
    }

    /// Compare a run score against both records, persisting whichever improved.
    pub fn submit(&mut self, score: u32) -> RecordBreak {
        self.roll_day();
        let all_time = score > self.record.best;
        if all_time {
            self.record.best = score;
            let key = self.keys.best.clone();
            self.write(&key, &score.to_string());
        }
        let daily = score > self.record.daily_best;
        if daily {
            self.record.daily_best = score;
            self.write_daily();
        }
        RecordBreak::from_flags(all_time, daily)
    }

    pub fn set_haptics(&mut self, enabled: bool) {
        self.settings.haptics = enabled;
        let key = self.keys.haptics.clone();
        self.write(&key, flag(enabled));
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.settings.sound = enabled;
        let key = self.keys.sound.clone();
        self.write(&key, flag(enabled));
    }

    pub fn record(&self) -> &BestRecord {
        &self.record
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn write_daily(&mut self) {
        let (score_key, date_key) = (self.keys.daily_best.clone(), self.keys.daily_date.clone());
        let (score, day) = (self.record.daily_best.to_string(), day_id(self.record.day));
        self.write(&score_key, &score);
        self.write(&date_key, &day);
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, %err, "storage read failed, using default");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            tracing::warn!(key, %err, "storage write failed, keeping value in memory");
        }
    }
}

fn parse_score(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

fn parse_flag(raw: &str, default: bool) -> bool {
    match raw.trim() {
        "true" | "1" => true,
        "false" | "0" => false,
        _ => default,
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled { "true" } else { "false" }
}
