//! Day identifier source used for daily-best rollover.

use chrono::{Local, NaiveDate};
use std::cell::Cell;
use std::rc::Rc;

/// Format used for the persisted daily stamp.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub trait DayClock {
    fn today(&self) -> NaiveDate;
}

/// Calendar day in the local timezone (browser timezone under wasm via `wasmbind`).
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalDayClock;

impl DayClock for LocalDayClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually advanced clock. Clones share the same day so a test can keep a
/// handle while the engine owns another.
#[derive(Clone, Debug)]
pub struct FixedDayClock {
    day: Rc<Cell<NaiveDate>>,
}

impl FixedDayClock {
    pub fn new(day: NaiveDate) -> Self {
        Self { day: Rc::new(Cell::new(day)) }
    }

    pub fn advance_days(&self, days: u64) {
        let next = self
            .day
            .get()
            .checked_add_days(chrono::Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        self.day.set(next);
    }
}

impl DayClock for FixedDayClock {
    fn today(&self) -> NaiveDate {
        self.day.get()
    }
}

pub fn day_id(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a stored stamp; `None` for anything that is not a `YYYY-MM-DD` date.
pub fn parse_day_id(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT).ok()
}
