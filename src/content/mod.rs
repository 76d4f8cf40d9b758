//! Static content tables: the playable symbols of each game and the tier
//! (difficulty band) a level maps to.
//!
//! Symbols are immutable and addressed by their index within the tier's
//! symbol slice. Tiers only ever grow: a later band never offers fewer
//! symbols or a shorter minimum challenge than an earlier one.

pub mod echokeys;
pub mod scale;

/// Position of a note on a treble staff. `position` 2 is the bottom line (E4);
/// every step is one line or space upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Staff {
    pub position: i8,
    pub sharp: bool,
}

/// Atomic playable unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Symbol {
    pub label: &'static str,
    pub frequency: f64,
    pub staff: Option<Staff>,
}

impl Symbol {
    pub const fn tone(label: &'static str, frequency: f64) -> Self {
        Self {
            label,
            frequency,
            staff: None,
        }
    }

    pub const fn note(label: &'static str, frequency: f64, position: i8, sharp: bool) -> Self {
        Self {
            label,
            frequency,
            staff: Some(Staff { position, sharp }),
        }
    }
}

/// Difficulty band resolved for one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tier {
    pub name: &'static str,
    pub symbols: &'static [Symbol],
    pub challenge_len: usize,
}

impl Tier {
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbol(&self, index: usize) -> Option<&'static Symbol> {
        self.symbols.get(index)
    }

    /// Same symbol table (used to skip re-rendering the key row between rounds).
    pub fn same_symbols(&self, other: &Tier) -> bool {
        std::ptr::eq(self.symbols, other.symbols)
    }
}
