// ScaleTrainer content table
// Notes C4..C5 with staff placement, and the pool each level band draws from.
use super::{Symbol, Tier};

pub const C4: Symbol = Symbol::note("C4", 261.63, 0, false);
pub const CS4: Symbol = Symbol::note("C#4", 277.18, 0, true);
pub const D4: Symbol = Symbol::note("D4", 293.66, 1, false);
pub const DS4: Symbol = Symbol::note("D#4", 311.13, 1, true);
pub const E4: Symbol = Symbol::note("E4", 329.63, 2, false);
pub const F4: Symbol = Symbol::note("F4", 349.23, 3, false);
pub const FS4: Symbol = Symbol::note("F#4", 369.99, 3, true);
pub const G4: Symbol = Symbol::note("G4", 392.0, 4, false);
pub const GS4: Symbol = Symbol::note("G#4", 415.3, 4, true);
pub const A4: Symbol = Symbol::note("A4", 440.0, 5, false);
pub const AS4: Symbol = Symbol::note("A#4", 466.16, 5, true);
pub const B4: Symbol = Symbol::note("B4", 493.88, 6, false);
pub const C5: Symbol = Symbol::note("C5", 523.25, 7, false);

pub static FIVE_FINGER: [Symbol; 5] = [C4, D4, E4, F4, G4];
pub static NATURALS: [Symbol; 7] = [C4, D4, E4, F4, G4, A4, B4];
pub static OCTAVE: [Symbol; 8] = [C4, D4, E4, F4, G4, A4, B4, C5];
/// Every note the trainer knows.
pub static CHROMATIC: [Symbol; 13] = [C4, CS4, D4, DS4, E4, F4, FS4, G4, GS4, A4, AS4, B4, C5];

/// One note per question.
pub const CHALLENGE_LEN: usize = 1;

pub fn tier_for_level(level: u32) -> Tier {
    let (name, symbols): (&'static str, &'static [Symbol]) = match level.max(1) {
        1..=3 => ("C-G", &FIVE_FINGER[..]),
        4..=6 => ("C-B", &NATURALS[..]),
        7..=10 => ("C-C", &OCTAVE[..]),
        _ => ("chromatic", &CHROMATIC[..]),
    };
    Tier {
        name,
        symbols,
        challenge_len: CHALLENGE_LEN,
    }
}
