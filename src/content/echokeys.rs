// EchoKeys content table
// Solfege keys for the 3/5/7-key modes and the level -> tier step function.
use super::{Symbol, Tier};

/// Longest sequence EchoKeys ever asks for.
pub const MAX_CHALLENGE_LEN: usize = 6;

pub static THREE_KEYS: [Symbol; 3] = [
    Symbol::tone("Do", 262.0),
    Symbol::tone("Mi", 330.0),
    Symbol::tone("Sol", 392.0),
];

pub static FIVE_KEYS: [Symbol; 5] = [
    Symbol::tone("Do", 262.0),
    Symbol::tone("Re", 294.0),
    Symbol::tone("Mi", 330.0),
    Symbol::tone("Sol", 392.0),
    Symbol::tone("La", 440.0),
];

pub static SEVEN_KEYS: [Symbol; 7] = [
    Symbol::tone("Do", 262.0),
    Symbol::tone("Re", 294.0),
    Symbol::tone("Mi", 330.0),
    Symbol::tone("Fa", 349.0),
    Symbol::tone("Sol", 392.0),
    Symbol::tone("La", 440.0),
    Symbol::tone("Ti", 494.0),
];

pub fn tier_for_level(level: u32) -> Tier {
    let level = level.max(1);
    let (name, symbols, len): (&'static str, &'static [Symbol], u32) = match level {
        1..=3 => ("3-key", &THREE_KEYS[..], 1),
        4..=6 => ("3-key", &THREE_KEYS[..], ((level - 2) / 2).min(2)),
        7..=10 => ("5-key", &FIVE_KEYS[..], ((level - 6) / 2 + 2).min(3)),
        11..=15 => ("5-key", &FIVE_KEYS[..], ((level - 10) / 2 + 3).min(4)),
        16..=20 => ("7-key", &SEVEN_KEYS[..], ((level - 15) / 2 + 4).min(5)),
        _ => ("7-key", &SEVEN_KEYS[..], (5 + (level - 20) / 5).min(6)),
    };
    Tier {
        name,
        symbols,
        challenge_len: (len as usize).clamp(1, MAX_CHALLENGE_LEN),
    }
}
