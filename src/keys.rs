//! Keyboard shortcuts.

use crate::machine::{Command, Phase};

/// Keys past the ninth: `a` selects key 10, `s` key 11 and so on.
const SECOND_ROW: [char; 9] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l'];

/// Map a `KeyboardEvent.key` value to a command for the current phase.
/// `None` means the key does nothing right now.
pub fn command_for(key: &str, phase: Phase, symbol_count: usize) -> Option<Command> {
    match key {
        "Enter" | " " => match phase {
            Phase::AudioUnlock => Some(Command::Start),
            Phase::Result { success: true } => Some(Command::Next),
            Phase::Result { success: false } => Some(Command::Retry),
            _ => None,
        },
        "p" | "P" => match phase {
            Phase::Input | Phase::Result { success: false } => Some(Command::Replay),
            _ => None,
        },
        "r" | "R" if phase.in_game() => Some(Command::Restart),
        _ => {
            let slot = key_slot(key)?;
            (phase == Phase::Input && slot <= symbol_count).then_some(Command::Select(slot - 1))
        }
    }
}

/// 1-based key position for a selection hotkey.
fn key_slot(key: &str) -> Option<usize> {
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c {
        '1'..='9' => c.to_digit(10).map(|d| d as usize),
        _ => SECOND_ROW
            .iter()
            .position(|&k| k == c.to_ascii_lowercase())
            .map(|i| i + 10),
    }
}
