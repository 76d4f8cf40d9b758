//! Best-effort vibration. Missing support is never an error.

/// Short pulse for key presses and playback cues.
pub const TAP: &[u32] = &[50];
/// buzz-pause-buzz-pause-long buzz
pub const SUCCESS: &[u32] = &[100, 50, 100, 50, 150];
/// long-pause-long
pub const ERROR: &[u32] = &[200, 100, 200];

pub trait Haptics {
    /// Pattern in milliseconds, alternating vibrate/pause.
    fn vibrate(&mut self, pattern: &[u32]);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _pattern: &[u32]) {}
}
