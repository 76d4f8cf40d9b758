//! Noteloop core crate.
//!
//! Two ear-training mini-games built on one state machine: EchoKeys (repeat a
//! growing sequence of tones) and ScaleTrainer (name the note shown on a
//! staff or played). The engine is platform agnostic and talks to its
//! environment through the port traits below; `web` binds it to the browser.

use wasm_bindgen::prelude::*;

pub mod audio;
pub mod challenge;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod haptics;
pub mod keys;
pub mod level;
#[cfg(feature = "console_logging")]
pub mod logging;
pub mod machine;
pub mod records;
pub mod scheduler;
pub mod scoring;
pub mod store;
pub mod surface;
pub mod web; // always compiled, like the rest of the wasm glue

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_logging")]
    logging::init_logging(None);
}

pub use audio::{AudioOut, Envelope, SilentAudio, Tone};
pub use clock::{DayClock, FixedDayClock, LocalDayClock};
pub use config::{GameRules, Progression, PromptMode, Timing};
pub use error::{AudioError, ConfigError, StoreError};
pub use haptics::{Haptics, NoHaptics};
pub use machine::{Command, Engine, Phase, Ports};
pub use records::{BestRecord, RecordBreak, Records, Settings};
pub use scheduler::{TimerEvent, TimerId, TimerKind, Timers, VirtualTimers};
pub use store::{KeyValueStore, MemoryStore};
pub use surface::{Action, Flash, Prompt, Scoreboard, StatusTone, Surface};
