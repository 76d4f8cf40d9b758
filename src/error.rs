//! Error types for the environment boundaries.
//!
//! None of these is fatal: the machine logs and degrades (in-memory defaults,
//! visual-only playback) instead of propagating them to the player.

use thiserror::Error;

/// Failures of the persistent key/value store (private browsing, quota, no window).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage access failed for '{key}': {message}")]
    Access { key: String, message: String },
}

/// Failures of the audio boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// No context yet (locked behind the start gesture) or no Web Audio support.
    #[error("audio output unavailable")]
    Unavailable,

    #[error("audio node error: {0}")]
    Node(String),
}

/// Rejected configuration override.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },
}
