// ─────────────────────────────────────────────────────────────────────
// Plumbline: Verification Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Plumbline failures.
///
/// Data-quality problems in a layout, design or render are never
/// surfaced through this type; they are reported inside the returned
/// verdicts. `Err` is reserved for caller-contract violations.
#[derive(Error, Debug)]
pub enum PlumblineError {
    /// Invalid policy configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Image bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Image source could not be read or has an unusable surface.
    #[error("image error: {0}")]
    Image(String),

    /// Malformed JSON at an API boundary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A text pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(String),
}

pub type PlumblineResult<T> = Result<T, PlumblineError>;
