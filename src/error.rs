//! Error type shared by the library modules.
//!
//! Markup problems are almost never errors: bad parameters fall back to
//! defaults and unknown tags are dropped. What remains here is the
//! per-paragraph expansion guard plus argument checks at the public API.

/// Errors reported by the markup engine.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("markup expansion exceeded {limit} characters; check for recursive definitions")]
    ExpansionLimit { limit: usize },

    #[error("invalid tag name: {0:?}")]
    InvalidTagName(String),

    #[error("invalid range {start}..{end} for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("range endpoint {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("invalid tightness range: min {min} must be positive and not exceed max {max}")]
    InvalidTightness { min: f32, max: f32 },

    #[error("invalid minimum scale {0}: must be in (0, 1]")]
    InvalidScale(f32),

    #[error("expansion limit must be at least 1")]
    InvalidExpansionLimit,

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarkupError>;
