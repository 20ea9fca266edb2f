//! Quality gating and deterministic fallback generation.

pub mod gate;
pub mod keyword;
pub mod truncate;

pub use gate::QualityGate;
pub use keyword::KeywordFallback;
pub use truncate::{truncate_at_word_boundary, truncate_to_chars};
