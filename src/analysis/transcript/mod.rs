//! Transcript extraction and dialogue line models.

pub mod builder;
pub mod line;

pub use builder::{Transcript, TranscriptBuilder};
pub use line::{DialogueLine, DialogueRole};
