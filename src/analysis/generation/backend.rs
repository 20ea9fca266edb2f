//! Generation backend abstraction.

use core::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::analysis::core::errors::AnalysisResult;
use crate::analysis::core::language::Language;

/// What a backend is asked to produce.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTask {
    /// Long-form conversation summary.
    Summary,
    /// Short topic title.
    Title,
}

impl GenerationTask {
    /// Both tasks, in registry order.
    pub const ALL: [Self; 2] = [Self::Summary, Self::Title];

    /// Stable string form for logs and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Advisory output-shape hints passed to a backend.
///
/// Backends apply what they can; hard guarantees (minimum length in
/// particular) come from the quality gate downstream, not from here.
#[derive(Clone, Copy, Debug)]
pub struct GenerationConstraints {
    /// Ceiling on output length, enforced by truncation.
    pub max_output_chars: usize,
    /// Requested floor on output length.
    pub min_output_chars: usize,
}

/// One generation call: the text to work on and how to treat it.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    /// Input text, already capped to the pipeline's character budget.
    pub text: String,
    /// Target output language.
    pub language: Language,
    /// What to produce.
    pub task: GenerationTask,
    /// Advisory output hints.
    pub constraints: GenerationConstraints,
}

/// Boxed future type for backend generation calls.
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = AnalysisResult<String>> + Send + 'a>>;

/// An opaque text-generation capability for one resolved model.
pub trait TextBackend: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Produce text for the request.
    ///
    /// # Errors
    /// Returns an error on any backend-level failure (model load, transport,
    /// malformed output). Callers recover through the fallback chain.
    fn generate(&self, request: GenerationRequest) -> GenerateFuture<'_>;
}
