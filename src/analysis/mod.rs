//! Conversation analysis subsystem for the Lisan assistant.
//!
//! This module turns bilingual dialogue transcripts into titles and
//! summaries, organized into:
//! - `core`: Configuration, errors, IDs, languages, and record models
//! - `transcript`: Dialogue lines and per-language transcript extraction
//! - `generation`: Backend abstraction, Ollama implementation, and the
//!   (task, language) registry with its fallback-chain bootstrap
//! - `quality`: Accept/reject heuristics and the deterministic keyword
//!   fallback
//! - `storage`: Conversation, analysis, and user stores with `SQLite`
//!   backends
//! - `pipeline`: Summary and title orchestration
//! - `adapters`: Host-application helpers (tracing bootstrap)

pub mod adapters;
pub mod core;
pub mod generation;
pub mod pipeline;
pub mod quality;
pub mod storage;
pub mod transcript;

// Re-export commonly used types for convenience
pub use self::core::{
    AnalysisError, AnalysisId, AnalysisRecord, AnalysisResult, AnalysisStats, AnalysisStatus,
    AssistantConfig, ConversationId, ConversationRecord, ConversationTitle, FallbackConfig,
    GenerationConfig, Language, LanguageProfile, QualityConfig, StorageConfig, SummaryConfig,
    TitleConfig, UserId, UserRecord,
};
pub use adapters::init_tracing;
pub use generation::{
    BackendBinding, BackendMethod, BackendRegistry, GenerateFuture, GenerationConstraints,
    GenerationRequest, GenerationTask, OllamaBackend, TextBackend,
};
pub use pipeline::{AnalysisInput, AnalysisService, SummaryPipeline, TitlePipeline};
pub use quality::{truncate_at_word_boundary, truncate_to_chars, KeywordFallback, QualityGate};
pub use storage::{
    AnalysisStore, AnalysisStores, ConversationStore, SqliteAnalysisStore,
    SqliteConversationStore, SqliteUserStore, StoreFuture, UserStore,
};
pub use transcript::{DialogueLine, DialogueRole, Transcript, TranscriptBuilder};
