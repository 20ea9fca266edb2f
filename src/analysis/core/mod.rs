//! Core analysis types: configuration, errors, identifiers, languages, records.

pub mod config;
pub mod errors;
pub mod ids;
pub mod language;
pub mod record;

pub use config::{
    AssistantConfig, FallbackConfig, GenerationConfig, QualityConfig, StorageConfig, SummaryConfig,
    TitleConfig,
};
pub use errors::{AnalysisError, AnalysisResult};
pub use ids::{AnalysisId, ConversationId, UserId};
pub use language::{Language, LanguageProfile};
pub use record::{
    AnalysisRecord, AnalysisStats, AnalysisStatus, ConversationRecord, ConversationTitle,
    UserRecord,
};
