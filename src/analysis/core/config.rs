//! Configuration for the analysis subsystem.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::language::Language;
use crate::analysis::generation::backend::GenerationTask;

/// Top-level configuration for the analysis pipelines.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Generation backend settings.
    pub generation: GenerationConfig,
    /// Quality gate thresholds.
    pub quality: QualityConfig,
    /// Keyword fallback settings.
    pub fallback: FallbackConfig,
    /// Summary pipeline settings.
    pub summary: SummaryConfig,
    /// Title pipeline settings.
    pub title: TitleConfig,
    /// Storage settings.
    pub storage: StorageConfig,
}

impl AssistantConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.generation.general_model.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "generation.general_model must not be empty".to_string(),
            ));
        }

        if self.generation.timeout_seconds == 0 {
            return Err(AnalysisError::InvalidConfig(
                "generation.timeout_seconds must be > 0".to_string(),
            ));
        }

        if let Some(base_url) = &self.generation.base_url {
            Url::parse(base_url)?;
        }

        if !(0.0..=1.0).contains(&self.quality.repetition_threshold) {
            return Err(AnalysisError::InvalidConfig(
                "quality.repetition_threshold must be within 0.0..=1.0".to_string(),
            ));
        }

        if self.quality.min_title_chars == 0 || self.quality.min_summary_chars == 0 {
            return Err(AnalysisError::InvalidConfig(
                "quality minimum lengths must be > 0".to_string(),
            ));
        }

        if self.fallback.summary_keywords == 0 || self.fallback.title_keywords == 0 {
            return Err(AnalysisError::InvalidConfig(
                "fallback keyword counts must be > 0".to_string(),
            ));
        }

        if self.summary.max_input_chars == 0 {
            return Err(AnalysisError::InvalidConfig(
                "summary.max_input_chars must be > 0".to_string(),
            ));
        }

        if self.title.recent_lines == 0 {
            return Err(AnalysisError::InvalidConfig(
                "title.recent_lines must be > 0".to_string(),
            ));
        }

        if self.title.max_display_chars == 0 || self.title.max_input_chars == 0 {
            return Err(AnalysisError::InvalidConfig(
                "title character budgets must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Generation backend settings.
///
/// Each (task, language) slot resolves an ordered candidate list: the
/// specialized model for that slot first, when configured, then the general
/// multilingual model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Optional custom base URL for the Ollama runtime.
    pub base_url: Option<String>,
    /// Temperature for generation.
    pub temperature: f64,
    /// Wall-clock budget for a single generation call.
    pub timeout_seconds: u64,
    /// Multilingual model used when no specialized model is configured.
    pub general_model: String,
    /// Specialized English summarization model.
    pub summary_en_model: Option<String>,
    /// Specialized Arabic summarization model.
    pub summary_ar_model: Option<String>,
    /// Specialized English title model.
    pub title_en_model: Option<String>,
    /// Specialized Arabic title model.
    pub title_ar_model: Option<String>,
}

impl GenerationConfig {
    /// Specialized model configured for a (task, language) slot, if any.
    #[must_use]
    pub fn specialized_model(&self, task: GenerationTask, language: Language) -> Option<&str> {
        let slot = match (task, language) {
            (GenerationTask::Summary, Language::En) => &self.summary_en_model,
            (GenerationTask::Summary, Language::Ar) => &self.summary_ar_model,
            (GenerationTask::Title, Language::En) => &self.title_en_model,
            (GenerationTask::Title, Language::Ar) => &self.title_ar_model,
        };
        slot.as_deref()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            temperature: 0.3,
            timeout_seconds: 45,
            general_model: "ministral-3:8b-instruct-2512-q8_0".to_string(),
            summary_en_model: None,
            summary_ar_model: None,
            title_en_model: None,
            title_ar_model: None,
        }
    }
}

/// Quality gate thresholds.
///
/// The repetition threshold and the minimum lengths are empirically chosen
/// and deliberately tunable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Minimum accepted summary length in characters, after sanitization.
    pub min_summary_chars: usize,
    /// Minimum accepted title length in characters, after sanitization.
    pub min_title_chars: usize,
    /// Reject when `unique_bigrams / total_bigrams` falls below this ratio.
    pub repetition_threshold: f64,
    /// Repetition is only judged once this many tokens exist.
    pub min_repetition_tokens: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_summary_chars: 10,
            min_title_chars: 2,
            repetition_threshold: 0.7,
            min_repetition_tokens: 3,
        }
    }
}

/// Keyword fallback settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Keywords embedded in a fallback summary sentence.
    pub summary_keywords: usize,
    /// Keywords joined into a fallback title.
    pub title_keywords: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            summary_keywords: 4,
            title_keywords: 3,
        }
    }
}

/// Summary pipeline settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Character budget applied to the joined user messages before generation.
    pub max_input_chars: usize,
    /// Advisory ceiling on generated summary length.
    pub max_output_chars: usize,
    /// Advisory floor on generated summary length.
    pub min_output_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 1024,
            max_output_chars: 700,
            min_output_chars: 40,
        }
    }
}

/// Title pipeline settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TitleConfig {
    /// How many of the most recent lines feed title generation.
    pub recent_lines: usize,
    /// Character budget applied to the joined line texts before generation.
    pub max_input_chars: usize,
    /// Advisory ceiling on generated title length.
    pub max_output_chars: usize,
    /// Display ceiling; titles are cut at a word boundary to fit.
    pub max_display_chars: usize,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            recent_lines: 6,
            max_input_chars: 500,
            max_output_chars: 80,
            max_display_chars: 60,
        }
    }
}

/// Storage configuration for analysis data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Conversation table name.
    pub conversation_table: String,
    /// Conversation line table name.
    pub line_table: String,
    /// Analysis record table name.
    pub analysis_table: String,
    /// User table name.
    pub user_table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("assistant.sqlite"),
            conversation_table: "conversations".to_string(),
            line_table: "conversation_lines".to_string(),
            analysis_table: "conversation_analyses".to_string(),
            user_table: "users".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AssistantConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = AssistantConfig::default();
        config.generation.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let mut config = AssistantConfig::default();
        config.generation.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let mut config = AssistantConfig::default();
        config.quality.repetition_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_specialized_model_lookup() {
        let mut config = GenerationConfig::default();
        config.summary_ar_model = Some("mt5-xlsum".to_string());
        assert_eq!(
            config.specialized_model(GenerationTask::Summary, Language::Ar),
            Some("mt5-xlsum")
        );
        assert_eq!(
            config.specialized_model(GenerationTask::Title, Language::En),
            None
        );
    }
}
