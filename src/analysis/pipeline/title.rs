//! Title pipeline: short per-language topic titles for one conversation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analysis::core::config::{AssistantConfig, TitleConfig};
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::ids::{ConversationId, UserId};
use crate::analysis::core::language::Language;
use crate::analysis::core::record::ConversationTitle;
use crate::analysis::generation::backend::{
    GenerationConstraints, GenerationRequest, GenerationTask,
};
use crate::analysis::generation::registry::BackendRegistry;
use crate::analysis::quality::gate::QualityGate;
use crate::analysis::quality::keyword::KeywordFallback;
use crate::analysis::quality::truncate::{truncate_at_word_boundary, truncate_to_chars};
use crate::analysis::storage::{AnalysisStores, ConversationStore};
use crate::analysis::transcript::line::DialogueLine;

/// Orchestrates per-language title generation with quality gating and
/// keyword fallback, and persists both titles in one update.
pub struct TitlePipeline {
    registry: Arc<BackendRegistry>,
    stores: AnalysisStores,
    gate: QualityGate,
    fallback: KeywordFallback,
    config: TitleConfig,
}

impl TitlePipeline {
    /// Create a title pipeline from shared dependencies.
    ///
    /// # Errors
    /// Returns an error if the quality gate or fallback patterns fail to
    /// compile.
    pub fn new(
        config: &AssistantConfig,
        registry: Arc<BackendRegistry>,
        stores: AnalysisStores,
    ) -> AnalysisResult<Self> {
        Ok(Self {
            registry,
            gate: QualityGate::new(config.quality.clone())?,
            fallback: KeywordFallback::new(config.fallback.clone())?,
            config: config.title.clone(),
            stores,
        })
    }

    /// Regenerate both language titles from the conversation's recent lines.
    ///
    /// The two language branches run independently: one backend failing or
    /// producing rejected output only sends that language down the keyword
    /// fallback, never the other. Both fields are persisted atomically.
    ///
    /// # Errors
    /// Returns [`AnalysisError::NotFound`] if the conversation does not
    /// exist or is not owned by the caller, and
    /// [`AnalysisError::NoContent`] if it has no lines.
    pub async fn regenerate_title(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> AnalysisResult<ConversationTitle> {
        let conversation = self
            .stores
            .conversations
            .get_conversation(conversation_id, user_id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound(format!("conversation {conversation_id}")))?;

        let mut lines = self
            .stores
            .conversations
            .load_recent_lines(conversation_id, self.config.recent_lines)
            .await?;
        if lines.is_empty() {
            return Err(AnalysisError::NoContent);
        }
        // Newest-first from storage; titles read better chronologically.
        lines.reverse();

        let (title_en, title_ar) = tokio::join!(
            self.title_for(Language::En, &lines),
            self.title_for(Language::Ar, &lines)
        );
        let title = ConversationTitle { title_en, title_ar };

        self.stores
            .conversations
            .update_titles(conversation_id, title.clone())
            .await?;
        info!("Regenerated titles for conversation {}", conversation.id);

        Ok(title)
    }

    /// Produce one language's title, absorbing every generation problem.
    async fn title_for(&self, language: Language, lines: &[DialogueLine]) -> String {
        let texts: Vec<String> = lines
            .iter()
            .map(|line| line.text(language).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        let request = GenerationRequest {
            text: truncate_to_chars(&texts.join("\n"), self.config.max_input_chars),
            language,
            task: GenerationTask::Title,
            constraints: GenerationConstraints {
                max_output_chars: self.config.max_output_chars,
                min_output_chars: 1,
            },
        };

        let candidate = match self
            .registry
            .generate(GenerationTask::Title, language, request)
            .await
        {
            Ok(raw) => {
                let (sanitized, accepted) = self.gate.check(GenerationTask::Title, &raw);
                if accepted {
                    Some(sanitized)
                } else {
                    debug!("Title rejected by quality gate for {language}");
                    None
                }
            }
            Err(err) => {
                warn!("Title generation failed for {language}: {err}");
                None
            }
        };

        let title = candidate.unwrap_or_else(|| self.fallback.title(&texts, language));
        truncate_at_word_boundary(&title, self.config.max_display_chars)
    }
}
