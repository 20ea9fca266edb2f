//! Summary pipeline: transcripts in, audited analysis record out.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::analysis::core::config::{AssistantConfig, SummaryConfig};
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::ids::{ConversationId, UserId};
use crate::analysis::core::language::Language;
use crate::analysis::core::record::{AnalysisRecord, AnalysisStats, AnalysisStatus};
use crate::analysis::generation::backend::{
    GenerationConstraints, GenerationRequest, GenerationTask,
};
use crate::analysis::generation::registry::BackendRegistry;
use crate::analysis::quality::gate::QualityGate;
use crate::analysis::quality::keyword::KeywordFallback;
use crate::analysis::quality::truncate::truncate_to_chars;
use crate::analysis::storage::{AnalysisStore, AnalysisStores, UserStore};
use crate::analysis::transcript::builder::TranscriptBuilder;

/// What a summary run works on. The two modes are mutually exclusive.
#[derive(Clone, Debug)]
pub enum AnalysisInput {
    /// Stored conversations, extracted through the transcript builder.
    Conversations(Vec<ConversationId>),
    /// Raw dialogue blocks supplied directly by the caller.
    RawTexts(Vec<String>),
}

/// Orchestrates transcript extraction, generation, quality gating, fallback,
/// and persistence for long-form summaries.
pub struct SummaryPipeline {
    registry: Arc<BackendRegistry>,
    stores: AnalysisStores,
    builder: TranscriptBuilder,
    gate: QualityGate,
    fallback: KeywordFallback,
    config: SummaryConfig,
}

impl SummaryPipeline {
    /// Create a summary pipeline from shared dependencies.
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
            builder: TranscriptBuilder::new(stores.conversations.clone()),
            gate: QualityGate::new(config.quality.clone())?,
            fallback: KeywordFallback::new(config.fallback.clone())?,
            config: config.summary.clone(),
            stores,
        })
    }

    /// Analyze conversations or raw dialogue text into a persisted record.
    ///
    /// The record is created in the `Processing` state before any work
    /// happens and is the audit trail of the run: every failure is written
    /// into it before the error propagates. Generation-quality problems
    /// never fail a run — they are absorbed by the keyword fallback.
    ///
    /// # Errors
    /// Returns [`AnalysisError::NoExtractableContent`] when no user message
    /// can be extracted, and propagates storage failures.
    pub async fn analyze(
        &self,
        input: AnalysisInput,
        user_id: UserId,
        output_language: Language,
    ) -> AnalysisResult<AnalysisRecord> {
        let mut record = AnalysisRecord::new(user_id, output_language);
        if let AnalysisInput::Conversations(ids) = &input {
            record.conversation_ids = ids.clone();
        }
        self.stores.analyses.create(record.clone()).await?;

        match self.run(&mut record, input).await {
            Ok(()) => {
                info!("Completed analysis {} for user {}", record.id, user_id);
                Ok(record)
            }
            Err(err) => {
                record.status = AnalysisStatus::Failed;
                record.error_message = err.to_string();
                if let Err(store_err) = self.stores.analyses.update(record.clone()).await {
                    warn!("Failed to persist failed analysis {}: {store_err}", record.id);
                }
                Err(err)
            }
        }
    }

    async fn run(&self, record: &mut AnalysisRecord, input: AnalysisInput) -> AnalysisResult<()> {
        let language = record.output_lang;
        let blocks: Vec<String> = match input {
            AnalysisInput::Conversations(ids) => {
                let transcripts = self.builder.build(&ids, record.user_id, language).await?;
                transcripts.iter().map(|t| t.render()).collect()
            }
            AnalysisInput::RawTexts(texts) => texts,
        };

        let (user_messages, bot_messages) = partition_messages(&blocks, language);
        if user_messages.is_empty() {
            return Err(AnalysisError::NoExtractableContent);
        }

        record.stats = AnalysisStats {
            total_conversations: count_u32(blocks.len()),
            total_interactions: count_u32(user_messages.len()),
            total_user_messages: count_u32(user_messages.len()),
            total_bot_messages: count_u32(bot_messages.len()),
        };

        let summary = self.generate_summary(&user_messages, language).await;
        record.set_summary(language, summary);

        // Original field/stats write, then the user cache, then the terminal
        // state: a failure anywhere leaves the record short of `Completed`.
        self.stores.analyses.update(record.clone()).await?;
        self.stores
            .users
            .set_last_summary(
                record.user_id,
                language,
                record.summary(language).to_string(),
                Utc::now(),
            )
            .await?;

        record.status = AnalysisStatus::Completed;
        self.stores.analyses.update(record.clone()).await?;
        Ok(())
    }

    /// Generate a summary for the user messages, falling back to keywords.
    async fn generate_summary(&self, user_messages: &[String], language: Language) -> String {
        let text = truncate_to_chars(&user_messages.join(" "), self.config.max_input_chars);
        let request = GenerationRequest {
            text,
            language,
            task: GenerationTask::Summary,
            constraints: GenerationConstraints {
                max_output_chars: self.config.max_output_chars,
                min_output_chars: self.config.min_output_chars,
            },
        };

        match self
            .registry
            .generate(GenerationTask::Summary, language, request)
            .await
        {
            Ok(raw) => {
                let (sanitized, accepted) = self.gate.check(GenerationTask::Summary, &raw);
                if accepted {
                    return sanitized;
                }
                debug!("Summary rejected by quality gate, using keyword fallback");
            }
            Err(err) => {
                warn!("Summary generation failed for {language}: {err}");
            }
        }

        self.fallback.summary(user_messages, language)
    }
}

/// Partition role-tagged dialogue blocks into user and bot message lists.
///
/// Lines carrying the language's role prefix are routed by it; bare lines
/// count as user input, which is what raw caller-supplied messages are.
pub(crate) fn partition_messages(
    blocks: &[String],
    language: Language,
) -> (Vec<String>, Vec<String>) {
    let profile = language.profile();
    let mut user_messages = Vec::new();
    let mut bot_messages = Vec::new();

    for block in blocks {
        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix(profile.user_prefix) {
                user_messages.push(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix(profile.bot_prefix) {
                bot_messages.push(rest.trim().to_string());
            } else {
                user_messages.push(line.to_string());
            }
        }
    }

    (user_messages, bot_messages)
}

/// Saturating count conversion for the stats columns.
fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::analysis::core::config::StorageConfig;
    use crate::analysis::generation::backend::{GenerateFuture, TextBackend};
    use crate::analysis::generation::registry::{BackendBinding, BackendMethod};
    use crate::analysis::storage::ConversationStore;
    use crate::analysis::transcript::line::DialogueLine;

    struct FixedBackend(&'static str);

    impl TextBackend for FixedBackend {
        fn model_name(&self) -> &str {
            "fixed"
        }

        fn generate(&self, _request: GenerationRequest) -> GenerateFuture<'_> {
            let output = self.0.to_string();
            Box::pin(async move { Ok(output) })
        }
    }

    struct FailingBackend;

    impl TextBackend for FailingBackend {
        fn model_name(&self) -> &str {
            "failing"
        }

        fn generate(&self, _request: GenerationRequest) -> GenerateFuture<'_> {
            Box::pin(async move { Err(AnalysisError::Generation("model crashed".to_string())) })
        }
    }

    fn registry_with(backend: Arc<dyn TextBackend>) -> Arc<BackendRegistry> {
        let mut bindings = Vec::new();
        for task in GenerationTask::ALL {
            for language in Language::ALL {
                bindings.push((
                    (task, language),
                    BackendBinding::new(BackendMethod::General, backend.clone()),
                ));
            }
        }
        Arc::new(BackendRegistry::from_bindings(bindings, Duration::from_secs(5)))
    }

    async fn temp_stores(tag: &str) -> AnalysisStores {
        let mut config = StorageConfig::default();
        config.sqlite_path =
            std::env::temp_dir().join(format!("lisan-{tag}-{}.sqlite", uuid::Uuid::new_v4()));
        AnalysisStores::sqlite(&config).await.unwrap()
    }

    async fn pipeline_with(
        tag: &str,
        backend: Arc<dyn TextBackend>,
    ) -> (SummaryPipeline, AnalysisStores) {
        let stores = temp_stores(tag).await;
        let pipeline = SummaryPipeline::new(
            &AssistantConfig::default(),
            registry_with(backend),
            stores.clone(),
        )
        .unwrap();
        (pipeline, stores)
    }

    #[test]
    fn test_partition_routes_roles() {
        let blocks = vec!["User: hello\nBot: hi\nUser: help me".to_string()];
        let (user_messages, bot_messages) = partition_messages(&blocks, Language::En);
        assert_eq!(user_messages, vec!["hello", "help me"]);
        assert_eq!(bot_messages, vec!["hi"]);
    }

    #[test]
    fn test_partition_arabic_prefixes() {
        let blocks = vec!["المستخدم: مرحبا\nبوت: أهلا".to_string()];
        let (user_messages, bot_messages) = partition_messages(&blocks, Language::Ar);
        assert_eq!(user_messages, vec!["مرحبا"]);
        assert_eq!(bot_messages, vec!["أهلا"]);
    }

    #[test]
    fn test_partition_bare_lines_are_user_input() {
        let blocks = vec!["What is the weather today?".to_string()];
        let (user_messages, bot_messages) = partition_messages(&blocks, Language::En);
        assert_eq!(user_messages.len(), 1);
        assert!(bot_messages.is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_to_keywords() {
        let (pipeline, stores) = pipeline_with("fallback", Arc::new(FailingBackend)).await;
        let user = stores.users.create_user().await.unwrap();

        let record = pipeline
            .analyze(
                AnalysisInput::RawTexts(vec![
                    "What is the weather today?".to_string(),
                    "How do I cook rice?".to_string(),
                ]),
                user.id,
                Language::En,
            )
            .await
            .unwrap();

        assert_eq!(record.status, AnalysisStatus::Completed);
        assert!(record.summary_en.contains("weather"));
        assert!(record.summary_en.contains("rice"));
        assert_eq!(record.stats.total_user_messages, 2);
        assert_eq!(record.stats.total_bot_messages, 0);

        // Write-through cache carries the same summary.
        let cached = stores.users.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(cached.last_summary_en, record.summary_en);
        assert!(cached.last_analysis_at.is_some());
    }

    #[tokio::test]
    async fn test_repetitive_output_falls_back_to_keywords() {
        let (pipeline, stores) =
            pipeline_with("repetitive", Arc::new(FixedBackend("the the the the the"))).await;
        let user = stores.users.create_user().await.unwrap();

        let record = pipeline
            .analyze(
                AnalysisInput::RawTexts(vec!["Visa rules for summer travel".to_string()]),
                user.id,
                Language::En,
            )
            .await
            .unwrap();

        assert_eq!(record.status, AnalysisStatus::Completed);
        assert!(!record.summary_en.contains("the the"));
        assert!(record.summary_en.contains("visa"));
    }

    #[tokio::test]
    async fn test_accepted_output_is_kept() {
        let (pipeline, stores) = pipeline_with(
            "accepted",
            Arc::new(FixedBackend("Summary: The user planned a trip to the coast.")),
        )
        .await;
        let user = stores.users.create_user().await.unwrap();

        let record = pipeline
            .analyze(
                AnalysisInput::RawTexts(vec!["I want to plan a trip".to_string()]),
                user.id,
                Language::En,
            )
            .await
            .unwrap();

        // Boilerplate prefix is sanitized away, the rest survives the gate.
        assert_eq!(record.summary_en, "The user planned a trip to the coast.");
    }

    #[tokio::test]
    async fn test_empty_input_fails_and_is_audited() {
        let (pipeline, stores) = pipeline_with("empty", Arc::new(FailingBackend)).await;
        let user = stores.users.create_user().await.unwrap();

        let err = pipeline
            .analyze(AnalysisInput::RawTexts(Vec::new()), user.id, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoExtractableContent));

        // The failed run still left its audit record behind.
        assert_eq!(stores.analyses.count_for_user(user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_conversation_mode_counts_and_persists() {
        let (pipeline, stores) = pipeline_with(
            "conversations",
            Arc::new(FixedBackend("A detailed recap of the travel questions asked.")),
        )
        .await;
        let user = stores.users.create_user().await.unwrap();
        let conversation = stores.conversations.create_conversation(user.id).await.unwrap();

        for line in [
            DialogueLine::user(conversation.id, "Do I need a visa for Japan?", "هل أحتاج تأشيرة لليابان؟"),
            DialogueLine::bot(conversation.id, "Yes, for long stays.", "نعم، للإقامات الطويلة."),
            DialogueLine::user(conversation.id, "What about travel insurance?", "ماذا عن تأمين السفر؟"),
        ] {
            stores.conversations.append_line(line).await.unwrap();
        }

        let record = pipeline
            .analyze(
                AnalysisInput::Conversations(vec![conversation.id]),
                user.id,
                Language::En,
            )
            .await
            .unwrap();

        assert_eq!(record.status, AnalysisStatus::Completed);
        assert_eq!(record.stats.total_conversations, 1);
        assert_eq!(record.stats.total_user_messages, 2);
        assert_eq!(record.stats.total_bot_messages, 1);
        assert_eq!(record.conversation_ids, vec![conversation.id]);

        // The stored row reflects the terminal state.
        let stored = stores.analyses.get(record.id, user.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AnalysisStatus::Completed);
        assert_eq!(stored.summary_en, record.summary_en);
        assert_eq!(stored.conversation_ids, vec![conversation.id]);
    }

    #[tokio::test]
    async fn test_unknown_conversations_fail_with_no_content() {
        let (pipeline, stores) = pipeline_with("unknown", Arc::new(FailingBackend)).await;
        let user = stores.users.create_user().await.unwrap();

        let err = pipeline
            .analyze(
                AnalysisInput::Conversations(vec![ConversationId::new(999)]),
                user.id,
                Language::En,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoExtractableContent));
    }
}
