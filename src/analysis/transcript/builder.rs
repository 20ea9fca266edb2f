//! Transcript extraction in the requested language.

use std::sync::Arc;

use tracing::debug;

use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::ids::{ConversationId, UserId};
use crate::analysis::core::language::Language;
use crate::analysis::storage::ConversationStore;
use crate::analysis::transcript::line::DialogueRole;

/// Chronological role-tagged dialogue text for one conversation, in one
/// language. Immutable once built; derived per request, never persisted.
#[derive(Clone, Debug)]
pub struct Transcript {
    /// Conversation the transcript was extracted from.
    pub conversation_id: ConversationId,
    /// Language the line texts were selected in.
    pub language: Language,
    /// Ordered `(role, text)` pairs.
    pub lines: Vec<(DialogueRole, String)>,
}

impl Transcript {
    /// Render the transcript as a role-tagged text block.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();
        for (role, text) in &self.lines {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(role.prefix(self.language));
            output.push(' ');
            output.push_str(text);
        }
        output
    }
}

/// Extracts conversations into per-language transcripts.
pub struct TranscriptBuilder {
    store: Arc<dyn ConversationStore>,
}

impl TranscriptBuilder {
    /// Create a builder over the given conversation store.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Build one transcript per conversation that has usable content.
    ///
    /// Lines are ordered ascending by creation time and carry the text
    /// already stored in the target language; lines empty in that language
    /// are dropped, and conversations left with no line are skipped.
    /// Conversations that do not exist or are not owned by `user_id` are
    /// skipped silently.
    ///
    /// # Errors
    /// Returns [`AnalysisError::NoExtractableContent`] when no requested
    /// conversation yields a single usable line, and propagates storage
    /// failures.
    pub async fn build(
        &self,
        conversation_ids: &[ConversationId],
        user_id: UserId,
        language: Language,
    ) -> AnalysisResult<Vec<Transcript>> {
        let mut transcripts = Vec::new();

        for &conversation_id in conversation_ids {
            if self
                .store
                .get_conversation(conversation_id, user_id)
                .await?
                .is_none()
            {
                debug!("Skipping unknown or foreign conversation {conversation_id}");
                continue;
            }

            let lines = self.store.list_lines(conversation_id).await?;
            let kept: Vec<(DialogueRole, String)> = lines
                .into_iter()
                .filter_map(|line| {
                    let text = line.text(language).trim();
                    if text.is_empty() {
                        None
                    } else {
                        Some((line.role, text.to_string()))
                    }
                })
                .collect();

            if kept.is_empty() {
                continue;
            }

            transcripts.push(Transcript {
                conversation_id,
                language,
                lines: kept,
            });
        }

        if transcripts.is_empty() {
            return Err(AnalysisError::NoExtractableContent);
        }

        Ok(transcripts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::core::config::StorageConfig;
    use crate::analysis::storage::SqliteConversationStore;
    use crate::analysis::transcript::line::DialogueLine;

    async fn temp_store() -> Arc<SqliteConversationStore> {
        let mut config = StorageConfig::default();
        config.sqlite_path =
            std::env::temp_dir().join(format!("lisan-builder-{}.sqlite", uuid::Uuid::new_v4()));
        Arc::new(SqliteConversationStore::new(&config).await.unwrap())
    }

    #[tokio::test]
    async fn test_build_selects_language_and_drops_empty_lines() {
        let store = temp_store().await;
        let user = UserId::new(1);
        let conversation = store.create_conversation(user).await.unwrap();
        // First line has no Arabic rendition yet.
        store
            .append_line(DialogueLine::user(conversation.id, "Hello", ""))
            .await
            .unwrap();
        store
            .append_line(DialogueLine::bot(conversation.id, "Hi", "أهلا"))
            .await
            .unwrap();

        let builder = TranscriptBuilder::new(store.clone());

        let arabic = builder
            .build(&[conversation.id], user, Language::Ar)
            .await
            .unwrap();
        assert_eq!(arabic.len(), 1);
        assert_eq!(arabic[0].lines, vec![(DialogueRole::Bot, "أهلا".to_string())]);

        let english = builder
            .build(&[conversation.id], user, Language::En)
            .await
            .unwrap();
        assert_eq!(english[0].render(), "User: Hello\nBot: Hi");
    }

    #[tokio::test]
    async fn test_build_with_no_usable_line_fails() {
        let store = temp_store().await;
        let user = UserId::new(1);
        let conversation = store.create_conversation(user).await.unwrap();
        store
            .append_line(DialogueLine::user(conversation.id, "", ""))
            .await
            .unwrap();

        let builder = TranscriptBuilder::new(store);
        let err = builder
            .build(&[conversation.id], user, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoExtractableContent));
    }

    #[tokio::test]
    async fn test_foreign_conversations_are_skipped() {
        let store = temp_store().await;
        let owner = UserId::new(1);
        let stranger = UserId::new(2);
        let conversation = store.create_conversation(owner).await.unwrap();
        store
            .append_line(DialogueLine::user(conversation.id, "Hello", "مرحبا"))
            .await
            .unwrap();

        let builder = TranscriptBuilder::new(store);
        let err = builder
            .build(&[conversation.id], stranger, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoExtractableContent));
    }

    #[test]
    fn test_render_prefixes_roles() {
        let transcript = Transcript {
            conversation_id: ConversationId::new(1),
            language: Language::En,
            lines: vec![
                (DialogueRole::User, "Hello".to_string()),
                (DialogueRole::Bot, "Hi there!".to_string()),
            ],
        };

        assert_eq!(transcript.render(), "User: Hello\nBot: Hi there!");
    }

    #[test]
    fn test_render_arabic_prefixes() {
        let transcript = Transcript {
            conversation_id: ConversationId::new(1),
            language: Language::Ar,
            lines: vec![(DialogueRole::User, "مرحبا".to_string())],
        };

        assert_eq!(transcript.render(), "المستخدم: مرحبا");
    }

    #[test]
    fn test_line_text_feeds_transcript() {
        let line = DialogueLine::user(ConversationId::new(7), "How do I cook rice?", "");
        assert!(line.text(Language::Ar).trim().is_empty());
        assert_eq!(line.text(Language::En), "How do I cook rice?");
    }
}
