//! Persisted record models for conversations, users, and analysis runs.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::core::ids::{AnalysisId, ConversationId, UserId};
use crate::analysis::core::language::Language;

/// Lifecycle state of an analysis run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Created but not yet picked up.
    Pending,
    /// Pipeline is running.
    Processing,
    /// Terminal: a summary was produced and persisted.
    Completed,
    /// Terminal: the run failed before producing a result.
    Failed,
}

impl AnalysisStatus {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(value.to_string()),
        }
    }
}

/// Aggregate counters computed over the analyzed transcripts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Number of conversations (or raw blocks) analyzed.
    pub total_conversations: u32,
    /// Number of user/assistant exchanges, counted by user messages.
    pub total_interactions: u32,
    /// Number of user messages.
    pub total_user_messages: u32,
    /// Number of assistant messages.
    pub total_bot_messages: u32,
}

/// Persisted outcome and audit trail of one summarization run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique record identifier.
    pub id: AnalysisId,
    /// Owning user.
    pub user_id: UserId,
    /// Language the summary was requested in.
    pub output_lang: Language,
    /// English summary text; empty unless `output_lang` is English.
    pub summary_en: String,
    /// Arabic summary text; empty unless `output_lang` is Arabic.
    pub summary_ar: String,
    /// Aggregate counters.
    pub stats: AnalysisStats,
    /// Lifecycle state; `Completed` and `Failed` are terminal.
    pub status: AnalysisStatus,
    /// Human-readable failure message; non-empty iff `status` is `Failed`.
    pub error_message: String,
    /// Conversations this analysis covered; empty for raw-text runs.
    pub conversation_ids: Vec<ConversationId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Create a fresh record in the `Processing` state.
    #[must_use]
    pub fn new(user_id: UserId, output_lang: Language) -> Self {
        Self {
            id: AnalysisId::new(),
            user_id,
            output_lang,
            summary_en: String::new(),
            summary_ar: String::new(),
            stats: AnalysisStats::default(),
            status: AnalysisStatus::Processing,
            error_message: String::new(),
            conversation_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Summary in the given language, falling back to the other one.
    #[must_use]
    pub fn summary(&self, language: Language) -> &str {
        let (preferred, other) = match language {
            Language::En => (&self.summary_en, &self.summary_ar),
            Language::Ar => (&self.summary_ar, &self.summary_en),
        };
        if preferred.is_empty() { other } else { preferred }
    }

    /// Write the summary into the language-scoped field.
    pub fn set_summary(&mut self, language: Language, text: String) {
        match language {
            Language::En => self.summary_en = text,
            Language::Ar => self.summary_ar = text,
        }
    }
}

/// Pair of language-scoped short titles owned by a conversation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConversationTitle {
    /// English title.
    pub title_en: String,
    /// Arabic title.
    pub title_ar: String,
}

/// A stored conversation row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Owning user.
    pub user_id: UserId,
    /// Current titles, overwritten in place by title regeneration.
    pub title: ConversationTitle,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A stored user row, limited to the fields the analysis path touches.
///
/// The last-summary fields are a write-through cache of the most recent
/// completed analysis, not the authoritative copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Cached English summary from the latest completed analysis.
    pub last_summary_en: String,
    /// Cached Arabic summary from the latest completed analysis.
    pub last_summary_ar: String,
    /// When the cache was last refreshed.
    pub last_analysis_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_processing() {
        let record = AnalysisRecord::new(UserId::new(1), Language::En);
        assert_eq!(record.status, AnalysisStatus::Processing);
        assert!(record.error_message.is_empty());
        assert!(record.summary_en.is_empty());
    }

    #[test]
    fn test_summary_prefers_requested_language() {
        let mut record = AnalysisRecord::new(UserId::new(1), Language::Ar);
        record.set_summary(Language::Ar, "ملخص".to_string());
        assert_eq!(record.summary(Language::Ar), "ملخص");
        // The other language falls back to whatever exists.
        assert_eq!(record.summary(Language::En), "ملخص");
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            AnalysisStatus::Pending,
            AnalysisStatus::Processing,
            AnalysisStatus::Completed,
            AnalysisStatus::Failed,
        ] {
            let parsed: AnalysisStatus = status.as_str().parse().unwrap();
            assert_eq!(status, parsed);
        }
    }
}
