//! Dialogue line model for stored conversations.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::core::ids::ConversationId;
use crate::analysis::core::language::Language;

/// Speaker of a dialogue line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueRole {
    /// Human input.
    User,
    /// Assistant response.
    Bot,
}

impl DialogueRole {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

    /// Role tag rendered in the given language's script.
    #[must_use]
    pub fn prefix(self, language: Language) -> &'static str {
        let profile = language.profile();
        match self {
            Self::User => profile.user_prefix,
            Self::Bot => profile.bot_prefix,
        }
    }
}

impl fmt::Display for DialogueRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DialogueRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "bot" => Ok(Self::Bot),
            _ => Err(value.to_string()),
        }
    }
}

/// A single stored dialogue line with its translations.
///
/// Both language fields are written on the ingest path (translation happens
/// there, never at read time); the analysis path only selects one of them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Conversation this line belongs to.
    pub conversation_id: ConversationId,
    /// Speaker role.
    pub role: DialogueRole,
    /// English rendition of the line.
    pub text_en: String,
    /// Arabic rendition of the line.
    pub text_ar: String,
    /// Timestamp for chronological ordering.
    pub created_at: DateTime<Utc>,
}

impl DialogueLine {
    /// Build a user line.
    #[must_use]
    pub fn user(
        conversation_id: ConversationId,
        text_en: impl Into<String>,
        text_ar: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            role: DialogueRole::User,
            text_en: text_en.into(),
            text_ar: text_ar.into(),
            created_at: Utc::now(),
        }
    }

    /// Build an assistant line.
    #[must_use]
    pub fn bot(
        conversation_id: ConversationId,
        text_en: impl Into<String>,
        text_ar: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            role: DialogueRole::Bot,
            text_en: text_en.into(),
            text_ar: text_ar.into(),
            created_at: Utc::now(),
        }
    }

    /// Text stored for the given language.
    #[must_use]
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::En => &self.text_en,
            Language::Ar => &self.text_ar,
        }
    }
}
