//! Language registry for the bilingual analysis pipeline.
//!
//! Every language-dependent behavior — role prefixes, tokenization, stop
//! words, conjunction grammar, sentence templates, generation instructions —
//! lives in a static [`LanguageProfile`] looked up through [`Language`].
//! Adding a language means adding a profile, not new branches.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output language supported by the assistant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// Arabic.
    Ar,
}

impl Language {
    /// All supported languages, in persistence order.
    pub const ALL: [Self; 2] = [Self::En, Self::Ar];

    /// Stable ISO 639-1 code for storage and APIs.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Static behavior profile for this language.
    #[must_use]
    pub fn profile(self) -> &'static LanguageProfile {
        match self {
            Self::En => &EN_PROFILE,
            Self::Ar => &AR_PROFILE,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "en" => Ok(Self::En),
            "ar" => Ok(Self::Ar),
            _ => Err(value.to_string()),
        }
    }
}

/// Static, data-driven description of one language's behavior.
pub struct LanguageProfile {
    /// Role tag prepended to user lines in rendered transcripts.
    pub user_prefix: &'static str,
    /// Role tag prepended to assistant lines in rendered transcripts.
    pub bot_prefix: &'static str,
    /// Regex matching one keyword candidate in this script.
    pub token_pattern: &'static str,
    /// Function words excluded from keyword ranking.
    pub stop_words: &'static [&'static str],
    /// Content-free nouns excluded from keyword ranking.
    pub generic_words: &'static [&'static str],
    /// Separator between list items before the final conjunction.
    pub list_separator: &'static str,
    /// Conjunction inserted before the last list item.
    pub conjunction: &'static str,
    /// Text placed before the keyword clause in a fallback summary.
    pub summary_prefix: &'static str,
    /// Text placed after the keyword clause in a fallback summary.
    pub summary_suffix: &'static str,
    /// Fallback summary when no keyword survives filtering.
    pub generic_summary: &'static str,
    /// Fallback title when no keyword survives filtering.
    pub generic_title: &'static str,
    /// Whether fallback titles get an uppercased first letter.
    pub capitalize_title: bool,
    /// Generation-boilerplate prefixes stripped from model output.
    pub boilerplate_prefixes: &'static [&'static str],
    /// Instruction prepended to the text when asking a backend for a summary.
    pub summary_instruction: &'static str,
    /// Instruction prepended to the text when asking a backend for a title.
    pub title_instruction: &'static str,
}

const EN_PROFILE: LanguageProfile = LanguageProfile {
    user_prefix: "User:",
    bot_prefix: "Bot:",
    token_pattern: r"[A-Za-z]{3,}",
    stop_words: &[
        "the", "and", "are", "was", "were", "been", "have", "has", "had", "does", "did", "will",
        "would", "could", "should", "may", "might", "must", "shall", "can", "need", "its", "this",
        "that", "these", "those", "you", "your", "she", "him", "her", "his", "they", "them",
        "their", "what", "which", "who", "whom", "when", "where", "why", "how", "all", "each",
        "every", "both", "few", "more", "most", "other", "some", "such", "not", "nor", "only",
        "own", "same", "than", "too", "very", "just", "also", "now", "here", "there", "then",
        "once", "while", "about", "into", "through", "during", "before", "after", "above",
        "below", "between", "under", "again", "further", "any", "out", "off", "over", "with",
        "for", "from", "but", "yes", "please", "tell", "want", "know", "get", "got", "make",
        "like", "one", "two", "way", "day", "today", "ask", "asked", "say", "said",
    ],
    generic_words: &[
        "thing",
        "things",
        "stuff",
        "something",
        "anything",
        "everything",
        "someone",
        "anyone",
        "topic",
        "topics",
    ],
    list_separator: ", ",
    conjunction: " and ",
    summary_prefix: "The user spoke mainly about ",
    summary_suffix: ".",
    generic_summary: "The user spoke about several topics.",
    generic_title: "Conversation",
    capitalize_title: true,
    boilerplate_prefixes: &["summary:", "analysis:", "title:", "topic:", "answer:"],
    summary_instruction: "Summarize the following conversation in one short, simple paragraph for the user:",
    title_instruction: "Write a very short title, a few words at most, for the following conversation:",
};

const AR_PROFILE: LanguageProfile = LanguageProfile {
    user_prefix: "المستخدم:",
    bot_prefix: "بوت:",
    token_pattern: r"\p{Arabic}{2,}",
    stop_words: &[
        "في", "من", "على", "إلى", "الى", "عن", "أن", "ان", "إن", "هذا", "هذه", "ذلك", "تلك",
        "التي", "الذي", "الذين", "هل", "ما", "ماذا", "لماذا", "كيف", "أين", "اين", "متى", "هو",
        "هي", "أنا", "انا", "أنت", "انت", "نحن", "هم", "مع", "كان", "كانت", "يكون", "تكون", "لا",
        "لم", "لن", "نعم", "ثم", "أو", "او", "لكن", "قد", "كل", "بعض", "غير", "بين", "عند",
        "عندما", "منذ", "حتى", "إذا", "اذا", "لأن", "لان", "أريد", "اريد", "يمكن", "يجب",
    ],
    generic_words: &["شيء", "أشياء", "اشياء", "أمر", "امر", "أمور", "امور", "موضوع", "مواضيع"],
    list_separator: "، ",
    conjunction: " و",
    summary_prefix: "تحدث المستخدم بشكل أساسي عن ",
    summary_suffix: ".",
    generic_summary: "المستخدم تحدث عن مواضيع متعددة.",
    generic_title: "محادثة",
    capitalize_title: false,
    boilerplate_prefixes: &["الملخص:", "ملخص:", "العنوان:", "عنوان:", "التحليل:", "تحليل:"],
    summary_instruction: "لخص المحتوى التالي بطريقة مبسطة ومفهومة للمستخدم:",
    title_instruction: "اكتب عنوانا قصيرا جدا من بضع كلمات لهذه المحادثة:",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_roundtrip() {
        for language in Language::ALL {
            let parsed: Language = language.code().parse().unwrap();
            assert_eq!(language, parsed);
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_profiles_are_complete() {
        for language in Language::ALL {
            let profile = language.profile();
            assert!(!profile.user_prefix.is_empty());
            assert!(!profile.bot_prefix.is_empty());
            assert!(!profile.stop_words.is_empty());
            assert!(!profile.generic_summary.is_empty());
            assert!(!profile.generic_title.is_empty());
        }
    }
}
