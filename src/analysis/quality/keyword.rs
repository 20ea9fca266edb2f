//! Deterministic keyword fallback for summaries and titles.
//!
//! When generation fails or its output is rejected, this path synthesizes a
//! result from the dialogue text alone: script-aware tokenization, stop-word
//! filtering, frequency ranking, and a per-language sentence template. It
//! never fails and never returns an empty string.

use std::collections::HashMap;

use regex::Regex;

use crate::analysis::core::config::FallbackConfig;
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::language::{Language, LanguageProfile};

/// Model-free summarizer and title synthesizer.
pub struct KeywordFallback {
    config: FallbackConfig,
    tokenizers: HashMap<Language, Regex>,
}

impl KeywordFallback {
    /// Create a fallback with compiled per-language tokenizers.
    ///
    /// # Errors
    /// Returns an error if a profile's token pattern fails to compile.
    pub fn new(config: FallbackConfig) -> AnalysisResult<Self> {
        let mut tokenizers = HashMap::new();
        for language in Language::ALL {
            let pattern = Regex::new(language.profile().token_pattern)
                .map_err(|err| AnalysisError::InvalidConfig(err.to_string()))?;
            tokenizers.insert(language, pattern);
        }

        Ok(Self { config, tokenizers })
    }

    /// Synthesize a summary sentence from the given messages.
    #[must_use]
    pub fn summary(&self, messages: &[String], language: Language) -> String {
        let profile = language.profile();
        let keywords = self.top_keywords(messages, language, self.config.summary_keywords);
        if keywords.is_empty() {
            return profile.generic_summary.to_string();
        }

        let mut sentence = String::from(profile.summary_prefix);
        sentence.push_str(&join_clause(&keywords, profile));
        sentence.push_str(profile.summary_suffix);
        sentence
    }

    /// Synthesize a short title phrase from the given messages.
    #[must_use]
    pub fn title(&self, messages: &[String], language: Language) -> String {
        let profile = language.profile();
        let keywords = self.top_keywords(messages, language, self.config.title_keywords);
        if keywords.is_empty() {
            return profile.generic_title.to_string();
        }

        let clause = join_clause(&keywords, profile);
        if profile.capitalize_title {
            capitalize_first(&clause)
        } else {
            clause
        }
    }

    /// Rank keyword candidates by frequency.
    ///
    /// Ties keep first-occurrence order, and each token appears once, so the
    /// output is fully determined by the input.
    fn top_keywords(
        &self,
        messages: &[String],
        language: Language,
        limit: usize,
    ) -> Vec<String> {
        let profile = language.profile();
        let Some(tokenizer) = self.tokenizers.get(&language) else {
            return Vec::new();
        };

        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for message in messages {
            for found in tokenizer.find_iter(message) {
                let token = found.as_str().to_lowercase();
                if profile.stop_words.contains(&token.as_str())
                    || profile.generic_words.contains(&token.as_str())
                {
                    continue;
                }

                if !counts.contains_key(&token) {
                    first_seen.push(token.clone());
                }
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        // Stable sort keeps first-occurrence order between equal counts.
        first_seen.sort_by(|a, b| {
            let count_a = counts.get(a).copied().unwrap_or(0);
            let count_b = counts.get(b).copied().unwrap_or(0);
            count_b.cmp(&count_a)
        });
        first_seen.truncate(limit);
        first_seen
    }
}

/// Join keywords into a natural-language clause using the profile grammar.
fn join_clause(keywords: &[String], profile: &LanguageProfile) -> String {
    match keywords {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first}{}{second}", profile.conjunction),
        [head @ .., last] => {
            let mut clause = head.join(profile.list_separator);
            clause.push_str(profile.conjunction);
            clause.push_str(last);
            clause
        }
    }
}

/// Uppercase the first character of a clause, leaving the rest untouched.
fn capitalize_first(clause: &str) -> String {
    let mut chars = clause.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> KeywordFallback {
        KeywordFallback::new(FallbackConfig::default()).unwrap()
    }

    fn messages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_summary_contains_topic_words() {
        let summary = fallback().summary(
            &messages(&["What is the weather today?", "How do I cook rice?"]),
            Language::En,
        );
        assert!(summary.contains("weather"));
        assert!(summary.contains("rice"));
        assert!(summary.starts_with("The user spoke mainly about "));
    }

    #[test]
    fn test_empty_input_yields_generic_fallback() {
        let fallback = fallback();
        assert_eq!(
            fallback.summary(&[], Language::En),
            "The user spoke about several topics."
        );
        assert_eq!(
            fallback.summary(&[], Language::Ar),
            "المستخدم تحدث عن مواضيع متعددة."
        );
        assert_eq!(fallback.title(&[], Language::En), "Conversation");
        assert_eq!(fallback.title(&[], Language::Ar), "محادثة");
    }

    #[test]
    fn test_stop_words_only_yields_generic_fallback() {
        let summary = fallback().summary(&messages(&["the and with from"]), Language::En);
        assert_eq!(summary, "The user spoke about several topics.");
    }

    #[test]
    fn test_output_is_deterministic() {
        let fallback = fallback();
        let input = messages(&[
            "Visa rules for travel",
            "travel insurance and visa fees",
            "booking flights",
        ]);
        let first = fallback.summary(&input, Language::En);
        for _ in 0..5 {
            assert_eq!(fallback.summary(&input, Language::En), first);
        }
    }

    #[test]
    fn test_frequency_order_with_first_occurrence_tiebreak() {
        let fallback = fallback();
        // "visa" occurs twice; "travel" and "insurance" once each, in order.
        let title = fallback.title(
            &messages(&["visa travel", "insurance visa"]),
            Language::En,
        );
        assert_eq!(title, "Visa, travel and insurance");
    }

    #[test]
    fn test_two_keywords_use_bare_conjunction() {
        let title = fallback().title(&messages(&["weather rice"]), Language::En);
        assert_eq!(title, "Weather and rice");
    }

    #[test]
    fn test_single_keyword_stands_alone() {
        let title = fallback().title(&messages(&["weather"]), Language::En);
        assert_eq!(title, "Weather");
    }

    #[test]
    fn test_arabic_clause_grammar() {
        let fallback = fallback();
        let title = fallback.title(&messages(&["الطقس الأرز"]), Language::Ar);
        assert_eq!(title, "الطقس والأرز");
    }

    #[test]
    fn test_arabic_summary_uses_arabic_template() {
        let summary = fallback().summary(&messages(&["سؤال عن الطقس"]), Language::Ar);
        assert!(summary.starts_with("تحدث المستخدم بشكل أساسي عن "));
        assert!(summary.contains("الطقس"));
    }

    #[test]
    fn test_short_latin_tokens_are_ignored() {
        // Two-letter words never qualify in Latin script.
        let summary = fallback().summary(&messages(&["do it to me"]), Language::En);
        assert_eq!(summary, "The user spoke about several topics.");
    }
}
