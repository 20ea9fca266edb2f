//! Quality gate for generated text.
//!
//! Stateless heuristics deciding whether a backend's output can be trusted.
//! Sanitization is always applied; rejection comes from either a minimum
//! length or a repetition check, and a rejected result is replaced by the
//! deterministic keyword fallback downstream.

use std::collections::HashSet;

use regex::Regex;

use crate::analysis::core::config::QualityConfig;
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::language::Language;
use crate::analysis::generation::backend::GenerationTask;

/// Quote and decoration characters trimmed from both ends of model output.
const EDGE_CHARS: &[char] = &[
    '"', '\'', '`', '«', '»', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}', '*', '-', ':', ';',
    ',', '\u{060c}',
];

/// Accept/reject heuristics for generated text.
pub struct QualityGate {
    config: QualityConfig,
    whitespace: Regex,
}

impl QualityGate {
    /// Create a gate with the given thresholds.
    ///
    /// # Errors
    /// Returns an error if the internal pattern fails to compile.
    pub fn new(config: QualityConfig) -> AnalysisResult<Self> {
        let whitespace = Regex::new(r"\s+")
            .map_err(|err| AnalysisError::InvalidConfig(err.to_string()))?;
        Ok(Self { config, whitespace })
    }

    /// Minimum accepted length for a task, in characters.
    #[must_use]
    pub const fn min_chars(&self, task: GenerationTask) -> usize {
        match task {
            GenerationTask::Summary => self.config.min_summary_chars,
            GenerationTask::Title => self.config.min_title_chars,
        }
    }

    /// Sanitize a candidate string.
    ///
    /// Collapses whitespace runs to single spaces, strips known
    /// generation-boilerplate prefixes case-insensitively, and trims quote
    /// and decoration characters from both ends. Idempotent: applying it
    /// twice yields the same string.
    #[must_use]
    pub fn sanitize(&self, text: &str) -> String {
        let collapsed = self.whitespace.replace_all(text.trim(), " ");
        let mut current = collapsed.trim().to_string();

        loop {
            let mut next = strip_boilerplate(&current);
            next = next.trim_matches(EDGE_CHARS).trim().to_string();
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Sanitize and classify a candidate string for a task.
    ///
    /// Returns the sanitized text and whether it passed both the
    /// minimum-length and the repetition checks.
    #[must_use]
    pub fn check(&self, task: GenerationTask, text: &str) -> (String, bool) {
        let sanitized = self.sanitize(text);
        let long_enough = sanitized.chars().count() >= self.min_chars(task);
        let accepted = long_enough && !self.is_repetitive(&sanitized);
        (sanitized, accepted)
    }

    /// Detect degenerate repetition through the adjacent-bigram ratio.
    fn is_repetitive(&self, text: &str) -> bool {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if tokens.len() < self.config.min_repetition_tokens {
            return false;
        }

        let total = tokens.len() - 1;
        let unique: HashSet<(&str, &str)> = tokens
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let ratio = unique.len() as f64 / total as f64;
        ratio < self.config.repetition_threshold
    }
}

/// Strip one leading boilerplate tag from any language profile, if present.
fn strip_boilerplate(text: &str) -> String {
    for language in Language::ALL {
        for prefix in language.profile().boilerplate_prefixes {
            if let Some(rest) = strip_prefix_ignore_ascii_case(text, prefix) {
                return rest.trim_start().to_string();
            }
        }
    }
    text.to_string()
}

/// Case-insensitive (ASCII) prefix strip that leaves non-ASCII bytes exact.
fn strip_prefix_ignore_ascii_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let (head, tail) = text.split_at_checked(prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}
