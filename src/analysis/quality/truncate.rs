//! Character-budget helpers shared by the generation and display paths.

/// Truncate a string to a maximum number of characters.
#[must_use]
pub fn truncate_to_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

/// Truncate a string to a display budget without splitting a word.
///
/// The result is at most `max_chars` characters and either equals the
/// trimmed input or ends exactly where a word ended. A single word longer
/// than the budget is hard-cut as a last resort.
#[must_use]
pub fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let prefix: String = chars[..max_chars].iter().collect();
    if chars[max_chars].is_whitespace() {
        return prefix.trim_end().to_string();
    }

    match prefix.rfind(char::is_whitespace) {
        Some(cut) => prefix[..cut].trim_end().to_string(),
        None => prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_chars() {
        let text = "Hello, world!";
        assert_eq!(truncate_to_chars(text, 5), "Hello");
        assert_eq!(truncate_to_chars(text, 100), text);
    }

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(truncate_at_word_boundary("Weather and rice", 60), "Weather and rice");
    }

    #[test]
    fn test_never_splits_a_word() {
        let text = "planning the summer holidays in the northern mountain villages";
        let truncated = truncate_at_word_boundary(text, 28);
        assert!(truncated.chars().count() <= 28);
        assert_eq!(truncated, "planning the summer holidays");
        // The cut lands exactly at a word boundary of the original.
        assert!(text.starts_with(&truncated));
        assert_eq!(text.as_bytes()[truncated.len()], b' ');
    }

    #[test]
    fn test_cut_inside_word_backs_up() {
        let truncated = truncate_at_word_boundary("weather forecasting", 12);
        assert_eq!(truncated, "weather");
    }

    #[test]
    fn test_single_long_word_is_hard_cut() {
        let truncated = truncate_at_word_boundary("pneumonoultramicroscopic", 10);
        assert_eq!(truncated.chars().count(), 10);
    }

    #[test]
    fn test_arabic_text_respects_budget() {
        let truncated = truncate_at_word_boundary("الطقس في الجبال الشمالية اليوم", 12);
        assert!(truncated.chars().count() <= 12);
        assert!(!truncated.ends_with(' '));
    }
}
