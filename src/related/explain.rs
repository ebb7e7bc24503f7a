//! Snippets and relevance explanations for matches.

use std::collections::HashSet;

/// Explanation used when the titles share no significant words.
pub const GENERIC_EXPLANATION: &str = "Semantically related content based on AI analysis";

/// Leading sentences of `text`, whitespace collapsed.
///
/// Sentences end at `.`, `!` or `?` followed by whitespace. At most
/// `max_sentences` are kept; a result over `max_chars` characters is cut to
/// `max_chars - 3` and ends in `...`.
pub fn make_snippet(text: &str, max_sentences: usize, max_chars: usize) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.is_empty() {
        return clean;
    }

    let snippet = split_sentences(&clean)
        .into_iter()
        .take(max_sentences)
        .collect::<Vec<_>>()
        .join(" ");

    if snippet.chars().count() <= max_chars {
        return snippet;
    }
    let cut: String = snippet.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Split whitespace-collapsed text after sentence-final punctuation.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_i, ' ')) = chars.peek() {
                sentences.push(&text[start..next_i]);
                start = next_i + 1;
            }
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Why two titles were matched.
///
/// Lists up to `max_terms` lowercase words found in both titles with at least
/// `min_word_chars` characters, in the order they appear in `query`.
pub fn relevance_explanation(
    query: &str,
    title: &str,
    max_terms: usize,
    min_word_chars: usize,
) -> String {
    let query_lower = query.to_lowercase();
    let title_lower = title.to_lowercase();
    let title_words: HashSet<&str> = title_lower.split_whitespace().collect();

    let mut seen = HashSet::new();
    let shared: Vec<&str> = query_lower
        .split_whitespace()
        .filter(|w| w.chars().count() >= min_word_chars && title_words.contains(w))
        .filter(|w| seen.insert(*w))
        .take(max_terms)
        .collect();

    if shared.is_empty() {
        GENERIC_EXPLANATION.to_string()
    } else {
        format!("Shares key concepts: {}", shared.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_first_sentences() {
        let text = "One.  Two!\nThree? Four. Five.";
        assert_eq!(make_snippet(text, 4, 500), "One. Two! Three? Four.");
    }

    #[test]
    fn test_snippet_without_terminators() {
        assert_eq!(make_snippet("  just a   title ", 4, 500), "just a title");
        assert_eq!(make_snippet("", 4, 500), "");
    }

    #[test]
    fn test_snippet_decimal_is_not_a_boundary() {
        assert_eq!(make_snippet("Rates rose 2.5 percent. Then fell.", 1, 500), "Rates rose 2.5 percent.");
    }

    #[test]
    fn test_snippet_truncation() {
        let text = "word ".repeat(200);
        let snippet = make_snippet(&text, 4, 500);
        assert!(snippet.ends_with("..."));
        assert!(snippet.chars().count() <= 500);
    }

    #[test]
    fn test_explanation_shared_words() {
        let explanation =
            relevance_explanation("Neural Network Training", "Training Deep Neural Networks", 3, 4);
        assert_eq!(explanation, "Shares key concepts: neural, training");
    }

    #[test]
    fn test_explanation_limits_terms() {
        let explanation = relevance_explanation(
            "alpha beta gamma delta",
            "delta gamma beta alpha",
            3,
            4,
        );
        assert_eq!(explanation, "Shares key concepts: alpha, beta, gamma");
    }

    #[test]
    fn test_explanation_ignores_short_words() {
        let explanation = relevance_explanation("The art of war", "War and the art", 3, 4);
        assert_eq!(explanation, GENERIC_EXPLANATION);
        assert_eq!(explanation, "Semantically related content based on AI analysis");
    }
}
