//! Fragment tidying shared by the extractor and the alternative search.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_ASIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([^)]*\)\s*").expect("leading aside pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Lines containing these are transcript scaffolding, not speech.
const SCAFFOLD_MARKERS: &[&str] = &[
    "visitor:",
    "user:",
    "explanation:",
    "character 4:",
    "guy #4",
    "age:",
];

/// Words suggesting an unfinished thought, closed with an ellipsis.
const TRAILING_WORDS: &[&str] = &["but", "and", "he", "she", "they", "we"];

const MIN_FRAGMENT_CHARS: usize = 5;

/// Whether the text already ends a sentence.
pub fn is_terminated(text: &str) -> bool {
    text.ends_with(['.', '!', '?'])
}

/// Remove one pair of wrapping double or single quotes.
pub fn unwrap_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let inner = &text[1..text.len() - 1];
            if !inner.contains(quote) {
                return inner.trim();
            }
        }
    }
    text
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Reduce a raw fragment to a single speakable line.
///
/// Keeps the longest line free of scaffolding, unwraps quotes, and closes
/// long unterminated text. Returns `None` when fewer than five characters
/// survive.
pub fn tidy_fragment(text: &str) -> Option<String> {
    let text = text.trim().trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let text = LEADING_ASIDE.replace(text, "");

    let best_line = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            !SCAFFOLD_MARKERS.iter().any(|m| lower.contains(m))
        })
        .fold("", |best, line| if line.len() > best.len() { line } else { best });

    let mut line = if best_line.is_empty() {
        text.trim().to_string()
    } else {
        best_line.to_string()
    };
    line = unwrap_quotes(&line).to_string();

    let length = line.chars().count();
    if length > 200 && !is_terminated(&line) {
        let first = line.split(['.', '!', '?']).next().unwrap_or("").trim();
        if first.chars().count() >= 30 && first.len() < line.len() {
            line = format!("{}.", first);
        }
    } else if length > 30 && !is_terminated(&line) {
        let lower = line.to_lowercase();
        let trails_off = lower.contains("...")
            || lower
                .split_whitespace()
                .any(|word| TRAILING_WORDS.contains(&word));
        line = line.trim_end().to_string();
        line.push_str(if trails_off { "..." } else { "." });
    }

    let line = collapse_whitespace(&line);
    (line.chars().count() >= MIN_FRAGMENT_CHARS).then_some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_quotes() {
        assert_eq!(unwrap_quotes("\"Aye, friend.\""), "Aye, friend.");
        assert_eq!(unwrap_quotes("'Aye.'"), "Aye.");
        // Inner quotes mean these are not a single wrapped span
        assert_eq!(unwrap_quotes("\"Hi,\" she said, \"welcome.\""), "\"Hi,\" she said, \"welcome.\"");
    }

    #[test]
    fn test_tidy_strips_leading_colon_and_aside() {
        assert_eq!(
            tidy_fragment(": (grins) Aye, the forge is hot.").as_deref(),
            Some("Aye, the forge is hot.")
        );
    }

    #[test]
    fn test_tidy_keeps_longest_clean_line() {
        let text = "Short one.\nVisitor: what about the very long question here?\nA much longer line of real speech.";
        assert_eq!(
            tidy_fragment(text).as_deref(),
            Some("A much longer line of real speech.")
        );
    }

    #[test]
    fn test_tidy_closes_long_unterminated_text() {
        assert_eq!(
            tidy_fragment("The smithy has been quiet since winter came").as_deref(),
            Some("The smithy has been quiet since winter came.")
        );
        assert_eq!(
            tidy_fragment("The mine was quiet and nobody came back").as_deref(),
            Some("The mine was quiet and nobody came back...")
        );
    }

    #[test]
    fn test_tidy_rejects_tiny_text() {
        assert_eq!(tidy_fragment("  ok "), None);
        assert_eq!(tidy_fragment(""), None);
    }

    #[test]
    fn test_is_terminated() {
        assert!(is_terminated("Aye."));
        assert!(is_terminated("Aye..."));
        assert!(is_terminated("Aye?"));
        assert!(!is_terminated("Aye"));
    }
}
