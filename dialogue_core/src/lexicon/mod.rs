//! Lexicon - the fixed word lists that keep dialogue in-setting.
//!
//! Matching is whole-word and case-insensitive: text is split into lowercase
//! alphanumeric tokens, and multi-word terms must match consecutive tokens.
//! `"phone?"` hits `phone`, `"telephone"` does not.

mod authenticity;

pub use authenticity::*;

/// Modern-world terms that must never appear in village dialogue.
pub const ANACHRONISMS: &[&str] = &[
    // Devices
    "tv",
    "television",
    "computer",
    "laptop",
    "tablet",
    "phone",
    "smartphone",
    "iphone",
    "ipad",
    "android",
    "camera",
    "radio",
    "microwave",
    "refrigerator",
    "robot",
    "laser",
    // Power and materials
    "electricity",
    "electric",
    "nuclear",
    "atomic",
    "plastic",
    // Vehicles
    "car",
    "automobile",
    "truck",
    "vehicle",
    "bike",
    "motorcycle",
    "airplane",
    "helicopter",
    "rocket",
    "spacecraft",
    "satellite",
    "gps",
    // Networks and computing
    "internet",
    "wifi",
    "bluetooth",
    "email",
    "website",
    "app",
    "online",
    "offline",
    "download",
    "upload",
    "software",
    "hardware",
    "programming",
    "code",
    "data",
    "database",
    "server",
    "cloud",
    "digital",
    "virtual",
    "technology",
    "tech",
    "ai",
    "artificial intelligence",
    // Media and platforms
    "video",
    "movie",
    "film",
    "cinema",
    "streaming",
    "podcast",
    "blog",
    "social media",
    "facebook",
    "twitter",
    "instagram",
    "youtube",
    "netflix",
    "google",
    // Everything else
    "pizza",
    "credit card",
];

/// Words and phrases that mark text as period-authentic, with their
/// authenticity weight.
pub const MEDIEVAL_MARKERS: &[(&str, f32)] = &[
    ("ye", 0.3),
    ("aye", 0.3),
    ("stranger", 0.2),
    ("friend", 0.1),
    ("tavern", 0.2),
    ("ale", 0.2),
    ("forge", 0.2),
    ("mine", 0.1),
    ("village", 0.2),
    ("dammit", 0.2),
    ("good day", 0.2),
    ("what brings", 0.2),
    ("let me tell", 0.2),
    ("back in", 0.1),
];

/// Lowercase alphanumeric tokens of a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens(Vec<String>);

impl Tokens {
    /// Tokenize a text.
    pub fn of(text: &str) -> Self {
        Self(
            text.split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase)
                .collect(),
        )
    }

    /// Whether the (possibly multi-word) phrase occurs as whole tokens.
    pub fn has_phrase(&self, phrase: &str) -> bool {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() || words.len() > self.0.len() {
            return false;
        }
        self.0
            .windows(words.len())
            .any(|window| window.iter().zip(&words).all(|(token, word)| token == word))
    }

    /// Whether any single token equals `word`.
    pub fn has_word(&self, word: &str) -> bool {
        self.0.iter().any(|t| t == word)
    }

    /// Tokens in input order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the text held no words at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Every anachronism present in the text, in lexicon order.
pub fn anachronisms_in(text: &str) -> Vec<&'static str> {
    let tokens = Tokens::of(text);
    ANACHRONISMS
        .iter()
        .copied()
        .filter(|term| tokens.has_phrase(term))
        .collect()
}

/// Whether the text contains any anachronism.
pub fn contains_anachronism(text: &str) -> bool {
    let tokens = Tokens::of(text);
    ANACHRONISMS.iter().any(|term| tokens.has_phrase(term))
}

/// Every medieval marker present in the text with its weight.
pub fn medieval_markers_in(text: &str) -> Vec<(&'static str, f32)> {
    let tokens = Tokens::of(text);
    MEDIEVAL_MARKERS
        .iter()
        .copied()
        .filter(|(marker, _)| tokens.has_phrase(marker))
        .collect()
}

/// Whether the text contains any medieval marker.
pub fn contains_medieval_marker(text: &str) -> bool {
    let tokens = Tokens::of(text);
    MEDIEVAL_MARKERS
        .iter()
        .any(|(marker, _)| tokens.has_phrase(marker))
}
