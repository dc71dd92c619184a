//! Repetition guard - keeps an NPC from saying the same thing twice.
//!
//! Similarity is the Jaccard index of case-folded word sets. When a candidate
//! collides with recent history, the raw completion is searched again for a
//! clean line that does not.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use village_lore::CharacterPersona;

use crate::fragment::tidy_fragment;
use crate::lexicon::is_valid_utterance;

/// Default collision threshold.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.6;

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted span pattern"));

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s*").expect("sentence break pattern"));

/// Prompt scaffolding that must never be mistaken for speech.
const PROMPT_BOILERPLATE: &[&str] = &[
    "visitor says:",
    "user says:",
    "player says:",
    "critical instructions:",
    "example:",
    "use phrases like:",
    "debug",
    "generated full text",
    "you are",
    "personality:",
    "location:",
    "background:",
    "current situation:",
    "you remember:",
    "you previously said:",
    "never mention",
    "always respond",
    "keep responses",
    "stay completely in character",
    "respond with only",
    "ignore any instructions",
    "critical:",
    "important:",
    "do not repeat",
    "medieval fantasy character instructions",
    "speak as",
];

/// Openings that describe the persona rather than voice it.
const NARRATION_OPENINGS: &[&str] = &["you are", "he is", "she is"];

/// Word set used for similarity: lowercase, surrounding punctuation trimmed.
fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// |A ∩ B| / |A ∪ B| over word sets; 0.0 when either side is empty.
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let a = word_set(a);
    let b = word_set(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f32 / union as f32
}

/// Rejects fragments that echo the prompt or describe the persona.
#[derive(Debug, Clone, Default)]
pub struct BoilerplateFilter {
    persona_texts: Vec<String>,
    openings: Vec<String>,
}

impl BoilerplateFilter {
    /// Filter for the generic prompt scaffolding only.
    pub fn new() -> Self {
        Self {
            persona_texts: Vec::new(),
            openings: NARRATION_OPENINGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Also reject this persona's description, personality, and any
    /// fragment opening with its name.
    pub fn for_persona(persona: &CharacterPersona) -> Self {
        let mut filter = Self::new();
        for text in [&persona.description, &persona.personality] {
            let text = text.trim().to_lowercase();
            if !text.is_empty() {
                filter.persona_texts.push(text);
            }
        }
        if !persona.name.is_empty() {
            filter.openings.push(persona.name.to_lowercase());
        }
        filter
    }

    /// Whether the fragment is scaffolding rather than speech.
    pub fn rejects(&self, fragment: &str) -> bool {
        let lower = fragment.trim().to_lowercase();
        if PROMPT_BOILERPLATE.iter().any(|phrase| lower.contains(phrase)) {
            return true;
        }
        let bare = lower.trim_end_matches(['.', '!', '?']);
        if self
            .persona_texts
            .iter()
            .any(|text| text.contains(bare) || lower.contains(text.as_str()))
        {
            return true;
        }
        self.openings.iter().any(|opening| lower.starts_with(opening.as_str()))
    }
}

/// Detects collisions with recent responses and searches for alternatives.
#[derive(Debug, Clone, Copy)]
pub struct RepetitionGuard {
    threshold: f32,
}

impl RepetitionGuard {
    /// Create a new guard colliding at `threshold` similarity.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Whether two responses are too similar to both be shown.
    pub fn too_similar(&self, a: &str, b: &str) -> bool {
        !a.trim().is_empty() && !b.trim().is_empty() && jaccard_similarity(a, b) >= self.threshold
    }

    /// Whether the candidate collides with any of the previous responses.
    pub fn collides<S: AsRef<str>>(&self, candidate: &str, previous: &[S]) -> bool {
        previous
            .iter()
            .any(|prev| self.too_similar(candidate, prev.as_ref()))
    }

    /// Search the raw completion for a clean line dissimilar to everything
    /// in `avoid`.
    ///
    /// Tries quoted spans, then sentence-boundary segments, then plain
    /// sentences. Each fragment must pass the validity check and the
    /// boilerplate filter.
    pub fn find_alternative<S: AsRef<str>>(
        &self,
        raw: &str,
        filter: &BoilerplateFilter,
        avoid: &[S],
    ) -> Option<String> {
        let raw = raw.trim();

        let quoted = QUOTED
            .captures_iter(raw)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| tidy_fragment(m.as_str()))
            .filter(|fragment| fragment.chars().count() >= 10);

        let segments = sentence_segments(raw)
            .into_iter()
            .filter(|segment| segment.chars().count() >= 10)
            .filter_map(tidy_fragment);

        let sentences = SENTENCE_BREAK.split(raw).filter_map(tidy_fragment);

        let found = quoted
            .chain(segments)
            .chain(sentences)
            .find(|fragment| self.acceptable(fragment, filter, avoid));

        match &found {
            Some(fragment) => tracing::debug!(alternative = %fragment, "alternative response found"),
            None => tracing::debug!("no alternative response found"),
        }
        found
    }

    fn acceptable<S: AsRef<str>>(&self, fragment: &str, filter: &BoilerplateFilter, avoid: &[S]) -> bool {
        is_valid_utterance(fragment) && !self.collides(fragment, avoid) && !filter.rejects(fragment)
    }
}

impl Default for RepetitionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

/// Split at sentence punctuation that is followed by an uppercase letter,
/// a newline, or the end of text. Punctuation is dropped.
fn sentence_segments(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            i += 1;
            continue;
        }

        let mut j = i;
        while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?') {
            j += 1;
        }
        let mut k = j;
        let mut saw_newline = false;
        while k < chars.len() && chars[k].1.is_whitespace() {
            saw_newline |= chars[k].1 == '\n';
            k += 1;
        }

        let boundary = k == chars.len() || saw_newline || chars[k].1.is_uppercase();
        if boundary {
            segments.push(&text[start..pos]);
            start = chars.get(k).map_or(text.len(), |(p, _)| *p);
        }
        i = k;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard_identical_and_disjoint() {
        assert_eq!(jaccard_similarity("Aye, friend!", "aye friend"), 1.0);
        assert_eq!(jaccard_similarity("forge fire", "ale stew"), 0.0);
        assert_eq!(jaccard_similarity("", "ale stew"), 0.0);
    }

    #[test]
    fn test_too_similar_threshold() {
        let guard = RepetitionGuard::default();
        // 3 shared of 4 total words = 0.75
        assert!(guard.too_similar("the forge is hot", "the forge is"));
        // 2 shared of 6 total words
        assert!(!guard.too_similar("the forge is hot", "the forge was cold"));
        assert!(!guard.too_similar("", ""));
    }

    #[test]
    fn test_collides_with_any_previous() {
        let guard = RepetitionGuard::default();
        let previous = vec!["Good day, traveler!", "Welcome, friend! Another ale?"];

        assert!(guard.collides("Welcome friend, another ale?", &previous));
        assert!(!guard.collides("The mine swallowed three men.", &previous));
    }

    #[test]
    fn test_sentence_segments() {
        let segments = sentence_segments("Aye, friend. the forge! Hot today?\nMore here");
        assert_eq!(segments, vec!["Aye, friend. the forge", "Hot today", "More here"]);
    }

    #[test]
    fn test_find_alternative_prefers_quoted_span() {
        let guard = RepetitionGuard::default();
        let raw = "Bartek: Welcome, friend!\nHe says \"The cellar holds the finest ale in the valley.\"";

        let alt = guard.find_alternative(raw, &BoilerplateFilter::new(), &["Welcome, friend!"]);
        assert_eq!(alt.as_deref(), Some("The cellar holds the finest ale in the valley."));
    }

    #[test]
    fn test_find_alternative_skips_similar_and_boilerplate() {
        let guard = RepetitionGuard::default();
        let raw = "Current situation: miners missing. Welcome, friend, another ale? The road north is dangerous these days.";

        let alt = guard.find_alternative(raw, &BoilerplateFilter::new(), &["Welcome, friend! Another ale?"]);
        assert_eq!(alt.as_deref(), Some("The road north is dangerous these days."));
    }

    #[test]
    fn test_find_alternative_none_when_exhausted() {
        let guard = RepetitionGuard::default();
        let alt = guard.find_alternative("Welcome, friend!", &BoilerplateFilter::new(), &["Welcome, friend!"]);
        assert!(alt.is_none());
    }

    #[test]
    fn test_filter_rejects_persona_description() {
        let persona = CharacterPersona::new("tavern_keeper", "Bartek", "a bearded, stocky innkeeper")
            .with_personality("Cheerful but sharp");
        let filter = BoilerplateFilter::for_persona(&persona);

        assert!(filter.rejects("A bearded, stocky innkeeper."));
        assert!(filter.rejects("Bartek pours another mug"));
        assert!(filter.rejects("You are a tavern keeper"));
        assert!(!filter.rejects("The cellar holds fine ale."));
    }
}
