//! Response sanitizer - the last pass before a line reaches the player.
//!
//! Sanitizing is idempotent: a sanitized line passes through unchanged.

use regex::Regex;
use std::sync::LazyLock;
use village_lore::{PersonaVoice, SpeechStyle};

use crate::fragment::{collapse_whitespace, is_terminated, unwrap_quotes};
use crate::lexicon::{contains_anachronism, Tokens};
use crate::repetition::RepetitionGuard;

/// Responses longer than this are cut to their first sentence.
pub const DEFAULT_OVERLONG_LIMIT: usize = 150;

const MIN_RESPONSE_CHARS: usize = 5;

/// Bounded so a pathological input cannot loop forever.
const MAX_STRIP_PASSES: usize = 4;

/// Trailing punctuation that never ends a finished line.
const DANGLING: [char; 4] = [',', ';', ':', '-'];

/// Words that mark a response as contaminated by unrelated training text.
const CONTAMINATION: &[&str] = &["charlie", "irish", "biker", "grunting"];

static ASIDES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\*[^*]*\*", r"\([^)]*\)", r"\[[^\]]*\]", r"[*()\[\]]"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("aside pattern"))
        .collect()
});

static ROLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(customer|user|npc|unknown|player|character|gracz|visitor|narrator)\s*:\s*")
        .expect("role prefix pattern")
});

static TRAILING_TURN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\s*\b(customer|user|npc|unknown|player|character|gracz|visitor|narrator)\s*:.*$")
        .expect("trailing turn pattern")
});

static SPACE_BEFORE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,!?;:])").expect("punctuation spacing pattern"));

static FIRST_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^.!?]*[.!?]+").expect("first sentence pattern"));

/// Final cleanup and fallback substitution.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSanitizer {
    overlong_limit: usize,
    guard: RepetitionGuard,
}

impl ResponseSanitizer {
    /// Create a new sanitizer.
    pub fn new(overlong_limit: usize, guard: RepetitionGuard) -> Self {
        Self {
            overlong_limit,
            guard,
        }
    }

    /// Turn a candidate into a display-ready line.
    ///
    /// `recent` holds the persona's latest responses; fallback-pool picks
    /// avoid anything too similar to them.
    pub fn sanitize<S: AsRef<str>>(
        &self,
        candidate: &str,
        speaker_name: &str,
        voice: &PersonaVoice,
        recent: &[S],
    ) -> String {
        let mut text = candidate.to_string();
        for _ in 0..MAX_STRIP_PASSES {
            let next = strip_pass(&text, speaker_name);
            if next == text {
                break;
            }
            text = next;
        }

        if finish(&text, voice.style).chars().count() > self.overlong_limit {
            if let Some(first) = FIRST_SENTENCE.find(&text) {
                text = first.as_str().trim().to_string();
            }
        }

        if text.chars().count() < MIN_RESPONSE_CHARS {
            tracing::debug!(candidate, "candidate too short, using fallback pool");
            return self.fallback(voice, recent);
        }

        let tokens = Tokens::of(&text);
        if text.split_whitespace().count() <= 1 || CONTAMINATION.iter().any(|w| tokens.has_word(w)) {
            tracing::debug!(candidate, "degenerate candidate, using introduction");
            return finish(&voice.introduction, voice.style);
        }

        if contains_anachronism(&text) {
            tracing::debug!(candidate, "anachronism in generated text");
            return finish(&voice.bewildered, voice.style);
        }

        finish(&text, voice.style)
    }

    /// A fallback-pool line not too similar to any recent response.
    pub fn fallback<S: AsRef<str>>(&self, voice: &PersonaVoice, recent: &[S]) -> String {
        let line = voice.pick_fallback(|line| self.guard.collides(line, recent));
        finish(line, voice.style)
    }
}

impl Default for ResponseSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLONG_LIMIT, RepetitionGuard::default())
    }
}

fn strip_pass(text: &str, speaker_name: &str) -> String {
    let mut text = text.to_string();
    for aside in ASIDES.iter() {
        text = aside.replace_all(&text, " ").into_owned();
    }

    let text = ROLE_PREFIX.replace(text.trim(), "");
    let text = strip_speaker_label(&text, speaker_name);
    let text = TRAILING_TURN.replace(text, "");
    let text = unwrap_quotes(text.trim());
    let text = SPACE_BEFORE_PUNCTUATION.replace_all(text, "$1");

    collapse_whitespace(&text)
        .trim_end_matches(|c: char| c.is_whitespace() || DANGLING.contains(&c))
        .to_string()
}

fn strip_speaker_label<'t>(text: &'t str, name: &str) -> &'t str {
    if name.is_empty() {
        return text;
    }
    let label = format!("{}:", name.to_lowercase());
    match text.get(..label.len()) {
        Some(head) if head.to_lowercase() == label => text[label.len()..].trim_start(),
        _ => text,
    }
}

/// Close the line with terminal punctuation in the persona's style.
fn finish(text: &str, style: SpeechStyle) -> String {
    let text = text
        .trim()
        .trim_end_matches(|c: char| c.is_whitespace() || DANGLING.contains(&c));

    match style {
        SpeechStyle::Cryptic => {
            let body = text.trim_end_matches(['.', '!', '?']).trim_end();
            format!("{}...", body)
        }
        SpeechStyle::Plain if is_terminated(text) => text.to_string(),
        SpeechStyle::Plain if text.split_whitespace().count() > 3 => format!("{}.", text),
        SpeechStyle::Plain => format!("{}...", text),
    }
}
