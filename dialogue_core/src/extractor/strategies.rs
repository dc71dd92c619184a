//! Individual extraction strategies. Each is a pure function from cleaned
//! text to an optional scored candidate.

use regex::Regex;
use std::sync::LazyLock;

use super::{ExtractionCandidate, ExtractionContext, Strategy};
use crate::fragment::{tidy_fragment, unwrap_quotes};
use crate::lexicon::{authenticity_score, is_valid_utterance, Tokens, MEDIEVAL_MARKERS};
use crate::repetition::RepetitionGuard;

static SPAM: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\[DEBUG\]",
        r"(?i)generated full text:",
        r"(?i)visit the website \S+ for more[^!\n]*!?",
        r"https?://\S+",
        r"www\.\S+",
        r"(?i)for more prompt ideas",
        r"(?i)pitch[^\n]*?prompt[^\n]*?ideas",
        r"(?i)charlie says[^\n]*",
        r"(?i)irish[^\n]*?bitch[^\n]*",
        r"(?i)aggressive biker[^\n]*",
        r"(?i)named jim\b[^\n]*",
        r"(?i)\(grunting\)",
        r"(?i)\(pause\)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("spam pattern"))
    .collect()
});

static NARRATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(voice|visuals|narrator|scene|system)\s*[:\-]").expect("narration pattern")
});

static SPEAKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w ']+):\s*(.*)$").expect("speaker pattern"));

static QUOTED_SPAN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r#""([^"]{20,})""#, r"'([^']{20,})'"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("quoted pattern"))
        .collect()
});

/// Lines opening another speaker's turn end a marker-line merge.
const ROLE_MARKERS: &[&str] = &["visitor:", "user:", "player:", "narrator:", "scene:"];

/// Remove spam and contamination artifacts. Applied before every strategy.
pub fn strip_boilerplate(raw: &str) -> String {
    let mut text = raw.to_string();
    for pattern in SPAM.iter() {
        text = pattern.replace_all(&text, "").into_owned();
    }
    text.trim().to_string()
}

/// A run of lines attributed to one speaker label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerBlock {
    pub label: String,
    pub text: String,
}

/// Split text into speaker blocks.
///
/// A `<label>:` line opens a block; unlabelled lines extend the open block.
/// A narration or scene marker closes the open block and ends parsing.
pub fn speaker_blocks(text: &str) -> Vec<SpeakerBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    fn close(current: &mut Option<(String, Vec<String>)>, blocks: &mut Vec<SpeakerBlock>) {
        if let Some((label, lines)) = current.take() {
            let joined = lines.join(" ").trim().to_string();
            if !joined.is_empty() {
                blocks.push(SpeakerBlock { label, text: joined });
            }
        }
    }

    for line in text.lines().map(str::trim) {
        if NARRATION_LINE.is_match(line) {
            break;
        }
        if let Some(caps) = SPEAKER_LINE.captures(line) {
            close(&mut current, &mut blocks);
            let label = caps[1].trim().to_string();
            let rest = caps[2].trim();
            let lines = if rest.is_empty() { Vec::new() } else { vec![rest.to_string()] };
            current = Some((label, lines));
        } else if let Some((_, lines)) = current.as_mut() {
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
    }
    close(&mut current, &mut blocks);

    blocks
}

/// Best-scoring valid block spoken by the persona.
pub fn speaker_block(text: &str, ctx: &ExtractionContext<'_>) -> Option<ExtractionCandidate> {
    let blocks = speaker_blocks(text);
    tracing::debug!(blocks = blocks.len(), "parsed speaker blocks");

    let mut best: Option<ExtractionCandidate> = None;
    for block in blocks.iter().filter(|b| ctx.persona.answers_to(&b.label)) {
        let candidate = unwrap_quotes(block.text.trim()).to_string();
        if !is_valid_utterance(&candidate) {
            continue;
        }
        let score = authenticity_score(&candidate);
        tracing::debug!(score, block = %candidate, "scored speaker block");
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(ExtractionCandidate::new(candidate, Strategy::SpeakerBlock, score));
        }
    }
    best
}

/// First valid quoted span of twenty or more characters.
pub fn quoted_span(text: &str, _ctx: &ExtractionContext<'_>) -> Option<ExtractionCandidate> {
    QUOTED_SPAN
        .iter()
        .flat_map(|pattern| pattern.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|span| is_valid_utterance(span))
        .filter_map(|span| tidy_fragment(&span))
        .find(|cleaned| cleaned.chars().count() >= 10)
        .map(|cleaned| ExtractionCandidate::scored(cleaned, Strategy::QuotedSpan))
}

/// A line carrying a persona or medieval marker, merged with up to two
/// following lines.
pub fn marker_line(text: &str, ctx: &ExtractionContext<'_>) -> Option<ExtractionCandidate> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let name = ctx.persona.name.to_lowercase();

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() || opens_role_turn(line) {
            continue;
        }
        let tokens = Tokens::of(line);
        let has_marker = MEDIEVAL_MARKERS.iter().any(|(m, _)| tokens.has_phrase(m))
            || (!name.is_empty() && line.to_lowercase().contains(&name));
        if !has_marker {
            continue;
        }

        let mut merged = line.to_string();
        for next in lines.iter().skip(i + 1).take(2) {
            if next.is_empty() || opens_role_turn(next) {
                break;
            }
            merged.push(' ');
            merged.push_str(next);
        }

        if let Some(cleaned) = tidy_fragment(&merged) {
            if cleaned.chars().count() >= 15 && is_valid_utterance(&cleaned) {
                return Some(ExtractionCandidate::scored(cleaned, Strategy::MarkerLine));
            }
        }
    }
    None
}

/// Alternative search with nothing to avoid.
pub fn alternative(text: &str, ctx: &ExtractionContext<'_>) -> Option<ExtractionCandidate> {
    RepetitionGuard::default()
        .find_alternative::<&str>(text, ctx.filter, &[])
        .map(|found| ExtractionCandidate::scored(found, Strategy::Alternative))
}

fn opens_role_turn(line: &str) -> bool {
    let lower = line.to_lowercase();
    ROLE_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repetition::BoilerplateFilter;
    use village_lore::CharacterPersona;

    fn bartek() -> CharacterPersona {
        CharacterPersona::new("tavern_keeper", "Bartek", "a bearded innkeeper")
    }

    #[test]
    fn test_strip_boilerplate() {
        let raw = "[DEBUG] Aye, friend! Visit the website www.spam.io for more fun! See https://x.y now";
        let cleaned = strip_boilerplate(raw);
        assert!(!cleaned.contains("DEBUG"));
        assert!(!cleaned.contains("http"));
        assert!(!cleaned.contains("www."));
        assert!(cleaned.starts_with("Aye, friend!"));
    }

    #[test]
    fn test_speaker_blocks_accumulate_and_stop_at_narration() {
        let text = "Visitor: Hello there\nBartek: Welcome, friend!\nSit by the fire.\nVisitor: Thanks\nScene: the door opens\nBartek: ignored";
        let blocks = speaker_blocks(text);

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].label, "Bartek");
        assert_eq!(blocks[1].text, "Welcome, friend! Sit by the fire.");
        assert_eq!(blocks[2].label, "Visitor");
    }

    #[test]
    fn test_speaker_block_picks_best_persona_block() {
        let persona = bartek();
        let filter = BoilerplateFilter::for_persona(&persona);
        let ctx = ExtractionContext::new(&persona, &filter);

        let text = "Bartek: Nothing much happens here lately\nVisitor: And the mine?\nBartek: Aye, stranger, the mine took three men from our village.";
        let candidate = speaker_block(text, &ctx).unwrap();

        assert_eq!(candidate.strategy, Strategy::SpeakerBlock);
        assert!(candidate.text.starts_with("Aye, stranger"));
    }

    #[test]
    fn test_speaker_block_ignores_other_speakers() {
        let persona = bartek();
        let filter = BoilerplateFilter::for_persona(&persona);
        let ctx = ExtractionContext::new(&persona, &filter);

        assert!(speaker_block("Visitor: Aye, good day to ye all.", &ctx).is_none());
    }

    #[test]
    fn test_quoted_span() {
        let persona = bartek();
        let filter = BoilerplateFilter::for_persona(&persona);
        let ctx = ExtractionContext::new(&persona, &filter);

        let text = "He leans over the bar. \"Ye won't find better ale in the valley, friend.\" He winks.";
        let candidate = quoted_span(text, &ctx).unwrap();
        assert_eq!(candidate.text, "Ye won't find better ale in the valley, friend.");
        assert_eq!(candidate.strategy, Strategy::QuotedSpan);

        assert!(quoted_span("\"too short\"", &ctx).is_none());
    }

    #[test]
    fn test_marker_line_merges_following_lines() {
        let persona = bartek();
        let filter = BoilerplateFilter::for_persona(&persona);
        let ctx = ExtractionContext::new(&persona, &filter);

        let text = "Aye, the stew is hot\nand the ale is cold tonight\nVisitor: Great";
        let candidate = marker_line(text, &ctx).unwrap();
        assert_eq!(candidate.text, "Aye, the stew is hot and the ale is cold tonight...");
    }

    #[test]
    fn test_marker_line_skips_role_turns() {
        let persona = bartek();
        let filter = BoilerplateFilter::for_persona(&persona);
        let ctx = ExtractionContext::new(&persona, &filter);

        assert!(marker_line("Visitor: Aye, friend, what brings ye?", &ctx).is_none());
    }
}
