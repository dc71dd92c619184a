//! Response Extractor - pulls one utterance out of a raw completion.
//!
//! Completions arrive with echoed prompts, invented speaker turns, stage
//! narration and assorted contamination. The extractor runs an ordered
//! chain of strategies and keeps the first that produces a valid line:
//!
//! 1. **Cleanup**: strip spam and known contamination markers
//! 2. **Speaker blocks**: best-scoring block labelled with the persona's name
//! 3. **Quoted spans**: first valid quotation of twenty or more characters
//! 4. **Marker lines**: a line with a persona or medieval marker, merged with
//!    its continuation
//! 5. **Alternative search**: the repetition guard's fragment scan
//! 6. **Static fallback**: the persona's silence line

mod strategies;

pub use strategies::{speaker_blocks, strip_boilerplate, SpeakerBlock};

use serde::{Deserialize, Serialize};
use village_lore::{CharacterPersona, PersonaVoice};

use crate::lexicon::authenticity_score;
use crate::repetition::BoilerplateFilter;

/// Cleaned text shorter than this skips straight to the static fallback.
const MIN_CLEANED_CHARS: usize = 10;

/// Which strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    SpeakerBlock,
    QuotedSpan,
    MarkerLine,
    Alternative,
    StaticFallback,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::SpeakerBlock => "speaker_block",
            Strategy::QuotedSpan => "quoted_span",
            Strategy::MarkerLine => "marker_line",
            Strategy::Alternative => "alternative",
            Strategy::StaticFallback => "static_fallback",
        };
        f.write_str(name)
    }
}

/// A scored candidate utterance. Transient, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionCandidate {
    pub text: String,
    pub strategy: Strategy,
    pub score: f32,
}

impl ExtractionCandidate {
    /// Create a new candidate with an explicit score.
    pub fn new(text: impl Into<String>, strategy: Strategy, score: f32) -> Self {
        Self {
            text: text.into(),
            strategy,
            score,
        }
    }

    /// Candidate scored with the authenticity scorer.
    pub fn scored(text: impl Into<String>, strategy: Strategy) -> Self {
        let text = text.into();
        let score = authenticity_score(&text);
        Self::new(text, strategy, score)
    }

    /// Whether every strategy failed.
    pub fn is_fallback(&self) -> bool {
        self.strategy == Strategy::StaticFallback
    }
}

/// What the strategies know about the speaker.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub persona: &'a CharacterPersona,
    pub filter: &'a BoilerplateFilter,
}

impl<'a> ExtractionContext<'a> {
    /// Create a new context.
    pub fn new(persona: &'a CharacterPersona, filter: &'a BoilerplateFilter) -> Self {
        Self { persona, filter }
    }
}

type StrategyFn = fn(&str, &ExtractionContext<'_>) -> Option<ExtractionCandidate>;

/// Strategies in priority order.
const STRATEGIES: &[(Strategy, StrategyFn)] = &[
    (Strategy::SpeakerBlock, strategies::speaker_block),
    (Strategy::QuotedSpan, strategies::quoted_span),
    (Strategy::MarkerLine, strategies::marker_line),
    (Strategy::Alternative, strategies::alternative),
];

/// Runs the strategy chain for one persona.
#[derive(Debug, Clone)]
pub struct ResponseExtractor<'a> {
    persona: &'a CharacterPersona,
    voice: &'a PersonaVoice,
    filter: BoilerplateFilter,
}

impl<'a> ResponseExtractor<'a> {
    /// Create a new extractor for one persona.
    pub fn new(persona: &'a CharacterPersona, voice: &'a PersonaVoice) -> Self {
        Self {
            persona,
            voice,
            filter: BoilerplateFilter::for_persona(persona),
        }
    }

    /// Boilerplate filter built for this persona.
    pub fn filter(&self) -> &BoilerplateFilter {
        &self.filter
    }

    /// Extract exactly one candidate. Never fails: when every strategy comes
    /// up empty the persona's silence line is returned.
    pub fn extract(&self, raw: &str) -> ExtractionCandidate {
        let cleaned = strip_boilerplate(raw);

        if cleaned.chars().count() >= MIN_CLEANED_CHARS {
            let ctx = ExtractionContext::new(self.persona, &self.filter);
            for (strategy, run) in STRATEGIES {
                if let Some(candidate) = run(&cleaned, &ctx) {
                    tracing::debug!(
                        persona = %self.persona.id,
                        strategy = %strategy,
                        score = candidate.score,
                        "candidate extracted"
                    );
                    return candidate;
                }
            }
        }

        tracing::debug!(persona = %self.persona.id, "all extraction strategies failed");
        ExtractionCandidate::new(self.voice.silence.clone(), Strategy::StaticFallback, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_lore::VoiceTable;

    fn setup() -> (CharacterPersona, VoiceTable) {
        let persona = CharacterPersona::new("tavern_keeper", "Bartek", "a bearded innkeeper")
            .with_personality("cheerful and loud");
        (persona, VoiceTable::builtin())
    }

    #[test]
    fn test_speaker_block_wins_over_quotes() {
        let (persona, voices) = setup();
        let extractor = ResponseExtractor::new(&persona, voices.voice("tavern_keeper"));

        let raw = "Visitor: \"What news from the road, good innkeeper?\"\nBartek: Aye, friend, the mine has gone quiet.";
        let candidate = extractor.extract(raw);

        assert_eq!(candidate.strategy, Strategy::SpeakerBlock);
        assert_eq!(candidate.text, "Aye, friend, the mine has gone quiet.");
        assert!(candidate.score > 0.0);
    }

    #[test]
    fn test_spam_is_stripped_before_parsing() {
        let (persona, voices) = setup();
        let extractor = ResponseExtractor::new(&persona, voices.voice("tavern_keeper"));

        let raw = "[DEBUG] Generated full text: Bartek: Welcome to the tavern, stranger! https://spam.example";
        let candidate = extractor.extract(raw);

        assert_eq!(candidate.text, "Welcome to the tavern, stranger!");
    }

    #[test]
    fn test_falls_back_to_silence_line() {
        let (persona, voices) = setup();
        let voice = voices.voice("tavern_keeper");
        let extractor = ResponseExtractor::new(&persona, voice);

        for raw in ["", "   ", "ok", "Visitor: What is a computer?"] {
            let candidate = extractor.extract(raw);
            assert!(candidate.is_fallback(), "raw {:?} gave {:?}", raw, candidate);
            assert_eq!(candidate.text, voice.silence);
        }
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::QuotedSpan.to_string(), "quoted_span");
        assert_eq!(Strategy::StaticFallback.to_string(), "static_fallback");
    }
}
