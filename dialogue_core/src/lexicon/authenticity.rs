//! Validity check and authenticity scoring for candidate utterances.

use super::{anachronisms_in, contains_anachronism, contains_medieval_marker, medieval_markers_in};

/// Penalty applied per distinct anachronism.
pub const ANACHRONISM_PENALTY: f32 = 0.5;

/// Bonus for an utterance of comfortable length.
pub const LENGTH_BONUS: f32 = 0.1;

/// Character lengths that earn [`LENGTH_BONUS`].
pub const COMFORTABLE_LENGTH: std::ops::RangeInclusive<usize> = 10..=100;

const MIN_UTTERANCE_CHARS: usize = 5;

/// Whether a text could be spoken by a village NPC.
///
/// Invalid if any anachronism appears. Otherwise valid if it carries a
/// medieval marker, or at least two words longer than three characters.
pub fn is_valid_utterance(text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() < MIN_UTTERANCE_CHARS {
        return false;
    }
    if contains_anachronism(text) {
        return false;
    }

    let long_words = text
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .count();

    contains_medieval_marker(text) || long_words >= 2
}

/// Rank a candidate by how period-authentic it reads.
///
/// Only used to order competing candidates, never as a gate.
pub fn authenticity_score(text: &str) -> f32 {
    let text = text.trim();
    if text.chars().count() < MIN_UTTERANCE_CHARS {
        return 0.0;
    }

    let mut score = -(anachronisms_in(text).len() as f32) * ANACHRONISM_PENALTY;

    score += medieval_markers_in(text)
        .iter()
        .map(|(_, weight)| weight)
        .sum::<f32>();

    if COMFORTABLE_LENGTH.contains(&text.chars().count()) {
        score += LENGTH_BONUS;
    }

    score.max(0.0)
}
