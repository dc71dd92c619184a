//! Quality tracking - every completed interaction is reported here.
//!
//! [`QualityTracker`] is the port; [`InteractionLog`] is a bounded in-memory
//! implementation with simple heuristic quality metrics.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

use crate::fragment::is_terminated;
use crate::lexicon::{contains_anachronism, contains_medieval_marker};
use crate::session::SessionId;

/// Records kept by [`InteractionLog`] before the oldest is dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// One completed interaction as handed to a tracker.
#[derive(Debug, Clone, Copy)]
pub struct Interaction<'a> {
    pub user_input: &'a str,
    pub bot_response: &'a str,
    pub persona_id: &'a str,
    pub session_id: &'a SessionId,
    pub player_state: Option<&'a Value>,
    pub error: Option<&'a str>,
}

/// Receives every completed interaction, errors included.
pub trait QualityTracker {
    fn log_interaction(&mut self, interaction: &Interaction<'_>);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracker;

impl QualityTracker for NullTracker {
    fn log_interaction(&mut self, _interaction: &Interaction<'_>) {}
}

/// Heuristic quality of a single response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub has_modern_words: bool,
    pub appropriate_length: bool,
    pub has_punctuation: bool,
    pub persona_flavour: bool,
    /// Fraction of the four checks passed, 0.0 to 1.0.
    pub overall_score: f32,
}

impl QualityMetrics {
    /// Score a response against the four checks.
    pub fn analyze(response: &str) -> Self {
        let has_modern_words = contains_anachronism(response);
        let appropriate_length = (10..=200).contains(&response.chars().count());
        let has_punctuation = is_terminated(response.trim());
        let persona_flavour = contains_medieval_marker(response) || response.contains("...");

        let passed = [!has_modern_words, appropriate_length, has_punctuation, persona_flavour]
            .iter()
            .filter(|ok| **ok)
            .count();

        Self {
            has_modern_words,
            appropriate_length,
            has_punctuation,
            persona_flavour,
            overall_score: passed as f32 / 4.0,
        }
    }
}

/// A stored interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityLogRecord {
    pub id: Uuid,
    pub session_id: SessionId,
    pub persona_id: String,
    /// Taken from the player state's `location` field.
    pub location: String,
    pub user_input: String,
    pub bot_response: String,
    pub player_state: Value,
    pub has_error: bool,
    pub error_message: Option<String>,
    pub metrics: QualityMetrics,
}

impl QualityLogRecord {
    fn from_interaction(interaction: &Interaction<'_>) -> Self {
        let location = interaction
            .player_state
            .and_then(|state| state.get("location"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        Self {
            id: Uuid::new_v4(),
            session_id: interaction.session_id.clone(),
            persona_id: interaction.persona_id.to_string(),
            location,
            user_input: interaction.user_input.to_string(),
            bot_response: interaction.bot_response.to_string(),
            player_state: interaction.player_state.cloned().unwrap_or(Value::Null),
            has_error: interaction.error.is_some(),
            error_message: interaction.error.map(str::to_string),
            metrics: QualityMetrics::analyze(interaction.bot_response),
        }
    }
}

/// Per-persona slice of a [`QualitySummary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaQuality {
    pub interactions: usize,
    pub average_quality: f32,
}

/// Aggregate view over logged interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub interactions: usize,
    pub average_quality: f32,
    pub error_rate: f32,
    pub personas: BTreeMap<String, PersonaQuality>,
}

/// Bounded in-memory interaction log.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    records: VecDeque<QualityLogRecord>,
    capacity: usize,
}

impl InteractionLog {
    /// Create a new log keeping at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Stored records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &QualityLogRecord> {
        self.records.iter()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&QualityLogRecord> {
        self.records.back()
    }

    /// Summarize all records, or only one session's.
    pub fn summary(&self, session: Option<&SessionId>) -> QualitySummary {
        let records: Vec<&QualityLogRecord> = self
            .records
            .iter()
            .filter(|r| session.map_or(true, |s| &r.session_id == s))
            .collect();
        if records.is_empty() {
            return QualitySummary::default();
        }

        let mut totals: BTreeMap<String, (usize, f32)> = BTreeMap::new();
        for record in &records {
            let entry = totals.entry(record.persona_id.clone()).or_default();
            entry.0 += 1;
            entry.1 += record.metrics.overall_score;
        }

        let count = records.len() as f32;
        QualitySummary {
            interactions: records.len(),
            average_quality: records.iter().map(|r| r.metrics.overall_score).sum::<f32>() / count,
            error_rate: records.iter().filter(|r| r.has_error).count() as f32 / count,
            personas: totals
                .into_iter()
                .map(|(persona, (n, total))| {
                    let quality = PersonaQuality {
                        interactions: n,
                        average_quality: total / n as f32,
                    };
                    (persona, quality)
                })
                .collect(),
        }
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl QualityTracker for InteractionLog {
    fn log_interaction(&mut self, interaction: &Interaction<'_>) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records
            .push_back(QualityLogRecord::from_interaction(interaction));
    }
}
