//! Voice tables - per-persona dispatch for every hand-authored line.
//!
//! One lookup structure keyed by persona ID with a generic default entry.
//! Personas without an entry speak with the default voice.

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::persona::PersonaId;

/// How a persona closes its sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechStyle {
    #[default]
    Plain,
    /// Always trails off with an ellipsis.
    Cryptic,
}

/// The complete set of canned lines for one persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaVoice {
    /// Reply to out-of-setting player input, issued before any generation.
    pub rejection: String,

    /// Reply when generated text itself turns out to be anachronistic.
    pub bewildered: String,

    /// Used when nothing usable was generated. Order is preference order.
    pub fallback_pool: Vec<String>,

    /// Short self-introduction replacing degenerate one-word output.
    pub introduction: String,

    /// Last-resort extraction result.
    pub silence: String,

    /// In-character apology for generation failures.
    pub apology: String,

    /// Voice rules appended to the prompt.
    pub style_guide: String,

    #[serde(default)]
    pub style: SpeechStyle,
}

impl PersonaVoice {
    /// Pick from the fallback pool, preferring a line `avoid` does not reject.
    ///
    /// Returns the first pool line when every line is rejected.
    pub fn pick_fallback(&self, avoid: impl Fn(&str) -> bool) -> &str {
        self.fallback_pool
            .iter()
            .find(|line| !avoid(line))
            .or_else(|| self.fallback_pool.first())
            .map(String::as_str)
            .unwrap_or(&self.silence)
    }

    /// Overwrite fields present in `patch`.
    pub fn apply(&mut self, patch: &VoicePatch) {
        if let Some(v) = &patch.rejection {
            self.rejection = v.clone();
        }
        if let Some(v) = &patch.bewildered {
            self.bewildered = v.clone();
        }
        if let Some(v) = &patch.fallback_pool {
            if !v.is_empty() {
                self.fallback_pool = v.clone();
            }
        }
        if let Some(v) = &patch.introduction {
            self.introduction = v.clone();
        }
        if let Some(v) = &patch.silence {
            self.silence = v.clone();
        }
        if let Some(v) = &patch.apology {
            self.apology = v.clone();
        }
        if let Some(v) = &patch.style_guide {
            self.style_guide = v.clone();
        }
        if let Some(v) = patch.style {
            self.style = v;
        }
    }
}

/// Partial voice as written in config; absent fields keep the current line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicePatch {
    pub rejection: Option<String>,
    pub bewildered: Option<String>,
    pub fallback_pool: Option<Vec<String>>,
    pub introduction: Option<String>,
    pub silence: Option<String>,
    pub apology: Option<String>,
    pub style_guide: Option<String>,
    pub style: Option<SpeechStyle>,
}

/// Persona ID -> voice, with a generic default.
#[derive(Debug, Clone)]
pub struct VoiceTable {
    voices: HashMap<PersonaId, PersonaVoice>,
    default: PersonaVoice,
}

impl VoiceTable {
    /// An empty table where every persona speaks with `default`.
    pub fn new(default: PersonaVoice) -> Self {
        Self {
            voices: HashMap::new(),
            default,
        }
    }

    /// The hand-authored Stonehaven voices.
    pub fn builtin() -> Self {
        let mut table = Self::new(builtin::default_voice());
        for (id, voice) in builtin::persona_voices() {
            table.insert(id, voice);
        }
        table
    }

    /// Add or replace a persona's voice.
    pub fn insert(&mut self, id: impl Into<PersonaId>, voice: PersonaVoice) {
        self.voices.insert(id.into(), voice);
    }

    /// Apply a config patch. Unknown personas start from the default voice.
    pub fn patch(&mut self, id: &PersonaId, patch: &VoicePatch) {
        let default = &self.default;
        let voice = self
            .voices
            .entry(id.clone())
            .or_insert_with(|| default.clone());
        voice.apply(patch);
    }

    /// Voice for a persona, or the default entry.
    pub fn voice(&self, id: &str) -> &PersonaVoice {
        self.voices.get(id).unwrap_or(&self.default)
    }

    /// Whether a dedicated entry exists for this persona.
    pub fn has_voice(&self, id: &str) -> bool {
        self.voices.contains_key(id)
    }

    /// Voice used by personas without an entry.
    pub fn default_voice(&self) -> &PersonaVoice {
        &self.default
    }

    /// Every voice including the default.
    pub fn iter(&self) -> impl Iterator<Item = &PersonaVoice> {
        self.voices.values().chain(std::iter::once(&self.default))
    }
}

impl Default for VoiceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_persona_uses_default() {
        let table = VoiceTable::builtin();

        assert!(!table.has_voice("goat_herder"));
        assert_eq!(
            table.voice("goat_herder").rejection,
            table.default_voice().rejection
        );
    }

    #[test]
    fn test_builtin_covers_core_cast() {
        let table = VoiceTable::builtin();
        for id in [
            "blacksmith",
            "tavern_keeper",
            "mysterious_stranger",
            "merchant",
            "tavern_regular",
        ] {
            assert!(table.has_voice(id), "missing voice for {}", id);
            assert_eq!(table.voice(id).fallback_pool.len(), 5);
        }
    }

    #[test]
    fn test_stranger_is_cryptic() {
        let table = VoiceTable::builtin();
        assert_eq!(table.voice("mysterious_stranger").style, SpeechStyle::Cryptic);
        assert_eq!(table.voice("blacksmith").style, SpeechStyle::Plain);
    }

    #[test]
    fn test_pick_fallback_skips_avoided_lines() {
        let table = VoiceTable::builtin();
        let voice = table.voice("blacksmith");
        let first = voice.fallback_pool[0].clone();

        let picked = voice.pick_fallback(|line| line == first);
        assert_eq!(picked, voice.fallback_pool[1]);

        // Everything avoided: first line wins
        let picked = voice.pick_fallback(|_| true);
        assert_eq!(picked, first);
    }

    #[test]
    fn test_patch_overrides_only_given_fields() {
        let mut table = VoiceTable::builtin();
        let before = table.voice("merchant").fallback_pool.clone();

        table.patch(
            &PersonaId::new("merchant"),
            &VoicePatch {
                rejection: Some("Strange talk, friend.".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(table.voice("merchant").rejection, "Strange talk, friend.");
        assert_eq!(table.voice("merchant").fallback_pool, before);
    }

    #[test]
    fn test_patch_unknown_persona_starts_from_default() {
        let mut table = VoiceTable::builtin();
        let id = PersonaId::new("miller");

        table.patch(
            &id,
            &VoicePatch {
                style: Some(SpeechStyle::Cryptic),
                ..Default::default()
            },
        );

        assert!(table.has_voice("miller"));
        assert_eq!(table.voice("miller").style, SpeechStyle::Cryptic);
        assert_eq!(
            table.voice("miller").apology,
            table.default_voice().apology
        );
    }
}
