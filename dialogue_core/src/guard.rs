//! Modernism guard - refuses out-of-setting player input before generation.

use village_lore::VoiceTable;

use crate::lexicon::anachronisms_in;

/// Pre-generation short-circuit for anachronistic player input.
#[derive(Debug, Clone, Copy)]
pub struct ModernismGuard<'a> {
    voices: &'a VoiceTable,
}

impl<'a> ModernismGuard<'a> {
    /// Create a new guard answering with lines from `voices`.
    pub fn new(voices: &'a VoiceTable) -> Self {
        Self { voices }
    }

    /// The persona's rejection line if the input names anything modern.
    ///
    /// Personas without a dedicated voice get the generic rejection.
    pub fn screen(&self, user_input: &str, persona_id: &str) -> Option<&'a str> {
        let hits = anachronisms_in(user_input);
        if hits.is_empty() {
            return None;
        }

        tracing::debug!(
            persona = persona_id,
            terms = ?hits,
            dedicated_voice = self.voices.has_voice(persona_id),
            "anachronistic input rejected"
        );
        Some(self.voices.voice(persona_id).rejection.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_input_rejected_with_persona_line() {
        let voices = VoiceTable::builtin();
        let guard = ModernismGuard::new(&voices);

        let line = guard.screen("Do you have a phone?", "blacksmith");
        assert_eq!(line, Some(voices.voice("blacksmith").rejection.as_str()));
    }

    #[test]
    fn test_unknown_persona_gets_generic_rejection() {
        let voices = VoiceTable::builtin();
        let guard = ModernismGuard::new(&voices);

        let line = guard.screen("Where can I charge my LAPTOP", "goat_herder");
        assert_eq!(line, Some(voices.default_voice().rejection.as_str()));
    }

    #[test]
    fn test_setting_input_passes() {
        let voices = VoiceTable::builtin();
        let guard = ModernismGuard::new(&voices);

        assert!(guard.screen("Have you seen the missing miners?", "tavern_keeper").is_none());
        assert!(guard.screen("I care about my cart", "merchant").is_none());
    }
}
