//! Dialogue engine - one player line in, one in-character line out.
//!
//! Per request: guard, build prompt, generate, extract, repetition check,
//! sanitize, record, report. Every path ends in a display-ready string.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use village_lore::{LoreConfig, PersonaId, VoiceTable};

use crate::context_builder::{PersonaContextBuilder, PromptOutcome, DEFAULT_PROMPT_HISTORY};
use crate::error::DialogueError;
use crate::extractor::ResponseExtractor;
use crate::gateway::{strip_echoed_prompt, GenerationConfig, GenerationGateway};
use crate::repetition::{RepetitionGuard, DEFAULT_SIMILARITY_THRESHOLD};
use crate::sanitizer::{ResponseSanitizer, DEFAULT_OVERLONG_LIMIT};
use crate::session::{ConversationTurn, SessionHistoryStore, SessionId, DEFAULT_HISTORY_CAP};
use crate::tracker::{Interaction, NullTracker, QualityTracker};

/// Tunables for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueSettings {
    /// Word-set Jaccard similarity at which two responses collide.
    pub similarity_threshold: f32,
    /// Stored responses checked for repetition.
    pub repetition_window: usize,
    /// Stored responses a fallback-pool pick avoids.
    pub fallback_avoid_window: usize,
    /// Prior turns recapped in the prompt.
    pub prompt_history: usize,
    /// Turns stored per (session, persona).
    pub history_cap: usize,
    pub overlong_limit: usize,
    pub generation: GenerationConfig,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            repetition_window: 5,
            fallback_avoid_window: 3,
            prompt_history: DEFAULT_PROMPT_HISTORY,
            history_cap: DEFAULT_HISTORY_CAP,
            overlong_limit: DEFAULT_OVERLONG_LIMIT,
            generation: GenerationConfig::default(),
        }
    }
}

/// The dialogue pipeline.
///
/// Holds no global state: lore, voices and session history all live on the
/// engine. Requests for the same (session, persona) must not interleave.
pub struct DialogueEngine<G, T = NullTracker> {
    gateway: G,
    tracker: T,
    lore: LoreConfig,
    voices: VoiceTable,
    settings: DialogueSettings,
    sessions: SessionHistoryStore,
}

impl<G: GenerationGateway, T: QualityTracker> DialogueEngine<G, T> {
    /// Create a new engine with default settings.
    pub fn new(gateway: G, tracker: T, lore: LoreConfig) -> Self {
        Self::with_settings(gateway, tracker, lore, DialogueSettings::default())
    }

    /// Create a new engine with explicit settings.
    pub fn with_settings(gateway: G, tracker: T, lore: LoreConfig, settings: DialogueSettings) -> Self {
        let voices = lore.voice_table();
        let sessions = SessionHistoryStore::new(settings.history_cap);
        Self {
            gateway,
            tracker,
            lore,
            voices,
            settings,
            sessions,
        }
    }

    /// Answer `user_input` as `persona_id`. Never fails.
    ///
    /// Configuration problems come back as a plain sentinel message and
    /// generation failures as the persona's apology line.
    pub fn get_response(
        &mut self,
        user_input: &str,
        persona_id: &str,
        session_id: &SessionId,
        player_state: Option<&Value>,
    ) -> String {
        let (response, error) = match self.respond(user_input, persona_id, session_id) {
            Ok(response) => (response, None),
            Err(err) if err.is_configuration() => {
                tracing::warn!(
                    session = %session_id,
                    persona = persona_id,
                    input = user_input,
                    error = %err,
                    "dialogue configuration error"
                );
                (err.to_string(), Some(err))
            }
            Err(err) => {
                tracing::error!(
                    session = %session_id,
                    persona = persona_id,
                    input = user_input,
                    error = %err,
                    "generation failed"
                );
                (self.voices.voice(persona_id).apology.clone(), Some(err))
            }
        };

        let error = error.map(|err| err.to_string());
        self.tracker.log_interaction(&Interaction {
            user_input,
            bot_response: &response,
            persona_id,
            session_id,
            player_state,
            error: error.as_deref(),
        });
        response
    }

    fn respond(
        &mut self,
        user_input: &str,
        persona_id: &str,
        session_id: &SessionId,
    ) -> Result<String, DialogueError> {
        let key = PersonaId::new(persona_id);
        let history = self
            .sessions
            .recent(session_id, &key, self.settings.prompt_history);

        let builder = PersonaContextBuilder::new(&self.lore, &self.voices)
            .with_history_window(self.settings.prompt_history);
        let prompt = match builder.build(user_input, persona_id, &history)? {
            PromptOutcome::Direct(line) => return Ok(line),
            PromptOutcome::Generate(prompt) => prompt,
        };

        let persona = self
            .lore
            .persona(persona_id)
            .ok_or_else(|| DialogueError::UnknownPersona(persona_id.to_string()))?;
        let voice = self.voices.voice(persona_id);

        let completion = self.gateway.generate(&prompt, &self.settings.generation)?;
        let raw = match strip_echoed_prompt(&prompt, &completion) {
            "" => completion.as_str(),
            stripped => stripped,
        };

        let extractor = ResponseExtractor::new(persona, voice);
        let candidate = extractor.extract(raw);
        let extracted_nothing = candidate.is_fallback();

        let guard = RepetitionGuard::new(self.settings.similarity_threshold);
        let recent = self
            .sessions
            .recent_responses(session_id, &key, self.settings.repetition_window);

        let text = if !extracted_nothing && guard.collides(&candidate.text, &recent) {
            let mut avoid = recent.clone();
            avoid.push(candidate.text.clone());
            let alternative = guard.find_alternative(raw, extractor.filter(), &avoid);
            tracing::debug!(
                session = %session_id,
                persona = persona_id,
                found = alternative.is_some(),
                "candidate repeats recent history"
            );
            alternative.unwrap_or_default()
        } else {
            candidate.text
        };

        let avoid_window = recent.len().saturating_sub(self.settings.fallback_avoid_window);
        let fallback_recent = &recent[avoid_window..];
        let sanitizer = ResponseSanitizer::new(self.settings.overlong_limit, guard);
        let mut response = if extracted_nothing {
            tracing::debug!(
                session = %session_id,
                persona = persona_id,
                "nothing extracted, using fallback pool"
            );
            sanitizer.fallback(voice, fallback_recent)
        } else {
            sanitizer.sanitize(&text, &persona.name, voice, fallback_recent)
        };

        if guard.collides(&response, &recent) {
            tracing::debug!(
                session = %session_id,
                persona = persona_id,
                "sanitized response repeats, using fallback pool"
            );
            response = sanitizer.fallback(voice, &recent);
        }

        tracing::info!(
            session = %session_id,
            persona = persona_id,
            strategy = %candidate.strategy,
            score = candidate.score,
            "response ready"
        );

        self.sessions.record(
            session_id,
            &key,
            ConversationTurn::new(user_input, response.as_str()),
        );
        Ok(response)
    }

    /// Clear one persona's history in a session, or all of them.
    pub fn reset_conversation(&mut self, session_id: &SessionId, persona_id: Option<&str>) {
        let persona = persona_id.map(PersonaId::new);
        self.sessions.reset(session_id, persona.as_ref());
        tracing::debug!(session = %session_id, persona = ?persona_id, "conversation reset");
    }

    /// Forget everything about a session.
    pub fn dispose_session(&mut self, session_id: &SessionId) {
        self.sessions.dispose_session(session_id);
    }

    /// Replace the lore tables and rebuild the voices from them.
    pub fn reload_lore(&mut self, lore: LoreConfig) {
        self.voices = lore.voice_table();
        self.lore = lore;
        tracing::info!(characters = self.lore.characters.len(), "lore reloaded");
    }

    /// Replace the sampling parameters used for later requests.
    pub fn set_generation_config(&mut self, config: GenerationConfig) {
        self.settings.generation = config;
    }

    /// Current sampling parameters.
    pub fn generation_config(&self) -> &GenerationConfig {
        &self.settings.generation
    }

    /// The generation backend.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Pipeline tunables.
    pub fn settings(&self) -> &DialogueSettings {
        &self.settings
    }

    /// Loaded personas and world lore.
    pub fn lore(&self) -> &LoreConfig {
        &self.lore
    }

    /// Per (session, persona) conversation history.
    pub fn sessions(&self) -> &SessionHistoryStore {
        &self.sessions
    }

    /// The quality tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Mutable access to the quality tracker.
    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GenerationError;
    use village_lore::CharacterPersona;

    fn lore() -> LoreConfig {
        LoreConfig::new().with_character(CharacterPersona::new(
            "tavern_keeper",
            "Bartek",
            "the keeper of the Tawny Lion.",
        ))
    }

    fn fixed(text: &'static str) -> impl Fn(&str, &GenerationConfig) -> Result<String, GenerationError> {
        move |_: &str, _: &GenerationConfig| Ok(text.to_string())
    }

    #[test]
    fn test_response_recorded_in_history() {
        let mut engine = DialogueEngine::new(fixed("Bartek: Aye, the stew is hot today, friend."), NullTracker, lore());
        let session = SessionId::new("s1");

        let out = engine.get_response("Hungry?", "tavern_keeper", &session, None);

        assert_eq!(out, "Aye, the stew is hot today, friend.");
        let key = PersonaId::new("tavern_keeper");
        assert_eq!(engine.sessions().recent_responses(&session, &key, 5), vec![out]);
    }

    #[test]
    fn test_failed_extraction_draws_from_fallback_pool() {
        let mut engine = DialogueEngine::new(fixed(""), NullTracker, lore());
        let session = SessionId::new("s1");
        let voice = engine.voices.voice("tavern_keeper").clone();

        let first = engine.get_response("Hello", "tavern_keeper", &session, None);
        let second = engine.get_response("Hello?", "tavern_keeper", &session, None);

        assert_eq!(first, voice.fallback_pool[0]);
        assert!(voice.fallback_pool.contains(&second));
        assert_ne!(first, second);
        assert_ne!(first, voice.silence);
    }

    #[test]
    fn test_settings_from_toml_with_defaults() {
        let settings: DialogueSettings = toml::from_str(
            "similarity_threshold = 0.5\n[generation]\nmax_new_tokens = 64\n",
        )
        .unwrap();
        assert_eq!(settings.similarity_threshold, 0.5);
        assert_eq!(settings.repetition_window, 5);
        assert_eq!(settings.generation.max_new_tokens, 64);
        assert_eq!(settings.generation.top_k, 40);
    }

    #[test]
    fn test_generation_config_is_runtime_settable() {
        let mut engine = DialogueEngine::new(fixed(""), NullTracker, lore());
        let config = GenerationConfig {
            temperature: 0.2,
            ..GenerationConfig::default()
        };
        engine.set_generation_config(config.clone());
        assert_eq!(engine.generation_config(), &config);
    }

    #[test]
    fn test_reload_lore_swaps_cast() {
        let mut engine = DialogueEngine::new(fixed("Bartek: Aye, good day to ye, friend."), NullTracker, lore());
        let session = SessionId::new("s1");

        engine.reload_lore(LoreConfig::new());
        let out = engine.get_response("Hello", "tavern_keeper", &session, None);
        assert_eq!(out, DialogueError::EmptyCast.to_string());
    }
}
