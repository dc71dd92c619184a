//! Persona Context Builder - turns a player line into a generation prompt.
//!
//! The prompt is assembled from fixed sections, in order:
//! 1. **Identity**: name, description and personality
//! 2. **Situation**: the most pressing current event
//! 3. **Memory**: up to two topic-relevant lore fragments
//! 4. **History**: what the persona said in the last few turns
//! 5. **Instructions**: voice rules and speech-pattern examples
//! 6. **Warnings**: do not repeat the last reply, do not re-introduce
//! 7. **Turn**: the visitor's line and the persona's open speaker label
//!
//! Anachronistic input never reaches the builder's prompt stage; the
//! modernism guard answers it directly.

mod memory;

pub use memory::*;

use serde::{Deserialize, Serialize};
use village_lore::{CharacterPersona, LoreConfig, VoiceTable};

use crate::error::DialogueError;
use crate::guard::ModernismGuard;
use crate::session::ConversationTurn;

/// Default number of prior turns recapped in the prompt.
pub const DEFAULT_PROMPT_HISTORY: usize = 3;

/// Village named in the instructions when the lore names none.
const DEFAULT_VILLAGE: &str = "Stonehaven";

/// Phrases showing the persona already introduced itself.
const INTRODUCTION_PHRASES: &[&str] = &["i am", "my name", "i'm", "call me"];

/// What the builder decided to do with a player line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Send this prompt to the generation gateway.
    Generate(String),
    /// Answer with this line; no generation happens.
    Direct(String),
}

/// Everything that goes into one persona prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaContext {
    pub speaker: String,
    pub identity: String,
    pub situation: Option<String>,
    pub memories: Vec<String>,
    /// Prior NPC responses, oldest first.
    pub previous_responses: Vec<String>,
    pub village: String,
    pub guidelines: String,
    pub already_introduced: bool,
    pub user_input: String,
}

impl PersonaContext {
    /// Format the context as a prompt string.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.identity);
        prompt.push('\n');

        if let Some(situation) = &self.situation {
            prompt.push_str(&format!("Current situation: {}\n", situation));
        }

        if !self.memories.is_empty() {
            prompt.push_str(&format!("You remember: {}\n", self.memories.join(" ")));
        }
        prompt.push('\n');

        if !self.previous_responses.is_empty() {
            for response in &self.previous_responses {
                prompt.push_str(&format!("You previously said: \"{}\"\n", response));
            }
            prompt.push_str(
                "IMPORTANT: Do not repeat your previous responses. Provide new, contextual dialogue.\n",
            );
        }

        prompt.push_str("Medieval fantasy character instructions:\n");
        prompt.push_str(&format!("- Speak as {} from {} village\n", self.speaker, self.village));
        prompt.push_str("- Use medieval speech: \"ye\", \"aye\", \"stranger\", \"friend\"\n");
        prompt.push_str(&format!("- {}\n", self.guidelines));
        prompt.push_str("- Keep responses 10-30 words\n");
        prompt.push_str("- Be in character, no modern references\n");

        if let Some(last) = self.previous_responses.last() {
            prompt.push_str(&format!(
                "CRITICAL: Do not repeat your previous response: \"{}\" - provide a completely different response.\n",
                last
            ));
        }

        if self.already_introduced {
            prompt.push_str(
                "You have already introduced yourself to this visitor. \
                 Continue the conversation naturally without repeating introductions.\n",
            );
        }

        prompt.push_str(&format!("\nVisitor: \"{}\"\n{}:", self.user_input, self.speaker));
        prompt
    }
}

/// Builds prompts for configured personas.
#[derive(Debug, Clone, Copy)]
pub struct PersonaContextBuilder<'a> {
    lore: &'a LoreConfig,
    voices: &'a VoiceTable,
    history_window: usize,
}

impl<'a> PersonaContextBuilder<'a> {
    /// Create a new builder over the loaded lore and voices.
    pub fn new(lore: &'a LoreConfig, voices: &'a VoiceTable) -> Self {
        Self {
            lore,
            voices,
            history_window: DEFAULT_PROMPT_HISTORY,
        }
    }

    /// Recap at most `window` prior turns.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Decide how to answer `user_input`.
    ///
    /// Anachronistic input yields the persona's rejection line. An empty
    /// cast or unknown persona is a configuration error.
    pub fn build(
        &self,
        user_input: &str,
        persona_id: &str,
        history: &[ConversationTurn],
    ) -> Result<PromptOutcome, DialogueError> {
        if let Some(rejection) = ModernismGuard::new(self.voices).screen(user_input, persona_id) {
            return Ok(PromptOutcome::Direct(rejection.to_string()));
        }

        let context = self.assemble(user_input, persona_id, history)?;
        Ok(PromptOutcome::Generate(context.to_prompt_string()))
    }

    /// Gather the prompt sections for a persona.
    pub fn assemble(
        &self,
        user_input: &str,
        persona_id: &str,
        history: &[ConversationTurn],
    ) -> Result<PersonaContext, DialogueError> {
        if self.lore.is_empty() {
            return Err(DialogueError::EmptyCast);
        }
        let persona = self
            .lore
            .persona(persona_id)
            .ok_or_else(|| DialogueError::UnknownPersona(persona_id.to_string()))?;

        let skip = history.len().saturating_sub(self.history_window);
        let previous_responses: Vec<String> = history[skip..]
            .iter()
            .map(|turn| turn.npc_response.clone())
            .collect();

        let village = if self.lore.world_lore.village_name.is_empty() {
            DEFAULT_VILLAGE.to_string()
        } else {
            self.lore.world_lore.village_name.clone()
        };

        Ok(PersonaContext {
            speaker: persona.name.clone(),
            identity: persona.identity_line(),
            situation: self.lore.world_lore.headline().map(str::to_string),
            memories: relevant_memories(user_input, &persona.memory_fragments)
                .into_iter()
                .map(str::to_string)
                .collect(),
            already_introduced: introduced_in(persona, &previous_responses),
            previous_responses,
            village,
            guidelines: self.guidelines(persona),
            user_input: user_input.to_string(),
        })
    }

    fn guidelines(&self, persona: &CharacterPersona) -> String {
        let mut guidelines = self.voices.voice(persona.id.as_str()).style_guide.clone();
        if !persona.speech_patterns.is_empty() {
            let examples: Vec<&str> = persona
                .speech_patterns
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            guidelines.push_str(&format!(" Use phrases like: {}.", examples.join(", ")));
        }
        guidelines
    }
}

fn introduced_in(persona: &CharacterPersona, responses: &[String]) -> bool {
    let name = persona.name.to_lowercase();
    responses.iter().any(|response| {
        let lower = response.to_lowercase();
        INTRODUCTION_PHRASES.iter().any(|p| lower.contains(p))
            || (!name.is_empty() && lower.contains(&name))
    })
}
