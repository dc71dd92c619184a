//! Character persona definitions.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Identifier of a configured persona (e.g. `"blacksmith"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(pub String);

impl PersonaId {
    /// Create a persona ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PersonaId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PersonaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PersonaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A configured NPC identity. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterPersona {
    /// Filled from the table key when loaded from config.
    #[serde(default)]
    pub id: PersonaId,

    /// Display name, also used as the speaker label in generated text.
    pub name: String,

    pub description: String,

    #[serde(default)]
    pub personality: String,

    #[serde(default)]
    pub background: Option<String>,

    /// Ordered lore memories; order matters for relevance fallback.
    #[serde(default)]
    pub memory_fragments: Vec<String>,

    /// Example phrases the persona tends to use.
    #[serde(default)]
    pub speech_patterns: Vec<String>,
}

impl CharacterPersona {
    /// Create a new persona with the required fields.
    pub fn new(
        id: impl Into<PersonaId>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            personality: String::new(),
            background: None,
            memory_fragments: Vec::new(),
            speech_patterns: Vec::new(),
        }
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Append a lore memory fragment.
    pub fn with_memory(mut self, fragment: impl Into<String>) -> Self {
        self.memory_fragments.push(fragment.into());
        self
    }

    pub fn with_speech_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.speech_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Check whether a speaker label refers to this persona.
    ///
    /// Matching is case-insensitive containment, so `"Bartek the Innkeeper"`
    /// matches a persona named `"Bartek"`.
    pub fn answers_to(&self, label: &str) -> bool {
        !self.name.is_empty() && label.to_lowercase().contains(&self.name.to_lowercase())
    }

    /// "`<name>` is `<description>` `<personality>`".
    pub fn identity_line(&self) -> String {
        let mut line = format!("{} is {}", self.name, self.description);
        if !self.personality.is_empty() {
            line.push(' ');
            line.push_str(&self.personality);
        }
        line
    }
}
