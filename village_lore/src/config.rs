//! Loading personas, world lore, and voice overrides from TOML.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::persona::{CharacterPersona, PersonaId};
use crate::voice::{VoicePatch, VoiceTable};
use crate::world::WorldLore;

/// Errors raised while loading lore.
#[derive(Debug, Error)]
pub enum LoreError {
    #[error("failed to read lore file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lore config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything the dialogue pipeline reads from the lore source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoreConfig {
    pub world_lore: WorldLore,

    pub characters: HashMap<PersonaId, CharacterPersona>,

    /// Per-persona overrides of the built-in voice lines.
    pub voices: HashMap<PersonaId, VoicePatch>,
}

impl LoreConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, LoreError> {
        let mut config: LoreConfig = toml::from_str(text)?;
        for (id, persona) in config.characters.iter_mut() {
            persona.id = id.clone();
        }
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            characters = config.characters.len(),
            "loaded lore config"
        );
        Ok(config)
    }

    /// Load the first candidate that exists and parses.
    ///
    /// Never fails: with no usable source the tables are empty.
    pub fn load_first_available<P: AsRef<Path>>(candidates: &[P]) -> Self {
        for path in candidates {
            match Self::load(path) {
                Ok(config) => return config,
                Err(LoreError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    continue
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unusable lore config");
                }
            }
        }
        tracing::warn!("no lore config found, using empty tables");
        Self::default()
    }

    /// Add a persona, keyed by its own ID.
    pub fn with_character(mut self, persona: CharacterPersona) -> Self {
        self.characters.insert(persona.id.clone(), persona);
        self
    }

    pub fn with_world_lore(mut self, lore: WorldLore) -> Self {
        self.world_lore = lore;
        self
    }

    /// Look up a persona by ID.
    pub fn persona(&self, id: &str) -> Option<&CharacterPersona> {
        self.characters.get(id)
    }

    /// True when no personas are configured.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Built-in voices with this config's overrides applied.
    pub fn voice_table(&self) -> VoiceTable {
        let mut table = VoiceTable::builtin();
        for (id, patch) in &self.voices {
            table.patch(id, patch);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[world_lore]
village_name = "Stonehaven"
background = "A mining village in the hills."
current_events = ["Three miners vanished last week.", "A hooded stranger sits in the tavern."]

[characters.tavern_keeper]
name = "Bartek"
description = "a bearded, stocky innkeeper who runs the Tawny Lion."
personality = "Cheerful but sharp."
memory_fragments = ["Tomek paid for his beer in silver before he vanished."]
speech_patterns = ["Welcome, friend!", "Dammit all"]

[characters.blacksmith]
name = "Anja Ironbite"
description = "the village smith."

[voices.tavern_keeper]
rejection = "Speak plainly, friend."
"#;

    #[test]
    fn test_parse_sample() {
        let config = LoreConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.world_lore.village_name, "Stonehaven");
        assert_eq!(config.world_lore.current_events.len(), 2);
        assert_eq!(config.characters.len(), 2);

        let bartek = config.persona("tavern_keeper").unwrap();
        assert_eq!(bartek.id.as_str(), "tavern_keeper");
        assert_eq!(bartek.name, "Bartek");
        assert_eq!(bartek.speech_patterns.len(), 2);

        let anja = config.persona("blacksmith").unwrap();
        assert!(anja.memory_fragments.is_empty());
        assert!(anja.personality.is_empty());
    }

    #[test]
    fn test_voice_overrides_applied() {
        let config = LoreConfig::from_toml_str(SAMPLE).unwrap();
        let table = config.voice_table();

        assert_eq!(table.voice("tavern_keeper").rejection, "Speak plainly, friend.");
        // Untouched personas keep built-in lines
        assert_eq!(
            table.voice("blacksmith").rejection,
            VoiceTable::builtin().voice("blacksmith").rejection
        );
    }

    #[test]
    fn test_parse_error() {
        let result = LoreConfig::from_toml_str("[characters.blacksmith]\nname = 3");
        assert!(matches!(result, Err(LoreError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = LoreConfig::load(file.path()).unwrap();
        assert!(!config.is_empty());
    }

    #[test]
    fn test_missing_source_yields_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(matches!(
            LoreConfig::load(&missing),
            Err(LoreError::Io { .. })
        ));

        let config = LoreConfig::load_first_available(&[missing]);
        assert!(config.is_empty());
        assert!(config.world_lore.is_empty());
    }

    #[test]
    fn test_first_available_skips_broken_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        fs::write(&broken, "this is = = not toml").unwrap();
        fs::write(&good, SAMPLE).unwrap();

        let config = LoreConfig::load_first_available(&[broken, good]);
        assert_eq!(config.characters.len(), 2);
    }
}
