//! World lore - the shared backdrop every persona speaks from.

use serde::{Deserialize, Serialize};

/// Village-wide lore. Immutable for the lifetime of a loaded config;
/// reloaded as a whole, never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldLore {
    pub village_name: String,
    pub background: String,
    /// Ordered, most pressing first.
    pub current_events: Vec<String>,
}

impl WorldLore {
    /// Create lore for the named village.
    pub fn new(village_name: impl Into<String>) -> Self {
        Self {
            village_name: village_name.into(),
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Append a current event.
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.current_events.push(event.into());
        self
    }

    /// The most pressing current event, if any.
    pub fn headline(&self) -> Option<&str> {
        self.current_events.first().map(String::as_str)
    }

    /// True when no lore was configured.
    pub fn is_empty(&self) -> bool {
        self.village_name.is_empty() && self.background.is_empty() && self.current_events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_is_first_event() {
        let lore = WorldLore::new("Stonehaven")
            .with_event("Miners have gone missing.")
            .with_event("A stranger arrived.");

        assert_eq!(lore.headline(), Some("Miners have gone missing."));
    }

    #[test]
    fn test_default_lore_is_empty() {
        let lore = WorldLore::default();
        assert!(lore.is_empty());
        assert!(lore.headline().is_none());
    }
}
