//! Memory relevance - which lore fragments a persona recalls for an input.
//!
//! Player input activates topic clusters; each active cluster pulls in the
//! persona's fragments that mention one of its lore keywords.

use crate::lexicon::Tokens;

/// Most fragments recalled per turn.
pub const MAX_RECALLED: usize = 2;

/// A conversation topic: what the player says, and what lore it recalls.
#[derive(Debug, Clone, Copy)]
pub struct TopicCluster {
    pub name: &'static str,
    /// Input words that activate the cluster.
    pub triggers: &'static [&'static str],
    /// Fragment substrings recalled by an active cluster.
    pub lore_keywords: &'static [&'static str],
}

impl TopicCluster {
    /// Whether any input word starts with a trigger, so "miners" and
    /// "disappearance" count as "mine" and "disappear".
    pub fn is_triggered_by(&self, input: &Tokens) -> bool {
        input
            .iter()
            .any(|token| self.triggers.iter().any(|t| token.starts_with(t)))
    }

    /// Whether a fragment mentions one of the cluster's lore keywords.
    pub fn recalls(&self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        self.lore_keywords.iter().any(|k| fragment.contains(k))
    }
}

pub const TOPIC_CLUSTERS: &[TopicCluster] = &[
    TopicCluster {
        name: "disappearances",
        triggers: &["mine", "mining", "silver", "tomek", "missing", "disappear", "vanish"],
        lore_keywords: &["mine", "tomek", "silver", "disappeared", "missing", "vanish", "gone"],
    },
    TopicCluster {
        name: "trade",
        triggers: &["erik", "merchant", "trade", "goods", "sell", "buy"],
        lore_keywords: &["erik", "city", "trade", "goods", "merchant"],
    },
    TopicCluster {
        name: "stranger",
        triggers: &["stranger", "mysterious", "hooded", "corner"],
        lore_keywords: &["stranger", "masks", "appeared", "hooded"],
    },
    TopicCluster {
        name: "smithing",
        triggers: &["weapon", "blade", "sword", "forge", "steel", "iron", "metal"],
        lore_keywords: &["blade", "forge", "steel", "brother", "iron", "rope", "cut"],
    },
    TopicCluster {
        name: "tavern",
        triggers: &["tavern", "inn", "ale", "beer", "drink"],
        lore_keywords: &["beer", "tavern", "paid", "home", "golden days"],
    },
];

/// Fragments relevant to the input, at most [`MAX_RECALLED`], in first-seen
/// order. With no topic match the first fragment is recalled.
pub fn relevant_memories<'a>(user_input: &str, fragments: &'a [String]) -> Vec<&'a str> {
    if fragments.is_empty() {
        return Vec::new();
    }

    let input = Tokens::of(user_input);
    let mut recalled: Vec<&str> = Vec::new();

    for cluster in TOPIC_CLUSTERS.iter().filter(|c| c.is_triggered_by(&input)) {
        for fragment in fragments.iter().filter(|f| cluster.recalls(f)) {
            if !recalled.contains(&fragment.as_str()) {
                recalled.push(fragment);
            }
        }
    }

    if recalled.is_empty() {
        recalled.push(&fragments[0]);
    }
    recalled.truncate(MAX_RECALLED);
    recalled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments() -> Vec<String> {
        vec![
            "I once forged a blade for the lord's own brother.".to_string(),
            "Tomek went into the mine and never came back.".to_string(),
            "The silver ran out last winter.".to_string(),
            "Erik brought goods from the city.".to_string(),
        ]
    }

    #[test]
    fn test_topic_recalls_matching_fragments() {
        let fragments = fragments();
        let recalled = relevant_memories("What happened at the mine?", &fragments);
        assert_eq!(
            recalled,
            vec![
                "Tomek went into the mine and never came back.",
                "The silver ran out last winter."
            ]
        );
    }

    #[test]
    fn test_plural_trigger() {
        let fragments = fragments();
        let recalled = relevant_memories("Do ye sell swords?", &fragments);
        // "sell" pulls trade, "swords" pulls smithing
        assert_eq!(
            recalled,
            vec![
                "Erik brought goods from the city.",
                "I once forged a blade for the lord's own brother."
            ]
        );
    }

    #[test]
    fn test_derived_word_triggers() {
        let fragments = fragments();
        let mine = vec![
            "Tomek went into the mine and never came back.",
            "The silver ran out last winter.",
        ];

        assert_eq!(relevant_memories("Tell me about the disappearance", &fragments), mine);
        assert_eq!(relevant_memories("What happened to the miners?", &fragments), mine);
        assert_eq!(
            relevant_memories("Is the innkeeper about?", &[
                "Erik brought goods from the city.".to_string(),
                "The tavern paid for my home.".to_string(),
            ]),
            vec!["The tavern paid for my home."]
        );
    }

    #[test]
    fn test_no_topic_recalls_first_fragment() {
        let fragments = fragments();
        assert_eq!(
            relevant_memories("Nice weather today", &fragments),
            vec!["I once forged a blade for the lord's own brother."]
        );
        assert!(relevant_memories("anything", &[]).is_empty());
    }

    #[test]
    fn test_duplicates_are_recalled_once() {
        let fragments = vec!["The hooded stranger drinks beer in the tavern.".to_string()];
        let recalled = relevant_memories("Who is the hooded stranger at the tavern?", &fragments);
        assert_eq!(recalled.len(), 1);
    }
}
