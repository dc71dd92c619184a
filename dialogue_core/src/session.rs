//! Session history - bounded conversation memory per (session, persona).
//!
//! The store is an explicit handle owned by the caller. Distinct keys never
//! share state; callers serialize requests for the same key.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;
use village_lore::PersonaId;

/// Default number of turns kept per key.
pub const DEFAULT_HISTORY_CAP: usize = 20;

/// Caller-defined conversation scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random session ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One exchange between the player and an NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_input: String,
    pub npc_response: String,
}

impl ConversationTurn {
    pub fn new(user_input: impl Into<String>, npc_response: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            npc_response: npc_response.into(),
        }
    }
}

type HistoryKey = (SessionId, PersonaId);

/// Ring-buffered turn history keyed by (session, persona).
#[derive(Debug, Clone)]
pub struct SessionHistoryStore {
    histories: HashMap<HistoryKey, VecDeque<ConversationTurn>>,
    capacity: usize,
}

impl SessionHistoryStore {
    /// Create a store keeping at most `capacity` turns per key.
    pub fn new(capacity: usize) -> Self {
        Self {
            histories: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a turn, evicting the oldest once the key is full.
    pub fn record(&mut self, session: &SessionId, persona: &PersonaId, turn: ConversationTurn) {
        let history = self
            .histories
            .entry((session.clone(), persona.clone()))
            .or_default();
        if history.len() == self.capacity {
            history.pop_front();
        }
        history.push_back(turn);
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, session: &SessionId, persona: &PersonaId, n: usize) -> Vec<ConversationTurn> {
        self.histories
            .get(&(session.clone(), persona.clone()))
            .map(|history| {
                let skip = history.len().saturating_sub(n);
                history.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// The NPC side of the last `n` turns, oldest first.
    pub fn recent_responses(&self, session: &SessionId, persona: &PersonaId, n: usize) -> Vec<String> {
        self.recent(session, persona, n)
            .into_iter()
            .map(|turn| turn.npc_response)
            .collect()
    }

    /// Number of stored turns for a key.
    pub fn turn_count(&self, session: &SessionId, persona: &PersonaId) -> usize {
        self.histories
            .get(&(session.clone(), persona.clone()))
            .map_or(0, VecDeque::len)
    }

    /// Clear one persona's history in a session, or every persona's when
    /// `persona` is `None`. Keys stay allocated.
    pub fn reset(&mut self, session: &SessionId, persona: Option<&PersonaId>) {
        for ((s, p), history) in self.histories.iter_mut() {
            if s == session && persona.map_or(true, |wanted| wanted == p) {
                history.clear();
            }
        }
    }

    /// Drop every key belonging to a session.
    pub fn dispose_session(&mut self, session: &SessionId) {
        self.histories.retain(|(s, _), _| s != session);
    }

    /// Number of (session, persona) keys held.
    pub fn key_count(&self) -> usize {
        self.histories.len()
    }
}

impl Default for SessionHistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}
