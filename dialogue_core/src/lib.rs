//! # Dialogue Core (The Tongue)
//!
//! Turns a player's line into an in-character NPC reply. This crate reads
//! personas and lore from `village_lore`, prompts a text-completion model
//! through the [`GenerationGateway`] port, and cleans whatever comes back
//! into one display-ready line.
//!
//! ## Core Components
//!
//! - **guard**: Refuses anachronistic player input before any generation
//! - **context_builder**: Assembles the persona prompt with topical memories
//! - **extractor**: Multi-strategy parse of raw completions
//! - **repetition**: Similarity checks and the alternative-line search
//! - **sanitizer**: Final cleanup, fallbacks and punctuation
//! - **session**: Bounded per (session, persona) history
//! - **tracker**: Quality reporting of completed interactions
//! - **engine**: The orchestrator tying the pipeline together
//!
//! ## Design Philosophy
//!
//! - **Never Fails Outward**: Every request ends in a displayable string
//! - **Explicit State**: Session history is a handle owned by the engine, not a global

pub mod context_builder;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod fragment;
pub mod gateway;
pub mod guard;
pub mod lexicon;
pub mod repetition;
pub mod sanitizer;
pub mod session;
pub mod tracker;

pub use context_builder::{PersonaContext, PersonaContextBuilder, PromptOutcome};
pub use engine::{DialogueEngine, DialogueSettings};
pub use error::DialogueError;
pub use extractor::{ExtractionCandidate, ResponseExtractor, Strategy};
pub use gateway::{strip_echoed_prompt, GenerationConfig, GenerationError, GenerationGateway};
pub use guard::ModernismGuard;
pub use repetition::{jaccard_similarity, BoilerplateFilter, RepetitionGuard};
pub use sanitizer::ResponseSanitizer;
pub use session::{ConversationTurn, SessionHistoryStore, SessionId};
pub use tracker::{
    Interaction, InteractionLog, NullTracker, QualityLogRecord, QualityMetrics, QualitySummary,
    QualityTracker,
};
