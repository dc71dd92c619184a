//! Dialogue errors.
//!
//! None of these reach the caller of `get_response`: configuration errors
//! become a sentinel string, generation failures an in-character apology.

use thiserror::Error;

use crate::gateway::GenerationError;

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("No characters are configured.")]
    EmptyCast,

    #[error("Character '{0}' not found in configuration.")]
    UnknownPersona(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl DialogueError {
    /// Whether this is a configuration problem rather than a runtime failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DialogueError::EmptyCast | DialogueError::UnknownPersona(_))
    }
}
