pub mod gemini;
pub mod local;

use crate::errors::QueryError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for sending a system and user prompt to
/// different Large Language Models (e.g., Gemini, local OpenAI-compatible models).
/// Implementations are injected into the translator, so tests can substitute a mock.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result should be the raw text of the model's reply.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, QueryError>;
}

dyn_clone::clone_trait_object!(AiProvider);
