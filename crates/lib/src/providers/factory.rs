//! # AI Provider Factory
//!
//! This module centralizes the logic for creating AI provider instances from
//! configuration, so that any consumer (server, cli, tests) builds providers the
//! same way.

use crate::{
    errors::QueryError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
};
use serde::Deserialize;
use tracing::info;

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Instantiates the provider described by `config`.
///
/// `name` is only used to make error messages point at the right config entry.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn AiProvider>, QueryError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    QueryError::MissingAiProvider(format!(
                        "api_key is required for gemini provider '{name}'"
                    ))
                })?;
            let api_url = config
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| GeminiProvider::url_for_model(&config.model_name));
            info!("Configuring Gemini provider '{name}' with URL: {api_url}");
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    QueryError::MissingAiProvider(format!(
                        "api_url is required for local provider '{name}'. Please set LOCAL_AI_API_URL in your .env file."
                    ))
                })?;
            info!("Configuring local AI provider '{name}' with URL: {api_url}");
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone().filter(|key| !key.is_empty()),
                Some(config.model_name.clone()),
            )?)
        }
        other => {
            return Err(QueryError::MissingAiProvider(format!(
                "Unsupported AI provider type '{other}' for provider '{name}'"
            )))
        }
    };
    Ok(provider)
}
