//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The state holds only the `AskClient`: no
//! per-request data and no database connections.

use crate::config::{AppConfig, QUERY_TRANSLATION_TASK};
use askdb::{
    providers::factory::create_provider,
    AskClient, AskClientBuilder,
};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// A fully resolved task configuration with non-optional fields.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    pub provider: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The pipeline that answers `/query` requests.
    pub ask_client: Arc<AskClient>,
}

/// Resolves the `query_translation` task from the configuration.
pub fn resolve_translation_task(config: &AppConfig) -> anyhow::Result<ResolvedTask> {
    let task_config = config
        .tasks
        .get(QUERY_TRANSLATION_TASK)
        .ok_or_else(|| anyhow::anyhow!("Task '{QUERY_TRANSLATION_TASK}' is not configured"))?;
    let provider = task_config.provider.clone().ok_or_else(|| {
        anyhow::anyhow!("Resolved task '{QUERY_TRANSLATION_TASK}' is missing required 'provider' field")
    })?;
    let system_prompt = task_config.system_prompt.clone().ok_or_else(|| {
        anyhow::anyhow!("Resolved task '{QUERY_TRANSLATION_TASK}' is missing required 'system_prompt' field")
    })?;
    let user_prompt = task_config.user_prompt.clone().ok_or_else(|| {
        anyhow::anyhow!("Resolved task '{QUERY_TRANSLATION_TASK}' is missing required 'user_prompt' field")
    })?;
    Ok(ResolvedTask {
        provider,
        system_prompt,
        user_prompt,
    })
}

/// Builds the shared application state from the configuration.
///
/// The AI provider named by the translation task is instantiated once here and
/// injected into the `AskClient`.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let task = resolve_translation_task(&config)?;

    let provider_config = config.providers.get(&task.provider).ok_or_else(|| {
        anyhow::anyhow!(
            "Provider '{}' for task '{QUERY_TRANSLATION_TASK}' not found in config",
            task.provider
        )
    })?;
    let ai_provider = create_provider(&task.provider, provider_config)?;

    let ask_client = AskClientBuilder::new()
        .ai_provider(ai_provider)
        .prompts(task.system_prompt, task.user_prompt)
        .query_timeout(Duration::from_secs(config.query_timeout_secs))
        .build()?;

    info!(
        "Translation task uses provider '{}'; query timeout {}s.",
        task.provider, config.query_timeout_secs
    );

    Ok(AppState {
        ask_client: Arc::new(ask_client),
    })
}
