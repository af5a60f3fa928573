//! # askdb: ask a database a question from the command line
//!
//! `askdb ask` runs the full pipeline against a connection string and prints
//! the JSON response. `askdb check` runs only the read-only guard.

use anyhow::{Context, Result};
use askdb::{
    guard,
    providers::factory::{create_provider, ProviderConfig},
    AskClientBuilder, AskRequest, SchemaCatalog,
};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a question into SQL and run it against a database
    Ask(AskArgs),
    /// Check whether a SQL query would be allowed to run
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct AskArgs {
    /// The question to answer
    #[arg(long, short)]
    question: String,
    /// Where to run the query, e.g. `sqlite://shop.db` or `postgres://...`
    #[arg(long, short, env = "ASKDB_CONNECTION_STRING")]
    connection_string: String,
    /// A JSON file describing the tables, keyed by table name
    #[arg(long, short)]
    schema: PathBuf,
    /// The AI provider type ("local" or "gemini")
    #[arg(long, env = "AI_PROVIDER", default_value = "local")]
    provider: String,
    /// The AI API endpoint. Required for the local provider.
    #[arg(long, env = "AI_API_URL")]
    api_url: Option<String>,
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "AI_MODEL", default_value = "")]
    model: String,
    /// Seconds to wait for the query before giving up
    #[arg(long, env = "QUERY_TIMEOUT_SECS", default_value_t = askdb::constants::DEFAULT_QUERY_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// The SQL text to check
    sql: String,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the JSON result.
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .compact()
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => handle_ask(args).await,
        Commands::Check(args) => Ok(handle_check(&args)),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// --- Command Handlers ---

async fn handle_ask(args: AskArgs) -> Result<ExitCode> {
    let schema_text = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("Failed to read schema file '{}'", args.schema.display()))?;
    let schema: SchemaCatalog = serde_json::from_str(&schema_text)
        .with_context(|| format!("Schema file '{}' is not valid JSON", args.schema.display()))?;

    let provider_config = ProviderConfig {
        provider: args.provider,
        api_url: args.api_url,
        api_key: args.api_key,
        model_name: args.model,
    };
    let ai_provider = create_provider("cli", &provider_config)?;

    let client = AskClientBuilder::new()
        .ai_provider(ai_provider)
        .query_timeout(Duration::from_secs(args.timeout_secs))
        .build()?;

    let request = AskRequest {
        question: args.question,
        connection_string: args.connection_string,
        schema: Some(schema),
    };

    info!("Asking over {} table(s).", request.schema.as_ref().map_or(0, SchemaCatalog::len));
    let response = client.ask(&request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_check(args: &CheckArgs) -> ExitCode {
    match guard::validate(&args.sql) {
        Ok(()) => {
            println!("safe");
            ExitCode::SUCCESS
        }
        Err(reason) => {
            println!("unsafe: {reason}");
            ExitCode::FAILURE
        }
    }
}
