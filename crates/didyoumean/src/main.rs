//! "Did you mean" issue search CLI
//!
//! Runs single searches against a data directory and prints the JSON
//! response envelope, mainly for trying out configuration and
//! dictionaries.

use anyhow::Result;
use clap::Parser;
use didyoumean::cli::{Cli, Commands, ExitCode};
use didyoumean::errors::{ActionableError, SearchError};
use didyoumean::search::{SearchEngine, SearchRequest};
use std::env;
use tracing_subscriber::EnvFilter;

/// Helper to determine exit code from error
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    if let Some(search_error) = error.downcast_ref::<SearchError>() {
        return match search_error {
            SearchError::ProjectNotFound(_) => ExitCode::NotFound,
            SearchError::InvalidIssueId(_) => ExitCode::InvalidArgument,
            SearchError::NounExtraction(_) => ExitCode::GenericError,
        };
    }

    if error.downcast_ref::<ActionableError>().is_some() {
        let message = error.to_string().to_lowercase();
        if message.contains("no issue snapshot") || message.contains("cannot load") {
            return ExitCode::NotFound;
        }
        return ExitCode::InvalidArgument;
    }

    ExitCode::GenericError
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let exit_code = match run() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            if e.downcast_ref::<ActionableError>().is_some() {
                eprint!("{}", e);
            } else {
                eprintln!("Error: {:#}", e);
            }
            error_to_exit_code(&e)
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Data directory: DIDYOUMEAN_DATA_DIR env var or default to .didyoumean/
    let current_dir = env::current_dir()?;
    let data_dir = match env::var("DIDYOUMEAN_DATA_DIR") {
        Ok(custom_dir) => current_dir.join(custom_dir),
        Err(_) => current_dir.join(".didyoumean"),
    };

    let engine = SearchEngine::open(&data_dir)?;

    match cli.command {
        Commands::Search {
            query,
            project,
            exclude,
            user,
        } => {
            let request = SearchRequest {
                query,
                project_id: project,
                issue_id: exclude,
            };
            let caller = engine.users().caller(user.as_deref());
            let result = engine.search(&request, &caller)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Tokens { query } => {
            let tokens: Vec<String> = engine.tokens(&query)?.into_iter().map(|t| t.raw).collect();
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
    }

    Ok(())
}
