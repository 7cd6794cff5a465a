//! Command-line interface definitions using clap.

use clap::{Parser, Subcommand};

/// "Did you mean" issue search
///
/// Suggests existing issues whose subject matches a free-text query.
/// Reads `config.toml` and `data/snapshot.json` from the data directory
/// (`DIDYOUMEAN_DATA_DIR`, default `.didyoumean`).
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or usage error
///   3  - Resource not found (project, snapshot, dictionary)
#[derive(Parser)]
#[command(name = "didyoumean")]
#[command(about = "\"Did you mean\" issue search", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search issues matching a query
    Search {
        /// Free-text query
        query: String,

        /// Anchor project (numeric id or identifier)
        #[arg(long)]
        project: Option<String>,

        /// Issue to leave out of the results
        #[arg(long)]
        exclude: Option<String>,

        /// Search as this configured user (default: anonymous)
        #[arg(long)]
        user: Option<String>,
    },

    /// Show the tokens a query would be searched with
    Tokens {
        /// Free-text query
        query: String,
    },
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GenericError = 1,
    InvalidArgument = 2,
    NotFound = 3,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_with_options() {
        let cli = Cli::try_parse_from([
            "didyoumean",
            "search",
            "login bug",
            "--project",
            "web",
            "--exclude",
            "12",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                query,
                project,
                exclude,
                user,
            } => {
                assert_eq!(query, "login bug");
                assert_eq!(project.as_deref(), Some("web"));
                assert_eq!(exclude.as_deref(), Some("12"));
                assert_eq!(user, None);
            }
            Commands::Tokens { .. } => panic!("expected search"),
        }
    }
}
