//! `helpdesk-search` command-line front end
//!
//! Loads a JSON fixture into a [`Collections`] snapshot and either runs a
//! search against it or prints how a query string parses.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use helpdesk_core::{Collections, Config, CoreError};
use helpdesk_search_core::{SearchEngine, SearchError, parse_query};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Fixture(#[from] CoreError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code: 2 for rejected arguments, 1 for everything else.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Search(_) => 2,
            Self::Fixture(_) | Self::Output(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "helpdesk-search", version, about = "Search a simulated helpdesk store")]
pub struct Cli {
    /// JSON fixture with tickets, users, organizations and groups
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a search and print the response
    Search {
        query: String,

        /// created_at, updated_at, priority, status or ticket_type
        #[arg(long)]
        sort_by: Option<String>,

        /// asc or desc
        #[arg(long)]
        sort_order: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        page: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        per_page: Option<i64>,

        /// Comma-separated related collections to side-load
        #[arg(long)]
        include: Option<String>,
    },

    /// Print the parsed form of a query
    Parse { query: String },
}

pub fn run() -> i32 {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config, cli.verbose);
    tracing::debug!(?config, "configuration loaded");

    match execute(&cli, &config) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn init_tracing(config: &Config, verbose: bool) {
    let directive = if verbose {
        "debug"
    } else {
        config.log_filter.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one command and return what it prints.
pub fn execute(cli: &Cli, config: &Config) -> CliResult<String> {
    match &cli.command {
        Commands::Search {
            query,
            sort_by,
            sort_order,
            page,
            per_page,
            include,
        } => {
            let store = load_store(cli, config)?;
            let mut args = Map::new();
            args.insert("query".into(), json!(query));
            args.insert("sort_by".into(), json!(sort_by));
            args.insert("sort_order".into(), json!(sort_order));
            args.insert("page".into(), json!(page));
            args.insert(
                "per_page".into(),
                json!(per_page.unwrap_or_else(|| i64::from(config.default_per_page))),
            );
            args.insert("include".into(), json!(include));

            let response = SearchEngine::new(&store).search_json(&Value::Object(args))?;
            render(&response, config.pretty_json)
        }
        Commands::Parse { query } => render(&parse_query(query), config.pretty_json),
    }
}

fn load_store(cli: &Cli, config: &Config) -> CliResult<Collections> {
    let Some(path) = cli.data.as_ref().or(config.data_path.as_ref()) else {
        tracing::debug!("no fixture given, searching an empty store");
        return Ok(Collections::new());
    };
    let store = Collections::from_path(path)?;
    tracing::info!(path = %path.display(), records = store.total_len(), "fixture loaded");
    Ok(store)
}

fn render<T: Serialize>(value: &T, pretty: bool) -> CliResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    fn compact() -> Config {
        Config {
            pretty_json: false,
            ..Config::default()
        }
    }

    fn fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "tickets": [
                    {{"id": 1, "subject": "Printer jam", "status": "open", "assignee_id": 5}},
                    {{"id": 2, "subject": "Refund", "status": "closed"}}
                ],
                "users": {{"5": {{"name": "Ada", "role": "agent"}}}}
            }}"#
        )
        .unwrap();
        file
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("helpdesk-search").chain(args.iter().copied()))
            .expect("failed to parse arguments")
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn clap_parses_search_flags() {
        let cli = parse(&[
            "--data",
            "store.json",
            "search",
            "status:open",
            "--sort-by",
            "priority",
            "--page",
            "-1",
            "--include",
            "users",
        ]);
        assert_eq!(cli.data, Some(PathBuf::from("store.json")));
        match cli.command {
            Commands::Search {
                query,
                sort_by,
                page,
                include,
                ..
            } => {
                assert_eq!(query, "status:open");
                assert_eq!(sort_by.as_deref(), Some("priority"));
                assert_eq!(page, Some(-1));
                assert_eq!(include.as_deref(), Some("users"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_against_fixture() {
        let file = fixture();
        let path = file.path().to_string_lossy().into_owned();
        let cli = parse(&["--data", &path, "search", "printer", "--include", "users"]);
        let output = execute(&cli, &compact()).unwrap();
        let body: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(body["count"], json!(1));
        assert_eq!(body["results"][0]["id"], json!(1));
        assert_eq!(body["users"][0]["name"], json!("Ada"));
    }

    #[test]
    fn default_per_page_comes_from_config() {
        let cli = parse(&["search", ""]);
        let config = Config {
            default_per_page: 7,
            ..compact()
        };
        let body: Value = serde_json::from_str(&execute(&cli, &config).unwrap()).unwrap();
        assert_eq!(body["per_page"], json!(7));
        assert_eq!(body["count"], json!(0));
    }

    #[test]
    fn validation_errors_exit_with_two() {
        let cli = parse(&["search", "x", "--page", "0"]);
        let err = execute(&cli, &compact()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "page must be >= 1");
    }

    #[test]
    fn missing_fixture_exits_with_one() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let cli = parse(&["--data", missing.to_str().unwrap(), "search", "x"]);
        let err = execute(&cli, &compact()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn parse_prints_query() {
        let cli = parse(&["parse", "status:open OR pending -vip"]);
        let body: Value = serde_json::from_str(&execute(&cli, &compact()).unwrap()).unwrap();
        assert_eq!(body["filters"]["status"], json!(["open", "pending"]));
        assert_eq!(body["negated_terms"], json!(["vip"]));
    }
}
