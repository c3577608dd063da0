//! Configuration management
//!
//! Settings come from the process environment, falling back to a `.env`
//! file in the working directory.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Default log filter when neither `RUST_LOG` nor `HELPDESK_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Largest page size the search surface accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Runtime configuration for the helpdesk tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fixture file holding the simulated store, if any.
    pub data_path: Option<PathBuf>,
    pub log_filter: String,
    /// Page size used when a request does not name one.
    pub default_per_page: u32,
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_per_page: MAX_PER_PAGE,
            pretty_json: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, then `.env`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok().or_else(|| dotenv().get(key).cloned()))
    }

    /// Build a configuration from any key lookup. Blank and unparsable
    /// values keep their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let setting = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = setting("HELPDESK_DATA_PATH") {
            config.data_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = setting("HELPDESK_LOG") {
            config.log_filter = filter;
        }
        if let Some(per_page) =
            setting("HELPDESK_DEFAULT_PER_PAGE").and_then(|v| v.parse::<u32>().ok())
        {
            config.default_per_page = per_page.clamp(1, MAX_PER_PAGE);
        }
        if let Some(pretty) = setting("HELPDESK_PRETTY_JSON").and_then(|v| parse_flag(&v)) {
            config.pretty_json = pretty;
        }

        config
    }
}

/// `.env` entries from the working directory, read once.
fn dotenv() -> &'static HashMap<String, String> {
    static DOTENV: OnceLock<HashMap<String, String>> = OnceLock::new();
    DOTENV.get_or_init(|| {
        fs::read_to_string(".env")
            .map(|contents| parse_dotenv(&contents))
            .unwrap_or_default()
    })
}

/// `KEY=value` lines; `#` comments and an `export ` prefix are allowed.
fn parse_dotenv(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.strip_prefix("export ").unwrap_or(line).split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), dotenv_value(value)))
        })
        .collect()
}

/// Strip matching outer quotes, or a trailing ` # comment` when unquoted.
fn dotenv_value(raw: &str) -> String {
    let value = raw.trim();
    ['"', '\'']
        .into_iter()
        .find_map(|quote| value.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or_else(|| value.split(" #").next().unwrap_or(value).trim_end())
        .to_string()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}
