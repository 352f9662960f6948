use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_STATE_PATH: &str = "processed_items.json";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_USER_AGENT: &str = "redwatch/0.1 (by /u/redwatch)";

/// Which dedup backend the service runs against. The poll loop never
/// inspects this; it only sees the `DedupStore` trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { url: String },
    File { path: PathBuf },
}

/// Immutable runtime configuration, built once at startup and passed by
/// reference into the fetcher, matcher and notifier.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub subreddits: Vec<String>,
    pub keywords: Vec<String>,
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_password: String,
    pub recipient: String,
    pub store: StoreConfig,
    pub poll_interval: Duration,
    pub user_agent: String,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Core of the env parsing, with the variable lookup injected so tests
    /// never have to mutate process-wide environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_subreddits = require(&lookup, "SUBREDDITS")?;
        let subreddits = parse_list(&raw_subreddits);
        if subreddits.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "SUBREDDITS".to_string(),
                value: raw_subreddits,
            });
        }

        let raw_keywords = require(&lookup, "KEYWORDS")?;
        let keywords = dedup_case_insensitive(parse_list(&raw_keywords));
        if keywords.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "KEYWORDS".to_string(),
                value: raw_keywords,
            });
        }

        let smtp_user = require(&lookup, "GMAIL_USER")?;
        let smtp_password = require(&lookup, "GMAIL_APP_PASSWORD")?;
        let recipient = require(&lookup, "RECIPIENT_EMAIL")?;
        let smtp_host = lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let store = match lookup("DEDUP_DB_URL") {
            Some(url) => StoreConfig::Sqlite { url },
            None => {
                let path = match lookup("DEDUP_STATE_PATH") {
                    Some(path) => PathBuf::from(path),
                    None => {
                        warn!(
                            "DEDUP_STATE_PATH not set, defaulting to {}",
                            DEFAULT_STATE_PATH
                        );
                        PathBuf::from(DEFAULT_STATE_PATH)
                    }
                };
                StoreConfig::File { path }
            }
        };

        let poll_interval = match lookup("POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "POLL_INTERVAL_SECS".to_string(),
                    value: raw.clone(),
                })?;
                // A zero interval would panic the timer at the first tick.
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        field: "POLL_INTERVAL_SECS".to_string(),
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        let user_agent = lookup("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            subreddits,
            keywords,
            smtp_host,
            smtp_user,
            smtp_password,
            recipient,
            store,
            poll_interval,
            user_agent,
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
) -> Result<String, ConfigError> {
    match lookup(var_name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvironmentVariable {
            var_name: var_name.to_string(),
        }),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keeps first occurrences, compared case-insensitively, order preserved.
fn dedup_case_insensitive(words: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for word in words {
        let folded = word.to_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            out.push(word);
        }
    }
    out
}
