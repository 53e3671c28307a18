use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Search endpoint; `{query}` is replaced verbatim with the query string.
pub const DEFAULT_ENDPOINT: &str = "https://crt.sh/?q={query}&output=json";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

pub const USER_AGENT: &str = concat!("subcert/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Config {
    pub domain: String,
    pub recursive: bool,
    pub include_wildcards: bool,

    // Transport
    pub endpoint: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,

    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            recursive: false,
            include_wildcards: false,

            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            user_agent: USER_AGENT.to_string(),

            output_file: None,
            verbose: false,
        }
    }
}
