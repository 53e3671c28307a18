use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::Config;
use crate::error::FetchError;
use crate::retry::{retry, RetryPolicy, Retryable};

/// Builds the request URL by substituting `query` into an endpoint template.
///
/// The query is inserted as-is. Callers escape wildcard queries themselves
/// (see [`wildcard_query`]).
pub fn query_url(template: &str, query: &str) -> String {
    template.replace("{query}", query)
}

/// Rewrites a wildcard name into a query string the search service accepts.
///
/// `*.` becomes `%25.`, the URL-encoded form of the service's `%` wildcard.
///
/// # Examples
/// ```
/// use subcert::crt_sh::wildcard_query;
/// assert_eq!(wildcard_query("*.dev.example.com"), "%25.dev.example.com");
/// ```
pub fn wildcard_query(name: &str) -> String {
    name.replace("*.", "%25.")
}

/// Client for the certificate transparency search endpoint.
#[derive(Debug, Clone)]
pub struct CrtShClient {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
    verbose: bool,
}

impl CrtShClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            retry: config.retry.clone(),
            verbose: config.verbose,
        })
    }

    pub fn query_url(&self, query: &str) -> String {
        query_url(&self.endpoint, query)
    }

    /// Fetches the raw response body for `query`.
    ///
    /// Transport failures are retried according to the configured policy.
    /// A non-2xx status ends the call immediately.
    pub async fn fetch(&self, query: &str) -> Result<String, FetchError> {
        let url = self.query_url(query);
        if self.verbose {
            eprintln!("[VERBOSE] GET {}", url);
        }

        let url = url.as_str();
        let max_attempts = self.retry.attempts();
        retry(&self.retry, move |attempt| async move {
            let result = self.fetch_once(url).await;
            if let Err(e) = &result {
                if self.verbose && e.is_retryable() {
                    eprintln!("[VERBOSE] Attempt {}/{} failed: {}", attempt, max_attempts, e);
                }
            }
            result
        })
        .await
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.text().await?)
    }
}
