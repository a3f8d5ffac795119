//! The plain request/parse realization of the Fetch Channel.
//!
//! One GET per keyword; every result identifier is parsed out of the returned
//! document in a single pass, with no incremental loading.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::channel::{build_search_url, ChannelFactory, SearchChannel};
use crate::error::FetchError;
use crate::parse::extract_result_links;

/// HTTP search channel backed by a reused `reqwest::Client`.
pub struct HttpChannel {
    client: Client,
    base_url: String,
}

/// Internal classification of one page-load attempt, before the retry-once
/// policy turns it into a [`FetchError`].
enum LoadError {
    Transient(String),
    Terminal(String),
}

impl HttpChannel {
    /// Creates a channel with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Fatal`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::fatal("http client construction", e))?;

        Ok(Self {
            client,
            base_url: base_url.to_owned(),
        })
    }

    /// Performs one GET and returns the body, classifying failures.
    ///
    /// Network-level errors and 429/5xx statuses are transient; any other
    /// non-2xx status is terminal for this channel.
    async fn load_page(&self, url: &str) -> Result<String, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Transient(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(LoadError::Transient(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(LoadError::Terminal(format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::Transient(e.to_string()))
    }
}

#[async_trait]
impl SearchChannel for HttpChannel {
    async fn fetch_ranking(
        &mut self,
        keyword: &str,
        region_attributes: &str,
    ) -> Result<Vec<String>, FetchError> {
        let url = build_search_url(&self.base_url, keyword, region_attributes);

        let body = match self.load_page(&url).await {
            Ok(body) => body,
            Err(LoadError::Terminal(reason)) => return Err(FetchError::fatal(keyword, reason)),
            Err(LoadError::Transient(reason)) => {
                tracing::warn!(keyword, %reason, "search page load failed; retrying once");
                match self.load_page(&url).await {
                    Ok(body) => body,
                    Err(LoadError::Transient(reason)) => {
                        return Err(FetchError::recoverable(keyword, reason));
                    }
                    Err(LoadError::Terminal(reason)) => {
                        return Err(FetchError::fatal(keyword, reason));
                    }
                }
            }
        };

        let links = extract_result_links(&body, &url);
        if links.is_empty() {
            return Err(FetchError::no_results(keyword));
        }
        Ok(links)
    }
}

/// Factory for [`HttpChannel`]s; cheap enough that replacement channels are
/// simply fresh clients.
pub struct HttpChannelFactory {
    base_url: String,
    timeout_secs: u64,
    user_agent: String,
}

impl HttpChannelFactory {
    #[must_use]
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            timeout_secs,
            user_agent: user_agent.to_owned(),
        }
    }
}

#[async_trait]
impl ChannelFactory for HttpChannelFactory {
    async fn open(&self) -> Result<Box<dyn SearchChannel>, FetchError> {
        let channel = HttpChannel::new(&self.base_url, self.timeout_secs, &self.user_agent)?;
        Ok(Box::new(channel))
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
