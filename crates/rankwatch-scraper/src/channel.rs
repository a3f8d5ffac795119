//! The Fetch Channel contract shared by both scraping realizations.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::FetchError;

/// One stateful scraping session (HTTP client or browser) that turns a
/// keyword into the ordered list of result identifiers.
///
/// A channel is owned by exactly one worker and reused across many keyword
/// fetches, so session/browser startup cost is paid once per worker, not per
/// keyword.
#[async_trait]
pub trait SearchChannel: Send {
    /// Fetches the ranked result identifiers for `keyword`, scoped by the
    /// opaque `region_attributes` query fragment.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] classified per the worker retry policy: a
    /// successful fetch with zero identifiers is `NoResults`, a transient
    /// failure that survived the channel's own single retry is `Recoverable`,
    /// and everything else is `Fatal`.
    async fn fetch_ranking(
        &mut self,
        keyword: &str,
        region_attributes: &str,
    ) -> Result<Vec<String>, FetchError>;
}

/// Mints fresh channels; the worker uses it once at startup and again when a
/// recoverable fault calls for a replacement session.
#[async_trait]
pub trait ChannelFactory: Send + Sync {
    /// Opens a new channel.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Fatal`] when the underlying session cannot be
    /// constructed.
    async fn open(&self) -> Result<Box<dyn SearchChannel>, FetchError>;
}

/// Builds the store search URL: `{base}&q={keyword}&{region_attributes}`.
///
/// The keyword is percent-encoded; the region attributes are appended
/// verbatim (the fragment is opaque to us and already URL-shaped).
#[must_use]
pub fn build_search_url(base_url: &str, keyword: &str, region_attributes: &str) -> String {
    let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC);
    if region_attributes.is_empty() {
        format!("{base_url}&q={encoded}")
    } else {
        format!("{base_url}&q={encoded}&{region_attributes}")
    }
}
