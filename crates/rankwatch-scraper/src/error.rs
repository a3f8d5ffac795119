use thiserror::Error;

/// Classified outcome of a failed ranking fetch.
///
/// The worker loop branches on these variants explicitly; a channel never
/// retries beyond its own single immediate page-load retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transient failure (timeout, navigation or render hiccup) that a fresh
    /// channel is likely to fix. The caller should replace the channel and
    /// retry the same keyword once.
    #[error("recoverable channel fault ({context}): {reason}")]
    Recoverable { context: String, reason: String },

    /// The fetch itself succeeded but the page yielded zero result
    /// identifiers. A per-keyword outcome, not a channel-level one.
    #[error("no results extracted for keyword \"{keyword}\"")]
    NoResults { keyword: String },

    /// Anything else. The channel is unusable; the caller must stop
    /// processing further keywords on it.
    #[error("fatal channel fault ({context}): {reason}")]
    Fatal { context: String, reason: String },
}

impl FetchError {
    pub(crate) fn recoverable(context: impl Into<String>, reason: impl ToString) -> Self {
        FetchError::Recoverable {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn no_results(keyword: impl Into<String>) -> Self {
        FetchError::NoResults {
            keyword: keyword.into(),
        }
    }

    pub(crate) fn fatal(context: impl Into<String>, reason: impl ToString) -> Self {
        FetchError::Fatal {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}
