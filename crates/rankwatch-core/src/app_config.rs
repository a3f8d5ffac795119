/// Which Fetch Channel realization a measurement run uses.
///
/// Both realizations return the same ranked identifier list; `Browser` drives
/// a headless Chrome session through the store's incremental result loading,
/// `Http` issues a single request and parses the returned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Http,
    Browser,
}

impl ChannelKind {
    /// Parses a channel name. Returns `None` for unrecognized values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "http" => Some(ChannelKind::Http),
            "browser" => Some(ChannelKind::Browser),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::Http => write!(f, "http"),
            ChannelKind::Browser => write!(f, "browser"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub channel: ChannelKind,
    /// Number of concurrent measurement workers; always >= 1.
    pub worker_count: usize,
    /// Pause between successive keyword fetches within one worker, and the
    /// settle delay for the browser channel's scroll loop. May be fractional.
    pub fetch_delay_secs: f64,
    /// Base search URL; keyword and region attributes are appended as query
    /// parameters.
    pub store_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub page_load_timeout_secs: u64,
    pub browser_headless: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("channel", &self.channel)
            .field("worker_count", &self.worker_count)
            .field("fetch_delay_secs", &self.fetch_delay_secs)
            .field("store_base_url", &self.store_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_load_timeout_secs", &self.page_load_timeout_secs)
            .field("browser_headless", &self.browser_headless)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
