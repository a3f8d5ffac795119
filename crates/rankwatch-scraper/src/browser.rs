//! The headless-browser realization of the Fetch Channel.
//!
//! The store renders results incrementally, so this channel scrolls the page
//! to the bottom, waits out the in-flight-load spinner, and repeats until the
//! document height stops growing before reading the result anchors.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::channel::{build_search_url, ChannelFactory, SearchChannel};
use crate::error::FetchError;
use crate::parse::absolutize;

/// Spinner element the store shows while another result batch is loading.
const LOADING_SPINNER_SELECTOR: &str = ".Hxlbvc";

/// Result anchors in the rendered page.
const RESULT_LINK_SELECTOR: &str = "a.Gy4nib";

/// Upper bound on scroll rounds, so a page that never stops growing cannot
/// pin a worker forever. Hitting it keeps whatever loaded so far.
const MAX_SCROLL_ROUNDS: usize = 100;

/// Search channel backed by one Chrome process and one reused page.
///
/// The browser is launched once per channel and serves every keyword fetch on
/// the owning worker; a replacement channel means a fresh Chrome.
pub struct BrowserChannel {
    // Held so Chrome stays alive for the channel's lifetime.
    _browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    base_url: String,
    settle_delay: Duration,
}

impl BrowserChannel {
    /// Launches Chrome and opens the single page this channel reuses.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Fatal`] when the browser cannot be configured,
    /// launched, or the initial page cannot be created.
    pub async fn launch(
        base_url: &str,
        page_load_timeout_secs: u64,
        settle_delay_secs: f64,
        headless: bool,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(page_load_timeout_secs))
            .arg(format!("--user-agent={user_agent}"))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-notifications")
            .arg("--hide-scrollbars")
            .arg("--mute-audio");
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|reason| FetchError::fatal("browser config", reason))?;

        let (browser, mut handler_stream) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::fatal("browser launch", e))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler_stream.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(FetchError::fatal("browser page creation", e));
            }
        };

        Ok(Self {
            _browser: browser,
            handler,
            page,
            base_url: base_url.to_owned(),
            settle_delay: Duration::from_secs_f64(settle_delay_secs.max(0.0)),
        })
    }

    async fn navigate(&self, url: &str) -> Result<(), String> {
        self.page.goto(url).await.map_err(|e| e.to_string())?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn document_height(&self) -> Result<i64, String> {
        self.page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| e.to_string())?
            .into_value::<i64>()
            .map_err(|e| e.to_string())
    }

    /// Reads the document height, reloading the page once if the first read
    /// fails (the store occasionally serves a shell that never finished
    /// rendering).
    async fn initial_height(&self) -> Result<i64, String> {
        match self.document_height().await {
            Ok(height) => Ok(height),
            Err(first) => {
                tracing::warn!(reason = %first, "page not scriptable; reloading once");
                self.page.reload().await.map_err(|e| e.to_string())?;
                self.document_height().await
            }
        }
    }

    /// Scrolls to the bottom until the document height stabilizes.
    ///
    /// After every scroll the settle delay is slept, then the loading spinner
    /// is polled at half the delay until it disappears.
    async fn scroll_to_end(&self) -> Result<(), String> {
        let mut last_height = self.initial_height().await?;

        let mut rounds = 0usize;
        loop {
            if rounds >= MAX_SCROLL_ROUNDS {
                tracing::warn!(rounds, "result list kept growing; stopping scroll");
                break;
            }
            rounds += 1;

            self.page
                .evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await
                .map_err(|e| e.to_string())?;
            tokio::time::sleep(self.settle_delay).await;

            loop {
                let spinners = self
                    .page
                    .find_elements(LOADING_SPINNER_SELECTOR)
                    .await
                    .map_err(|e| e.to_string())?;
                if spinners.is_empty() {
                    break;
                }
                tokio::time::sleep(self.settle_delay / 2).await;
            }

            let new_height = self.document_height().await?;
            if new_height == last_height {
                break;
            }
            last_height = new_height;
        }

        Ok(())
    }

    async fn collect_links(&self, page_url: &str) -> Result<Vec<String>, String> {
        let base = reqwest::Url::parse(page_url).ok();
        let anchors = self
            .page
            .find_elements(RESULT_LINK_SELECTOR)
            .await
            .map_err(|e| e.to_string())?;

        let mut links = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            if let Some(href) = anchor.attribute("href").await.map_err(|e| e.to_string())? {
                links.push(absolutize(base.as_ref(), &href));
            }
        }
        Ok(links)
    }
}

#[async_trait]
impl SearchChannel for BrowserChannel {
    async fn fetch_ranking(
        &mut self,
        keyword: &str,
        region_attributes: &str,
    ) -> Result<Vec<String>, FetchError> {
        let url = build_search_url(&self.base_url, keyword, region_attributes);

        if let Err(first) = self.navigate(&url).await {
            tracing::warn!(keyword, reason = %first, "navigation failed; retrying once");
            self.navigate(&url)
                .await
                .map_err(|reason| FetchError::recoverable(keyword, reason))?;
        }

        self.scroll_to_end()
            .await
            .map_err(|reason| FetchError::recoverable(keyword, reason))?;

        let links = self
            .collect_links(&url)
            .await
            .map_err(|reason| FetchError::fatal(keyword, reason))?;

        if links.is_empty() {
            return Err(FetchError::no_results(keyword));
        }
        Ok(links)
    }
}

impl Drop for BrowserChannel {
    fn drop(&mut self) {
        // Stop the event pump; Browser's own Drop kills the Chrome process.
        self.handler.abort();
    }
}

/// Factory for [`BrowserChannel`]s. Opening one launches a Chrome process, so
/// replacements are expensive, which is why the worker only asks for one
/// after a recoverable fault.
pub struct BrowserChannelFactory {
    base_url: String,
    page_load_timeout_secs: u64,
    settle_delay_secs: f64,
    headless: bool,
    user_agent: String,
}

impl BrowserChannelFactory {
    #[must_use]
    pub fn new(
        base_url: &str,
        page_load_timeout_secs: u64,
        settle_delay_secs: f64,
        headless: bool,
        user_agent: &str,
    ) -> Self {
        Self {
            base_url: base_url.to_owned(),
            page_load_timeout_secs,
            settle_delay_secs,
            headless,
            user_agent: user_agent.to_owned(),
        }
    }
}

#[async_trait]
impl ChannelFactory for BrowserChannelFactory {
    async fn open(&self) -> Result<Box<dyn SearchChannel>, FetchError> {
        let channel = BrowserChannel::launch(
            &self.base_url,
            self.page_load_timeout_secs,
            self.settle_delay_secs,
            self.headless,
            &self.user_agent,
        )
        .await?;
        Ok(Box::new(channel))
    }
}
