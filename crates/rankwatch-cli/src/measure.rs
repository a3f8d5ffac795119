//! The `measure` command: one full measurement run over all eligible keywords.

use std::sync::Arc;

use rankwatch_core::{AppConfig, ChannelKind};
use rankwatch_pipeline::{PgStore, RunCoordinator};
use rankwatch_scraper::{BrowserChannelFactory, ChannelFactory, HttpChannelFactory};

pub(crate) async fn run(
    pool: sqlx::PgPool,
    config: &AppConfig,
    workers: Option<usize>,
    channel: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(count) = workers {
        anyhow::ensure!(count >= 1, "--workers must be at least 1");
        config.worker_count = count;
    }
    if let Some(raw) = channel {
        config.channel = ChannelKind::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("unknown channel '{raw}' (expected http or browser)"))?;
    }

    if dry_run {
        let keywords = rankwatch_db::list_keywords_with_active_apps(&pool).await?;
        println!(
            "dry-run: would measure {} keywords with {} workers over the {} channel",
            keywords.len(),
            config.worker_count,
            config.channel
        );
        return Ok(());
    }

    let factory: Arc<dyn ChannelFactory> = match config.channel {
        ChannelKind::Http => Arc::new(HttpChannelFactory::new(
            &config.store_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )),
        ChannelKind::Browser => Arc::new(BrowserChannelFactory::new(
            &config.store_base_url,
            config.page_load_timeout_secs,
            config.fetch_delay_secs,
            config.browser_headless,
            &config.user_agent,
        )),
    };

    let store = Arc::new(PgStore::new(pool));
    let coordinator = RunCoordinator::new(store, factory, &config);
    let summary = coordinator.run_measurement().await?;

    println!(
        "run {} ended: {} keywords across {} workers, {} observations written, {} workers aborted",
        summary.run_id,
        summary.keywords,
        summary.workers_spawned,
        summary.observations,
        summary.workers_aborted
    );

    Ok(())
}
