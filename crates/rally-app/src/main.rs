use std::sync::Arc;

use rally_app::sweep::{Sweeper, local_today};
use rally_core::config::load_config;
use rally_db::db::connection::{create_pool, run_migrations};
use rally_db::store::PgStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Rally invitation sync");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(&config.database.url).await?;

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;

    let sweeper = Sweeper::from_settings(Arc::new(PgStore::new(pool)), &config)?;

    match config.schedule.sweep_interval() {
        None => {
            let report = sweeper.sweep_once(local_today()).await;
            if !report.is_clean() {
                anyhow::bail!("Sweep finished with failures: {report:?}");
            }
        }
        Some(interval) => {
            tokio::select! {
                () = sweeper.run(interval, local_today) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    tracing::info!("Shutdown requested");
                }
            }
        }
    }

    Ok(())
}
