use anyhow::{Context, Result};
use statex_content::config::Config;
use statex_content::content::{ContentPaths, FsContentAccessor};
use statex_content::dashboard::{self, AppState};
use statex_content::scheduler;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("statex_content=info".parse()?),
        )
        .init();

    info!("Starting Statex content dashboard");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Content root: {}", config.content_root.display());
    if config.api_key.is_none() {
        info!("API_KEY not set, mutating endpoints are disabled");
    }

    let paths = ContentPaths::new(&config.content_root).context("Invalid content path table")?;
    let accessor = Arc::new(FsContentAccessor::new(paths));
    let state = AppState::new(&config, accessor);

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler =
        scheduler::start_scheduler(&config, Arc::clone(&state.engine), state.feed.clone()).await?;

    dashboard::run(config.port, state).await
}
