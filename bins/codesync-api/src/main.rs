mod handlers;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use codesync_common::config::Config;
use codesync_judge::catalogue::{InMemoryCatalogue, ProblemCatalogue, RedisCatalogue};
use codesync_judge::config::LanguageConfigManager;
use codesync_judge::engine::JDoodleOracle;
use codesync_judge::resolver::EntryPointRegistry;
use codesync_judge::Judge;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

pub struct AppState {
    pub judge: Judge,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    info!("CodeSync API booting...");

    let config = Config::from_env();

    let languages = LanguageConfigManager::load(&config.languages_path)?;
    info!("Loaded language configurations for: {:?}", languages.list_languages());

    let entry_points = EntryPointRegistry::load(&config.entry_points_path)?;
    info!("Loaded {} entry points", entry_points.len());

    let catalogue: Arc<dyn ProblemCatalogue> = match &config.redis_url {
        Some(url) => {
            let catalogue = RedisCatalogue::connect(url).await?;
            info!("Problem catalogue: Redis at {}", url);
            Arc::new(catalogue)
        }
        None => {
            let catalogue = InMemoryCatalogue::load(&config.problems_path)?;
            info!(
                "Problem catalogue: {} problems from {}",
                catalogue.len(),
                config.problems_path.display()
            );
            Arc::new(catalogue)
        }
    };

    let oracle = JDoodleOracle::new(&config.oracle)?;
    info!(
        endpoint = %config.oracle.endpoint,
        timeout_ms = config.oracle.timeout_ms,
        "Execution oracle configured"
    );

    metrics::init();

    let state = Arc::new(AppState {
        judge: Judge::new(languages, entry_points, catalogue, Arc::new(oracle)),
    });

    let app = routes::app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("HTTP server listening on {}", config.bind_addr);
    info!("Ready to accept submissions");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("API shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    warn!("Received shutdown signal, finishing in-flight submissions...");
}
