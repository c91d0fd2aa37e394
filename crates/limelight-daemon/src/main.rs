use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use limelight_core::config::LimelightConfig;
use limelight_generate::{AnthropicGenerator, ContentGenerator, UnconfiguredGenerator};
use limelight_pipeline::{DryRunPublisher, PlanningService, PostRunner, Publisher};
use limelight_scheduler::SchedulerEngine;
use limelight_store::Store;

/// Content-scheduling daemon for AI influencer accounts.
#[derive(Parser)]
#[command(name = "limelight-daemon", version)]
struct Cli {
    /// Path to limelight.toml (falls back to LIMELIGHT_CONFIG, then
    /// ~/.limelight/limelight.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "limelight=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.or_else(|| std::env::var("LIMELIGHT_CONFIG").ok());
    let config = LimelightConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        LimelightConfig::default()
    });

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = Store::new(db)?;
    info!("database migrations complete");

    let generator: Arc<dyn ContentGenerator> = match AnthropicGenerator::new(&config.generator) {
        Ok(g) => Arc::new(g),
        Err(e) => {
            warn!("generation collaborator unavailable ({e}); content will use fallback templates");
            Arc::new(UnconfiguredGenerator)
        }
    };

    if !config.publisher.dry_run {
        warn!("no live publish client is wired in this build; staying in dry-run");
    }
    let publisher: Arc<dyn Publisher> = Arc::new(DryRunPublisher);

    let runner = Arc::new(PostRunner::new(store.clone(), publisher));
    let engine = SchedulerEngine::new(runner, config.scheduler.tick_secs);
    let scheduler = engine.handle();

    let service = PlanningService::new(store, Arc::clone(&generator), scheduler.clone());
    let resumed = service.resume_pending()?;
    info!(resumed, "schedule restored from store");

    let engine_task = tokio::spawn(engine.run());
    info!("limelight daemon running — press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    scheduler.shutdown();
    engine_task.await?;
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
