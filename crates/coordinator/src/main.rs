use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rcd_core::Clock;
use rcd_coordinator::{config::CoordinatorConfig, context::CoordinatorContext, routes, startup};
use rcd_storage::{SqliteStore, Store};

#[derive(Parser, Debug)]
#[command(name = "rcdd", about = "Remote command dispatch fabric coordinator")]
struct Args {
    /// Path to a TOML config file. Defaults to `$RCD_CONFIG`, if set.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rcd_coordinator::logging::init();

    let args = Args::parse();
    let config_path = args.config.or_else(|| std::env::var("RCD_CONFIG").ok().map(PathBuf::from));
    let config = CoordinatorConfig::load(config_path.as_deref())?;

    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&config.store_path)?);
    let clock: Arc<dyn rcd_core::Clock> = Arc::new(rcd_core::SystemClock);
    startup::recover_in_flight(&store, &clock).await;

    let listen_addr = config.listen_addr.clone();
    let retention_days = config.history_retention_days;
    let ctx = CoordinatorContext::new(Arc::clone(&store), config);

    spawn_retention_sweep(Arc::clone(&store), retention_days);

    let app = routes::build_router(ctx);
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "coordinator listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// History retention: `purge_older_than` runs once a day, per
/// `history_retention_days` (spec.md §6, §5 backpressure).
fn spawn_retention_sweep(store: Arc<dyn Store>, retention_days: u32) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(86_400));
        loop {
            interval.tick().await;
            let cutoff_ms = rcd_core::SystemClock.unix_ms() - i64::from(retention_days) * 86_400_000;
            match store.purge_older_than(cutoff_ms).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::info!(deleted, "purged old terminal commands")
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "retention sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async { tokio::signal::ctrl_c().await.ok(); };
    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            sig.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
