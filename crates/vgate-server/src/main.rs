mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use vgate_collab::{Guarded, ServiceCollaborator};
use vgate_pipeline::{CsvLedger, LedgerHandle, Pipeline, PipelineSettings};

use crate::{
    api::{build_app, AppState},
    scheduler::Scheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = vgate_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let niches = vgate_core::load_niches(&config.niches_path)?;
    let collab = ServiceCollaborator::from_config(&config)
        .context("failed to build collaborator client")?;
    let guarded = Arc::new(Guarded::new(
        collab,
        Duration::from_secs(config.collab_timeout_secs),
    ));

    let settings = PipelineSettings::from_config(&config);
    let ledger = LedgerHandle::spawn(CsvLedger::new(config.ledger_path.clone()), settings.threshold);
    let pipeline = Arc::new(Pipeline::new(guarded, ledger, settings));

    let scheduler = Arc::new(Scheduler::new(
        pipeline,
        niches,
        config.schedule.clone(),
    ));
    let mut cron = scheduler.start().await?;

    let app = build_app(AppState {
        scheduler: Arc::clone(&scheduler),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        ledger = %config.ledger_path.display(),
        "vgate-server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    cron.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
