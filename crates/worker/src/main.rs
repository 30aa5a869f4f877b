use std::sync::Arc;
use std::time::Duration;

use eventreg_delivery::{
    sender_from_env, EmailConfig, LocalBlobStore, LogMailer, Mailer, SmtpMailer,
};
use eventreg_worker::config::WorkerConfig;
use eventreg_worker::context::JobContext;
use eventreg_worker::runner::JobRunner;
use eventreg_worker::{reaper, scheduler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventreg_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        concurrency = config.concurrency,
        storage_dir = %config.storage_dir,
        "Loaded worker configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = eventreg_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    eventreg_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    eventreg_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Delivery channels ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(&email_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will be logged only");
            Arc::new(LogMailer)
        }
    };
    let store = Arc::new(LocalBlobStore::new(&config.storage_dir));
    tracing::info!(root = %store.root().display(), "Report storage ready");

    let ctx = JobContext {
        pool: pool.clone(),
        mailer,
        store,
        from_address: sender_from_env(),
    };

    // --- Background loops ---
    let cancel = CancellationToken::new();
    let mut handles = Vec::new();

    for index in 0..config.concurrency {
        let runner = JobRunner::new(ctx.clone(), config.poll_interval, index);
        let token = cancel.clone();
        handles.push(tokio::spawn(async move { runner.run(token).await }));
    }

    handles.push(tokio::spawn(reaper::run(
        pool.clone(),
        config.visibility_timeout,
        cancel.clone(),
    )));
    handles.push(tokio::spawn(scheduler::run(
        pool.clone(),
        config.reminder_hour_utc,
        cancel.clone(),
    )));

    tracing::info!(tasks = handles.len(), "Worker started");

    shutdown_signal().await;

    // --- Shutdown ---
    tracing::info!("Shutdown signal received, stopping background tasks");
    cancel.cancel();

    let drain = wait_all(handles);
    if tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), drain)
        .await
        .is_err()
    {
        tracing::warn!("Timed out waiting for jobs to finish; in-flight jobs will be redelivered");
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

async fn wait_all(handles: Vec<tokio::task::JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
