use std::time::Duration;

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent job runners (default: `4`).
    pub concurrency: usize,
    /// How often an idle runner polls for pending jobs (default: `1000` ms).
    pub poll_interval: Duration,
    /// How long a claimed job may stay `running` before it is redelivered
    /// (default: `300` s).
    pub visibility_timeout: Duration,
    /// Root directory of the local blob store (default: `./storage`).
    pub storage_dir: String,
    /// UTC hour at which the daily reminder job is enqueued (default: `8`).
    pub reminder_hour_utc: u32,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default     |
    /// |------------------------------|-------------|
    /// | `WORKER_CONCURRENCY`         | `4`         |
    /// | `WORKER_POLL_INTERVAL_MS`    | `1000`      |
    /// | `JOB_VISIBILITY_TIMEOUT_SECS`| `300`       |
    /// | `REPORT_STORAGE_DIR`         | `./storage` |
    /// | `REMINDER_HOUR_UTC`          | `8`         |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`        |
    pub fn from_env() -> Self {
        let concurrency: usize = std::env::var("WORKER_CONCURRENCY")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("WORKER_CONCURRENCY must be a valid usize");

        let poll_interval_ms: u64 = std::env::var("WORKER_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("WORKER_POLL_INTERVAL_MS must be a valid u64");

        let visibility_timeout_secs: u64 = std::env::var("JOB_VISIBILITY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("JOB_VISIBILITY_TIMEOUT_SECS must be a valid u64");

        let storage_dir =
            std::env::var("REPORT_STORAGE_DIR").unwrap_or_else(|_| "./storage".into());

        let reminder_hour_utc: u32 = std::env::var("REMINDER_HOUR_UTC")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("REMINDER_HOUR_UTC must be a valid u32");
        assert!(reminder_hour_utc < 24, "REMINDER_HOUR_UTC must be between 0 and 23");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            concurrency: concurrency.max(1),
            poll_interval: Duration::from_millis(poll_interval_ms),
            visibility_timeout: Duration::from_secs(visibility_timeout_secs),
            storage_dir,
            reminder_hour_utc,
            shutdown_timeout_secs,
        }
    }
}
