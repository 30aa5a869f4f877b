//! Background job execution for event registration.
//!
//! Each long-running loop ([`runner::JobRunner`], [`reaper::run`],
//! [`scheduler::run`]) is intended to be spawned via `tokio::spawn` and
//! accepts a `CancellationToken` for graceful shutdown.

pub mod config;
pub mod context;
pub mod jobs;
pub mod reaper;
pub mod runner;
pub mod scheduler;
