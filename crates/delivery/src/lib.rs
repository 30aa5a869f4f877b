//! Outbound side-effect channels used by background jobs.
//!
//! - [`email`]: the [`Mailer`] trait with SMTP and log-only implementations.
//! - [`storage`]: the [`BlobStore`] trait with a local filesystem implementation.

pub mod email;
pub mod storage;

pub use email::{sender_from_env, EmailConfig, EmailError, LogMailer, Mailer, SmtpMailer};
pub use storage::{BlobStore, LocalBlobStore, StorageError};
