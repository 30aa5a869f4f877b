use std::sync::Arc;

use eventreg_db::DbPool;
use eventreg_delivery::{BlobStore, Mailer};

/// Everything a job handler needs to do its work.
///
/// Cheaply cloneable; one instance is shared by every runner.
#[derive(Clone)]
pub struct JobContext {
    pub pool: DbPool,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn BlobStore>,
    /// Sender address for every outgoing email.
    pub from_address: String,
}
