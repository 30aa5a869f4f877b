//! Capacity ledger arithmetic.
//!
//! The registered count is always derived by counting registration rows at
//! the moment of the check; these helpers only interpret a count against an
//! event's capacity. The atomic check-and-insert lives in
//! `RegistrationRepo::insert_guarded`.

use serde::Serialize;

/// Snapshot of an event's capacity at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityStatus {
    /// Maximum number of registrations the event permits.
    pub total: i64,
    /// Registrations counted when the snapshot was taken.
    pub registered: i64,
    /// `total - registered`.
    pub remaining: i64,
}

impl CapacityStatus {
    pub fn new(capacity: i32, registered: i64) -> Self {
        Self {
            total: i64::from(capacity),
            registered,
            remaining: remaining(capacity, registered),
        }
    }

    /// True when one more registration still fits.
    pub fn has_capacity(&self) -> bool {
        self.registered < self.total
    }
}

/// `capacity - count`. Negative only if the ledger was already overbooked.
fn remaining(capacity: i32, count: i64) -> i64 {
    i64::from(capacity) - count
}
