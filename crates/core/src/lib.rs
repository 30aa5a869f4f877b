//! Domain logic for the event registration backend.
//!
//! Everything in this crate is pure: no database, no network, no async. The
//! `db`, `api` and `worker` crates build on these types and rules.

pub mod capacity;
pub mod error;
pub mod event_rules;
pub mod jobs;
pub mod notifications;
pub mod registration;
pub mod report;
pub mod roles;
pub mod types;
