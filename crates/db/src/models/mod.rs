//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and partial updates where the entity has them

pub mod event;
pub mod job;
pub mod registration;
pub mod reminder;
pub mod status;
pub mod user;
