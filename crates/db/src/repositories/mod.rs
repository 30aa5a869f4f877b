//! Repository layer: one zero-sized struct per table, each method taking the pool.

pub mod event_repo;
pub mod job_repo;
pub mod registration_repo;
pub mod reminder_repo;
pub mod user_repo;

pub use event_repo::EventRepo;
pub use job_repo::JobRepo;
pub use registration_repo::RegistrationRepo;
pub use reminder_repo::ReminderRepo;
pub use user_repo::UserRepo;
