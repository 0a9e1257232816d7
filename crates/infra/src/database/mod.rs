//! SQLite implementations of the core repository ports

mod columns;
pub mod appointment_repository;
pub mod integration_repository;
pub mod manager;
pub mod member_repository;

pub use appointment_repository::SqliteAppointmentRepository;
pub use integration_repository::SqliteIntegrationRepository;
pub use manager::{DbManager, SqliteConnection};
pub use member_repository::{hash_api_token, SqliteMemberRepository};
