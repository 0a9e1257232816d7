//! # LexSync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - SQLite repositories for integrations, appointments and members
//! - The Google Calendar provider
//! - Configuration loading
//! - The cron scheduler that drives the fan-out
//!
//! ## Architecture
//! - Implements traits defined in `lexsync-core`
//! - Depends on `lexsync-domain` and `lexsync-core`
//! - Contains all "impure" code (I/O, HTTP, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use integrations::*;
pub use scheduling::*;
