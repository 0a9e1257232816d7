//! # LexSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the calendar provider and the
//!   local stores
//! - The reconciliation engine and the services that drive it
//!
//! ## Architecture Principles
//! - Only depends on `lexsync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod calendar;

pub use calendar::fan_out::FanOutDriver;
pub use calendar::fetcher::EventFetcher;
pub use calendar::lease::{TenantLease, TenantLeases};
pub use calendar::orchestrator::{SyncOrchestrator, SyncSettings};
pub use calendar::ports::{
    AppointmentRepository, CalendarProvider, Clock, IntegrationRepository, MemberDirectory,
    SystemClock,
};
pub use calendar::reconcile::{PullOutcome, PushOutcome, Reconciler, RemoteTarget};
pub use calendar::token::TokenManager;
