//! Google Calendar v3 adapter
//!
//! Raw JSON stays inside this module: [`types`] holds the wire DTOs and
//! their conversion into `RemoteEvent`, [`provider`] the HTTP calls.

pub mod provider;
pub mod types;

pub use provider::{GoogleCalendarProvider, GoogleCalendarSettings};
