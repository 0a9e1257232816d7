//! Domain types and models
//!
//! Appointments live in the local store, remote events come from the
//! calendar provider, integrations connect the two for one tenant.

pub mod appointment;
pub mod integration;
pub mod member;
pub mod remote_event;
pub mod sync;

pub use appointment::{Appointment, AppointmentStatus, RemoteStatus, SyncMetadata, SyncState};
pub use integration::{Integration, IntegrationSettings, ProviderKind, TokenGrant, TokenState};
pub use member::{Member, Membership, Role};
pub use remote_event::{EventDetails, EventDraft, EventPage, RemoteEvent, RemoteEventState};
pub use sync::{FanOutReport, SyncSummary, SyncWindow, TenantSyncResult};
