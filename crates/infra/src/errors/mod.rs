//! Infrastructure error handling
//!
//! External crate errors are converted into `LexSyncError` through the
//! [`InfraError`] newtype so the domain crate never depends on them.

pub mod conversions;

pub use conversions::{map_join_error, InfraError};
