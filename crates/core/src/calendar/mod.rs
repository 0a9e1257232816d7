//! Calendar reconciliation
//!
//! A tenant run is strictly sequential: refresh the token, fetch the whole
//! remote window, pull it into the local store, then push local changes.
//! Push reads the `remote_updated_at` values recorded by pull, so pull must
//! finish before push starts.

pub mod fan_out;
pub mod fetcher;
pub mod lease;
pub mod orchestrator;
pub mod ports;
pub mod reconcile;
pub mod token;
