//! Per-tenant sync lease.
//!
//! A manual trigger can race a scheduled tick for the same tenant. Only one
//! run per tenant may hold the lease; the other fails fast with `Conflict`.

use std::sync::Arc;

use dashmap::DashMap;
use lexsync_domain::{LexSyncError, Result};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held for the duration of one tenant run. Dropping it releases the lease.
#[derive(Debug)]
pub struct TenantLease {
    tenant_id: String,
    _guard: OwnedMutexGuard<()>,
}

impl TenantLease {
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

/// In-process registry of tenant leases.
#[derive(Debug, Default, Clone)]
pub struct TenantLeases {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TenantLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the tenant's lease without waiting.
    pub fn try_acquire(&self, tenant_id: &str) -> Result<TenantLease> {
        let lock = self
            .locks
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.try_lock_owned().map_err(|_| {
            LexSyncError::Conflict(format!("sync already running for tenant {tenant_id}"))
        })?;

        Ok(TenantLease { tenant_id: tenant_id.to_string(), _guard: guard })
    }

    pub fn is_held(&self, tenant_id: &str) -> bool {
        self.locks.get(tenant_id).is_some_and(|lock| lock.try_lock().is_err())
    }
}
