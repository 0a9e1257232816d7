//! Caller identity for manual sync requests.

use serde::{Deserialize, Serialize};

use crate::errors::{LexSyncError, Result};
use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Staff,
    Viewer,
}

impl_domain_status_conversions!(Role {
    Owner => "owner",
    Admin => "admin",
    Staff => "staff",
    Viewer => "viewer",
});

impl Role {
    /// Roles allowed to trigger a sync.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub tenant_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub email: String,
    pub memberships: Vec<Membership>,
}

impl Member {
    /// Tenant a manual sync should run for.
    ///
    /// An explicit tenant requires an elevated role in it. Without one the
    /// caller must hold exactly one elevated membership.
    pub fn resolve_sync_tenant(&self, requested: Option<&str>) -> Result<String> {
        let mut elevated = self.memberships.iter().filter(|m| m.role.is_elevated());

        if let Some(tenant_id) = requested.map(str::trim).filter(|t| !t.is_empty()) {
            return elevated
                .find(|m| m.tenant_id == tenant_id)
                .map(|m| m.tenant_id.clone())
                .ok_or_else(|| {
                    LexSyncError::Forbidden(format!("no elevated role in tenant {tenant_id}"))
                });
        }

        match (elevated.next(), elevated.next()) {
            (Some(only), None) => Ok(only.tenant_id.clone()),
            (None, _) => Err(LexSyncError::Forbidden("no elevated membership".to_string())),
            (Some(_), Some(_)) => Err(LexSyncError::Forbidden(
                "multiple elevated memberships; tenantId is required".to_string(),
            )),
        }
    }
}
