//! SQLite-backed tenant integration repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use lexsync_core::IntegrationRepository as IntegrationRepositoryPort;
use lexsync_domain::{
    Integration, IntegrationSettings, LexSyncError, ProviderKind, Result, TokenState,
};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::columns::{
    bool_to_int, int_to_bool, opt_from_millis, opt_to_millis, parse_text, to_millis,
};
use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::map_join_error;

const SELECT_COLUMNS: &str = "SELECT id, tenant_id, provider, enabled, access_token, refresh_token,
        token_expires_at, scope, calendar_id
    FROM integrations";

/// Integration rows, one per tenant and provider.
pub struct SqliteIntegrationRepository {
    db: Arc<DbManager>,
}

impl SqliteIntegrationRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a tenant's integration (used when connecting a
    /// calendar and by fixtures).
    pub async fn upsert(&self, integration: &Integration) -> Result<()> {
        let db = Arc::clone(&self.db);
        let integration = integration.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            upsert_integration(&conn, &integration).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl IntegrationRepositoryPort for SqliteIntegrationRepository {
    #[instrument(skip(self))]
    async fn list_enabled(&self, provider: ProviderKind) -> Result<Vec<Integration>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<Integration>> {
            let conn = db.get_connection()?;
            let sql =
                format!("{SELECT_COLUMNS} WHERE provider = ?1 AND enabled = 1 ORDER BY tenant_id");
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![provider.as_str()], map_integration_row)
                .map_err(map_sql_error)?;
            let integrations =
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)?;
            debug!(count = integrations.len(), "enabled integrations loaded");
            Ok(integrations)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn find_for_tenant(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
    ) -> Result<Option<Integration>> {
        let db = Arc::clone(&self.db);
        let tenant_id = tenant_id.to_string();
        task::spawn_blocking(move || -> Result<Option<Integration>> {
            let conn = db.get_connection()?;
            let sql = format!("{SELECT_COLUMNS} WHERE tenant_id = ?1 AND provider = ?2");
            conn.query_row(&sql, params![tenant_id, provider.as_str()], map_integration_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, tokens))]
    async fn save_token_state(&self, integration_id: &str, tokens: &TokenState) -> Result<()> {
        let db = Arc::clone(&self.db);
        let integration_id = integration_id.to_string();
        let tokens = tokens.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE integrations
                     SET access_token = ?2, refresh_token = ?3, token_expires_at = ?4, scope = ?5
                     WHERE id = ?1",
                    params![
                        integration_id,
                        tokens.access_token,
                        tokens.refresh_token,
                        opt_to_millis(tokens.expires_at),
                        tokens.scope,
                    ],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(LexSyncError::NotFound(format!("integration {integration_id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn upsert_integration(conn: &SqliteConnection, integration: &Integration) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO integrations (
            id, tenant_id, provider, enabled, access_token, refresh_token,
            token_expires_at, scope, calendar_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT (tenant_id, provider) DO UPDATE SET
            enabled = excluded.enabled,
            access_token = excluded.access_token,
            refresh_token = excluded.refresh_token,
            token_expires_at = excluded.token_expires_at,
            scope = excluded.scope,
            calendar_id = excluded.calendar_id",
        params![
            integration.id,
            integration.tenant_id,
            integration.provider.as_str(),
            bool_to_int(integration.enabled),
            integration.tokens.access_token,
            integration.tokens.refresh_token,
            opt_to_millis(integration.tokens.expires_at),
            integration.tokens.scope,
            integration.settings.calendar_id,
            to_millis(Utc::now()),
        ],
    )?;
    Ok(())
}

fn map_integration_row(row: &Row<'_>) -> rusqlite::Result<Integration> {
    let provider: String = row.get(2)?;
    Ok(Integration {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        provider: parse_text(2, &provider)?,
        enabled: int_to_bool(row.get(3)?),
        tokens: TokenState {
            access_token: row.get(4)?,
            refresh_token: row.get(5)?,
            expires_at: opt_from_millis(6, row.get(6)?)?,
            scope: row.get(7)?,
        },
        settings: IntegrationSettings { calendar_id: row.get(8)? },
    })
}
