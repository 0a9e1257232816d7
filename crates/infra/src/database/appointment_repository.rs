//! SQLite-backed appointment repository.
//!
//! Every query is scoped by tenant. Sync metadata lives in plain columns
//! next to the appointment fields so a single `UPDATE` writes both.

use std::sync::Arc;

use async_trait::async_trait;
use lexsync_core::AppointmentRepository as AppointmentRepositoryPort;
use lexsync_domain::{
    Appointment, LexSyncError, ProviderKind, RemoteStatus, Result, SyncMetadata, SyncWindow,
};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::columns::{
    bool_to_int, from_millis, int_to_bool, opt_from_millis, opt_to_millis, parse_text, to_millis,
};
use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::map_join_error;

const SELECT_COLUMNS: &str = "SELECT id, tenant_id, title, start_at, end_at, all_day, location,
        description, external_provider, external_id, remote_updated_at, remote_status,
        remote_link, local_updated_at, status, updated_at
    FROM appointments";

pub struct SqliteAppointmentRepository {
    db: Arc<DbManager>,
}

impl SqliteAppointmentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn query_one(&self, sql: String, args: Vec<String>) -> Result<Option<Appointment>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Option<Appointment>> {
            let conn = db.get_connection()?;
            conn.query_row(&sql, rusqlite::params_from_iter(args.iter()), map_appointment_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl AppointmentRepositoryPort for SqliteAppointmentRepository {
    #[instrument(skip(self, window))]
    async fn list_in_window(
        &self,
        tenant_id: &str,
        window: &SyncWindow,
    ) -> Result<Vec<Appointment>> {
        let db = Arc::clone(&self.db);
        let tenant_id = tenant_id.to_string();
        let (time_min, time_max) = (to_millis(window.time_min), to_millis(window.time_max));
        task::spawn_blocking(move || -> Result<Vec<Appointment>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "{SELECT_COLUMNS} WHERE tenant_id = ?1 AND start_at <= ?3 AND end_at >= ?2
                 ORDER BY start_at, id"
            );
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![tenant_id, time_min, time_max], map_appointment_row)
                .map_err(map_sql_error)?;
            let appointments =
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)?;
            debug!(count = appointments.len(), "appointments in window loaded");
            Ok(appointments)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_external_id(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
        external_id: &str,
    ) -> Result<Option<Appointment>> {
        self.query_one(
            format!(
                "{SELECT_COLUMNS} WHERE tenant_id = ?1 \
                 AND external_provider = ?2 AND external_id = ?3"
            ),
            vec![tenant_id.to_string(), provider.as_str().to_string(), external_id.to_string()],
        )
        .await
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>> {
        self.query_one(
            format!("{SELECT_COLUMNS} WHERE tenant_id = ?1 AND id = ?2"),
            vec![tenant_id.to_string(), id.to_string()],
        )
        .await
    }

    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn insert(&self, appointment: &Appointment) -> Result<()> {
        let db = Arc::clone(&self.db);
        let appointment = appointment.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            insert_appointment(&conn, &appointment).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn update(&self, appointment: &Appointment) -> Result<()> {
        let db = Arc::clone(&self.db);
        let appointment = appointment.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = update_appointment(&conn, &appointment).map_err(map_sql_error)?;
            if changed == 0 {
                return Err(LexSyncError::NotFound(format!("appointment {}", appointment.id)));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let (tenant_id, id) = (tenant_id.to_string(), id.to_string());
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "DELETE FROM appointments WHERE tenant_id = ?1 AND id = ?2",
                params![tenant_id, id],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn insert_appointment(conn: &SqliteConnection, appt: &Appointment) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO appointments (
            id, tenant_id, title, start_at, end_at, all_day, location, description,
            external_provider, external_id, remote_updated_at, remote_status, remote_link,
            local_updated_at, status, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            appt.id,
            appt.tenant_id,
            appt.title,
            to_millis(appt.start),
            to_millis(appt.end),
            bool_to_int(appt.all_day),
            appt.location,
            appt.description,
            appt.external_provider.map(|p| p.as_str()),
            appt.external_id,
            opt_to_millis(appt.sync.remote_updated_at),
            appt.sync.remote_status.map(|s| s.as_str()),
            appt.sync.remote_link,
            opt_to_millis(appt.sync.local_updated_at),
            appt.status.as_str(),
            to_millis(appt.updated_at),
        ],
    )?;
    Ok(())
}

fn update_appointment(conn: &SqliteConnection, appt: &Appointment) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE appointments SET
            title = ?3, start_at = ?4, end_at = ?5, all_day = ?6, location = ?7,
            description = ?8, external_provider = ?9, external_id = ?10,
            remote_updated_at = ?11, remote_status = ?12, remote_link = ?13,
            local_updated_at = ?14, status = ?15, updated_at = ?16
         WHERE tenant_id = ?1 AND id = ?2",
        params![
            appt.tenant_id,
            appt.id,
            appt.title,
            to_millis(appt.start),
            to_millis(appt.end),
            bool_to_int(appt.all_day),
            appt.location,
            appt.description,
            appt.external_provider.map(|p| p.as_str()),
            appt.external_id,
            opt_to_millis(appt.sync.remote_updated_at),
            appt.sync.remote_status.map(|s| s.as_str()),
            appt.sync.remote_link,
            opt_to_millis(appt.sync.local_updated_at),
            appt.status.as_str(),
            to_millis(appt.updated_at),
        ],
    )
}

fn map_appointment_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let external_provider: Option<String> = row.get(8)?;
    let remote_status: Option<String> = row.get(11)?;
    let status: String = row.get(14)?;

    Ok(Appointment {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        title: row.get(2)?,
        start: from_millis(3, row.get(3)?)?,
        end: from_millis(4, row.get(4)?)?,
        all_day: int_to_bool(row.get(5)?),
        location: row.get(6)?,
        description: row.get(7)?,
        external_provider: external_provider
            .as_deref()
            .map(|raw| parse_text::<ProviderKind>(8, raw))
            .transpose()?,
        external_id: row.get(9)?,
        sync: SyncMetadata {
            remote_updated_at: opt_from_millis(10, row.get(10)?)?,
            remote_status: remote_status
                .as_deref()
                .map(|raw| parse_text::<RemoteStatus>(11, raw))
                .transpose()?,
            remote_link: row.get(12)?,
            local_updated_at: opt_from_millis(13, row.get(13)?)?,
        },
        status: parse_text(14, &status)?,
        updated_at: from_millis(15, row.get(15)?)?,
    })
}
