//! Conversions from external infrastructure errors into domain errors.

use lexsync_domain::LexSyncError;
use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LexSyncError);

impl From<InfraError> for LexSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LexSyncError> for InfraError {
    fn from(value: LexSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLexSyncError {
    fn into_lexsync(self) -> LexSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LexSyncError */
/* -------------------------------------------------------------------------- */

impl IntoLexSyncError for SqlError {
    fn into_lexsync(self) -> LexSyncError {
        match &self {
            SqlError::QueryReturnedNoRows => LexSyncError::NotFound("row not found".into()),
            SqlError::SqliteFailure(err, message) => sqlite_failure(err, message.as_deref()),
            SqlError::FromSqlConversionFailure(column, _, cause) => LexSyncError::Database(
                format!("column {column} holds an unreadable value: {cause}"),
            ),
            _ => LexSyncError::Database(self.to_string()),
        }
    }
}

/// Busy and locked mean the pool's busy timeout already elapsed, so the
/// statement was not applied and the next run will retry it.
fn sqlite_failure(err: &rusqlite::ffi::Error, message: Option<&str>) -> LexSyncError {
    use rusqlite::ffi::{
        ErrorCode, SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_PRIMARYKEY,
        SQLITE_CONSTRAINT_UNIQUE,
    };

    let detail = message.unwrap_or("no detail");
    let text = match err.code {
        ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
            format!("database busy past the busy timeout, statement not applied: {detail}")
        }
        ErrorCode::ConstraintViolation => match err.extended_code {
            SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                format!("unique constraint violation: {detail}")
            }
            SQLITE_CONSTRAINT_FOREIGNKEY => {
                format!("foreign key constraint violation: {detail}")
            }
            _ => format!("constraint violation: {detail}"),
        },
        code => format!("sqlite {code:?} (extended code {}): {detail}", err.extended_code),
    };
    LexSyncError::Database(text)
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_lexsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → LexSyncError */
/* -------------------------------------------------------------------------- */

impl IntoLexSyncError for PoolError {
    fn into_lexsync(self) -> LexSyncError {
        LexSyncError::Database(format!("connection pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_lexsync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LexSyncError */
/* -------------------------------------------------------------------------- */

impl IntoLexSyncError for HttpError {
    fn into_lexsync(self) -> LexSyncError {
        if self.is_timeout() {
            return LexSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return LexSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => LexSyncError::Auth(message),
                404 => LexSyncError::NotFound(message),
                _ => LexSyncError::RemoteApi(message),
            };
        }

        if self.is_decode() {
            return LexSyncError::RemoteApi(format!("malformed response body: {self}"));
        }

        LexSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_lexsync())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → LexSyncError */
/* -------------------------------------------------------------------------- */

/// Map a failed `spawn_blocking` join into a domain error.
pub fn map_join_error(err: JoinError) -> LexSyncError {
    if err.is_cancelled() {
        LexSyncError::Internal("blocking database task was cancelled".into())
    } else {
        LexSyncError::Internal(format!("blocking database task panicked: {err}"))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
