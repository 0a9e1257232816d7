//! SQLite-backed member directory.
//!
//! API tokens are never stored; members are looked up by the SHA-256 hex
//! digest of the presented token.

use std::sync::Arc;

use async_trait::async_trait;
use lexsync_core::MemberDirectory;
use lexsync_domain::{Member, Membership, Result};
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use tokio::task;
use tracing::instrument;

use super::columns::parse_text;
use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::map_join_error;

/// SHA-256 hex digest of an API token.
pub fn hash_api_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub struct SqliteMemberRepository {
    db: Arc<DbManager>,
}

impl SqliteMemberRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Register a member with its memberships and API token.
    pub async fn insert_member(&self, member: &Member, api_token: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let member = member.clone();
        let token_hash = hash_api_token(api_token);
        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute(
                "INSERT INTO members (id, email, api_token_hash) VALUES (?1, ?2, ?3)",
                params![member.id, member.email, token_hash],
            )
            .map_err(map_sql_error)?;
            for membership in &member.memberships {
                tx.execute(
                    "INSERT INTO memberships (member_id, tenant_id, role) VALUES (?1, ?2, ?3)",
                    params![member.id, membership.tenant_id, membership.role.as_str()],
                )
                .map_err(map_sql_error)?;
            }
            tx.commit().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl MemberDirectory for SqliteMemberRepository {
    #[instrument(skip_all)]
    async fn find_by_api_token(&self, token: &str) -> Result<Option<Member>> {
        let db = Arc::clone(&self.db);
        let token_hash = hash_api_token(token);
        task::spawn_blocking(move || -> Result<Option<Member>> {
            let conn = db.get_connection()?;
            find_member(&conn, &token_hash).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn find_member(conn: &SqliteConnection, token_hash: &str) -> rusqlite::Result<Option<Member>> {
    let Some((id, email)) = conn
        .query_row(
            "SELECT id, email FROM members WHERE api_token_hash = ?1",
            params![token_hash],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT tenant_id, role FROM memberships WHERE member_id = ?1 ORDER BY tenant_id",
    )?;
    let memberships = stmt
        .query_map(params![id], |row| {
            let role: String = row.get(1)?;
            Ok(Membership { tenant_id: row.get(0)?, role: parse_text(1, &role)? })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(Member { id, email, memberships }))
}
