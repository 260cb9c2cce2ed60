//! Access binding persistence.
//!
//! # Invariants
//! - One binding per `(tenant, kind, entity)`; re-registration overwrites the
//!   ancestor chain in place.
//! - `ancestor_ids` is a root-first JSON array of collection ids.
//! - A pending binding always carries an `operation_id`.

use crate::db::QueryDeadline;
use crate::model::entity::{CollectionId, EntityKind, EntityRef};
use crate::repo::entity_repo::{RepoError, RepoResult, NOW_MS_SQL};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Duration;
use uuid::Uuid;

/// Binding lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStatus {
    Active,
    Pending,
}

impl BindingStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Stored access binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessBinding {
    pub tenant_id: String,
    pub entity: EntityRef,
    pub ancestor_ids: Vec<CollectionId>,
    pub status: BindingStatus,
    pub operation_id: Option<Uuid>,
    pub registered_by: String,
    pub updated_at: i64,
}

/// SQLite-backed binding repository.
pub struct SqliteBindingRepository<'conn> {
    conn: &'conn Connection,
    query_timeout: Duration,
}

impl<'conn> SqliteBindingRepository<'conn> {
    pub fn new(conn: &'conn Connection, query_timeout: Duration) -> Self {
        Self {
            conn,
            query_timeout,
        }
    }

    /// Inserts or replaces the binding of one entity.
    pub fn upsert(
        &self,
        tenant_id: &str,
        user_id: &str,
        entity: EntityRef,
        ancestor_ids: &[CollectionId],
        status: BindingStatus,
        operation_id: Option<Uuid>,
    ) -> RepoResult<()> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let ancestors = serde_json::to_string(ancestor_ids)
            .map_err(|err| RepoError::InvalidData(format!("ancestor ids: {err}")))?;
        self.conn.execute(
            &format!(
                "INSERT INTO access_bindings (
                    tenant_id,
                    entity_kind,
                    entity_id,
                    ancestor_ids,
                    status,
                    operation_id,
                    registered_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(tenant_id, entity_kind, entity_id) DO UPDATE SET
                    ancestor_ids = excluded.ancestor_ids,
                    status = excluded.status,
                    operation_id = excluded.operation_id,
                    registered_by = excluded.registered_by,
                    updated_at = {NOW_MS_SQL};"
            ),
            params![
                tenant_id,
                entity.kind.as_str(),
                entity.id,
                ancestors,
                status.as_str(),
                operation_id.map(|value| value.to_string()),
                user_id,
            ],
        )?;
        Ok(())
    }

    /// Marks the pending binding behind `operation_id` as active.
    ///
    /// Returns `None` when no binding of the tenant carries that operation.
    pub fn activate(&self, tenant_id: &str, operation_id: Uuid) -> RepoResult<Option<EntityRef>> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let entity = self
            .conn
            .query_row(
                "SELECT entity_kind, entity_id
                 FROM access_bindings
                 WHERE tenant_id = ?1
                   AND operation_id = ?2;",
                params![tenant_id, operation_id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        let Some((kind_text, id)) = entity else {
            return Ok(None);
        };

        self.conn.execute(
            &format!(
                "UPDATE access_bindings
                 SET status = 'active',
                     updated_at = {NOW_MS_SQL}
                 WHERE tenant_id = ?1
                   AND operation_id = ?2;"
            ),
            params![tenant_id, operation_id.to_string()],
        )?;
        Ok(Some(EntityRef {
            kind: parse_kind(&kind_text)?,
            id,
        }))
    }

    /// Loads the binding of one entity.
    pub fn get(&self, tenant_id: &str, entity: EntityRef) -> RepoResult<Option<AccessBinding>> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let mut stmt = self.conn.prepare(
            "SELECT
                tenant_id,
                entity_kind,
                entity_id,
                ancestor_ids,
                status,
                operation_id,
                registered_by,
                updated_at
             FROM access_bindings
             WHERE tenant_id = ?1
               AND entity_kind = ?2
               AND entity_id = ?3;",
        )?;
        let mut rows = stmt.query(params![tenant_id, entity.kind.as_str(), entity.id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_binding_row(row)?));
        }
        Ok(None)
    }
}

fn parse_binding_row(row: &Row<'_>) -> RepoResult<AccessBinding> {
    let kind_text: String = row.get("entity_kind")?;
    let ancestors_text: String = row.get("ancestor_ids")?;
    let ancestor_ids: Vec<CollectionId> = serde_json::from_str(&ancestors_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in access_bindings.ancestor_ids: {err}"))
    })?;
    let status_text: String = row.get("status")?;
    let status = BindingStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in access_bindings.status"
        ))
    })?;
    let operation_id = row
        .get::<_, Option<String>>("operation_id")?
        .map(|value| {
            Uuid::parse_str(&value).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid uuid `{value}` in access_bindings.operation_id"
                ))
            })
        })
        .transpose()?;

    Ok(AccessBinding {
        tenant_id: row.get("tenant_id")?,
        entity: EntityRef {
            kind: parse_kind(&kind_text)?,
            id: row.get("entity_id")?,
        },
        ancestor_ids,
        status,
        operation_id,
        registered_by: row.get("registered_by")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_kind(value: &str) -> RepoResult<EntityKind> {
    EntityKind::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entity kind `{value}` in access_bindings.entity_kind"
        ))
    })
}
