//! Shared persistence for hierarchical entities.
//!
//! # Responsibility
//! - Classify SQLite failures into semantic repository errors.
//! - Describe per-kind table layout so generic queries stay in one place.
//! - Provide tenant-scoped load, uniqueness, listing and patch queries.
//!
//! # Invariants
//! - Every statement carries a `tenant_id = ?` predicate.
//! - Default reads select from the `active_*` views, never the raw tables.
//! - Every public method runs under a [`QueryDeadline`].

use crate::db::{DbError, QueryDeadline};
use crate::model::entity::{CollectionId, Entity, EntityKind, EntityRef, ParentScope};
use rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Canonical write timestamp, evaluated by SQLite.
pub(crate) const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntityRef),
    /// A partial unique index rejected the write.
    UniqueViolation,
    /// Busy wait or statement deadline exceeded.
    Timeout,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::UniqueViolation => write!(f, "unique constraint violated"),
            Self::Timeout => write!(f, "storage deadline exceeded"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        let failure = value
            .sqlite_error()
            .map(|failure| (failure.code, failure.extended_code));
        match failure {
            Some((ErrorCode::ConstraintViolation, extended))
                if extended == SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::UniqueViolation
            }
            Some((
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::OperationInterrupted,
                _,
            )) => Self::Timeout,
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Table layout of one entity kind.
#[derive(Debug)]
pub struct TableSpec {
    pub kind: EntityKind,
    pub table: &'static str,
    /// View with soft-deleted rows filtered out.
    pub active_view: &'static str,
    pub id_column: &'static str,
    pub parent_column: &'static str,
}

pub const COLLECTIONS: TableSpec = TableSpec {
    kind: EntityKind::Collection,
    table: "collections",
    active_view: "active_collections",
    id_column: "collection_id",
    parent_column: "parent_id",
};

pub const WORKBOOKS: TableSpec = TableSpec {
    kind: EntityKind::Workbook,
    table: "workbooks",
    active_view: "active_workbooks",
    id_column: "workbook_id",
    parent_column: "collection_id",
};

impl TableSpec {
    pub fn for_kind(kind: EntityKind) -> &'static TableSpec {
        match kind {
            EntityKind::Collection => &COLLECTIONS,
            EntityKind::Workbook => &WORKBOOKS,
        }
    }

    fn source(&self, include_deleted: bool) -> &'static str {
        if include_deleted {
            self.table
        } else {
            self.active_view
        }
    }
}

/// Compile-time factory: maps one kind's rows to its domain record.
pub trait EntityRecord: Entity + Sized {
    const TABLE: &'static TableSpec;
    /// Select list understood by [`EntityRecord::from_row`].
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Field changes applied by [`SqliteEntityRepository::patch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityPatch {
    /// New title; `title_lower` is derived from it.
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub parent: Option<Option<CollectionId>>,
}

impl EntityPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.parent.is_none()
    }
}

/// Kind-generic queries over one connection target.
///
/// The connection may be the primary, the replica, or an open transaction.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
    query_timeout: Duration,
}

impl<'conn> SqliteEntityRepository<'conn> {
    pub fn new(conn: &'conn Connection, query_timeout: Duration) -> Self {
        Self {
            conn,
            query_timeout,
        }
    }

    /// Loads one entity of the tenant. Foreign-tenant ids read as absent.
    pub fn load<T: EntityRecord>(
        &self,
        tenant_id: &str,
        id: i64,
        include_deleted: bool,
    ) -> RepoResult<Option<T>> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let spec = T::TABLE;
        let sql = format!(
            "SELECT {} FROM {} WHERE tenant_id = ?1 AND {} = ?2;",
            T::COLUMNS,
            spec.source(include_deleted),
            spec.id_column
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![tenant_id, id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(T::from_row(row)?));
        }
        Ok(None)
    }

    /// Loads one active entity or fails with `NotFound`.
    pub fn load_required<T: EntityRecord>(&self, tenant_id: &str, id: i64) -> RepoResult<T> {
        self.load(tenant_id, id, false)?.ok_or(RepoError::NotFound(EntityRef {
            kind: T::KIND,
            id,
        }))
    }

    /// Whether an active sibling of `kind` already uses `title_lower`.
    ///
    /// `exclude_id` skips the entity's own row on rename/move.
    pub fn title_exists(
        &self,
        tenant_id: &str,
        kind: EntityKind,
        scope: ParentScope,
        title_lower: &str,
        exclude_id: Option<i64>,
    ) -> RepoResult<bool> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let spec = TableSpec::for_kind(kind);
        // IFNULL(parent, 0) mirrors the unique index expression.
        let sql = format!(
            "SELECT EXISTS(
                SELECT 1
                FROM {view}
                WHERE tenant_id = ?1
                  AND IFNULL({parent}, 0) = ?2
                  AND title_lower = ?3
                  AND (?4 IS NULL OR {id} <> ?4)
            );",
            view = spec.active_view,
            parent = spec.parent_column,
            id = spec.id_column
        );
        let exists: i64 = self.conn.query_row(
            &sql,
            params![tenant_id, scope_key(scope), title_lower, exclude_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Lists active children of one scope, ordered by title.
    pub fn list_children<T: EntityRecord>(
        &self,
        tenant_id: &str,
        scope: ParentScope,
    ) -> RepoResult<Vec<T>> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let spec = T::TABLE;
        let sql = format!(
            "SELECT {} FROM {} WHERE tenant_id = ?1 AND IFNULL({}, 0) = ?2
             ORDER BY title_lower ASC, {} ASC;",
            T::COLUMNS,
            spec.active_view,
            spec.parent_column,
            spec.id_column
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![tenant_id, scope_key(scope)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(T::from_row(row)?);
        }
        Ok(items)
    }

    /// Counts active children of `kind` in one scope.
    pub fn count_children(
        &self,
        tenant_id: &str,
        kind: EntityKind,
        scope: ParentScope,
    ) -> RepoResult<u64> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let spec = TableSpec::for_kind(kind);
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE tenant_id = ?1 AND IFNULL({}, 0) = ?2;",
            spec.active_view, spec.parent_column
        );
        let count: i64 =
            self.conn
                .query_row(&sql, params![tenant_id, scope_key(scope)], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }

    /// Applies title/description/parent changes to one active row.
    pub fn patch(
        &self,
        kind: EntityKind,
        tenant_id: &str,
        user_id: &str,
        id: i64,
        patch: &EntityPatch,
    ) -> RepoResult<()> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let spec = TableSpec::for_kind(kind);
        let mut assignments = vec![
            "updated_by = ?".to_string(),
            format!("updated_at = {NOW_MS_SQL}"),
        ];
        let mut bind_values: Vec<Value> = vec![Value::Text(user_id.to_string())];

        if let Some(title) = patch.title.as_ref() {
            assignments.push("title = ?".to_string());
            bind_values.push(Value::Text(title.clone()));
            assignments.push("title_lower = ?".to_string());
            bind_values.push(Value::Text(crate::model::entity::lower_title(title)));
        }
        if let Some(description) = patch.description.as_ref() {
            assignments.push("description = ?".to_string());
            bind_values.push(description.clone().map_or(Value::Null, Value::Text));
        }
        if let Some(parent) = patch.parent {
            assignments.push(format!("{} = ?", spec.parent_column));
            bind_values.push(parent.map_or(Value::Null, |id| Value::Integer(id.get())));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE tenant_id = ? AND {} = ? AND deleted_at IS NULL;",
            spec.table,
            assignments.join(", "),
            spec.id_column
        );
        bind_values.push(Value::Text(tenant_id.to_string()));
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef { kind, id }));
        }
        Ok(())
    }

    /// Reads the parent pointer of one active collection.
    ///
    /// Returns `None` when the collection is missing, deleted or foreign.
    pub fn parent_of(
        &self,
        tenant_id: &str,
        collection_id: CollectionId,
    ) -> RepoResult<Option<Option<CollectionId>>> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let parent = self
            .conn
            .query_row(
                "SELECT parent_id
                 FROM active_collections
                 WHERE tenant_id = ?1
                   AND collection_id = ?2;",
                params![tenant_id, collection_id.get()],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(parent.map(|value| value.map(CollectionId)))
    }
}

/// Root scope folds to 0, matching `IFNULL(parent, 0)` in indexes and queries.
fn scope_key(scope: ParentScope) -> i64 {
    scope.collection_id().map_or(0, CollectionId::get)
}

pub(crate) fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{RepoError, COLLECTIONS, WORKBOOKS};
    use crate::model::entity::EntityKind;
    use rusqlite::ffi;

    fn sqlite_failure(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(extended_code), None)
    }

    #[test]
    fn classifies_sqlite_failures() {
        assert!(matches!(
            RepoError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_UNIQUE)),
            RepoError::UniqueViolation
        ));
        assert!(matches!(
            RepoError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)),
            RepoError::Db(_)
        ));
        for code in [ffi::SQLITE_BUSY, ffi::SQLITE_LOCKED, ffi::SQLITE_INTERRUPT] {
            assert!(matches!(
                RepoError::from(sqlite_failure(code)),
                RepoError::Timeout
            ));
        }
        assert!(matches!(
            RepoError::from(rusqlite::Error::QueryReturnedNoRows),
            RepoError::Db(_)
        ));
    }

    #[test]
    fn table_specs_read_from_active_views() {
        assert_eq!(COLLECTIONS.kind, EntityKind::Collection);
        assert_eq!(COLLECTIONS.source(false), "active_collections");
        assert_eq!(WORKBOOKS.source(false), "active_workbooks");
        assert_eq!(WORKBOOKS.source(true), "workbooks");
    }
}
