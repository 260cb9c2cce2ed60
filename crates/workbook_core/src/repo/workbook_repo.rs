//! Workbook and workbook-entry persistence.
//!
//! # Responsibility
//! - Insert workbook rows and map them to [`Workbook`].
//! - Patch workbook-only flags and soft-delete single workbooks.
//! - Own the `workbook_entries` relation.
//!
//! # Invariants
//! - `meta` is stored as JSON text and must parse back into a JSON value.
//! - Entries are only visible while their workbook is active.

use crate::db::QueryDeadline;
use crate::model::entity::{CollectionId, WorkbookId};
use crate::model::workbook::{Workbook, WorkbookEntry};
use crate::repo::entity_repo::{
    parse_bool, EntityRecord, RepoError, RepoResult, TableSpec, NOW_MS_SQL, WORKBOOKS,
};
use rusqlite::{params, Connection, Row};
use std::time::Duration;

const WORKBOOK_COLUMNS: &str = "workbook_id,
    collection_id,
    title,
    title_lower,
    description,
    tenant_id,
    project_id,
    meta,
    is_template,
    created_by,
    created_at,
    updated_by,
    updated_at,
    deleted_by,
    deleted_at";

impl EntityRecord for Workbook {
    const TABLE: &'static TableSpec = &WORKBOOKS;
    const COLUMNS: &'static str = WORKBOOK_COLUMNS;

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let meta_text: String = row.get("meta")?;
        let meta = serde_json::from_str(&meta_text)
            .map_err(|err| RepoError::InvalidData(format!("invalid json in workbooks.meta: {err}")))?;

        Ok(Workbook {
            workbook_id: WorkbookId(row.get("workbook_id")?),
            collection_id: row.get::<_, Option<i64>>("collection_id")?.map(CollectionId),
            title: row.get("title")?,
            title_lower: row.get("title_lower")?,
            description: row.get("description")?,
            tenant_id: row.get("tenant_id")?,
            project_id: row.get("project_id")?,
            meta,
            is_template: parse_bool(row.get("is_template")?, "workbooks.is_template")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
            updated_by: row.get("updated_by")?,
            updated_at: row.get("updated_at")?,
            deleted_by: row.get("deleted_by")?,
            deleted_at: row.get("deleted_at")?,
            entries: None,
        })
    }
}

/// Insert payload for one workbook row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkbook<'a> {
    pub collection_id: Option<CollectionId>,
    pub title: &'a str,
    pub title_lower: &'a str,
    pub description: Option<&'a str>,
    pub tenant_id: &'a str,
    pub project_id: Option<&'a str>,
    pub meta: &'a serde_json::Value,
    pub user_id: &'a str,
}

/// SQLite-backed workbook repository.
pub struct SqliteWorkbookRepository<'conn> {
    conn: &'conn Connection,
    query_timeout: Duration,
}

impl<'conn> SqliteWorkbookRepository<'conn> {
    pub fn new(conn: &'conn Connection, query_timeout: Duration) -> Self {
        Self {
            conn,
            query_timeout,
        }
    }

    /// Inserts one workbook and returns the storage-generated id.
    pub fn insert(&self, new: &NewWorkbook<'_>) -> RepoResult<WorkbookId> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        self.conn.execute(
            "INSERT INTO workbooks (
                collection_id,
                title,
                title_lower,
                description,
                tenant_id,
                project_id,
                meta,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
            params![
                new.collection_id.map(CollectionId::get),
                new.title,
                new.title_lower,
                new.description,
                new.tenant_id,
                new.project_id,
                new.meta.to_string(),
                new.user_id,
            ],
        )?;
        Ok(WorkbookId(self.conn.last_insert_rowid()))
    }

    /// Sets the template flag on one active workbook.
    pub fn set_is_template(
        &self,
        tenant_id: &str,
        user_id: &str,
        workbook_id: WorkbookId,
        is_template: bool,
    ) -> RepoResult<()> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let changed = self.conn.execute(
            &format!(
                "UPDATE workbooks
                 SET is_template = ?4,
                     updated_by = ?2,
                     updated_at = {NOW_MS_SQL}
                 WHERE tenant_id = ?1
                   AND workbook_id = ?3
                   AND deleted_at IS NULL;"
            ),
            params![tenant_id, user_id, workbook_id.get(), is_template],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(workbook_id.into()));
        }
        Ok(())
    }

    /// Marks one active workbook as deleted.
    pub fn soft_delete(
        &self,
        tenant_id: &str,
        user_id: &str,
        workbook_id: WorkbookId,
    ) -> RepoResult<()> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let changed = self.conn.execute(
            &format!(
                "UPDATE workbooks
                 SET deleted_at = {NOW_MS_SQL},
                     deleted_by = ?2
                 WHERE tenant_id = ?1
                   AND workbook_id = ?3
                   AND deleted_at IS NULL;"
            ),
            params![tenant_id, user_id, workbook_id.get()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(workbook_id.into()));
        }
        Ok(())
    }

    /// Adds one entry to an active workbook.
    pub fn insert_entry(
        &self,
        tenant_id: &str,
        user_id: &str,
        workbook_id: WorkbookId,
        name: &str,
        scope: &str,
    ) -> RepoResult<i64> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let changed = self.conn.execute(
            "INSERT INTO workbook_entries (workbook_id, tenant_id, name, scope, created_by)
             SELECT workbook_id, tenant_id, ?3, ?4, ?5
             FROM active_workbooks
             WHERE tenant_id = ?1
               AND workbook_id = ?2;",
            params![tenant_id, workbook_id.get(), name, scope, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(workbook_id.into()));
        }
        Ok(self.conn.last_insert_rowid())
    }

    /// Lists active entries of one workbook in creation order.
    pub fn list_entries(
        &self,
        tenant_id: &str,
        workbook_id: WorkbookId,
    ) -> RepoResult<Vec<WorkbookEntry>> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let mut stmt = self.conn.prepare(
            "SELECT entry_id, workbook_id, tenant_id, name, scope, created_by, created_at
             FROM active_workbook_entries
             WHERE tenant_id = ?1
               AND workbook_id = ?2
             ORDER BY entry_id ASC;",
        )?;
        let mut rows = stmt.query(params![tenant_id, workbook_id.get()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(WorkbookEntry {
                entry_id: row.get(0)?,
                workbook_id: WorkbookId(row.get(1)?),
                tenant_id: row.get(2)?,
                name: row.get(3)?,
                scope: row.get(4)?,
                created_by: row.get(5)?,
                created_at: row.get(6)?,
            });
        }
        Ok(entries)
    }
}
