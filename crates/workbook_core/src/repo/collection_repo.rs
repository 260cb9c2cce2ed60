//! Collection persistence.
//!
//! # Responsibility
//! - Insert collection rows and map them to [`Collection`].
//! - Walk and soft-delete collection subtrees.
//!
//! # Invariants
//! - Subtree walks are bounded by [`MAX_TREE_DEPTH`] so corrupt parent
//!   pointers cannot recurse forever.
//! - Subtree soft-delete marks collections and the workbooks filed in them
//!   in the caller's transaction.

use crate::db::QueryDeadline;
use crate::model::collection::Collection;
use crate::model::entity::{CollectionId, WorkbookId};
use crate::repo::entity_repo::{EntityRecord, RepoResult, TableSpec, COLLECTIONS, NOW_MS_SQL};
use rusqlite::{params, Connection, Row};
use std::time::Duration;

pub const MAX_TREE_DEPTH: i64 = 512;

const COLLECTION_COLUMNS: &str = "collection_id,
    parent_id,
    title,
    title_lower,
    description,
    tenant_id,
    project_id,
    created_by,
    created_at,
    updated_by,
    updated_at,
    deleted_by,
    deleted_at";

impl EntityRecord for Collection {
    const TABLE: &'static TableSpec = &COLLECTIONS;
    const COLUMNS: &'static str = COLLECTION_COLUMNS;

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Collection {
            collection_id: CollectionId(row.get("collection_id")?),
            parent_id: row.get::<_, Option<i64>>("parent_id")?.map(CollectionId),
            title: row.get("title")?,
            title_lower: row.get("title_lower")?,
            description: row.get("description")?,
            tenant_id: row.get("tenant_id")?,
            project_id: row.get("project_id")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
            updated_by: row.get("updated_by")?,
            updated_at: row.get("updated_at")?,
            deleted_by: row.get("deleted_by")?,
            deleted_at: row.get("deleted_at")?,
        })
    }
}

/// Insert payload for one collection row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollection<'a> {
    pub parent_id: Option<CollectionId>,
    pub title: &'a str,
    pub title_lower: &'a str,
    pub description: Option<&'a str>,
    pub tenant_id: &'a str,
    pub project_id: Option<&'a str>,
    pub user_id: &'a str,
}

/// Collection subtree snapshot, parents listed before children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSubtree {
    /// `(collection, parent)` pairs; the first item is the subtree root.
    pub collections: Vec<(CollectionId, Option<CollectionId>)>,
    /// `(workbook, collection)` pairs for workbooks filed anywhere in the subtree.
    pub workbooks: Vec<(WorkbookId, CollectionId)>,
}

/// SQLite-backed collection repository.
pub struct SqliteCollectionRepository<'conn> {
    conn: &'conn Connection,
    query_timeout: Duration,
}

impl<'conn> SqliteCollectionRepository<'conn> {
    pub fn new(conn: &'conn Connection, query_timeout: Duration) -> Self {
        Self {
            conn,
            query_timeout,
        }
    }

    /// Inserts one collection and returns the storage-generated id.
    pub fn insert(&self, new: &NewCollection<'_>) -> RepoResult<CollectionId> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        self.conn.execute(
            "INSERT INTO collections (
                parent_id,
                title,
                title_lower,
                description,
                tenant_id,
                project_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![
                new.parent_id.map(CollectionId::get),
                new.title,
                new.title_lower,
                new.description,
                new.tenant_id,
                new.project_id,
                new.user_id,
            ],
        )?;
        Ok(CollectionId(self.conn.last_insert_rowid()))
    }

    /// Lists the active subtree rooted at `root`, breadth-first.
    pub fn subtree(&self, tenant_id: &str, root: CollectionId) -> RepoResult<CollectionSubtree> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let mut subtree = CollectionSubtree::default();

        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE subtree(collection_id, parent_id, depth) AS (
                SELECT collection_id, parent_id, 0
                FROM active_collections
                WHERE tenant_id = ?1
                  AND collection_id = ?2
                UNION ALL
                SELECT child.collection_id, child.parent_id, parent.depth + 1
                FROM active_collections child
                INNER JOIN subtree parent ON child.parent_id = parent.collection_id
                WHERE child.tenant_id = ?1
                  AND parent.depth < ?3
            )
            SELECT collection_id, parent_id
            FROM subtree
            ORDER BY depth ASC, collection_id ASC;",
        )?;
        let mut rows = stmt.query(params![tenant_id, root.get(), MAX_TREE_DEPTH])?;
        while let Some(row) = rows.next()? {
            subtree.collections.push((
                CollectionId(row.get(0)?),
                row.get::<_, Option<i64>>(1)?.map(CollectionId),
            ));
        }

        let mut stmt = self.conn.prepare(
            "SELECT workbook_id, collection_id
             FROM active_workbooks
             WHERE tenant_id = ?1
               AND collection_id = ?2
             ORDER BY workbook_id ASC;",
        )?;
        for (collection_id, _) in &subtree.collections {
            let mut rows = stmt.query(params![tenant_id, collection_id.get()])?;
            while let Some(row) = rows.next()? {
                subtree
                    .workbooks
                    .push((WorkbookId(row.get(0)?), CollectionId(row.get(1)?)));
            }
        }

        Ok(subtree)
    }

    /// Soft-deletes `root`, its descendant collections and their workbooks.
    ///
    /// Returns the number of collection rows marked.
    pub fn soft_delete_subtree(
        &self,
        tenant_id: &str,
        user_id: &str,
        root: CollectionId,
    ) -> RepoResult<usize> {
        let _deadline = QueryDeadline::arm(self.conn, self.query_timeout);
        let subtree_cte = "WITH RECURSIVE subtree(collection_id, depth) AS (
                SELECT collection_id, 0
                FROM active_collections
                WHERE tenant_id = ?1
                  AND collection_id = ?3
                UNION ALL
                SELECT child.collection_id, parent.depth + 1
                FROM active_collections child
                INNER JOIN subtree parent ON child.parent_id = parent.collection_id
                WHERE child.tenant_id = ?1
                  AND parent.depth < ?4
            )";

        // Workbooks first: the CTE reads active collections.
        self.conn.execute(
            &format!(
                "{subtree_cte}
                UPDATE workbooks
                SET deleted_at = {NOW_MS_SQL},
                    deleted_by = ?2
                WHERE tenant_id = ?1
                  AND deleted_at IS NULL
                  AND collection_id IN (SELECT collection_id FROM subtree);"
            ),
            params![tenant_id, user_id, root.get(), MAX_TREE_DEPTH],
        )?;

        let changed = self.conn.execute(
            &format!(
                "{subtree_cte}
                UPDATE collections
                SET deleted_at = {NOW_MS_SQL},
                    deleted_by = ?2
                WHERE tenant_id = ?1
                  AND deleted_at IS NULL
                  AND collection_id IN (SELECT collection_id FROM subtree);"
            ),
            params![tenant_id, user_id, root.get(), MAX_TREE_DEPTH],
        )?;
        Ok(changed)
    }
}
