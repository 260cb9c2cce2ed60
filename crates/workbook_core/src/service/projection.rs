//! Entity read/projection layer.
//!
//! # Responsibility
//! - Load persisted rows and rebuild domain records, with relations on request.
//! - Route reads to the replica target.
//!
//! # Invariants
//! - Every read is tenant-scoped in SQL; a foreign id reads as `NotFound`.
//! - Default loads are shallow and exclude soft-deleted rows.

use crate::context::RequestContext;
use crate::db::Storage;
use crate::model::collection::Collection;
use crate::model::entity::{CollectionId, EntityKind, EntityRef, ParentScope, WorkbookId};
use crate::model::workbook::Workbook;
use crate::repo::entity_repo::{EntityRecord, SqliteEntityRepository};
use crate::repo::workbook_repo::SqliteWorkbookRepository;
use crate::service::error::{CoreError, CoreResult};
use crate::service::validation::validate_context;
use rusqlite::Connection;
use serde::Serialize;
use std::time::Duration;

/// Read options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Eagerly load owned relations (workbook entries).
    pub include_entries: bool,
    /// Also return soft-deleted rows.
    pub include_deleted: bool,
}

impl LoadOptions {
    pub fn with_entries() -> Self {
        Self {
            include_entries: true,
            include_deleted: false,
        }
    }
}

/// Shallow listing of one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionContent {
    pub collections: Vec<Collection>,
    pub workbooks: Vec<Workbook>,
}

/// Read-side entry points over the replica target.
pub struct ReadLayer<'s> {
    storage: &'s Storage,
}

impl<'s> ReadLayer<'s> {
    pub fn new(storage: &'s Storage) -> Self {
        Self { storage }
    }

    pub fn load_workbook(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
        options: LoadOptions,
    ) -> CoreResult<Workbook> {
        validate_context(ctx)?;
        project_workbook(
            self.storage.replica(),
            self.storage.query_timeout(),
            ctx,
            workbook_id,
            options,
        )
    }

    pub fn load_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
        options: LoadOptions,
    ) -> CoreResult<Collection> {
        validate_context(ctx)?;
        project::<Collection>(
            self.storage.replica(),
            self.storage.query_timeout(),
            ctx,
            collection_id.get(),
            options.include_deleted,
        )
    }

    /// Lists active collections and workbooks directly under `scope`.
    pub fn list_collection_content(
        &self,
        ctx: &RequestContext,
        scope: ParentScope,
    ) -> CoreResult<CollectionContent> {
        validate_context(ctx)?;
        let repo = self.repo();
        self.ensure_scope_exists(&repo, ctx, scope)?;
        Ok(CollectionContent {
            collections: repo.list_children::<Collection>(&ctx.tenant_id, scope)?,
            workbooks: repo.list_children::<Workbook>(&ctx.tenant_id, scope)?,
        })
    }

    /// Counts active workbooks directly under `scope`.
    pub fn count_workbooks(&self, ctx: &RequestContext, scope: ParentScope) -> CoreResult<u64> {
        validate_context(ctx)?;
        let repo = self.repo();
        self.ensure_scope_exists(&repo, ctx, scope)?;
        Ok(repo.count_children(&ctx.tenant_id, EntityKind::Workbook, scope)?)
    }

    fn repo(&self) -> SqliteEntityRepository<'s> {
        SqliteEntityRepository::new(self.storage.replica(), self.storage.query_timeout())
    }

    fn ensure_scope_exists(
        &self,
        repo: &SqliteEntityRepository<'_>,
        ctx: &RequestContext,
        scope: ParentScope,
    ) -> CoreResult<()> {
        if let Some(collection_id) = scope.collection_id() {
            repo.load_required::<Collection>(&ctx.tenant_id, collection_id.get())?;
        }
        Ok(())
    }
}

/// Rebuilds one entity from `conn`.
pub(crate) fn project<T: EntityRecord>(
    conn: &Connection,
    query_timeout: Duration,
    ctx: &RequestContext,
    id: i64,
    include_deleted: bool,
) -> CoreResult<T> {
    SqliteEntityRepository::new(conn, query_timeout)
        .load::<T>(&ctx.tenant_id, id, include_deleted)?
        .ok_or(CoreError::NotFound(EntityRef { kind: T::KIND, id }))
}

/// Rebuilds one workbook, attaching entries when requested.
pub(crate) fn project_workbook(
    conn: &Connection,
    query_timeout: Duration,
    ctx: &RequestContext,
    workbook_id: WorkbookId,
    options: LoadOptions,
) -> CoreResult<Workbook> {
    let mut workbook = project::<Workbook>(
        conn,
        query_timeout,
        ctx,
        workbook_id.get(),
        options.include_deleted,
    )?;
    if options.include_entries {
        let entries = SqliteWorkbookRepository::new(conn, query_timeout)
            .list_entries(&ctx.tenant_id, workbook_id)?;
        workbook.entries = Some(entries);
    }
    Ok(workbook)
}
