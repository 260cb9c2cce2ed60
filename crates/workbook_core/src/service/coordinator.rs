//! Transactional mutation coordinator.
//!
//! # Responsibility
//! - Run every workbook/collection write through one fixed pipeline:
//!   validate, resolve parent, check uniqueness, write, register, commit,
//!   project.
//! - Keep entity rows and access bindings atomic.
//!
//! # Invariants
//! - Validation failures never touch storage.
//! - Writes use the primary target inside `BEGIN IMMEDIATE`; any error after
//!   the transaction opens drops it, which rolls back.
//! - The ancestor chain handed to the registrar is resolved inside the same
//!   transaction as the write.
//! - Moves re-check uniqueness in the destination scope only.

use crate::access::{AccessControlService, OperationHandle};
use crate::context::RequestContext;
use crate::db::Storage;
use crate::id_codec::encode_id;
use crate::model::collection::Collection;
use crate::model::entity::{
    lower_title, CollectionId, Entity, EntityKind, EntityRef, ParentScope, WorkbookId,
};
use crate::model::workbook::Workbook;
use crate::repo::collection_repo::{CollectionSubtree, NewCollection, SqliteCollectionRepository};
use crate::repo::entity_repo::{EntityPatch, EntityRecord, RepoError, SqliteEntityRepository};
use crate::repo::workbook_repo::{NewWorkbook, SqliteWorkbookRepository};
use crate::service::error::{CoreError, CoreResult};
use crate::service::hierarchy::{HierarchyError, HierarchyResolver};
use crate::service::projection::{project, project_workbook, LoadOptions};
use crate::service::registrar::PermissionRegistrar;
use crate::service::uniqueness::UniquenessChecker;
use crate::service::validation::{
    normalize_description, normalize_entry, normalize_meta, normalize_title, validate_context,
    CreateCollectionArgs, CreateEntryArgs, CreateWorkbookArgs, UpdateEntityArgs,
};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::time::Instant;

/// Result of a mutation: the projected entity plus pending access operations.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    pub entity: T,
    /// Handles of deferred registrations, in registration order.
    pub operations: Vec<OperationHandle>,
}

impl<T> MutationOutcome<T> {
    fn new(entity: T) -> Self {
        Self {
            entity,
            operations: Vec::new(),
        }
    }

    /// First pending operation, if any.
    pub fn operation(&self) -> Option<&OperationHandle> {
        self.operations.first()
    }
}

/// Write-side entry point for workbooks and collections.
pub struct MutationCoordinator<'s, A: AccessControlService> {
    storage: &'s Storage,
    registrar: PermissionRegistrar<A>,
}

impl<'s, A: AccessControlService> MutationCoordinator<'s, A> {
    pub fn new(storage: &'s Storage, access: A) -> Self {
        Self {
            storage,
            registrar: PermissionRegistrar::new(access),
        }
    }

    pub fn access(&self) -> &A {
        self.registrar.service()
    }

    /// Creates one workbook at root level or inside a collection.
    pub fn create_workbook(
        &self,
        ctx: &RequestContext,
        args: CreateWorkbookArgs,
    ) -> CoreResult<MutationOutcome<Workbook>> {
        let started_at = Instant::now();
        info!("event=workbook_create module=coordinator status=start");
        let result = self.create_workbook_inner(ctx, args);
        finish("workbook_create", started_at, result, |outcome| {
            outcome.entity.entity_ref()
        })
    }

    fn create_workbook_inner(
        &self,
        ctx: &RequestContext,
        args: CreateWorkbookArgs,
    ) -> CoreResult<MutationOutcome<Workbook>> {
        validate_context(ctx)?;
        let title = normalize_title(&args.title)?;
        let description = normalize_description(args.description)?;
        let meta = normalize_meta(args.meta)?;
        let title_lower = lower_title(&title);

        self.resolve_parent(self.storage.primary(), ctx, args.collection_id)?;
        self.ensure_title_free(
            ctx,
            EntityKind::Workbook,
            args.collection_id.into(),
            &title,
            &title_lower,
            None,
        )?;

        let tx = self.begin()?;
        let ancestors = self.resolve_parent(&tx, ctx, args.collection_id)?;
        let workbook_id = SqliteWorkbookRepository::new(&tx, self.timeout())
            .insert(&NewWorkbook {
                collection_id: args.collection_id,
                title: &title,
                title_lower: &title_lower,
                description: description.as_deref(),
                tenant_id: &ctx.tenant_id,
                project_id: ctx.project_id.as_deref(),
                meta: &meta,
                user_id: &ctx.user_id,
            })
            .map_err(|err| CoreError::from_write(err, EntityKind::Workbook, &title))?;
        let operations = self.register(&tx, ctx, workbook_id.into(), &ancestors)?;
        commit(tx)?;

        Ok(MutationOutcome {
            entity: self.reload_workbook(ctx, workbook_id)?,
            operations,
        })
    }

    /// Creates one collection at root level or under a parent collection.
    pub fn create_collection(
        &self,
        ctx: &RequestContext,
        args: CreateCollectionArgs,
    ) -> CoreResult<MutationOutcome<Collection>> {
        let started_at = Instant::now();
        info!("event=collection_create module=coordinator status=start");
        let result = self.create_collection_inner(ctx, args);
        finish("collection_create", started_at, result, |outcome| {
            outcome.entity.entity_ref()
        })
    }

    fn create_collection_inner(
        &self,
        ctx: &RequestContext,
        args: CreateCollectionArgs,
    ) -> CoreResult<MutationOutcome<Collection>> {
        validate_context(ctx)?;
        let title = normalize_title(&args.title)?;
        let description = normalize_description(args.description)?;
        let title_lower = lower_title(&title);

        self.resolve_parent(self.storage.primary(), ctx, args.parent_id)?;
        self.ensure_title_free(
            ctx,
            EntityKind::Collection,
            args.parent_id.into(),
            &title,
            &title_lower,
            None,
        )?;

        let tx = self.begin()?;
        let ancestors = self.resolve_parent(&tx, ctx, args.parent_id)?;
        let collection_id = SqliteCollectionRepository::new(&tx, self.timeout())
            .insert(&NewCollection {
                parent_id: args.parent_id,
                title: &title,
                title_lower: &title_lower,
                description: description.as_deref(),
                tenant_id: &ctx.tenant_id,
                project_id: ctx.project_id.as_deref(),
                user_id: &ctx.user_id,
            })
            .map_err(|err| CoreError::from_write(err, EntityKind::Collection, &title))?;
        let operations = self.register(&tx, ctx, collection_id.into(), &ancestors)?;
        commit(tx)?;

        Ok(MutationOutcome {
            entity: self.reload_collection(ctx, collection_id)?,
            operations,
        })
    }

    /// Renames and/or re-describes one workbook.
    pub fn update_workbook(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
        args: UpdateEntityArgs,
    ) -> CoreResult<MutationOutcome<Workbook>> {
        let started_at = Instant::now();
        info!(
            "event=workbook_update module=coordinator status=start entity_id={}",
            encode_id(workbook_id.get())
        );
        let result = self
            .update_entity::<Workbook>(ctx, workbook_id.get(), args)
            .and_then(|()| self.reload_workbook(ctx, workbook_id))
            .map(MutationOutcome::new);
        finish("workbook_update", started_at, result, |outcome| {
            outcome.entity.entity_ref()
        })
    }

    /// Renames and/or re-describes one collection.
    pub fn update_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
        args: UpdateEntityArgs,
    ) -> CoreResult<MutationOutcome<Collection>> {
        let started_at = Instant::now();
        info!(
            "event=collection_update module=coordinator status=start entity_id={}",
            encode_id(collection_id.get())
        );
        let result = self
            .update_entity::<Collection>(ctx, collection_id.get(), args)
            .and_then(|()| self.reload_collection(ctx, collection_id))
            .map(MutationOutcome::new);
        finish("collection_update", started_at, result, |outcome| {
            outcome.entity.entity_ref()
        })
    }

    fn update_entity<T: EntityRecord>(
        &self,
        ctx: &RequestContext,
        id: i64,
        args: UpdateEntityArgs,
    ) -> CoreResult<()> {
        validate_context(ctx)?;
        let title = args.title.as_deref().map(normalize_title).transpose()?;
        let description = args
            .description
            .map(|value| normalize_description(Some(value)))
            .transpose()?;
        let patch = EntityPatch {
            title,
            description,
            parent: None,
        };
        if patch.is_empty() {
            return Err(CoreError::Validation(
                "update must change title or description".to_string(),
            ));
        }

        let current = self
            .entities(self.storage.primary())
            .load_required::<T>(&ctx.tenant_id, id)?;
        if let Some(title) = patch.title.as_deref() {
            self.ensure_title_free(
                ctx,
                T::KIND,
                current.parent_id().into(),
                title,
                &lower_title(title),
                Some(id),
            )?;
        }

        let tx = self.begin()?;
        self.entities(&tx)
            .patch(T::KIND, &ctx.tenant_id, &ctx.user_id, id, &patch)
            .map_err(|err| {
                let title = patch.title.as_deref().unwrap_or(current.title());
                CoreError::from_write(err, T::KIND, title)
            })?;
        commit(tx)
    }

    /// Refiles one workbook under `new_parent` and re-registers its binding.
    pub fn move_workbook(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
        new_parent: Option<CollectionId>,
    ) -> CoreResult<MutationOutcome<Workbook>> {
        let started_at = Instant::now();
        info!(
            "event=workbook_move module=coordinator status=start entity_id={}",
            encode_id(workbook_id.get())
        );
        let result = self.move_workbook_inner(ctx, workbook_id, new_parent);
        finish("workbook_move", started_at, result, |outcome| {
            outcome.entity.entity_ref()
        })
    }

    fn move_workbook_inner(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
        new_parent: Option<CollectionId>,
    ) -> CoreResult<MutationOutcome<Workbook>> {
        validate_context(ctx)?;
        let current = self
            .entities(self.storage.primary())
            .load_required::<Workbook>(&ctx.tenant_id, workbook_id.get())?;
        self.resolve_parent(self.storage.primary(), ctx, new_parent)?;
        self.ensure_title_free(
            ctx,
            EntityKind::Workbook,
            new_parent.into(),
            &current.title,
            &current.title_lower,
            Some(workbook_id.get()),
        )?;

        let tx = self.begin()?;
        let ancestors = self.resolve_parent(&tx, ctx, new_parent)?;
        self.entities(&tx)
            .patch(
                EntityKind::Workbook,
                &ctx.tenant_id,
                &ctx.user_id,
                workbook_id.get(),
                &EntityPatch {
                    parent: Some(new_parent),
                    ..EntityPatch::default()
                },
            )
            .map_err(|err| CoreError::from_write(err, EntityKind::Workbook, &current.title))?;
        let operations = self.register(&tx, ctx, workbook_id.into(), &ancestors)?;
        commit(tx)?;

        Ok(MutationOutcome {
            entity: self.reload_workbook(ctx, workbook_id)?,
            operations,
        })
    }

    /// Refiles one collection under `new_parent`.
    ///
    /// The moved collection and every active descendant are re-registered
    /// against their new ancestor chains.
    pub fn move_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
        new_parent: Option<CollectionId>,
    ) -> CoreResult<MutationOutcome<Collection>> {
        let started_at = Instant::now();
        info!(
            "event=collection_move module=coordinator status=start entity_id={}",
            encode_id(collection_id.get())
        );
        let result = self.move_collection_inner(ctx, collection_id, new_parent);
        finish("collection_move", started_at, result, |outcome| {
            outcome.entity.entity_ref()
        })
    }

    fn move_collection_inner(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
        new_parent: Option<CollectionId>,
    ) -> CoreResult<MutationOutcome<Collection>> {
        validate_context(ctx)?;
        let current = self
            .entities(self.storage.primary())
            .load_required::<Collection>(&ctx.tenant_id, collection_id.get())?;
        self.resolve_move(self.storage.primary(), ctx, collection_id, new_parent)?;
        self.ensure_title_free(
            ctx,
            EntityKind::Collection,
            new_parent.into(),
            &current.title,
            &current.title_lower,
            Some(collection_id.get()),
        )?;

        let tx = self.begin()?;
        let ancestors = self.resolve_move(&tx, ctx, collection_id, new_parent)?;
        self.entities(&tx)
            .patch(
                EntityKind::Collection,
                &ctx.tenant_id,
                &ctx.user_id,
                collection_id.get(),
                &EntityPatch {
                    parent: Some(new_parent),
                    ..EntityPatch::default()
                },
            )
            .map_err(|err| CoreError::from_write(err, EntityKind::Collection, &current.title))?;

        let mut operations = Vec::new();
        if self.registrar.is_enabled(ctx) {
            let subtree = HierarchyResolver::new(&tx, self.timeout())
                .descendants(ctx, collection_id)
                .map_err(|err| hierarchy_error(err, |id| CoreError::NotFound(id.into())))?;
            for (entity, chain) in rebased_chains(collection_id, ancestors, &subtree) {
                operations.extend(self.registrar.register(&tx, ctx, entity, &chain)?);
            }
        }
        commit(tx)?;

        Ok(MutationOutcome {
            entity: self.reload_collection(ctx, collection_id)?,
            operations,
        })
    }

    /// Sets the template flag of one workbook. No title or parent change.
    pub fn set_workbook_is_template(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
        is_template: bool,
    ) -> CoreResult<Workbook> {
        let started_at = Instant::now();
        info!(
            "event=workbook_set_template module=coordinator status=start entity_id={} is_template={}",
            encode_id(workbook_id.get()),
            is_template
        );
        let result = validate_context(ctx)
            .and_then(|()| self.begin())
            .and_then(|tx| {
                SqliteWorkbookRepository::new(&tx, self.timeout()).set_is_template(
                    &ctx.tenant_id,
                    &ctx.user_id,
                    workbook_id,
                    is_template,
                )?;
                commit(tx)
            })
            .and_then(|()| self.reload_workbook(ctx, workbook_id));
        finish("workbook_set_template", started_at, result, Workbook::entity_ref)
    }

    /// Soft-deletes one workbook and returns its final state.
    pub fn delete_workbook(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
    ) -> CoreResult<Workbook> {
        let started_at = Instant::now();
        info!(
            "event=workbook_delete module=coordinator status=start entity_id={}",
            encode_id(workbook_id.get())
        );
        let result = validate_context(ctx)
            .and_then(|()| self.begin())
            .and_then(|tx| {
                SqliteWorkbookRepository::new(&tx, self.timeout()).soft_delete(
                    &ctx.tenant_id,
                    &ctx.user_id,
                    workbook_id,
                )?;
                commit(tx)
            })
            .and_then(|()| {
                project_workbook(
                    self.storage.primary(),
                    self.timeout(),
                    ctx,
                    workbook_id,
                    LoadOptions {
                        include_entries: false,
                        include_deleted: true,
                    },
                )
            });
        finish("workbook_delete", started_at, result, Workbook::entity_ref)
    }

    /// Soft-deletes one collection with its whole active subtree.
    pub fn delete_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
    ) -> CoreResult<Collection> {
        let started_at = Instant::now();
        info!(
            "event=collection_delete module=coordinator status=start entity_id={}",
            encode_id(collection_id.get())
        );
        let result = validate_context(ctx)
            .and_then(|()| self.begin())
            .and_then(|tx| {
                let marked = SqliteCollectionRepository::new(&tx, self.timeout())
                    .soft_delete_subtree(&ctx.tenant_id, &ctx.user_id, collection_id)?;
                if marked == 0 {
                    return Err(CoreError::NotFound(collection_id.into()));
                }
                commit(tx)?;
                Ok(marked)
            })
            .and_then(|marked| {
                info!(
                    "event=collection_delete module=coordinator status=cascade entity_id={} collections={}",
                    encode_id(collection_id.get()),
                    marked
                );
                project::<Collection>(
                    self.storage.primary(),
                    self.timeout(),
                    ctx,
                    collection_id.get(),
                    true,
                )
            });
        finish("collection_delete", started_at, result, Collection::entity_ref)
    }

    /// Adds one entry to an active workbook and returns it with entries loaded.
    pub fn add_workbook_entry(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
        args: CreateEntryArgs,
    ) -> CoreResult<MutationOutcome<Workbook>> {
        let started_at = Instant::now();
        info!(
            "event=workbook_entry_add module=coordinator status=start entity_id={}",
            encode_id(workbook_id.get())
        );
        let result = validate_context(ctx)
            .and_then(|()| normalize_entry(args))
            .and_then(|entry| {
                let tx = self.begin()?;
                SqliteWorkbookRepository::new(&tx, self.timeout()).insert_entry(
                    &ctx.tenant_id,
                    &ctx.user_id,
                    workbook_id,
                    &entry.name,
                    &entry.scope,
                )?;
                commit(tx)
            })
            .and_then(|()| {
                project_workbook(
                    self.storage.primary(),
                    self.timeout(),
                    ctx,
                    workbook_id,
                    LoadOptions::with_entries(),
                )
            })
            .map(MutationOutcome::new);
        finish("workbook_entry_add", started_at, result, |outcome| {
            outcome.entity.entity_ref()
        })
    }

    fn timeout(&self) -> std::time::Duration {
        self.storage.query_timeout()
    }

    fn entities<'c>(&self, conn: &'c Connection) -> SqliteEntityRepository<'c> {
        SqliteEntityRepository::new(conn, self.timeout())
    }

    fn begin(&self) -> CoreResult<Transaction<'s>> {
        Transaction::new_unchecked(self.storage.primary(), TransactionBehavior::Immediate)
            .map_err(|err| RepoError::from(err).into())
    }

    /// Resolves the ancestor chain of a parent reference.
    fn resolve_parent(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        parent: Option<CollectionId>,
    ) -> CoreResult<Vec<CollectionId>> {
        HierarchyResolver::new(conn, self.timeout())
            .resolve_ancestors(ctx, parent)
            .map_err(|err| hierarchy_error(err, |_| parent_not_found(parent)))
    }

    fn resolve_move(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        moved: CollectionId,
        new_parent: Option<CollectionId>,
    ) -> CoreResult<Vec<CollectionId>> {
        HierarchyResolver::new(conn, self.timeout())
            .resolve_for_move(ctx, moved, new_parent)
            .map_err(|err| hierarchy_error(err, |_| parent_not_found(new_parent)))
    }

    fn ensure_title_free(
        &self,
        ctx: &RequestContext,
        kind: EntityKind,
        scope: ParentScope,
        title: &str,
        title_lower: &str,
        exclude_id: Option<i64>,
    ) -> CoreResult<()> {
        let taken = UniquenessChecker::new(self.storage.primary(), self.timeout())
            .exists_with_title(&ctx.tenant_id, scope, title_lower, kind, exclude_id)?;
        if taken {
            return Err(CoreError::AlreadyExists {
                kind,
                title: title.to_string(),
            });
        }
        Ok(())
    }

    fn register(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        entity: EntityRef,
        ancestors: &[CollectionId],
    ) -> CoreResult<Vec<OperationHandle>> {
        Ok(self
            .registrar
            .register(conn, ctx, entity, ancestors)?
            .into_iter()
            .collect())
    }

    fn reload_workbook(
        &self,
        ctx: &RequestContext,
        workbook_id: WorkbookId,
    ) -> CoreResult<Workbook> {
        project_workbook(
            self.storage.primary(),
            self.timeout(),
            ctx,
            workbook_id,
            LoadOptions::default(),
        )
    }

    fn reload_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
    ) -> CoreResult<Collection> {
        project::<Collection>(
            self.storage.primary(),
            self.timeout(),
            ctx,
            collection_id.get(),
            false,
        )
    }
}

fn commit(tx: Transaction<'_>) -> CoreResult<()> {
    tx.commit().map_err(|err| RepoError::from(err).into())
}

fn parent_not_found(parent: Option<CollectionId>) -> CoreError {
    match parent {
        Some(id) => CoreError::ParentNotFound(id),
        None => CoreError::Validation("root scope has no parent".to_string()),
    }
}

fn hierarchy_error(
    err: HierarchyError,
    not_found: impl FnOnce(CollectionId) -> CoreError,
) -> CoreError {
    match err {
        HierarchyError::NotFound(id) => not_found(id),
        HierarchyError::Cycle {
            collection_id,
            parent_id,
        } => CoreError::CycleDetected {
            collection_id,
            parent_id,
        },
        HierarchyError::Repo(err) => err.into(),
    }
}

/// Ancestor chains for every member of a moved subtree.
///
/// `root_ancestors` is the chain of the new parent; subtree rows are listed
/// parents first.
fn rebased_chains(
    root: CollectionId,
    root_ancestors: Vec<CollectionId>,
    subtree: &CollectionSubtree,
) -> Vec<(EntityRef, Vec<CollectionId>)> {
    // Chain seen by the children of each collection.
    let mut inner: HashMap<CollectionId, Vec<CollectionId>> = HashMap::new();
    let mut chains = Vec::with_capacity(subtree.collections.len() + subtree.workbooks.len());

    for (collection_id, parent_id) in &subtree.collections {
        let ancestors = if *collection_id == root {
            root_ancestors.clone()
        } else {
            match parent_id.and_then(|parent| inner.get(&parent)) {
                Some(chain) => chain.clone(),
                None => continue,
            }
        };
        let mut own = ancestors.clone();
        own.push(*collection_id);
        inner.insert(*collection_id, own);
        chains.push(((*collection_id).into(), ancestors));
    }

    for (workbook_id, collection_id) in &subtree.workbooks {
        if let Some(chain) = inner.get(collection_id) {
            chains.push(((*workbook_id).into(), chain.clone()));
        }
    }
    chains
}

fn finish<T>(
    event: &'static str,
    started_at: Instant,
    result: CoreResult<T>,
    entity: impl FnOnce(&T) -> EntityRef,
) -> CoreResult<T> {
    match &result {
        Ok(value) => {
            let entity = entity(value);
            info!(
                "event={} module=coordinator status=ok kind={} entity_id={} duration_ms={}",
                event,
                entity.kind,
                encode_id(entity.id),
                started_at.elapsed().as_millis()
            );
        }
        Err(err) => match err {
            CoreError::Timeout | CoreError::RegistrationFailed { .. } | CoreError::Storage(_) => {
                error!(
                    "event={} module=coordinator status=error duration_ms={} error_code={}",
                    event,
                    started_at.elapsed().as_millis(),
                    err.code()
                );
            }
            _ => {
                warn!(
                    "event={} module=coordinator status=rejected duration_ms={} error_code={}",
                    event,
                    started_at.elapsed().as_millis(),
                    err.code()
                );
            }
        },
    }
    result
}

#[cfg(test)]
mod tests {
    use super::rebased_chains;
    use crate::model::entity::{CollectionId, EntityRef, WorkbookId};
    use crate::repo::collection_repo::CollectionSubtree;

    #[test]
    fn rebased_chains_follow_the_new_parent() {
        // 10 -> 11 -> 12, workbook 7 in 12; 10 moved under 1 -> 2.
        let subtree = CollectionSubtree {
            collections: vec![
                (CollectionId(10), Some(CollectionId(3))),
                (CollectionId(11), Some(CollectionId(10))),
                (CollectionId(12), Some(CollectionId(11))),
            ],
            workbooks: vec![(WorkbookId(7), CollectionId(12))],
        };
        let chains = rebased_chains(
            CollectionId(10),
            vec![CollectionId(1), CollectionId(2)],
            &subtree,
        );

        let ids = |raw: &[i64]| raw.iter().copied().map(CollectionId).collect::<Vec<_>>();
        assert_eq!(
            chains,
            vec![
                (EntityRef::from(CollectionId(10)), ids(&[1, 2])),
                (EntityRef::from(CollectionId(11)), ids(&[1, 2, 10])),
                (EntityRef::from(CollectionId(12)), ids(&[1, 2, 10, 11])),
                (EntityRef::from(WorkbookId(7)), ids(&[1, 2, 10, 11, 12])),
            ]
        );
    }
}
