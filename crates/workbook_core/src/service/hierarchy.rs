//! Hierarchy resolver.
//!
//! # Responsibility
//! - Compute root-first ancestor chains for collections.
//! - Reject parent assignments that would create cycles.
//! - List active subtrees for re-registration and subtree deletes.
//!
//! # Invariants
//! - An empty chain is returned only for the implicit root (`None`).
//! - A chain for `Some(id)` ends with `id` itself.
//! - Walks never exceed `MAX_TREE_DEPTH` steps.

use crate::context::RequestContext;
use crate::model::entity::CollectionId;
use crate::repo::collection_repo::{CollectionSubtree, SqliteCollectionRepository, MAX_TREE_DEPTH};
use crate::repo::entity_repo::{RepoError, SqliteEntityRepository};
use rusqlite::Connection;
use std::collections::HashSet;
use std::time::Duration;

/// Resolver failures.
#[derive(Debug)]
pub enum HierarchyError {
    /// A collection in the chain is missing, deleted or foreign.
    NotFound(CollectionId),
    /// The walk revisited `collection_id` after leaving `parent_id`.
    Cycle {
        collection_id: CollectionId,
        parent_id: CollectionId,
    },
    Repo(RepoError),
}

impl From<RepoError> for HierarchyError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Walks parent pointers over one connection target.
pub struct HierarchyResolver<'conn> {
    repo: SqliteEntityRepository<'conn>,
    collections: SqliteCollectionRepository<'conn>,
}

impl<'conn> HierarchyResolver<'conn> {
    pub fn new(conn: &'conn Connection, query_timeout: Duration) -> Self {
        Self {
            repo: SqliteEntityRepository::new(conn, query_timeout),
            collections: SqliteCollectionRepository::new(conn, query_timeout),
        }
    }

    /// Returns the root-first chain ending at `collection_id`.
    pub fn resolve_ancestors(
        &self,
        ctx: &RequestContext,
        collection_id: Option<CollectionId>,
    ) -> Result<Vec<CollectionId>, HierarchyError> {
        let Some(start) = collection_id else {
            return Ok(Vec::new());
        };

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if !visited.insert(current) || chain.len() as i64 > MAX_TREE_DEPTH {
                return Err(HierarchyError::Cycle {
                    collection_id: current,
                    parent_id: chain.last().copied().unwrap_or(start),
                });
            }

            let parent = self
                .repo
                .parent_of(&ctx.tenant_id, current)?
                .ok_or(HierarchyError::NotFound(current))?;
            chain.push(current);
            cursor = parent;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Resolves the chain of `new_parent` for moving collection `moved`.
    ///
    /// Fails with `Cycle` when `new_parent` is `moved` or one of its descendants.
    pub fn resolve_for_move(
        &self,
        ctx: &RequestContext,
        moved: CollectionId,
        new_parent: Option<CollectionId>,
    ) -> Result<Vec<CollectionId>, HierarchyError> {
        let chain = self.resolve_ancestors(ctx, new_parent)?;
        if let Some(parent_id) = new_parent {
            if chain.contains(&moved) {
                return Err(HierarchyError::Cycle {
                    collection_id: moved,
                    parent_id,
                });
            }
        }
        Ok(chain)
    }

    /// Lists the active subtree rooted at `collection_id`.
    pub fn descendants(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
    ) -> Result<CollectionSubtree, HierarchyError> {
        let subtree = self.collections.subtree(&ctx.tenant_id, collection_id)?;
        if subtree.collections.is_empty() {
            return Err(HierarchyError::NotFound(collection_id));
        }
        Ok(subtree)
    }
}
