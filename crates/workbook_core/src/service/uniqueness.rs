//! Uniqueness checker for sibling titles.
//!
//! Early rejection only: the partial unique indexes remain the arbiter when
//! two writers race past this check.

use crate::model::entity::{EntityKind, ParentScope};
use crate::repo::entity_repo::{RepoResult, SqliteEntityRepository};
use rusqlite::Connection;
use std::time::Duration;

pub struct UniquenessChecker<'conn> {
    repo: SqliteEntityRepository<'conn>,
}

impl<'conn> UniquenessChecker<'conn> {
    pub fn new(conn: &'conn Connection, query_timeout: Duration) -> Self {
        Self {
            repo: SqliteEntityRepository::new(conn, query_timeout),
        }
    }

    /// Whether an active `kind` sibling in `scope` already uses `title_lower`.
    ///
    /// Exact comparison on the lowercased title; `exclude_id` skips the
    /// entity's own row.
    pub fn exists_with_title(
        &self,
        tenant_id: &str,
        scope: ParentScope,
        title_lower: &str,
        kind: EntityKind,
        exclude_id: Option<i64>,
    ) -> RepoResult<bool> {
        self.repo
            .title_exists(tenant_id, kind, scope, title_lower, exclude_id)
    }
}
