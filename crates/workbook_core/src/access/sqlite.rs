//! Access service that keeps bindings in the core database.

use super::{AccessControlService, AccessError, OperationHandle, OperationId, OperationStatus};
use crate::context::RequestContext;
use crate::id_codec::encode_id;
use crate::model::entity::{CollectionId, EntityRef};
use crate::repo::binding_repo::{AccessBinding, BindingStatus, SqliteBindingRepository};
use log::info;
use rusqlite::Connection;
use std::time::Duration;

/// How registrations complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Binding is active when the transaction commits.
    Synchronous,
    /// Binding is stored pending; completion is confirmed later by operation id.
    Deferred,
}

/// Access service backed by the `access_bindings` table.
#[derive(Debug, Clone)]
pub struct SqliteAccessService {
    mode: AccessMode,
    query_timeout: Duration,
}

impl SqliteAccessService {
    pub fn new(mode: AccessMode, query_timeout: Duration) -> Self {
        Self {
            mode,
            query_timeout,
        }
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Completes one deferred registration.
    pub fn confirm_operation(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        operation_id: OperationId,
    ) -> Result<OperationHandle, AccessError> {
        let repo = SqliteBindingRepository::new(conn, self.query_timeout);
        let entity = repo
            .activate(&ctx.tenant_id, operation_id.0)?
            .ok_or(AccessError::UnknownOperation(operation_id))?;
        info!(
            "event=access_confirm module=access status=ok kind={} entity_id={}",
            entity.kind,
            encode_id(entity.id)
        );
        Ok(OperationHandle {
            operation_id,
            entity,
            status: OperationStatus::Done,
        })
    }

    /// Reads the stored binding of one entity.
    pub fn binding(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        entity: EntityRef,
    ) -> Result<Option<AccessBinding>, AccessError> {
        let repo = SqliteBindingRepository::new(conn, self.query_timeout);
        Ok(repo.get(&ctx.tenant_id, entity)?)
    }
}

impl AccessControlService for SqliteAccessService {
    fn register(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        entity: EntityRef,
        ancestor_ids: &[CollectionId],
    ) -> Result<Option<OperationHandle>, AccessError> {
        let repo = SqliteBindingRepository::new(conn, self.query_timeout);
        match self.mode {
            AccessMode::Synchronous => {
                repo.upsert(
                    &ctx.tenant_id,
                    &ctx.user_id,
                    entity,
                    ancestor_ids,
                    BindingStatus::Active,
                    None,
                )?;
                Ok(None)
            }
            AccessMode::Deferred => {
                let operation_id = OperationId::new();
                repo.upsert(
                    &ctx.tenant_id,
                    &ctx.user_id,
                    entity,
                    ancestor_ids,
                    BindingStatus::Pending,
                    Some(operation_id.0),
                )?;
                Ok(Some(OperationHandle {
                    operation_id,
                    entity,
                    status: OperationStatus::Pending,
                }))
            }
        }
    }
}
