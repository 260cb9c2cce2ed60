//! Permission registrar.
//!
//! # Invariants
//! - Registration is skipped entirely unless the context enables it.
//! - Failures are fatal to the surrounding mutation.

use crate::access::{AccessControlService, OperationHandle};
use crate::context::RequestContext;
use crate::id_codec::encode_id;
use crate::model::entity::{CollectionId, EntityRef};
use crate::service::error::{CoreError, CoreResult};
use log::{debug, error, info};
use rusqlite::Connection;

pub struct PermissionRegistrar<A: AccessControlService> {
    service: A,
}

impl<A: AccessControlService> PermissionRegistrar<A> {
    pub fn new(service: A) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &A {
        &self.service
    }

    /// Whether `register` will reach the access service for this context.
    pub fn is_enabled(&self, ctx: &RequestContext) -> bool {
        ctx.should_register_access()
    }

    /// Registers `entity` through the open transaction `conn`.
    pub fn register(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        entity: EntityRef,
        ancestor_ids: &[CollectionId],
    ) -> CoreResult<Option<OperationHandle>> {
        if !self.is_enabled(ctx) {
            debug!(
                "event=access_register module=registrar status=skipped kind={} entity_id={} private_route={}",
                entity.kind,
                encode_id(entity.id),
                ctx.is_private_route
            );
            return Ok(None);
        }

        match self.service.register(conn, ctx, entity, ancestor_ids) {
            Ok(handle) => {
                info!(
                    "event=access_register module=registrar status=ok kind={} entity_id={} ancestors={} pending={}",
                    entity.kind,
                    encode_id(entity.id),
                    ancestor_ids.len(),
                    handle.is_some()
                );
                Ok(handle)
            }
            Err(err) => {
                error!(
                    "event=access_register module=registrar status=error kind={} entity_id={} error_code=registration_failed",
                    entity.kind,
                    encode_id(entity.id)
                );
                Err(CoreError::from_registration(err, entity))
            }
        }
    }
}
