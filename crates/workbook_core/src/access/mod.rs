//! Access-control service contract and bundled implementations.
//!
//! # Responsibility
//! - Define the seam the mutation coordinator registers entities through.
//! - Model asynchronous registrations as operation handles.
//!
//! # Invariants
//! - `register` receives the open transaction; anything it writes through
//!   that connection commits or rolls back with the entity.
//! - A returned handle means the binding is not yet confirmed.

mod sqlite;

pub use sqlite::{AccessMode, SqliteAccessService};

use crate::context::RequestContext;
use crate::model::entity::{CollectionId, EntityRef};
use crate::repo::entity_repo::RepoError;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identifier of one pending access-control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OperationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Done,
}

/// Reference to an access registration the caller may track or await.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationHandle {
    pub operation_id: OperationId,
    pub entity: EntityRef,
    pub status: OperationStatus,
}

/// Access-control failures.
#[derive(Debug)]
pub enum AccessError {
    /// The service refused or failed the registration.
    Rejected(String),
    /// No binding or operation matched.
    UnknownOperation(OperationId),
    Storage(RepoError),
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "access registration rejected: {message}"),
            Self::UnknownOperation(id) => write!(f, "unknown access operation: {id}"),
            Self::Storage(err) => write!(f, "access binding storage failed: {err}"),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccessError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// External access-control service as seen by the core.
pub trait AccessControlService {
    /// Registers (or re-registers) `entity` under its root-first ancestor chain.
    ///
    /// Returns a handle when completion is asynchronous.
    fn register(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        entity: EntityRef,
        ancestor_ids: &[CollectionId],
    ) -> Result<Option<OperationHandle>, AccessError>;
}

impl<T: AccessControlService + ?Sized> AccessControlService for &T {
    fn register(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        entity: EntityRef,
        ancestor_ids: &[CollectionId],
    ) -> Result<Option<OperationHandle>, AccessError> {
        (**self).register(conn, ctx, entity, ancestor_ids)
    }
}

/// Service for deployments without access control.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAccessService;

impl AccessControlService for NoopAccessService {
    fn register(
        &self,
        _conn: &Connection,
        _ctx: &RequestContext,
        _entity: EntityRef,
        _ancestor_ids: &[CollectionId],
    ) -> Result<Option<OperationHandle>, AccessError> {
        Ok(None)
    }
}
