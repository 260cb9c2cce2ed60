//! Permissioned mutation core for workbooks and collections.
//! This crate is the single source of truth for hierarchy, uniqueness and
//! access-binding invariants.

pub mod access;
pub mod config;
pub mod context;
pub mod db;
pub mod id_codec;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{
    AccessControlService, AccessError, AccessMode, NoopAccessService, OperationHandle,
    OperationId, OperationStatus, SqliteAccessService,
};
pub use config::{ConfigError, CoreConfig, FeatureFlags, LoggingConfig, StorageConfig};
pub use context::RequestContext;
pub use db::{open_db, open_db_in_memory, Storage};
pub use id_codec::{decode_id, encode_id};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::Collection;
pub use model::entity::{CollectionId, Entity, EntityKind, EntityRef, ParentScope, WorkbookId};
pub use model::workbook::{Workbook, WorkbookEntry};
pub use repo::entity_repo::{RepoError, RepoResult};
pub use service::{
    parse_args, CollectionContent, CoreError, CoreResult, CreateCollectionArgs, CreateEntryArgs,
    CreateWorkbookArgs, LoadOptions, MutationCoordinator, MutationOutcome, ReadLayer,
    UpdateEntityArgs,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
