//! Error taxonomy surfaced to callers of the core.
//!
//! # Invariants
//! - Every variant maps to one stable code from [`CoreError::code`].
//! - `Display` never includes SQLite error text; the underlying error stays
//!   reachable through `source()` for logs.

use crate::access::AccessError;
use crate::model::entity::{CollectionId, EntityKind, EntityRef};
use crate::repo::entity_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug)]
pub enum CoreError {
    /// Malformed input; storage was not touched.
    Validation(String),
    /// Referenced parent collection is missing, deleted or foreign.
    ParentNotFound(CollectionId),
    /// An active sibling of the same kind already uses the title.
    AlreadyExists { kind: EntityKind, title: String },
    /// Read or update target is missing.
    NotFound(EntityRef),
    /// The hierarchy would contain (or already contains) a loop.
    CycleDetected {
        collection_id: CollectionId,
        parent_id: CollectionId,
    },
    /// Storage deadline exceeded.
    Timeout,
    /// Access-control registration failed inside the transaction.
    RegistrationFailed { entity: EntityRef, source: AccessError },
    /// Unclassified storage failure.
    Storage(RepoError),
}

impl CoreError {
    /// Stable code for external callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::CycleDetected { .. } => "CYCLE_DETECTED",
            Self::Timeout => "TIMEOUT",
            Self::RegistrationFailed { .. } => "REGISTRATION_FAILED",
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid arguments: {message}"),
            Self::ParentNotFound(id) => write!(f, "cannot find parent collection with id {id}"),
            Self::AlreadyExists { kind, title } => {
                write!(f, "{kind} with title \"{title}\" already exists in this scope")
            }
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::CycleDetected {
                collection_id,
                parent_id,
            } => write!(
                f,
                "collection {collection_id} cannot be placed under {parent_id}: cycle"
            ),
            Self::Timeout => write!(f, "storage deadline exceeded"),
            Self::RegistrationFailed { entity, .. } => {
                write!(f, "access registration failed for {entity}")
            }
            Self::Storage(_) => write!(f, "internal storage error"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RegistrationFailed { source, .. } => Some(source),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            RepoError::Timeout => Self::Timeout,
            other => Self::Storage(other),
        }
    }
}

impl CoreError {
    /// Classifies a failed write, attributing unique-index hits to `title`.
    pub(crate) fn from_write(err: RepoError, kind: EntityKind, title: &str) -> Self {
        match err {
            RepoError::UniqueViolation => Self::AlreadyExists {
                kind,
                title: title.to_string(),
            },
            other => other.into(),
        }
    }

    /// Classifies a failed access registration.
    pub(crate) fn from_registration(err: AccessError, entity: EntityRef) -> Self {
        match err {
            AccessError::Storage(RepoError::Timeout) => Self::Timeout,
            source => Self::RegistrationFailed { entity, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;
    use crate::db::DbError;
    use crate::model::entity::{CollectionId, EntityKind, WorkbookId};
    use crate::repo::entity_repo::RepoError;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            CoreError::Validation("x".to_string()),
            CoreError::ParentNotFound(CollectionId(1)),
            CoreError::AlreadyExists {
                kind: EntityKind::Workbook,
                title: "x".to_string(),
            },
            CoreError::NotFound(WorkbookId(1).into()),
            CoreError::CycleDetected {
                collection_id: CollectionId(1),
                parent_id: CollectionId(2),
            },
            CoreError::Timeout,
            CoreError::Storage(RepoError::InvalidData("x".to_string())),
        ];
        let mut codes: Vec<_> = errors.iter().map(CoreError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn storage_errors_do_not_leak_sqlite_text() {
        let sqlite = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CORRUPT),
            Some("secret table layout".to_string()),
        );
        let err = CoreError::Storage(RepoError::Db(DbError::Sqlite(sqlite)));
        assert_eq!(err.to_string(), "internal storage error");
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn unique_violation_on_write_becomes_already_exists() {
        let err = CoreError::from_write(RepoError::UniqueViolation, EntityKind::Collection, "Q3");
        assert!(matches!(
            err,
            CoreError::AlreadyExists { kind: EntityKind::Collection, ref title } if title == "Q3"
        ));
    }
}
