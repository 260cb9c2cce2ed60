//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the mutation and read APIs.
//! - Keep callers decoupled from SQL and transaction details.
//!
//! # Invariants
//! - Every entry point takes the caller's [`crate::RequestContext`] explicitly.
//! - Errors leaving this layer are [`CoreError`] values with stable codes.

pub mod coordinator;
pub mod error;
pub mod hierarchy;
pub mod projection;
pub mod registrar;
pub mod uniqueness;
pub mod validation;

pub use coordinator::{MutationCoordinator, MutationOutcome};
pub use error::{CoreError, CoreResult};
pub use projection::{CollectionContent, LoadOptions, ReadLayer};
pub use validation::{
    parse_args, CreateCollectionArgs, CreateEntryArgs, CreateWorkbookArgs, UpdateEntityArgs,
};
