//! Repository layer: SQL for entities, hierarchy and access bindings.
//!
//! # Responsibility
//! - Keep SQLite query details out of service orchestration.
//! - Translate SQLite failures into semantic errors (`NotFound`,
//!   `UniqueViolation`, `Timeout`).
//!
//! # Invariants
//! - Repositories borrow a connection target and never open transactions;
//!   the mutation coordinator owns transaction boundaries.
//! - All queries are tenant-scoped at the SQL level.

pub mod binding_repo;
pub mod collection_repo;
pub mod entity_repo;
pub mod workbook_repo;
