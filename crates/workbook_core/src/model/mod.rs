//! Domain model for workbooks and collections.
//!
//! # Responsibility
//! - Define the canonical records returned by the core.
//! - Define typed ids so workbook and collection ids cannot be swapped.
//!
//! # Invariants
//! - Ids are generated by storage and never reused.
//! - Deletion is represented by `deleted_at`/`deleted_by`, never by row removal.

pub mod collection;
pub mod entity;
pub mod workbook;
