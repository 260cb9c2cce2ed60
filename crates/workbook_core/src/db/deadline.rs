//! Per-query deadline enforced through SQLite's progress handler.

use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Virtual machine steps between deadline checks.
const PROGRESS_CHECK_OPS: i32 = 1_000;

/// Interrupts statements on `conn` once `timeout` has elapsed.
///
/// The handler is removed when the guard drops. An interrupted statement
/// fails with `ErrorCode::OperationInterrupted`, which the repository layer
/// reports as a timeout.
pub(crate) struct QueryDeadline<'conn> {
    conn: &'conn Connection,
}

impl<'conn> QueryDeadline<'conn> {
    pub(crate) fn arm(conn: &'conn Connection, timeout: Duration) -> Self {
        let started_at = Instant::now();
        conn.progress_handler(
            PROGRESS_CHECK_OPS,
            Some(move || started_at.elapsed() > timeout),
        );
        Self { conn }
    }
}

impl Drop for QueryDeadline<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}
