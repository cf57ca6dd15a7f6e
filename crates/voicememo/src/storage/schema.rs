//! `SQLite` schema definitions for voicememo.
//!
//! All application state lives in one key-value table; see
//! [`super::keys`] for the key layout.

/// One step of schema history.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Schema version after this step runs.
    pub version: i32,
    /// Short label for logs.
    pub description: &'static str,
    /// SQL batch applied inside a transaction.
    pub sql: &'static str,
}

/// The key-value table holding every persisted value.
pub const CREATE_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Schema history in version order.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "create entries table",
    sql: CREATE_ENTRIES_TABLE,
}];
