//! SQL schema for the Turno SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document; `data` is the JSON body, queried with json_extract.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,   -- 'servicios_supervisor' | 'users' | 'credentials'
    doc_id      TEXT NOT NULL,   -- hyphenated lowercase UUID
    data        TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (collection, doc_id)
);

CREATE INDEX IF NOT EXISTS documents_created_idx ON documents(collection, created_at);

PRAGMA user_version = 1;
";
