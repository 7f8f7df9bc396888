//! SQL schema for the abonement SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS abonements (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    validity        TEXT NOT NULL,
    visiting_time   TEXT NOT NULL,
    photo           TEXT NOT NULL DEFAULT '',   -- object-store locator or ''
    price           INTEGER NOT NULL CHECK (price >= 0),
    price_reference TEXT NOT NULL DEFAULT '',   -- vendor price id or ''
    created_time    TEXT NOT NULL,              -- RFC 3339 UTC
    updated_time    TEXT NOT NULL,
    CHECK (created_time <= updated_time)
);

CREATE INDEX IF NOT EXISTS abonements_created_idx ON abonements(created_time);

PRAGMA user_version = 1;
";
