//! SQL schema for the BackyardWonders SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id TEXT PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL,
    doc         TEXT NOT NULL    -- full Identity document as JSON
);

CREATE TABLE IF NOT EXISTS wonders (
    wonder_id   TEXT PRIMARY KEY,
    slug        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    doc         TEXT NOT NULL
);

-- The revision log. Change payloads are immutable once written; only the
-- outcome, version assignment, and comments are ever rewritten, and the
-- outcome transitions exactly once.
CREATE TABLE IF NOT EXISTS revisions (
    revision_id TEXT PRIMARY KEY,
    wonder_id   TEXT NOT NULL REFERENCES wonders(wonder_id),
    editor      TEXT NOT NULL,
    status      TEXT NOT NULL,   -- 'pending' | 'approved' | 'rejected'
    version     INTEGER,         -- assigned on apply; NULL while pending/rejected
    created_at  TEXT NOT NULL,
    doc         TEXT NOT NULL,
    UNIQUE (wonder_id, version)
);

-- Strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS reputation_events (
    event_id    TEXT PRIMARY KEY,
    identity_id TEXT NOT NULL REFERENCES identities(identity_id),
    kind        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    doc         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS discussions (
    discussion_id TEXT PRIMARY KEY,
    wonder_id     TEXT NOT NULL REFERENCES wonders(wonder_id),
    created_at    TEXT NOT NULL,
    doc           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS revisions_wonder_idx   ON revisions(wonder_id, created_at);
CREATE INDEX IF NOT EXISTS revisions_editor_idx   ON revisions(editor);
CREATE INDEX IF NOT EXISTS events_identity_idx    ON reputation_events(identity_id, kind);
CREATE INDEX IF NOT EXISTS discussions_wonder_idx ON discussions(wonder_id, created_at);

PRAGMA user_version = 1;
";
