//! SQL schema for the Kennel SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    email        TEXT NOT NULL UNIQUE,   -- trimmed, lower-cased
    display_name TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

-- owner_id is written once and never updated.
CREATE TABLE IF NOT EXISTS dogs (
    dog_id     TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL REFERENCES users(user_id),
    name       TEXT NOT NULL,
    breed      TEXT,
    birth_date TEXT,                     -- YYYY-MM-DD
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS collaborators (
    dog_id   TEXT NOT NULL REFERENCES dogs(dog_id) ON DELETE CASCADE,
    user_id  TEXT NOT NULL REFERENCES users(user_id),
    role     TEXT NOT NULL CHECK (role IN ('editor', 'viewer')),
    added_at TEXT NOT NULL,
    PRIMARY KEY (dog_id, user_id)
);

-- One collection per record kind. payload_json holds the whole record;
-- the other columns exist for lookup and ordering.
CREATE TABLE IF NOT EXISTS potty_records (
    record_id    TEXT PRIMARY KEY,
    dog_id       TEXT NOT NULL REFERENCES dogs(dog_id) ON DELETE CASCADE,
    created_by   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    payload_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task_records (
    record_id    TEXT PRIMARY KEY,
    dog_id       TEXT NOT NULL REFERENCES dogs(dog_id) ON DELETE CASCADE,
    created_by   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    payload_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vaccine_records (
    record_id    TEXT PRIMARY KEY,
    dog_id       TEXT NOT NULL REFERENCES dogs(dog_id) ON DELETE CASCADE,
    created_by   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    payload_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS weight_records (
    record_id    TEXT PRIMARY KEY,
    dog_id       TEXT NOT NULL REFERENCES dogs(dog_id) ON DELETE CASCADE,
    created_by   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    payload_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS dogs_owner_idx          ON dogs(owner_id);
CREATE INDEX IF NOT EXISTS collaborators_user_idx  ON collaborators(user_id);
CREATE INDEX IF NOT EXISTS potty_recent_idx        ON potty_records(dog_id, created_at DESC);
CREATE INDEX IF NOT EXISTS task_recent_idx         ON task_records(dog_id, created_at DESC);
CREATE INDEX IF NOT EXISTS vaccine_recent_idx      ON vaccine_records(dog_id, created_at DESC);
CREATE INDEX IF NOT EXISTS weight_recent_idx       ON weight_records(dog_id, created_at DESC);

PRAGMA user_version = 1;
";
