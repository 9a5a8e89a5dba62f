//! SQL schema for the nosh SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS sessions (
    code        TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    leader_id   TEXT NOT NULL,
    started     INTEGER NOT NULL DEFAULT 0,   -- one-way latch
    completed   INTEGER NOT NULL DEFAULT 0,   -- one-way latch
    created_at  TEXT NOT NULL
);

-- Rows are deleted when a member leaves; their votes are kept.
CREATE TABLE IF NOT EXISTS members (
    member_id        TEXT PRIMARY KEY,
    session_code     TEXT NOT NULL REFERENCES sessions(code),
    display_name     TEXT NOT NULL,
    avatar           TEXT,
    finished_voting  INTEGER NOT NULL DEFAULT 0,
    joined_at        TEXT NOT NULL
);

-- One live row per (session, member, dish). Re-swipes update in place, so
-- rowid order is first-vote order.
CREATE TABLE IF NOT EXISTS votes (
    session_code       TEXT NOT NULL REFERENCES sessions(code),
    member_id          TEXT NOT NULL,
    dish_id            TEXT NOT NULL,
    preference         TEXT NOT NULL,   -- 'superlike' | 'like' | 'dislike'
    first_recorded_at  TEXT NOT NULL,
    updated_at         TEXT NOT NULL,
    UNIQUE (session_code, member_id, dish_id),
    CHECK  (preference IN ('superlike', 'like', 'dislike'))
);

-- Catalog order is rowid order.
CREATE TABLE IF NOT EXISTS dishes (
    dish_id      TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    cuisine      TEXT NOT NULL DEFAULT '',
    image        TEXT,
    restaurant   TEXT,
    description  TEXT
);

CREATE INDEX IF NOT EXISTS members_session_idx ON members(session_code);
CREATE INDEX IF NOT EXISTS votes_session_idx   ON votes(session_code);

PRAGMA user_version = 1;
";
