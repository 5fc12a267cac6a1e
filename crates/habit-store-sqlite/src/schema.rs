//! SQL schema for the SQLite habit store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout version for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT UNIQUE NOT NULL,
    email       TEXT UNIQUE NOT NULL,
    password    TEXT NOT NULL,          -- argon2 PHC string
    created_at  TEXT NOT NULL           -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS habits (
    id          TEXT PRIMARY KEY,       -- chosen by the client
    user_id     INTEGER NOT NULL REFERENCES users(id),
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habit_checks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    habit_id    TEXT NOT NULL REFERENCES habits(id),
    date        TEXT NOT NULL,
    checked     INTEGER NOT NULL DEFAULT 0,
    UNIQUE (habit_id, date)
);

CREATE TABLE IF NOT EXISTS weekly_habits (
    id          TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    week        INTEGER NOT NULL,
    name        TEXT NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS habits_user_idx        ON habits(user_id);
CREATE INDEX IF NOT EXISTS weekly_habits_user_idx ON weekly_habits(user_id);

PRAGMA user_version = 1;
";
