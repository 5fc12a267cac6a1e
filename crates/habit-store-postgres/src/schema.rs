//! SQL schema for the Postgres habit store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id          BIGSERIAL PRIMARY KEY,
    username    TEXT UNIQUE NOT NULL,
    email       TEXT UNIQUE NOT NULL,
    password    TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS habits (
    id          TEXT PRIMARY KEY,
    user_id     BIGINT NOT NULL REFERENCES users(id),
    name        TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS habit_checks (
    id          BIGSERIAL PRIMARY KEY,
    habit_id    TEXT NOT NULL REFERENCES habits(id),
    date        TEXT NOT NULL,
    checked     BOOLEAN NOT NULL DEFAULT false,
    UNIQUE (habit_id, date)
);

CREATE TABLE IF NOT EXISTS weekly_habits (
    id          TEXT PRIMARY KEY,
    user_id     BIGINT NOT NULL REFERENCES users(id),
    week        BIGINT NOT NULL,
    name        TEXT NOT NULL,
    completed   BOOLEAN NOT NULL DEFAULT false,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS habits_user_idx        ON habits(user_id);
CREATE INDEX IF NOT EXISTS weekly_habits_user_idx ON weekly_habits(user_id);
";
