//! SQL schema for the moodlog SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,   -- stored lowercased
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- At most one subscription row per user. A cancelled row is replaced
-- wholesale when the user re-opens a trial.
CREATE TABLE IF NOT EXISTS subscriptions (
    user_id           TEXT PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
    status            TEXT NOT NULL,   -- 'inactive' | 'trial' | 'active' | 'cancelled'
    plan              TEXT NOT NULL,
    price_cents       INTEGER NOT NULL,
    currency          TEXT NOT NULL,
    trial_start       TEXT,
    trial_end         TEXT,
    next_billing_date TEXT,
    created_at        TEXT NOT NULL
);

-- One entry per user per calendar day. Saves on an existing key
-- overwrite; no duplicate keys can exist.
CREATE TABLE IF NOT EXISTS entries (
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    date        TEXT NOT NULL,   -- YYYY-MM-DD day key
    moods       TEXT,            -- JSON array of {mood, value}
    mood        TEXT,            -- first mood, mirrored for legacy readers
    mood_value  INTEGER,
    text        TEXT,
    ai_response TEXT,
    recorded_at TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    PRIMARY KEY (user_id, date)
);

CREATE TABLE IF NOT EXISTS thoughts (
    thought_id  TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    text        TEXT NOT NULL,
    ai_insights TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS entries_date_idx    ON entries(user_id, date);
CREATE INDEX IF NOT EXISTS thoughts_user_idx   ON thoughts(user_id, created_at);

PRAGMA user_version = 1;
";
