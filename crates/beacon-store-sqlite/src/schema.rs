//! SQL schema for the Beacon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subscribers (
    subscriber_id TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    city          TEXT NOT NULL,
    segment       TEXT NOT NULL
);

-- One row per subscriber.
CREATE TABLE IF NOT EXISTS metrics (
    subscriber_id  TEXT PRIMARY KEY REFERENCES subscribers(subscriber_id),
    data_volume_gb TEXT NOT NULL,      -- decimal, canonical text
    monthly_spend  TEXT NOT NULL,      -- decimal, canonical text
    loyalty_years  INTEGER NOT NULL CHECK (loyalty_years >= 0)
);

CREATE TABLE IF NOT EXISTS campaigns (
    campaign_id    TEXT PRIMARY KEY,
    campaign_type  TEXT NOT NULL,
    target_segment TEXT NOT NULL,
    priority       INTEGER NOT NULL CHECK (priority >= 1),
    start_time     TEXT NOT NULL,      -- RFC 3339 UTC, fixed width
    end_time       TEXT NOT NULL,
    active         INTEGER NOT NULL    -- 0 | 1
);

CREATE TABLE IF NOT EXISTS assignments (
    assignment_id TEXT PRIMARY KEY,
    subscriber_id TEXT NOT NULL REFERENCES subscribers(subscriber_id),
    campaign_id   TEXT NOT NULL REFERENCES campaigns(campaign_id),
    score         TEXT NOT NULL,       -- snapshot at assignment time
    status        TEXT NOT NULL CHECK (status IN ('ASSIGNED', 'USED', 'EXPIRED')),
    assigned_at   TEXT NOT NULL
);

-- At most one active assignment per subscriber.
CREATE UNIQUE INDEX IF NOT EXISTS assignments_one_active_idx
    ON assignments(subscriber_id) WHERE status = 'ASSIGNED';

-- Append-only.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    subscriber_id   TEXT NOT NULL REFERENCES subscribers(subscriber_id),
    channel         TEXT NOT NULL,
    message         TEXT NOT NULL,
    sent_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS campaigns_segment_idx     ON campaigns(target_segment, active);
CREATE INDEX IF NOT EXISTS assignments_subscriber_idx ON assignments(subscriber_id);
CREATE INDEX IF NOT EXISTS notifications_subscriber_idx ON notifications(subscriber_id);

PRAGMA user_version = 1;
";
