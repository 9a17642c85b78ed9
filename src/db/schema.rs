//! Database schema and migrations.
//!
//! Migrations are applied in order when the database is opened; the
//! `schema_version` table records which ones have run.

/// Database migrations.
///
/// Natural keys carry UNIQUE constraints that span active and inactive
/// rows alike.
pub const MIGRATIONS: &[&str] = &[
    // v1: machines and operators
    r#"
CREATE TABLE bde_machines (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    machine_id      TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,           -- Argon2 PHC string
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    last_login      TEXT,
    is_active       INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    role        TEXT NOT NULL,
    image_url   TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_is_active ON users(is_active);
"#,
    // v2: reference codes
    r#"
CREATE TABLE part_numbers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    part_number TEXT NOT NULL UNIQUE,
    description TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE order_numbers (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    order_number    TEXT NOT NULL UNIQUE,
    description     TEXT,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE performance_ids (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    performance_id  TEXT NOT NULL UNIQUE,
    description     TEXT,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v3: work sessions (append-only)
    r#"
CREATE TABLE work_sessions (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id             INTEGER NOT NULL REFERENCES users(id),
    machine_id          INTEGER NOT NULL REFERENCES bde_machines(id),
    part_number         TEXT NOT NULL,
    order_number        TEXT NOT NULL,
    performance_id      TEXT NOT NULL,
    duration_seconds    INTEGER NOT NULL,
    start_time          TEXT NOT NULL,
    end_time            TEXT NOT NULL,
    created_at          TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_work_sessions_user_id ON work_sessions(user_id);
CREATE INDEX idx_work_sessions_machine_id ON work_sessions(machine_id);
"#,
];
