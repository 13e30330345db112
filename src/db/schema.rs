//! Database schema and migrations for docvault.
//!
//! Migrations are applied in order when the database is opened; the
//! schema_version table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: accounts
    r#"
CREATE TABLE users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password      TEXT NOT NULL,           -- Argon2 hash
    email         TEXT NOT NULL DEFAULT '',
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    is_staff      INTEGER NOT NULL DEFAULT 0,
    is_superuser  INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_is_staff ON users(is_staff);

-- One profile per user, removed with the user
CREATE TABLE profiles (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    address          TEXT,
    status           TEXT NOT NULL DEFAULT 'Pending',
    profile_picture  TEXT,                 -- blob key
    created_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE refresh_tokens (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    revoked_at  TEXT
);

CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id);
"#,
    // v2: folders and files
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    created_by  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_created_by ON folders(created_by);

-- folder_id is NULL for confidential uploads
CREATE TABLE files (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    folder_id        INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    file_name        TEXT,
    stored_name      TEXT,                 -- blob key
    uploaded_by      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at       TEXT NOT NULL DEFAULT (datetime('now')),
    is_confidential  INTEGER NOT NULL DEFAULT 0,
    is_archive       INTEGER NOT NULL DEFAULT 0,
    is_backup        INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_files_folder_id ON files(folder_id);
CREATE INDEX idx_files_uploaded_by ON files(uploaded_by);
CREATE INDEX idx_files_created_at ON files(created_at);
"#,
    // v3: append-only logs
    r#"
CREATE TABLE audit_logs (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    info1     TEXT,
    info2     TEXT,
    info3     TEXT,
    info4     TEXT,
    log_date  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE system_logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    detail      TEXT NOT NULL,
    detail_two  TEXT,
    log_date    TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_audit_logs_log_date ON audit_logs(log_date);
CREATE INDEX idx_system_logs_log_date ON system_logs(log_date);
"#,
];
