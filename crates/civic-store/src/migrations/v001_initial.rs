//! v001 -- Initial schema creation.
//!
//! Creates the six portal tables: `agencies`, `users`, `categories`,
//! `submissions`, `admin_responses` and `notifications`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Agencies
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS agencies (
    id          TEXT PRIMARY KEY NOT NULL,    -- UUID v4
    name        TEXT NOT NULL,
    description TEXT,
    email       TEXT,
    phone       TEXT,
    address     TEXT,
    created_at  TEXT NOT NULL,                -- RFC-3339
    updated_at  TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    phone         TEXT NOT NULL,
    address       TEXT,
    city          TEXT,
    district      TEXT,
    password_hash TEXT NOT NULL,              -- Argon2id PHC string
    role          TEXT NOT NULL DEFAULT 'CITIZEN'
                  CHECK (role IN ('CITIZEN', 'ADMIN', 'AGENCY_STAFF')),
    agency_id     TEXT,                       -- nullable FK -> agencies(id)
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,

    FOREIGN KEY (agency_id) REFERENCES agencies(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_users_agency ON users(agency_id);

-- ----------------------------------------------------------------
-- Categories
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS categories (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    name       TEXT NOT NULL,
    agency_id  TEXT NOT NULL,                 -- FK -> agencies(id)
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY (agency_id) REFERENCES agencies(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_categories_agency ON categories(agency_id);

-- ----------------------------------------------------------------
-- Submissions
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS submissions (
    id             TEXT PRIMARY KEY NOT NULL, -- UUID v4
    title          TEXT NOT NULL,
    description    TEXT NOT NULL,
    type           TEXT NOT NULL CHECK (type IN ('COMPLAINT', 'FEEDBACK')),
    status         TEXT NOT NULL DEFAULT 'OPEN'
                   CHECK (status IN ('OPEN', 'IN_PROGRESS', 'RESOLVED', 'REJECTED')),
    location       TEXT,
    attachment_url TEXT,
    user_id        TEXT NOT NULL,             -- FK -> users(id)
    category_id    TEXT NOT NULL,             -- FK -> categories(id)
    agency_id      TEXT NOT NULL,             -- FK -> agencies(id)
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,

    FOREIGN KEY (user_id)     REFERENCES users(id)      ON DELETE CASCADE,
    FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE,
    FOREIGN KEY (agency_id)   REFERENCES agencies(id)   ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_submissions_user    ON submissions(user_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_submissions_agency  ON submissions(agency_id, created_at DESC);

-- ----------------------------------------------------------------
-- Admin responses
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS admin_responses (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    message       TEXT NOT NULL,
    submission_id TEXT NOT NULL,              -- FK -> submissions(id)
    responder_id  TEXT NOT NULL,              -- FK -> users(id)
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,

    FOREIGN KEY (submission_id) REFERENCES submissions(id) ON DELETE CASCADE,
    FOREIGN KEY (responder_id)  REFERENCES users(id)       ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_responses_submission
    ON admin_responses(submission_id, created_at ASC);

-- ----------------------------------------------------------------
-- Notifications
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS notifications (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    message       TEXT NOT NULL,
    is_read       INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    type          TEXT NOT NULL
                  CHECK (type IN ('SYSTEM', 'SUBMISSION_UPDATE', 'ADMIN_RESPONSE')),
    user_id       TEXT NOT NULL,              -- FK -> users(id)
    submission_id TEXT,                       -- nullable FK -> submissions(id)
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,

    FOREIGN KEY (user_id)       REFERENCES users(id)       ON DELETE CASCADE,
    FOREIGN KEY (submission_id) REFERENCES submissions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_notifications_user
    ON notifications(user_id, created_at DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
