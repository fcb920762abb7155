//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `client_references` table (partner companies shown on the site)
/// - `gallery_items` table (production gallery images)
/// - `contact_messages` table (inbound contact-form submissions)
/// - `users` table (admin/registered accounts)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Client references
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS client_references (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    website_url TEXT NULL,
    logo_url TEXT NULL,
    industry TEXT NULL,
    description TEXT NULL,
    display_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_client_references_industry ON client_references(industry);

-- ---------------------------------------------------------------------------
-- Gallery items (thumbnail_url currently always equals image_url)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS gallery_items (
    id BLOB PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    image_url TEXT NOT NULL,
    thumbnail_url TEXT NOT NULL,
    category TEXT NULL,
    description TEXT NULL,
    display_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_gallery_items_category ON gallery_items(category);

-- ---------------------------------------------------------------------------
-- Contact messages
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS contact_messages (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    company TEXT NULL,
    email TEXT NOT NULL,
    phone TEXT NULL,
    message TEXT NOT NULL,
    attachment_url TEXT NULL,
    attachment_filename TEXT NULL,
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_contact_messages_is_read ON contact_messages(is_read);

-- ---------------------------------------------------------------------------
-- Users (one row per account, role is ADMIN or USER)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id BLOB PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'USER',
    enabled INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL -- RFC3339
);
"#;
