//! Database connection and schema.
//!
//! Supports multiple backends:
//! - Local SQLite file: `path/to/db.sqlite` or `file:path` or `sqlite://path`
//! - Remote Turso: `libsql://...` or `https://...` (requires TURSO_AUTH_TOKEN env var)
//!
//! `:memory:` is rejected: every request opens its own connection, and each
//! in-memory connection is a separate empty database.

use std::sync::Arc;

use libsql::{Builder, Connection, Database};

/// Shared database handle held by the server and each request context.
pub type Handle = Arc<Database>;

/// The SQLite in-memory database name, which this site cannot serve from.
pub const MEMORY_URL: &str = ":memory:";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    title     TEXT NOT NULL,
    text      TEXT NOT NULL,
    slug      TEXT NOT NULL UNIQUE,
    author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS news (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    text  TEXT NOT NULL,
    date  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS news_date_idx ON news (date);

CREATE TABLE IF NOT EXISTS comments (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    news_id   INTEGER NOT NULL REFERENCES news(id) ON DELETE CASCADE,
    author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    text      TEXT NOT NULL,
    created   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS comments_news_created_idx ON comments (news_id, created);
";

/// Connect to the database.
///
/// # URL formats
/// - Local file: `mydata.db`, `file:path/to/db.sqlite`, `sqlite://path`
/// - Remote Turso: `libsql://your-db.turso.io` (requires `TURSO_AUTH_TOKEN` env var)
pub async fn connect(url: &str) -> crate::Result<Database> {
    let db = if url.starts_with("libsql://") || url.starts_with("https://") {
        let token = std::env::var("TURSO_AUTH_TOKEN").map_err(|_| {
            crate::Error::Internal("TURSO_AUTH_TOKEN not set for remote database".into())
        })?;
        Builder::new_remote(url.to_string(), token).build().await?
    } else if url == MEMORY_URL {
        return Err(crate::Error::Config(
            "In-memory databases are not shared between connections; use a file path".into(),
        ));
    } else {
        // Local file - strip sqlite:// or file: prefix if present
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        Builder::new_local(path).build().await?
    };

    Ok(db)
}

/// Get a connection from the database with foreign key enforcement enabled.
pub async fn connection(db: &Database) -> crate::Result<Connection> {
    let conn = db.connect()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;").await?;
    Ok(conn)
}

/// Create all tables and indexes that do not exist yet.
pub async fn migrate(conn: &Connection) -> crate::Result<()> {
    conn.execute_batch(SCHEMA).await?;
    tracing::debug!("Database schema is up to date");
    Ok(())
}

/// Connect to `url`, apply the schema, and wrap the database in a shared handle.
pub async fn open(url: &str) -> crate::Result<Handle> {
    let db = connect(url).await?;
    let conn = connection(&db).await?;
    migrate(&conn).await?;
    Ok(Arc::new(db))
}
