//! User accounts.

use libsql::{Connection, Row, params};
use serde::Serialize;

use crate::Result;
use crate::auth;

pub const USERNAME_MAX_LENGTH: usize = 150;

/// An account as seen by the rest of the site. The password hash never
/// leaves this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

fn from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
    })
}

/// Insert a user with an already computed password hash
/// (or [`auth::UNUSABLE_PASSWORD`]).
pub async fn create(conn: &Connection, username: &str, password_hash: &str) -> Result<User> {
    conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
        params![username, password_hash],
    )
    .await?;
    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
    })
}

/// Hash `password` off the async executor and insert the user.
pub async fn register(conn: &Connection, username: &str, password: &str) -> Result<User> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| crate::Error::Internal(format!("Password hashing task failed: {e}")))??;
    let user = create(conn, username, &hash).await?;
    tracing::info!(user_id = user.id, "Registered user");
    Ok(user)
}

pub async fn get(conn: &Connection, id: i64) -> Result<Option<User>> {
    let mut rows = conn
        .query("SELECT id, username FROM users WHERE id = ?1", params![id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(from_row(&row)?)),
        None => Ok(None),
    }
}

pub async fn username_taken(conn: &Connection, username: &str) -> Result<bool> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM users WHERE username = ?1",
            params![username],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Look up `username` and check `password` against its stored hash.
pub async fn authenticate(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let mut rows = conn
        .query(
            "SELECT id, username, password_hash FROM users WHERE username = ?1",
            params![username],
        )
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    let user = from_row(&row)?;
    let hash: String = row.get(2)?;

    let password = password.to_string();
    let matches = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| crate::Error::Internal(format!("Password check task failed: {e}")))?;
    Ok(matches.then_some(user))
}
