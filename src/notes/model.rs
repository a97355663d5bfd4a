//! Note persistence.
//!
//! Every read or write that a request can trigger goes through an `_owned`
//! function, so a note belonging to someone else is indistinguishable from a
//! note that does not exist.

use libsql::{Connection, Row, params};
use serde::Serialize;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: i64,
}

/// Field values for a note being created or replaced.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub slug: &'a str,
}

const COLUMNS: &str = "id, title, text, slug, author_id";

fn from_row(row: &Row) -> Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        slug: row.get(3)?,
        author_id: row.get(4)?,
    })
}

async fn collect(mut rows: libsql::Rows) -> Result<Vec<Note>> {
    let mut notes = Vec::new();
    while let Some(row) = rows.next().await? {
        notes.push(from_row(&row)?);
    }
    Ok(notes)
}

pub async fn create(conn: &Connection, fields: Fields<'_>, author_id: i64) -> Result<Note> {
    conn.execute(
        "INSERT INTO notes (title, text, slug, author_id) VALUES (?1, ?2, ?3, ?4)",
        params![fields.title, fields.text, fields.slug, author_id],
    )
    .await?;
    Ok(Note {
        id: conn.last_insert_rowid(),
        title: fields.title.to_string(),
        text: fields.text.to_string(),
        slug: fields.slug.to_string(),
        author_id,
    })
}

/// Fetch by id regardless of owner. Not reachable from request handlers.
pub async fn get(conn: &Connection, id: i64) -> Result<Option<Note>> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM notes WHERE id = ?1"),
            params![id],
        )
        .await?;
    Ok(collect(rows).await?.into_iter().next())
}

pub async fn find_owned(conn: &Connection, slug: &str, author_id: i64) -> Result<Option<Note>> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM notes WHERE slug = ?1 AND author_id = ?2"),
            params![slug, author_id],
        )
        .await?;
    Ok(collect(rows).await?.into_iter().next())
}

pub async fn list_owned(conn: &Connection, author_id: i64) -> Result<Vec<Note>> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM notes WHERE author_id = ?1 ORDER BY id"),
            params![author_id],
        )
        .await?;
    collect(rows).await
}

/// Replace a note's fields. Returns false when no such note belongs to `author_id`.
pub async fn update_owned(
    conn: &Connection,
    id: i64,
    author_id: i64,
    fields: Fields<'_>,
) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE notes SET title = ?1, text = ?2, slug = ?3 WHERE id = ?4 AND author_id = ?5",
            params![fields.title, fields.text, fields.slug, id, author_id],
        )
        .await?;
    Ok(changed > 0)
}

/// Delete a note. Returns false when no such note belongs to `author_id`.
pub async fn delete_owned(conn: &Connection, id: i64, author_id: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "DELETE FROM notes WHERE id = ?1 AND author_id = ?2",
            params![id, author_id],
        )
        .await?;
    Ok(changed > 0)
}

/// Whether a note other than `except_id` already uses `slug`.
pub async fn slug_taken(conn: &Connection, slug: &str, except_id: Option<i64>) -> Result<bool> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM notes WHERE slug = ?1 AND id != ?2",
            params![slug, except_id.unwrap_or(-1)],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

pub async fn count(conn: &Connection) -> Result<i64> {
    let mut rows = conn.query("SELECT COUNT(*) FROM notes", ()).await?;
    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(0),
    }
}
