//! News articles and their comments.

use jiff::Timestamp;
use jiff::civil::Date;
use libsql::{Connection, Row, params};
use serde::Serialize;

use crate::{Error, Result};

pub const TITLE_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_id: i64,
    /// Username of the author, joined in for display.
    pub author: String,
    pub text: String,
    pub created: Timestamp,
}

/// An article together with its comments, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct NewsDetail {
    #[serde(flatten)]
    pub news: News,
    pub comments: Vec<Comment>,
}

fn parse_date(raw: &str) -> Result<Date> {
    raw.parse()
        .map_err(|e| Error::Internal(format!("Stored news date {raw:?} is invalid: {e}")))
}

fn news_from_row(row: &Row) -> Result<News> {
    let date: String = row.get(3)?;
    Ok(News {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        date: parse_date(&date)?,
    })
}

fn comment_from_row(row: &Row) -> Result<Comment> {
    let created: i64 = row.get(5)?;
    Ok(Comment {
        id: row.get(0)?,
        news_id: row.get(1)?,
        author_id: row.get(2)?,
        author: row.get(3)?,
        text: row.get(4)?,
        created: Timestamp::from_microsecond(created)
            .map_err(|e| Error::Internal(format!("Stored comment timestamp is invalid: {e}")))?,
    })
}

const COMMENT_SELECT: &str = "SELECT c.id, c.news_id, c.author_id, u.username, c.text, c.created \
     FROM comments c JOIN users u ON u.id = c.author_id";

/// Today's date in the server's time zone; the default publication date.
pub fn today() -> Date {
    jiff::Zoned::now().date()
}

pub async fn create_news(conn: &Connection, title: &str, text: &str, date: Date) -> Result<News> {
    if title.trim().is_empty() || title.chars().count() > TITLE_MAX_LENGTH {
        return Err(Error::BadRequest(format!(
            "News title must be 1 to {TITLE_MAX_LENGTH} characters"
        )));
    }
    conn.execute(
        "INSERT INTO news (title, text, date) VALUES (?1, ?2, ?3)",
        params![title, text, date.to_string()],
    )
    .await?;
    Ok(News {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        text: text.to_string(),
        date,
    })
}

pub async fn get_news(conn: &Connection, id: i64) -> Result<Option<News>> {
    let mut rows = conn
        .query(
            "SELECT id, title, text, date FROM news WHERE id = ?1",
            params![id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(news_from_row(&row)?)),
        None => Ok(None),
    }
}

/// The newest `limit` articles, newest first.
pub async fn latest_news(conn: &Connection, limit: u32) -> Result<Vec<News>> {
    let mut rows = conn
        .query(
            "SELECT id, title, text, date FROM news ORDER BY date DESC, id ASC LIMIT ?1",
            params![limit as i64],
        )
        .await?;
    let mut news = Vec::new();
    while let Some(row) = rows.next().await? {
        news.push(news_from_row(&row)?);
    }
    Ok(news)
}

pub async fn detail(conn: &Connection, id: i64) -> Result<Option<NewsDetail>> {
    let Some(news) = get_news(conn, id).await? else {
        return Ok(None);
    };
    let comments = comments_for(conn, id).await?;
    Ok(Some(NewsDetail { news, comments }))
}

/// All comments on an article, oldest first.
pub async fn comments_for(conn: &Connection, news_id: i64) -> Result<Vec<Comment>> {
    let mut rows = conn
        .query(
            &format!("{COMMENT_SELECT} WHERE c.news_id = ?1 ORDER BY c.created ASC, c.id ASC"),
            params![news_id],
        )
        .await?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next().await? {
        comments.push(comment_from_row(&row)?);
    }
    Ok(comments)
}

pub async fn create_comment(
    conn: &Connection,
    news_id: i64,
    author_id: i64,
    text: &str,
    created: Timestamp,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO comments (news_id, author_id, text, created) VALUES (?1, ?2, ?3, ?4)",
        params![news_id, author_id, text, created.as_microsecond()],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

/// Fetch by id regardless of author. Not reachable from request handlers.
pub async fn get_comment(conn: &Connection, id: i64) -> Result<Option<Comment>> {
    let mut rows = conn
        .query(&format!("{COMMENT_SELECT} WHERE c.id = ?1"), params![id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(comment_from_row(&row)?)),
        None => Ok(None),
    }
}

pub async fn find_comment_owned(
    conn: &Connection,
    id: i64,
    author_id: i64,
) -> Result<Option<Comment>> {
    let mut rows = conn
        .query(
            &format!("{COMMENT_SELECT} WHERE c.id = ?1 AND c.author_id = ?2"),
            params![id, author_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(comment_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Replace a comment's text. Returns false when no such comment belongs to `author_id`.
pub async fn update_comment_owned(
    conn: &Connection,
    id: i64,
    author_id: i64,
    text: &str,
) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE comments SET text = ?1 WHERE id = ?2 AND author_id = ?3",
            params![text, id, author_id],
        )
        .await?;
    Ok(changed > 0)
}

/// Delete a comment. Returns false when no such comment belongs to `author_id`.
pub async fn delete_comment_owned(conn: &Connection, id: i64, author_id: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "DELETE FROM comments WHERE id = ?1 AND author_id = ?2",
            params![id, author_id],
        )
        .await?;
    Ok(changed > 0)
}

pub async fn comment_count(conn: &Connection) -> Result<i64> {
    let mut rows = conn.query("SELECT COUNT(*) FROM comments", ()).await?;
    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(0),
    }
}
