//! News pages: the public listing and article pages, plus comment editing
//! restricted to each comment's author.

use jiff::Timestamp;
use libsql::Connection;
use serde_json::json;

use super::form::{CommentForm, FORM_NAME};
use super::model::{self, Comment};
use crate::form::Bound;
use crate::response::{self, HttpResponse};
use crate::router::Context;
use crate::{Error, Result};

/// Where a comment change sends the author back to.
pub fn comments_url(news_id: i64) -> String {
    format!("/news/{news_id}/#comments")
}

fn news_not_found() -> Error {
    Error::NotFound("No news matches the given query.".to_string())
}

fn comment_not_found() -> Error {
    Error::NotFound("No comment matches the given query.".to_string())
}

/// The comment addressed by the `{id}` parameter, if the current user wrote it.
async fn owned_comment(ctx: &Context, conn: &Connection, author_id: i64) -> Result<Comment> {
    let id = ctx.id_param("id")?;
    model::find_comment_owned(conn, id, author_id)
        .await?
        .ok_or_else(comment_not_found)
}

pub async fn home(ctx: Context) -> Result<HttpResponse> {
    let conn = ctx.conn().await?;
    let news = model::latest_news(&conn, ctx.config.site.news_count_on_home_page).await?;
    ctx.render("news/home.html", json!({ "object_list": news }))
}

/// Render an article; the comment form is only offered to logged-in users.
async fn render_detail(
    ctx: &Context,
    conn: &Connection,
    news_id: i64,
    form: Bound<CommentForm>,
) -> Result<HttpResponse> {
    let news = model::detail(conn, news_id).await?.ok_or_else(news_not_found)?;
    let context = if ctx.user().is_some() {
        json!({ "news": news, "form": form })
    } else {
        json!({ "news": news })
    };
    ctx.render("news/detail.html", context)
}

pub async fn detail(ctx: Context) -> Result<HttpResponse> {
    let news_id = ctx.id_param("id")?;
    let conn = ctx.conn().await?;
    render_detail(&ctx, &conn, news_id, Bound::blank(FORM_NAME)).await
}

pub async fn comment(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let news_id = ctx.id_param("id")?;
    let conn = ctx.conn().await?;
    if model::get_news(&conn, news_id).await?.is_none() {
        return Err(news_not_found());
    }

    let data: CommentForm = ctx.form()?;
    let errors = data.clean();
    if !errors.is_empty() {
        let form = Bound::with_errors(FORM_NAME, data, errors);
        return render_detail(&ctx, &conn, news_id, form).await;
    }

    let id = model::create_comment(&conn, news_id, user.id, &data.text, Timestamp::now()).await?;
    tracing::info!(comment_id = id, news_id, user_id = user.id, "Comment created");
    response::redirect(&comments_url(news_id))
}

pub async fn edit_comment_page(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let comment = owned_comment(&ctx, &conn, user.id).await?;
    let form = Bound::new(
        FORM_NAME,
        CommentForm {
            text: comment.text.clone(),
        },
    );
    ctx.render("news/edit.html", json!({ "comment": comment, "form": form }))
}

pub async fn edit_comment(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let comment = owned_comment(&ctx, &conn, user.id).await?;

    let data: CommentForm = ctx.form()?;
    let errors = data.clean();
    if !errors.is_empty() {
        let form = Bound::with_errors(FORM_NAME, data, errors);
        return ctx.render("news/edit.html", json!({ "comment": comment, "form": form }));
    }

    if !model::update_comment_owned(&conn, comment.id, user.id, &data.text).await? {
        return Err(comment_not_found());
    }
    tracing::info!(comment_id = comment.id, user_id = user.id, "Comment updated");
    response::redirect(&comments_url(comment.news_id))
}

pub async fn delete_comment_page(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let comment = owned_comment(&ctx, &conn, user.id).await?;
    ctx.render("news/delete.html", json!({ "comment": comment }))
}

pub async fn delete_comment(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let comment = owned_comment(&ctx, &conn, user.id).await?;

    if !model::delete_comment_owned(&conn, comment.id, user.id).await? {
        return Err(comment_not_found());
    }
    tracing::info!(comment_id = comment.id, user_id = user.id, "Comment deleted");
    response::redirect(&comments_url(comment.news_id))
}
