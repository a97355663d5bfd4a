//! Note pages. All of them require a logged-in user; pages addressing a single
//! note additionally require that user to be its author.

use libsql::Connection;
use serde_json::json;

use super::SUCCESS_URL;
use super::form::{FORM_NAME, NoteForm};
use super::model::{self, Note};
use crate::form::Bound;
use crate::response::{self, HttpResponse};
use crate::router::Context;
use crate::{Error, Result};

/// The note addressed by the `{slug}` parameter, if the current user wrote it.
async fn owned_note(ctx: &Context, conn: &Connection, author_id: i64) -> Result<Note> {
    let slug = ctx.require_param("slug")?;
    model::find_owned(conn, slug, author_id)
        .await?
        .ok_or_else(|| Error::NotFound("No note matches the given query.".to_string()))
}

pub async fn list(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let notes = model::list_owned(&conn, user.id).await?;
    ctx.render("notes/list.html", json!({ "object_list": notes }))
}

pub async fn success(ctx: Context) -> Result<HttpResponse> {
    ctx.require_user()?;
    ctx.render("notes/success.html", json!({}))
}

pub async fn detail(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let note = owned_note(&ctx, &conn, user.id).await?;
    ctx.render("notes/detail.html", json!({ "note": note }))
}

pub async fn add_page(ctx: Context) -> Result<HttpResponse> {
    ctx.require_user()?;
    ctx.render(
        "notes/form.html",
        json!({ "form": Bound::<NoteForm>::blank(FORM_NAME) }),
    )
}

pub async fn add(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let mut data: NoteForm = ctx.form()?;
    let conn = ctx.conn().await?;

    let errors = data.validate(&conn, None).await?;
    if !errors.is_empty() {
        let form = Bound::with_errors(FORM_NAME, data, errors);
        return ctx.render("notes/form.html", json!({ "form": form }));
    }

    let note = model::create(&conn, data.fields(), user.id).await?;
    tracing::info!(note_id = note.id, user_id = user.id, "Note created");
    response::redirect(SUCCESS_URL)
}

pub async fn edit_page(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let note = owned_note(&ctx, &conn, user.id).await?;
    let form = Bound::new(FORM_NAME, NoteForm::from(&note));
    ctx.render("notes/form.html", json!({ "form": form, "note": note }))
}

pub async fn edit(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let note = owned_note(&ctx, &conn, user.id).await?;
    let mut data: NoteForm = ctx.form()?;

    let errors = data.validate(&conn, Some(note.id)).await?;
    if !errors.is_empty() {
        let form = Bound::with_errors(FORM_NAME, data, errors);
        return ctx.render("notes/form.html", json!({ "form": form, "note": note }));
    }

    if !model::update_owned(&conn, note.id, user.id, data.fields()).await? {
        return Err(Error::NotFound("No note matches the given query.".to_string()));
    }
    tracing::info!(note_id = note.id, user_id = user.id, "Note updated");
    response::redirect(SUCCESS_URL)
}

pub async fn delete_page(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let note = owned_note(&ctx, &conn, user.id).await?;
    ctx.render("notes/delete.html", json!({ "note": note }))
}

pub async fn delete(ctx: Context) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let conn = ctx.conn().await?;
    let note = owned_note(&ctx, &conn, user.id).await?;

    if !model::delete_owned(&conn, note.id, user.id).await? {
        return Err(Error::NotFound("No note matches the given query.".to_string()));
    }
    tracing::info!(note_id = note.id, user_id = user.id, "Note deleted");
    response::redirect(SUCCESS_URL)
}
