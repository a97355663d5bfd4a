//! The note form: slug derivation and uniqueness.

use libsql::Connection;
use serde::{Deserialize, Serialize};

use super::model::{self, Fields};
use crate::form::{FieldErrors, REQUIRED};

pub const FORM_NAME: &str = "NoteForm";
pub const TITLE_MAX_LENGTH: usize = 100;
pub const SLUG_MAX_LENGTH: usize = 100;

/// Appended to a conflicting slug in the slug field error.
pub const WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";

const INVALID_SLUG: &str =
    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

/// Transliterate `title` into a lowercase, hyphenated slug of at most
/// [`SLUG_MAX_LENGTH`] characters.
pub fn slugify(title: &str) -> String {
    let slug = slug::slugify(title);
    match slug.char_indices().nth(SLUG_MAX_LENGTH) {
        Some((end, _)) => slug[..end].to_string(),
        None => slug,
    }
}

fn is_valid_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl NoteForm {
    /// Check everything that does not need the database, filling in a slug
    /// derived from the title when none was given.
    pub fn clean(&mut self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);
        errors.max_length("title", &self.title, TITLE_MAX_LENGTH);
        errors.require("text", &self.text);

        self.slug = self.slug.trim().to_string();
        if self.slug.is_empty() {
            self.slug = slugify(&self.title);
            if self.slug.is_empty() && !self.title.trim().is_empty() {
                errors.add("slug", REQUIRED);
            }
        } else {
            errors.max_length("slug", &self.slug, SLUG_MAX_LENGTH);
            if !is_valid_slug(&self.slug) {
                errors.add("slug", INVALID_SLUG);
            }
        }
        errors
    }

    /// Run [`clean`](Self::clean), then reject a slug that another note
    /// (anything but `editing`) already uses.
    pub async fn validate(
        &mut self,
        conn: &Connection,
        editing: Option<i64>,
    ) -> crate::Result<FieldErrors> {
        let mut errors = self.clean();
        if errors.get("slug").is_empty()
            && !self.slug.is_empty()
            && model::slug_taken(conn, &self.slug, editing).await?
        {
            errors.add("slug", format!("{}{WARNING}", self.slug));
        }
        Ok(errors)
    }

    pub fn fields(&self) -> Fields<'_> {
        Fields {
            title: &self.title,
            text: &self.text,
            slug: &self.slug,
        }
    }
}

impl From<&model::Note> for NoteForm {
    fn from(note: &model::Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: note.slug.clone(),
        }
    }
}
