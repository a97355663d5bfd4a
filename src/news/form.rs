//! The comment form and its banned-word filter.

use serde::{Deserialize, Serialize};

use crate::form::FieldErrors;

pub const FORM_NAME: &str = "CommentForm";

/// Substrings that may not appear in a comment, matched case-sensitively.
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Field error for a comment containing a banned word.
pub const WARNING: &str = "Не ругайтесь!";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

pub fn contains_bad_word(text: &str) -> bool {
    BAD_WORDS.iter().any(|word| text.contains(word))
}

impl CommentForm {
    pub fn clean(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("text", &self.text);
        if contains_bad_word(&self.text) {
            errors.add("text", WARNING);
        }
        errors
    }
}
