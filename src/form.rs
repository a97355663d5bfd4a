//! Submitted forms and their field errors.
//!
//! A form is a plain struct deserialized from an urlencoded body. Validation
//! collects messages per field; a [`Bound`] form carries the submitted data
//! and those messages back into the template context.

use std::collections::BTreeMap;

use serde::Serialize;

pub const REQUIRED: &str = "This field is required.";

/// Validation messages keyed by field name. `__all__` holds form-wide errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record a form-wide error not tied to a single field.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add("__all__", message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add [`REQUIRED`] when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, REQUIRED);
        }
    }

    /// Add a length error when `value` exceeds `max` characters.
    pub fn max_length(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("Ensure this value has at most {max} characters."));
        }
    }
}

/// A form together with what the user submitted and what was wrong with it.
#[derive(Debug, Clone, Serialize)]
pub struct Bound<T: Serialize> {
    /// Form type name, e.g. `NoteForm`.
    pub name: &'static str,
    pub data: T,
    pub errors: FieldErrors,
}

impl<T: Serialize + Default> Bound<T> {
    /// An empty, unsubmitted form.
    pub fn blank(name: &'static str) -> Self {
        Self::new(name, T::default())
    }
}

impl<T: Serialize> Bound<T> {
    pub fn new(name: &'static str, data: T) -> Self {
        Self {
            name,
            data,
            errors: FieldErrors::new(),
        }
    }

    pub fn with_errors(name: &'static str, data: T, errors: FieldErrors) -> Self {
        Self { name, data, errors }
    }
}
