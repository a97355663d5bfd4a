//! HTML templates compiled into the binary and rendered with Tera.

use tera::Tera;

const SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("includes/form_errors.html", include_str!("../templates/includes/form_errors.html")),
    ("news/home.html", include_str!("../templates/news/home.html")),
    ("news/detail.html", include_str!("../templates/news/detail.html")),
    ("news/edit.html", include_str!("../templates/news/edit.html")),
    ("news/delete.html", include_str!("../templates/news/delete.html")),
    ("notes/list.html", include_str!("../templates/notes/list.html")),
    ("notes/form.html", include_str!("../templates/notes/form.html")),
    ("notes/detail.html", include_str!("../templates/notes/detail.html")),
    ("notes/delete.html", include_str!("../templates/notes/delete.html")),
    ("notes/success.html", include_str!("../templates/notes/success.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/logout.html", include_str!("../templates/users/logout.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
];

/// Compiled page templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Parse every bundled template. Fails on the first syntax error.
    pub fn load() -> crate::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(SOURCES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render `name` with a JSON object as context.
    pub fn render(&self, name: &str, context: &serde_json::Value) -> crate::Result<String> {
        let context = tera::Context::from_value(context.clone())?;
        Ok(self.tera.render(name, &context)?)
    }
}
