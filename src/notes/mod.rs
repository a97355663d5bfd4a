//! Private notes, each addressed by a unique slug.

pub mod form;
pub mod model;
pub mod views;

use crate::module::Module;
use crate::router::Router;

pub use form::NoteForm;
pub use model::Note;

/// Where every successful add, edit or delete lands.
pub const SUCCESS_URL: &str = "/notes/success/";

pub struct NotesModule;

impl Module for NotesModule {
    fn name(&self) -> &'static str {
        "notes"
    }

    fn routes(&self, router: &mut Router) {
        router.get("/notes/", views::list);
        router.get("/notes/add/", views::add_page);
        router.post("/notes/add/", views::add);
        router.get(SUCCESS_URL, views::success);
        router.get("/notes/{slug}/", views::detail);
        router.get("/notes/{slug}/edit/", views::edit_page);
        router.post("/notes/{slug}/edit/", views::edit);
        router.get("/notes/{slug}/delete/", views::delete_page);
        router.post("/notes/{slug}/delete/", views::delete);
        router.delete("/notes/{slug}/delete/", views::delete);
    }
}
