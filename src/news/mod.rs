//! Public news articles with comments from logged-in readers.

pub mod form;
pub mod model;
pub mod views;

use crate::module::Module;
use crate::router::Router;

pub use form::CommentForm;
pub use model::{Comment, News};

pub struct NewsModule;

impl Module for NewsModule {
    fn name(&self) -> &'static str {
        "news"
    }

    fn routes(&self, router: &mut Router) {
        router.get("/", views::home);
        router.get("/news/{id}/", views::detail);
        router.post("/news/{id}/", views::comment);
        // `{id}` below is the comment's id, not the article's
        router.get("/news/{id}/edit_comment/", views::edit_comment_page);
        router.post("/news/{id}/edit_comment/", views::edit_comment);
        router.get("/news/{id}/delete_comment/", views::delete_comment_page);
        router.post("/news/{id}/delete_comment/", views::delete_comment);
    }
}
