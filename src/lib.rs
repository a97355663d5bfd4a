//! Kiosk - a small server-rendered site with private notes and public news.
//!
//! The site is assembled from three modules on top of a hyper server:
//!
//! - **Notes**: each user's private notes, addressed by unique slugs
//! - **News**: public articles with comments from logged-in readers
//! - **Users**: signup, login and logout with cookie sessions
//!
//! Supporting layers:
//!
//! - **Config**: Layered configuration (file → env → CLI)
//! - **Database**: libsql abstraction for local and remote databases
//! - **Auth**: Session tokens (JWT) and password hashing
//! - **Router**: HTTP routing with path parameters
//! - **Templates**: Tera pages compiled into the binary
//!
//! # Example
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> kiosk::Result<()> {
//!     let config = kiosk::Loader::new("KIOSK").load(None, None, None, None, None)?;
//!     let db = kiosk::db::open(&config.database.url).await?;
//!     let router = kiosk::router(&config);
//!     let state = kiosk::server::State::new(config, Some(db), router.into_handle())?;
//!     kiosk::server::run(state).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod module;
pub mod news;
pub mod notes;
pub mod rate_limit;
pub mod response;
pub mod router;
pub mod server;
pub mod templates;
pub mod users;

// Re-export main types at crate root
pub use config::{Config, Loader};
pub use db::Handle as DbHandle;
pub use error::{Error, Result};
pub use module::Module;
pub use router::{Context, Router};

/// Every module served by the site.
pub fn modules(config: &Config) -> Vec<Box<dyn Module>> {
    vec![
        Box::new(news::NewsModule),
        Box::new(notes::NotesModule),
        Box::new(users::UsersModule::new(&config.auth)),
    ]
}

/// A router with the routes of every module registered.
pub fn router(config: &Config) -> Router {
    let mut router = Router::new();
    for module in modules(config) {
        module.routes(&mut router);
        tracing::debug!(module = module.name(), "Registered module routes");
    }
    router
}
