//! Module trait for pluggable site sections.
//!
//! Each application (notes, news, users) implements `Module` to register its
//! pages with the router.
//!
//! # Example
//!
//! ```ignore
//! use kiosk::{Module, Router};
//!
//! pub struct AboutModule;
//!
//! impl Module for AboutModule {
//!     fn name(&self) -> &'static str {
//!         "about"
//!     }
//!
//!     fn routes(&self, router: &mut Router) {
//!         router.get("/about/", |ctx| async move {
//!             ctx.render("about.html", serde_json::json!({}))
//!         });
//!     }
//! }
//! ```

use crate::router::Router;

/// A pluggable site section.
///
/// Modules register their routes with the router and can hold their own state.
/// The state is captured in closures when registering routes.
pub trait Module: Send + Sync {
    /// Module name for identification and logging.
    fn name(&self) -> &'static str;

    /// Register routes with the router.
    fn routes(&self, router: &mut Router);
}
