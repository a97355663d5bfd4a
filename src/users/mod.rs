//! Accounts: signup, login and logout.

pub mod model;
pub mod views;

use std::sync::Arc;

use hyper::http::HeaderMap;
use libsql::Connection;

use crate::config::Auth as AuthConfig;
use crate::module::Module;
use crate::rate_limit::RateLimiter;
use crate::router::Router;

pub use model::User;

/// Resolve the session in `headers` to a user that still exists.
pub async fn current_user(
    conn: &Connection,
    headers: &HeaderMap,
    config: &AuthConfig,
) -> crate::Result<Option<User>> {
    match crate::auth::extract_user_id(headers, config) {
        Ok(id) => model::get(conn, id).await,
        Err(_) => Ok(None),
    }
}

/// Login, logout and signup routes.
pub struct UsersModule {
    login_url: String,
    limiter: Arc<RateLimiter>,
}

impl UsersModule {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            login_url: config.login_url.clone(),
            limiter: Arc::new(RateLimiter::new(config.login_attempts_per_minute, 60)),
        }
    }
}

impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    fn routes(&self, router: &mut Router) {
        router.get(&self.login_url, views::login_page);
        let limiter = Arc::clone(&self.limiter);
        router.post(&self.login_url, move |ctx| views::login(ctx, Arc::clone(&limiter)));
        router.get("/auth/logout/", views::logout);
        router.post("/auth/logout/", views::logout);
        router.get("/auth/signup/", views::signup_page);
        router.post("/auth/signup/", views::signup);
    }
}
