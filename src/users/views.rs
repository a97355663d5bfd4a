//! Signup, login and logout pages.

use std::sync::Arc;

use hyper::header::{HeaderValue, SET_COOKIE};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::model::{self, USERNAME_MAX_LENGTH};
use crate::auth;
use crate::form::{Bound, FieldErrors};
use crate::rate_limit::RateLimiter;
use crate::response::{self, HttpResponse};
use crate::router::Context;
use crate::{Error, Result};

pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

impl SignupForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("username", &self.username);
        errors.max_length("username", &self.username, USERNAME_MAX_LENGTH);
        if !self
            .username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_ ".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        errors.require("password1", &self.password1);
        if !self.password1.is_empty() && self.password1.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password1",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."),
            );
        }
        errors.require("password2", &self.password2);
        if self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }
        errors
    }
}

fn set_cookie(response: &mut HttpResponse, cookie: &str) -> Result<()> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| Error::Internal(format!("Invalid session cookie: {e}")))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}

pub async fn signup_page(ctx: Context) -> Result<HttpResponse> {
    ctx.render(
        "users/signup.html",
        json!({ "form": Bound::<SignupForm>::blank("SignupForm") }),
    )
}

pub async fn signup(ctx: Context) -> Result<HttpResponse> {
    let data: SignupForm = ctx.form()?;
    let username = data.username.trim().to_string();
    let data = SignupForm { username, ..data };

    let mut errors = data.validate();
    let conn = ctx.conn().await?;
    if errors.get("username").is_empty() && model::username_taken(&conn, &data.username).await? {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        let form = Bound::with_errors("SignupForm", data, errors);
        return ctx.render("users/signup.html", json!({ "form": form }));
    }

    model::register(&conn, &data.username, &data.password1).await?;
    response::redirect(&ctx.config.auth.login_url)
}

pub async fn login_page(ctx: Context) -> Result<HttpResponse> {
    let form = LoginForm {
        next: ctx.query("next").unwrap_or_default(),
        ..Default::default()
    };
    ctx.render(
        "users/login.html",
        json!({ "form": Bound::new("LoginForm", form) }),
    )
}

pub async fn login(ctx: Context, limiter: Arc<RateLimiter>) -> Result<HttpResponse> {
    if let Some(addr) = ctx.remote_addr
        && let Err(retry_after) = limiter.check(addr.ip())
    {
        tracing::warn!(ip = %addr.ip(), "Login rate limit exceeded");
        return Err(Error::TooManyRequests { retry_after });
    }

    let mut data: LoginForm = ctx.form()?;
    if data.next.is_empty() {
        data.next = ctx.query("next").unwrap_or_default();
    }

    let mut errors = FieldErrors::new();
    errors.require("username", &data.username);
    errors.require("password", &data.password);
    let user = if errors.is_empty() {
        let conn = ctx.conn().await?;
        model::authenticate(&conn, data.username.trim(), &data.password).await?
    } else {
        None
    };

    let Some(user) = user else {
        if errors.is_empty() {
            errors.add_non_field(INVALID_LOGIN);
        }
        let form = Bound::with_errors("LoginForm", data, errors);
        return ctx.render("users/login.html", json!({ "form": form }));
    };

    let token = auth::create_token(&ctx.config.auth, user.id)?;
    let target = if response::is_local_path(&data.next) {
        data.next.as_str()
    } else {
        "/"
    };
    tracing::info!(user_id = user.id, "User logged in");

    let mut response = response::redirect(target)?;
    set_cookie(&mut response, &auth::session_cookie(&ctx.config.auth, &token))?;
    Ok(response)
}

pub async fn logout(ctx: Context) -> Result<HttpResponse> {
    if let Some(user) = ctx.user() {
        tracing::info!(user_id = user.id, "User logged out");
    }
    // The page itself is rendered for an anonymous visitor
    let ctx = Context { user: None, ..ctx };
    let mut response = ctx.render("users/logout.html", json!({}))?;
    set_cookie(&mut response, &auth::clear_session_cookie(&ctx.config.auth))?;
    Ok(response)
}
