//! In-process test harness.
//!
//! Requests go through [`kiosk::server::dispatch`], the same pipeline the
//! socket server uses, so the [`Rendered`] extension with the page context is
//! still attached to the response.

#![allow(dead_code)]

use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, COOKIE};
use hyper::{Method, Request, StatusCode};
use jiff::Timestamp;
use jiff::civil::Date;
use kiosk::auth::{self, UNUSABLE_PASSWORD};
use kiosk::config::{Auth, Config, Database};
use kiosk::news::model as news;
use kiosk::notes::model::{self as notes, Fields, Note};
use kiosk::response::Rendered;
use kiosk::server::{State, dispatch};
use kiosk::users::{User, model as users};
use libsql::Connection;
use serde_json::Value;

pub const JWT_SECRET: &str = "test-secret-that-is-at-least-32b!";
pub const LOGIN_URL: &str = "/auth/login/";

pub struct App {
    _dir: tempfile::TempDir,
    pub state: State,
}

impl App {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = dir.path().join("kiosk.db").to_string_lossy().into_owned();
        let config = Config {
            database: Database { url: url.clone() },
            auth: Auth {
                jwt_secret: JWT_SECRET.to_string(),
                ..config.auth
            },
            ..config
        };
        let db = kiosk::db::open(&url).await.expect("open database");
        let router = kiosk::router(&config);
        let state = State::new(config, Some(db), router.into_handle()).expect("state");
        Self { _dir: dir, state }
    }

    pub async fn conn(&self) -> Connection {
        kiosk::db::connection(self.state.db.as_ref().unwrap())
            .await
            .expect("connection")
    }

    /// A user without a usable password, like one made by a fixture.
    pub async fn user(&self, username: &str) -> User {
        users::create(&self.conn().await, username, UNUSABLE_PASSWORD)
            .await
            .expect("create user")
    }

    pub async fn note(&self, title: &str, slug: &str, author: &User) -> Note {
        let fields = Fields {
            title,
            text: "Просто текст.",
            slug,
        };
        notes::create(&self.conn().await, fields, author.id)
            .await
            .expect("create note")
    }

    pub async fn news(&self, title: &str, date: Date) -> news::News {
        news::create_news(&self.conn().await, title, "Просто текст.", date)
            .await
            .expect("create news")
    }

    pub async fn comment(&self, news_id: i64, author: &User, text: &str, created: Timestamp) -> i64 {
        news::create_comment(&self.conn().await, news_id, author.id, text, created)
            .await
            .expect("create comment")
    }

    pub async fn note_count(&self) -> i64 {
        notes::count(&self.conn().await).await.unwrap()
    }

    pub async fn comment_count(&self) -> i64 {
        news::comment_count(&self.conn().await).await.unwrap()
    }

    pub fn anonymous(&self) -> Client<'_> {
        Client {
            app: self,
            session: None,
        }
    }

    /// A client already logged in as `user`, skipping the login form.
    pub fn logged_in(&self, user: &User) -> Client<'_> {
        let token = auth::create_token(&self.state.config.auth, user.id).expect("token");
        Client {
            app: self,
            session: Some(token),
        }
    }
}

pub struct Client<'a> {
    app: &'a App,
    session: Option<String>,
}

impl Client<'_> {
    pub async fn request(&self, method: Method, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = &self.session {
            builder = builder.header(COOKIE, format!("sessionid={token}"));
        }
        let body = if form.is_empty() {
            Bytes::new()
        } else {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
            Bytes::from(serde_urlencoded::to_string(form).unwrap())
        };
        let (parts, ()) = builder.body(()).unwrap().into_parts();

        let response = dispatch(&self.app.state, parts, body, None).await;
        TestResponse::read(response).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, &[]).await
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.request(Method::POST, path, form).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, &[]).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: hyper::HeaderMap,
    pub body: String,
    pub rendered: Option<Rendered>,
}

impl TestResponse {
    async fn read(response: kiosk::response::HttpResponse) -> Self {
        use http_body_util::BodyExt;

        let (mut parts, body) = response.into_parts();
        let rendered = parts.extensions.remove::<Rendered>();
        let bytes = body.collect().await.unwrap().to_bytes();
        Self {
            status: parts.status,
            headers: parts.headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            rendered,
        }
    }

    /// The template context of a rendered page.
    pub fn context(&self) -> &Value {
        &self
            .rendered
            .as_ref()
            .unwrap_or_else(|| panic!("response ({}) was not a rendered page", self.status))
            .context
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get("Location").and_then(|v| v.to_str().ok())
    }

    /// Field errors of the bound form in the context.
    pub fn form_errors(&self, field: &str) -> Vec<String> {
        self.context()["form"]["errors"][field]
            .as_array()
            .map(|messages| {
                messages
                    .iter()
                    .map(|m| m.as_str().unwrap().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[track_caller]
pub fn assert_redirects(response: &TestResponse, expected: &str) {
    assert_eq!(response.status, StatusCode::FOUND, "body: {}", response.body);
    assert_eq!(response.location(), Some(expected));
}

pub fn login_redirect(next: &str) -> String {
    format!("{LOGIN_URL}?next={next}")
}

pub fn note_url(slug: &str, action: &str) -> String {
    match action {
        "detail" => format!("/notes/{slug}/"),
        _ => format!("/notes/{slug}/{action}/"),
    }
}

pub fn news_url(id: i64) -> String {
    format!("/news/{id}/")
}

pub fn today() -> Date {
    news::today()
}
