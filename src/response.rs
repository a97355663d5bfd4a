//! HTTP response builders.
//!
//! Pages are rendered through [`Templates`](crate::templates::Templates); the
//! context each page was rendered with travels along as a [`Rendered`]
//! response extension.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::templates::Templates;

/// Response body type used throughout kiosk.
pub type Body = Full<Bytes>;

/// Full response type used throughout kiosk.
pub type HttpResponse = Response<Body>;

/// Characters left as-is in a `next` query value: unreserved plus `/`.
const NEXT_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Template name and context of a rendered page.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub template: &'static str,
    pub context: serde_json::Value,
}

/// Render `template` with `context` into a 200 HTML response.
pub fn render(
    templates: &Templates,
    template: &'static str,
    context: serde_json::Value,
) -> crate::Result<HttpResponse> {
    render_with_status(templates, StatusCode::OK, template, context)
}

/// Render `template` with `context` into an HTML response with `status`.
pub fn render_with_status(
    templates: &Templates,
    status: StatusCode,
    template: &'static str,
    context: serde_json::Value,
) -> crate::Result<HttpResponse> {
    let html = templates.render(template, &context)?;
    let mut response = Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(html)))
        .unwrap();
    response
        .extensions_mut()
        .insert(Rendered { template, context });
    Ok(response)
}

/// Build a 302 Found redirect.
pub fn redirect(location: &str) -> crate::Result<HttpResponse> {
    HeaderValue::from_str(location)
        .map_err(|_| crate::Error::BadRequest(format!("Invalid redirect location: {location}")))?;
    Ok(Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", location)
        .body(Full::new(Bytes::new()))
        .unwrap())
}

/// Location of the login page that returns to `next` afterwards.
pub fn login_location(login_url: &str, next: &str) -> String {
    format!("{login_url}?next={}", utf8_percent_encode(next, NEXT_PARAM))
}

/// Redirect an anonymous visitor to the login page.
pub fn login_redirect(login_url: &str, next: &str) -> HttpResponse {
    // Percent-encoding leaves only header-safe bytes in `next`
    Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", login_location(login_url, next))
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Whether `target` is a path on this site, so it is safe to redirect to.
pub fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
