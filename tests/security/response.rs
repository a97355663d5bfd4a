//! Response-layer security tests.
//!
//! Covers header injection through `Location` and the login `next` value.

use kiosk::response;

/// `redirect()` places its argument into the `Location` header after
/// validation; callers decide whether the target is local.
#[test]
fn redirect_allows_arbitrary_urls() {
    let resp = response::redirect("https://evil.com/phish").unwrap();
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://evil.com/phish");
}

/// When a `Location` value contains CRLF, `redirect()` returns an `Err`
/// instead of panicking.
#[test]
fn redirect_rejects_crlf_injection() {
    let result = response::redirect("https://evil.com\r\nX-Injected: true");
    assert!(
        result.is_err(),
        "Expected Err for CRLF injection in redirect location"
    );
}

/// The `next` value is percent-encoded, so a crafted path cannot break out
/// of the login URL's query string.
#[test]
fn login_redirect_encodes_next() {
    let resp = response::login_redirect("/auth/login/", "/notes/?a=1&next=//evil\r\n");
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(
        location,
        "/auth/login/?next=/notes/%3Fa%3D1%26next%3D//evil%0D%0A"
    );
}

/// Only same-site paths count as safe post-login targets.
#[test]
fn only_local_paths_are_safe_targets() {
    assert!(response::is_local_path("/notes/add/"));
    assert!(!response::is_local_path("//evil.example/"));
    assert!(!response::is_local_path("/\\evil.example/"));
    assert!(!response::is_local_path("https://evil.example/"));
    assert!(!response::is_local_path(""));
}
