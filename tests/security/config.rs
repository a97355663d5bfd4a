//! Configuration security tests.
//!
//! Verifies secret handling across config layers and that the secret stays
//! out of debug output.

use kiosk::config::{Auth, Loader};

/// The config loader strips `jwt_secret` from TOML files before applying
/// environment and CLI overrides.
#[test]
fn jwt_secret_stripped_from_config_file() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[auth]
jwt_secret = "should_be_stripped"
token_expiry_days = 7
"#
    )
    .unwrap();

    let loader = Loader::new("CFGTEST");
    let config = loader
        .load(Some(file.path()), None, None, None, Some("cli_override_secret"))
        .unwrap();
    assert_eq!(
        config.auth.jwt_secret, "cli_override_secret",
        "CLI secret must override file secret"
    );
    assert_eq!(config.auth.token_expiry_days, 7);
}

/// A secret only present in the config file is not enough to start.
#[test]
fn file_secret_alone_is_rejected() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[auth]\njwt_secret = \"file_only_secret\"").unwrap();

    let loader = Loader::new("CFGFILEONLY");
    assert!(loader.load(Some(file.path()), None, None, None, None).is_err());
}

/// Logging a `Config` or `Auth` value must not reveal the signing key.
#[test]
fn debug_output_redacts_jwt_secret() {
    let auth = Auth {
        jwt_secret: "SUPER_SECRET_VALUE".to_string(),
        ..Default::default()
    };
    let config = kiosk::Config {
        auth: auth.clone(),
        ..Default::default()
    };

    for debug_output in [format!("{auth:?}"), format!("{config:?}")] {
        assert!(
            !debug_output.contains("SUPER_SECRET_VALUE"),
            "Debug output leaks the JWT secret: {debug_output}"
        );
        assert!(debug_output.contains("[redacted]"));
        assert!(debug_output.contains("login_url"));
    }
}
