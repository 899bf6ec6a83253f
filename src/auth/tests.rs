//! Tests for the auth module

use super::*;
use base64::Engine;

#[test]
fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();
    let req = auth.apply(client.get("https://example.com/api"));

    let built = req.build().unwrap();
    assert!(built.headers().get("Authorization").is_none());
    assert!(auth.authorization_header().is_none());
}

#[test]
fn test_basic_auth_header() {
    let auth = Authenticator::new(AuthConfig::basic("station-key", "s3cret"));

    let client = reqwest::Client::new();
    let req = auth.apply(client.get("https://example.com/api"));
    let built = req.build().unwrap();

    let header = built
        .headers()
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(header.starts_with("Basic "));

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(&header[6..])
        .unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "station-key:s3cret");
}

#[test]
fn test_basic_auth_matches_reqwest() {
    let auth = Authenticator::new(AuthConfig::basic("user", "pass"));
    let client = reqwest::Client::new();

    let ours = auth.apply(client.get("https://example.com")).build().unwrap();
    let theirs = client
        .get("https://example.com")
        .basic_auth("user", Some("pass"))
        .build()
        .unwrap();

    assert_eq!(
        ours.headers().get("Authorization"),
        theirs.headers().get("Authorization")
    );
}

#[test]
fn test_debug_hides_secret() {
    let config = AuthConfig::basic("key", "top-secret");
    let debug = format!("{config:?}");
    assert!(debug.contains("key"));
    assert!(!debug.contains("top-secret"));
}
