//! Integration tests for sign in, sign up, sign out and password reset.
//!
//! The token is persisted in an encrypted file inside a temporary directory.

use std::sync::Arc;

use serenity::api::{ApiClient, ApiError};
use serenity::auth::{EncryptedFileStore, Session, TokenStore};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(server: &MockServer, dir: &TempDir) -> (Session, Arc<EncryptedFileStore>) {
    let store = Arc::new(EncryptedFileStore::at(dir.path().join("session.enc")));
    let api = ApiClient::new(&server.uri(), store.clone());
    (Session::new(api), store)
}

fn auth_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "user": { "id": 1, "email": "mary@example.com", "first_name": "Mary" }
    })
}

#[tokio::test]
async fn test_login_persists_token_and_lowercases_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "mary@example.com",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("abc")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (session, store) = session(&server, &dir);

    let user = session.login("  Mary@Example.com ", "secret1").await.unwrap();

    assert_eq!(user.and_then(|u| u.first_name).as_deref(), Some("Mary"));
    assert!(session.is_signed_in());
    assert_eq!(store.load().unwrap().as_deref(), Some("abc"));

    // A fresh store over the same file sees the token
    let reopened = EncryptedFileStore::at(dir.path().join("session.enc"));
    assert_eq!(reopened.load().unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_login_rejected_keeps_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "Invalid email or password"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (session, _) = session(&server, &dir);

    let err = session.login("mary@example.com", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Status { .. }));
    assert!(err.user_message().contains("Invalid email or password"));
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_signup_sends_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(serde_json::json!({
            "email": "new@example.com",
            "password": "secret1",
            "password_confirmation": "secret1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_body("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (session, store) = session(&server, &dir);

    session.signup("new@example.com", "secret1", "secret1").await.unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_logout_clears_token_even_when_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (session, store) = session(&server, &dir);
    store.save("abc").unwrap();

    session.logout().await.unwrap();

    assert!(!session.is_signed_in());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_refresh_with_rejected_token_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (session, store) = session(&server, &dir);
    store.save("old").unwrap();

    let err = session.refresh().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_password_reset_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/password"))
        .and(body_json(serde_json::json!({ "email": "mary@example.com" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/password/verify"))
        .and(body_json(serde_json::json!({ "email": "mary@example.com", "code": "123456" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth/password"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (session, _) = session(&server, &dir);
    let api = session.api();

    api.request_password_reset("mary@example.com").await.unwrap();
    api.verify_reset_code("mary@example.com", " 123456 ").await.unwrap();
    api.reset_password("mary@example.com", "123456", "newpass", "newpass")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_reset_code_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/password/verify"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "error": "Invalid code"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (session, _) = session(&server, &dir);

    let err = session
        .api()
        .verify_reset_code("mary@example.com", "000000")
        .await
        .unwrap_err();
    assert!(err.user_message().contains("Invalid code"));
}
