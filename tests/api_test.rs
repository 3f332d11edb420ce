//! Integration tests for the HTTP client against a mock backend.
//!
//! These tests cover:
//! - Bearer token handling and 401 sign-out
//! - Verse page decoding and malformed bodies
//! - List endpoints that answer bare or wrapped
//! - Conversation and message shapes

use std::sync::Arc;
use std::time::Duration;

use serenity::api::{ApiClient, ApiError};
use serenity::auth::{MemoryStore, TokenStore};
use serenity::feed::page_url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> (ApiClient, Arc<MemoryStore>) {
    let store = Arc::new(token.map_or_else(MemoryStore::new, MemoryStore::with_token));
    let api = ApiClient::new(&server.uri(), store.clone());
    (api, store)
}

fn verse_json(id: u64, verse: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "book": "Psalms",
        "chapter": 23,
        "verse": verse,
        "text": "The LORD is my shepherd; I shall not want.",
        "liked": false
    })
}

fn page_json(verses: Vec<serde_json::Value>, page: u32, pages: u32) -> serde_json::Value {
    serde_json::json!({
        "verses": verses,
        "pagination": {
            "page": page,
            "pages": pages,
            "next": if page < pages { Some(page + 1) } else { None },
            "count": 40,
            "items": 20,
            "last": pages
        }
    })
}

// ============================================================================
// Verse pages
// ============================================================================

#[tokio::test]
async fn test_verse_page_sends_bearer_and_page_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verses/search"))
        .and(query_param("category", "his_will"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![verse_json(1, 1)], 2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    let url = page_url(&format!("{}/verses/search?category=his_will", server.uri()), 2);
    let page = api.verse_page(&url).await.expect("page loads");

    assert_eq!(page.verses.len(), 1);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.next, None);
}

#[tokio::test]
async fn test_verse_page_without_pagination_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verses/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "verses": [verse_json(1, 1)]
        })))
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    let result = api
        .verse_page(&format!("{}/verses/search?category=peace&page=1", server.uri()))
        .await;

    assert!(matches!(result, Err(ApiError::Malformed(_))));
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verses/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (api, store) = client(&server, Some("stale"));
    let result = api
        .verse_page(&format!("{}/verses/search?category=peace&page=1", server.uri()))
        .await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_late_unauthorized_keeps_newer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/liked"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let (api, store) = client(&server, Some("old"));
    let sign_in_again = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.save("new").unwrap();
    };
    let (result, ()) = tokio::join!(api.liked(), sign_in_again);

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(store.load().unwrap().as_deref(), Some("new"));
}

#[tokio::test]
async fn test_server_error_keeps_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/liked"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "boom" })),
        )
        .mount(&server)
        .await;

    let (api, store) = client(&server, Some("keep"));
    let err = api.liked().await.unwrap_err();

    assert!(!err.is_unauthorized());
    assert_eq!(store.load().unwrap().as_deref(), Some("keep"));
}

#[tokio::test]
async fn test_toggle_like_posts_to_verse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verses/42/toggle_like"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "liked": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    api.toggle_verse_like(42).await.expect("toggle succeeds");
}

// ============================================================================
// Lists
// ============================================================================

#[tokio::test]
async fn test_liked_accepts_bare_and_wrapped_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/liked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([verse_json(1, 1)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/liked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "verses": [verse_json(1, 1), verse_json(2, 2)]
        })))
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    assert_eq!(api.liked().await.unwrap().len(), 1);
    assert_eq!(api.liked().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_by_address_sends_parts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verses/search_by_address"))
        .and(query_param("book", "1 John"))
        .and(query_param("chapter", "4"))
        .and(query_param("verse", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "verses": [verse_json(7, 8)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    let verses = api.search_by_address("1 John", 4, 8).await.unwrap();
    assert_eq!(verses.len(), 1);
}

#[tokio::test]
async fn test_search_by_id_accepts_single_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verses/search_by_id"))
        .and(query_param("id", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(verse_json(9, 3)))
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    let verses = api.search_by_id(9).await.unwrap();
    assert_eq!(verses[0].id, Some(9));
}

#[tokio::test]
async fn test_search_users_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/search"))
        .and(query_param("q", "ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "users": [{ "id": 3, "first_name": "Ruth", "last_name": "Moab" }]
        })))
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    let users = api.search_users("ru").await.unwrap();
    assert_eq!(users[0].display_name(), "Ruth Moab");
}

// ============================================================================
// Conversations
// ============================================================================

#[tokio::test]
async fn test_open_conversation_posts_other_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversation/new"))
        .and(body_json(serde_json::json!({ "other_user_id": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 11,
            "other_user": { "id": 3, "username": "ruth" },
            "messages": [{
                "id": 1,
                "body": "Hello",
                "sender_id": 3,
                "created_at": "2024-05-01T10:00:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    let thread = api.open_conversation(3).await.unwrap();
    assert_eq!(thread.id, 11);
    assert_eq!(thread.messages.len(), 1);
}

#[tokio::test]
async fn test_send_message_reads_wrapped_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversations/11/messages"))
        .and(body_json(serde_json::json!({ "body": "Peace be with you" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "message": {
                "id": 5,
                "body": "Peace be with you",
                "sender_id": 1,
                "created_at": "2024-05-01T10:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    let message = api.send_message(11, "Peace be with you").await.unwrap();
    assert_eq!(message.id, 5);
}

#[tokio::test]
async fn test_conversations_empty_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/conversations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "conversations": null })),
        )
        .mount(&server)
        .await;

    let (api, _) = client(&server, Some("secret"));
    assert!(api.conversations().await.unwrap().is_empty());
}
