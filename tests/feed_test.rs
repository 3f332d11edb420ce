//! Integration tests for driving a verse feed against a mock backend.

use std::sync::Arc;

use serenity::api::ApiClient;
use serenity::auth::MemoryStore;
use serenity::feed::{Feed, FeedPhase, LikeOutcome, LoadOutcome, load_pages};
use serenity::models::Category;
use serenity::VerseSource;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(first_id: u64, count: u64, page: u32, pages: u32) -> serde_json::Value {
    let verses: Vec<_> = (first_id..first_id + count)
        .map(|id| {
            serde_json::json!({
                "id": id,
                "book": "Isaiah",
                "chapter": 41,
                "verse": id,
                "text": "Fear thou not; for I am with thee.",
                "liked": false
            })
        })
        .collect();
    serde_json::json!({
        "verses": verses,
        "pagination": {
            "page": page,
            "pages": pages,
            "next": if page < pages { Some(page + 1) } else { None },
            "count": count * u64::from(pages)
        }
    })
}

async fn mount_page(server: &MockServer, number: u32, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/verses/search"))
        .and(query_param("category", "anxiety"))
        .and(query_param("page", number.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn api(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Arc::new(MemoryStore::with_token("secret")))
}

#[tokio::test]
async fn test_load_pages_appends_until_limit() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page(1, 5, 1, 3)).await;
    mount_page(&server, 2, page(6, 5, 2, 3)).await;
    mount_page(&server, 3, page(11, 5, 3, 3)).await;

    let api = api(&server);
    let mut feed = Feed::new(0);
    let url = Category::new("anxiety").search_url(&server.uri());

    let outcomes = load_pages(&mut feed, &api, &url, 2).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(feed.verses().len(), 10);
    assert_eq!(feed.current_page(), 2);
    assert_eq!(feed.phase(), FeedPhase::Loaded);
}

#[tokio::test]
async fn test_load_pages_stops_at_last_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page(1, 3, 1, 1)).await;

    let api = api(&server);
    let mut feed = Feed::new(0);
    let url = Category::new("anxiety").search_url(&server.uri());

    let outcomes = load_pages(&mut feed, &api, &url, 5).await;

    assert_eq!(outcomes, vec![LoadOutcome::Applied { added: 3 }]);
    assert_eq!(feed.verses().len(), 3);
}

#[tokio::test]
async fn test_failed_page_keeps_list() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page(1, 3, 1, 2)).await;
    Mock::given(method("GET"))
        .and(path("/verses/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = api(&server);
    let mut feed = Feed::new(0);
    let url = Category::new("anxiety").search_url(&server.uri());

    let outcomes = load_pages(&mut feed, &api, &url, 2).await;

    assert!(matches!(
        outcomes.last(),
        Some(LoadOutcome::Failed { consecutive_failures: 1 })
    ));
    assert_eq!(feed.verses().len(), 3);
    assert!(!feed.is_loading());
}

#[tokio::test]
async fn test_rejected_like_rolls_back() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page(1, 3, 1, 1)).await;
    Mock::given(method("POST"))
        .and(path("/verses/2/toggle_like"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api(&server);
    let mut feed = Feed::new(0);
    let url = Category::new("anxiety").search_url(&server.uri());
    load_pages(&mut feed, &api, &url, 1).await;

    let request = feed.toggle_like(1).expect("verse has an id");
    assert!(feed.verses()[1].liked);

    let result = api.toggle_like(request.verse_id).await;
    let outcome = feed.complete_like(&request, result);

    assert_eq!(outcome, LikeOutcome::RolledBack { index: 1 });
    assert!(!feed.verses()[1].liked);
}
