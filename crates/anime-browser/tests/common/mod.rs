//! Shared helpers for integration tests against a mock Jikan server.

#![allow(dead_code)]

use anime_browser::JikanClient;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use shared::ApiConfig;
use std::sync::Arc;

/// Starts a mock HTTP server
pub async fn setup_mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Client pointed at the mock server with a short pacing interval
pub fn client_for(server: &ServerGuard, min_interval_ms: u64) -> Arc<JikanClient> {
    let config = ApiConfig {
        base_url: server.url(),
        min_interval_ms,
        timeout_seconds: 5,
        ..Default::default()
    };
    Arc::new(JikanClient::new(&config).expect("client"))
}

/// Jikan-shaped list payload
pub fn list_body(ids: &[u32], last_visible_page: u32) -> String {
    let data: Vec<Value> = ids
        .iter()
        .map(|id| json!({"mal_id": id, "title": format!("Anime {}", id), "type": "TV"}))
        .collect();
    json!({
        "data": data,
        "pagination": {
            "last_visible_page": last_visible_page,
            "has_next_page": last_visible_page > 1,
            "current_page": 1
        }
    })
    .to_string()
}

/// Jikan-shaped detail payload
pub fn detail_body(id: u32, title: &str) -> String {
    json!({"data": {"mal_id": id, "title": title, "episodes": 12, "score": 7.5}}).to_string()
}

/// Jikan-shaped error payload
pub fn error_body(status: u16, message: &str) -> String {
    json!({
        "status": status,
        "type": "BadResponseException",
        "message": message,
        "error": null
    })
    .to_string()
}

fn query_matcher(params: &[(&str, &str)]) -> Matcher {
    Matcher::AllOf(
        params
            .iter()
            .map(|(key, value)| Matcher::UrlEncoded(key.to_string(), value.to_string()))
            .collect(),
    )
}

/// Mock `/anime?q=...` for one query and page
pub async fn mock_search(
    server: &mut ServerGuard,
    query: &str,
    page: &str,
    status: usize,
    body: String,
) -> Mock {
    server
        .mock("GET", "/anime")
        .match_query(query_matcher(&[
            ("q", query),
            ("page", page),
            ("sfw", "true"),
            ("limit", "24"),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Mock `/top/anime` for one page
pub async fn mock_top(server: &mut ServerGuard, page: &str, status: usize, body: String) -> Mock {
    server
        .mock("GET", "/top/anime")
        .match_query(query_matcher(&[("page", page), ("limit", "24")]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Mock `/anime/{id}`
pub async fn mock_detail(server: &mut ServerGuard, id: u32, status: usize, body: String) -> Mock {
    server
        .mock("GET", format!("/anime/{}", id).as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}
