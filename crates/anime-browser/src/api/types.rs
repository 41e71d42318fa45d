//! Jikan API v4 response types.
//!
//! Only the envelope is modelled in detail. Anime records are passed through
//! untouched as [`Item`]s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Paginated list envelope (`/anime`, `/top/anime`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<Item>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Single record envelope (`/anime/{id}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub data: Item,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub last_visible_page: u32,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub current_page: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            last_visible_page: 1,
            has_next_page: false,
            current_page: None,
        }
    }
}

/// Error body returned by Jikan alongside non-2xx statuses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One anime record, kept exactly as the upstream API sent it
///
/// Equality only looks at `mal_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub mal_id: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.mal_id == other.mal_id
    }
}

impl Eq for Item {}

impl Item {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn title_english(&self) -> Option<&str> {
        self.str_field("title_english")
    }

    pub fn anime_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.str_field("synopsis")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn score(&self) -> Option<f64> {
        self.fields.get("score").and_then(Value::as_f64)
    }

    pub fn episodes(&self) -> Option<u64> {
        self.fields.get("episodes").and_then(Value::as_u64)
    }

    pub fn year(&self) -> Option<u64> {
        self.fields.get("year").and_then(Value::as_u64)
    }

    /// Genre names in upstream order
    pub fn genres(&self) -> Vec<&str> {
        self.fields
            .get("genres")
            .and_then(Value::as_array)
            .map(|genres| {
                genres
                    .iter()
                    .filter_map(|genre| genre.get("name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Large JPEG poster, used by the featured strip
    pub fn image_url(&self) -> Option<&str> {
        self.fields
            .get("images")
            .and_then(|images| images.get("jpg"))
            .and_then(|jpg| jpg.get("large_image_url"))
            .and_then(Value::as_str)
    }
}

/// One page of list results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Always at least 1
    pub total_pages: u32,
}

impl From<ListResponse> for Page {
    fn from(response: ListResponse) -> Self {
        Self {
            items: response.data,
            total_pages: response.pagination.last_visible_page.max(1),
        }
    }
}

/// Which list to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMode {
    /// Keyword search; subject to single-flight cancellation
    Search { query: String, page: u32 },
    /// Top anime ranking
    TopList { page: u32 },
}

impl ListMode {
    pub fn search(query: impl Into<String>, page: u32) -> Self {
        ListMode::Search {
            query: query.into(),
            page,
        }
    }

    pub fn top(page: u32) -> Self {
        ListMode::TopList { page }
    }

    pub fn page(&self) -> u32 {
        match self {
            ListMode::Search { page, .. } | ListMode::TopList { page } => *page,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, ListMode::Search { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_passes_fields_through() {
        let raw = json!({
            "mal_id": 20,
            "title": "Naruto",
            "type": "TV",
            "episodes": 220,
            "score": 8.0,
            "genres": [{"mal_id": 1, "name": "Action"}, {"mal_id": 2, "name": "Adventure"}],
            "images": {"jpg": {"large_image_url": "https://cdn.example/naruto.jpg"}}
        });

        let item: Item = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.mal_id, 20);
        assert_eq!(item.title(), Some("Naruto"));
        assert_eq!(item.anime_type(), Some("TV"));
        assert_eq!(item.episodes(), Some(220));
        assert_eq!(item.score(), Some(8.0));
        assert_eq!(item.genres(), vec!["Action", "Adventure"]);
        assert_eq!(item.image_url(), Some("https://cdn.example/naruto.jpg"));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn test_item_equality_uses_id_only() {
        let a: Item = serde_json::from_value(json!({"mal_id": 1, "title": "A"})).unwrap();
        let b: Item = serde_json::from_value(json!({"mal_id": 1, "title": "renamed"})).unwrap();
        let c: Item = serde_json::from_value(json!({"mal_id": 2, "title": "A"})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let item: Item =
            serde_json::from_value(json!({"mal_id": 5, "episodes": null, "score": null})).unwrap();
        assert_eq!(item.episodes(), None);
        assert_eq!(item.score(), None);
        assert!(item.genres().is_empty());
    }

    #[test]
    fn test_page_from_list_response() {
        let response: ListResponse = serde_json::from_value(json!({
            "data": [{"mal_id": 1}, {"mal_id": 2}],
            "pagination": {"last_visible_page": 3, "has_next_page": true, "current_page": 1}
        }))
        .unwrap();

        let page = Page::from(response);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].mal_id, 1);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_empty_results_still_have_one_page() {
        let response: ListResponse = serde_json::from_value(json!({
            "data": [],
            "pagination": {"last_visible_page": 0, "has_next_page": false}
        }))
        .unwrap();
        assert_eq!(Page::from(response).total_pages, 1);

        let response: ListResponse = serde_json::from_value(json!({"data": []})).unwrap();
        assert_eq!(Page::from(response).total_pages, 1);
    }

    #[test]
    fn test_error_body() {
        let body: UpstreamErrorBody = serde_json::from_value(json!({
            "status": 404,
            "type": "BadResponseException",
            "message": "Resource does not exist",
            "error": "404 on https://myanimelist.net/anime/99999999/"
        }))
        .unwrap();
        assert_eq!(body.status, Some(404));
        assert_eq!(body.message.as_deref(), Some("Resource does not exist"));
    }

    #[test]
    fn test_list_mode_page() {
        assert_eq!(ListMode::search("bleach", 4).page(), 4);
        assert_eq!(ListMode::top(2).page(), 2);
        assert!(ListMode::search("x", 1).is_search());
        assert!(!ListMode::top(1).is_search());
    }
}
