//! Paginated list endpoints
//!
//! Every list endpoint answers with the same `{count, next, previous, results}`
//! envelope. `next` and `previous` are opaque links: they are followed, never
//! parsed. Only `next` is ever followed, strictly one page after the other.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::client::HubClient;
use super::errors::HubResult;

/// Page envelope of a list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub count: usize,
    #[serde(default, deserialize_with = "non_empty_link")]
    pub next: Option<String>,
    #[serde(default, deserialize_with = "non_empty_link")]
    pub previous: Option<String>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub results: Vec<T>,
}

/// Items gathered from one or more pages, with the server side total
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// `count` reported by the first page
    pub total: usize,
}

impl<T> Listing<T> {
    /// More items exist on the server than were fetched
    pub fn is_partial(&self) -> bool {
        self.items.len() < self.total
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

fn non_empty_link<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let link: Option<String> = Option::deserialize(deserializer)?;
    Ok(link.filter(|l| !l.is_empty()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let results: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(results.unwrap_or_default())
}

impl HubClient {
    /// URL of the first page of a list endpoint
    ///
    /// `extra` query parameters (ordering, filters) are passed through as is.
    pub(crate) fn first_page_url(&self, path: &str, extra: &[(&str, &str)]) -> HubResult<String> {
        let page_size = self.page_size().to_string();
        let mut query = vec![("page_size", page_size.as_str()), ("page", "1")];
        query.extend_from_slice(extra);
        self.url_with_query(path, &query)
    }

    /// Fetch a single page
    pub async fn fetch_page<T: DeserializeOwned>(&self, url: &str) -> HubResult<Page<T>> {
        self.get_json(url).await
    }

    /// Fetch the first page, and every following page when `exhaustive` is set
    ///
    /// Items keep server order, page after page. `total` is always the `count`
    /// of the first page so callers can report a partial listing.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        first_url: &str,
        exhaustive: bool,
    ) -> HubResult<Listing<T>> {
        let first: Page<T> = self.fetch_page(first_url).await?;
        let total = first.count;
        let mut items = first.results;

        if exhaustive {
            let mut next = first.next;
            while let Some(url) = next {
                let page: Page<T> = self.fetch_page(&url).await?;
                items.extend(page.results);
                next = page.next;
            }
        }

        tracing::debug!("Fetched {}/{} items", items.len(), total);
        Ok(Listing { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::auth::Session;
    use crate::hub::test_support::MockHub;
    use axum::Json;
    use axum::Router;
    use axum::extract::Query;
    use axum::routing::get;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Serves `total` numbered items, `per_page` at a time, recording each page hit
    fn numbered_pages(total: usize, per_page: usize, hits: Arc<Mutex<Vec<usize>>>) -> impl FnOnce(String) -> Router {
        move |base: String| {
            Router::new().route(
                "/v2/items/",
                get(move |Query(query): Query<HashMap<String, String>>| {
                    let hits = hits.clone();
                    let base = base.clone();
                    async move {
                        let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
                        hits.lock().unwrap().push(page);
                        let start = (page - 1) * per_page;
                        let end = (start + per_page).min(total);
                        let results: Vec<Value> = (start..end).map(|i| json!({"id": i})).collect();
                        let next = if end < total {
                            Value::String(format!("{}/v2/items/?page={}", base, page + 1))
                        } else {
                            Value::Null
                        };
                        let previous = if page > 1 {
                            Value::String(format!("{}/v2/items/?page={}", base, page - 1))
                        } else {
                            Value::Null
                        };
                        Json(json!({
                            "count": total,
                            "next": next,
                            "previous": previous,
                            "results": results
                        }))
                    }
                }),
            )
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: usize,
    }

    #[tokio::test]
    async fn test_fetch_all_exhaustive_follows_next_in_order() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let hub = MockHub::start_with(numbered_pages(7, 3, hits.clone())).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let url = client.first_page_url("/v2/items/", &[]).unwrap();
        let listing: Listing<Item> = client.fetch_all(&url, true).await.unwrap();

        assert_eq!(listing.total, 7);
        let ids: Vec<usize> = listing.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(!listing.is_partial());
        assert_eq!(*hits.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_all_partial_returns_first_page_and_count() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let hub = MockHub::start_with(numbered_pages(250, 100, hits.clone())).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let url = client.first_page_url("/v2/items/", &[]).unwrap();
        let listing: Listing<Item> = client.fetch_all(&url, false).await.unwrap();

        assert_eq!(listing.items.len(), 100);
        assert_eq!(listing.total, 250);
        assert!(listing.is_partial());
        assert_eq!(*hits.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_fetch_all_surfaces_page_errors() {
        let router = Router::new().route(
            "/v2/items/",
            get(|| async { (axum::http::StatusCode::NOT_FOUND, "{}") }),
        );
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let url = client.first_page_url("/v2/items/", &[]).unwrap();
        let err = client.fetch_all::<Item>(&url, true).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_first_page_url_passes_extra_params_through() {
        let client = crate::hub::test_support::client_for("http://127.0.0.1:1");
        let url = client
            .first_page_url("/v2/repositories/library/tags/", &[("ordering", "-last_updated")])
            .unwrap();
        assert_eq!(
            url,
            "http://127.0.0.1:1/v2/repositories/library/tags/?page_size=100&page=1&ordering=-last_updated"
        );
    }

    #[test]
    fn test_envelope_tolerates_missing_and_empty_fields() {
        let page: Page<Item> = serde_json::from_str(r#"{"count":0,"next":"","results":null}"#).unwrap();
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
        assert!(page.results.is_empty());

        let page: Page<Item> = serde_json::from_str(r#"{"count":1}"#).unwrap();
        assert_eq!(page.count, 1);
        assert!(page.results.is_empty());
    }
}
