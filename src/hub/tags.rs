//! Repository tags

use super::client::{HubClient, segment};
use super::errors::HubResult;
use super::model::tag::{Tag, TagRecord};
use super::pagination::Listing;
use super::repositories::{REPOSITORIES_PATH, repository_path};

fn tags_path(repository: &str) -> String {
    format!("{}{}/tags/", REPOSITORIES_PATH, repository)
}

impl HubClient {
    /// Tags of a repository
    ///
    /// `ordering` is passed to the server untouched (`name`, `-last_updated`, ...).
    /// Tag names are reported as `repository:tag` using the reference given by
    /// the caller.
    pub async fn get_tags(
        &self,
        repository: &str,
        ordering: Option<&str>,
        exhaustive: bool,
    ) -> HubResult<Listing<Tag>> {
        let path = tags_path(&repository_path(repository));
        let extra: Vec<(&str, &str)> = ordering.map(|o| ("ordering", o)).into_iter().collect();
        let url = self.first_page_url(&path, &extra)?;

        let listing: Listing<TagRecord> = self.fetch_all(&url, exhaustive).await?;
        Ok(listing.map(|record| record.into_tag(repository)))
    }

    pub async fn remove_tag(&self, repository: &str, tag: &str) -> HubResult<()> {
        let path = format!("{}{}/", tags_path(&repository_path(repository)), segment(tag));
        tracing::info!("Removing tag {}:{}", repository, tag);
        self.delete(&self.url(&path)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::hub::auth::Session;
    use crate::hub::test_support::MockHub;
    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, Query, RawQuery};
    use axum::http::StatusCode;
    use axum::routing::{delete, get};
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_get_tags_normalises_path_and_names_tags() {
        let router = Router::new().route(
            "/v2/repositories/{namespace}/{name}/tags/",
            get(
                |Path((namespace, name)): Path<(String, String)>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    assert_eq!(namespace, "library");
                    assert_eq!(name, "nginx");
                    assert_eq!(query.get("ordering").map(String::as_str), Some("-name"));
                    Json(json!({
                        "count": 3,
                        "next": null,
                        "results": [
                            {"name": "latest", "full_size": 10, "images": [
                                {"digest": "sha256:1", "architecture": "amd64", "os": "linux", "size": 10}
                            ]},
                            {"name": "1.25", "full_size": 12, "images": null}
                        ]
                    }))
                },
            ),
        );
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let listing = client.get_tags("nginx", Some("-name"), false).await.unwrap();
        let names: Vec<&str> = listing.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["nginx:latest", "nginx:1.25"]);
        assert!(listing.is_partial());
        assert_eq!(listing.items[0].images[0].architecture, "amd64");
        assert!(listing.items[1].images.is_empty());
    }

    #[tokio::test]
    async fn test_get_tags_without_ordering() {
        let router = Router::new().route(
            "/v2/repositories/{namespace}/{name}/tags/",
            get(|RawQuery(query): RawQuery| async move {
                assert_eq!(query.as_deref(), Some("page_size=100&page=1"));
                Json(json!({"count": 0, "results": []}))
            }),
        );
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let listing = client.get_tags("acme/app:v1", None, true).await.unwrap();
        assert!(listing.items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_tag() {
        let router = Router::new().route(
            "/v2/repositories/{namespace}/{name}/tags/{tag}/",
            delete(|Path((_, _, tag)): Path<(String, String, String)>| async move {
                if tag == "v1" {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::FORBIDDEN
                }
            }),
        );
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        client.remove_tag("acme/app", "v1").await.unwrap();
        assert!(client.remove_tag("acme/app", "v2").await.unwrap_err().is_forbidden());
    }
}
