//! Personal access tokens

use reqwest::Method;
use uuid::Uuid;

use super::client::HubClient;
use super::errors::HubResult;
use super::model::token::{AccessToken, TokenRequest};
use super::pagination::Listing;

/// Personal access tokens endpoint
pub const TOKENS_PATH: &str = "/v2/api_tokens";

fn token_path(uuid: &Uuid) -> String {
    format!("{}/{}", TOKENS_PATH, uuid)
}

impl HubClient {
    /// Create a token; the returned value is the only one carrying the secret
    pub async fn create_token(&self, description: &str) -> HubResult<AccessToken> {
        let url = self.url(TOKENS_PATH);
        let request = TokenRequest {
            description,
            is_active: true,
        };
        let token: AccessToken = self.send_json(Method::POST, &url, &request).await?;
        tracing::info!("Created access token {}", token.uuid);
        Ok(token)
    }

    pub async fn get_tokens(&self, exhaustive: bool) -> HubResult<Listing<AccessToken>> {
        let url = self.first_page_url(TOKENS_PATH, &[])?;
        self.fetch_all(&url, exhaustive).await
    }

    pub async fn get_token(&self, uuid: &Uuid) -> HubResult<AccessToken> {
        self.get_json(&self.url(&token_path(uuid))).await
    }

    /// Update the activation state, and the description when non-empty
    pub async fn update_token(&self, uuid: &Uuid, description: &str, is_active: bool) -> HubResult<AccessToken> {
        let request = TokenRequest {
            description,
            is_active,
        };
        self.send_json(Method::PATCH, &self.url(&token_path(uuid)), &request)
            .await
    }

    pub async fn remove_token(&self, uuid: &Uuid) -> HubResult<()> {
        tracing::info!("Removing access token {}", uuid);
        self.delete(&self.url(&token_path(uuid))).await
    }
}

#[cfg(test)]
mod tests {
    use crate::hub::auth::Session;
    use crate::hub::test_support::MockHub;
    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use serde_json::{Value, json};
    use uuid::Uuid;

    const UUID: &str = "8208674e-d08a-426f-b6f4-e3aba7058459";

    fn token_json(label: &str, active: bool, secret: Option<&str>) -> Value {
        json!({
            "uuid": UUID,
            "client_id": "HUB",
            "token_label": label,
            "is_active": active,
            "token": secret.unwrap_or(""),
            "scopes": []
        })
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/v2/api_tokens",
                post(|Json(body): Json<Value>| async move {
                    let label = body["token_label"].as_str().unwrap_or_default().to_string();
                    (
                        StatusCode::CREATED,
                        Json(token_json(&label, true, Some("dckr_pat_secret"))),
                    )
                })
                .get(|| async {
                    Json(json!({
                        "count": 1,
                        "next": null,
                        "results": [token_json("ci", true, None)]
                    }))
                }),
            )
            .route(
                "/v2/api_tokens/{uuid}",
                get(|Path(uuid): Path<String>| async move {
                    if uuid == UUID {
                        Json(token_json("ci", true, None)).into_response()
                    } else {
                        StatusCode::NOT_FOUND.into_response()
                    }
                })
                .patch(|Json(body): Json<Value>| async move {
                    let label = body
                        .get("token_label")
                        .and_then(|l| l.as_str())
                        .unwrap_or("unchanged")
                        .to_string();
                    let active = body["is_active"].as_bool().unwrap_or(true);
                    Json(token_json(&label, active, None))
                })
                .delete(|| async { StatusCode::ACCEPTED }),
            )
    }

    #[tokio::test]
    async fn test_create_returns_secret_once() {
        let hub = MockHub::start(router()).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let mut token = client.create_token("ci").await.unwrap();
        assert_eq!(token.description, "ci");
        assert_eq!(token.take_secret().as_deref(), Some("dckr_pat_secret"));

        let listed = client.get_tokens(true).await.unwrap();
        assert_eq!(listed.total, 1);
        assert!(listed.items[0].secret.as_deref().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_get_update_and_remove() {
        let hub = MockHub::start(router()).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));
        let uuid = Uuid::parse_str(UUID).unwrap();

        assert!(client.get_token(&uuid).await.unwrap().is_active);
        assert!(client.get_token(&Uuid::nil()).await.unwrap_err().is_not_found());

        let updated = client.update_token(&uuid, "", false).await.unwrap();
        assert_eq!(updated.description, "unchanged");
        assert!(!updated.is_active);

        let updated = client.update_token(&uuid, "renamed", true).await.unwrap();
        assert_eq!(updated.description, "renamed");

        client.remove_token(&uuid).await.unwrap();
    }
}
