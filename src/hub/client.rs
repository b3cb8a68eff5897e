//! Hub API client
//!
//! Wraps a shared `reqwest::Client` with the Hub endpoints and the bearer token
//! of the current session. All requests carry the same JSON headers and
//! `User-Agent`; every non-2xx response goes through [`classify`].

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::auth::Session;
use super::errors::{HubError, HubResult, classify};
use crate::model::config::Instance;

/// User-Agent sent with every request
pub const HUB_USER_AGENT: &str = concat!("hub-rs/", env!("CARGO_PKG_VERSION"));

/// Client for the Hub REST API
///
/// Cheap to clone. A client is bound to at most one [`Session`]; a new session
/// yields a new client value through [`HubClient::with_session`].
#[derive(Debug, Clone)]
pub struct HubClient {
    http: Client,
    instance: Instance,
    session: Option<Session>,
}

impl HubClient {
    /// Create an unauthenticated client
    pub fn new(http: Client, instance: Instance) -> Self {
        Self {
            http,
            instance,
            session: None,
        }
    }

    /// Return a copy of this client bound to `session`
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            http: self.http.clone(),
            instance: self.instance.clone(),
            session: Some(session),
        }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub(crate) fn page_size(&self) -> usize {
        self.instance.page_size
    }

    /// Account name of the current session
    pub(crate) fn account(&self) -> HubResult<&str> {
        self.session
            .as_ref()
            .map(|s| s.username())
            .ok_or(HubError::Authentication)
    }

    /// Bearer token of the current session
    ///
    /// Fails locally with [`HubError::Authentication`] before any request is made.
    pub(crate) fn bearer(&self) -> HubResult<&str> {
        self.session
            .as_ref()
            .map(|s| s.access_token())
            .filter(|t| !t.is_empty())
            .ok_or(HubError::Authentication)
    }

    /// Absolute URL for an API path
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.instance.api_base_url, path)
    }

    /// Absolute URL with query parameters appended
    pub(crate) fn url_with_query(&self, path: &str, query: &[(&str, &str)]) -> HubResult<String> {
        let url = self.url(path);
        let mut parsed = Url::parse(&url).map_err(|e| HubError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !query.is_empty() {
            let mut pairs = parsed.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(parsed.to_string())
    }

    /// Request builder with the common Hub headers
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, HUB_USER_AGENT)
    }

    /// Request builder carrying the session bearer token
    pub(crate) fn authed(&self, method: Method, url: &str) -> HubResult<RequestBuilder> {
        let token = self.bearer()?;
        Ok(self
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", token)))
    }

    /// Send a request without inspecting the status
    pub(crate) async fn send_raw(&self, request: RequestBuilder) -> HubResult<Response> {
        let request = request.build()?;
        tracing::debug!("HTTP {} on: {}", request.method(), request.url());
        let response = self.http.execute(request).await?;
        tracing::trace!("HTTP response status: {}", response.status());
        Ok(response)
    }

    /// Send a request and return the body of a 2xx response
    pub(crate) async fn send(&self, request: RequestBuilder) -> HubResult<Vec<u8>> {
        let response = self.send_raw(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::debug!(
                "bad status code {}: {}",
                status,
                String::from_utf8_lossy(&body)
            );
            return Err(classify(status, &body));
        }

        tracing::trace!("HTTP response body: {}", String::from_utf8_lossy(&body));
        Ok(body.to_vec())
    }

    /// Authenticated GET decoded from JSON
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> HubResult<T> {
        let body = self.send(self.authed(Method::GET, url)?).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Authenticated request with a JSON body, response decoded from JSON
    pub(crate) async fn send_json<B, T>(&self, method: Method, url: &str, payload: &B) -> HubResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .send(self.authed(method, url)?.json(payload))
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Authenticated DELETE
    pub(crate) async fn delete(&self, url: &str) -> HubResult<()> {
        self.send(self.authed(Method::DELETE, url)?).await?;
        Ok(())
    }
}

/// Encode a single path segment (account, repository, team name)
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
