//! Pull rate-limit probe
//!
//! The registry reports the remaining pull quota on a `HEAD` of a dedicated
//! manifest. A token for that manifest comes from the first rung of the
//! credential ladder that succeeds:
//!
//! 1. anonymous
//! 2. account password
//! 3. refresh token
//! 4. access token
//!
//! Rungs 2 to 4 use HTTP Basic `username:<secret>` and are skipped when their
//! secret is empty. The probe never needs a Hub session.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, StatusCode};

use super::auth::TokenResponse;
use super::client::HubClient;
use super::errors::{HubError, HubResult, classify};

/// Value reported for every numeric field when the registry sends no limits
pub const RATE_LIMIT_SENTINEL: i64 = -1;

pub const LIMIT_HEADER: &str = "ratelimit-limit";
pub const REMAINING_HEADER: &str = "ratelimit-remaining";
pub const SOURCE_HEADER: &str = "docker-ratelimit-source";

/// Pull quota reported by the registry
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimits {
    pub limit: i64,
    pub limit_window_secs: i64,
    pub remaining: i64,
    pub remaining_window_secs: i64,
    /// Entity the quota is accounted against, empty when not reported
    pub source: String,
}

impl RateLimits {
    fn unlimited(source: String) -> Self {
        Self {
            limit: RATE_LIMIT_SENTINEL,
            limit_window_secs: RATE_LIMIT_SENTINEL,
            remaining: RATE_LIMIT_SENTINEL,
            remaining_window_secs: RATE_LIMIT_SENTINEL,
            source,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == RATE_LIMIT_SENTINEL
    }
}

/// Secrets available to the credential ladder
#[derive(Clone, Default)]
pub struct LadderCredentials {
    pub username: String,
    pub password: String,
    pub refresh_token: String,
    pub access_token: String,
}

impl fmt::Debug for LadderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LadderCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rung {
    Anonymous,
    Password,
    RefreshToken,
    AccessToken,
}

impl Rung {
    const LADDER: [Rung; 4] = [
        Rung::Anonymous,
        Rung::Password,
        Rung::RefreshToken,
        Rung::AccessToken,
    ];

    /// Secret presented on this rung, `None` for anonymous requests
    fn secret<'a>(&self, credentials: &'a LadderCredentials) -> Option<&'a str> {
        match self {
            Rung::Anonymous => None,
            Rung::Password => Some(credentials.password.as_str()),
            Rung::RefreshToken => Some(credentials.refresh_token.as_str()),
            Rung::AccessToken => Some(credentials.access_token.as_str()),
        }
    }
}

/// Parse a `"<count>;w=<window-seconds>"` header value
pub fn parse_limit_header(value: &str) -> HubResult<(i64, i64)> {
    let bad = || HubError::RateLimitParse(value.to_string());

    let (count, window) = value.split_once(';').ok_or_else(bad)?;
    if window.contains(';') {
        return Err(bad());
    }
    let (_, window) = window.split_once('=').ok_or_else(bad)?;
    if window.contains('=') {
        return Err(bad());
    }

    let count = count.trim().parse().map_err(|_| bad())?;
    let window = window.trim().parse().map_err(|_| bad())?;
    Ok((count, window))
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn basic_auth(username: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, secret)))
}

impl HubClient {
    /// Read the current pull quota
    ///
    /// Missing headers yield [`RATE_LIMIT_SENTINEL`] values; malformed ones
    /// fail with a rate-limit parse error.
    pub async fn probe_rate_limits(&self, credentials: &LadderCredentials) -> HubResult<RateLimits> {
        let token = self.ladder_token(credentials).await?;

        let url = &self.instance().rate_limit_manifest_url;
        let request = self
            .request(Method::HEAD, url)
            .header(AUTHORIZATION, format!("Bearer {}", token));
        let response = self.send_raw(request).await?;
        let headers = response.headers();

        let limit = header_value(headers, LIMIT_HEADER);
        let remaining = header_value(headers, REMAINING_HEADER);
        let source = header_value(headers, SOURCE_HEADER);

        if limit.is_empty() || remaining.is_empty() {
            tracing::debug!("No rate-limit headers, reporting unlimited");
            return Ok(RateLimits::unlimited(source));
        }

        let (limit, limit_window_secs) = parse_limit_header(&limit)?;
        let (remaining, remaining_window_secs) = parse_limit_header(&remaining)?;
        Ok(RateLimits {
            limit,
            limit_window_secs,
            remaining,
            remaining_window_secs,
            source,
        })
    }

    async fn ladder_token(&self, credentials: &LadderCredentials) -> HubResult<String> {
        let mut last_error = None;

        for rung in Rung::LADDER {
            let secret = rung.secret(credentials);
            if secret.is_some_and(str::is_empty) {
                tracing::trace!("Skipping {:?} rung, no secret", rung);
                continue;
            }

            match self.registry_token(&credentials.username, secret).await {
                Ok(token) => {
                    tracing::debug!("Registry token obtained on {:?} rung", rung);
                    return Ok(token);
                }
                Err(e) => {
                    tracing::warn!("Registry token request failed on {:?} rung: {}", rung, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(HubError::Authentication))
    }

    async fn registry_token(&self, username: &str, secret: Option<&str>) -> HubResult<String> {
        let url = &self.instance().rate_limit_token_url;
        let mut request = self.request(Method::GET, url);
        if let Some(secret) = secret {
            request = request.header(AUTHORIZATION, basic_auth(username, secret));
        }

        let response = self.send_raw(request).await?;
        let status = response.status();
        let body = response.bytes().await?;
        if status != StatusCode::OK {
            return Err(classify(status, &body));
        }

        let token: TokenResponse = serde_json::from_slice(&body)?;
        Ok(token.token)
    }
}
