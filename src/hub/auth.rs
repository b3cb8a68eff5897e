//! Hub login and session handling
//!
//! Password login, optional second factor challenge, and local expiry checks
//! of the resulting JWT bearer token.
//!
//! Login state machine:
//! `Unauthenticated -> Submitted -> {Authenticated | TwoFactorRequired | Failed}`,
//! then `TwoFactorRequired -> CodeSubmitted -> {Authenticated | Failed}`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::client::HubClient;
use super::errors::{HubError, HubResult, classify, extract_message};
use crate::common::redact::mask;

/// Login endpoint
pub const LOGIN_PATH: &str = "/v2/users/login?refresh_token=true";
/// Second factor login endpoint
pub const TWO_FACTOR_LOGIN_PATH: &str = "/v2/users/2fa-login?refresh_token=true";
/// `detail` returned by the login endpoint when a second factor is required
pub const SECOND_FACTOR_DETAIL_MESSAGE: &str =
    "Require secondary authentication on MFA enabled account";

/// Tokens expiring within this window are treated as expired
const EXPIRATION_LEEWAY_SECS: i64 = 60;

/// Authenticated session
///
/// The access token never changes once obtained; refreshing means building a
/// new `Session`.
#[derive(Clone)]
pub struct Session {
    username: String,
    access_token: Arc<str>,
}

impl Session {
    pub fn new(username: impl Into<String>, access_token: impl Into<Arc<str>>) -> Self {
        Self {
            username: username.into(),
            access_token: access_token.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("access_token", &mask(&self.access_token))
            .finish()
    }
}

/// Tokens returned by a successful login
#[derive(Clone, PartialEq, Eq)]
pub struct LoginTokens {
    pub access_token: String,
    /// Only issued by the second factor endpoint
    pub refresh_token: Option<String>,
}

impl LoginTokens {
    pub fn into_session(self, username: impl Into<String>) -> Session {
        Session::new(username, self.access_token)
    }
}

impl fmt::Debug for LoginTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginTokens")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(mask))
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct TwoFactorRequest<'a> {
    code: &'a str,
    login_2fa_token: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Deserialize, Default)]
struct TwoFactorChallenge {
    #[serde(default)]
    detail: String,
    #[serde(default)]
    login_2fa_token: String,
}

impl HubClient {
    /// Log in with username and password
    ///
    /// `code_prompt` is only invoked when the account requires a second factor.
    /// A plain password login returns no refresh token.
    pub async fn login<F, Fut>(
        &self,
        username: &str,
        password: &str,
        code_prompt: F,
    ) -> HubResult<LoginTokens>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HubResult<String>>,
    {
        tracing::debug!("Submitting credentials for {}", username);
        let url = self.url(LOGIN_PATH);
        let request = self
            .request(Method::POST, &url)
            .json(&LoginRequest { username, password });
        let response = self.send_raw(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        match status {
            StatusCode::OK => {
                let tokens: TokenResponse = serde_json::from_slice(&body)?;
                tracing::info!("Logged in as {}", username);
                Ok(LoginTokens {
                    access_token: tokens.token,
                    refresh_token: None,
                })
            }
            StatusCode::UNAUTHORIZED => {
                let challenge: TwoFactorChallenge =
                    serde_json::from_slice(&body).unwrap_or_default();
                if challenge.detail != SECOND_FACTOR_DETAIL_MESSAGE {
                    let message = if challenge.detail.is_empty() {
                        status.to_string()
                    } else {
                        challenge.detail
                    };
                    return Err(HubError::Status {
                        code: status.as_u16(),
                        message,
                    });
                }
                tracing::info!("Second factor required for {}", username);
                self.second_factor_login(&challenge.login_2fa_token, code_prompt)
                    .await
            }
            _ => Err(classify(status, &body)),
        }
    }

    async fn second_factor_login<F, Fut>(&self, challenge: &str, code_prompt: F) -> HubResult<LoginTokens>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HubResult<String>>,
    {
        let code = code_prompt().await?;

        let url = self.url(TWO_FACTOR_LOGIN_PATH);
        let request = self.request(Method::POST, &url).json(&TwoFactorRequest {
            code: code.trim(),
            login_2fa_token: challenge,
        });
        let response = self.send_raw(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            let message = extract_message(&body).unwrap_or_else(|| status.to_string());
            return Err(HubError::TwoFactorFailure(message));
        }

        let tokens: TokenResponse = serde_json::from_slice(&body)?;
        tracing::info!("Second factor accepted");
        Ok(LoginTokens {
            access_token: tokens.token,
            refresh_token: tokens.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}

#[derive(Deserialize)]
struct JwtClaims {
    #[serde(default)]
    exp: Option<f64>,
    #[serde(default)]
    nbf: Option<f64>,
}

/// Check whether a bearer token is expired or about to expire
///
/// Malformed tokens count as expired.
pub fn is_token_expired(token: &str) -> bool {
    is_token_expired_at(token, Utc::now())
}

pub(crate) fn is_token_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    let Some(claims) = decode_claims(token) else {
        return true;
    };
    let reference = (now + Duration::seconds(EXPIRATION_LEEWAY_SECS)).timestamp() as f64;

    if let Some(exp) = claims.exp {
        if reference > exp {
            return true;
        }
    }
    if let Some(nbf) = claims.nbf {
        if reference < nbf {
            return true;
        }
    }
    false
}

/// JWT format: header.payload.signature, base64url without padding
fn decode_claims(token: &str) -> Option<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let header = URL_SAFE_NO_PAD.decode(parts[0]).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&header).ok()?;
    header.get("alg")?;

    let payload = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    serde_json::from_slice(&payload).ok()
}

#[cfg(test)]
pub(crate) fn make_jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}
