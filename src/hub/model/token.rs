use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::redact::mask;

/// Personal access token
///
/// `secret` is only returned when the token is created. It is redacted from
/// `Debug` output, skipped by `Serialize` and never logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AccessToken {
    pub uuid: Uuid,
    #[serde(default, rename(deserialize = "token_label"))]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub creator_ip: String,
    #[serde(default, rename(deserialize = "creator_ua"))]
    pub creator_user_agent: String,
    #[serde(default)]
    pub generated_by: String,
    #[serde(default, rename = "token", skip_serializing)]
    pub secret: Option<String>,
}

impl AccessToken {
    /// Take the secret out of the token, leaving `None` behind
    pub fn take_secret(&mut self) -> Option<String> {
        self.secret.take().filter(|s| !s.is_empty())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("uuid", &self.uuid)
            .field("description", &self.description)
            .field("created_at", &self.created_at)
            .field("last_used", &self.last_used)
            .field("is_active", &self.is_active)
            .field("scopes", &self.scopes)
            .field("creator_ip", &self.creator_ip)
            .field("creator_user_agent", &self.creator_user_agent)
            .field("secret", &self.secret.as_deref().map(mask))
            .finish()
    }
}

/// Body of token create and update requests
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    #[serde(rename = "token_label", skip_serializing_if = "str::is_empty")]
    pub description: &'a str,
    pub is_active: bool,
}
