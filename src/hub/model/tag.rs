use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag of a repository, pointing to a manifest or a manifest list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// `repository:tag`
    pub name: String,
    pub full_size: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updater_username: String,
    pub images: Vec<Image>,
    pub expires: Option<DateTime<Utc>>,
    pub last_pulled: Option<DateTime<Utc>>,
    pub last_pushed: Option<DateTime<Utc>>,
    pub status: String,
}

/// Platform specific image behind a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Image {
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_pulled: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_pushed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagRecord {
    pub name: String,
    #[serde(default)]
    pub full_size: u64,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updater_username: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub tag_expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag_last_pulled: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag_last_pushed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag_status: Option<String>,
}

impl TagRecord {
    pub fn into_tag(self, repository: &str) -> Tag {
        Tag {
            name: format!("{}:{}", repository, self.name),
            full_size: self.full_size,
            last_updated: self.last_updated,
            last_updater_username: self.last_updater_username.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
            expires: self.tag_expires,
            last_pulled: self.tag_last_pulled,
            last_pushed: self.tag_last_pushed,
            status: self.tag_status.unwrap_or_default(),
        }
    }
}
