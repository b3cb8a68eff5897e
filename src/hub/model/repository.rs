use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hub repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// `namespace/name`
    pub name: String,
    pub description: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub pull_count: u64,
    pub star_count: u64,
    pub is_private: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RepositoryRecord {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pull_count: u64,
    #[serde(default)]
    pub star_count: u64,
    #[serde(default)]
    pub is_private: bool,
}

impl From<RepositoryRecord> for Repository {
    fn from(record: RepositoryRecord) -> Self {
        Self {
            name: format!("{}/{}", record.namespace, record.name),
            description: record.description.unwrap_or_default(),
            last_updated: record.last_updated,
            pull_count: record.pull_count,
            star_count: record.star_count,
            is_private: record.is_private,
        }
    }
}
