use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User or organization account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Account {
    #[serde(default)]
    pub id: String,
    /// `username` for users, `orgname` for organizations
    #[serde(alias = "username", alias = "orgname")]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, rename(deserialize = "date_joined"))]
    pub joined: Option<DateTime<Utc>>,
}

/// Plan whose accounts have seats and teams to account for
pub const TEAM_PLAN: &str = "team";

/// Hub plan of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub name: String,
    pub limits: Limits,
}

/// Limits granted by a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub seats: u64,
    pub private_repos: u64,
    pub teams: u64,
    pub collaborators: u64,
    pub parallel_builds: u64,
}

impl Plan {
    pub fn is_team(&self) -> bool {
        self.name == TEAM_PLAN
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanRecord {
    pub name: String,
    #[serde(default)]
    pub seats: u64,
    #[serde(default)]
    pub private_repos: u64,
    #[serde(default)]
    pub teams: u64,
    #[serde(default)]
    pub collaborators: u64,
    #[serde(default)]
    pub parallel_builds: u64,
}

impl From<PlanRecord> for Plan {
    fn from(record: PlanRecord) -> Self {
        Self {
            name: record.name,
            limits: Limits {
                seats: record.seats,
                private_repos: record.private_repos,
                teams: record.teams,
                collaborators: record.collaborators,
                parallel_builds: record.parallel_builds,
            },
        }
    }
}

/// Current usage of an account against its plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumption {
    pub seats: usize,
    pub private_repositories: usize,
    pub teams: usize,
}
