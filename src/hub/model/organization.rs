use serde::{Deserialize, Serialize};

/// Name of the team whose members own an organization
pub const OWNERS_TEAM: &str = "owners";

/// Organization with its teams and members fully resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub namespace: String,
    pub full_name: String,
    pub role: Role,
    pub teams: Vec<Team>,
    pub members: Vec<Member>,
}

/// Role of the current user in an organization
///
/// Not returned by the server; derived from the team list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Owner,
    Member,
}

impl Role {
    /// `Owner` when a team literally named `owners` is visible
    pub fn from_teams(teams: &[Team]) -> Self {
        if teams.iter().any(|t| t.name == OWNERS_TEAM) {
            Role::Owner
        } else {
            Role::Member
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Member => "Member",
        }
    }
}

/// Team (group) of an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    pub description: String,
    pub members: Vec<Member>,
}

/// User belonging to an organization or team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Member {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

/// Settings of an organization, readable by its owners only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct OrganizationSettings {
    #[serde(default)]
    pub restricted_images: RestrictedImages,
}

/// Which public images members may pull
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct RestrictedImages {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allow_official_images: bool,
    #[serde(default)]
    pub allow_verified_publishers: bool,
}

/// Organization entry of `/v2/user/orgs/`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrganizationRecord {
    pub orgname: String,
    #[serde(default)]
    pub full_name: String,
}

/// Group entry of `/v2/orgs/{org}/groups/`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TeamRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
}
