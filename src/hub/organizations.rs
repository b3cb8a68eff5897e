//! Organizations, teams and members
//!
//! An organization is only complete once its teams, its members and the
//! members of each team are known. These sub-fetches fan out concurrently
//! and are joined with first-error-wins semantics: the first failure drops
//! every sibling still in flight and the whole listing fails. Pagination
//! inside a single resource stays sequential.

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;

use super::client::{HubClient, segment};
use super::errors::{HubError, HubResult};
use super::model::account::Account;
use super::model::organization::{
    Member, Organization, OrganizationRecord, OrganizationSettings, Role, Team, TeamRecord,
};
use super::pagination::Page;

/// Organizations joined by the current user
pub const ORGANIZATIONS_PATH: &str = "/v2/user/orgs/";

fn organization_path(org: &str) -> String {
    format!("/v2/orgs/{}", segment(org))
}

fn settings_path(org: &str) -> String {
    format!("/v2/orgs/{}/settings", segment(org))
}

fn teams_path(org: &str) -> String {
    format!("/v2/orgs/{}/groups/", segment(org))
}

fn members_path(org: &str) -> String {
    format!("/v2/orgs/{}/members/", segment(org))
}

fn team_members_path(org: &str, team: &str) -> String {
    format!("/v2/orgs/{}/groups/{}/members/", segment(org), segment(team))
}

impl HubClient {
    /// All organizations of the current user, fully resolved
    ///
    /// Sorted by namespace. Cancelling `cancel` aborts every in-flight
    /// sub-fetch and discards partial results.
    pub async fn get_organizations(&self, cancel: &CancellationToken) -> HubResult<Vec<Organization>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Organization listing cancelled");
                Err(HubError::Cancelled)
            }
            organizations = self.fetch_organizations() => organizations,
        }
    }

    async fn fetch_organizations(&self) -> HubResult<Vec<Organization>> {
        let mut next = Some(self.first_page_url(ORGANIZATIONS_PATH, &[])?);
        let mut organizations = Vec::new();

        while let Some(url) = next {
            let page: Page<OrganizationRecord> = self.fetch_page(&url).await?;
            let resolved =
                try_join_all(page.results.into_iter().map(|r| self.resolve_organization(r))).await?;
            organizations.extend(resolved);
            next = page.next;
        }

        organizations.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        Ok(organizations)
    }

    async fn resolve_organization(&self, record: OrganizationRecord) -> HubResult<Organization> {
        let (teams, members) = tokio::try_join!(
            self.get_teams(&record.orgname),
            self.get_members(&record.orgname)
        )?;
        tracing::trace!(
            "Resolved organization {} ({} teams, {} members)",
            record.orgname,
            teams.len(),
            members.len()
        );

        Ok(Organization {
            role: Role::from_teams(&teams),
            namespace: record.orgname,
            full_name: record.full_name,
            teams,
            members,
        })
    }

    /// All teams of an organization with their members, sorted by name
    pub async fn get_teams(&self, org: &str) -> HubResult<Vec<Team>> {
        let mut next = Some(self.first_page_url(&teams_path(org), &[])?);
        let mut teams = Vec::new();

        while let Some(url) = next {
            let page: Page<TeamRecord> = self.fetch_page(&url).await?;
            let resolved = try_join_all(page.results.into_iter().map(|record| async move {
                let members = self.get_team_members(org, &record.name).await?;
                Ok::<_, HubError>(Team {
                    name: record.name,
                    description: record.description,
                    members,
                })
            }))
            .await?;
            teams.extend(resolved);
            next = page.next;
        }

        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    /// All members of an organization
    pub async fn get_members(&self, org: &str) -> HubResult<Vec<Member>> {
        let url = self.first_page_url(&members_path(org), &[])?;
        Ok(self.fetch_all(&url, true).await?.items)
    }

    /// Number of members of an organization, from a single one-item page
    pub async fn get_members_count(&self, org: &str) -> HubResult<usize> {
        self.count_items(&members_path(org)).await
    }

    /// Number of teams of an organization, from a single one-item page
    pub async fn get_teams_count(&self, org: &str) -> HubResult<usize> {
        self.count_items(&teams_path(org)).await
    }

    /// Members of one team; this endpoint is not paginated
    pub async fn get_team_members(&self, org: &str, team: &str) -> HubResult<Vec<Member>> {
        self.get_json(&self.url(&team_members_path(org, team))).await
    }

    /// Organization account details
    pub async fn get_organization_info(&self, org: &str) -> HubResult<Account> {
        self.get_json(&self.url(&organization_path(org))).await
    }

    /// Organization settings; forbidden unless the user is an owner
    pub async fn get_organization_settings(&self, org: &str) -> HubResult<OrganizationSettings> {
        self.get_json(&self.url(&settings_path(org))).await
    }

    async fn count_items(&self, path: &str) -> HubResult<usize> {
        let url = self.url_with_query(path, &[("page_size", "1"), ("page", "1")])?;
        let page: Page<serde_json::Value> = self.fetch_page(&url).await?;
        Ok(page.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::auth::Session;
    use crate::hub::test_support::MockHub;
    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn envelope(results: Value) -> Json<Value> {
        let count = results.as_array().map(|a| a.len()).unwrap_or(0);
        Json(json!({"count": count, "next": null, "previous": null, "results": results}))
    }

    fn delay_for(org: &str) -> Duration {
        // First in sorted order, last to answer.
        match org {
            "alpha" => Duration::from_millis(150),
            "bravo" => Duration::from_millis(75),
            _ => Duration::from_millis(0),
        }
    }

    fn org_router(failing_team: Option<&'static str>) -> Router {
        Router::new()
            .route(
                "/v2/user/orgs/",
                get(|| async {
                    envelope(json!([
                        {"orgname": "charlie", "full_name": "Charlie Org"},
                        {"orgname": "alpha", "full_name": "Alpha Org"},
                        {"orgname": "bravo", "full_name": "Bravo Org"}
                    ]))
                }),
            )
            .route(
                "/v2/orgs/{org}/groups/",
                get(|Path(org): Path<String>| async move {
                    tokio::time::sleep(delay_for(&org)).await;
                    let teams = if org == "alpha" {
                        json!([
                            {"name": "owners", "description": "Owners", "id": 1},
                            {"name": "devs", "description": "Developers", "id": 2}
                        ])
                    } else {
                        json!([{"name": "devs", "description": "Developers", "id": 3}])
                    };
                    envelope(teams)
                }),
            )
            .route(
                "/v2/orgs/{org}/members/",
                get(|Path(org): Path<String>| async move {
                    tokio::time::sleep(delay_for(&org)).await;
                    envelope(json!([
                        {"username": format!("{}-admin", org), "full_name": "Admin"},
                        {"username": "shared", "full_name": "Shared User"}
                    ]))
                }),
            )
            .route(
                "/v2/orgs/{org}/groups/{team}/members/",
                get(move |Path((org, team)): Path<(String, String)>| async move {
                    if Some(org.as_str()) == failing_team {
                        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "boom"})))
                            .into_response();
                    }
                    Json(json!([{"username": format!("{}-{}", org, team), "full_name": ""}]))
                        .into_response()
                }),
            )
    }

    #[tokio::test]
    async fn test_organizations_sorted_and_fully_populated() {
        let hub = MockHub::start(org_router(None)).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let orgs = client.get_organizations(&CancellationToken::new()).await.unwrap();

        let names: Vec<&str> = orgs.iter().map(|o| o.namespace.as_str()).collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);

        let alpha = &orgs[0];
        assert_eq!(alpha.full_name, "Alpha Org");
        assert_eq!(alpha.role, Role::Owner);
        let team_names: Vec<&str> = alpha.teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(team_names, vec!["devs", "owners"]);
        assert_eq!(alpha.teams[1].members[0].username, "alpha-owners");
        assert_eq!(alpha.members.len(), 2);

        assert_eq!(orgs[1].role, Role::Member);
        assert_eq!(orgs[2].members[0].username, "charlie-admin");
    }

    #[tokio::test]
    async fn test_any_sub_fetch_failure_fails_the_listing() {
        let hub = MockHub::start(org_router(Some("bravo"))).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let err = client
            .get_organizations(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_status_error());
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.message(), Some("boom"));
    }

    #[tokio::test]
    async fn test_cancellation_discards_aggregation() {
        let router = Router::new()
            .route(
                "/v2/user/orgs/",
                get(|| async { envelope(json!([{"orgname": "slow", "full_name": ""}])) }),
            )
            .route(
                "/v2/orgs/{org}/groups/",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    envelope(json!([]))
                }),
            )
            .route("/v2/orgs/{org}/members/", get(|| async { envelope(json!([])) }));
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client.get_organizations(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_teams_follow_pagination() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let hub = MockHub::start_with(move |base| {
            Router::new()
                .route(
                    "/v2/orgs/{org}/groups/",
                    get(move || {
                        let base = base.clone();
                        async move {
                            Json(json!({
                                "count": 2,
                                "next": format!("{}/v2/orgs/acme/groups/page2/", base),
                                "results": [{"name": "zeta", "description": ""}]
                            }))
                        }
                    }),
                )
                .route(
                    "/v2/orgs/{org}/groups/page2/",
                    get(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        async {
                            Json(json!({
                                "count": 2,
                                "next": null,
                                "results": [{"name": "eta", "description": ""}]
                            }))
                        }
                    }),
                )
                .route(
                    "/v2/orgs/{org}/groups/{team}/members/",
                    get(|| async { Json(json!([])) }),
                )
        })
        .await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let teams = client.get_teams("acme").await.unwrap();
        let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["eta", "zeta"]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_members_count_uses_single_item_page() {
        let router = Router::new().route(
            "/v2/orgs/{org}/members/",
            get(|axum::extract::RawQuery(query): axum::extract::RawQuery| async move {
                assert_eq!(query.as_deref(), Some("page_size=1&page=1"));
                Json(json!({"count": 42, "results": [{"username": "a"}]}))
            }),
        );
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        assert_eq!(client.get_members_count("acme").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_forbidden_organization_info() {
        let router = Router::new().route(
            "/v2/orgs/{org}",
            get(|| async { Response::builder().status(403).body(axum::body::Body::empty()).unwrap() }),
        );
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let err = client.get_organization_info("acme").await.unwrap_err();
        assert!(err.is_forbidden());
    }

    #[tokio::test]
    async fn test_organization_settings() {
        let router = Router::new().route(
            "/v2/orgs/{org}/settings",
            get(|Path(org): Path<String>| async move {
                assert_eq!(org, "acme");
                Json(json!({
                    "restricted_images": {
                        "enabled": true,
                        "allow_official_images": true,
                        "allow_verified_publishers": false
                    }
                }))
            }),
        );
        let hub = MockHub::start(router).await;
        let client = hub.client().with_session(Session::new("alice", "tok"));

        let settings = client.get_organization_settings("acme").await.unwrap();
        assert!(settings.restricted_images.enabled);
        assert!(settings.restricted_images.allow_official_images);
        assert!(!settings.restricted_images.allow_verified_publishers);
    }
}
