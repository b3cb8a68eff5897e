//! Account information, plans and consumption

use super::client::{HubClient, segment};
use super::errors::HubResult;
use super::model::account::{Account, Consumption, Plan, PlanRecord};

/// Current user endpoint
pub const USER_PATH: &str = "/v2/user/";

fn hub_plan_path(account_id: &str) -> String {
    format!("/api/billing/v4/accounts/{}/hub-plan", segment(account_id))
}

impl HubClient {
    /// Account of the current session
    pub async fn get_user_info(&self) -> HubResult<Account> {
        self.get_json(&self.url(USER_PATH)).await
    }

    /// Hub plan of an account, looked up by account id
    pub async fn get_hub_plan(&self, account_id: &str) -> HubResult<Plan> {
        let record: PlanRecord = self.get_json(&self.url(&hub_plan_path(account_id))).await?;
        Ok(record.into())
    }

    /// Seats, teams and private repositories used by an organization
    ///
    /// The three counts are fetched concurrently; any failure fails the whole.
    pub async fn get_org_consumption(&self, org: &str) -> HubResult<Consumption> {
        let (seats, teams, private_repositories) = tokio::try_join!(
            self.get_members_count(org),
            self.get_teams_count(org),
            self.count_private_repositories(org)
        )?;
        Ok(Consumption {
            seats,
            private_repositories,
            teams,
        })
    }

    /// Consumption of a personal account: one seat, no teams
    pub async fn get_user_consumption(&self, user: &str) -> HubResult<Consumption> {
        Ok(Consumption {
            seats: 1,
            private_repositories: self.count_private_repositories(user).await?,
            teams: 0,
        })
    }
}
