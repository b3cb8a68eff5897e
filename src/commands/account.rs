use serde::Serialize;

use crate::hub::RateLimits;
use crate::hub::model::account::{Account, Consumption, Plan};
use crate::model::arg::{AccountCommand, FormatArg};

use super::{Context, format};

pub(super) async fn run(command: AccountCommand, ctx: &Context) -> anyhow::Result<()> {
    match command {
        AccountCommand::Info {
            organization,
            output,
        } => info(ctx, organization.as_deref(), output).await,
        AccountCommand::RateLimiting { output } => rate_limiting(ctx, output).await,
    }
}

/// Account, plan and usage printed together
#[derive(Debug, Serialize)]
struct AccountInfo {
    account: Account,
    plan: Plan,
    consumption: Consumption,
}

async fn info(ctx: &Context, organization: Option<&str>, output: FormatArg) -> anyhow::Result<()> {
    let client = ctx.authenticated().await?;
    let info = match organization {
        Some(org) => {
            let account = client.get_organization_info(org).await?;
            let (plan, consumption) = tokio::try_join!(
                client.get_hub_plan(&account.id),
                client.get_org_consumption(org)
            )?;
            AccountInfo {
                account,
                plan,
                consumption,
            }
        }
        None => {
            let account = client.get_user_info().await?;
            let (plan, consumption) = tokio::try_join!(
                client.get_hub_plan(&account.id),
                client.get_user_consumption(&account.name)
            )?;
            AccountInfo {
                account,
                plan,
                consumption,
            }
        }
    };
    print!("{}", format::output(output.format, &info, render_info)?);
    Ok(())
}

/// The probe runs with whatever credentials are cached, even stale ones,
/// and falls back to an anonymous token.
async fn rate_limiting(ctx: &Context, output: FormatArg) -> anyhow::Result<()> {
    let credentials = ctx.store.get_auth()?;
    let limits = ctx.client.probe_rate_limits(&credentials.ladder()).await?;
    print!("{}", format::output(output.format, &limits, render_rate_limits)?);
    Ok(())
}

fn render_info(info: &AccountInfo) -> String {
    let AccountInfo {
        account,
        plan,
        consumption,
    } = info;
    let mut out = String::new();
    out.push_str(&format!("Username:   {}\n", account.name));
    out.push_str(&format!("Full name:  {}\n", account.full_name));
    out.push_str(&format!("Company:    {}\n", account.company));
    out.push_str(&format!("Location:   {}\n", account.location));
    out.push_str(&format!("Joined:     {}\n", format::time(account.joined)));
    out.push_str(&format!("Plan:       {}\n", plan.name));
    out.push_str("Limits:\n");
    if plan.is_team() {
        out.push_str(&format!(
            "  Seats:                {}/{}\n",
            consumption.seats,
            format::limit(plan.limits.seats)
        ));
    }
    out.push_str(&format!(
        "  Private repositories: {}/{}\n",
        consumption.private_repositories,
        format::limit(plan.limits.private_repos)
    ));
    out.push_str(&format!("  Parallel builds:      {}\n", plan.limits.parallel_builds));
    out.push_str(&format!(
        "  Collaborators:        {}\n",
        format::limit(plan.limits.collaborators)
    ));
    if plan.is_team() {
        out.push_str(&format!(
            "  Teams:                {}/{}\n",
            consumption.teams,
            format::limit(plan.limits.teams)
        ));
    }
    out
}

fn render_rate_limits(limits: &RateLimits) -> String {
    if limits.is_unlimited() {
        return "Unlimited\n".to_string();
    }
    let mut out = format!(
        "Limit:     {}, {} window\nRemaining: {}, {} window\n",
        limits.limit,
        format::duration(limits.limit_window_secs),
        limits.remaining,
        format::duration(limits.remaining_window_secs)
    );
    if !limits.source.is_empty() {
        out.push_str(&format!("Source:    {}\n", limits.source));
    }
    out
}
