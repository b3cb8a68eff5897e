use anyhow::Context as _;

use crate::hub::HubError;
use crate::hub::model::organization::{Member, Organization, OrganizationSettings, Team};
use crate::model::arg::OrgCommand;

use super::{Context, format};

pub(super) async fn run(command: OrgCommand, ctx: &Context) -> anyhow::Result<()> {
    match command {
        OrgCommand::Ls { output } => {
            let client = ctx.authenticated().await?;
            let organizations = client.get_organizations(&ctx.cancel).await?;
            print!(
                "{}",
                format::output(output.format, organizations.as_slice(), render_organizations)?
            );
        }
        OrgCommand::Members {
            organization,
            output,
        } => {
            let client = ctx.authenticated().await?;
            let members = client
                .get_members(&organization)
                .await
                .map_err(|e| owner_hint(e, &organization))
                .with_context(|| format!("failed to list members of {}", organization))?;
            print!("{}", format::output(output.format, members.as_slice(), render_members)?);
        }
        OrgCommand::Teams {
            organization,
            output,
        } => {
            let client = ctx.authenticated().await?;
            let teams = client
                .get_teams(&organization)
                .await
                .map_err(|e| owner_hint(e, &organization))
                .with_context(|| format!("failed to list teams of {}", organization))?;
            print!("{}", format::output(output.format, teams.as_slice(), render_teams)?);
        }
        OrgCommand::Settings {
            organization,
            output,
        } => {
            let client = ctx.authenticated_sudo().await?;
            let settings = client
                .get_organization_settings(&organization)
                .await
                .map_err(|e| owner_hint(e, &organization))
                .with_context(|| format!("failed to get settings of {}", organization))?;
            print!("{}", format::output(output.format, &settings, render_settings)?);
        }
    }
    Ok(())
}

fn owner_hint(err: HubError, organization: &str) -> anyhow::Error {
    if err.is_forbidden() {
        anyhow::anyhow!("you need to be an owner of the {:?} organization", organization)
    } else {
        err.into()
    }
}

fn render_organizations(organizations: &[Organization]) -> String {
    let mut out = String::from("NAMESPACE\tNAME\tMY ROLE\tTEAMS\tMEMBERS\n");
    for org in organizations {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            org.namespace,
            org.full_name,
            org.role.as_str(),
            org.teams.len(),
            org.members.len()
        ));
    }
    out
}

fn render_members(members: &[Member]) -> String {
    let mut out = String::from("USERNAME\tFULL NAME\n");
    for member in members {
        out.push_str(&format!("{}\t{}\n", member.username, member.full_name));
    }
    out
}

fn render_teams(teams: &[Team]) -> String {
    let mut out = String::from("TEAM\tDESCRIPTION\tMEMBERS\n");
    for team in teams {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            team.name,
            team.description,
            team.members.len()
        ));
    }
    out
}

fn render_settings(settings: &OrganizationSettings) -> String {
    let images = &settings.restricted_images;
    let mut out = String::new();
    out.push_str(&format!("Restricted Images Access:               {}\n", enabled(images.enabled)));
    out.push_str(&format!(
        "Allow use of Official images:           {}\n",
        enabled(images.allow_official_images)
    ));
    out.push_str(&format!(
        "Allow use of Verified Publisher images: {}\n",
        enabled(images.allow_verified_publishers)
    ));
    out
}

fn enabled(value: bool) -> &'static str {
    if value { "Enabled" } else { "Disabled" }
}
