use crate::hub::Listing;
use crate::hub::model::token::AccessToken;
use crate::model::arg::TokenCommand;

use super::{Context, format};

pub(super) async fn run(command: TokenCommand, ctx: &Context) -> anyhow::Result<()> {
    let client = ctx.authenticated_sudo().await?;
    match command {
        TokenCommand::Ls { pages, output } => {
            let listing = client.get_tokens(pages.all).await?;
            print!(
                "{}",
                format::output(output.format, listing.items.as_slice(), |_| render_list(&listing))?
            );
        }
        TokenCommand::Create { description } => {
            let mut token = client.create_token(&description).await?;
            let secret = token.take_secret().unwrap_or_default();
            println!("Personal Access Token successfully created!");
            println!();
            print!("{}", render_details(&token));
            println!();
            println!("The token will only be shown once, copy it to a safe place:");
            println!("{}", secret);
        }
        TokenCommand::Inspect { uuid, output } => {
            let token = client.get_token(&uuid).await?;
            print!("{}", format::output(output.format, &token, render_details)?);
        }
        TokenCommand::Update {
            uuid,
            description,
            set_active,
        } => {
            let current = client.get_token(&uuid).await?;
            let (description, is_active) = updated_fields(&current, description, set_active);
            client.update_token(&uuid, &description, is_active).await?;
            println!("Updated {}", uuid);
        }
        TokenCommand::Activate { uuid } => {
            let token = client.update_token(&uuid, "", true).await?;
            println!("{} is {}", token.uuid, format::active(token.is_active));
        }
        TokenCommand::Deactivate { uuid } => {
            let token = client.update_token(&uuid, "", false).await?;
            println!("{} is {}", token.uuid, format::active(token.is_active));
        }
        TokenCommand::Rm { uuid, force } => {
            println!("WARNING: This action is irreversible.");
            println!("By confirming, you will permanently delete the access token.");
            println!("Removing the token will break any existing integration using it.");
            if !ctx
                .confirm(force.force, "Are you sure you want to delete the access token? [y/N] ")
                .await?
            {
                return Ok(());
            }
            client.remove_token(&uuid).await?;
            println!("Access token deleted {}", uuid);
        }
    }
    Ok(())
}

/// Fields left out on the command line keep their current value
fn updated_fields(current: &AccessToken, description: Option<String>, set_active: Option<bool>) -> (String, bool) {
    (
        description.unwrap_or_else(|| current.description.clone()),
        set_active.unwrap_or(current.is_active),
    )
}

fn render_list(listing: &Listing<AccessToken>) -> String {
    let mut out = String::from("DESCRIPTION\tUUID\tLAST USED\tCREATED\tACTIVE\n");
    for token in &listing.items {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            token.description,
            token.uuid,
            format::time(token.last_used),
            format::time(token.created_at),
            token.is_active
        ));
    }
    if let Some(footer) = format::partial_footer(listing, "tokens") {
        out.push_str(&footer);
        out.push('\n');
    }
    out
}

fn render_details(token: &AccessToken) -> String {
    let mut out = String::new();
    out.push_str(&format!("Description: {}\n", token.description));
    out.push_str(&format!("UUID:        {}\n", token.uuid));
    out.push_str(&format!("Scopes:      {}\n", token.scopes.join(", ")));
    out.push_str(&format!("Created:     {}\n", format::time(token.created_at)));
    out.push_str(&format!("Last used:   {}\n", format::time(token.last_used)));
    out.push_str(&format!("Creator:     {} ({})\n", token.creator_ip, token.creator_user_agent));
    out.push_str(&format!("Status:      {}\n", format::active(token.is_active)));
    out
}
