//! Login, logout and session bootstrap

use crate::common::prompt::TWO_FACTOR_PROMPT;
use crate::credentials::{CredentialStore, Credentials};
use crate::hub::{HubClient, HubError, Session};

use super::Context;

pub const USERNAME_ENV: &str = "DOCKER_USERNAME";
pub const PASSWORD_ENV: &str = "DOCKER_PASSWORD";

/// Printed when a command needs credentials and none are cached
pub const LOGIN_HINT: &str = "You need to be logged in to Docker Hub to use this tool.\n\
Please login to Docker Hub using the \"hub-rs login\" command.";

/// Resolve a session from the credential store
///
/// A cached token is reused until it is about to expire; after that the
/// cached password is used to log in again. That silent login cannot answer
/// a second factor challenge and fails with an authentication error instead.
/// Without a cached username nothing is sent to the network.
pub async fn ensure_session(client: &HubClient, store: &dyn CredentialStore) -> anyhow::Result<HubClient> {
    let credentials = store.get_auth()?;
    if credentials.is_empty() {
        return Err(HubError::Authentication.into());
    }

    if !credentials.token_expired() {
        tracing::debug!("Reusing cached token of {}", credentials.username);
        return Ok(client.with_session(Session::new(credentials.username, credentials.token)));
    }

    if credentials.password.is_empty() {
        return Err(HubError::Authentication.into());
    }

    tracing::info!("Cached token expired, logging in again as {}", credentials.username);
    let tokens = client
        .login(&credentials.username, &credentials.password, || async {
            Err::<String, _>(HubError::Authentication)
        })
        .await?;

    let refreshed = Credentials::new(
        credentials.username.clone(),
        credentials.password,
        tokens.clone(),
    );
    store.store(&refreshed)?;
    Ok(client.with_session(tokens.into_session(credentials.username)))
}

/// Session for commands that change account security or read owner-only data
///
/// With an interactive stdin an expired token is renewed through the full
/// login, second factor included, for the cached username. Otherwise this is
/// [`ensure_session`].
pub async fn ensure_sudo_session(ctx: &Context, interactive: bool) -> anyhow::Result<HubClient> {
    let credentials = ctx.store.get_auth()?;
    if interactive && credentials.token_expired() {
        tracing::info!("Cached token expired, asking for credentials again");
        login(ctx, Some(credentials.username)).await?;
    }
    ensure_session(&ctx.client, ctx.store.as_ref()).await
}

fn from_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

pub(super) async fn run_login(ctx: &Context, username: Option<String>) -> anyhow::Result<()> {
    login(ctx, username).await?;
    println!("Login Succeeded");
    Ok(())
}

/// Prompt for whatever is missing, log in and store the new credentials
async fn login(ctx: &Context, username: Option<String>) -> anyhow::Result<()> {
    let username = match username.filter(|u| !u.is_empty()).or_else(|| from_env(USERNAME_ENV)) {
        Some(username) => username,
        None => ctx.terminal.read_line("Username: ").await?,
    };
    if username.is_empty() {
        anyhow::bail!("username required");
    }

    let password = match from_env(PASSWORD_ENV) {
        Some(password) => password,
        None => ctx.terminal.read_password("Password").await?,
    };

    let tokens = ctx
        .client
        .login(&username, &password, || ctx.terminal.read_line(TWO_FACTOR_PROMPT))
        .await?;
    ctx.store.store(&Credentials::new(username, password, tokens))?;
    Ok(())
}

pub(super) fn run_logout(ctx: &Context) -> anyhow::Result<()> {
    ctx.store.erase()?;
    println!("Logout Succeeded");
    Ok(())
}
