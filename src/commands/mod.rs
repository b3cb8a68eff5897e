//! Command handlers
//!
//! Each subcommand resolves a session (when it needs one), calls the Hub
//! client and prints plain line based text to stdout.

mod account;
mod format;
mod org;
mod repo;
pub mod session;
mod tag;
mod terminal;
mod token;

use std::io::IsTerminal;

use tokio_util::sync::CancellationToken;

use crate::credentials::CredentialStore;
use crate::hub::HubClient;
use crate::model::arg::Command;

pub use terminal::Terminal;

/// Everything a command needs, built once in `main`
pub struct Context {
    /// Client without a session
    pub client: HubClient,
    pub store: Box<dyn CredentialStore>,
    pub cancel: CancellationToken,
    pub terminal: Terminal,
}

impl Context {
    /// Client bound to a valid session, logging in again silently if needed
    pub async fn authenticated(&self) -> anyhow::Result<HubClient> {
        session::ensure_session(&self.client, self.store.as_ref()).await
    }

    /// Like [`Context::authenticated`], but an expired token is renewed
    /// through an interactive login when stdin is a terminal
    pub async fn authenticated_sudo(&self) -> anyhow::Result<HubClient> {
        session::ensure_sudo_session(self, std::io::stdin().is_terminal()).await
    }

    /// Ask for confirmation of a destructive operation unless forced
    pub async fn confirm(&self, force: bool, prompt: &str) -> anyhow::Result<bool> {
        if force {
            return Ok(true);
        }
        let confirmed = self.terminal.confirm(prompt).await?;
        if !confirmed {
            println!("Aborted");
        }
        Ok(confirmed)
    }
}

pub async fn run(command: Command, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Command::Login { username } => session::run_login(ctx, username).await,
        Command::Logout => session::run_logout(ctx),
        Command::Account(cmd) => account::run(cmd, ctx).await,
        Command::Repo(cmd) => repo::run(cmd, ctx).await,
        Command::Tag(cmd) => tag::run(cmd, ctx).await,
        Command::Org(cmd) => org::run(cmd, ctx).await,
        Command::Token(cmd) => token::run(cmd, ctx).await,
        Command::Version => {
            println!("Version:    {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
