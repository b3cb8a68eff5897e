mod commands;
mod common;
mod credentials;
mod http_client;
mod hub;
mod model;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use commands::session::LOGIN_HINT;
use commands::{Context, Terminal};
use credentials::FileCredentialStore;
use hub::{HubClient, HubError};
use model::arg::Args;
use model::config::Config;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over the verbosity flags
    let default_level = if args.trace {
        "trace"
    } else if args.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    // Load configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {}", e);
        std::process::exit(1);
    });
    let instance = config.resolve_instance();
    tracing::debug!("Hub API: {}", instance.api_base_url);

    // Build the shared HTTP client
    let http = http_client::build_client(&config).unwrap_or_else(|e| {
        tracing::error!("Failed to build HTTP client: {}", e);
        std::process::exit(1);
    });

    let credentials_path = args
        .credentials
        .clone()
        .unwrap_or_else(|| FileCredentialStore::default_credentials_path().to_string());
    let store = FileCredentialStore::new(credentials_path);
    tracing::debug!("Credentials file: {}", store.path().display());

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let ctx = Context {
        client: HubClient::new(http, instance),
        store: Box::new(store),
        terminal: Terminal::new(cancel.clone()),
        cancel,
    };

    let result = tokio::select! {
        result = commands::run(args.command, &ctx) => result,
        _ = ctx.cancel.cancelled() => Err(HubError::Cancelled.into()),
    };
    if let Err(e) = result {
        eprintln!("{}", describe(&e));
        std::process::exit(1);
    }
}

/// User facing text for a failed command
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<HubError>() {
        Some(e) if e.is_authentication_error() => LOGIN_HINT.to_string(),
        Some(e) if e.is_cancelled() => "Cancelled".to_string(),
        Some(e) if e.is_two_factor_failure() => {
            format!("Login failed: {}", e.message().unwrap_or("invalid code"))
        }
        Some(e) if e.is_rate_limit_parse_error() => {
            format!("Error: the registry sent unexpected rate limit headers: {:#}", err)
        }
        Some(e) if e.is_status_error() => match e.status_code() {
            Some(code) => format!("Error: {:#} (HTTP {})", err, code),
            None => format!("Error: {:#}", err),
        },
        _ => format!("Error: {:#}", err),
    }
}

/// Cancel `cancel` on the first SIGINT or SIGTERM
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                cancel.cancel();
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::debug!("Signal received, cancelling");
    cancel.cancel();
}
