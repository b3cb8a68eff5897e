//! Shared HTTP client
//!
//! One `reqwest::Client` is built at startup from [`Config`] and cloned into
//! every Hub call, so connections are pooled across the concurrent
//! organization fan-out and the rate-limit ladder.

use reqwest::{Client, Proxy};
use std::time::Duration;

use crate::model::config::{Config, TlsBackend};

/// Build the shared client from the TLS, timeout and proxy settings
pub fn build_client(config: &Config) -> anyhow::Result<Client> {
    let mut builder = Client::builder();

    // 0 keeps reqwest's default, which never times out
    if config.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(config.timeout_secs));
    }

    if config.tls_backend == TlsBackend::Rustls {
        builder = builder.use_rustls_tls();
    }

    if let Some(proxy) = proxy(config)? {
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Proxy for every scheme, `None` without `proxyUrl`
fn proxy(config: &Config) -> anyhow::Result<Option<Proxy>> {
    let Some(url) = config.proxy_url.as_deref().filter(|u| !u.is_empty()) else {
        return Ok(None);
    };

    let mut proxy = Proxy::all(url)?;
    match config.proxy_auth() {
        Some((username, password)) => proxy = proxy.basic_auth(username, password),
        None if config.proxy_username.is_some() || config.proxy_password.is_some() => {
            tracing::warn!("Ignoring proxy credentials: proxyUsername and proxyPassword must both be set");
        }
        None => {}
    }

    tracing::info!("HTTP proxy configured: {}", url);
    Ok(Some(proxy))
}
