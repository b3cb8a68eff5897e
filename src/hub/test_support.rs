//! In-process Hub API mock used by the client tests

use axum::Router;
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::client::HubClient;
use crate::model::config::Instance;

/// Axum router served on an ephemeral local port
pub(crate) struct MockHub {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl MockHub {
    /// Serve a router that does not need its own address
    pub async fn start(router: Router) -> Self {
        Self::start_with(move |_| router).await
    }

    /// Serve a router built from the server base URL, for absolute `next` links
    pub async fn start_with<F>(build: F) -> Self
    where
        F: FnOnce(String) -> Router,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let router = build(base_url.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { base_url, handle }
    }

    pub fn client(&self) -> HubClient {
        client_for(&self.base_url)
    }
}

impl Drop for MockHub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client whose every endpoint, rate-limit ones included, points at `base_url`
pub(crate) fn client_for(base_url: &str) -> HubClient {
    let instance = Instance {
        api_base_url: base_url.to_string(),
        registry_host: base_url.to_string(),
        rate_limit_token_url: format!("{}/token", base_url),
        rate_limit_manifest_url: format!("{}/v2/ratelimitpreview/test/manifests/latest", base_url),
        page_size: 100,
    };
    HubClient::new(Client::new(), instance)
}
