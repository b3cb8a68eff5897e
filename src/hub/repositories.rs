//! Repositories

use super::client::HubClient;
use super::errors::HubResult;
use super::model::repository::{Repository, RepositoryRecord};
use super::pagination::Listing;

/// Repositories endpoint root
pub const REPOSITORIES_PATH: &str = "/v2/repositories/";

/// Namespace used by the Hub for official images
pub const OFFICIAL_NAMESPACE: &str = "library";

const DEFAULT_REGISTRY_PREFIXES: [&str; 3] = ["docker.io/", "index.docker.io/", "registry-1.docker.io/"];

/// Normalise a repository reference to its `namespace/name` path
///
/// A default registry prefix, a `:tag` suffix and a `@digest` suffix are
/// stripped. Names without a namespace live under `library/`.
pub fn repository_path(reference: &str) -> String {
    split_reference(reference).0
}

/// Split a reference into its `namespace/name` path and its tag, if any
pub fn split_reference(reference: &str) -> (String, Option<String>) {
    let mut name = reference.trim();
    for prefix in DEFAULT_REGISTRY_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest;
            break;
        }
    }
    if let Some((before, _digest)) = name.split_once('@') {
        name = before;
    }

    // A colon before the last slash belongs to a host:port, not to a tag.
    let mut tag = None;
    if let Some(idx) = name.rfind(':') {
        if name[idx..].find('/').is_none() {
            tag = Some(name[idx + 1..].to_string()).filter(|t| !t.is_empty());
            name = &name[..idx];
        }
    }

    let path = if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", OFFICIAL_NAMESPACE, name)
    };
    (path, tag)
}

impl HubClient {
    /// Repositories of `account`, most recently updated last
    ///
    /// An empty `account` means the account of the current session.
    pub async fn get_repositories(&self, account: &str, exhaustive: bool) -> HubResult<Listing<Repository>> {
        let account = if account.is_empty() { self.account()? } else { account };
        let path = format!("{}{}", REPOSITORIES_PATH, account);
        let url = self.first_page_url(&path, &[("ordering", "last_updated")])?;
        let listing: Listing<RepositoryRecord> = self.fetch_all(&url, exhaustive).await?;
        Ok(listing.map(Repository::from))
    }

    /// Number of private repositories of `account`, over every page
    pub async fn count_private_repositories(&self, account: &str) -> HubResult<usize> {
        let listing = self.get_repositories(account, true).await?;
        Ok(listing.items.iter().filter(|r| r.is_private).count())
    }

    pub async fn remove_repository(&self, repository: &str) -> HubResult<()> {
        let url = self.url(&format!("{}{}/", REPOSITORIES_PATH, repository_path(repository)));
        tracing::info!("Removing repository {}", repository);
        self.delete(&url).await
    }
}
