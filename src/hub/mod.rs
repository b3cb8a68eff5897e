//! Docker Hub API client
//!
//! - `auth`: Password login, second factor, token expiry
//! - `client`: HTTP plumbing shared by every endpoint
//! - `errors`: Error taxonomy and status classification
//! - `pagination`: Paginated list envelope
//! - `organizations`: Organizations, teams and members, aggregated concurrently
//! - `repositories`, `tags`, `tokens`, `account`: Remaining resources
//! - `rate_limit`: Pull quota probe

pub mod account;
pub mod auth;
pub mod client;
pub mod errors;
pub mod model;
pub mod organizations;
pub mod pagination;
pub mod rate_limit;
pub mod repositories;
pub mod tags;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{LoginTokens, Session, is_token_expired};
pub use client::HubClient;
pub use errors::{HubError, HubResult};
pub use pagination::Listing;
pub use rate_limit::{LadderCredentials, RateLimits};
