//! Hub data models
//!
//! - `account`: User and organization accounts, plans, consumption
//! - `organization`: Organizations, teams and members
//! - `repository`: Repositories
//! - `tag`: Tags and the images they point to
//! - `token`: Personal access tokens

pub mod account;
pub mod organization;
pub mod repository;
pub mod tag;
pub mod token;
