//! Directory API transport
//!
//! This module provides the HTTP plumbing for talking to the directory
//! service: the raw request wrapper and the tenant-scoped client.
//!
//! # Module Structure
//!
//! - [`directory`] - Tenant-scoped client (base URL, token, method helpers)
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use idmctl::client::IdmClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = IdmClient::new("https://tenant.example.com/SAAS/jersey/manager/api", "token")?;
//!     let users = client.get("scim/Users?count=10").await?;
//!     Ok(())
//! }
//! ```

pub mod directory;
pub mod http;

pub use directory::{media_type, IdmClient, METHOD_OVERRIDE_HEADER};
