//! idmctl - command-line client for SCIM-style identity directories
//!
//! Resolves users, groups and roles by name, provisions and patches them,
//! manages group/role membership and grants catalog applications.

pub mod client;
pub mod commands;
pub mod config;
pub mod entitlement;
pub mod output;
pub mod scim;

/// Version injected at compile time via IDMCTL_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("IDMCTL_VERSION") {
    Some(v) => v,
    None => "dev",
};
