//! Error kinds for name resolution and resource mutation.

use super::types::ResourceType;
use thiserror::Error;

/// Errors returned by the resolver, patch and entitlement operations
#[derive(Debug, Error)]
pub enum ScimError {
    /// No resource matched the name
    #[error("no {resource_type} found named \"{name}\"")]
    NotFound {
        resource_type: ResourceType,
        name: String,
    },

    /// More than one resource matched the name
    #[error("multiple {resource_type} found named \"{name}\"")]
    AmbiguousName {
        resource_type: ResourceType,
        name: String,
    },

    /// The matching resource has no string `id`
    #[error("no id returned for \"{name}\"")]
    MalformedResource { name: String },

    /// Request body could not be encoded
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Server response did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Network or status failure from the transport, shown with its cause chain
    #[error("{0:#}")]
    Transport(#[from] anyhow::Error),
}

impl ScimError {
    pub fn not_found(resource_type: ResourceType, name: &str) -> Self {
        Self::NotFound {
            resource_type,
            name: name.to_string(),
        }
    }

    pub fn ambiguous(resource_type: ResourceType, name: &str) -> Self {
        Self::AmbiguousName {
            resource_type,
            name: name.to_string(),
        }
    }
}
