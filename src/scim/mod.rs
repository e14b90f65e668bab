//! SCIM resource layer
//!
//! Name resolution and partial updates against the SCIM 1.0 resource API.
//!
//! - [`resolver`] - Resolves human-readable names to resource ids
//! - [`patch`] - Builds and applies attribute and membership patches
//! - [`types`] - Wire shapes for users, memberships and list responses
//! - [`error`] - Error kinds shared by the layer

pub mod error;
pub mod patch;
pub mod resolver;
pub mod types;

pub use error::ScimError;
pub use patch::{apply_patch, build_attribute_patch, build_membership_patch, AttributePatch};
pub use resolver::{
    get_by_name, list_by_filter, list_resources, resolve_by_name, ListPage, MAX_PAGE_SIZE,
};
pub use types::*;
