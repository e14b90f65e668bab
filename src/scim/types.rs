//! Wire shapes for the SCIM 1.0 resource API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Core schema URN stamped on every top-level request body
pub const CORE_SCHEMA_URN: &str = "urn:scim:schemas:core:1.0";

/// Key of the workspace extension block on user accounts
pub const WORKSPACE_EXTENSION_URN: &str = "urn:scim:schemas:extension:workspace:1.0";

/// SCIM resource collections this client works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    User,
    Group,
    Role,
}

impl ResourceType {
    /// Collection name used in `scim/<collection>` paths
    pub fn collection(self) -> &'static str {
        match self {
            ResourceType::User => "Users",
            ResourceType::Group => "Groups",
            ResourceType::Role => "Roles",
        }
    }

    /// Attribute holding the human-readable name
    pub fn name_attribute(self) -> &'static str {
        match self {
            ResourceType::User => "userName",
            ResourceType::Group | ResourceType::Role => "displayName",
        }
    }

    /// Fields shown when listing resources of this type
    pub fn summary_fields(self) -> &'static [&'static str] {
        match self {
            ResourceType::User => &["userName", "id", "emails.0.value"],
            ResourceType::Group | ResourceType::Role => &["displayName", "id"],
        }
    }

    /// Path of a single resource: `scim/<collection>/<id>`
    pub fn resource_path(self, id: &str) -> String {
        format!("scim/{}/{}", self.collection(), urlencoding::encode(id))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// A resolved resource: its type and server-assigned id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub resource_type: ResourceType,
    pub id: String,
}

/// A `{display, value}` pair used for emails, groups and roles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl DispValue {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            display: None,
            value: Some(value.into()),
        }
    }
}

/// Structured user name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameAttr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

/// Server-maintained resource metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Workspace extension block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_status: Option<String>,
}

/// SCIM user account. Also used as the attribute patch body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<DispValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<DispValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<DispValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<NameAttr>,
    #[serde(
        rename = "urn:scim:schemas:extension:workspace:1.0",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workspace: Option<WorkspaceExtension>,
    /// Write-only; never read back from the server
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Member operation. Absent means "add".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberOperation {
    Delete,
}

/// One entry in a membership patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberValue {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<MemberOperation>,
}

/// Group or role membership patch body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPatch {
    pub schemas: Vec<String>,
    pub members: Vec<MemberValue>,
}

/// Flat user record used for ad-hoc and bulk user creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pwd: String,
}

/// SCIM list response envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(rename = "Resources", default)]
    pub resources: Vec<Value>,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub items_per_page: u64,
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub schemas: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_type_lookup() {
        assert_eq!(ResourceType::User.collection(), "Users");
        assert_eq!(ResourceType::User.name_attribute(), "userName");
        assert_eq!(ResourceType::Role.name_attribute(), "displayName");
        assert_eq!(ResourceType::Group.to_string(), "Groups");
    }

    #[test]
    fn test_resource_path_encodes_id() {
        assert_eq!(ResourceType::Group.resource_path("g-1"), "scim/Groups/g-1");
        assert_eq!(ResourceType::User.resource_path("a b"), "scim/Users/a%20b");
    }

    #[test]
    fn test_password_is_never_read_back() {
        let acct: UserAccount = serde_json::from_value(json!({
            "userName": "alice",
            "password": "secret",
            "urn:scim:schemas:extension:workspace:1.0": {
                "internalUserType": "LOCAL",
                "userStatus": "1"
            }
        }))
        .unwrap();

        assert_eq!(acct.password, None);
        let ext = acct.workspace.unwrap();
        assert_eq!(ext.internal_user_type.as_deref(), Some("LOCAL"));
    }

    #[test]
    fn test_user_account_omits_unset_fields() {
        let acct = UserAccount {
            schemas: vec![CORE_SCHEMA_URN.to_string()],
            user_name: Some("alice".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&acct).unwrap(),
            json!({"schemas": [CORE_SCHEMA_URN], "userName": "alice"})
        );
    }

    #[test]
    fn test_basic_user_from_yaml() {
        let users: Vec<BasicUser> =
            serde_yaml::from_str("- {name: alice, pwd: s3cret}\n- name: bob\n  email: b@x.io\n")
                .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].pwd, "s3cret");
        assert_eq!(users[1].email, "b@x.io");
        assert!(users[1].given.is_empty());
    }

    #[test]
    fn test_list_response_decodes_envelope() {
        let list: ListResponse = serde_json::from_value(json!({
            "Resources": [{"id": "1"}],
            "totalResults": 1,
            "itemsPerPage": 1,
            "startIndex": 1,
            "schemas": [CORE_SCHEMA_URN]
        }))
        .unwrap();
        assert_eq!(list.resources.len(), 1);
        assert_eq!(list.total_results, 1);
    }
}
