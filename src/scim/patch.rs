//! Patch Builder
//!
//! Partial-update payloads for user attributes and group/role membership,
//! and the method-override call that applies them.

use super::error::ScimError;
use super::types::{
    BasicUser, DispValue, MemberOperation, MemberValue, MembershipPatch, NameAttr, ResourceType,
    UserAccount, CORE_SCHEMA_URN,
};
use crate::client::IdmClient;
use serde::Serialize;

/// Tracks which user attributes were explicitly set.
///
/// Only set fields end up in the payload. Setting a field to an empty
/// string still sends it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributePatch {
    given_name: Option<String>,
    family_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl AttributePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn given_name(mut self, value: impl Into<String>) -> Self {
        self.given_name = Some(value.into());
        self
    }

    pub fn family_name(mut self, value: impl Into<String>) -> Self {
        self.family_name = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn password(mut self, value: impl Into<String>) -> Self {
        self.password = Some(value.into());
        self
    }

    /// True when no field has been set
    pub fn is_empty(&self) -> bool {
        self.given_name.is_none()
            && self.family_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
    }

    /// Build the request body, always stamped with the core schema
    pub fn into_payload(self) -> UserAccount {
        let name = if self.given_name.is_some() || self.family_name.is_some() {
            Some(NameAttr {
                given_name: self.given_name,
                family_name: self.family_name,
            })
        } else {
            None
        };

        UserAccount {
            schemas: vec![CORE_SCHEMA_URN.to_string()],
            name,
            emails: self.email.map(|email| vec![DispValue::value(email)]),
            password: self.password,
            ..Default::default()
        }
    }
}

/// Attribute patch carrying only the non-empty fields of `fields`.
/// The user name itself is the lookup key and is never patched.
pub fn build_attribute_patch(fields: &BasicUser) -> UserAccount {
    let mut patch = AttributePatch::new();
    if !fields.given.is_empty() {
        patch = patch.given_name(fields.given.as_str());
    }
    if !fields.family.is_empty() {
        patch = patch.family_name(fields.family.as_str());
    }
    if !fields.email.is_empty() {
        patch = patch.email(fields.email.as_str());
    }
    if !fields.pwd.is_empty() {
        patch = patch.password(fields.pwd.as_str());
    }
    patch.into_payload()
}

/// Membership patch adding or removing one user
pub fn build_membership_patch(subject_id: &str, remove: bool) -> MembershipPatch {
    MembershipPatch {
        schemas: vec![CORE_SCHEMA_URN.to_string()],
        members: vec![MemberValue {
            value: subject_id.to_string(),
            kind: "User".to_string(),
            operation: remove.then_some(MemberOperation::Delete),
        }],
    }
}

/// Send a partial update to `scim/<collection>/<id>`
pub async fn apply_patch<T: Serialize>(
    client: &IdmClient,
    resource_type: ResourceType,
    id: &str,
    payload: &T,
) -> Result<(), ScimError> {
    let body = serde_json::to_value(payload)?;
    let path = resource_type.resource_path(id);
    client.patch(&path, &body).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_membership_patch_add_has_no_operation() {
        let patch = build_membership_patch("u1", false);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "schemas": [CORE_SCHEMA_URN],
                "members": [{"value": "u1", "type": "User"}]
            })
        );
    }

    #[test]
    fn test_membership_patch_remove_marks_delete() {
        let patch = build_membership_patch("u1", true);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "schemas": [CORE_SCHEMA_URN],
                "members": [{"value": "u1", "type": "User", "operation": "delete"}]
            })
        );
    }

    #[test]
    fn test_attribute_patch_omits_blank_fields() {
        let fields = BasicUser {
            name: "alice".to_string(),
            family: "Smith".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(build_attribute_patch(&fields)).unwrap(),
            json!({
                "schemas": [CORE_SCHEMA_URN],
                "name": {"familyName": "Smith"}
            })
        );
    }

    #[test]
    fn test_attribute_patch_all_blank_is_schema_only() {
        let payload = build_attribute_patch(&BasicUser::default());
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({"schemas": [CORE_SCHEMA_URN]})
        );
    }

    #[test]
    fn test_explicit_empty_value_is_sent() {
        let payload = AttributePatch::new().email("").into_payload();
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({"schemas": [CORE_SCHEMA_URN], "emails": [{"value": ""}]})
        );
    }

    #[test]
    fn test_password_patch() {
        let payload = AttributePatch::new().password("n3w").into_payload();
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({"schemas": [CORE_SCHEMA_URN], "password": "n3w"})
        );
    }

    #[tokio::test]
    async fn test_apply_patch_uses_method_override() {
        let server = MockServer::start().await;
        let patch = build_membership_patch("u1", true);

        Mock::given(method("POST"))
            .and(path("/scim/Groups/g-1"))
            .and(header("X-HTTP-Method-Override", "PATCH"))
            .and(body_json(&patch))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = IdmClient::new(&server.uri(), "test-token").unwrap();
        apply_patch(&client, ResourceType::Group, "g-1", &patch)
            .await
            .unwrap();
    }
}
