//! Entitlement Assigner
//!
//! Grants catalog applications to users and groups through the bulk
//! entitlement endpoint, and reads existing entitlements back.

use crate::client::IdmClient;
use crate::output::Report;
use crate::scim::{resolve_by_name, ResourceType, ScimError};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Path for creating entitlements
pub const ENTITLEMENTS_PATH: &str = "entitlements/definitions";

/// Fields shown when listing entitlements
pub const ENTITLEMENT_SUMMARY_FIELDS: &[&str] = &[
    "catalogItemId",
    "subjectType",
    "subjectId",
    "activationPolicy",
];

/// Kind of subject an entitlement is granted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectType {
    User,
    Group,
}

struct SubjectTypeInfo {
    label: &'static str,
    wire: &'static str,
    category: &'static str,
    resource_type: ResourceType,
}

const USER_INFO: SubjectTypeInfo = SubjectTypeInfo {
    label: "user",
    wire: "USERS",
    category: "users",
    resource_type: ResourceType::User,
};

const GROUP_INFO: SubjectTypeInfo = SubjectTypeInfo {
    label: "group",
    wire: "GROUPS",
    category: "groups",
    resource_type: ResourceType::Group,
};

impl SubjectType {
    fn info(self) -> &'static SubjectTypeInfo {
        match self {
            SubjectType::User => &USER_INFO,
            SubjectType::Group => &GROUP_INFO,
        }
    }

    /// Token used in entitlement bodies: `USERS` / `GROUPS`
    pub fn wire_name(self) -> &'static str {
        self.info().wire
    }

    /// Category used in entitlement read paths: `users` / `groups`
    pub fn category(self) -> &'static str {
        self.info().category
    }

    /// SCIM collection the subject is resolved in
    pub fn resource_type(self) -> ResourceType {
        self.info().resource_type
    }

    /// Attribute the subject is looked up by
    pub fn name_attribute(self) -> &'static str {
        self.resource_type().name_attribute()
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().label)
    }
}

impl Serialize for SubjectType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

/// What an entitlement listing is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EntitlementTarget {
    User,
    Group,
    App,
}

impl EntitlementTarget {
    /// Category segment of `entitlements/definitions/<category>/<id>`
    pub fn category(self) -> &'static str {
        match self {
            EntitlementTarget::User => SubjectType::User.category(),
            EntitlementTarget::Group => SubjectType::Group.category(),
            EntitlementTarget::App => "catalogitems",
        }
    }

    /// Subject to resolve by name; apps are addressed by catalog item id
    pub fn subject_type(self) -> Option<SubjectType> {
        match self {
            EntitlementTarget::User => Some(SubjectType::User),
            EntitlementTarget::Group => Some(SubjectType::Group),
            EntitlementTarget::App => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivationPolicy {
    Automatic,
}

/// A grant of one catalog item to one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub catalog_item_id: String,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub activation_policy: ActivationPolicy,
}

#[derive(Debug, Clone, Serialize)]
struct BulkOperation {
    method: &'static str,
    data: Entitlement,
}

/// Bulk-operation envelope for entitlement creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    return_payload_on_error: bool,
    operations: Vec<BulkOperation>,
}

/// Envelope with a single POST creating an automatic entitlement
pub fn build_entitlement_request(
    subject_id: &str,
    subject_type: SubjectType,
    catalog_item_id: &str,
) -> BulkRequest {
    BulkRequest {
        return_payload_on_error: true,
        operations: vec![BulkOperation {
            method: "POST",
            data: Entitlement {
                catalog_item_id: catalog_item_id.to_string(),
                subject_type,
                subject_id: subject_id.to_string(),
                activation_policy: ActivationPolicy::Automatic,
            },
        }],
    }
}

/// Grant a catalog item to a subject id
pub async fn entitle_subject(
    client: &IdmClient,
    subject_id: &str,
    subject_type: SubjectType,
    catalog_item_id: &str,
) -> Result<(), ScimError> {
    let request = build_entitlement_request(subject_id, subject_type, catalog_item_id);
    let body = serde_json::to_value(&request)?;
    client
        .post_media(
            ENTITLEMENTS_PATH,
            &body,
            "bulk.sync.response",
            "entitlements.definition.bulk",
        )
        .await?;
    Ok(())
}

async fn resolve_and_entitle(
    client: &IdmClient,
    catalog_item_id: &str,
    subject_name: &str,
    subject_type: SubjectType,
) -> Result<(), ScimError> {
    let subject = resolve_by_name(
        client,
        subject_type.resource_type(),
        subject_type.name_attribute(),
        subject_name,
    )
    .await?;
    entitle_subject(client, &subject.id, subject_type, catalog_item_id).await
}

/// Entitle a subject by name, if one was given.
///
/// An empty `subject_name` does nothing. Returns whether an entitlement
/// was created.
pub async fn maybe_entitle(
    client: &IdmClient,
    report: &mut dyn Report,
    catalog_item_id: &str,
    subject_name: &str,
    subject_type: SubjectType,
    app_name: &str,
) -> bool {
    if subject_name.is_empty() {
        return false;
    }

    match resolve_and_entitle(client, catalog_item_id, subject_name, subject_type).await {
        Ok(()) => {
            report.info(&format!(
                "Entitled {} \"{}\" to app \"{}\".",
                subject_type, subject_name, app_name
            ));
            true
        }
        Err(e) => {
            report.err(&format!(
                "Could not entitle {} \"{}\" to app \"{}\", error: {}",
                subject_type, subject_name, app_name, e
            ));
            false
        }
    }
}

/// Fetch the entitlements of a user, group or app
pub async fn fetch_entitlements(
    client: &IdmClient,
    target: EntitlementTarget,
    id: &str,
) -> Result<Value, ScimError> {
    let path = format!(
        "{}/{}/{}",
        ENTITLEMENTS_PATH,
        target.category(),
        urlencoding::encode(id)
    );
    let body = client.get(&path).await?;
    Ok(body.get("items").cloned().unwrap_or(Value::Null))
}

/// Print the entitlements of a user or group (by name) or app (by id)
pub async fn get_entitlement(
    client: &IdmClient,
    report: &mut dyn Report,
    target: EntitlementTarget,
    name: &str,
) {
    let id = match target.subject_type() {
        Some(subject_type) => {
            match crate::commands::resolve_id_or_log(
                client,
                report,
                subject_type.resource_type(),
                subject_type.name_attribute(),
                name,
            )
            .await
            {
                Some(id) => id,
                None => return,
            }
        }
        None => name.to_string(),
    };

    match fetch_entitlements(client, target, &id).await {
        Ok(items) => report.ppf("Entitlements", &items, ENTITLEMENT_SUMMARY_FIELDS),
        Err(e) => report.err(&format!("Error: {}", e)),
    }
}
