//! Command handlers
//!
//! Each handler resolves names, performs one mutation or read, and reports
//! the outcome. Failures are reported and end that command only.

use crate::client::IdmClient;
use crate::output::Report;
use crate::scim::{
    apply_patch, build_attribute_patch, build_membership_patch, get_by_name, list_resources,
    resolve_by_name, AttributePatch, BasicUser, DispValue, NameAttr, ResourceType, ScimError,
    UserAccount, CORE_SCHEMA_URN,
};
use anyhow::{Context, Result};
use std::path::Path;

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Resolve a name to an id, reporting any failure.
/// `None` means the caller should abort.
pub async fn resolve_id_or_log(
    client: &IdmClient,
    report: &mut dyn Report,
    resource_type: ResourceType,
    name_attr: &str,
    name: &str,
) -> Option<String> {
    match resolve_by_name(client, resource_type, name_attr, name).await {
        Ok(resource) => Some(resource.id),
        Err(e) => {
            report.err(&format!(
                "Error getting SCIM {} ID of {}: {}",
                resource_type, name, e
            ));
            None
        }
    }
}

/// Account to create for a basic user record.
/// Blank name parts default to the user name, a blank email to
/// `<name>@example.com`.
pub fn new_account(user: &BasicUser) -> UserAccount {
    UserAccount {
        schemas: vec![CORE_SCHEMA_URN.to_string()],
        user_name: Some(user.name.clone()),
        name: Some(NameAttr {
            given_name: Some(or_default(&user.given, &user.name)),
            family_name: Some(or_default(&user.family, &user.name)),
        }),
        emails: Some(vec![DispValue::value(or_default(
            &user.email,
            &format!("{}@example.com", user.name),
        ))]),
        password: (!user.pwd.is_empty()).then(|| user.pwd.clone()),
        ..Default::default()
    }
}

/// Create a user, returning the account the server sent back
pub async fn add_user(
    client: &IdmClient,
    report: &mut dyn Report,
    user: &BasicUser,
) -> Result<UserAccount, ScimError> {
    let account = new_account(user);

    let shown = UserAccount {
        password: None,
        ..account.clone()
    };
    report.pp("add user: ", &serde_json::to_value(&shown)?);

    let body = serde_json::to_value(&account)?;
    let created = client.post("scim/Users", &body).await?;
    if created.is_null() {
        return Ok(shown);
    }
    serde_json::from_value(created).map_err(ScimError::Decode)
}

pub async fn cmd_add_user(client: &IdmClient, report: &mut dyn Report, user: &BasicUser) {
    match add_user(client, report, user).await {
        Ok(_) => report.info("User successfully added"),
        Err(e) => report.err(&format!("Error creating user: {}", e)),
    }
}

/// Read bulk user records from a YAML file
pub fn load_users_file(path: &Path) -> Result<Vec<BasicUser>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Create every user listed in a YAML file, one at a time.
/// A failed record is reported with its 1-based line and the batch goes on.
/// Returns the number of users created.
pub async fn cmd_load_users(client: &IdmClient, report: &mut dyn Report, path: &Path) -> usize {
    let users = match load_users_file(path) {
        Ok(users) => users,
        Err(e) => {
            report.err(&format!("could not read file of bulk users: {:#}", e));
            return 0;
        }
    };

    let mut added = 0;
    for (index, user) in users.iter().enumerate() {
        match add_user(client, report, user).await {
            Ok(_) => {
                report.info(&format!("added user {}", user.name));
                added += 1;
            }
            Err(e) => report.err(&format!(
                "Error adding user, line {}, name {}: {}",
                index + 1,
                user.name,
                e
            )),
        }
    }
    tracing::info!("bulk load: {} of {} users added", added, users.len());
    added
}

/// Update name parts and email of an existing user
pub async fn cmd_update_user(client: &IdmClient, report: &mut dyn Report, user: &BasicUser) {
    let Some(id) = resolve_id_or_log(
        client,
        report,
        ResourceType::User,
        ResourceType::User.name_attribute(),
        &user.name,
    )
    .await
    else {
        return;
    };

    let fields = BasicUser {
        pwd: String::new(),
        ..user.clone()
    };
    match apply_patch(client, ResourceType::User, &id, &build_attribute_patch(&fields)).await {
        Ok(()) => report.info(&format!("User \"{}\" updated", user.name)),
        Err(e) => report.err(&format!("Error updating user \"{}\": {}", user.name, e)),
    }
}

pub async fn cmd_set_password(
    client: &IdmClient,
    report: &mut dyn Report,
    name: &str,
    password: &str,
) {
    let Some(id) = resolve_id_or_log(
        client,
        report,
        ResourceType::User,
        ResourceType::User.name_attribute(),
        name,
    )
    .await
    else {
        return;
    };

    let payload = AttributePatch::new().password(password).into_payload();
    match apply_patch(client, ResourceType::User, &id, &payload).await {
        Ok(()) => report.info(&format!("User \"{}\" updated", name)),
        Err(e) => report.err(&format!("Error updating user {}: {}", name, e)),
    }
}

/// Add a user to, or remove a user from, a group or role
pub async fn cmd_member(
    client: &IdmClient,
    report: &mut dyn Report,
    resource_type: ResourceType,
    resource_name: &str,
    user_name: &str,
    remove: bool,
) {
    let resource_id = resolve_id_or_log(
        client,
        report,
        resource_type,
        resource_type.name_attribute(),
        resource_name,
    )
    .await;
    let user_id = resolve_id_or_log(
        client,
        report,
        ResourceType::User,
        ResourceType::User.name_attribute(),
        user_name,
    )
    .await;
    let (Some(resource_id), Some(user_id)) = (resource_id, user_id) else {
        return;
    };

    let patch = build_membership_patch(&user_id, remove);
    match apply_patch(client, resource_type, &resource_id, &patch).await {
        Ok(()) => report.info(&format!(
            "Updated SCIM resource {} of type {}",
            resource_name, resource_type
        )),
        Err(e) => report.err(&format!(
            "Error updating SCIM resource {} of type {}: {}",
            resource_name, resource_type, e
        )),
    }
}

/// Print the full record of a named resource
pub async fn cmd_get(
    client: &IdmClient,
    report: &mut dyn Report,
    resource_type: ResourceType,
    name: &str,
) {
    match get_by_name(client, resource_type, resource_type.name_attribute(), name).await {
        Ok(item) => report.pp("", &item),
        Err(e) => report.err(&format!(
            "Error getting SCIM resource named {} of type {}: {}",
            name, resource_type, e
        )),
    }
}

pub async fn cmd_delete(
    client: &IdmClient,
    report: &mut dyn Report,
    resource_type: ResourceType,
    name: &str,
) {
    let Some(id) =
        resolve_id_or_log(client, report, resource_type, resource_type.name_attribute(), name)
            .await
    else {
        return;
    };

    match client.delete(&resource_type.resource_path(&id)).await {
        Ok(_) => report.info(&format!("{} \"{}\" deleted", resource_type, name)),
        Err(e) => report.err(&format!("Error deleting {} {}: {}", resource_type, name, e)),
    }
}

/// List resources; a zero count or empty filter is left off the query
pub async fn cmd_list(
    client: &IdmClient,
    report: &mut dyn Report,
    resource_type: ResourceType,
    count: usize,
    filter: &str,
) {
    let count = (count > 0).then_some(count);
    let filter = (!filter.is_empty()).then_some(filter);

    match list_resources(client, resource_type, count, filter).await {
        Ok(page) => {
            tracing::debug!(
                "listed {} of {} {}",
                page.items.len(),
                page.total_results,
                resource_type
            );
            report.ppf(
                resource_type.collection(),
                &serde_json::Value::Array(page.items),
                resource_type.summary_fields(),
            );
        }
        Err(e) => report.err(&format!(
            "Error getting SCIM resources of type {}: {}",
            resource_type, e
        )),
    }
}
