//! Resource Resolver
//!
//! Turns a human-readable name into the one resource id it denotes. The
//! server-side `eq` filter only narrows the candidate list; the match that
//! counts is the case-insensitive comparison done here.

use super::error::ScimError;
use super::types::{ListResponse, ResourceRef, ResourceType};
use crate::client::IdmClient;
use anyhow::Context;
use serde_json::Value;

/// Page size used for name lookups. Everything is fetched in one page.
pub const MAX_PAGE_SIZE: usize = 10000;

/// One page of resources returned by a list call
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub items: Vec<Value>,
    pub total_results: u64,
}

/// Build a SCIM equality filter: `<attr> eq "<value>"`
pub fn name_filter(attr: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{} eq \"{}\"", attr, escaped)
}

/// Build the list path: `scim/<collection>?count=<n>&filter=<expr>`.
/// Query parameters are left out when not given.
pub fn list_path(resource_type: ResourceType, count: Option<usize>, filter: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(count) = count {
        query.append_pair("count", &count.to_string());
    }
    if let Some(filter) = filter {
        query.append_pair("filter", filter);
    }
    let query = query.finish();

    if query.is_empty() {
        format!("scim/{}", resource_type.collection())
    } else {
        format!("scim/{}?{}", resource_type.collection(), query)
    }
}

/// List resources of a type, optionally bounded and filtered
pub async fn list_resources(
    client: &IdmClient,
    resource_type: ResourceType,
    count: Option<usize>,
    filter: Option<&str>,
) -> Result<ListPage, ScimError> {
    let path = list_path(resource_type, count, filter);
    let response = client.get(&path).await?;

    let list: ListResponse = serde_json::from_value(response)
        .with_context(|| format!("Unexpected list response for {}", resource_type))?;

    Ok(ListPage {
        items: list.resources,
        total_results: list.total_results,
    })
}

/// List resources matching a server-side filter expression
pub async fn list_by_filter(
    client: &IdmClient,
    resource_type: ResourceType,
    filter: &str,
    page_size: usize,
) -> Result<ListPage, ScimError> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    list_resources(client, resource_type, Some(page_size), Some(filter)).await
}

fn caseless_equal(name: &str, candidate: Option<&Value>) -> bool {
    match candidate.and_then(Value::as_str) {
        Some(value) => value.to_lowercase() == name.to_lowercase(),
        None => false,
    }
}

/// Pick the single item whose `name_attr` equals `name`, ignoring case
pub fn select_unique<'a>(
    items: &'a [Value],
    resource_type: ResourceType,
    name_attr: &str,
    name: &str,
) -> Result<&'a Value, ScimError> {
    let mut found: Option<&Value> = None;

    for item in items {
        if caseless_equal(name, item.get(name_attr)) {
            if found.is_some() {
                return Err(ScimError::ambiguous(resource_type, name));
            }
            found = Some(item);
        }
    }

    found.ok_or_else(|| ScimError::not_found(resource_type, name))
}

/// Read the `id` of a resource record
pub fn extract_id(item: &Value, name: &str) -> Result<String, ScimError> {
    item.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ScimError::MalformedResource {
            name: name.to_string(),
        })
}

/// Fetch the full record of the resource named `name`
pub async fn get_by_name(
    client: &IdmClient,
    resource_type: ResourceType,
    name_attr: &str,
    name: &str,
) -> Result<Value, ScimError> {
    let filter = name_filter(name_attr, name);
    let page = list_by_filter(client, resource_type, &filter, MAX_PAGE_SIZE).await?;
    tracing::debug!(
        "{} candidate {} for {} {:?}",
        page.items.len(),
        resource_type,
        name_attr,
        name
    );

    select_unique(&page.items, resource_type, name_attr, name).cloned()
}

/// Resolve a name to exactly one resource reference
pub async fn resolve_by_name(
    client: &IdmClient,
    resource_type: ResourceType,
    name_attr: &str,
    name: &str,
) -> Result<ResourceRef, ScimError> {
    let item = get_by_name(client, resource_type, name_attr, name).await?;
    let id = extract_id(&item, name)?;

    Ok(ResourceRef { resource_type, id })
}
