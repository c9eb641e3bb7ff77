//! Canonical Azure Resource Manager URIs.
//!
//! Every function here is pure: it shapes a URL and never checks that the
//! resource exists. Segments are percent-encoded individually (including `/`
//! and `%`), so distinct inputs always produce distinct URIs.

use url::Url;

use crate::error::{AciError, AciResult};

/// API version for the `Microsoft.Resources` resource-group endpoints.
pub const RESOURCE_GROUPS_API_VERSION: &str = "2018-05-01";

/// A provider-scoped ARM resource type, e.g. `Microsoft.ContainerInstance/containerGroups`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceType {
    /// The resource provider namespace.
    pub provider: &'static str,
    /// The resource type collection name.
    pub type_name: &'static str,
    /// The `api-version` query value sent with every request for this type.
    pub api_version: &'static str,
}

/// The `Microsoft.ContainerInstance` container-group resource type.
pub const CONTAINER_GROUPS: ResourceType = ResourceType {
    provider: "Microsoft.ContainerInstance",
    type_name: "containerGroups",
    api_version: "2018-10-01",
};

fn check_segment(kind: &str, value: &str) -> AciResult<()> {
    if value.is_empty() {
        return Err(AciError::InvalidResourceName(format!("{kind} cannot be empty")));
    }
    // URL parsers collapse dot segments, so no URI can address them.
    if value == "." || value == ".." {
        return Err(AciError::InvalidResourceName(format!(
            "{kind} cannot be '{value}'"
        )));
    }
    Ok(())
}

fn with_segments<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
    api_version: &str,
) -> AciResult<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| AciError::invalid_endpoint(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

/// Build the URI of a resource group.
///
/// `/subscriptions/{sub}/resourcegroups/{rg}?api-version=...`
pub fn resource_group_uri(base: &Url, subscription_id: &str, resource_group: &str) -> AciResult<Url> {
    check_segment("subscription id", subscription_id)?;
    check_segment("resource group", resource_group)?;

    with_segments(
        base,
        ["subscriptions", subscription_id, "resourcegroups", resource_group],
        RESOURCE_GROUPS_API_VERSION,
    )
}

/// Build the URI of a provider resource, or of its collection when `name` is `None`.
///
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider}/{type}[/{name}]?api-version=...`
pub fn resource_uri(
    base: &Url,
    subscription_id: &str,
    resource_group: &str,
    resource_type: &ResourceType,
    name: Option<&str>,
) -> AciResult<Url> {
    check_segment("subscription id", subscription_id)?;
    check_segment("resource group", resource_group)?;
    if let Some(name) = name {
        check_segment("resource name", name)?;
    }

    let segments = [
        "subscriptions",
        subscription_id,
        "resourceGroups",
        resource_group,
        "providers",
        resource_type.provider,
        resource_type.type_name,
    ]
    .into_iter()
    .chain(name);

    with_segments(base, segments, resource_type.api_version)
}

/// Build the URI of a single container group.
pub fn container_group_uri(
    base: &Url,
    subscription_id: &str,
    resource_group: &str,
    name: &str,
) -> AciResult<Url> {
    resource_uri(base, subscription_id, resource_group, &CONTAINER_GROUPS, Some(name))
}

/// Build the URI listing every container group in a resource group.
pub fn container_groups_uri(base: &Url, subscription_id: &str, resource_group: &str) -> AciResult<Url> {
    resource_uri(base, subscription_id, resource_group, &CONTAINER_GROUPS, None)
}
