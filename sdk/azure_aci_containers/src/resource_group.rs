//! Resource group management.
//!
//! Container groups live inside a resource group. These functions cover the
//! small slice of the `Microsoft.Resources` API needed to create a scope for
//! container groups and tear it down again.

use azure_aci_core::client::AciClient;
use azure_aci_core::codec;
use azure_aci_core::error::AciResult;
use azure_aci_core::resource::resource_group_uri;
use serde::{Deserialize, Serialize};

use crate::models::{DeleteOutcome, Tags};

/// A resource group as declared by the caller or reported by ARM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub location: String,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ResourceGroup {
    /// A resource group declaration for `location` with no tags.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            location: location.into(),
            tags: Tags::new(),
            properties: None,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Check whether a resource group exists.
///
/// Issues a `HEAD` request. ARM answers 204 when the group exists and 404
/// when it does not; any other status is returned as an error.
#[tracing::instrument(name = "aci::resource_groups::exists", skip(client))]
pub async fn exists(client: &AciClient, resource_group: &str) -> AciResult<bool> {
    let url = resource_group_uri(client.endpoint(), client.subscription_id(), resource_group)?;
    let response = client.head(url).await?;

    match response.status() {
        404 => Ok(false),
        _ if response.is_success() => Ok(true),
        _ => Err(response.into_error()),
    }
}

/// Create or update a resource group.
#[tracing::instrument(
    name = "aci::resource_groups::create",
    skip(client, group),
    fields(location = %group.location)
)]
pub async fn create(client: &AciClient, resource_group: &str, group: &ResourceGroup) -> AciResult<ResourceGroup> {
    tracing::debug!("creating resource group");

    let url = resource_group_uri(client.endpoint(), client.subscription_id(), resource_group)?;
    let response = client.put(url, codec::encode(group)?).await?;
    response.decode()
}

/// Get a resource group.
#[tracing::instrument(name = "aci::resource_groups::get", skip(client))]
pub async fn get(client: &AciClient, resource_group: &str) -> AciResult<ResourceGroup> {
    let url = resource_group_uri(client.endpoint(), client.subscription_id(), resource_group)?;
    let response = client.get(url).await?;
    response.decode()
}

/// Request deletion of a resource group and everything in it.
///
/// ARM usually answers 202 and finishes the delete in the background.
#[tracing::instrument(name = "aci::resource_groups::delete", skip(client))]
pub async fn delete(client: &AciClient, resource_group: &str) -> AciResult<DeleteOutcome> {
    tracing::debug!("deleting resource group");

    let url = resource_group_uri(client.endpoint(), client.subscription_id(), resource_group)?;
    let response = client.delete(url).await?;

    DeleteOutcome::from_status(response.status()).ok_or_else(|| response.into_error())
}
