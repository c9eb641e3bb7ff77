//! Container group management for Azure Container Instances.
//!
//! A container group is the unit of deployment: a named set of containers
//! sharing a location, OS type, network identity and lifecycle. This module
//! provides the wire model and functions to create, retrieve, list and delete
//! groups. Each function performs a single ARM round trip and never retries;
//! callers that want resilience retry [`AciError::is_transient`] failures.
//!
//! ## Example
//!
//! ```rust,no_run
//! use azure_aci_core::client::AciClient;
//! use azure_aci_containers::container_group::{self, Container, ContainerGroup, ContainerPort};
//!
//! # async fn example(client: &AciClient) -> Result<(), Box<dyn std::error::Error>> {
//! let group = ContainerGroup::builder()
//!     .location("eastus")
//!     .container(
//!         Container::builder()
//!             .name("nginx")
//!             .image("nginx")
//!             .command(["nginx", "-g", "daemon off;"])
//!             .port(ContainerPort::tcp(80))
//!             .requests(1.0, 1.0)
//!             .limits(1.0, 1.0)
//!             .build()?,
//!     )
//!     .build()?;
//!
//! let created = container_group::create(client, "my-rg", "web", &group).await?;
//! println!("provisioning: {:?}", created.properties.provisioning_state);
//!
//! let (current, meta) = container_group::get(client, "my-rg", "web").await?;
//! println!("{} (request {:?})", current.name.unwrap_or_default(), meta.request_id);
//!
//! container_group::delete(client, "my-rg", "web").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Provisioning
//!
//! A successful [`create`] means ARM accepted the declaration. The returned
//! group's `provisioning_state` may still be `Pending` or `Creating`; this
//! module does not poll for completion.

use std::collections::HashSet;
use std::fmt;

use azure_aci_core::client::{AciClient, ResponseMetadata};
use azure_aci_core::codec;
use azure_aci_core::error::{AciError, AciResult};
use azure_aci_core::resource::{container_group_uri, container_groups_uri};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::{DeleteOutcome, Tags};

// ---------------------------------------------------------------------------
// Wire model
// ---------------------------------------------------------------------------

/// A container group as declared by the caller or reported by ARM.
///
/// `id`, `resource_type`, `provisioning_state` and the instance views are
/// populated by the service and omitted from requests when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerGroup {
    /// Fully qualified ARM resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Group name; set by the service from the request URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// ARM resource type, `Microsoft.ContainerInstance/containerGroups`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Azure region, e.g. `eastus`.
    pub location: String,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    pub properties: ContainerGroupProperties,
}

/// The `properties` object of a container group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerGroupProperties {
    pub os_type: OsType,

    /// Containers in declaration order.
    pub containers: Vec<Container>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IpAddress>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_registry_credentials: Vec<ImageRegistryCredential>,

    /// Service-reported lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<ProvisioningState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_view: Option<ContainerGroupInstanceView>,
}

/// Operating system of every container in the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    Linux,
    Windows,
}

/// What the service does when a container exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    Always,
    OnFailure,
    Never,
}

/// A single container within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub properties: ContainerProperties,
}

/// The `properties` object of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProperties {
    pub image: String,

    /// Entrypoint override, in argument order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<EnvironmentVariable>,

    /// `None` means "not declared", distinct from a zero request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_view: Option<ContainerInstanceView>,
}

/// Transport protocol of an exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP", alias = "Tcp", alias = "tcp")]
    Tcp,
    #[serde(rename = "UDP", alias = "Udp", alias = "udp")]
    Udp,
}

/// A port exposed by a container or by the group's IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    pub port: u16,
}

impl ContainerPort {
    pub fn tcp(port: u16) -> Self {
        Self {
            protocol: Some(Protocol::Tcp),
            port,
        }
    }

    pub fn udp(port: u16) -> Self {
        Self {
            protocol: Some(Protocol::Udp),
            port,
        }
    }
}

/// Resource requests and limits of a container.
///
/// ARM rejects a group whose containers declare no `requests`
/// (`ResourceSomeRequestsNotSpecified`); the client leaves that check to the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ComputeResources>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ComputeResources>,
}

/// CPU cores and memory in GB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputeResources {
    pub cpu: f64,
    #[serde(rename = "memoryInGB")]
    pub memory_in_gb: f64,
}

impl ComputeResources {
    pub fn new(cpu: f64, memory_in_gb: f64) -> Self {
        Self { cpu, memory_in_gb }
    }
}

/// An environment variable; secure values are never echoed back by ARM.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_value: Option<String>,
}

impl EnvironmentVariable {
    pub fn plain(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            secure_value: None,
        }
    }

    pub fn secure(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            secure_value: Some(value.into()),
        }
    }
}

impl fmt::Debug for EnvironmentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentVariable")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("secure_value", &self.secure_value.as_ref().map(|_| "****"))
            .finish()
    }
}

/// Credentials for pulling images from a private registry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegistryCredential {
    pub server: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for ImageRegistryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRegistryCredential")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

/// Whether the group's IP address is reachable from the internet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpAddressType {
    Public,
    Private,
}

/// The group's IP address. `ip` and `fqdn` are assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    pub ports: Vec<ContainerPort>,
    #[serde(rename = "type")]
    pub address_type: IpAddressType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
}

/// Service-reported provisioning state.
///
/// Unrecognised values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProvisioningState {
    Pending,
    Creating,
    Succeeded,
    Failed,
    Deleting,
    Updating,
    Canceled,
    Other(String),
}

impl ProvisioningState {
    /// Whether provisioning has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Creating => "Creating",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Deleting => "Deleting",
            Self::Updating => "Updating",
            Self::Canceled => "Canceled",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ProvisioningState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => Self::Pending,
            "Creating" => Self::Creating,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Deleting" => Self::Deleting,
            "Updating" => Self::Updating,
            "Canceled" => Self::Canceled,
            _ => Self::Other(s),
        }
    }
}

impl From<ProvisioningState> for String {
    fn from(state: ProvisioningState) -> Self {
        match state {
            ProvisioningState::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime view of a group, returned by `get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerGroupInstanceView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

/// Runtime view of a single container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInstanceView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<ContainerState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<ContainerState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// One page of container groups, in the order the service returned them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContainerGroupList {
    #[serde(default)]
    pub value: Vec<ContainerGroup>,

    /// Absolute URL of the next page, if any.
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Builder for [`ContainerGroup`].
#[derive(Debug)]
pub struct ContainerGroupBuilder {
    location: Option<String>,
    os_type: OsType,
    containers: Vec<Container>,
    restart_policy: Option<RestartPolicy>,
    ip_address: Option<IpAddress>,
    image_registry_credentials: Vec<ImageRegistryCredential>,
    tags: Tags,
}

impl ContainerGroup {
    /// Create a new builder. The OS type defaults to Linux.
    pub fn builder() -> ContainerGroupBuilder {
        ContainerGroupBuilder {
            location: None,
            os_type: OsType::Linux,
            containers: Vec::new(),
            restart_policy: None,
            ip_address: None,
            image_registry_credentials: Vec::new(),
            tags: Tags::new(),
        }
    }
}

impl ContainerGroupBuilder {
    /// Set the Azure region. **Required.**
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn os_type(mut self, os_type: OsType) -> Self {
        self.os_type = os_type;
        self
    }

    /// Append a container. At least one is required.
    pub fn container(mut self, container: Container) -> Self {
        self.containers.push(container);
        self
    }

    pub fn restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = Some(policy);
        self
    }

    /// Expose `ports` on a public IP, optionally with a DNS label.
    pub fn public_ip(mut self, ports: Vec<ContainerPort>, dns_name_label: Option<String>) -> Self {
        self.ip_address = Some(IpAddress {
            ports,
            address_type: IpAddressType::Public,
            ip: None,
            dns_name_label,
            fqdn: None,
        });
        self
    }

    pub fn image_registry_credential(mut self, credential: ImageRegistryCredential) -> Self {
        self.image_registry_credentials.push(credential);
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Build the group, returning an error if required fields are missing.
    pub fn build(self) -> AciResult<ContainerGroup> {
        let location = self
            .location
            .ok_or_else(|| AciError::Builder("location is required".into()))?;
        if location.trim().is_empty() {
            return Err(AciError::Builder("location cannot be empty".into()));
        }
        if self.containers.is_empty() {
            return Err(AciError::Builder(
                "a container group needs at least one container".into(),
            ));
        }

        Ok(ContainerGroup {
            id: None,
            name: None,
            resource_type: None,
            location,
            tags: self.tags,
            properties: ContainerGroupProperties {
                os_type: self.os_type,
                containers: self.containers,
                restart_policy: self.restart_policy,
                ip_address: self.ip_address,
                image_registry_credentials: self.image_registry_credentials,
                provisioning_state: None,
                instance_view: None,
            },
        })
    }
}

/// Builder for [`Container`].
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    name: Option<String>,
    image: Option<String>,
    command: Vec<String>,
    ports: Vec<ContainerPort>,
    environment_variables: Vec<EnvironmentVariable>,
    requests: Option<ComputeResources>,
    limits: Option<ComputeResources>,
}

impl Container {
    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }
}

impl ContainerBuilder {
    /// Set the container name. **Required.**
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the image reference. **Required.**
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn port(mut self, port: ContainerPort) -> Self {
        self.ports.push(port);
        self
    }

    pub fn env(mut self, var: EnvironmentVariable) -> Self {
        self.environment_variables.push(var);
        self
    }

    /// Request CPU cores and memory (GB).
    pub fn requests(mut self, cpu: f64, memory_in_gb: f64) -> Self {
        self.requests = Some(ComputeResources::new(cpu, memory_in_gb));
        self
    }

    /// Cap CPU cores and memory (GB).
    pub fn limits(mut self, cpu: f64, memory_in_gb: f64) -> Self {
        self.limits = Some(ComputeResources::new(cpu, memory_in_gb));
        self
    }

    /// Build the container, returning an error if required fields are missing.
    ///
    /// Resource requests are optional here; the service decides whether the
    /// group is acceptable without them.
    pub fn build(self) -> AciResult<Container> {
        let name = self
            .name
            .ok_or_else(|| AciError::Builder("container name is required".into()))?;
        if name.trim().is_empty() {
            return Err(AciError::Builder("container name cannot be empty".into()));
        }

        let image = self
            .image
            .ok_or_else(|| AciError::Builder("image is required".into()))?;
        if image.trim().is_empty() {
            return Err(AciError::Builder("image cannot be empty".into()));
        }

        let resources = match (self.requests, self.limits) {
            (None, None) => None,
            (requests, limits) => Some(ResourceRequirements { requests, limits }),
        };

        Ok(Container {
            name,
            properties: ContainerProperties {
                image,
                command: self.command,
                ports: self.ports,
                environment_variables: self.environment_variables,
                resources,
                instance_view: None,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// API functions
// ---------------------------------------------------------------------------

/// Serialize a container group to the JSON body sent by [`create`].
pub fn encode(group: &ContainerGroup) -> AciResult<Bytes> {
    codec::encode(group)
}

/// Create or update a container group.
///
/// Sent exactly once. On success the returned group reflects the service's
/// view, whose `provisioning_state` may be non-terminal. Validation failures
/// (for example `ResourceSomeRequestsNotSpecified`) surface as
/// [`AciError::Validation`] with the service code intact.
///
/// # Tracing
///
/// Emits a span named `aci::container_groups::create` with fields
/// `resource_group` and `name`.
#[tracing::instrument(
    name = "aci::container_groups::create",
    skip(client, group),
    fields(resource_group = %resource_group, name = %name)
)]
pub async fn create(
    client: &AciClient,
    resource_group: &str,
    name: &str,
    group: &ContainerGroup,
) -> AciResult<ContainerGroup> {
    tracing::debug!(containers = group.properties.containers.len(), "creating container group");

    let url = container_group_uri(client.endpoint(), client.subscription_id(), resource_group, name)?;
    let response = client.put(url, encode(group)?).await?;
    let created: ContainerGroup = response.decode()?;

    tracing::debug!(
        provisioning_state = created
            .properties
            .provisioning_state
            .as_ref()
            .map_or("", ProvisioningState::as_str),
        "container group accepted"
    );
    Ok(created)
}

/// Get a container group and the response metadata.
///
/// Fails with [`AciError::NotFound`] when the group or its resource group
/// does not exist.
///
/// # Tracing
///
/// Emits a span named `aci::container_groups::get` with fields
/// `resource_group` and `name`.
#[tracing::instrument(
    name = "aci::container_groups::get",
    skip(client),
    fields(resource_group = %resource_group, name = %name)
)]
pub async fn get(
    client: &AciClient,
    resource_group: &str,
    name: &str,
) -> AciResult<(ContainerGroup, ResponseMetadata)> {
    tracing::debug!("getting container group");

    let url = container_group_uri(client.endpoint(), client.subscription_id(), resource_group, name)?;
    let response = client.get(url).await?;
    let group = response.decode::<ContainerGroup>()?;

    Ok((group, response.metadata))
}

/// List the first page of container groups in a resource group.
///
/// Order is whatever the service returns. Use [`list_next`] with
/// `next_link`, or [`list_all`], for further pages.
///
/// # Tracing
///
/// Emits a span named `aci::container_groups::list` with field `resource_group`.
#[tracing::instrument(
    name = "aci::container_groups::list",
    skip(client),
    fields(resource_group = %resource_group)
)]
pub async fn list(client: &AciClient, resource_group: &str) -> AciResult<ContainerGroupList> {
    tracing::debug!("listing container groups");

    let url = container_groups_uri(client.endpoint(), client.subscription_id(), resource_group)?;
    let response = client.get(url).await?;
    let list = response.decode::<ContainerGroupList>()?;

    tracing::debug!(count = list.value.len(), has_more = list.next_link.is_some(), "container groups listed");
    Ok(list)
}

/// Fetch the page a previous listing's `next_link` points to.
///
/// The link must be on the client's ARM endpoint; any other origin is refused
/// with [`AciError::InvalidEndpoint`] so the bearer token stays on ARM.
#[tracing::instrument(name = "aci::container_groups::list_next", skip(client, next_link))]
pub async fn list_next(client: &AciClient, next_link: &str) -> AciResult<ContainerGroupList> {
    let url = client
        .endpoint()
        .join(next_link)
        .map_err(|e| AciError::invalid_endpoint_with_source("invalid nextLink", e))?;
    let response = client.get(url).await?;
    response.decode()
}

/// List every container group in a resource group, following `nextLink`.
///
/// Performs one round trip per page. Stops if the service repeats a link.
#[tracing::instrument(
    name = "aci::container_groups::list_all",
    skip(client),
    fields(resource_group = %resource_group)
)]
pub async fn list_all(client: &AciClient, resource_group: &str) -> AciResult<Vec<ContainerGroup>> {
    let mut page = list(client, resource_group).await?;
    let mut groups = std::mem::take(&mut page.value);
    let mut seen = HashSet::new();

    while let Some(next_link) = page.next_link.take() {
        if !seen.insert(next_link.clone()) {
            tracing::warn!(next_link = %next_link, "nextLink repeated; stopping pagination");
            break;
        }
        page = list_next(client, &next_link).await?;
        groups.append(&mut page.value);
    }

    tracing::debug!(count = groups.len(), "all container groups listed");
    Ok(groups)
}

/// Request deletion of a container group.
///
/// Succeeds once ARM accepts the request; the group may remain visible until
/// the service finishes. Deleting a group that does not exist succeeds with
/// [`DeleteOutcome::AlreadyAbsent`].
///
/// # Tracing
///
/// Emits a span named `aci::container_groups::delete` with fields
/// `resource_group` and `name`.
#[tracing::instrument(
    name = "aci::container_groups::delete",
    skip(client),
    fields(resource_group = %resource_group, name = %name)
)]
pub async fn delete(client: &AciClient, resource_group: &str, name: &str) -> AciResult<DeleteOutcome> {
    tracing::debug!("deleting container group");

    let url = container_group_uri(client.endpoint(), client.subscription_id(), resource_group, name)?;
    let response = client.delete(url).await?;

    match DeleteOutcome::from_status(response.status()) {
        Some(outcome) => {
            tracing::debug!(?outcome, "container group deletion complete");
            Ok(outcome)
        }
        None => Err(response.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{cg_path, setup_mock_client, TEST_LOCATION, TEST_RESOURCE_GROUP};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_GROUP: &str = "virtual-kubelet-test-container-group";

    fn nginx(with_resources: bool) -> Container {
        let builder = Container::builder()
            .name("nginx")
            .image("nginx")
            .command(["nginx", "-g", "daemon off;"])
            .port(ContainerPort::tcp(80));
        let builder = if with_resources {
            builder.requests(1.0, 1.0).limits(1.0, 1.0)
        } else {
            builder
        };
        builder.build().expect("valid container")
    }

    fn nginx_group(with_resources: bool) -> ContainerGroup {
        ContainerGroup::builder()
            .location(TEST_LOCATION)
            .os_type(OsType::Linux)
            .container(nginx(with_resources))
            .build()
            .expect("valid group")
    }

    fn created_response(state: &str) -> serde_json::Value {
        serde_json::json!({
            "id": format!("/subscriptions/sub/resourceGroups/{TEST_RESOURCE_GROUP}/providers/Microsoft.ContainerInstance/containerGroups/{TEST_GROUP}"),
            "name": TEST_GROUP,
            "type": "Microsoft.ContainerInstance/containerGroups",
            "location": TEST_LOCATION,
            "properties": {
                "provisioningState": state,
                "osType": "Linux",
                "containers": [{
                    "name": "nginx",
                    "properties": {
                        "image": "nginx",
                        "command": ["nginx", "-g", "daemon off;"],
                        "ports": [{"protocol": "TCP", "port": 80}],
                        "environmentVariables": [],
                        "resources": {
                            "requests": {"cpu": 1.0, "memoryInGB": 1.0},
                            "limits": {"cpu": 1.0, "memoryInGB": 1.0}
                        }
                    }
                }]
            }
        })
    }

    // --- Serialization ---

    #[test]
    fn serializes_wire_shape() {
        let json = serde_json::to_value(nginx_group(true)).unwrap();

        assert_eq!(json["location"], "eastus");
        assert!(json.get("id").is_none());
        assert!(json.get("name").is_none());
        assert!(json.get("tags").is_none());
        assert_eq!(json["properties"]["osType"], "Linux");
        assert!(json["properties"].get("provisioningState").is_none());
        assert!(json["properties"].get("restartPolicy").is_none());

        let container = &json["properties"]["containers"][0];
        assert_eq!(container["name"], "nginx");
        assert_eq!(container["properties"]["image"], "nginx");
        assert_eq!(
            container["properties"]["command"],
            serde_json::json!(["nginx", "-g", "daemon off;"])
        );
        assert_eq!(
            container["properties"]["ports"],
            serde_json::json!([{"protocol": "TCP", "port": 80}])
        );
        assert_eq!(container["properties"]["resources"]["requests"]["cpu"], 1.0);
        assert_eq!(container["properties"]["resources"]["requests"]["memoryInGB"], 1.0);
        assert_eq!(container["properties"]["resources"]["limits"]["memoryInGB"], 1.0);
    }

    #[test]
    fn omitted_resources_are_not_serialized() {
        let json = serde_json::to_value(nginx_group(false)).unwrap();
        let props = &json["properties"]["containers"][0]["properties"];
        assert!(props.get("resources").is_none());
        assert!(props.get("environmentVariables").is_none());
    }

    #[test]
    fn explicit_zero_limits_are_kept() {
        let container = Container::builder()
            .name("c")
            .image("busybox")
            .requests(0.5, 0.5)
            .limits(0.0, 0.0)
            .build()
            .unwrap();
        let json = serde_json::to_value(&container).unwrap();
        let resources = &json["properties"]["resources"];
        assert_eq!(resources["limits"]["cpu"], 0.0);
        assert_eq!(resources["limits"]["memoryInGB"], 0.0);
    }

    #[test]
    fn limits_without_requests_keeps_requests_absent() {
        let container = Container::builder()
            .name("c")
            .image("busybox")
            .limits(1.0, 1.0)
            .build()
            .unwrap();
        let json = serde_json::to_value(&container).unwrap();
        assert!(json["properties"]["resources"].get("requests").is_none());
        assert!(json["properties"]["resources"].get("limits").is_some());
    }

    #[test]
    fn encode_then_decode_reproduces_input() {
        let group = ContainerGroup::builder()
            .location("westeurope")
            .os_type(OsType::Linux)
            .restart_policy(RestartPolicy::OnFailure)
            .public_ip(vec![ContainerPort::tcp(80), ContainerPort::udp(53)], Some("vk-test".into()))
            .tag("owner", "tests")
            .image_registry_credential(ImageRegistryCredential {
                server: "example.azurecr.io".into(),
                username: "puller".into(),
                password: Some("hunter2".into()),
            })
            .container(
                Container::builder()
                    .name("web")
                    .image("example.azurecr.io/web:1.2")
                    .command(["/bin/web", "--port", "80"])
                    .port(ContainerPort::tcp(80))
                    .env(EnvironmentVariable::plain("MODE", "test"))
                    .env(EnvironmentVariable::secure("TOKEN", "s3cret"))
                    .requests(0.5, 1.5)
                    .limits(1.0, 2.0)
                    .build()
                    .unwrap(),
            )
            .container(nginx(false))
            .build()
            .unwrap();

        let bytes = encode(&group).unwrap();
        let decoded: ContainerGroup = codec::decode(200, &bytes).unwrap();
        assert_eq!(decoded, group);
    }

    #[test]
    fn decodes_service_response() {
        let group: ContainerGroup =
            serde_json::from_value(created_response("Succeeded")).expect("should deserialize");

        assert_eq!(group.name.as_deref(), Some(TEST_GROUP));
        assert_eq!(group.resource_type.as_deref(), Some("Microsoft.ContainerInstance/containerGroups"));
        assert_eq!(group.properties.provisioning_state, Some(ProvisioningState::Succeeded));
        let resources = group.properties.containers[0].properties.resources.unwrap();
        assert_eq!(resources.requests, Some(ComputeResources::new(1.0, 1.0)));
    }

    #[test]
    fn decodes_instance_view() {
        let json = serde_json::json!({
            "location": "eastus",
            "properties": {
                "osType": "Linux",
                "containers": [{
                    "name": "nginx",
                    "properties": {
                        "image": "nginx",
                        "instanceView": {
                            "restartCount": 0,
                            "currentState": {"state": "Running", "startTime": "2018-01-01T00:00:00Z", "detailStatus": ""},
                            "events": [{"count": 1, "name": "Pulling", "message": "pulling image", "type": "Normal"}]
                        }
                    }
                }],
                "instanceView": {"state": "Running", "events": []},
                "ipAddress": {"ports": [{"protocol": "tcp", "port": 80}], "type": "Public", "ip": "52.0.0.1"}
            }
        });

        let group: ContainerGroup = serde_json::from_value(json).expect("should deserialize");
        let view = group.properties.containers[0].properties.instance_view.as_ref().unwrap();
        assert_eq!(view.restart_count, Some(0));
        assert_eq!(view.current_state.as_ref().unwrap().state.as_deref(), Some("Running"));
        assert_eq!(view.events[0].event_type.as_deref(), Some("Normal"));
        let ip = group.properties.ip_address.unwrap();
        assert_eq!(ip.ports[0].protocol, Some(Protocol::Tcp));
        assert_eq!(ip.ip.as_deref(), Some("52.0.0.1"));
        assert_eq!(group.properties.instance_view.unwrap().state.as_deref(), Some("Running"));
    }

    #[test]
    fn provisioning_state_round_trips_unknown_values() {
        let state: ProvisioningState = serde_json::from_str(r#""Repairing""#).unwrap();
        assert_eq!(state, ProvisioningState::Other("Repairing".into()));
        assert_eq!(serde_json::to_string(&state).unwrap(), r#""Repairing""#);
        assert!(!state.is_terminal());

        assert!(ProvisioningState::Succeeded.is_terminal());
        assert!(ProvisioningState::Failed.is_terminal());
        assert!(!ProvisioningState::Pending.is_terminal());
        assert_eq!(ProvisioningState::Creating.to_string(), "Creating");
    }

    #[test]
    fn debug_redacts_secrets() {
        let env = EnvironmentVariable::secure("TOKEN", "s3cret");
        assert!(!format!("{env:?}").contains("s3cret"));

        let cred = ImageRegistryCredential {
            server: "r".into(),
            username: "u".into(),
            password: Some("hunter2".into()),
        };
        assert!(!format!("{cred:?}").contains("hunter2"));
    }

    #[test]
    fn builders_validate_required_fields() {
        assert!(matches!(
            ContainerGroup::builder().container(nginx(true)).build(),
            Err(AciError::Builder(_))
        ));
        assert!(matches!(
            ContainerGroup::builder().location("eastus").build(),
            Err(AciError::Builder(_))
        ));
        assert!(matches!(
            Container::builder().image("nginx").build(),
            Err(AciError::Builder(_))
        ));
        assert!(matches!(
            Container::builder().name("c").build(),
            Err(AciError::Builder(_))
        ));
        assert!(matches!(
            Container::builder().name("  ").image("nginx").build(),
            Err(AciError::Builder(_))
        ));
    }

    // --- Wiremock tests ---

    #[tokio::test]
    async fn create_without_requests_fails_validation() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("PUT"))
            .and(path(cg_path(TEST_GROUP)))
            .and(query_param("api-version", "2018-10-01"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": "ResourceSomeRequestsNotSpecified",
                    "message": "The 'requests' of container 'nginx' is not specified."
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = create(&client, TEST_RESOURCE_GROUP, TEST_GROUP, &nginx_group(false))
            .await
            .unwrap_err();

        assert!(matches!(err, AciError::Validation { status: 400, .. }));
        assert!(err.to_string().contains("ResourceSomeRequestsNotSpecified"));
    }

    #[tokio::test]
    async fn create_with_requests_succeeds() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;
        let group = nginx_group(true);

        Mock::given(method("PUT"))
            .and(path(cg_path(TEST_GROUP)))
            .and(query_param("api-version", "2018-10-01"))
            .and(body_json(serde_json::to_value(&group).unwrap()))
            .respond_with(ResponseTemplate::new(201).set_body_json(created_response("Pending")))
            .expect(1)
            .mount(&server)
            .await;

        let created = create(&client, TEST_RESOURCE_GROUP, TEST_GROUP, &group)
            .await
            .expect("should create");

        assert_eq!(created.name.as_deref(), Some(TEST_GROUP));
        assert_eq!(created.properties.provisioning_state, Some(ProvisioningState::Pending));
        assert!(!created.properties.provisioning_state.unwrap().is_terminal());
        // Input is untouched
        assert!(group.name.is_none());
    }

    #[tokio::test]
    async fn create_is_not_retried_on_server_error() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("PUT"))
            .and(path(cg_path(TEST_GROUP)))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"code": "InternalServerError", "message": "try again"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = create(&client, TEST_RESOURCE_GROUP, TEST_GROUP, &nginx_group(true))
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn create_with_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("PUT"))
            .and(path(cg_path(TEST_GROUP)))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"name\": 42"))
            .mount(&server)
            .await;

        match create(&client, TEST_RESOURCE_GROUP, TEST_GROUP, &nginx_group(true)).await {
            Err(AciError::Decode { status, body, .. }) => {
                assert_eq!(status, 200);
                assert!(body.contains("\"name\": 42"));
            }
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_returns_group_and_metadata() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("GET"))
            .and(path(cg_path(TEST_GROUP)))
            .and(query_param("api-version", "2018-10-01"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ms-request-id", "abc-123")
                    .set_body_json(created_response("Succeeded")),
            )
            .mount(&server)
            .await;

        let (group, meta) = get(&client, TEST_RESOURCE_GROUP, TEST_GROUP)
            .await
            .expect("should get");

        assert_eq!(group.name.as_deref(), Some(TEST_GROUP));
        assert_eq!(meta.status, 200);
        assert_eq!(meta.request_id.as_deref(), Some("abc-123"));
    }

    #[tokio::test]
    async fn get_unknown_group_is_not_found() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("GET"))
            .and(path(cg_path("never-created")))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {
                    "code": "ResourceNotFound",
                    "message": "The Resource 'Microsoft.ContainerInstance/containerGroups/never-created' was not found."
                }
            })))
            .mount(&server)
            .await;

        let err = get(&client, TEST_RESOURCE_GROUP, "never-created").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.service_error().and_then(|e| e.code.as_deref()),
            Some("ResourceNotFound")
        );
    }

    #[tokio::test]
    async fn get_with_empty_404_body_is_not_found() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = get(&client, TEST_RESOURCE_GROUP, "x").await.unwrap_err();
        assert!(matches!(err, AciError::NotFound { status: 404, .. }));
    }

    #[tokio::test]
    async fn list_returns_single_group() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("GET"))
            .and(path(crate::test_utils::cg_list_path()))
            .and(query_param("api-version", "2018-10-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [created_response("Succeeded")]
            })))
            .mount(&server)
            .await;

        let list = list(&client, TEST_RESOURCE_GROUP).await.expect("should list");
        assert_eq!(list.value.len(), 1);
        assert_eq!(list.value[0].name.as_deref(), Some(TEST_GROUP));
        assert!(list.next_link.is_none());
    }

    #[tokio::test]
    async fn list_preserves_service_order() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        let named = |n: &str| {
            let mut v = created_response("Succeeded");
            v["name"] = serde_json::json!(n);
            v
        };

        Mock::given(method("GET"))
            .and(path(crate::test_utils::cg_list_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [named("zeta"), named("alpha"), named("mid")]
            })))
            .mount(&server)
            .await;

        let list = list(&client, TEST_RESOURCE_GROUP).await.unwrap();
        let names: Vec<_> = list.value.iter().filter_map(|g| g.name.as_deref()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn list_all_follows_next_link() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        let named = |n: &str| {
            let mut v = created_response("Succeeded");
            v["name"] = serde_json::json!(n);
            v
        };

        Mock::given(method("GET"))
            .and(path(crate::test_utils::cg_list_path()))
            .and(query_param("api-version", "2018-10-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [named("first")],
                "nextLink": format!("{}/page2?api-version=2018-10-01", server.uri())
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [named("second")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let groups = list_all(&client, TEST_RESOURCE_GROUP).await.expect("should list");
        let names: Vec<_> = groups.iter().filter_map(|g| g.name.as_deref()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[tokio::test]
    async fn list_all_stops_on_repeated_next_link() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;
        let loop_link = format!("{}/page2?api-version=2018-10-01", server.uri());

        Mock::given(method("GET"))
            .and(path(crate::test_utils::cg_list_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [created_response("Succeeded")],
                "nextLink": loop_link.clone()
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [created_response("Succeeded")],
                "nextLink": loop_link
            })))
            .expect(1)
            .mount(&server)
            .await;

        let groups = list_all(&client, TEST_RESOURCE_GROUP).await.expect("should list");
        assert_eq!(groups.len(), 2);
    }

    #[tokio::test]
    async fn list_next_refuses_foreign_host() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        let err = list_next(&client, "https://attacker.example/page2").await.unwrap_err();
        assert!(matches!(err, AciError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn list_in_missing_resource_group_is_not_found() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("GET"))
            .and(path(crate::test_utils::cg_list_path()))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": "ResourceGroupNotFound", "message": "Resource group 'x' could not be found."}
            })))
            .mount(&server)
            .await;

        assert!(list(&client, TEST_RESOURCE_GROUP).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_accepted() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("DELETE"))
            .and(path(cg_path(TEST_GROUP)))
            .and(query_param("api-version", "2018-10-01"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = delete(&client, TEST_RESOURCE_GROUP, TEST_GROUP).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Accepted);
    }

    #[tokio::test]
    async fn delete_ok_with_body() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("DELETE"))
            .and(path(cg_path(TEST_GROUP)))
            .respond_with(ResponseTemplate::new(200).set_body_json(created_response("Deleting")))
            .mount(&server)
            .await;

        let outcome = delete(&client, TEST_RESOURCE_GROUP, TEST_GROUP).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
    }

    #[tokio::test]
    async fn delete_missing_group_is_idempotent() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("DELETE"))
            .and(path(cg_path("gone")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(cg_path("never")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(
            delete(&client, TEST_RESOURCE_GROUP, "gone").await.unwrap(),
            DeleteOutcome::AlreadyAbsent
        );
        assert_eq!(
            delete(&client, TEST_RESOURCE_GROUP, "never").await.unwrap(),
            DeleteOutcome::AlreadyAbsent
        );
    }

    #[tokio::test]
    async fn delete_conflict_is_validation_error() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "code": "Conflict",
                "message": "Another operation is in progress."
            })))
            .mount(&server)
            .await;

        let err = delete(&client, TEST_RESOURCE_GROUP, TEST_GROUP).await.unwrap_err();
        assert!(matches!(err, AciError::Validation { status: 409, .. }));
        assert!(err.to_string().contains("Conflict: Another operation is in progress."));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("DELETE"))
            .and(path(cg_path(TEST_GROUP)))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(cg_path(TEST_GROUP)))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": "ResourceNotFound", "message": "not found"}
            })))
            .mount(&server)
            .await;

        delete(&client, TEST_RESOURCE_GROUP, TEST_GROUP).await.unwrap();
        assert!(get(&client, TEST_RESOURCE_GROUP, TEST_GROUP).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn concurrent_operations_share_one_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "/{}/oauth2/v2.0/token",
                azure_aci_core::test_support::TEST_TENANT_ID
            )))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"expires_in": 3599, "access_token": "t"}))
                    .set_delay(std::time::Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(cg_path(TEST_GROUP)))
            .respond_with(ResponseTemplate::new(200).set_body_json(created_response("Succeeded")))
            .expect(8)
            .mount(&server)
            .await;

        let client = AciClient::builder()
            .endpoint(server.uri())
            .authority_host(server.uri())
            .credential(azure_aci_core::test_support::test_credential())
            .build()
            .unwrap();

        let tasks = (0..8).map(|_| {
            let client = client.clone();
            tokio::spawn(async move { get(&client, TEST_RESOURCE_GROUP, TEST_GROUP).await })
        });
        for task in tasks.collect::<Vec<_>>() {
            task.await.unwrap().expect("should get");
        }
    }

    #[tokio::test]
    async fn invalid_name_fails_before_any_request() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = get(&client, TEST_RESOURCE_GROUP, "").await.unwrap_err();
        assert!(matches!(err, AciError::InvalidResourceName(_)));
    }

    // --- Tracing ---

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn create_emits_span_with_fields() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_json(created_response("Pending")))
            .mount(&server)
            .await;

        create(&client, TEST_RESOURCE_GROUP, TEST_GROUP, &nginx_group(true))
            .await
            .unwrap();

        assert!(logs_contain("aci::container_groups::create"));
        assert!(logs_contain(TEST_RESOURCE_GROUP));
        assert!(logs_contain("Pending"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn delete_emits_span() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        delete(&client, TEST_RESOURCE_GROUP, TEST_GROUP).await.unwrap();

        assert!(logs_contain("aci::container_groups::delete"));
        assert!(logs_contain("Accepted"));
    }
}
