//! HTTP client for Azure Resource Manager.
//!
//! This module provides [`AciClient`], the entry point for the management
//! operations in `azure_aci_containers`. The client owns the credential and
//! token cache, the ARM endpoint, and the HTTP transport.
//!
//! # Examples
//!
//! ## From an SDK auth file
//! ```rust,no_run
//! use azure_aci_core::auth::ServicePrincipal;
//! use azure_aci_core::client::AciClient;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = ServicePrincipal::resolve_auth_file(Some("credentials.json".as_ref()))?;
//! let client = AciClient::builder().credential(credential).build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Explicit service principal
//! ```rust,no_run
//! use azure_aci_core::auth::ServicePrincipal;
//! use azure_aci_core::client::AciClient;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AciClient::builder()
//!     .credential(ServicePrincipal::new("tenant-id", "client-id", "client-secret", "subscription-id"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::auth::{
    ServicePrincipal, TokenProvider, DEFAULT_AUTHORITY_HOST, DEFAULT_REFRESH_MARGIN,
    DEFAULT_SCOPE,
};
use crate::codec;
use crate::error::{AciError, AciResult};
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use url::Url;

use std::time::Duration;

/// Default Azure Resource Manager endpoint.
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";

/// Environment variable overriding the ARM endpoint.
pub const RESOURCE_MANAGER_ENDPOINT_ENV: &str = "AZURE_RESOURCE_MANAGER_ENDPOINT";

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read/response timeout (60 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Determines if an HTTP status code represents a retriable error.
///
/// Retriable errors are transient server-side issues that may succeed on retry:
/// - 408 Request Timeout
/// - 429 Too Many Requests (rate limiting)
/// - 500 Internal Server Error
/// - 502 Bad Gateway
/// - 503 Service Unavailable
/// - 504 Gateway Timeout
#[inline]
pub fn is_retriable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Retry behaviour for token acquisition.
///
/// ARM operations are attempted exactly once; a blind retry of a create is not
/// safe, so only the identity endpoint is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Initial backoff duration before the first retry.
    /// Subsequent retries use exponential backoff (2^attempt * initial_backoff).
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt`, with ±25% jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base_backoff = self.initial_backoff * 2_u32.saturating_pow(attempt);
        let jitter = 0.75 + fastrand::f64() * 0.5; // 0.75 to 1.25
        base_backoff.mul_f64(jitter)
    }
}

/// Status and tracing headers of an ARM response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// HTTP status code.
    pub status: u16,
    /// `x-ms-request-id`, when present.
    pub request_id: Option<String>,
    /// `x-ms-correlation-request-id`, when present.
    pub correlation_id: Option<String>,
}

impl ResponseMetadata {
    fn from_headers(status: u16, headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            status,
            request_id: header("x-ms-request-id"),
            correlation_id: header("x-ms-correlation-request-id"),
        }
    }
}

/// A fully-read ARM response, before decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub metadata: ResponseMetadata,
    pub body: Bytes,
}

impl RawResponse {
    pub fn status(&self) -> u16 {
        self.metadata.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.metadata.status)
    }

    /// Decode the body as `T`, or classify the failure.
    pub fn decode<T: DeserializeOwned>(&self) -> AciResult<T> {
        codec::decode(self.metadata.status, &self.body)
    }

    /// Classify a non-2xx response.
    pub fn into_error(self) -> AciError {
        codec::decode_error(self.metadata.status, &self.body)
    }
}

/// The client for Azure Resource Manager container-instance operations.
///
/// Each request is sent exactly once with a bearer token from the shared
/// [`TokenProvider`]. The client is cheaply cloneable and can be shared across
/// tasks; clones share the token cache.
#[derive(Debug, Clone)]
pub struct AciClient {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: Url,
    pub(crate) tokens: TokenProvider,
}

/// Builder for constructing an [`AciClient`].
///
/// Use [`AciClient::builder()`] to create a new builder.
#[derive(Debug, Default)]
pub struct AciClientBuilder {
    endpoint: Option<String>,
    credential: Option<ServicePrincipal>,
    authority_host: Option<String>,
    scope: Option<String>,
    http_client: Option<HttpClient>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    auth_retry_policy: Option<RetryPolicy>,
    token_refresh_margin: Option<Duration>,
}

impl AciClient {
    /// Create a new builder for configuring an `AciClient`.
    pub fn builder() -> AciClientBuilder {
        AciClientBuilder::default()
    }

    /// Get the ARM endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The subscription every resource URI is scoped to.
    pub fn subscription_id(&self) -> &str {
        self.tokens.credential().subscription_id()
    }

    /// The token provider backing this client.
    pub fn token_provider(&self) -> &TokenProvider {
        &self.tokens
    }

    /// Whether `url` points at the configured ARM endpoint (same scheme, host and port).
    ///
    /// Bearer tokens are only ever attached to such URLs.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.endpoint.origin()
    }

    /// Send a GET request.
    pub async fn get(&self, url: Url) -> AciResult<RawResponse> {
        self.send(Method::GET, url, None).await
    }

    /// Send a HEAD request.
    pub async fn head(&self, url: Url) -> AciResult<RawResponse> {
        self.send(Method::HEAD, url, None).await
    }

    /// Send a PUT request with an encoded JSON body.
    pub async fn put(&self, url: Url, body: Bytes) -> AciResult<RawResponse> {
        self.send(Method::PUT, url, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, url: Url) -> AciResult<RawResponse> {
        self.send(Method::DELETE, url, None).await
    }

    /// Send one authenticated request and read the whole response.
    ///
    /// Returns the response for any HTTP status; only transport failures and
    /// token acquisition failures are errors here. Decoding and status
    /// classification are left to [`RawResponse`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidEndpoint` if `url` is not on the ARM endpoint, `Auth`
    /// if no token can be obtained, and `Transient` on transport failures.
    pub async fn send(&self, method: Method, url: Url, body: Option<Bytes>) -> AciResult<RawResponse> {
        if !self.is_same_origin(&url) {
            return Err(AciError::invalid_endpoint(format!(
                "refusing to send credentials to {}",
                url.origin().ascii_serialization()
            )));
        }

        let token = self.tokens.token().await?;

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, token.header_value())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let metadata = ResponseMetadata::from_headers(status, response.headers());
        let body = response.bytes().await?;

        // A rejected token is dropped so the next request refreshes it.
        if status == 401 {
            tracing::warn!("ARM rejected the bearer token; invalidating cache");
            self.tokens.invalidate_token(&token).await;
        }

        tracing::trace!(
            status,
            request_id = metadata.request_id.as_deref().unwrap_or(""),
            "ARM response received"
        );

        Ok(RawResponse { metadata, body })
    }
}

impl AciClientBuilder {
    /// Set the Azure Resource Manager endpoint URL.
    ///
    /// If not set, the builder checks `AZURE_RESOURCE_MANAGER_ENDPOINT`, then the
    /// credential's auth file, then uses [`DEFAULT_RESOURCE_MANAGER_ENDPOINT`].
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the credential to use for authentication.
    ///
    /// If not set, the builder uses [`ServicePrincipal::from_env()`].
    pub fn credential(mut self, credential: ServicePrincipal) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set the Microsoft Entra ID authority host.
    ///
    /// Defaults to the credential's auth-file value or [`DEFAULT_AUTHORITY_HOST`].
    pub fn authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = Some(authority_host.into());
        self
    }

    /// Set the OAuth2 scope requested for ARM tokens.
    ///
    /// Defaults to [`DEFAULT_SCOPE`].
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set a custom HTTP client.
    ///
    /// **Note:** If you provide a custom HTTP client, any timeout configuration
    /// via [`connect_timeout`](Self::connect_timeout) will be ignored.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the connection timeout.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    ///
    /// This is the maximum time allowed for one request/response cycle,
    /// including reading the body.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the retry policy for token acquisition.
    ///
    /// Defaults to 3 retries with 500ms initial backoff.
    pub fn auth_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.auth_retry_policy = Some(policy);
        self
    }

    /// Refresh tokens once they are this close to expiry.
    ///
    /// Defaults to [`DEFAULT_REFRESH_MARGIN`] (5 minutes).
    pub fn token_refresh_margin(mut self, margin: Duration) -> Self {
        self.token_refresh_margin = Some(margin);
        self
    }

    /// Build the `AciClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No credential is provided and the `AZURE_*` variables are incomplete
    /// - The endpoint or authority URL is invalid
    /// - The HTTP client cannot be constructed
    pub fn build(self) -> AciResult<AciClient> {
        let http = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .timeout(self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT))
                .build()
                .map_err(|e| AciError::MissingConfig(format!("failed to build HTTP client: {e}")))?,
        };

        let credential = match self.credential {
            Some(credential) => credential,
            None => ServicePrincipal::from_env().map_err(|e| {
                AciError::MissingConfig(format!(
                    "credential is required. Set it via builder or AZURE_* env vars ({e})"
                ))
            })?,
        };

        let endpoint_str = self
            .endpoint
            .or_else(|| std::env::var(RESOURCE_MANAGER_ENDPOINT_ENV).ok())
            .or_else(|| credential.resource_manager_endpoint().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string());
        let endpoint = Url::parse(&endpoint_str)
            .map_err(|e| AciError::invalid_endpoint_with_source("invalid endpoint URL", e))?;

        let authority_str = self
            .authority_host
            .or_else(|| credential.authority_host().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
        let authority = Url::parse(&authority_str)
            .map_err(|e| AciError::invalid_endpoint_with_source("invalid authority host", e))?;

        let tokens = TokenProvider::new(
            http.clone(),
            credential,
            &authority,
            self.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            self.token_refresh_margin.unwrap_or(DEFAULT_REFRESH_MARGIN),
            self.auth_retry_policy.unwrap_or_default(),
        )?;

        Ok(AciClient {
            http,
            endpoint,
            tokens,
        })
    }
}
