//! Service-principal credentials and bearer-token acquisition.
//!
//! [`ServicePrincipal`] is the resolved credential set. [`TokenProvider`]
//! exchanges it for short-lived ARM tokens using the OAuth2 client-credentials
//! grant and caches the result until shortly before expiry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::client::{is_retriable_status, RetryPolicy};
use crate::codec::{sanitize_error_message, truncate_message};
use crate::error::{AciError, AciResult};

/// Environment variable naming an SDK auth file.
pub const AUTH_LOCATION_ENV: &str = "AZURE_AUTH_LOCATION";

/// Default Microsoft Entra ID authority host.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default OAuth2 scope for Azure Resource Manager.
pub const DEFAULT_SCOPE: &str = "https://management.azure.com/.default";

/// Tokens are refreshed once they are this close to expiry.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// A service-principal credential set.
///
/// Immutable once resolved. The client secret never appears in `Debug` output.
#[derive(Clone)]
pub struct ServicePrincipal {
    tenant_id: String,
    client_id: String,
    client_secret: SecretString,
    subscription_id: String,
    authority_host: Option<String>,
    resource_manager_endpoint: Option<String>,
}

/// The on-disk shape written by `az ad sp create-for-rbac --sdk-auth`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthFile {
    client_id: String,
    client_secret: String,
    subscription_id: String,
    tenant_id: String,
    #[serde(default)]
    active_directory_endpoint_url: Option<String>,
    #[serde(default)]
    resource_manager_endpoint_url: Option<String>,
}

impl ServicePrincipal {
    /// Create a credential from its parts.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            subscription_id: subscription_id.into(),
            authority_host: None,
            resource_manager_endpoint: None,
        }
    }

    /// Load a credential from an SDK auth file.
    pub fn from_auth_file(path: impl AsRef<Path>) -> AciResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AciError::Credential(format!("cannot read auth file {}: {e}", path.display()))
        })?;
        let file: AuthFile = serde_json::from_str(&contents).map_err(|e| {
            AciError::Credential(format!("invalid auth file {}: {e}", path.display()))
        })?;

        for (field, value) in [
            ("tenantId", &file.tenant_id),
            ("clientId", &file.client_id),
            ("clientSecret", &file.client_secret),
            ("subscriptionId", &file.subscription_id),
        ] {
            if value.trim().is_empty() {
                return Err(AciError::Credential(format!(
                    "auth file {} has an empty {field}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            tenant_id: file.tenant_id,
            client_id: file.client_id,
            client_secret: SecretString::from(file.client_secret),
            subscription_id: file.subscription_id,
            authority_host: file.active_directory_endpoint_url,
            resource_manager_endpoint: file.resource_manager_endpoint_url,
        })
    }

    /// Resolve an auth file: `AZURE_AUTH_LOCATION` first, then `fallback`.
    ///
    /// Fails fast when neither names an existing file.
    pub fn resolve_auth_file(fallback: Option<&Path>) -> AciResult<Self> {
        let location = std::env::var_os(AUTH_LOCATION_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| fallback.filter(|p| p.is_file()).map(Path::to_path_buf))
            .ok_or_else(|| {
                AciError::Credential(format!(
                    "set {AUTH_LOCATION_ENV} or provide a credentials file"
                ))
            })?;

        tracing::debug!(path = %location.display(), "loading auth file");
        Self::from_auth_file(location)
    }

    /// Load a credential from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`,
    /// `AZURE_CLIENT_SECRET` and `AZURE_SUBSCRIPTION_ID`.
    pub fn from_env() -> AciResult<Self> {
        fn var(name: &str) -> AciResult<String> {
            match std::env::var(name) {
                Ok(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(AciError::Credential(format!("{name} is not set"))),
            }
        }

        Ok(Self::new(
            var("AZURE_TENANT_ID")?,
            var("AZURE_CLIENT_ID")?,
            var("AZURE_CLIENT_SECRET")?,
            var("AZURE_SUBSCRIPTION_ID")?,
        ))
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Authority host named by the auth file, if any.
    pub fn authority_host(&self) -> Option<&str> {
        self.authority_host.as_deref()
    }

    /// ARM endpoint named by the auth file, if any.
    pub fn resource_manager_endpoint(&self) -> Option<&str> {
        self.resource_manager_endpoint.as_deref()
    }
}

impl std::fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"****")
            .field("subscription_id", &self.subscription_id)
            .finish_non_exhaustive()
    }
}

/// A bearer token and the instant it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_at: Instant,
}

impl AccessToken {
    /// The raw token value.
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Whether the token expires within `margin` of `now`.
    ///
    /// A margin too large to represent counts as stale.
    pub fn is_stale(&self, now: Instant, margin: Duration) -> bool {
        now.checked_add(margin)
            .is_none_or(|deadline| deadline >= self.expires_at)
    }

    /// The `Authorization` header value.
    pub(crate) fn header_value(&self) -> String {
        format!("Bearer {}", self.secret.expose_secret())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"****")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Seconds,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Caches an ARM bearer token and refreshes it before expiry.
///
/// The cache lock is held across the refresh call, so concurrent callers that
/// find the token stale queue behind a single refresh and reuse its result.
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct TokenProvider {
    inner: Arc<TokenProviderInner>,
}

struct TokenProviderInner {
    http: HttpClient,
    credential: ServicePrincipal,
    token_url: Url,
    scope: String,
    refresh_margin: Duration,
    retry_policy: RetryPolicy,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    /// Create a provider that requests tokens from `authority_host`.
    pub fn new(
        http: HttpClient,
        credential: ServicePrincipal,
        authority_host: &Url,
        scope: impl Into<String>,
        refresh_margin: Duration,
        retry_policy: RetryPolicy,
    ) -> AciResult<Self> {
        let mut token_url = authority_host.clone();
        token_url
            .path_segments_mut()
            .map_err(|()| {
                AciError::invalid_endpoint(format!("{authority_host} cannot be a base URL"))
            })?
            .pop_if_empty()
            .extend([credential.tenant_id(), "oauth2", "v2.0", "token"]);

        Ok(Self {
            inner: Arc::new(TokenProviderInner {
                http,
                credential,
                token_url,
                scope: scope.into(),
                refresh_margin,
                retry_policy,
                cached: Mutex::new(None),
            }),
        })
    }

    /// The credential this provider authenticates with.
    pub fn credential(&self) -> &ServicePrincipal {
        &self.inner.credential
    }

    /// The identity endpoint tokens are requested from.
    pub fn token_url(&self) -> &Url {
        &self.inner.token_url
    }

    /// Return a token valid for at least the refresh margin, refreshing if needed.
    pub async fn token(&self) -> AciResult<AccessToken> {
        let mut cached = self.inner.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_stale(Instant::now(), self.inner.refresh_margin) {
                return Ok(token.clone());
            }
        }

        let token = self.refresh().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.inner.cached.lock().await = None;
    }

    /// Drop the cached token only if it is still `rejected`.
    ///
    /// A token refreshed by another task in the meantime is kept.
    pub async fn invalidate_token(&self, rejected: &AccessToken) {
        let mut cached = self.inner.cached.lock().await;
        if cached
            .as_ref()
            .is_some_and(|current| current.secret() == rejected.secret())
        {
            *cached = None;
        }
    }

    #[tracing::instrument(
        name = "aci::auth::refresh",
        skip(self),
        fields(tenant_id = %self.inner.credential.tenant_id())
    )]
    async fn refresh(&self) -> AciResult<AccessToken> {
        let policy = &self.inner.retry_policy;

        for attempt in 0..=policy.max_retries {
            let last = attempt == policy.max_retries;

            match self.request_token().await {
                Ok(token) => {
                    tracing::debug!(attempt, "token acquired");
                    return Ok(token);
                }
                Err(RefreshFailure::Rejected(msg)) => return Err(AciError::Auth(msg)),
                Err(RefreshFailure::Retriable(msg)) if last => {
                    return Err(AciError::Auth(format!(
                        "identity endpoint unavailable after {} attempts: {msg}",
                        attempt + 1
                    )));
                }
                Err(RefreshFailure::Retriable(msg)) => {
                    let backoff = policy.backoff(attempt);
                    tracing::warn!(attempt, ?backoff, error = %msg, "token request failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        unreachable!("retry loop should return before reaching here")
    }

    async fn request_token(&self) -> Result<AccessToken, RefreshFailure> {
        let inner = &self.inner;
        let response = inner
            .http
            .post(inner.token_url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", inner.credential.client_id()),
                ("client_secret", inner.credential.client_secret.expose_secret()),
                ("scope", inner.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RefreshFailure::Retriable(sanitize_error_message(&e.to_string())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RefreshFailure::Retriable(sanitize_error_message(&e.to_string())))?;

        if !response_is_success(status) {
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, truncate_message(&desc)),
                    None => err.error,
                },
                Err(_) => truncate_message(&body),
            };
            let msg = format!("identity endpoint returned HTTP {status}: {detail}");
            return Err(if is_retriable_status(status) {
                RefreshFailure::Retriable(msg)
            } else {
                RefreshFailure::Rejected(msg)
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            RefreshFailure::Rejected(format!("malformed token response: {e}"))
        })?;

        let expires_in = match parsed.expires_in {
            Seconds::Number(n) => n,
            Seconds::Text(s) => s.trim().parse().map_err(|_| {
                RefreshFailure::Rejected(format!("malformed expires_in: {s}"))
            })?,
        };

        if expires_in == 0 {
            return Err(RefreshFailure::Rejected(
                "malformed expires_in: token is already expired".into(),
            ));
        }
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(expires_in))
            .ok_or_else(|| {
                RefreshFailure::Rejected(format!("malformed expires_in: {expires_in} is out of range"))
            })?;

        Ok(AccessToken {
            secret: SecretString::from(parsed.access_token),
            expires_at,
        })
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("credential", &self.inner.credential)
            .field("token_url", &self.inner.token_url.as_str())
            .field("scope", &self.inner.scope)
            .finish_non_exhaustive()
    }
}

enum RefreshFailure {
    /// The identity endpoint rejected the request; retrying cannot help.
    Rejected(String),
    /// Transport failure or retriable status.
    Retriable(String),
}

fn response_is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
