//! Mock identity endpoint and client factory for wiremock-based tests.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for sibling crates.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::ServicePrincipal;
use crate::client::AciClient;

/// Tenant of [`test_credential`].
pub const TEST_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Subscription of [`test_credential`].
pub const TEST_SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000002";

/// Client id of [`test_credential`].
pub const TEST_CLIENT_ID: &str = "test-client-id";

/// Client secret of [`test_credential`] (not a real secret).
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";

/// Token served by [`mount_token_endpoint`].
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

/// A service principal pointing at the test tenant and subscription.
pub fn test_credential() -> ServicePrincipal {
    ServicePrincipal::new(
        TEST_TENANT_ID,
        TEST_CLIENT_ID,
        TEST_CLIENT_SECRET,
        TEST_SUBSCRIPTION_ID,
    )
}

/// Serve [`TEST_ACCESS_TOKEN`] from the server's token endpoint for the test tenant.
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/{TEST_TENANT_ID}/oauth2/v2.0/token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "ext_expires_in": 3599,
            "access_token": TEST_ACCESS_TOKEN
        })))
        .mount(server)
        .await;
}

/// Create a client whose ARM endpoint and authority both point at `server`,
/// with the token endpoint already mounted.
pub async fn setup_mock_client(server: &MockServer) -> AciClient {
    mount_token_endpoint(server).await;

    AciClient::builder()
        .endpoint(server.uri())
        .authority_host(server.uri())
        .credential(test_credential())
        .build()
        .expect("should build client")
}
