use std::sync::Arc;

use gcp_auth::TokenProvider;

use crate::error::PluginResult;

/// OAuth scope used for both telemetry export and Firestore access.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Thin pass-through to application-default credentials.
///
/// Discovery order (metadata server, `GOOGLE_APPLICATION_CREDENTIALS`,
/// gcloud user credentials) is owned entirely by `gcp_auth`; this type
/// only adapts its surface to what the exporters need.
#[derive(Clone)]
pub struct Credentials {
    provider: Arc<dyn TokenProvider>,
}

impl Credentials {
    /// Load application-default credentials from the process environment.
    pub async fn application_default() -> PluginResult<Self> {
        Ok(Self {
            provider: gcp_auth::provider().await?,
        })
    }

    /// Wrap an existing token provider (useful for tests and custom auth).
    pub fn from_provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self { provider }
    }

    /// The Google Cloud project the credentials belong to.
    pub async fn project_id(&self) -> PluginResult<String> {
        Ok(self.provider.project_id().await?.to_string())
    }

    /// A `Bearer ...` header value for the cloud-platform scope.
    pub async fn bearer_token(&self) -> PluginResult<String> {
        let token = self.provider.token(&[CLOUD_PLATFORM_SCOPE]).await?;
        Ok(format!("Bearer {}", token.as_str()))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}
