//! Connection settings for a GWN Cloud account.

use serde::{Deserialize, Serialize};

use crate::error::GwnError;

/// API host for cloud-managed controllers.
pub const DEFAULT_BASE_URL: &str = "https://www.gwn.cloud";

/// Per-request timeout applied to every controller call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials and connection settings for the GWN Cloud API.
///
/// `app_id` and `app_secret` come from the cloud console's API application
/// page; `network_id` selects which managed network operations target.
#[derive(Clone, Serialize, Deserialize)]
pub struct GwnConfig {
    /// Controller base URL. On-premise GWN Manager installs override this.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API application identifier, sent as `appID` on every request.
    #[serde(default)]
    pub app_id: String,

    /// API application secret, used for the token request and as the
    /// request-signing key.
    #[serde(default)]
    pub app_secret: String,

    /// Identifier of the managed network operations apply to.
    #[serde(default)]
    pub network_id: String,

    /// Static token override. When set, the token endpoint is never called.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GwnConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_id: String::new(),
            app_secret: String::new(),
            network_id: String::new(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for GwnConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GwnConfig")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("network_id", &self.network_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GwnConfig {
    /// Check that the settings are usable for API calls.
    pub fn validate(&self) -> Result<(), GwnError> {
        if self.base_url.is_empty() {
            return Err(GwnError::Config("base_url is empty".into()));
        }
        if self.app_id.is_empty() {
            return Err(GwnError::Config("app_id is empty".into()));
        }
        if self.app_secret.is_empty() {
            return Err(GwnError::Config("app_secret is empty".into()));
        }
        if self.network_id.is_empty() {
            return Err(GwnError::Config("network_id is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(GwnError::Config("timeout_secs must be non-zero".into()));
        }
        Ok(())
    }
}
