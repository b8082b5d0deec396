//! Runtime configuration for the delegation layer

use std::env;
use std::time::Duration;

/// Default namespace agent jobs are created in
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default agent container image
pub const DEFAULT_AGENT_IMAGE: &str = "ghcr.io/legate/agent:latest";

/// Default internal API base address injected into agent containers
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Default bound on every control-plane call
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings shared by every component in this subsystem.
///
/// Constructed once at process startup and passed by explicit dependency
/// injection; nothing in here changes after construction.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Namespace agent jobs and their pods live in
    pub namespace: String,
    /// Container image run by agent jobs
    pub image: String,
    /// Base URL of the internal API the agent container reports back to
    pub api_base_url: String,
    /// Timeout applied to each control-plane request
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            image: DEFAULT_AGENT_IMAGE.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Load settings from `LEGATE_*` environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout_secs = env::var("LEGATE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Self {
            namespace: env::var("LEGATE_NAMESPACE").unwrap_or(defaults.namespace),
            image: env::var("LEGATE_AGENT_IMAGE").unwrap_or(defaults.image),
            api_base_url: env::var("LEGATE_API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
