//! Cluster access resolution
//!
//! Resolves the credentials and endpoint needed to reach the control plane,
//! choosing between the in-cluster service-account identity and a local
//! developer kubeconfig. The resolved context is constructed once at process
//! startup and passed into every component by explicit dependency injection;
//! there is no lazily-initialized global, so there is no first-caller race.

use std::env;

use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use tracing::info;

use crate::config::Settings;
use crate::Error;

/// Environment variable present only when running inside a cluster
const IN_CLUSTER_ENV: &str = "KUBERNETES_SERVICE_HOST";

/// Path of the service-account token mounted into in-cluster pods
pub const SERVICE_ACCOUNT_TOKEN_PATH: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Path of the cluster CA certificate mounted into in-cluster pods
pub const SERVICE_ACCOUNT_CA_PATH: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

/// Which identity source the context was resolved from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentitySource {
    /// Service-account token mounted into the pod plus the well-known
    /// in-cluster endpoint
    InCluster,
    /// Local developer kubeconfig file
    Kubeconfig,
}

/// Resolved cluster access: endpoint, identity, and the shared client.
///
/// Immutable after construction. The memoized `Api<Job>` / `Api<Pod>`
/// handles built from it live in [`crate::cluster::KubeClusterApi`].
#[derive(Clone)]
pub struct AccessContext {
    /// Shared Kubernetes client
    pub client: Client,
    /// Control-plane base URL, used by the direct REST transport
    pub cluster_url: String,
    /// Which identity the context was resolved from
    pub identity: IdentitySource,
    /// Namespace all operations target
    pub namespace: String,
}

impl AccessContext {
    /// Resolve cluster access, preferring the in-cluster identity.
    ///
    /// Probes `KUBERNETES_SERVICE_HOST`; if set, loads the in-cluster
    /// config (service-account token mount). Otherwise loads the local
    /// kubeconfig. Fails with [`Error::AccessResolution`] if neither
    /// source is usable - nothing in this subsystem can proceed without
    /// it, so the error is surfaced, never swallowed.
    pub async fn resolve(settings: &Settings) -> Result<Self, Error> {
        let (mut config, identity) = if env::var(IN_CLUSTER_ENV).is_ok() {
            let config = Config::incluster().map_err(|e| {
                Error::access_resolution(format!("in-cluster config unavailable: {e}"))
            })?;
            (config, IdentitySource::InCluster)
        } else {
            let config = Config::from_kubeconfig(&KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::access_resolution(format!("kubeconfig unavailable: {e}"))
                })?;
            (config, IdentitySource::Kubeconfig)
        };

        config.connect_timeout = Some(settings.request_timeout);
        config.read_timeout = Some(settings.request_timeout);
        let cluster_url = config.cluster_url.to_string();

        let client = Client::try_from(config).map_err(|e| {
            Error::access_resolution(format!("failed to build kubernetes client: {e}"))
        })?;

        info!(
            cluster_url = %cluster_url,
            identity = ?identity,
            namespace = %settings.namespace,
            "resolved cluster access"
        );

        Ok(Self {
            client,
            cluster_url,
            identity,
            namespace: settings.namespace.clone(),
        })
    }
}
