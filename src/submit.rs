//! Workload submission with dual-path transport fallback
//!
//! Job creation is attempted over an ordered list of transports behind one
//! trait: first a direct, minimal HTTP call to the control plane's REST
//! endpoint, then the general-purpose client library. The first success
//! wins; if every transport fails, the last error is propagated.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use tracing::{info, warn};

use crate::access::{AccessContext, SERVICE_ACCOUNT_CA_PATH, SERVICE_ACCOUNT_TOKEN_PATH};
use crate::cluster::ClusterApi;
use crate::config::Settings;
use crate::manifest;
use crate::Error;

/// One way of creating a job resource on the cluster
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Short transport name used in fallback logging
    fn name(&self) -> &'static str;

    /// Create the job, returning the resource the cluster stored
    async fn create(&self, job: &Job) -> Result<Job, Error>;
}

/// Primary path: direct HTTP POST to the batch/v1 job-creation endpoint.
///
/// Authenticates with a bearer token read fresh from the service-account
/// token file and trusts the mounted cluster CA, so it only works with the
/// in-cluster identity.
pub struct RestTransport {
    base_url: String,
    namespace: String,
    timeout: Duration,
    token_path: PathBuf,
    ca_path: PathBuf,
}

impl RestTransport {
    /// Build the direct-REST transport from the resolved access context
    pub fn new(access: &AccessContext, settings: &Settings) -> Self {
        Self {
            base_url: access.cluster_url.trim_end_matches('/').to_string(),
            namespace: access.namespace.clone(),
            timeout: settings.request_timeout,
            token_path: PathBuf::from(SERVICE_ACCOUNT_TOKEN_PATH),
            ca_path: PathBuf::from(SERVICE_ACCOUNT_CA_PATH),
        }
    }
}

#[async_trait]
impl JobTransport for RestTransport {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn create(&self, job: &Job) -> Result<Job, Error> {
        let token = tokio::fs::read_to_string(&self.token_path)
            .await
            .map_err(|e| Error::transport(format!("failed to read service-account token: {e}")))?;
        let ca_pem = tokio::fs::read(&self.ca_path)
            .await
            .map_err(|e| Error::transport(format!("failed to read cluster CA: {e}")))?;
        let ca_cert = reqwest::Certificate::from_pem(&ca_pem)
            .map_err(|e| Error::transport(format!("invalid cluster CA certificate: {e}")))?;

        let client = reqwest::Client::builder()
            .add_root_certificate(ca_cert)
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;

        let url = format!(
            "{}/apis/batch/v1/namespaces/{}/jobs",
            self.base_url, self.namespace
        );
        let response = client
            .post(&url)
            .bearer_auth(token.trim())
            .json(job)
            .send()
            .await
            .map_err(|e| Error::transport(format!("job creation request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(format!(
                "job creation failed: {status} - {body}"
            )));
        }

        response
            .json::<Job>()
            .await
            .map_err(|e| Error::serialization(format!("failed to decode created job: {e}")))
    }
}

/// Fallback path: the general-purpose client library's create call
pub struct ApiTransport {
    cluster: Arc<dyn ClusterApi>,
}

impl ApiTransport {
    /// Build the client-library transport over the shared cluster seam
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self { cluster }
    }
}

#[async_trait]
impl JobTransport for ApiTransport {
    fn name(&self) -> &'static str {
        "client-library"
    }

    async fn create(&self, job: &Job) -> Result<Job, Error> {
        self.cluster.create_job(job).await
    }
}

/// The default transport order: direct REST first, client library second
pub fn default_transports(
    access: &AccessContext,
    settings: &Settings,
    cluster: Arc<dyn ClusterApi>,
) -> Vec<Box<dyn JobTransport>> {
    vec![
        Box::new(RestTransport::new(access, settings)),
        Box::new(ApiTransport::new(cluster)),
    ]
}

/// Build the job spec for a workload and submit it through the transport
/// chain. On success the cluster contains a new job resource and,
/// asynchronously, a scheduled pod.
pub async fn submit_workload(
    transports: &[Box<dyn JobTransport>],
    settings: &Settings,
    workload_id: &str,
    owner_id: &str,
    token: &str,
) -> Result<Job, Error> {
    let job = manifest::agent_job(settings, workload_id, owner_id, token);
    submit(transports, &job).await
}

/// Try each transport in order; first success wins, last error propagates.
pub async fn submit(transports: &[Box<dyn JobTransport>], job: &Job) -> Result<Job, Error> {
    let name = job.metadata.name.as_deref().unwrap_or_default();
    let mut last_err = Error::transport("no job transports configured");
    for transport in transports {
        match transport.create(job).await {
            Ok(created) => {
                info!(name = %name, transport = transport.name(), "created agent job");
                return Ok(created);
            }
            Err(e) => {
                warn!(
                    name = %name,
                    transport = transport.name(),
                    error = %e,
                    "job creation transport failed, trying next"
                );
                last_err = e;
            }
        }
    }
    Err(last_err)
}
