//! Typed seam over the control-plane APIs this subsystem consumes
//!
//! The [`ClusterApi`] trait abstracts the handful of job/pod operations the
//! delegation layer needs, so the reconciliation and lifecycle logic can be
//! tested against a mock while production wires in the real client.

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, LogParams, Patch, PatchParams, PostParams};
use serde_json::json;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::access::AccessContext;
use crate::Error;

/// Control-plane operations consumed by the delegation layer
///
/// One implementation wraps the real client; tests mock this trait.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetch a job by its sanitized name; `None` if the control plane
    /// reports it not found (a normal outcome, not an error)
    async fn get_job(&self, name: &str) -> Result<Option<Job>, Error>;

    /// Create a job resource
    async fn create_job(&self, job: &Job) -> Result<Job, Error>;

    /// Merge-patch the job's suspend flag
    async fn patch_job_suspend(&self, name: &str, suspend: bool) -> Result<(), Error>;

    /// Delete a job with background cascade propagation
    async fn delete_job(&self, name: &str) -> Result<(), Error>;

    /// List the pods owned by a job, by `job-name` label selector
    async fn list_job_pods(&self, job_name: &str) -> Result<Vec<Pod>, Error>;

    /// List every pod in the namespace (prefix-match fallback for lookups
    /// where label propagation has not caught up yet)
    async fn list_all_pods(&self) -> Result<Vec<Pod>, Error>;

    /// Fetch the current log text of a pod
    async fn pod_logs(&self, pod_name: &str) -> Result<String, Error>;
}

/// Real implementation backed by memoized `Api<Job>` / `Api<Pod>` handles
pub struct KubeClusterApi {
    jobs: Api<Job>,
    pods: Api<Pod>,
}

impl KubeClusterApi {
    /// Build the memoized API handles from a resolved access context
    pub fn new(access: &AccessContext) -> Self {
        Self {
            jobs: Api::namespaced(access.client.clone(), &access.namespace),
            pods: Api::namespaced(access.client.clone(), &access.namespace),
        }
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn get_job(&self, name: &str) -> Result<Option<Job>, Error> {
        match self.jobs.get(name).await {
            Ok(job) => Ok(Some(job)),
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                debug!(name = %name, "job not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_job(&self, job: &Job) -> Result<Job, Error> {
        Ok(self.jobs.create(&PostParams::default(), job).await?)
    }

    async fn patch_job_suspend(&self, name: &str, suspend: bool) -> Result<(), Error> {
        let patch = json!({ "spec": { "suspend": suspend } });
        self.jobs
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn delete_job(&self, name: &str) -> Result<(), Error> {
        self.jobs.delete(name, &DeleteParams::background()).await?;
        Ok(())
    }

    async fn list_job_pods(&self, job_name: &str) -> Result<Vec<Pod>, Error> {
        let params = ListParams::default().labels(&format!("job-name={job_name}"));
        let pods = self.pods.list(&params).await?;
        Ok(pods.items)
    }

    async fn list_all_pods(&self) -> Result<Vec<Pod>, Error> {
        let pods = self.pods.list(&ListParams::default()).await?;
        Ok(pods.items)
    }

    async fn pod_logs(&self, pod_name: &str) -> Result<String, Error> {
        Ok(self.pods.logs(pod_name, &LogParams::default()).await?)
    }
}
