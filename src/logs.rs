//! Workload log retrieval
//!
//! Pods created by a job are normally found by label selector, but label
//! propagation is not always immediately consistent in every cluster state.
//! When the selector comes back empty, a best-effort name-prefix search
//! over all pods in the namespace recovers the pod instead.

use k8s_openapi::api::core::v1::Pod;
use tracing::debug;

use crate::cluster::ClusterApi;
use crate::naming;
use crate::Error;

/// Fetch the current log text of a workload's pod.
///
/// Tries the `job-name` label selector first, then falls back to a
/// name-prefix match over every pod in the namespace. Fails with
/// [`Error::NoPods`] only after both lookups come back empty.
pub async fn workload_logs(cluster: &dyn ClusterApi, workload_id: &str) -> Result<String, Error> {
    let name = naming::job_name(workload_id);

    let mut pods = cluster.list_job_pods(&name).await?;
    if pods.is_empty() {
        debug!(name = %name, "label lookup found no pods, trying name-prefix fallback");
        pods = cluster
            .list_all_pods()
            .await?
            .into_iter()
            .filter(|p| pod_name(p).starts_with(&name))
            .collect();
    }

    match pods.first().map(pod_name) {
        Some(pod_name) if !pod_name.is_empty() => cluster.pod_logs(pod_name).await,
        _ => Err(Error::no_pods(workload_id)),
    }
}

fn pod_name(pod: &Pod) -> &str {
    pod.metadata.name.as_deref().unwrap_or_default()
}
