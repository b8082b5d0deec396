//! Workload lifecycle control: pause, resume, terminate

use tracing::{debug, info};

use crate::cluster::ClusterApi;
use crate::naming;
use crate::Error;

/// Suspend the workload's job so no new pods are scheduled for it.
///
/// This is a request, not a guarantee: there is no verification that the
/// pod actually stopped. API errors propagate.
pub async fn pause(cluster: &dyn ClusterApi, workload_id: &str) -> Result<(), Error> {
    set_suspend(cluster, workload_id, true).await
}

/// Clear the suspend flag so the job schedules pods again.
pub async fn resume(cluster: &dyn ClusterApi, workload_id: &str) -> Result<(), Error> {
    set_suspend(cluster, workload_id, false).await
}

async fn set_suspend(
    cluster: &dyn ClusterApi,
    workload_id: &str,
    suspend: bool,
) -> Result<(), Error> {
    let name = naming::job_name(workload_id);
    cluster.patch_job_suspend(&name, suspend).await?;
    info!(name = %name, suspend, "patched job suspend flag");
    Ok(())
}

/// Delete the workload's job with background cascade propagation, removing
/// its pods asynchronously without blocking the caller.
///
/// A 404 means the job is already gone; that is treated as success so a
/// double-terminate never breaks the caller's own bookkeeping. All other
/// errors propagate.
pub async fn terminate(cluster: &dyn ClusterApi, workload_id: &str) -> Result<(), Error> {
    let name = naming::job_name(workload_id);
    match cluster.delete_job(&name).await {
        Ok(()) => {
            info!(name = %name, "deleted agent job");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            debug!(name = %name, "job already deleted");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
