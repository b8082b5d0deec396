//! Status reconciliation
//!
//! Folds the current job resource and its pod(s) into one unified lifecycle
//! status. The status is re-derived from a fresh control-plane read on every
//! query - nothing here is cached, so there is nothing to invalidate.
//!
//! Precedence is load-bearing and preserved exactly: a suspended job reports
//! `paused` even if its counters already show success, and the job's own
//! success/failure counters win over a stale pod phase.

use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterApi;
use crate::naming;
use crate::Error;

/// Unified lifecycle phase of a delegated workload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadPhase {
    /// Job exists but no pod has reached a decisive state yet
    Pending,
    /// A pod is currently executing
    Running,
    /// The job's suspend flag is set
    Paused,
    /// The workload finished successfully
    Completed,
    /// The workload finished unsuccessfully
    Failed,
    /// No job resource exists for this workload
    NotFound,
}

/// Derived, non-persisted status snapshot for one workload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadStatus {
    /// Unified lifecycle phase
    pub phase: WorkloadPhase,
    /// Exit code, once the workload terminated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Termination reason reported by the container runtime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Raw pod phase, when a pod was inspected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_phase: Option<String>,
}

impl WorkloadStatus {
    fn phase(phase: WorkloadPhase) -> Self {
        Self {
            phase,
            exit_code: None,
            reason: None,
            pod_phase: None,
        }
    }
}

/// Compute the unified status of a workload from a fresh cluster snapshot.
///
/// A "not found" response for the job lookup is a normal outcome mapped to
/// [`WorkloadPhase::NotFound`]; all other API errors propagate unmodified.
pub async fn workload_status(
    cluster: &dyn ClusterApi,
    workload_id: &str,
) -> Result<WorkloadStatus, Error> {
    let name = naming::job_name(workload_id);

    let Some(job) = cluster.get_job(&name).await? else {
        return Ok(WorkloadStatus::phase(WorkloadPhase::NotFound));
    };

    if let Some(status) = classify_job(&job) {
        return Ok(status);
    }

    let pods = cluster.list_job_pods(&name).await?;
    Ok(classify_pod(pods.first()))
}

/// Classify a workload from the job resource alone.
///
/// Returns `Some` when the job itself is decisive (suspended, or a
/// success/failure counter is set); `None` means the pods must be
/// inspected. Suspension wins over the counters.
pub fn classify_job(job: &Job) -> Option<WorkloadStatus> {
    let suspended = job
        .spec
        .as_ref()
        .and_then(|s| s.suspend)
        .unwrap_or(false);
    if suspended {
        return Some(WorkloadStatus::phase(WorkloadPhase::Paused));
    }

    let status = job.status.as_ref();
    if status.and_then(|s| s.succeeded).unwrap_or(0) > 0 {
        return Some(WorkloadStatus {
            exit_code: Some(0),
            ..WorkloadStatus::phase(WorkloadPhase::Completed)
        });
    }
    if status.and_then(|s| s.failed).unwrap_or(0) > 0 {
        return Some(WorkloadStatus {
            exit_code: Some(1),
            ..WorkloadStatus::phase(WorkloadPhase::Failed)
        });
    }
    None
}

/// Classify a workload from its (first) pod.
///
/// No pod yet means the job controller has not scheduled one: `pending`.
/// A terminated pod reports the container's exit code, defaulting to 0 for
/// a succeeded pod and 1 for a failed one when the terminated state is
/// absent. Unknown phases rank as `pending`.
pub fn classify_pod(pod: Option<&Pod>) -> WorkloadStatus {
    let Some(pod) = pod else {
        return WorkloadStatus::phase(WorkloadPhase::Pending);
    };

    let pod_phase = pod.status.as_ref().and_then(|s| s.phase.clone());
    let (exit_code, reason) = terminated_state(pod);

    let mut status = match pod_phase.as_deref() {
        Some("Running") => WorkloadStatus::phase(WorkloadPhase::Running),
        Some("Succeeded") => WorkloadStatus {
            exit_code: Some(exit_code.unwrap_or(0)),
            ..WorkloadStatus::phase(WorkloadPhase::Completed)
        },
        Some("Failed") => WorkloadStatus {
            exit_code: Some(exit_code.unwrap_or(1)),
            reason,
            ..WorkloadStatus::phase(WorkloadPhase::Failed)
        },
        _ => WorkloadStatus::phase(WorkloadPhase::Pending),
    };
    status.pod_phase = pod_phase;
    status
}

/// Exit code and reason from the first container's terminated state
fn terminated_state(pod: &Pod) -> (Option<i32>, Option<String>) {
    let terminated = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .and_then(|cs| cs.first())
        .and_then(|c| c.state.as_ref())
        .and_then(|s| s.terminated.as_ref());
    match terminated {
        Some(t) => (Some(t.exit_code), t.reason.clone()),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::MockClusterApi;
    use k8s_openapi::api::batch::v1::{JobSpec, JobStatus};
    use k8s_openapi::api::core::v1::{
        ContainerState, ContainerStateTerminated, ContainerStatus, PodStatus,
    };

    fn sample_job(suspend: Option<bool>, succeeded: Option<i32>, failed: Option<i32>) -> Job {
        Job {
            spec: Some(JobSpec {
                suspend,
                ..Default::default()
            }),
            status: Some(JobStatus {
                succeeded,
                failed,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn sample_pod(phase: &str, terminated: Option<(i32, &str)>) -> Pod {
        let container_statuses = terminated.map(|(exit_code, reason)| {
            vec![ContainerStatus {
                state: Some(ContainerState {
                    terminated: Some(ContainerStateTerminated {
                        exit_code,
                        reason: Some(reason.to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }]
        });
        Pod {
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                container_statuses,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    // ===== Job-level precedence =====

    /// Story: A paused job reports paused even after its counters show
    /// success. Suspension takes precedence so the dashboard reflects the
    /// user's pause request, not a stale outcome.
    #[test]
    fn story_suspend_wins_over_success_counter() {
        let job = sample_job(Some(true), Some(1), None);
        let status = classify_job(&job).expect("job should be decisive");
        assert_eq!(status.phase, WorkloadPhase::Paused);
        assert_eq!(status.exit_code, None);
    }

    #[test]
    fn succeeded_counter_completes_with_exit_zero() {
        let job = sample_job(Some(false), Some(1), None);
        let status = classify_job(&job).expect("job should be decisive");
        assert_eq!(status.phase, WorkloadPhase::Completed);
        assert_eq!(status.exit_code, Some(0));
    }

    #[test]
    fn failed_counter_fails_with_exit_one() {
        let job = sample_job(None, None, Some(2));
        let status = classify_job(&job).expect("job should be decisive");
        assert_eq!(status.phase, WorkloadPhase::Failed);
        assert_eq!(status.exit_code, Some(1));
    }

    #[test]
    fn undecided_job_defers_to_pods() {
        assert_eq!(classify_job(&sample_job(None, None, None)), None);
        assert_eq!(classify_job(&sample_job(Some(false), Some(0), Some(0))), None);
    }

    // ===== Pod-level classification =====

    #[test]
    fn no_pod_is_pending() {
        let status = classify_pod(None);
        assert_eq!(status.phase, WorkloadPhase::Pending);
        assert_eq!(status.pod_phase, None);
    }

    #[test]
    fn running_pod_is_running() {
        let status = classify_pod(Some(&sample_pod("Running", None)));
        assert_eq!(status.phase, WorkloadPhase::Running);
        assert_eq!(status.pod_phase.as_deref(), Some("Running"));
    }

    #[test]
    fn succeeded_pod_reports_terminated_exit_code() {
        let status = classify_pod(Some(&sample_pod("Succeeded", Some((0, "Completed")))));
        assert_eq!(status.phase, WorkloadPhase::Completed);
        assert_eq!(status.exit_code, Some(0));
    }

    /// Story: An OOM-killed agent surfaces the real exit code and reason,
    /// not the generic default.
    #[test]
    fn story_failed_pod_reports_exit_code_and_reason() {
        let status = classify_pod(Some(&sample_pod("Failed", Some((137, "OOMKilled")))));
        assert_eq!(status.phase, WorkloadPhase::Failed);
        assert_eq!(status.exit_code, Some(137));
        assert_eq!(status.reason.as_deref(), Some("OOMKilled"));
        assert_eq!(status.pod_phase.as_deref(), Some("Failed"));
    }

    /// Terminated state absent: exit codes default to 0 on success, 1 on
    /// failure.
    #[test]
    fn missing_terminated_state_defaults_exit_codes() {
        let status = classify_pod(Some(&sample_pod("Succeeded", None)));
        assert_eq!(status.exit_code, Some(0));

        let status = classify_pod(Some(&sample_pod("Failed", None)));
        assert_eq!(status.exit_code, Some(1));
        assert_eq!(status.reason, None);
    }

    #[test]
    fn unknown_pod_phase_ranks_as_pending() {
        let status = classify_pod(Some(&sample_pod("Unknown", None)));
        assert_eq!(status.phase, WorkloadPhase::Pending);
        assert_eq!(status.pod_phase.as_deref(), Some("Unknown"));

        let status = classify_pod(Some(&sample_pod("Pending", None)));
        assert_eq!(status.phase, WorkloadPhase::Pending);
    }

    // ===== Full reconciliation over the cluster seam =====

    /// Story: A missing job is the `not_found` status, never an error -
    /// the upstream layer renders it as an ordinary status value.
    #[tokio::test]
    async fn story_missing_job_is_not_found_status() {
        let mut cluster = MockClusterApi::new();
        cluster.expect_get_job().returning(|_| Ok(None));

        let status = workload_status(&cluster, "task-1")
            .await
            .expect("lookup should not error");
        assert_eq!(status.phase, WorkloadPhase::NotFound);
    }

    /// Story: Job counters win over a stale pod phase - once the job
    /// records success, a pod still reporting Running is not consulted.
    #[tokio::test]
    async fn story_job_counters_beat_stale_pod_phase() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_get_job()
            .returning(|_| Ok(Some(sample_job(None, Some(1), None))));
        // list_job_pods must not be called; no expectation is set for it

        let status = workload_status(&cluster, "task-1")
            .await
            .expect("status should resolve");
        assert_eq!(status.phase, WorkloadPhase::Completed);
        assert_eq!(status.exit_code, Some(0));
    }

    #[tokio::test]
    async fn undecided_job_with_no_pods_is_pending() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_get_job()
            .returning(|_| Ok(Some(sample_job(None, None, None))));
        cluster
            .expect_list_job_pods()
            .withf(|name| name == "agent-task-1")
            .returning(|_| Ok(vec![]));

        let status = workload_status(&cluster, "task-1")
            .await
            .expect("status should resolve");
        assert_eq!(status.phase, WorkloadPhase::Pending);
    }

    #[tokio::test]
    async fn running_pod_reports_running() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_get_job()
            .returning(|_| Ok(Some(sample_job(None, None, None))));
        cluster
            .expect_list_job_pods()
            .returning(|_| Ok(vec![sample_pod("Running", None)]));

        let status = workload_status(&cluster, "task-1")
            .await
            .expect("status should resolve");
        assert_eq!(status.phase, WorkloadPhase::Running);
    }

    /// Non-404 API errors propagate unmodified.
    #[tokio::test]
    async fn transport_errors_propagate() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_get_job()
            .returning(|_| Err(Error::transport("connection reset")));

        let err = workload_status(&cluster, "task-1")
            .await
            .expect_err("error should propagate");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn status_serializes_with_snake_case_phase() {
        let status = WorkloadStatus {
            exit_code: Some(137),
            reason: Some("OOMKilled".to_string()),
            pod_phase: Some("Failed".to_string()),
            ..WorkloadStatus::phase(WorkloadPhase::Failed)
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["phase"], "failed");
        assert_eq!(json["exit_code"], 137);

        let json = serde_json::to_value(WorkloadStatus::phase(WorkloadPhase::NotFound)).unwrap();
        assert_eq!(json["phase"], "not_found");
        assert!(json.get("exit_code").is_none());
    }
}
