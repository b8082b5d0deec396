//! Agent job specification builder

use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::config::Settings;
use crate::naming;

/// Value of the `app` label on every agent job
pub const APP_LABEL: &str = "legate-agent";

/// Build the job specification for one delegated unit of work.
///
/// One container, restart policy `Never`, a single replica with a zero
/// backoff limit (so at most one live pod exists for the job), bounded
/// resource requests/limits, and four environment variables carrying the
/// access token, the internal API base address, the owner reference, and
/// the workload id. Labels on both the job and its pod template carry the
/// sanitized owner reference and the sanitized job name, enabling later
/// label-based lookups.
pub fn agent_job(settings: &Settings, workload_id: &str, owner_id: &str, token: &str) -> Job {
    let name = naming::job_name(workload_id);
    let labels = job_labels(&name, owner_id);

    let container = Container {
        name: "agent".to_string(),
        image: Some(settings.image.clone()),
        env: Some(vec![
            env_var("TOKEN", token),
            env_var("API_BASE_URL", &settings.api_base_url),
            env_var("OWNER_ID", owner_id),
            env_var("WORKLOAD_ID", workload_id),
        ]),
        resources: Some(ResourceRequirements {
            requests: Some(quantities(&[("cpu", "250m"), ("memory", "512Mi")])),
            limits: Some(quantities(&[("cpu", "1"), ("memory", "2Gi")])),
            ..Default::default()
        }),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(settings.namespace.clone()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            parallelism: Some(1),
            completions: Some(1),
            backoff_limit: Some(0),
            suspend: Some(false),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    restart_policy: Some("Never".to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

fn job_labels(sanitized_name: &str, owner_id: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), APP_LABEL.to_string());
    labels.insert("ownerId".to_string(), naming::label_value(owner_id));
    labels.insert("workloadId".to_string(), sanitized_name.to_string());
    labels
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}

fn quantities(pairs: &[(&str, &str)]) -> BTreeMap<String, Quantity> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
        .collect()
}
