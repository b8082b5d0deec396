//! Workload identifier sanitization
//!
//! Maps opaque caller-supplied workload identifiers to cluster-legal
//! resource names. The transform is deterministic and idempotent: the same
//! identifier always yields the same name, and the name is the job's key,
//! so every component derives it independently instead of passing it around.

/// Fixed prefix applied to every sanitized job name.
pub const JOB_NAME_PREFIX: &str = "agent-";

/// Derive the cluster-legal job name for a workload identifier.
///
/// Lowercases, strips every character outside `[a-z0-9-]`, collapses
/// consecutive hyphens, trims leading/trailing hyphens, then applies the
/// fixed `agent-` prefix. A degenerate input (all-illegal characters)
/// legally collapses to just the prefix; that is not an error.
///
/// An input that already carries the prefix has it stripped once before
/// normalization, which makes the function idempotent.
pub fn job_name(raw: &str) -> String {
    let raw = raw.strip_prefix(JOB_NAME_PREFIX).unwrap_or(raw);
    format!("{}{}", JOB_NAME_PREFIX, normalize(raw))
}

/// Normalize a raw string into a cluster-legal label value (no prefix).
///
/// Used for the `ownerId` label carried on the job and its pod template.
pub fn label_value(raw: &str) -> String {
    normalize(raw)
}

fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_hyphen = false;
    for c in raw.chars() {
        let c = c.to_ascii_lowercase();
        match c {
            'a'..='z' | '0'..='9' => {
                out.push(c);
                last_hyphen = false;
            }
            '-' => {
                if !last_hyphen && !out.is_empty() {
                    out.push('-');
                }
                last_hyphen = true;
            }
            _ => {}
        }
    }
    out.trim_end_matches('-').to_string()
}
