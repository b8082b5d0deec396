//! Legate - delegates autonomous agent work to Kubernetes Jobs
//!
//! Legate is the delegation layer of a task dashboard: it creates,
//! monitors, pauses/resumes, and tears down run-to-completion Jobs on
//! behalf of a task, and reconciles the cluster's eventually-consistent
//! Job/Pod state into a single lifecycle view consumable by the rest of
//! the system.
//!
//! Cluster state is read fresh on every query; this subsystem keeps no
//! cache and owns no background loop. Periodic polling is the caller's
//! responsibility.
//!
//! # Modules
//!
//! - [`naming`] - Workload identifier sanitization (idempotent job names)
//! - [`access`] - Cluster access resolution (in-cluster vs. kubeconfig)
//! - [`cluster`] - Typed seam over the job/pod control-plane operations
//! - [`manifest`] - Agent job specification builder
//! - [`submit`] - Job creation with dual-path transport fallback
//! - [`status`] - Job/Pod reconciliation into one unified status
//! - [`control`] - Pause, resume, and terminate
//! - [`logs`] - Pod log retrieval with name-prefix fallback
//! - [`config`] - Runtime settings
//! - [`error`] - Error types for the delegation layer

#![deny(missing_docs)]

pub mod access;
pub mod cluster;
pub mod config;
pub mod control;
pub mod error;
pub mod logs;
pub mod manifest;
pub mod naming;
pub mod status;
pub mod submit;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
