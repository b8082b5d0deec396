//! Error types for the Legate delegation layer

use thiserror::Error;

/// Main error type for Legate operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Cluster access could not be resolved (no usable credentials)
    #[error("access resolution error: {0}")]
    AccessResolution(String),

    /// Direct control-plane transport error (HTTP status, I/O)
    #[error("transport error: {0}")]
    Transport(String),

    /// No pods found for a workload after both label and prefix lookups
    #[error("no pods found for workload: {0}")]
    NoPods(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an access resolution error with the given message
    pub fn access_resolution(msg: impl Into<String>) -> Self {
        Self::AccessResolution(msg.into())
    }

    /// Create a transport error with the given message
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a no-pods error for the given workload identifier
    pub fn no_pods(workload_id: impl Into<String>) -> Self {
        Self::NoPods(workload_id.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// True if this error is a control-plane 404.
    ///
    /// A 404 on job lookup or delete is a normal outcome (the resource is
    /// simply gone), never an exception - callers map it to `NotFound`
    /// status or treat the operation as already done.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Kube(kube::Error::Api(resp)) if resp.code == 404)
    }
}
