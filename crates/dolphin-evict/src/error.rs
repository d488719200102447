//! Error types for the eviction crate.

use dolphin_core::PodRef;
use thiserror::Error;

use crate::guard::Rejection;

/// Errors returned by a [`ClusterGateway`](crate::ClusterGateway).
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The named object does not exist.
    #[error("{kind}s \"{name}\" not found")]
    NotFound {
        /// Lower-case resource kind, e.g. `node`.
        kind: &'static str,
        /// Object name.
        name: String,
    },

    /// Kubernetes API error.
    #[error("Kubernetes API error: {0}")]
    KubeApi(#[from] kube::Error),

    /// Client configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other failure reported by the gateway.
    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Build a not-found error for a resource kind.
    #[must_use]
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Check if this error means the object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is likely transient.
    ///
    /// Nothing in this crate retries; the flag is informational for callers.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::KubeApi(kube::Error::Api(resp)) => resp.code == 429 || resp.code >= 500,
            Self::KubeApi(_) => true,
            Self::NotFound { .. } | Self::Config(_) | Self::Other(_) => false,
        }
    }
}

/// A specialized Result type for gateway calls.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors that end an eviction run.
#[derive(Error, Debug)]
pub enum EvictError {
    /// The guard refused the request. Nothing was deleted.
    #[error("{0}")]
    Rejected(Rejection),

    /// The pod snapshot could not be listed. Nothing was deleted.
    #[error("failed to list pods in namespace {namespace} on node {node}: {source}")]
    List {
        /// Target namespace.
        namespace: String,
        /// Target node.
        node: String,
        /// Underlying gateway error.
        source: GatewayError,
    },

    /// A delete call failed. Pods deleted before it stay deleted.
    #[error("failed to delete pod {pod}: {source}")]
    Execution {
        /// The pod whose deletion failed.
        pod: PodRef,
        /// Pods deleted before the failure, in order.
        deleted: Vec<PodRef>,
        /// Underlying gateway error.
        source: GatewayError,
    },

    /// The run was interrupted between batches.
    #[error("eviction cancelled after deleting {} pod(s)", .deleted.len())]
    Cancelled {
        /// Pods deleted before cancellation, in order.
        deleted: Vec<PodRef>,
    },
}

impl EvictError {
    /// Pods already deleted when the run stopped.
    #[must_use]
    pub fn deleted(&self) -> &[PodRef] {
        match self {
            Self::Execution { deleted, .. } | Self::Cancelled { deleted } => deleted,
            Self::Rejected(_) | Self::List { .. } => &[],
        }
    }

    /// Check if the error was caused by caller input rather than cluster state.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        match self {
            Self::Rejected(rejection) => rejection.is_input_error(),
            _ => false,
        }
    }

    /// Process exit code a front end should use for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Rejected(_) => 2,
            Self::List { .. } | Self::Execution { .. } => 1,
            Self::Cancelled { .. } => 130,
        }
    }
}

impl From<Rejection> for EvictError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

/// A specialized Result type for eviction runs.
pub type Result<T> = std::result::Result<T, EvictError>;
