//! Pre-flight validation of eviction requests.
//!
//! The guard runs before any pod is listed or deleted. Checks run in a fixed
//! order and stop at the first failure:
//!
//! 1. a node was named
//! 2. the node exists
//! 3. the node is not part of the control plane
//! 4. the namespace exists
//! 5. the namespace is not system-reserved
//! 6. the batch size is at least one
//!
//! Only read-only lookups are issued, so a rejection never leaves the cluster
//! in a different state.

use std::fmt;

use dolphin_core::EvictionRequest;
use serde::Serialize;
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::ClusterGateway;

/// Outcome of evaluating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum GuardResult {
    /// The request may proceed.
    Allowed,
    /// The request must not proceed.
    Rejected(Rejection),
}

impl GuardResult {
    /// Returns true if the request may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert into a `Result`, turning a rejection into an error.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] if the request was rejected.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Self::Allowed => Ok(()),
            Self::Rejected(rejection) => Err(rejection),
        }
    }
}

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Rejection {
    /// No node was named.
    NodeRequired,
    /// The node does not exist.
    NodeNotFound(String),
    /// The node lookup failed for a reason other than absence.
    NodeLookupFailed {
        /// Node name.
        name: String,
        /// Gateway error message.
        message: String,
    },
    /// The node carries the control-plane role.
    ControlPlaneNode(String),
    /// The namespace does not exist.
    NamespaceNotFound(String),
    /// The namespace lookup failed for a reason other than absence.
    NamespaceLookupFailed {
        /// Namespace name.
        name: String,
        /// Gateway error message.
        message: String,
    },
    /// The namespace is reserved for the cluster itself.
    SystemNamespace(String),
    /// The batch size is below one.
    InvalidBatchSize(i64),
}

impl Rejection {
    /// Check if the caller can fix this by changing the command line alone.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::NodeRequired | Self::InvalidBatchSize(_))
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeRequired => write!(f, "node required"),
            Self::NodeNotFound(name) => write!(f, "node not found: {name}"),
            Self::NodeLookupFailed { name, message } => {
                write!(f, "node not found: {name} ({message})")
            }
            Self::ControlPlaneNode(name) => write!(f, "control-plane node: {name}"),
            Self::NamespaceNotFound(name) => write!(f, "namespace does not exist: {name}"),
            Self::NamespaceLookupFailed { name, message } => {
                write!(f, "namespace does not exist: {name} ({message})")
            }
            Self::SystemNamespace(name) => write!(f, "system namespace: {name}"),
            Self::InvalidBatchSize(size) => write!(f, "invalid batch size: {size}"),
        }
    }
}

/// Evaluate a request against the current cluster state.
///
/// Lookup failures are terminal rejections; nothing is retried.
pub async fn evaluate<G>(gateway: &G, request: &EvictionRequest) -> GuardResult
where
    G: ClusterGateway + ?Sized,
{
    match check(gateway, request).await {
        Ok(()) => GuardResult::Allowed,
        Err(rejection) => {
            debug!(
                namespace = request.namespace(),
                node = ?request.node_name(),
                %rejection,
                "Eviction request rejected"
            );
            GuardResult::Rejected(rejection)
        }
    }
}

async fn check<G>(gateway: &G, request: &EvictionRequest) -> Result<(), Rejection>
where
    G: ClusterGateway + ?Sized,
{
    let node_name = request.node_name().ok_or(Rejection::NodeRequired)?;

    let node = gateway
        .get_node(node_name)
        .await
        .map_err(|e| match e {
            GatewayError::NotFound { .. } => Rejection::NodeNotFound(node_name.to_string()),
            other => Rejection::NodeLookupFailed {
                name: node_name.to_string(),
                message: other.to_string(),
            },
        })?;

    if node.is_control_plane {
        return Err(Rejection::ControlPlaneNode(node.name));
    }

    let namespace = request.namespace();
    let info = gateway
        .get_namespace(namespace)
        .await
        .map_err(|e| match e {
            GatewayError::NotFound { .. } => Rejection::NamespaceNotFound(namespace.to_string()),
            other => Rejection::NamespaceLookupFailed {
                name: namespace.to_string(),
                message: other.to_string(),
            },
        })?;

    if !info.exists {
        return Err(Rejection::NamespaceNotFound(info.name));
    }
    if info.is_system_reserved {
        return Err(Rejection::SystemNamespace(info.name));
    }

    if request.batch_size() < 1 {
        return Err(Rejection::InvalidBatchSize(request.batch_size()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::{GatewayCall, MockGateway};

    fn cluster() -> MockGateway {
        MockGateway::new()
            .with_node("worker2")
            .with_control_plane_node("kube-control-plane")
            .with_namespace("web")
            .with_namespace("kube-system")
            .with_namespace("kube-public")
            .with_namespace("kube-node-lease")
    }

    fn request(node: &str, namespace: &str) -> EvictionRequest {
        EvictionRequest::builder()
            .node(node)
            .namespace(namespace)
            .build()
    }

    #[tokio::test]
    async fn allows_worker_node_and_user_namespace() {
        let gateway = cluster();
        let result = evaluate(&gateway, &request("worker2", "web")).await;
        assert_eq!(result, GuardResult::Allowed);
        assert!(result.is_allowed());
    }

    #[tokio::test]
    async fn rejects_missing_node_without_lookups() {
        let gateway = cluster();
        let req = EvictionRequest::builder().namespace("web").build();

        let result = evaluate(&gateway, &req).await;
        assert_eq!(result, GuardResult::Rejected(Rejection::NodeRequired));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_node() {
        let gateway = cluster();
        let result = evaluate(&gateway, &request("kube-worker3", "web")).await;
        assert_eq!(
            result,
            GuardResult::Rejected(Rejection::NodeNotFound("kube-worker3".to_string()))
        );
        // Stops before the namespace lookup.
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::GetNode("kube-worker3".to_string())]
        );
    }

    #[tokio::test]
    async fn node_lookup_errors_are_rejections() {
        let gateway = cluster().fail_lookups("connection refused");
        let result = evaluate(&gateway, &request("worker2", "web")).await;
        assert_eq!(
            result,
            GuardResult::Rejected(Rejection::NodeLookupFailed {
                name: "worker2".to_string(),
                message: "connection refused".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn rejects_control_plane_regardless_of_other_fields() {
        let gateway = cluster();
        for namespace in ["web", "kube-system", "missing"] {
            for batch_size in [-3, 0, 1, 50] {
                let req = EvictionRequest::builder()
                    .node("kube-control-plane")
                    .namespace(namespace)
                    .batch_size(batch_size)
                    .build();
                let result = evaluate(&gateway, &req).await;
                assert_eq!(
                    result,
                    GuardResult::Rejected(Rejection::ControlPlaneNode(
                        "kube-control-plane".to_string()
                    ))
                );
            }
        }
    }

    #[tokio::test]
    async fn rejects_unknown_namespace() {
        let gateway = cluster();
        let result = evaluate(&gateway, &request("worker2", "webi")).await;
        assert_eq!(
            result,
            GuardResult::Rejected(Rejection::NamespaceNotFound("webi".to_string()))
        );
    }

    #[tokio::test]
    async fn rejects_system_namespaces() {
        let gateway = cluster();
        for namespace in dolphin_core::SYSTEM_NAMESPACES {
            let result = evaluate(&gateway, &request("worker2", namespace)).await;
            assert_eq!(
                result,
                GuardResult::Rejected(Rejection::SystemNamespace(namespace.to_string()))
            );
        }
    }

    #[tokio::test]
    async fn rejects_non_positive_batch_size() {
        let gateway = cluster();
        for size in [0, -1, -3] {
            let req = EvictionRequest::builder()
                .node("worker2")
                .namespace("web")
                .batch_size(size)
                .build();
            let result = evaluate(&gateway, &req).await;
            assert_eq!(
                result,
                GuardResult::Rejected(Rejection::InvalidBatchSize(size))
            );
        }
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(Rejection::NodeRequired.to_string(), "node required");
        assert_eq!(
            Rejection::NodeNotFound("kube-worker3".to_string()).to_string(),
            "node not found: kube-worker3"
        );
        assert_eq!(
            Rejection::InvalidBatchSize(-3).to_string(),
            "invalid batch size: -3"
        );
        assert!(GuardResult::Rejected(Rejection::NodeRequired)
            .into_result()
            .is_err());
    }
}
