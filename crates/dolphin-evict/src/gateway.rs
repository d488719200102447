//! The cluster gateway seam.
//!
//! Every call the eviction engine makes against a cluster goes through
//! [`ClusterGateway`]. [`KubeGateway`](crate::KubeGateway) talks to a real API
//! server; [`mock::MockGateway`] keeps everything in memory for tests.

use std::sync::Arc;

use async_trait::async_trait;
use dolphin_core::{NamespaceInfo, NodeRoleInfo, PodRef};

use crate::error::GatewayResult;

/// The four cluster capabilities the eviction engine depends on.
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// List the pods of `namespace` bound to `node_name`, in server order.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    async fn list_pods(&self, namespace: &str, node_name: &str) -> GatewayResult<Vec<PodRef>>;

    /// Delete a pod. With `dry_run` set the server validates the request
    /// without persisting anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is refused or the pod is gone.
    async fn delete_pod(&self, namespace: &str, name: &str, dry_run: bool) -> GatewayResult<()>;

    /// Look up a node.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`](crate::GatewayError::NotFound) if the
    /// node does not exist.
    async fn get_node(&self, name: &str) -> GatewayResult<NodeRoleInfo>;

    /// Look up a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`](crate::GatewayError::NotFound) if the
    /// namespace does not exist.
    async fn get_namespace(&self, name: &str) -> GatewayResult<NamespaceInfo>;
}

#[async_trait]
impl<T: ClusterGateway + ?Sized> ClusterGateway for Arc<T> {
    async fn list_pods(&self, namespace: &str, node_name: &str) -> GatewayResult<Vec<PodRef>> {
        (**self).list_pods(namespace, node_name).await
    }

    async fn delete_pod(&self, namespace: &str, name: &str, dry_run: bool) -> GatewayResult<()> {
        (**self).delete_pod(namespace, name, dry_run).await
    }

    async fn get_node(&self, name: &str) -> GatewayResult<NodeRoleInfo> {
        (**self).get_node(name).await
    }

    async fn get_namespace(&self, name: &str) -> GatewayResult<NamespaceInfo> {
        (**self).get_namespace(name).await
    }
}

/// An in-memory gateway for testing without a real cluster.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::time::Duration;

    use dolphin_core::CONTROL_PLANE_LABEL;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    use super::{async_trait, ClusterGateway, GatewayResult, NamespaceInfo, NodeRoleInfo, PodRef};
    use crate::error::GatewayError;

    /// A gateway call recorded by [`MockGateway`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum GatewayCall {
        /// `list_pods(namespace, node)`
        ListPods {
            /// Namespace argument.
            namespace: String,
            /// Node argument.
            node: String,
        },
        /// `delete_pod(namespace, name, dry_run)`
        DeletePod {
            /// Namespace argument.
            namespace: String,
            /// Pod name argument.
            name: String,
            /// Dry-run flag.
            dry_run: bool,
        },
        /// `get_node(name)`
        GetNode(String),
        /// `get_namespace(name)`
        GetNamespace(String),
    }

    /// A delete call together with the (tokio) time it was issued.
    #[derive(Debug, Clone)]
    pub struct DeleteRecord {
        /// Pod name.
        pub name: String,
        /// Dry-run flag.
        pub dry_run: bool,
        /// When the call was made.
        pub at: Instant,
    }

    #[derive(Default)]
    struct State {
        nodes: BTreeMap<String, BTreeMap<String, String>>,
        namespaces: BTreeSet<String>,
        pods: Vec<PodRef>,
        delete_failures: HashMap<String, String>,
        list_failure: Option<String>,
        lookup_failure: Option<String>,
        delete_latency: Duration,
        calls: Vec<GatewayCall>,
        deletes: Vec<DeleteRecord>,
    }

    /// A cluster held in memory.
    ///
    /// Pods are kept in insertion order, which is the order `list_pods`
    /// returns them in.
    #[derive(Default)]
    pub struct MockGateway {
        state: Mutex<State>,
    }

    impl MockGateway {
        /// Create an empty cluster.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a worker node.
        #[must_use]
        pub fn with_node(self, name: &str) -> Self {
            self.state.lock().nodes.insert(name.to_string(), BTreeMap::new());
            self
        }

        /// Add a node carrying the control-plane role label.
        #[must_use]
        pub fn with_control_plane_node(self, name: &str) -> Self {
            let labels = BTreeMap::from([(CONTROL_PLANE_LABEL.to_string(), String::new())]);
            self.state.lock().nodes.insert(name.to_string(), labels);
            self
        }

        /// Add a namespace.
        #[must_use]
        pub fn with_namespace(self, name: &str) -> Self {
            self.state.lock().namespaces.insert(name.to_string());
            self
        }

        /// Add a pod.
        #[must_use]
        pub fn with_pod(self, name: &str, namespace: &str, node: &str) -> Self {
            self.state.lock().pods.push(PodRef::new(name, namespace, node));
            self
        }

        /// Add `count` pods named `{prefix}-{i}`.
        #[must_use]
        pub fn with_pods(self, prefix: &str, count: usize, namespace: &str, node: &str) -> Self {
            {
                let mut state = self.state.lock();
                for i in 0..count {
                    state
                        .pods
                        .push(PodRef::new(format!("{prefix}-{i}"), namespace, node));
                }
            }
            self
        }

        /// Make deleting `pod` fail with `message`.
        #[must_use]
        pub fn fail_delete(self, pod: &str, message: &str) -> Self {
            self.state
                .lock()
                .delete_failures
                .insert(pod.to_string(), message.to_string());
            self
        }

        /// Make every `list_pods` call fail with `message`.
        #[must_use]
        pub fn fail_list(self, message: &str) -> Self {
            self.state.lock().list_failure = Some(message.to_string());
            self
        }

        /// Make every node and namespace lookup fail with `message`.
        #[must_use]
        pub fn fail_lookups(self, message: &str) -> Self {
            self.state.lock().lookup_failure = Some(message.to_string());
            self
        }

        /// Make every `delete_pod` call take `latency` to return.
        ///
        /// The delete is recorded and applied when the call starts.
        #[must_use]
        pub fn with_delete_latency(self, latency: Duration) -> Self {
            self.state.lock().delete_latency = latency;
            self
        }

        /// Remove a pod behind the caller's back, as another actor would.
        pub fn remove_pod(&self, name: &str) {
            self.state.lock().pods.retain(|p| p.name != name);
        }

        /// Pods currently in the cluster.
        #[must_use]
        pub fn pods(&self) -> Vec<PodRef> {
            self.state.lock().pods.clone()
        }

        /// Every call made so far, in order.
        #[must_use]
        pub fn calls(&self) -> Vec<GatewayCall> {
            self.state.lock().calls.clone()
        }

        /// Every delete call made so far, with timestamps.
        #[must_use]
        pub fn deletes(&self) -> Vec<DeleteRecord> {
            self.state.lock().deletes.clone()
        }

        /// Number of delete calls made so far.
        #[must_use]
        pub fn delete_count(&self) -> usize {
            self.state.lock().deletes.len()
        }

        fn apply_delete(
            &self,
            namespace: &str,
            name: &str,
            dry_run: bool,
        ) -> (GatewayResult<()>, Duration) {
            let mut state = self.state.lock();
            state.calls.push(GatewayCall::DeletePod {
                namespace: namespace.to_string(),
                name: name.to_string(),
                dry_run,
            });
            state.deletes.push(DeleteRecord {
                name: name.to_string(),
                dry_run,
                at: Instant::now(),
            });

            let result = if let Some(message) = state.delete_failures.get(name) {
                Err(GatewayError::Other(message.clone()))
            } else if let Some(position) = state
                .pods
                .iter()
                .position(|p| p.namespace == namespace && p.name == name)
            {
                if !dry_run {
                    state.pods.remove(position);
                }
                Ok(())
            } else {
                Err(GatewayError::not_found("pod", name))
            };
            (result, state.delete_latency)
        }
    }

    #[async_trait]
    impl ClusterGateway for MockGateway {
        async fn list_pods(&self, namespace: &str, node_name: &str) -> GatewayResult<Vec<PodRef>> {
            let mut state = self.state.lock();
            state.calls.push(GatewayCall::ListPods {
                namespace: namespace.to_string(),
                node: node_name.to_string(),
            });

            if let Some(message) = &state.list_failure {
                return Err(GatewayError::Other(message.clone()));
            }

            Ok(state
                .pods
                .iter()
                .filter(|p| p.namespace == namespace && p.node_name == node_name)
                .cloned()
                .collect())
        }

        async fn delete_pod(&self, namespace: &str, name: &str, dry_run: bool) -> GatewayResult<()> {
            let (result, latency) = self.apply_delete(namespace, name, dry_run);
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }

        async fn get_node(&self, name: &str) -> GatewayResult<NodeRoleInfo> {
            let mut state = self.state.lock();
            state.calls.push(GatewayCall::GetNode(name.to_string()));

            if let Some(message) = &state.lookup_failure {
                return Err(GatewayError::Other(message.clone()));
            }

            state
                .nodes
                .get(name)
                .map(|labels| NodeRoleInfo::from_labels(name, labels))
                .ok_or_else(|| GatewayError::not_found("node", name))
        }

        async fn get_namespace(&self, name: &str) -> GatewayResult<NamespaceInfo> {
            let mut state = self.state.lock();
            state.calls.push(GatewayCall::GetNamespace(name.to_string()));

            if let Some(message) = &state.lookup_failure {
                return Err(GatewayError::Other(message.clone()));
            }

            if state.namespaces.contains(name) {
                Ok(NamespaceInfo::existing(name))
            } else {
                Err(GatewayError::not_found("namespace", name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockGateway;
    use super::*;

    #[tokio::test]
    async fn mock_lists_by_namespace_and_node() {
        let gateway = MockGateway::new()
            .with_pod("a", "web", "worker1")
            .with_pod("b", "web", "worker2")
            .with_pod("c", "data", "worker2")
            .with_pod("d", "web", "worker2");

        let pods = gateway.list_pods("web", "worker2").await.unwrap();
        let names: Vec<_> = pods.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "d"]);
    }

    #[tokio::test]
    async fn mock_dry_run_delete_keeps_pod() {
        let gateway = MockGateway::new().with_pod("a", "web", "worker1");

        gateway.delete_pod("web", "a", true).await.unwrap();
        assert_eq!(gateway.pods().len(), 1);

        gateway.delete_pod("web", "a", false).await.unwrap();
        assert!(gateway.pods().is_empty());

        let err = gateway.delete_pod("web", "a", false).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(gateway.delete_count(), 3);
    }

    #[tokio::test]
    async fn arc_gateway_delegates() {
        let gateway = Arc::new(MockGateway::new().with_node("worker1"));
        let node = gateway.get_node("worker1").await.unwrap();
        assert!(!node.is_control_plane);
        assert!(gateway.get_namespace("web").await.unwrap_err().is_not_found());
    }
}
