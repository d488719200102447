//! Kubernetes gateway implementation.
//!
//! This module provides [`KubeGateway`], which serves the
//! [`ClusterGateway`] calls from a live API server.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::api::{Api, DeleteParams, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use dolphin_core::{NamespaceInfo, NodeRoleInfo, PodRef};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::ClusterGateway;
use crate::types::ClientConfig;

/// A [`ClusterGateway`] backed by a Kubernetes client.
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl KubeGateway {
    /// Connect using the given client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the kubeconfig cannot be read or the client
    /// cannot be built.
    pub async fn connect(config: &ClientConfig) -> GatewayResult<Self> {
        let client = if config.is_inferred() {
            Client::try_default().await?
        } else {
            let options = KubeConfigOptions {
                context: config.context.clone(),
                ..KubeConfigOptions::default()
            };

            let kube_config = match &config.kubeconfig {
                Some(path) => {
                    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                        GatewayError::Config(format!(
                            "failed to read kubeconfig {}: {e}",
                            path.display()
                        ))
                    })?;
                    Config::from_custom_kubeconfig(kubeconfig, &options).await
                }
                None => Config::from_kubeconfig(&options).await,
            }
            .map_err(|e| GatewayError::Config(e.to_string()))?;

            Client::try_from(kube_config)?
        };

        debug!(
            kubeconfig = ?config.kubeconfig,
            context = ?config.context,
            "Connected to Kubernetes cluster"
        );
        Ok(Self { client })
    }

    /// Create a gateway with a pre-configured client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn pods_api(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn nodes_api(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }

    fn namespaces_api(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

/// Map a 404 from the API server onto [`GatewayError::NotFound`].
fn not_found_or(kind: &'static str, name: &str, err: kube::Error) -> GatewayError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => GatewayError::not_found(kind, name),
        other => other.into(),
    }
}

fn pod_ref(pod: Pod, namespace: &str, node_name: &str) -> Option<PodRef> {
    let name = pod.metadata.name?;
    let node = pod
        .spec
        .and_then(|s| s.node_name)
        .unwrap_or_else(|| node_name.to_string());
    let namespace = pod
        .metadata
        .namespace
        .unwrap_or_else(|| namespace.to_string());
    Some(PodRef {
        name,
        namespace,
        node_name: node,
    })
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    async fn list_pods(&self, namespace: &str, node_name: &str) -> GatewayResult<Vec<PodRef>> {
        // Filter on the server rather than pulling the whole namespace.
        let params = ListParams::default().fields(&format!("spec.nodeName={node_name}"));
        let pods = self.pods_api(namespace).list(&params).await?;

        Ok(pods
            .items
            .into_iter()
            .filter_map(|pod| pod_ref(pod, namespace, node_name))
            .collect())
    }

    async fn delete_pod(&self, namespace: &str, name: &str, dry_run: bool) -> GatewayResult<()> {
        let params = DeleteParams {
            dry_run,
            ..DeleteParams::default()
        };

        self.pods_api(namespace)
            .delete(name, &params)
            .await
            .map_err(|e| not_found_or("pod", name, e))?;
        Ok(())
    }

    async fn get_node(&self, name: &str) -> GatewayResult<NodeRoleInfo> {
        let node = self
            .nodes_api()
            .get(name)
            .await
            .map_err(|e| not_found_or("node", name, e))?;

        let labels = node.metadata.labels.unwrap_or_default();
        Ok(NodeRoleInfo::from_labels(
            node.metadata.name.unwrap_or_else(|| name.to_string()),
            &labels,
        ))
    }

    async fn get_namespace(&self, name: &str) -> GatewayResult<NamespaceInfo> {
        let namespace = self
            .namespaces_api()
            .get(name)
            .await
            .map_err(|e| not_found_or("namespace", name, e))?;

        Ok(NamespaceInfo::existing(
            namespace.metadata.name.unwrap_or_else(|| name.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::PodSpec;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use serde_json::json;

    fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
        let resp: kube::core::ErrorResponse = serde_json::from_value(json!({
            "status": "Failure",
            "message": message,
            "reason": reason,
            "code": code,
        }))
        .unwrap();
        kube::Error::Api(resp)
    }

    fn pod(name: Option<&str>, node: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: name.map(str::to_string),
                namespace: Some("web".to_string()),
                ..ObjectMeta::default()
            },
            spec: Some(PodSpec {
                node_name: node.map(str::to_string),
                ..PodSpec::default()
            }),
            ..Pod::default()
        }
    }

    #[test]
    fn pod_ref_from_pod() {
        let pod_ref = pod_ref(pod(Some("api-0"), Some("worker2")), "web", "worker2").unwrap();
        assert_eq!(pod_ref, PodRef::new("api-0", "web", "worker2"));
    }

    #[test]
    fn pod_ref_falls_back_to_requested_node() {
        let pod_ref = pod_ref(pod(Some("api-0"), None), "web", "worker2").unwrap();
        assert_eq!(pod_ref.node_name, "worker2");
    }

    #[test]
    fn unnamed_pods_are_skipped() {
        assert!(pod_ref(pod(None, Some("worker2")), "web", "worker2").is_none());
    }

    #[test]
    fn api_404_becomes_not_found() {
        let err = api_error(404, "NotFound", "nodes \"kube-worker3\" not found");
        let mapped = not_found_or("node", "kube-worker3", err);
        assert!(mapped.is_not_found());
        assert_eq!(mapped.to_string(), "nodes \"kube-worker3\" not found");
    }

    #[test]
    fn other_api_errors_pass_through() {
        let err = api_error(403, "Forbidden", "forbidden");
        let mapped = not_found_or("pod", "api-0", err);
        assert!(!mapped.is_not_found());
        assert!(!mapped.is_retriable());
    }
}
