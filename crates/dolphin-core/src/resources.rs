//! Read-only projections of cluster resources.
//!
//! These are snapshots taken at lookup time. Nothing here is cached across
//! calls or refreshed during a run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label key that marks a node as part of the control plane.
pub const CONTROL_PLANE_LABEL: &str = "node-role.kubernetes.io/control-plane";

/// Namespaces owned by the cluster itself.
pub const SYSTEM_NAMESPACES: [&str; 3] = ["kube-system", "kube-public", "kube-node-lease"];

/// Returns true if `name` is one of the [`SYSTEM_NAMESPACES`].
#[must_use]
pub fn is_system_namespace(name: &str) -> bool {
    SYSTEM_NAMESPACES.contains(&name)
}

/// A pod as seen when the snapshot was listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PodRef {
    /// Pod name, unique within its namespace.
    pub name: String,
    /// Namespace the pod lives in.
    pub namespace: String,
    /// Node the pod was bound to at list time.
    pub node_name: String,
}

impl PodRef {
    /// Create a new pod reference.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        node_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            node_name: node_name.into(),
        }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Role information derived from a node's labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRoleInfo {
    /// Node name.
    pub name: String,
    /// Whether the node carries the control-plane role label.
    pub is_control_plane: bool,
}

impl NodeRoleInfo {
    /// Derive role information from a node's label set.
    ///
    /// Only the presence of [`CONTROL_PLANE_LABEL`] matters; its value is ignored.
    #[must_use]
    pub fn from_labels(name: impl Into<String>, labels: &BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            is_control_plane: labels.contains_key(CONTROL_PLANE_LABEL),
        }
    }
}

/// Existence and protection status of a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Namespace name.
    pub name: String,
    /// Whether the namespace exists in the cluster.
    pub exists: bool,
    /// Whether the namespace is one of the [`SYSTEM_NAMESPACES`].
    pub is_system_reserved: bool,
}

impl NamespaceInfo {
    /// Describe an existing namespace.
    #[must_use]
    pub fn existing(name: impl Into<String>) -> Self {
        let name = name.into();
        let is_system_reserved = is_system_namespace(&name);
        Self {
            name,
            exists: true,
            is_system_reserved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_plane_detected_by_label_key() {
        let mut labels = BTreeMap::new();
        labels.insert("kubernetes.io/hostname".to_string(), "cp1".to_string());
        assert!(!NodeRoleInfo::from_labels("cp1", &labels).is_control_plane);

        labels.insert(CONTROL_PLANE_LABEL.to_string(), String::new());
        let info = NodeRoleInfo::from_labels("cp1", &labels);
        assert_eq!(info.name, "cp1");
        assert!(info.is_control_plane);
    }

    #[test]
    fn system_namespaces() {
        for ns in SYSTEM_NAMESPACES {
            assert!(is_system_namespace(ns));
            assert!(NamespaceInfo::existing(ns).is_system_reserved);
        }
        assert!(!is_system_namespace("default"));
        assert!(!is_system_namespace("kube-systemx"));
        assert!(!NamespaceInfo::existing("web").is_system_reserved);
    }

    #[test]
    fn pod_ref_display() {
        let pod = PodRef::new("api-0", "web", "worker2");
        assert_eq!(pod.to_string(), "web/api-0");
    }
}
