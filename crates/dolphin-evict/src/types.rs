//! Run results and client configuration.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a completed run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The snapshot was empty; nothing was deleted.
    NoPods {
        /// Target namespace.
        namespace: String,
        /// Target node.
        node: String,
    },
    /// Every pod in the snapshot was deleted.
    Completed(RunReport),
}

impl RunOutcome {
    /// Names of the pods deleted by the run.
    #[must_use]
    pub fn deleted(&self) -> &[String] {
        match self {
            Self::NoPods { .. } => &[],
            Self::Completed(report) => &report.deleted,
        }
    }
}

/// Summary of a run that deleted at least one pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Target namespace.
    pub namespace: String,
    /// Target node.
    pub node: String,
    /// Whether deletes were dry runs.
    pub dry_run: bool,
    /// Number of batches executed.
    pub batches: usize,
    /// Deleted pod names, in deletion order.
    pub deleted: Vec<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last batch finished.
    pub finished_at: DateTime<Utc>,
}

/// Where to find cluster credentials.
///
/// With both fields unset the client is inferred from the environment:
/// in-cluster service account first, then `$KUBECONFIG` or `~/.kube/config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Explicit kubeconfig file.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one.
    pub context: Option<String>,
}

impl ClientConfig {
    /// Returns true if nothing overrides the inferred configuration.
    #[must_use]
    pub const fn is_inferred(&self) -> bool {
        self.kubeconfig.is_none() && self.context.is_none()
    }
}
