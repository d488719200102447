//! Per-batch deletion.

use dolphin_core::PodRef;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::gateway::ClusterGateway;
use crate::progress::{Progress, ProgressSink};

/// Result of deleting one batch.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Every pod in the batch was deleted (or validated, on a dry run).
    Succeeded {
        /// Pods deleted.
        deleted: usize,
    },
    /// A delete failed. Later pods in the batch were not attempted.
    Failed {
        /// Pods deleted before the failure.
        deleted: usize,
        /// The pod whose delete failed.
        pod: PodRef,
        /// Underlying gateway error.
        cause: GatewayError,
    },
}

impl BatchOutcome {
    /// Number of pods deleted.
    #[must_use]
    pub const fn deleted(&self) -> usize {
        match self {
            Self::Succeeded { deleted } | Self::Failed { deleted, .. } => *deleted,
        }
    }

    /// Returns true if every delete succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Delete `pods` in order, stopping at the first failure.
///
/// Each pod is deleted in its own namespace. With `verbose` set a
/// [`Progress::Pod`] notice is emitted before each attempt. No retries.
pub async fn delete_batch<G>(
    gateway: &G,
    pods: &[PodRef],
    dry_run: bool,
    verbose: bool,
    progress: &dyn ProgressSink,
) -> BatchOutcome
where
    G: ClusterGateway + ?Sized,
{
    for (deleted, pod) in pods.iter().enumerate() {
        if verbose {
            progress.notify(&Progress::Pod {
                name: pod.name.clone(),
                dry_run,
            });
        }

        match gateway.delete_pod(&pod.namespace, &pod.name, dry_run).await {
            Ok(()) => {
                debug!(pod = %pod.name, namespace = %pod.namespace, dry_run, "Deleted pod");
            }
            Err(cause) => {
                warn!(
                    pod = %pod.name,
                    namespace = %pod.namespace,
                    dry_run,
                    error = %cause,
                    "Pod deletion failed, aborting"
                );
                return BatchOutcome::Failed {
                    deleted,
                    pod: pod.clone(),
                    cause,
                };
            }
        }
    }

    BatchOutcome::Succeeded {
        deleted: pods.len(),
    }
}
