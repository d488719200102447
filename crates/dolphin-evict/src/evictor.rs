//! The eviction orchestrator.
//!
//! [`Evictor::evict`] drives one request end to end:
//!
//! ```text
//!   EvictionRequest
//!         │
//!         ▼
//!   guard::evaluate ──── Rejected ───▶ EvictError::Rejected
//!         │ Allowed
//!         ▼
//!   list_pods (once) ─── empty ──────▶ RunOutcome::NoPods
//!         │
//!         ▼
//!   for each batch:
//!     delete_batch ───── Failed ─────▶ EvictError::Execution
//!     sleep(interval)    (not after the last batch)
//!         │
//!         ▼
//!   RunOutcome::Completed
//! ```
//!
//! Everything runs sequentially on the caller's task. The only suspension
//! point besides gateway calls is the inter-batch pause, which an optional
//! shutdown signal can cut short.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dolphin_core::{EvictionRequest, PodRef};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::batch::plan_batches;
use crate::error::{EvictError, Result};
use crate::executor::{delete_batch, BatchOutcome};
use crate::gateway::ClusterGateway;
use crate::guard::{self, GuardResult, Rejection};
use crate::progress::{NoProgress, Progress, ProgressSink};
use crate::types::{RunOutcome, RunReport};

/// Runs guarded, batched evictions against a [`ClusterGateway`].
pub struct Evictor<G> {
    gateway: G,
    progress: Arc<dyn ProgressSink>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<G: ClusterGateway> Evictor<G> {
    /// Create an evictor that reports no progress and cannot be interrupted.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            progress: Arc::new(NoProgress),
            shutdown: None,
        }
    }

    /// Send verbose progress notices to `sink`.
    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Stop before the next batch once `shutdown` turns `true`.
    ///
    /// The signal is checked before every batch and during every pause; a
    /// batch already in progress is finished first.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Get a reference to the gateway.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Validate a request without touching any pod.
    pub async fn evaluate(&self, request: &EvictionRequest) -> GuardResult {
        guard::evaluate(&self.gateway, request).await
    }

    /// Evict the pods selected by `request`.
    ///
    /// # Errors
    ///
    /// - [`EvictError::Rejected`] if the guard refuses the request
    /// - [`EvictError::List`] if the pod snapshot cannot be listed
    /// - [`EvictError::Execution`] if any delete fails
    /// - [`EvictError::Cancelled`] if the shutdown signal fires
    pub async fn evict(&self, request: &EvictionRequest) -> Result<RunOutcome> {
        let started_at = Utc::now();

        if let GuardResult::Rejected(rejection) = self.evaluate(request).await {
            warn!(%rejection, "Eviction request rejected");
            return Err(rejection.into());
        }
        let node = request.node_name().ok_or(Rejection::NodeRequired)?;
        let namespace = request.namespace();

        let snapshot = self
            .gateway
            .list_pods(namespace, node)
            .await
            .map_err(|source| EvictError::List {
                namespace: namespace.to_string(),
                node: node.to_string(),
                source,
            })?;

        if snapshot.is_empty() {
            info!(namespace, node, "No pods found");
            return Ok(RunOutcome::NoPods {
                namespace: namespace.to_string(),
                node: node.to_string(),
            });
        }

        info!(
            namespace,
            node,
            pods = snapshot.len(),
            batch_size = request.batch_size(),
            interval = ?request.interval(),
            dry_run = request.dry_run(),
            "Evicting pods"
        );

        let deleted = self.run(&snapshot, request).await?;

        Ok(RunOutcome::Completed(RunReport {
            namespace: namespace.to_string(),
            node: node.to_string(),
            dry_run: request.dry_run(),
            batches: plan_batches(snapshot.len(), batch_size(request)).len(),
            deleted: deleted.into_iter().map(|p| p.name).collect(),
            started_at,
            finished_at: Utc::now(),
        }))
    }

    /// Delete `snapshot` in batches, pausing between them.
    ///
    /// Returns the deleted pods in order. The snapshot is used as-is: pods are
    /// not re-listed, so one that disappeared since listing fails its delete
    /// and aborts the run.
    ///
    /// # Errors
    ///
    /// Returns [`EvictError::Execution`] on the first failed delete and
    /// [`EvictError::Cancelled`] if the shutdown signal fires.
    pub async fn run(&self, snapshot: &[PodRef], request: &EvictionRequest) -> Result<Vec<PodRef>> {
        let batches = plan_batches(snapshot.len(), batch_size(request));
        let mut shutdown = self.shutdown.clone();
        let mut deleted: Vec<PodRef> = Vec::with_capacity(snapshot.len());

        if request.verbose() && !batches.is_empty() {
            self.progress.notify(&Progress::Deleting {
                pods: snapshot.len(),
                batches: batches.len(),
            });
        }

        for batch in &batches {
            if is_cancelled(shutdown.as_ref()) {
                warn!(batch = batch.index, "Eviction cancelled before batch");
                return Err(EvictError::Cancelled { deleted });
            }

            let pods = batch.pods(snapshot);
            debug!(
                batch = batch.index,
                of = batches.len(),
                size = pods.len(),
                "Starting batch"
            );

            match delete_batch(
                &self.gateway,
                pods,
                request.dry_run(),
                request.verbose(),
                self.progress.as_ref(),
            )
            .await
            {
                BatchOutcome::Succeeded { .. } => deleted.extend_from_slice(pods),
                BatchOutcome::Failed {
                    deleted: done,
                    pod,
                    cause,
                } => {
                    deleted.extend_from_slice(&pods[..done]);
                    return Err(EvictError::Execution {
                        pod,
                        deleted,
                        source: cause,
                    });
                }
            }

            if batch.end == snapshot.len() {
                break;
            }

            if request.verbose() {
                self.progress.notify(&Progress::Waiting {
                    interval: request.interval(),
                    next_batch: batch.index + 1,
                });
            }
            if pause(request.interval(), shutdown.as_mut()).await {
                warn!(batch = batch.index, "Eviction cancelled while waiting");
                return Err(EvictError::Cancelled { deleted });
            }
        }

        info!(deleted = deleted.len(), batches = batches.len(), "Eviction finished");
        Ok(deleted)
    }
}

/// Batch size as a count. Anything below one means "everything at once".
fn batch_size(request: &EvictionRequest) -> usize {
    usize::try_from(request.batch_size()).unwrap_or(0)
}

fn is_cancelled(shutdown: Option<&watch::Receiver<bool>>) -> bool {
    shutdown.is_some_and(|rx| *rx.borrow())
}

/// Sleep for `interval`. Returns true if the shutdown signal fired first.
async fn pause(interval: Duration, shutdown: Option<&mut watch::Receiver<bool>>) -> bool {
    let Some(rx) = shutdown else {
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        return false;
    };

    if *rx.borrow_and_update() {
        return true;
    }
    if interval.is_zero() {
        return false;
    }

    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return false,
            changed = rx.changed() => match changed {
                Ok(()) if *rx.borrow_and_update() => return true,
                Ok(()) => {}
                Err(_) => {
                    // Sender gone; nobody can cancel any more.
                    sleep.await;
                    return false;
                }
            }
        }
    }
}
