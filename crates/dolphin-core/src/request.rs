//! The eviction request.
//!
//! An [`EvictionRequest`] carries every switch that influences a run. It is
//! assembled once by the caller through [`EvictionRequestBuilder`] and then
//! passed by reference into each component; nothing downstream consults
//! command-line state directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Namespace used when the caller does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Batch size used when the caller does not set one.
pub const DEFAULT_BATCH_SIZE: i64 = 1;

/// A request to evacuate the pods of one namespace from one node.
///
/// The request is deliberately unvalidated: a missing node or a non-positive
/// batch size is representable so that the guard can reject it with a precise
/// reason. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionRequest {
    namespace: String,
    node_name: Option<String>,
    batch_size: i64,
    interval: Duration,
    dry_run: bool,
    verbose: bool,
}

impl EvictionRequest {
    /// Start building a request with default settings.
    #[must_use]
    pub fn builder() -> EvictionRequestBuilder {
        EvictionRequestBuilder::default()
    }

    /// Target namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Target node, if one was given.
    ///
    /// An empty name is reported as absent.
    #[must_use]
    pub fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref().filter(|n| !n.is_empty())
    }

    /// Requested number of pods per batch, as supplied.
    #[must_use]
    pub const fn batch_size(&self) -> i64 {
        self.batch_size
    }

    /// Delay between consecutive batches.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether deletes are sent as server-side dry runs.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether per-pod progress notices are emitted.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for EvictionRequest {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            node_name: None,
            batch_size: DEFAULT_BATCH_SIZE,
            interval: Duration::ZERO,
            dry_run: false,
            verbose: false,
        }
    }
}

/// Builder for [`EvictionRequest`].
#[derive(Debug, Clone, Default)]
pub struct EvictionRequestBuilder {
    inner: EvictionRequest,
}

impl EvictionRequestBuilder {
    /// Set the target namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.inner.namespace = namespace.into();
        self
    }

    /// Set the target node.
    #[must_use]
    pub fn node(mut self, node_name: impl Into<String>) -> Self {
        self.inner.node_name = Some(node_name.into());
        self
    }

    /// Set or clear the target node.
    #[must_use]
    pub fn node_opt(mut self, node_name: Option<String>) -> Self {
        self.inner.node_name = node_name;
        self
    }

    /// Set the number of pods deleted per batch.
    #[must_use]
    pub const fn batch_size(mut self, batch_size: i64) -> Self {
        self.inner.batch_size = batch_size;
        self
    }

    /// Set the delay between batches.
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.inner.interval = interval;
        self
    }

    /// Enable or disable dry-run deletes.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.inner.dry_run = dry_run;
        self
    }

    /// Enable or disable verbose progress notices.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.inner.verbose = verbose;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> EvictionRequest {
        self.inner
    }
}
