//! Batched, guarded pod eviction.
//!
//! This crate evacuates the pods of one namespace from one node. It handles:
//!
//! - Pre-flight validation of the request (see [`guard`])
//! - Partitioning the pod snapshot into batches (see [`batch`])
//! - Fail-fast deletion of each batch, optionally as a server-side dry run
//!   (see [`executor`])
//! - Timed, interruptible pauses between batches (see [`Evictor`])
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   CLI / caller                         │
//! └────────────────────────────────────────────────────────┘
//!                          │ EvictionRequest
//!                          ▼
//! ┌────────────────────────────────────────────────────────┐
//! │                      Evictor                           │
//! │  ┌───────────┐   ┌─────────────┐   ┌───────────────┐   │
//! │  │   Guard   │──▶│   Batch     │──▶│   Executor    │   │
//! │  │ Evaluator │   │  Scheduler  │   │ (delete_batch)│   │
//! │  └───────────┘   └─────────────┘   └───────────────┘   │
//! └────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌────────────────────────────────────────────────────────┐
//! │         ClusterGateway (KubeGateway / MockGateway)      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use dolphin_core::EvictionRequest;
//! use dolphin_evict::{ClientConfig, Evictor, KubeGateway, RunOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = KubeGateway::connect(&ClientConfig::default()).await?;
//! let evictor = Evictor::new(gateway);
//!
//! let request = EvictionRequest::builder()
//!     .namespace("web")
//!     .node("worker2")
//!     .batch_size(2)
//!     .interval(Duration::from_secs(3))
//!     .build();
//!
//! match evictor.evict(&request).await? {
//!     RunOutcome::NoPods { .. } => println!("nothing to do"),
//!     RunOutcome::Completed(report) => println!("deleted {}", report.deleted.len()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Testing
//!
//! Enable the `test-utils` feature for an in-memory cluster:
//!
//! ```ignore
//! use dolphin_evict::{Evictor, MockGateway};
//!
//! let gateway = MockGateway::new()
//!     .with_node("worker2")
//!     .with_namespace("web")
//!     .with_pods("api", 5, "web", "worker2");
//! let evictor = Evictor::new(gateway);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod batch;
pub mod error;
pub mod evictor;
pub mod executor;
pub mod gateway;
pub mod guard;
pub mod k8s;
pub mod progress;
pub mod types;

pub use batch::{plan_batches, PodBatch};
pub use error::{EvictError, GatewayError, GatewayResult, Result};
pub use evictor::Evictor;
pub use executor::{delete_batch, BatchOutcome};
pub use gateway::ClusterGateway;
pub use guard::{evaluate, GuardResult, Rejection};
pub use k8s::KubeGateway;
pub use progress::{NoProgress, Progress, ProgressSink, RecordingProgress};
pub use types::{ClientConfig, RunOutcome, RunReport};

#[cfg(any(test, feature = "test-utils"))]
pub use gateway::mock::{DeleteRecord, GatewayCall, MockGateway};
