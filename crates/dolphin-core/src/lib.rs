//! Core types for dolphin.
//!
//! This crate provides the foundational types shared by the eviction engine
//! and the command-line front end:
//!
//! - **Requests**: the immutable [`EvictionRequest`] describing one evacuation
//! - **Resources**: read-only projections of pods, nodes and namespaces
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use dolphin_core::EvictionRequest;
//!
//! let request = EvictionRequest::builder()
//!     .namespace("web")
//!     .node("worker2")
//!     .batch_size(2)
//!     .interval(Duration::from_secs(3))
//!     .dry_run(true)
//!     .build();
//!
//! assert_eq!(request.namespace(), "web");
//! assert_eq!(request.node_name(), Some("worker2"));
//! assert!(request.dry_run());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod request;
pub mod resources;

pub use request::{EvictionRequest, EvictionRequestBuilder, DEFAULT_BATCH_SIZE, DEFAULT_NAMESPACE};
pub use resources::{
    is_system_namespace, NamespaceInfo, NodeRoleInfo, PodRef, CONTROL_PLANE_LABEL,
    SYSTEM_NAMESPACES,
};
