//! Intel GPU Utilization Sampler
//!
//! A Rust library for monitoring Intel GPU engine utilization through the
//! vendor metrics-discovery adapter model. It discovers an Intel adapter,
//! picks the first metric set that exposes per-engine busy percentages,
//! and periodically samples and normalizes utilization for the render,
//! blitter, video, and video enhance engines.
//!
//! # Pipeline
//!
//! - Adapter and metric set enumeration with a substring-based engine
//!   metric classifier
//! - The activate → trigger → settle → read → deactivate sampling protocol
//! - Normalization keeping the summed engine percentages within 100%
//! - A snapshot or continuous run loop with poll-based cancellation
//!
//! The metrics-discovery library itself is an external collaborator; the
//! pipeline runs against any implementation of the capability traits in
//! [`provider`]. The [`sim`] module provides an in-memory implementation
//! with placeholder readings for environments without the vendor library.
//!
//! # Quick Start
//!
//! ```rust
//! use intel_gpu_usage::sim::SimProvider;
//! use intel_gpu_usage::{Monitor, RunMode};
//!
//! let provider = SimProvider::uhd620();
//! let monitor = Monitor::new(&provider, RunMode::Snapshot);
//!
//! let mut out = Vec::new();
//! monitor.run(&mut out)?;
//! assert!(String::from_utf8(out)?.starts_with("Render: "));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Output format
//!
//! One line per sample, stable and parseable:
//!
//! ```text
//! Render: 23.5%  Blitter: 0.0%  Video: 12.3%  Enhance: 0.0%  | Total: 35.8%
//! ```
//!
//! Diagnostic output (enumeration progress, non-fatal provider warnings)
//! goes to stderr.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod classify;
pub mod error;
pub mod monitor;
pub mod provider;
pub mod sample;
pub mod select;
pub mod sim;
pub mod types;

// Re-export main types at crate root
pub use classify::classify_engine_metric;
pub use error::{Error, Result};
pub use monitor::{CancelFlag, Monitor};
pub use provider::{AdapterInfo, CompletionCode, INTEL_VENDOR_ID};
pub use sample::{read_utilization, SETTLE_DELAY};
pub use select::{find_utilization_metric_set, SelectedMetricSet};
pub use types::{EngineKind, RunMode, UtilizationSample};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
