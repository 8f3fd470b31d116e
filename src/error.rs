//! Error types for intel-gpu-usage

use std::io;
use thiserror::Error;

use crate::provider::CompletionCode;

/// Result type alias for intel-gpu-usage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering and sampling GPU utilization
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The metrics provider library or handle could not be obtained
    #[error("Metrics provider unavailable: {reason}")]
    ProviderUnavailable {
        /// Description of why the provider could not be bound
        reason: String,
    },

    /// No adapter with the Intel vendor id (0x8086) was reported
    #[error("No Intel GPU adapter found (vendor 0x8086)")]
    NoEligibleAdapter,

    /// Every concurrent group and metric set was enumerated without finding
    /// a single engine utilization metric
    #[error("No metric set with engine utilization metrics found")]
    NoUtilizationMetricSet,

    /// The provider refused to activate the selected metric set
    #[error("Failed to activate metric set: {status}")]
    ActivationFailed {
        /// The completion code the provider returned
        status: CompletionCode,
    },

    /// The selected metric set can no longer be resolved on the device
    #[error("Selected metric set became unavailable")]
    MetricSetUnavailable,

    /// Writing a sample line to the output sink failed
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    /// Returns true if the error means the adapter or metric set hierarchy
    /// is missing what we need, as opposed to a transient provider refusal
    pub fn is_discovery_failure(&self) -> bool {
        matches!(
            self,
            Error::NoEligibleAdapter | Error::NoUtilizationMetricSet
        )
    }

    /// Create a provider-unavailable error with a reason
    pub(crate) fn provider_unavailable(reason: impl Into<String>) -> Self {
        Error::ProviderUnavailable {
            reason: reason.into(),
        }
    }
}
