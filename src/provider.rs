//! Capability interface to the metrics-discovery provider
//!
//! The vendor metrics-discovery library exposes a hierarchy of adapter
//! group → adapter → metrics device → concurrent group → metric set →
//! metric objects. This module defines that hierarchy as a set of traits
//! so the selection and sampling pipeline is independent of how the
//! provider library is bound. Handles release their resources on drop,
//! so dropping in reverse acquisition order tears everything down the
//! way the provider expects.

use std::fmt;

use crate::error::Result;

/// PCI vendor id for Intel; only adapters reporting it are eligible
pub const INTEL_VENDOR_ID: u16 = 0x8086;

/// Status codes the provider returns from activate/deactivate/trigger calls
///
/// Mirrors the metrics-discovery completion code set. Only
/// [`CompletionCode::Ok`] is an unconditional success; activation
/// additionally treats [`CompletionCode::AlreadyInitialized`] as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompletionCode {
    /// Operation completed
    Ok,
    /// A read is still pending
    ReadPending,
    /// The object was already initialized/activated
    AlreadyInitialized,
    /// The concurrent group is locked by another client
    ConcurrentGroupLocked,
    /// A wait timed out
    WaitTimeout,
    /// Transient failure, the call may be repeated
    TryAgain,
    /// The call was interrupted
    Interrupted,
    /// An invalid parameter was passed
    InvalidParameter,
    /// The provider ran out of memory
    NoMemory,
    /// Unspecified provider failure
    GeneralError,
    /// A required file was not found
    FileNotFound,
    /// The operation is not supported on this adapter
    NotSupported,
    /// The caller lacks the required permissions
    AccessDenied,
}

impl CompletionCode {
    /// Returns true for the plain success code
    pub fn is_ok(self) -> bool {
        self == CompletionCode::Ok
    }

    /// Short symbolic name of the code
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionCode::Ok => "OK",
            CompletionCode::ReadPending => "READ_PENDING",
            CompletionCode::AlreadyInitialized => "ALREADY_INITIALIZED",
            CompletionCode::ConcurrentGroupLocked => "CONCURRENT_GROUP_LOCKED",
            CompletionCode::WaitTimeout => "WAIT_TIMEOUT",
            CompletionCode::TryAgain => "TRY_AGAIN",
            CompletionCode::Interrupted => "INTERRUPTED",
            CompletionCode::InvalidParameter => "ERROR_INVALID_PARAMETER",
            CompletionCode::NoMemory => "ERROR_NO_MEMORY",
            CompletionCode::GeneralError => "ERROR_GENERAL",
            CompletionCode::FileNotFound => "ERROR_FILE_NOT_FOUND",
            CompletionCode::NotSupported => "ERROR_NOT_SUPPORTED",
            CompletionCode::AccessDenied => "ERROR_ACCESS_DENIED",
        }
    }
}

impl fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an adapter as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    /// PCI vendor id (0x8086 for Intel)
    pub vendor_id: u16,
    /// PCI device id
    pub device_id: u16,
    /// Human-readable adapter name if the provider reports one
    pub name: Option<String>,
}

impl AdapterInfo {
    /// Returns true if this adapter is an Intel GPU
    pub fn is_intel(&self) -> bool {
        self.vendor_id == INTEL_VENDOR_ID
    }
}

/// Entry point capability: a bound metrics-discovery provider
pub trait MetricsProvider {
    /// The adapter group handle type this provider yields
    type Group: AdapterGroup;

    /// Open the provider's adapter group
    fn open_adapter_group(&self) -> Result<Self::Group>;
}

/// The set of adapters the provider knows about
pub trait AdapterGroup {
    /// The adapter handle type within this group
    type Adapter: Adapter;

    /// Number of adapter slots reported by the provider
    fn adapter_count(&self) -> u32;

    /// Adapter at the given index, or `None` if the provider fails to
    /// return one for that slot
    fn adapter(&self, index: u32) -> Option<&Self::Adapter>;
}

/// A single GPU adapter
pub trait Adapter {
    /// The metrics device handle type for this adapter
    type Device: MetricsDevice;

    /// Identity of this adapter
    fn info(&self) -> &AdapterInfo;

    /// Open the adapter's metrics device
    fn open_metrics_device(&self) -> Result<Self::Device>;
}

/// An opened metrics device exposing concurrent groups
pub trait MetricsDevice {
    /// The concurrent group handle type on this device
    type Group: ConcurrentGroup;

    /// Number of concurrent group slots
    fn concurrent_group_count(&self) -> u32;

    /// Concurrent group at the given index, or `None` if absent
    fn concurrent_group(&self, index: u32) -> Option<&Self::Group>;

    /// Ask the provider to latch GPU/CPU timestamps for the next read
    ///
    /// Some providers do not require this call; a non-OK code is a
    /// warning, never a sampling failure.
    fn trigger_timestamps(&self) -> CompletionCode;
}

/// A provider-defined grouping of metric sets sharing a sampling domain
pub trait ConcurrentGroup {
    /// The metric set handle type within this group
    type Set: MetricSet;

    /// Symbolic name of the group (e.g. "OA")
    fn symbol_name(&self) -> &str;

    /// Number of metric set slots in this group
    fn metric_set_count(&self) -> u32;

    /// Metric set at the given index, or `None` if absent
    fn metric_set(&self, index: u32) -> Option<&Self::Set>;
}

/// A named, selectable collection of metrics
pub trait MetricSet {
    /// The metric descriptor type within this set
    type Metric: Metric;

    /// Symbolic name of the set
    fn symbol_name(&self) -> &str;

    /// Number of metric slots in this set
    fn metric_count(&self) -> u32;

    /// Metric at the given index, or `None` if absent
    fn metric(&self, index: u32) -> Option<&Self::Metric>;

    /// Activate the set for measurement
    fn activate(&self) -> CompletionCode;

    /// Deactivate the set
    fn deactivate(&self) -> CompletionCode;
}

/// Read-only view of a single metric
pub trait Metric {
    /// Symbolic name of the metric, if the provider reports one
    fn symbol_name(&self) -> Option<&str>;

    /// Current numeric reading, if one is available post-activation
    fn value(&self) -> Option<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_code_strings() {
        assert_eq!(CompletionCode::Ok.as_str(), "OK");
        assert_eq!(CompletionCode::GeneralError.as_str(), "ERROR_GENERAL");
        assert_eq!(
            CompletionCode::AlreadyInitialized.to_string(),
            "ALREADY_INITIALIZED"
        );
        assert!(CompletionCode::Ok.is_ok());
        assert!(!CompletionCode::TryAgain.is_ok());
    }

    #[test]
    fn test_adapter_info_vendor_filter() {
        let intel = AdapterInfo {
            vendor_id: INTEL_VENDOR_ID,
            device_id: 0x5917,
            name: Some("Intel UHD Graphics 620".into()),
        };
        assert!(intel.is_intel());

        let other = AdapterInfo {
            vendor_id: 0x1002,
            device_id: 0x73ff,
            name: None,
        };
        assert!(!other.is_intel());
    }
}
