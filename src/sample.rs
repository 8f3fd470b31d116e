//! One-tick utilization sampling
//!
//! Executes the activate → trigger → settle → read → deactivate protocol
//! against the selected metric set and produces a raw (un-normalized)
//! per-engine percentage sample.

use std::time::Duration;

use crate::classify::classify_engine_metric;
use crate::error::{Error, Result};
use crate::monitor::{wait_interruptible, CancelFlag};
use crate::provider::{CompletionCode, ConcurrentGroup, Metric, MetricSet, MetricsDevice};
use crate::select::SelectedMetricSet;
use crate::types::UtilizationSample;

/// Settling delay between activation and the read, letting the provider
/// accumulate a measurement window
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Take one utilization sample from the selected metric set
///
/// Activation accepts the provider's already-active code; any other non-OK
/// activation code fails the tick with [`Error::ActivationFailed`]. A
/// selection whose group or set index no longer resolves fails the run
/// with [`Error::MetricSetUnavailable`]. Timestamp-trigger and deactivation
/// failures are warnings only. The cancel flag shortens the settling delay
/// so a cancellation request is observed promptly; the tick still completes.
pub fn read_utilization<D: MetricsDevice>(
    device: &D,
    selection: &SelectedMetricSet,
    cancel: CancelFlag,
) -> Result<UtilizationSample> {
    let group = device
        .concurrent_group(selection.group_index)
        .ok_or(Error::MetricSetUnavailable)?;
    let set = group
        .metric_set(selection.set_index)
        .ok_or(Error::MetricSetUnavailable)?;

    let status = set.activate();
    if !matches!(status, CompletionCode::Ok | CompletionCode::AlreadyInitialized) {
        return Err(Error::ActivationFailed { status });
    }

    let status = device.trigger_timestamps();
    if !status.is_ok() {
        eprintln!("Warning: timestamp trigger failed: {status}");
    }

    wait_interruptible(SETTLE_DELAY, cancel);

    let mut sample = UtilizationSample::new();
    for metric_index in 0..set.metric_count() {
        let Some(metric) = set.metric(metric_index) else {
            continue;
        };
        let Some(name) = metric.symbol_name() else {
            continue;
        };
        let Some(engine) = classify_engine_metric(name) else {
            continue;
        };
        // Last writer wins when several metrics map to the same engine;
        // a metric without a reading leaves the slot at zero.
        if let Some(value) = metric.value() {
            sample.set(engine, value);
        }
    }
    sample.update_total();

    let status = set.deactivate();
    if !status.is_ok() {
        eprintln!("Warning: failed to deactivate metric set: {status}");
    }

    Ok(sample)
}
