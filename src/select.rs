//! Metric set selection
//!
//! Walks the device's concurrent group / metric set / metric hierarchy in
//! provider order and picks the first metric set containing at least one
//! engine utilization metric. The walk logs its progress to stderr so the
//! sample stream on stdout stays parseable.

use crate::classify::classify_engine_metric;
use crate::error::{Error, Result};
use crate::provider::{ConcurrentGroup, Metric, MetricSet, MetricsDevice};
use crate::types::EngineKind;

/// Handle to the metric set chosen for sampling
///
/// Holds indices into the device hierarchy rather than borrowed provider
/// objects; the sampler re-resolves them on every tick and treats a stale
/// index as [`Error::MetricSetUnavailable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedMetricSet {
    /// Index of the concurrent group on the device
    pub group_index: u32,
    /// Index of the metric set within the group
    pub set_index: u32,
    /// Symbolic name of the concurrent group
    pub group_name: String,
    /// Symbolic name of the metric set
    pub set_name: String,
    /// Metric indices that classified to an engine, with their kinds
    pub engine_metrics: Vec<(u32, EngineKind)>,
}

/// Find the first metric set exposing engine utilization metrics
///
/// Groups, sets, and metrics are visited in provider-reported order; an
/// index the provider returns nothing for is skipped. Enumeration stops at
/// the first set with at least one classifiable metric. If the whole
/// hierarchy is exhausted without a match, returns
/// [`Error::NoUtilizationMetricSet`].
pub fn find_utilization_metric_set<D: MetricsDevice>(device: &D) -> Result<SelectedMetricSet> {
    eprintln!(
        "Device has {} concurrent group(s)",
        device.concurrent_group_count()
    );

    for group_index in 0..device.concurrent_group_count() {
        let Some(group) = device.concurrent_group(group_index) else {
            continue;
        };

        eprintln!(
            "Concurrent group {}: {} ({} metric sets)",
            group_index,
            group.symbol_name(),
            group.metric_set_count()
        );

        for set_index in 0..group.metric_set_count() {
            let Some(set) = group.metric_set(set_index) else {
                continue;
            };

            eprintln!(
                "  Metric set {}: {} ({} metrics)",
                set_index,
                set.symbol_name(),
                set.metric_count()
            );

            let engine_metrics = classify_set_metrics(set);
            if engine_metrics.is_empty() {
                continue;
            }

            eprintln!("Selected metric set: {}", set.symbol_name());
            return Ok(SelectedMetricSet {
                group_index,
                set_index,
                group_name: group.symbol_name().to_string(),
                set_name: set.symbol_name().to_string(),
                engine_metrics,
            });
        }
    }

    Err(Error::NoUtilizationMetricSet)
}

/// Classify every metric in a set, returning the engine-tagged indices
fn classify_set_metrics<S: MetricSet>(set: &S) -> Vec<(u32, EngineKind)> {
    let mut tagged = Vec::new();

    for metric_index in 0..set.metric_count() {
        let Some(metric) = set.metric(metric_index) else {
            continue;
        };
        let Some(name) = metric.symbol_name() else {
            continue;
        };
        if let Some(engine) = classify_engine_metric(name) {
            eprintln!("    Found {} metric: {}", engine.name(), name);
            tagged.push((metric_index, engine));
        }
    }

    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimAdapter, SimConcurrentGroup, SimMetricSet};
    use crate::provider::Adapter;

    fn device_with(groups: Vec<SimConcurrentGroup>) -> impl MetricsDevice {
        let mut adapter = SimAdapter::intel(0x5917, "Intel UHD Graphics 620");
        for group in groups {
            adapter = adapter.with_group(group);
        }
        adapter.open_metrics_device().unwrap()
    }

    #[test]
    fn test_first_classifiable_set_wins() {
        let device = device_with(vec![SimConcurrentGroup::new("OA")
            .with_set(SimMetricSet::new("ComputeBasic").with_metric("ComputeFoo", 1.0))
            .with_set(SimMetricSet::new("RenderBasic").with_metric("RenderBusy", 25.0))]);

        let selection = find_utilization_metric_set(&device).unwrap();
        assert_eq!(selection.set_name, "RenderBasic");
        assert_eq!(selection.group_name, "OA");
        assert_eq!(selection.group_index, 0);
        assert_eq!(selection.set_index, 1);
        assert_eq!(selection.engine_metrics, vec![(0, EngineKind::Render)]);
    }

    #[test]
    fn test_no_classifiable_metric_fails_selection() {
        let device = device_with(vec![SimConcurrentGroup::new("OA")
            .with_set(SimMetricSet::new("ComputeBasic").with_metric("EuActive", 3.0))]);

        let err = find_utilization_metric_set(&device).unwrap_err();
        assert!(matches!(err, Error::NoUtilizationMetricSet));
    }

    #[test]
    fn test_absent_set_slot_is_skipped() {
        let device = device_with(vec![SimConcurrentGroup::new("OA")
            .with_missing_set()
            .with_set(SimMetricSet::new("RenderBasic").with_metric("RenderBusy", 25.0))]);

        let selection = find_utilization_metric_set(&device).unwrap();
        assert_eq!(selection.set_index, 1);
        assert_eq!(selection.set_name, "RenderBasic");
    }

    #[test]
    fn test_absent_metric_slot_is_skipped() {
        let device = device_with(vec![SimConcurrentGroup::new("OA").with_set(
            SimMetricSet::new("RenderBasic")
                .with_missing_metric()
                .with_metric("RenderBusy", 25.0),
        )]);

        let selection = find_utilization_metric_set(&device).unwrap();
        assert_eq!(selection.engine_metrics, vec![(1, EngineKind::Render)]);
    }

    #[test]
    fn test_later_group_is_searched() {
        let device = device_with(vec![
            SimConcurrentGroup::new("OcclusionQueryStats")
                .with_set(SimMetricSet::new("Stats").with_metric("SamplesPassed", 0.0)),
            SimConcurrentGroup::new("OA")
                .with_set(SimMetricSet::new("MediaBasic").with_metric("VideoBusy", 10.0)),
        ]);

        let selection = find_utilization_metric_set(&device).unwrap();
        assert_eq!(selection.group_index, 1);
        assert_eq!(selection.group_name, "OA");
        assert_eq!(selection.engine_metrics, vec![(0, EngineKind::Video)]);
    }
}
