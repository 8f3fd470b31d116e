//! Simulated metrics provider
//!
//! Implements the provider capability traits over an in-memory topology so
//! the pipeline can run without the vendor shared library. Readings come
//! from fixed per-metric values, matching the placeholder measurement path
//! of providers that expose the adapter/metric-set hierarchy but no raw
//! counter stream. Tests build arbitrary topologies with the same builders.

use std::cell::Cell;

use crate::error::{Error, Result};
use crate::provider::{
    Adapter, AdapterGroup, AdapterInfo, CompletionCode, ConcurrentGroup, Metric, MetricSet,
    MetricsDevice, MetricsProvider, INTEL_VENDOR_ID,
};

/// Simulated provider holding a fixed adapter topology
#[derive(Debug, Clone, Default)]
pub struct SimProvider {
    adapters: Vec<SimAdapter>,
    open_failure: Option<String>,
}

impl SimProvider {
    /// An empty provider with no adapters
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter to the topology
    pub fn with_adapter(mut self, adapter: SimAdapter) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// A provider whose adapter group cannot be opened
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            adapters: Vec::new(),
            open_failure: Some(reason.into()),
        }
    }

    /// A UHD 620-shaped topology with the stock placeholder readings
    /// (Render 25.0, Blitter 5.0, Video 10.0)
    pub fn uhd620() -> Self {
        Self::new().with_adapter(
            SimAdapter::intel(0x5917, "Intel UHD Graphics 620")
                .with_group(
                    SimConcurrentGroup::new("OcclusionQueryStats").with_set(
                        SimMetricSet::new("RenderedPixelsStats")
                            .with_metric("PixelsRendered", 0.0)
                            .with_metric("PixelsFailingTests", 0.0),
                    ),
                )
                .with_group(
                    SimConcurrentGroup::new("OA")
                        .with_set(
                            SimMetricSet::new("ComputeBasic")
                                .with_metric("GpuTime", 1_000_000.0)
                                .with_metric("EuActive", 12.5)
                                .with_metric("GpuBusy", 40.0),
                        )
                        .with_set(
                            SimMetricSet::new("RenderBasic")
                                .with_metric("GpuTime", 1_000_000.0)
                                .with_metric("RenderBusy", 25.0)
                                .with_metric("BlitterBusy", 5.0)
                                .with_metric("VideoBusy", 10.0),
                        ),
                ),
        )
    }
}

impl MetricsProvider for SimProvider {
    type Group = SimAdapterGroup;

    fn open_adapter_group(&self) -> Result<SimAdapterGroup> {
        if let Some(reason) = &self.open_failure {
            return Err(Error::provider_unavailable(reason.clone()));
        }
        Ok(SimAdapterGroup {
            adapters: self.adapters.clone(),
        })
    }
}

/// Adapter group over the simulated topology
#[derive(Debug, Clone)]
pub struct SimAdapterGroup {
    adapters: Vec<SimAdapter>,
}

impl AdapterGroup for SimAdapterGroup {
    type Adapter = SimAdapter;

    fn adapter_count(&self) -> u32 {
        self.adapters.len() as u32
    }

    fn adapter(&self, index: u32) -> Option<&SimAdapter> {
        self.adapters.get(index as usize)
    }
}

/// A simulated GPU adapter
#[derive(Debug, Clone)]
pub struct SimAdapter {
    info: AdapterInfo,
    groups: Vec<Option<SimConcurrentGroup>>,
    timestamps_code: CompletionCode,
}

impl SimAdapter {
    /// Create an adapter with an arbitrary vendor id
    pub fn new(vendor_id: u16, device_id: u16, name: Option<&str>) -> Self {
        Self {
            info: AdapterInfo {
                vendor_id,
                device_id,
                name: name.map(str::to_string),
            },
            groups: Vec::new(),
            timestamps_code: CompletionCode::Ok,
        }
    }

    /// Create an Intel adapter
    pub fn intel(device_id: u16, name: &str) -> Self {
        Self::new(INTEL_VENDOR_ID, device_id, Some(name))
    }

    /// Add a concurrent group to the adapter's metrics device
    pub fn with_group(mut self, group: SimConcurrentGroup) -> Self {
        self.groups.push(Some(group));
        self
    }

    /// Add a group slot the device fails to return
    pub fn with_missing_group(mut self) -> Self {
        self.groups.push(None);
        self
    }

    /// Force the completion code of timestamp triggering
    pub fn with_timestamps_code(mut self, code: CompletionCode) -> Self {
        self.timestamps_code = code;
        self
    }
}

impl Adapter for SimAdapter {
    type Device = SimMetricsDevice;

    fn info(&self) -> &AdapterInfo {
        &self.info
    }

    fn open_metrics_device(&self) -> Result<SimMetricsDevice> {
        Ok(SimMetricsDevice {
            groups: self.groups.clone(),
            timestamps_code: self.timestamps_code,
        })
    }
}

/// Metrics device over a simulated adapter
#[derive(Debug, Clone)]
pub struct SimMetricsDevice {
    groups: Vec<Option<SimConcurrentGroup>>,
    timestamps_code: CompletionCode,
}

impl MetricsDevice for SimMetricsDevice {
    type Group = SimConcurrentGroup;

    fn concurrent_group_count(&self) -> u32 {
        self.groups.len() as u32
    }

    fn concurrent_group(&self, index: u32) -> Option<&SimConcurrentGroup> {
        self.groups.get(index as usize)?.as_ref()
    }

    fn trigger_timestamps(&self) -> CompletionCode {
        self.timestamps_code
    }
}

/// A simulated concurrent group
#[derive(Debug, Clone)]
pub struct SimConcurrentGroup {
    name: String,
    sets: Vec<Option<SimMetricSet>>,
}

impl SimConcurrentGroup {
    /// Create a group with the given symbol name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sets: Vec::new(),
        }
    }

    /// Add a metric set
    pub fn with_set(mut self, set: SimMetricSet) -> Self {
        self.sets.push(Some(set));
        self
    }

    /// Add a set slot the group fails to return
    pub fn with_missing_set(mut self) -> Self {
        self.sets.push(None);
        self
    }
}

impl ConcurrentGroup for SimConcurrentGroup {
    type Set = SimMetricSet;

    fn symbol_name(&self) -> &str {
        &self.name
    }

    fn metric_set_count(&self) -> u32 {
        self.sets.len() as u32
    }

    fn metric_set(&self, index: u32) -> Option<&SimMetricSet> {
        self.sets.get(index as usize)?.as_ref()
    }
}

/// A simulated metric set with activation state
#[derive(Debug, Clone)]
pub struct SimMetricSet {
    name: String,
    metrics: Vec<Option<SimMetric>>,
    active: Cell<bool>,
    activations: Cell<u32>,
    deactivations: Cell<u32>,
    activate_code: Option<CompletionCode>,
    deactivate_code: Option<CompletionCode>,
}

impl SimMetricSet {
    /// Create a set with the given symbol name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metrics: Vec::new(),
            active: Cell::new(false),
            activations: Cell::new(0),
            deactivations: Cell::new(0),
            activate_code: None,
            deactivate_code: None,
        }
    }

    /// Add a metric with a fixed reading
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.push(Some(SimMetric {
            name: Some(name.to_string()),
            value: Some(value),
        }));
        self
    }

    /// Add a metric that never yields a reading
    pub fn with_metric_no_value(mut self, name: &str) -> Self {
        self.metrics.push(Some(SimMetric {
            name: Some(name.to_string()),
            value: None,
        }));
        self
    }

    /// Add a metric slot the set fails to return
    pub fn with_missing_metric(mut self) -> Self {
        self.metrics.push(None);
        self
    }

    /// Force the completion code of every activate call
    pub fn with_activate_code(mut self, code: CompletionCode) -> Self {
        self.activate_code = Some(code);
        self
    }

    /// Force the completion code of every deactivate call
    pub fn with_deactivate_code(mut self, code: CompletionCode) -> Self {
        self.deactivate_code = Some(code);
        self
    }

    /// Whether the set is currently active
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// How many times the set transitioned to active
    pub fn activation_count(&self) -> u32 {
        self.activations.get()
    }

    /// How many times the set transitioned to inactive
    pub fn deactivation_count(&self) -> u32 {
        self.deactivations.get()
    }
}

impl MetricSet for SimMetricSet {
    type Metric = SimMetric;

    fn symbol_name(&self) -> &str {
        &self.name
    }

    fn metric_count(&self) -> u32 {
        self.metrics.len() as u32
    }

    fn metric(&self, index: u32) -> Option<&SimMetric> {
        self.metrics.get(index as usize)?.as_ref()
    }

    fn activate(&self) -> CompletionCode {
        if let Some(code) = self.activate_code {
            return code;
        }
        if self.active.get() {
            return CompletionCode::AlreadyInitialized;
        }
        self.active.set(true);
        self.activations.set(self.activations.get() + 1);
        CompletionCode::Ok
    }

    fn deactivate(&self) -> CompletionCode {
        if let Some(code) = self.deactivate_code {
            return code;
        }
        self.active.set(false);
        self.deactivations.set(self.deactivations.get() + 1);
        CompletionCode::Ok
    }
}

/// A simulated metric descriptor
#[derive(Debug, Clone)]
pub struct SimMetric {
    name: Option<String>,
    value: Option<f64>,
}

impl Metric for SimMetric {
    fn symbol_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn value(&self) -> Option<f64> {
        self.value
    }
}
