//! Monitor run loop
//!
//! Drives one process invocation: open the adapter group, pick the Intel
//! adapter, open its metrics device, select a utilization metric set once,
//! then sample/normalize/print either a single snapshot or continuously
//! until cancelled. Provider handles are released by drop in reverse
//! acquisition order when the loop returns.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::provider::{Adapter, AdapterGroup, MetricsProvider};
use crate::sample::read_utilization;
use crate::select::find_utilization_metric_set;
use crate::types::RunMode;

/// Granularity at which waits poll the cancel flag
const POLL_QUANTUM: Duration = Duration::from_millis(25);

/// Process-wide cancellation flag
///
/// Set at most once (a cancellation is never withdrawn) and polled between
/// ticks and inside every wait. Backed by a leaked `AtomicBool` so a C
/// signal handler writing a `static` flag can share it via
/// [`CancelFlag::from_static`].
#[derive(Debug, Clone, Copy)]
pub struct CancelFlag {
    flag: &'static AtomicBool,
}

impl CancelFlag {
    /// Create a fresh, un-cancelled flag
    pub fn new() -> Self {
        Self {
            flag: Box::leak(Box::new(AtomicBool::new(false))),
        }
    }

    /// Wrap a static flag, e.g. one written by a signal handler
    pub const fn from_static(flag: &'static AtomicBool) -> Self {
        Self { flag }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep for `total`, waking early if the flag is set
///
/// The sleep is broken into bounded chunks so a cancellation request is
/// observed within roughly one polling quantum. Returns true if the full
/// duration elapsed, false if the wait was cut short by cancellation.
pub(crate) fn wait_interruptible(total: Duration, cancel: CancelFlag) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(remaining.min(POLL_QUANTUM));
    }
}

/// GPU utilization monitor for one process invocation
pub struct Monitor<'a, P: MetricsProvider> {
    provider: &'a P,
    mode: RunMode,
    cancel: CancelFlag,
}

impl<'a, P: MetricsProvider> Monitor<'a, P> {
    /// Create a monitor over a bound provider
    pub fn new(provider: &'a P, mode: RunMode) -> Self {
        Self {
            provider,
            mode,
            cancel: CancelFlag::new(),
        }
    }

    /// Use an externally owned cancel flag (e.g. one a signal handler sets)
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The flag that cancels this monitor
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel
    }

    /// Run the monitor, writing one display line per sample to `out`
    ///
    /// Returns `Ok(())` on normal completion or cancellation. Discovery
    /// failures and fatal sampling failures are returned as errors after
    /// the provider handles have been dropped.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        let group = self.provider.open_adapter_group()?;
        eprintln!("Found {} adapter(s)", group.adapter_count());

        let adapter = (0..group.adapter_count())
            .filter_map(|index| group.adapter(index))
            .find(|adapter| adapter.info().is_intel())
            .ok_or(Error::NoEligibleAdapter)?;

        let info = adapter.info();
        eprintln!(
            "Found Intel GPU: {} (Device ID: 0x{:X})",
            info.name.as_deref().unwrap_or("Unknown"),
            info.device_id
        );

        let device = adapter.open_metrics_device()?;
        let selection = find_utilization_metric_set(&device)?;

        loop {
            let sample = read_utilization(&device, &selection, self.cancel)?;
            writeln!(out, "{}", sample.normalized())?;
            out.flush()?;

            match self.mode {
                RunMode::Snapshot => return Ok(()),
                RunMode::Continuous { interval } => {
                    if !wait_interruptible(interval, self.cancel) {
                        return Ok(());
                    }
                    if self.cancel.is_cancelled() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimAdapter, SimConcurrentGroup, SimMetricSet, SimProvider};

    fn provider_with_set(set: SimMetricSet) -> SimProvider {
        SimProvider::new().with_adapter(
            SimAdapter::intel(0x5917, "Intel UHD Graphics 620")
                .with_group(SimConcurrentGroup::new("OA").with_set(set)),
        )
    }

    #[test]
    fn test_snapshot_mode_prints_exactly_one_line() {
        let provider = provider_with_set(
            SimMetricSet::new("RenderBasic")
                .with_metric("RenderBusy", 25.0)
                .with_metric("BlitterBusy", 5.0)
                .with_metric("VideoBusy", 10.0),
        );
        let monitor = Monitor::new(&provider, RunMode::Snapshot);

        let mut out = Vec::new();
        monitor.run(&mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(
            output,
            "Render: 25.0%  Blitter: 5.0%  Video: 10.0%  Enhance: 0.0%  | Total: 40.0%\n"
        );
    }

    #[test]
    fn test_over_budget_sample_is_normalized() {
        let provider = provider_with_set(
            SimMetricSet::new("RenderBasic")
                .with_metric("RenderBusy", 80.0)
                .with_metric("BlitterBusy", 40.0),
        );
        let monitor = Monitor::new(&provider, RunMode::Snapshot);

        let mut out = Vec::new();
        monitor.run(&mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(
            output,
            "Render: 66.7%  Blitter: 33.3%  Video: 0.0%  Enhance: 0.0%  | Total: 100.0%\n"
        );
    }

    #[test]
    fn test_non_intel_adapter_is_not_eligible() {
        let provider = SimProvider::new().with_adapter(
            SimAdapter::new(0x1002, 0x73ff, Some("Radeon")).with_group(
                SimConcurrentGroup::new("OA").with_set(
                    SimMetricSet::new("RenderBasic").with_metric("RenderBusy", 25.0),
                ),
            ),
        );
        let monitor = Monitor::new(&provider, RunMode::Snapshot);

        let mut out: Vec<u8> = Vec::new();
        let err = monitor.run(&mut out).unwrap_err();
        assert!(matches!(err, Error::NoEligibleAdapter));
        assert!(out.is_empty());
    }

    #[test]
    fn test_provider_open_failure_propagates() {
        let provider = SimProvider::failing("libigdmd.so not found");
        let monitor = Monitor::new(&provider, RunMode::Snapshot);

        let mut out: Vec<u8> = Vec::new();
        let err = monitor.run(&mut out).unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable { .. }));
    }

    #[test]
    fn test_continuous_mode_stops_within_poll_quantum_of_cancel() {
        let provider = provider_with_set(
            SimMetricSet::new("RenderBasic").with_metric("RenderBusy", 25.0),
        );
        let monitor = Monitor::new(
            &provider,
            RunMode::Continuous {
                interval: Duration::from_secs(30),
            },
        );

        let cancel = monitor.cancel_flag();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            cancel.cancel();
        });

        let mut out: Vec<u8> = Vec::new();
        let start = Instant::now();
        monitor.run(&mut out).unwrap();
        let elapsed = start.elapsed();
        canceller.join().unwrap();

        // One tick (settle 100ms) plus the cancel at 150ms; nowhere near
        // the 30s interval.
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_continuous_mode_emits_multiple_lines() {
        let provider = provider_with_set(
            SimMetricSet::new("RenderBasic").with_metric("RenderBusy", 25.0),
        );
        let monitor = Monitor::new(
            &provider,
            RunMode::Continuous {
                interval: Duration::from_millis(10),
            },
        );

        let cancel = monitor.cancel_flag();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(350));
            cancel.cancel();
        });

        let mut out = Vec::new();
        monitor.run(&mut out).unwrap();
        canceller.join().unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.lines().count() >= 2, "output was: {output}");
    }
}
