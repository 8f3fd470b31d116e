//! Data types for GPU engine utilization sampling

use std::fmt;
use std::time::Duration;

/// GPU engine categories whose busy percentage is reported
///
/// This is the closed set of engines the classifier recognizes. The order
/// of [`EngineKind::ALL`] is the order in which category tokens are checked
/// when a metric name mentions more than one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Render/3D engine
    Render,
    /// Blitter/Copy engine
    Blitter,
    /// Video decode engine
    Video,
    /// Video enhance engine (absent on some adapters)
    Enhance,
}

impl EngineKind {
    /// All engine kinds, in classification order
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Render,
        EngineKind::Blitter,
        EngineKind::Video,
        EngineKind::Enhance,
    ];

    /// Get the display name for this engine
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Render => "Render",
            EngineKind::Blitter => "Blitter",
            EngineKind::Video => "Video",
            EngineKind::Enhance => "Enhance",
        }
    }
}

/// Per-engine busy percentages for one sampling tick
///
/// Produced fresh on every tick. `total` is the plain sum of the four
/// engine slots until [`UtilizationSample::normalized`] is applied, after
/// which it is capped at 100.0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UtilizationSample {
    /// Render engine busy percentage
    pub render: f64,
    /// Blitter engine busy percentage
    pub blitter: f64,
    /// Video engine busy percentage
    pub video: f64,
    /// Video enhance engine busy percentage
    pub enhance: f64,
    /// Sum of the engine percentages
    pub total: f64,
}

impl UtilizationSample {
    /// Create an all-zero sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a value to one engine's slot
    pub fn set(&mut self, engine: EngineKind, percent: f64) {
        match engine {
            EngineKind::Render => self.render = percent,
            EngineKind::Blitter => self.blitter = percent,
            EngineKind::Video => self.video = percent,
            EngineKind::Enhance => self.enhance = percent,
        }
    }

    /// Read one engine's slot
    pub fn get(&self, engine: EngineKind) -> f64 {
        match engine {
            EngineKind::Render => self.render,
            EngineKind::Blitter => self.blitter,
            EngineKind::Video => self.video,
            EngineKind::Enhance => self.enhance,
        }
    }

    /// Recompute `total` as the sum of the four engine slots
    pub fn update_total(&mut self) {
        self.total = self.render + self.blitter + self.video + self.enhance;
    }

    /// Rescale so the total never exceeds 100%, preserving proportions
    ///
    /// A sample whose total is already within 100% (including an all-idle
    /// zero sample) is returned unchanged. Otherwise every engine slot is
    /// multiplied by `100.0 / total` and the total becomes exactly 100.0.
    pub fn normalized(&self) -> Self {
        if self.total <= 100.0 {
            return *self;
        }
        let scale = 100.0 / self.total;
        Self {
            render: self.render * scale,
            blitter: self.blitter * scale,
            video: self.video * scale,
            enhance: self.enhance * scale,
            total: 100.0,
        }
    }
}

impl fmt::Display for UtilizationSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Render: {:.1}%  Blitter: {:.1}%  Video: {:.1}%  Enhance: {:.1}%  | Total: {:.1}%",
            self.render, self.blitter, self.video, self.enhance, self.total
        )
    }
}

/// How many sampling ticks the monitor runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Take a single sample, print it, and stop
    Snapshot,
    /// Sample repeatedly until cancelled
    Continuous {
        /// Delay between the end of one tick and the start of the next
        interval: Duration,
    },
}

impl RunMode {
    /// Continuous monitoring at the default one second interval
    pub fn continuous_default() -> Self {
        RunMode::Continuous {
            interval: Duration::from_secs(1),
        }
    }
}

impl Default for RunMode {
    fn default() -> Self {
        Self::continuous_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_within_budget_is_identity() {
        let mut sample = UtilizationSample {
            render: 25.0,
            blitter: 5.0,
            video: 10.0,
            enhance: 0.0,
            ..Default::default()
        };
        sample.update_total();
        assert_eq!(sample.normalized(), sample);
        assert_eq!(sample.total, 40.0);
    }

    #[test]
    fn test_normalize_over_budget_preserves_proportions() {
        let mut sample = UtilizationSample {
            render: 80.0,
            blitter: 40.0,
            video: 20.0,
            enhance: 10.0,
            ..Default::default()
        };
        sample.update_total();
        assert_eq!(sample.total, 150.0);

        let scaled = sample.normalized();
        assert_eq!(scaled.total, 100.0);

        let sum = scaled.render + scaled.blitter + scaled.video + scaled.enhance;
        assert!((sum - 100.0).abs() < 1e-9);

        // Ratios to the new total match ratios to the old total
        for engine in EngineKind::ALL {
            let before = sample.get(engine) / sample.total;
            let after = scaled.get(engine) / scaled.total;
            assert!((before - after).abs() < 1e-9, "{} ratio drifted", engine.name());
        }
    }

    #[test]
    fn test_normalize_zero_total_no_division() {
        let sample = UtilizationSample::new();
        let scaled = sample.normalized();
        assert_eq!(scaled, sample);
        assert_eq!(scaled.total, 0.0);
    }

    #[test]
    fn test_display_format() {
        let mut sample = UtilizationSample {
            render: 23.42,
            blitter: 0.0,
            video: 12.34,
            enhance: 0.0,
            ..Default::default()
        };
        sample.update_total();
        assert_eq!(
            sample.to_string(),
            "Render: 23.4%  Blitter: 0.0%  Video: 12.3%  Enhance: 0.0%  | Total: 35.8%"
        );
    }

    #[test]
    fn test_default_run_mode() {
        assert_eq!(
            RunMode::default(),
            RunMode::Continuous {
                interval: Duration::from_secs(1)
            }
        );
    }
}
