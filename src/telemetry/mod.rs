//! Timing, throughput and error telemetry for the touch pipeline.
//!
//! Counters are instance-owned; snapshots are computed on demand from them.

mod counters;
mod probe;

use serde::{Deserialize, Serialize};

pub use counters::{GestureStats, OperationStats};
pub use probe::{estimate_sample, ResourceProbe, ResourceSample};

use counters::{GestureCounters, OperationTimings};

use crate::touch::GestureKind;

const PERF_MAX_RECOGNITION_MS: f64 = 16.0;
const PERF_MAX_MEMORY_MB: f64 = 50.0;
const PERF_MAX_BATTERY_IMPACT: f64 = 5.0;
const PERF_MAX_ERROR_RATE: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceThresholds {
    pub max_recognition_ms: f64,
    pub max_memory_mb: f64,
    /// Battery drain proxy in percent per hour.
    pub max_battery_impact: f64,
    pub max_error_rate: f64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            max_recognition_ms: PERF_MAX_RECOGNITION_MS,
            max_memory_mb: PERF_MAX_MEMORY_MB,
            max_battery_impact: PERF_MAX_BATTERY_IMPACT,
            max_error_rate: PERF_MAX_ERROR_RATE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceThresholdsPatch {
    pub max_recognition_ms: Option<f64>,
    pub max_memory_mb: Option<f64>,
    pub max_battery_impact: Option<f64>,
    pub max_error_rate: Option<f64>,
}

impl PerformanceThresholds {
    pub fn apply(&mut self, patch: &PerformanceThresholdsPatch) {
        if let Some(value) = patch.max_recognition_ms {
            self.max_recognition_ms = value;
        }
        if let Some(value) = patch.max_memory_mb {
            self.max_memory_mb = value;
        }
        if let Some(value) = patch.max_battery_impact {
            self.max_battery_impact = value;
        }
        if let Some(value) = patch.max_error_rate {
            self.max_error_rate = value;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerformanceSnapshot {
    pub avg_recognition_ms: f64,
    pub memory_usage_mb: f64,
    pub battery_impact: f64,
    pub error_rate: f64,
    pub success_rate: f64,
}

impl Default for PerformanceSnapshot {
    fn default() -> Self {
        Self {
            avg_recognition_ms: 0.0,
            memory_usage_mb: 0.0,
            battery_impact: 0.0,
            error_rate: 0.0,
            success_rate: 1.0,
        }
    }
}

pub struct PerformanceMonitor {
    thresholds: PerformanceThresholds,
    operations: OperationTimings,
    gestures: GestureCounters,
    last_sample: ResourceSample,
    last_sample_ms: Option<u64>,
    samples_taken: u32,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(PerformanceThresholds::default())
    }
}

impl PerformanceMonitor {
    pub fn new(thresholds: PerformanceThresholds) -> Self {
        Self {
            thresholds,
            operations: OperationTimings::default(),
            gestures: GestureCounters::default(),
            last_sample: ResourceSample::default(),
            last_sample_ms: None,
            samples_taken: 0,
        }
    }

    pub fn thresholds(&self) -> &PerformanceThresholds {
        &self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: PerformanceThresholds) {
        self.thresholds = thresholds;
    }

    pub fn start_operation(&mut self, name: &str, now_ms: u64) {
        self.operations.start(name, now_ms);
    }

    /// Duration of the matching `start_operation`, `None` if none is open.
    pub fn end_operation(&mut self, name: &str, now_ms: u64) -> Option<u64> {
        self.operations.end(name, now_ms)
    }

    pub fn operation_stats(&self, name: &str) -> Option<OperationStats> {
        self.operations.get(name)
    }

    pub fn record_gesture(&mut self, kind: GestureKind, recognition_ms: f64, success: bool) {
        self.gestures.record(kind, recognition_ms, success);
    }

    pub fn record_unrecognized(&mut self, recognition_ms: f64) {
        self.gestures.record_unrecognized(recognition_ms);
    }

    pub fn gesture_stats(&self, kind: GestureKind) -> Option<GestureStats> {
        self.gestures.get(kind)
    }

    pub fn record_sample(&mut self, sample: ResourceSample, now_ms: u64) {
        self.last_sample = sample;
        self.last_sample_ms = Some(now_ms);
        self.samples_taken = self.samples_taken.saturating_add(1);
        log::debug!(
            "telemetry: sample t_ms={} memory_mb={:.2} battery={:.3}",
            now_ms,
            sample.memory_usage_mb,
            sample.battery_impact
        );
    }

    pub fn last_sample_ms(&self) -> Option<u64> {
        self.last_sample_ms
    }

    pub fn samples_taken(&self) -> u32 {
        self.samples_taken
    }

    pub fn snapshot(&self) -> PerformanceSnapshot {
        let total = self.gestures.attempts();
        let successes = self.gestures.successes();
        let (error_rate, success_rate) = if total == 0 {
            (0.0, 1.0)
        } else {
            let total = total as f64;
            let successes = successes as f64;
            ((total - successes) / total, successes / total)
        };
        PerformanceSnapshot {
            avg_recognition_ms: self.gestures.avg_recognition_ms(),
            memory_usage_mb: self.last_sample.memory_usage_mb,
            battery_impact: self.last_sample.battery_impact,
            error_rate,
            success_rate,
        }
    }

    pub fn is_acceptable(&self, snapshot: &PerformanceSnapshot) -> bool {
        let limits = &self.thresholds;
        snapshot.avg_recognition_ms <= limits.max_recognition_ms
            && snapshot.memory_usage_mb <= limits.max_memory_mb
            && snapshot.battery_impact <= limits.max_battery_impact
            && snapshot.error_rate <= limits.max_error_rate
    }

    pub fn recommendations(&self, snapshot: &PerformanceSnapshot) -> Vec<String> {
        let limits = &self.thresholds;
        let mut out = Vec::new();
        if snapshot.avg_recognition_ms > limits.max_recognition_ms {
            out.push(format!(
                "Gesture recognition averages {:.1}ms (limit {:.1}ms); reduce batch size or listener work",
                snapshot.avg_recognition_ms, limits.max_recognition_ms
            ));
        }
        if snapshot.memory_usage_mb > limits.max_memory_mb {
            out.push(format!(
                "Memory usage {:.1}MB exceeds {:.1}MB; shrink the result cache and object pools",
                snapshot.memory_usage_mb, limits.max_memory_mb
            ));
        }
        if snapshot.battery_impact > limits.max_battery_impact {
            out.push(format!(
                "Battery impact {:.2}%/h exceeds {:.2}%/h; lower the sampling rate",
                snapshot.battery_impact, limits.max_battery_impact
            ));
        }
        if snapshot.error_rate > limits.max_error_rate {
            out.push(format!(
                "Error rate {:.1}% exceeds {:.1}%; check gesture listeners and thresholds",
                snapshot.error_rate * 100.0,
                limits.max_error_rate * 100.0
            ));
        }
        out
    }

    pub fn reset(&mut self) {
        self.operations.clear();
        self.gestures.clear();
        self.last_sample = ResourceSample::default();
        self.last_sample_ms = None;
        self.samples_taken = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::SwipeDirection;

    #[test]
    fn empty_monitor_reports_perfect_rates() {
        let monitor = PerformanceMonitor::default();
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.error_rate, 0.0);
        assert_eq!(snapshot.success_rate, 1.0);
        assert_eq!(snapshot.avg_recognition_ms, 0.0);
        assert!(monitor.is_acceptable(&snapshot));
        assert!(monitor.recommendations(&snapshot).is_empty());
    }

    #[test]
    fn error_rate_counts_unrecognized_and_failed_dispatch() {
        let mut monitor = PerformanceMonitor::default();
        monitor.record_gesture(GestureKind::Tap, 1.0, true);
        monitor.record_gesture(GestureKind::Tap, 1.0, true);
        monitor.record_gesture(GestureKind::Swipe(SwipeDirection::Up), 2.0, false);
        monitor.record_unrecognized(4.0);

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.error_rate, 0.5);
        assert_eq!(snapshot.success_rate, 0.5);
        assert_eq!(snapshot.avg_recognition_ms, 2.0);
        assert_eq!(
            monitor.gesture_stats(GestureKind::Tap).map(|s| s.success_count),
            Some(2)
        );
        assert!(!monitor.is_acceptable(&snapshot));
    }

    #[test]
    fn every_threshold_must_pass() {
        let monitor = PerformanceMonitor::default();
        let good = PerformanceSnapshot::default();
        assert!(monitor.is_acceptable(&good));

        let cases = [
            PerformanceSnapshot {
                avg_recognition_ms: 17.0,
                ..good
            },
            PerformanceSnapshot {
                memory_usage_mb: 51.0,
                ..good
            },
            PerformanceSnapshot {
                battery_impact: 5.5,
                ..good
            },
            PerformanceSnapshot {
                error_rate: 0.06,
                ..good
            },
        ];
        for snapshot in cases {
            assert!(!monitor.is_acceptable(&snapshot), "{snapshot:?}");
            assert_eq!(monitor.recommendations(&snapshot).len(), 1);
        }
    }

    #[test]
    fn samples_feed_snapshot() {
        let mut monitor = PerformanceMonitor::default();
        monitor.record_sample(
            ResourceSample {
                memory_usage_mb: 12.5,
                battery_impact: 0.4,
            },
            1_000,
        );
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.memory_usage_mb, 12.5);
        assert_eq!(snapshot.battery_impact, 0.4);
        assert_eq!(monitor.last_sample_ms(), Some(1_000));

        monitor.reset();
        assert_eq!(monitor.snapshot(), PerformanceSnapshot::default());
        assert_eq!(monitor.samples_taken(), 0);
    }
}
