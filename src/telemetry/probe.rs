/// Memory and battery proxies taken on each sampling tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResourceSample {
    pub memory_usage_mb: f64,
    /// Percent of battery per hour attributed to touch processing.
    pub battery_impact: f64,
}

/// Platform hook for real memory/battery readings.
pub trait ResourceProbe {
    fn sample(&mut self, now_ms: u64) -> ResourceSample;
}

impl<F> ResourceProbe for F
where
    F: FnMut(u64) -> ResourceSample,
{
    fn sample(&mut self, now_ms: u64) -> ResourceSample {
        self(now_ms)
    }
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BATTERY_PERCENT_PER_EVENT_PER_SEC: f64 = 0.02;
const BATTERY_IDLE_PERCENT: f64 = 0.01;

/// Built-in estimate used when no probe is installed: tracked bytes for
/// memory, touch event rate over the period for battery.
pub fn estimate_sample(footprint_bytes: usize, events: u32, elapsed_ms: u64) -> ResourceSample {
    let events_per_sec = if elapsed_ms == 0 {
        0.0
    } else {
        events as f64 * 1_000.0 / elapsed_ms as f64
    };
    ResourceSample {
        memory_usage_mb: footprint_bytes as f64 / BYTES_PER_MB,
        battery_impact: BATTERY_IDLE_PERCENT + events_per_sec * BATTERY_PERCENT_PER_EVENT_PER_SEC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_with_footprint_and_rate() {
        let idle = estimate_sample(0, 0, 1_000);
        assert_eq!(idle.memory_usage_mb, 0.0);
        assert_eq!(idle.battery_impact, BATTERY_IDLE_PERCENT);

        let busy = estimate_sample(2 * 1024 * 1024, 60, 1_000);
        assert_eq!(busy.memory_usage_mb, 2.0);
        assert!(busy.battery_impact > idle.battery_impact);

        assert_eq!(estimate_sample(0, 10, 0).battery_impact, BATTERY_IDLE_PERCENT);
    }

    #[test]
    fn closures_act_as_probes() {
        let mut probe = |now_ms: u64| ResourceSample {
            memory_usage_mb: now_ms as f64,
            battery_impact: 0.0,
        };
        assert_eq!(probe.sample(3).memory_usage_mb, 3.0);
    }
}
