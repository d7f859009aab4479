use super::config::TuningConfig;
use crate::telemetry::{PerformanceSnapshot, PerformanceThresholds};

/// Budgets the tuner is allowed to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TunedLimits {
    pub cache_entries: usize,
    pub pool_capacity: usize,
    pub batch_size: usize,
    pub caching_enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    CacheEntries { from: usize, to: usize },
    PoolCapacity { from: usize, to: usize },
    BatchSize { from: usize, to: usize },
    Caching { enabled: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Band {
    Above,
    Within,
    Below,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AdaptiveTuner {
    config: TuningConfig,
}

impl AdaptiveTuner {
    pub fn new(config: TuningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TuningConfig) {
        self.config = config;
    }

    fn band(&self, value: f64, limit: f64) -> Band {
        if value > limit * self.config.high_water {
            Band::Above
        } else if value < limit * self.config.low_water {
            Band::Below
        } else {
            Band::Within
        }
    }

    fn scaled(value: usize, factor: f64, min: usize, max: usize) -> usize {
        let scaled = (value as f64 * factor).round();
        let scaled = if scaled.is_finite() && scaled > 0.0 {
            scaled as usize
        } else {
            0
        };
        scaled.clamp(min, max.max(min))
    }

    /// Compares the snapshot against the hysteresis bands and returns the
    /// changes to apply. Values inside a band are left alone.
    pub fn evaluate(
        &self,
        snapshot: &PerformanceSnapshot,
        thresholds: &PerformanceThresholds,
        current: TunedLimits,
    ) -> Vec<Adjustment> {
        let cfg = &self.config;
        let mut out = Vec::new();

        let memory_factor = match self.band(snapshot.memory_usage_mb, thresholds.max_memory_mb) {
            Band::Above => Some(cfg.shrink_factor),
            Band::Below => Some(cfg.grow_factor),
            Band::Within => None,
        };
        if let Some(factor) = memory_factor {
            let to = Self::scaled(
                current.cache_entries,
                factor,
                cfg.min_cache_entries,
                cfg.max_cache_entries,
            );
            if to != current.cache_entries {
                out.push(Adjustment::CacheEntries {
                    from: current.cache_entries,
                    to,
                });
            }
            let to = Self::scaled(
                current.pool_capacity,
                factor,
                cfg.min_pool_capacity,
                cfg.max_pool_capacity,
            );
            if to != current.pool_capacity {
                out.push(Adjustment::PoolCapacity {
                    from: current.pool_capacity,
                    to,
                });
            }
        }

        let latency_factor = match self.band(
            snapshot.avg_recognition_ms,
            thresholds.max_recognition_ms,
        ) {
            Band::Above => Some(cfg.shrink_factor),
            Band::Below => Some(cfg.grow_factor),
            Band::Within => None,
        };
        if let Some(factor) = latency_factor {
            let to = Self::scaled(
                current.batch_size,
                factor,
                cfg.min_batch_size,
                cfg.max_batch_size,
            );
            if to != current.batch_size {
                out.push(Adjustment::BatchSize {
                    from: current.batch_size,
                    to,
                });
            }
        }

        match self.band(snapshot.error_rate, thresholds.max_error_rate) {
            Band::Above if current.caching_enabled => {
                out.push(Adjustment::Caching { enabled: false });
            }
            Band::Below if !current.caching_enabled => {
                out.push(Adjustment::Caching { enabled: true });
            }
            _ => {}
        }

        out
    }
}
