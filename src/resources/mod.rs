//! Runtime budgets for the touch pipeline: scratch buffer pool, recognition
//! result cache, batch queue for recognized events and the adaptive tuner that
//! resizes them from performance snapshots.

mod batch;
mod cache;
mod config;
mod pool;
mod tuning;

pub use batch::{BatchQueue, BatchStats};
pub use cache::{payload_hash, CacheKey, CacheStats, ResultCache};
pub use config::{
    BatchConfig, BatchConfigPatch, CacheConfig, CacheConfigPatch, PoolConfig, PoolConfigPatch,
    ResourceConfig, ResourceConfigPatch, TuningConfig, TuningConfigPatch,
};
pub use pool::{ObjectPool, PoolStats, Poolable, TouchBuffer};
pub use tuning::{Adjustment, AdaptiveTuner, TunedLimits};

use core::mem::size_of;

use crate::telemetry::{PerformanceSnapshot, PerformanceThresholds};
use crate::touch::{GestureEvent, RecognitionResult};

const LOW_HIT_RATE: f64 = 0.1;
const LOW_HIT_RATE_MIN_LOOKUPS: u32 = 50;
const POOL_MISS_RATIO: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceStats {
    pub pool: PoolStats,
    pub cache: CacheStats,
    pub batch: BatchStats,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheOutcome {
    pub key: CacheKey,
    pub result: RecognitionResult,
    /// `result` came from the cache rather than being computed.
    pub hit: bool,
}

pub struct ResourceManager {
    config: ResourceConfig,
    pool: ObjectPool<TouchBuffer>,
    cache: ResultCache<RecognitionResult>,
    queue: BatchQueue<GestureEvent>,
    tuner: AdaptiveTuner,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(ResourceConfig::default())
    }
}

impl ResourceManager {
    pub fn new(config: ResourceConfig) -> Self {
        let mut cache = ResultCache::new(config.cache.max_entries);
        cache.set_enabled(config.cache.enabled);
        Self {
            config,
            pool: ObjectPool::new(config.pool.capacity),
            cache,
            queue: BatchQueue::new(config.batch.batch_size, config.batch.max_pending),
            tuner: AdaptiveTuner::new(config.tuning),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: ResourceConfig) {
        self.config = config;
        self.pool.resize(config.pool.capacity);
        self.cache.set_enabled(config.cache.enabled);
        self.cache.resize(config.cache.max_entries);
        self.queue.set_batch_size(config.batch.batch_size);
        self.queue.set_max_pending(config.batch.max_pending);
        self.tuner.set_config(config.tuning);
    }

    /// Hashes the gesture's touches with a pooled scratch buffer and returns
    /// the cached result for that key, computing and storing it on a miss.
    pub fn resolve_result(&mut self, event: &GestureEvent) -> CacheOutcome {
        let mut buffer = self.pool.acquire();
        buffer.fill(event);
        let key = CacheKey::new(event.kind, buffer.encode());
        self.pool.release(buffer);

        if let Some(result) = self.cache.get(&key) {
            return CacheOutcome {
                key,
                result,
                hit: true,
            };
        }
        let result = RecognitionResult::from_event(event);
        self.cache.insert(key, result, event.t_ms);
        CacheOutcome {
            key,
            result,
            hit: false,
        }
    }

    pub fn cached(&mut self, key: &CacheKey) -> Option<RecognitionResult> {
        self.cache.get(key)
    }

    /// Returns `true` when a drain should be scheduled.
    pub fn enqueue(&mut self, event: GestureEvent) -> bool {
        self.queue.enqueue(event)
    }

    pub fn take_batch(&mut self) -> Option<Vec<GestureEvent>> {
        self.queue.take_batch()
    }

    pub fn complete_batch(&mut self, batch: Vec<GestureEvent>, result: anyhow::Result<()>) -> bool {
        self.queue.complete_batch(batch, result)
    }

    pub fn flush(&mut self) -> Vec<GestureEvent> {
        self.queue.flush()
    }

    pub fn limits(&self) -> TunedLimits {
        TunedLimits {
            cache_entries: self.cache.capacity(),
            pool_capacity: self.pool.capacity(),
            batch_size: self.queue.batch_size(),
            caching_enabled: self.cache.is_enabled(),
        }
    }

    /// Runs the tuner and applies whatever it decides.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &PerformanceSnapshot,
        thresholds: &PerformanceThresholds,
    ) -> Vec<Adjustment> {
        let adjustments = self.tuner.evaluate(snapshot, thresholds, self.limits());
        for adjustment in &adjustments {
            match *adjustment {
                Adjustment::CacheEntries { from, to } => {
                    self.cache.resize(to);
                    self.config.cache.max_entries = to;
                    log::info!("resources: cache_resized from={} to={}", from, to);
                }
                Adjustment::PoolCapacity { from, to } => {
                    self.pool.resize(to);
                    self.config.pool.capacity = to;
                    log::info!("resources: pool_resized from={} to={}", from, to);
                }
                Adjustment::BatchSize { from, to } => {
                    self.queue.set_batch_size(to);
                    self.config.batch.batch_size = to;
                    log::info!("resources: batch_resized from={} to={}", from, to);
                }
                Adjustment::Caching { enabled } => {
                    self.cache.set_enabled(enabled);
                    self.config.cache.enabled = enabled;
                    log::info!("resources: caching enabled={}", enabled);
                }
            }
        }
        adjustments
    }

    pub fn footprint_bytes(&self) -> usize {
        self.pool.footprint_bytes()
            + self.cache.footprint_bytes()
            + self.queue.len() * size_of::<GestureEvent>()
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            pool: self.pool.stats(),
            cache: self.cache.stats(),
            batch: self.queue.stats(),
        }
    }

    pub fn recommendations(&self) -> Vec<String> {
        let stats = self.stats();
        let mut out = Vec::new();

        let lookups = stats.cache.hits.saturating_add(stats.cache.misses);
        if stats.cache.enabled
            && lookups >= LOW_HIT_RATE_MIN_LOOKUPS
            && stats.cache.hit_rate() < LOW_HIT_RATE
        {
            out.push(format!(
                "Result cache hit rate is {:.0}% over {} lookups; consider disabling it",
                stats.cache.hit_rate() * 100.0,
                lookups
            ));
        }
        if stats.pool.misses > stats.pool.hits.saturating_mul(POOL_MISS_RATIO) {
            out.push(format!(
                "Object pool missed {} of {} acquisitions; raise pool capacity",
                stats.pool.misses,
                stats.pool.hits.saturating_add(stats.pool.misses)
            ));
        }
        if stats.batch.batches_failed > 0 {
            out.push(format!(
                "{} batch drains failed; check the batch processor",
                stats.batch.batches_failed
            ));
        }
        if stats.batch.items_dropped > 0 {
            out.push(format!(
                "{} queued gestures were dropped; drain more often or raise max_pending",
                stats.batch.items_dropped
            ));
        }
        out
    }

    pub fn pool(&self) -> &ObjectPool<TouchBuffer> {
        &self.pool
    }

    pub fn cache(&self) -> &ResultCache<RecognitionResult> {
        &self.cache
    }

    pub fn queue(&self) -> &BatchQueue<GestureEvent> {
        &self.queue
    }
}
