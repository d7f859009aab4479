use serde::{Deserialize, Serialize};

const POOL_CAPACITY: usize = 16;
const CACHE_MAX_ENTRIES: usize = 64;
const BATCH_SIZE: usize = 8;
const BATCH_MAX_PENDING: usize = 256;

const TUNING_HIGH_WATER: f64 = 0.9;
const TUNING_LOW_WATER: f64 = 0.5;
const TUNING_SHRINK_FACTOR: f64 = 0.5;
const TUNING_GROW_FACTOR: f64 = 1.5;
const TUNING_MIN_CACHE_ENTRIES: usize = 8;
const TUNING_MAX_CACHE_ENTRIES: usize = 256;
const TUNING_MIN_POOL_CAPACITY: usize = 4;
const TUNING_MAX_POOL_CAPACITY: usize = 64;
const TUNING_MIN_BATCH_SIZE: usize = 1;
const TUNING_MAX_BATCH_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: POOL_CAPACITY,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfigPatch {
    pub capacity: Option<usize>,
}

impl PoolConfig {
    pub fn apply(&mut self, patch: &PoolConfigPatch) {
        if let Some(value) = patch.capacity {
            self.capacity = value;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: CACHE_MAX_ENTRIES,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfigPatch {
    pub enabled: Option<bool>,
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    pub fn apply(&mut self, patch: &CacheConfigPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.max_entries {
            self.max_entries = value;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub batch_size: usize,
    /// Oldest entries are dropped past this bound.
    pub max_pending: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            max_pending: BATCH_MAX_PENDING,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfigPatch {
    pub batch_size: Option<usize>,
    pub max_pending: Option<usize>,
}

impl BatchConfig {
    pub fn apply(&mut self, patch: &BatchConfigPatch) {
        if let Some(value) = patch.batch_size {
            self.batch_size = value;
        }
        if let Some(value) = patch.max_pending {
            self.max_pending = value;
        }
    }
}

/// Hysteresis bands are fractions of the matching performance threshold:
/// above `high_water` shrinks, below `low_water` grows, in between holds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub high_water: f64,
    pub low_water: f64,
    pub shrink_factor: f64,
    pub grow_factor: f64,
    pub min_cache_entries: usize,
    pub max_cache_entries: usize,
    pub min_pool_capacity: usize,
    pub max_pool_capacity: usize,
    pub min_batch_size: usize,
    pub max_batch_size: usize,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            high_water: TUNING_HIGH_WATER,
            low_water: TUNING_LOW_WATER,
            shrink_factor: TUNING_SHRINK_FACTOR,
            grow_factor: TUNING_GROW_FACTOR,
            min_cache_entries: TUNING_MIN_CACHE_ENTRIES,
            max_cache_entries: TUNING_MAX_CACHE_ENTRIES,
            min_pool_capacity: TUNING_MIN_POOL_CAPACITY,
            max_pool_capacity: TUNING_MAX_POOL_CAPACITY,
            min_batch_size: TUNING_MIN_BATCH_SIZE,
            max_batch_size: TUNING_MAX_BATCH_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfigPatch {
    pub high_water: Option<f64>,
    pub low_water: Option<f64>,
    pub shrink_factor: Option<f64>,
    pub grow_factor: Option<f64>,
    pub min_cache_entries: Option<usize>,
    pub max_cache_entries: Option<usize>,
    pub min_pool_capacity: Option<usize>,
    pub max_pool_capacity: Option<usize>,
    pub min_batch_size: Option<usize>,
    pub max_batch_size: Option<usize>,
}

impl TuningConfig {
    pub fn apply(&mut self, patch: &TuningConfigPatch) {
        if let Some(value) = patch.high_water {
            self.high_water = value;
        }
        if let Some(value) = patch.low_water {
            self.low_water = value;
        }
        if let Some(value) = patch.shrink_factor {
            self.shrink_factor = value;
        }
        if let Some(value) = patch.grow_factor {
            self.grow_factor = value;
        }
        if let Some(value) = patch.min_cache_entries {
            self.min_cache_entries = value;
        }
        if let Some(value) = patch.max_cache_entries {
            self.max_cache_entries = value;
        }
        if let Some(value) = patch.min_pool_capacity {
            self.min_pool_capacity = value;
        }
        if let Some(value) = patch.max_pool_capacity {
            self.max_pool_capacity = value;
        }
        if let Some(value) = patch.min_batch_size {
            self.min_batch_size = value;
        }
        if let Some(value) = patch.max_batch_size {
            self.max_batch_size = value;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub pool: PoolConfig,
    pub cache: CacheConfig,
    pub batch: BatchConfig,
    pub tuning: TuningConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfigPatch {
    pub pool: Option<PoolConfigPatch>,
    pub cache: Option<CacheConfigPatch>,
    pub batch: Option<BatchConfigPatch>,
    pub tuning: Option<TuningConfigPatch>,
}

impl ResourceConfig {
    pub fn apply(&mut self, patch: &ResourceConfigPatch) {
        if let Some(pool) = &patch.pool {
            self.pool.apply(pool);
        }
        if let Some(cache) = &patch.cache {
            self.cache.apply(cache);
        }
        if let Some(batch) = &patch.batch {
            self.batch.apply(batch);
        }
        if let Some(tuning) = &patch.tuning {
            self.tuning.apply(tuning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_patch_touches_only_named_sections() {
        let patch: ResourceConfigPatch = toml::from_str(
            r#"
            [batch]
            batch_size = 4

            [tuning]
            grow_factor = 2.0
            "#,
        )
        .expect("patch parses");

        let mut config = ResourceConfig::default();
        config.apply(&patch);
        assert_eq!(config.batch.batch_size, 4);
        assert_eq!(config.batch.max_pending, BATCH_MAX_PENDING);
        assert_eq!(config.tuning.grow_factor, 2.0);
        assert_eq!(config.tuning.shrink_factor, TUNING_SHRINK_FACTOR);
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.pool, PoolConfig::default());
    }
}
