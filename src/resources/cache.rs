use std::collections::HashMap;

use crate::touch::GestureKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: GestureKind,
    pub hash: u32,
}

impl CacheKey {
    pub fn new(kind: GestureKind, payload: &[u8]) -> Self {
        Self {
            kind,
            hash: payload_hash(payload),
        }
    }
}

/// 32-bit rolling polynomial hash (`h = h * 31 + byte`, wrapping).
pub fn payload_hash(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(0u32, |hash, byte| hash.wrapping_mul(31).wrapping_add(u32::from(*byte)))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
    pub enabled: bool,
    pub hits: u32,
    pub misses: u32,
    pub evictions: u32,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits.saturating_add(self.misses);
        if lookups == 0 {
            0.0
        } else {
            f64::from(self.hits) / f64::from(lookups)
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_ms: u64,
    seq: u64,
}

/// Bounded map that evicts the entry with the oldest insertion time.
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: HashMap<CacheKey, Entry<V>>,
    capacity: usize,
    enabled: bool,
    next_seq: u64,
    hits: u32,
    misses: u32,
    evictions: u32,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            enabled: true,
            next_seq: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        if !self.enabled {
            self.misses = self.misses.saturating_add(1);
            return None;
        }
        match self.entries.get(key) {
            Some(entry) => {
                self.hits = self.hits.saturating_add(1);
                Some(entry.value.clone())
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, value: V, now_ms: u64) {
        if !self.enabled || self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_ms: now_ms,
                seq,
            },
        );
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.inserted_ms, entry.seq))
            .map(|(key, _)| *key);
        match oldest {
            Some(key) => {
                self.entries.remove(&key);
                self.evictions = self.evictions.saturating_add(1);
                log::debug!(
                    "cache: evicted kind={} hash={:#010x} len={}",
                    key.kind.as_str(),
                    key.hash,
                    self.entries.len()
                );
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > capacity {
            if !self.evict_oldest() {
                break;
            }
        }
    }

    /// Disabling bypasses the cache and drops every entry.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.entries.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn footprint_bytes(&self) -> usize {
        self.entries.len() * core::mem::size_of::<(CacheKey, Entry<V>)>()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.entries.len(),
            capacity: self.capacity,
            enabled: self.enabled,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}
