use core::mem::size_of;

use crate::touch::{GestureEvent, TouchPoint};

/// Reusable value kept by an [`ObjectPool`].
pub trait Poolable: Default {
    /// Returns the value to its freshly-constructed state, keeping allocations.
    fn reset(&mut self);

    /// Approximate heap bytes held by this value.
    fn footprint_bytes(&self) -> usize;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub available: usize,
    pub capacity: usize,
    pub hits: u32,
    pub misses: u32,
    pub dropped: u32,
}

pub struct ObjectPool<T: Poolable> {
    items: Vec<T>,
    capacity: usize,
    hits: u32,
    misses: u32,
    dropped: u32,
}

impl<T: Poolable> ObjectPool<T> {
    /// Pre-fills the pool up to `capacity`.
    pub fn new(capacity: usize) -> Self {
        let mut pool = Self {
            items: Vec::with_capacity(capacity),
            capacity: 0,
            hits: 0,
            misses: 0,
            dropped: 0,
        };
        pool.resize(capacity);
        pool
    }

    pub fn acquire(&mut self) -> T {
        match self.items.pop() {
            Some(item) => {
                self.hits = self.hits.saturating_add(1);
                item
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                T::default()
            }
        }
    }

    /// Keeps the item only while under capacity. Returns `false` when dropped.
    pub fn release(&mut self, mut item: T) -> bool {
        if self.items.len() >= self.capacity {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        item.reset();
        self.items.push(item);
        true
    }

    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.items.truncate(capacity);
        while self.items.len() < capacity {
            self.items.push(T::default());
        }
        self.items.shrink_to(capacity);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn footprint_bytes(&self) -> usize {
        self.items
            .iter()
            .map(|item| size_of::<T>() + item.footprint_bytes())
            .sum()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            available: self.items.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            dropped: self.dropped,
        }
    }
}

/// Scratch space for serializing a gesture before hashing it.
#[derive(Debug, Default)]
pub struct TouchBuffer {
    points: Vec<TouchPoint>,
    bytes: Vec<u8>,
}

impl TouchBuffer {
    /// Start positions of every contact, then where the primary contact
    /// ended up when the gesture completed.
    pub fn fill(&mut self, event: &GestureEvent) {
        self.points.clear();
        let state = &event.state;
        self.points.extend(state.start_touches.iter().copied());
        if let Some(start) = state.start() {
            self.points.push(TouchPoint::new(
                start.identifier,
                start.x + state.delta_x,
                start.y + state.delta_y,
                event.t_ms,
            ));
        }
    }

    pub fn push(&mut self, touch: TouchPoint) {
        self.points.push(touch);
    }

    pub fn points(&self) -> &[TouchPoint] {
        &self.points
    }

    /// First point's position, then every point relative to it. Rounded to
    /// whole pixels and milliseconds, little-endian. Start time is dropped
    /// so a repeat at the same spot encodes the same.
    pub fn encode(&mut self) -> &[u8] {
        self.bytes.clear();
        let Some(origin) = self.points.first().copied() else {
            return &self.bytes;
        };
        self.bytes
            .extend_from_slice(&(origin.x.round() as i32).to_le_bytes());
        self.bytes
            .extend_from_slice(&(origin.y.round() as i32).to_le_bytes());
        for point in &self.points {
            let dx = (point.x - origin.x).round() as i32;
            let dy = (point.y - origin.y).round() as i32;
            let dt = point.t_ms.saturating_sub(origin.t_ms).min(u32::MAX as u64) as u32;
            self.bytes.extend_from_slice(&dx.to_le_bytes());
            self.bytes.extend_from_slice(&dy.to_le_bytes());
            self.bytes.extend_from_slice(&dt.to_le_bytes());
        }
        &self.bytes
    }
}

impl Poolable for TouchBuffer {
    fn reset(&mut self) {
        self.points.clear();
        self.bytes.clear();
    }

    fn footprint_bytes(&self) -> usize {
        self.points.capacity() * size_of::<TouchPoint>() + self.bytes.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Slot {
        value: u32,
        resets: u32,
    }

    impl Poolable for Slot {
        fn reset(&mut self) {
            self.value = 0;
            self.resets += 1;
        }

        fn footprint_bytes(&self) -> usize {
            0
        }
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let mut pool: ObjectPool<Slot> = ObjectPool::new(2);
        assert_eq!(pool.len(), 2);

        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();
        assert_eq!(pool.stats().hits, 2);
        assert_eq!(pool.stats().misses, 1);

        assert!(pool.release(a));
        assert!(pool.release(b));
        assert!(!pool.release(c));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.stats().dropped, 1);
    }

    #[test]
    fn released_items_are_reset() {
        let mut pool: ObjectPool<Slot> = ObjectPool::new(0);
        pool.resize(1);
        let mut slot = pool.acquire();
        slot.value = 7;
        pool.release(slot);
        let slot = pool.acquire();
        assert_eq!(slot.value, 0);
        assert_eq!(slot.resets, 1);
    }

    #[test]
    fn resize_allocates_and_truncates_immediately() {
        let mut pool: ObjectPool<Slot> = ObjectPool::new(4);
        pool.resize(1);
        assert_eq!((pool.len(), pool.capacity()), (1, 1));
        pool.resize(6);
        assert_eq!((pool.len(), pool.capacity()), (6, 6));
    }

    #[test]
    fn touch_buffer_encoding_ignores_start_time() {
        let mut a = TouchBuffer::default();
        a.push(TouchPoint::new(1, 10.0, 10.0, 100));
        a.push(TouchPoint::new(1, 60.0, 12.0, 180));
        let mut later = TouchBuffer::default();
        later.push(TouchPoint::new(4, 10.2, 9.9, 5_100));
        later.push(TouchPoint::new(4, 60.2, 11.9, 5_180));
        assert_eq!(a.encode().to_vec(), later.encode().to_vec());
        assert_eq!(a.encode().len(), 32);

        let mut elsewhere = TouchBuffer::default();
        elsewhere.push(TouchPoint::new(1, 310.0, 210.0, 100));
        elsewhere.push(TouchPoint::new(1, 360.0, 212.0, 180));
        assert_ne!(a.encode().to_vec(), elsewhere.encode().to_vec());

        a.reset();
        assert!(a.points().is_empty());
        assert!(a.encode().is_empty());
    }
}
