use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub pending: usize,
    pub batch_size: usize,
    pub batches_ok: u32,
    pub batches_failed: u32,
    pub items_processed: u32,
    pub items_dropped: u32,
}

/// FIFO of work awaiting a deferred drain.
///
/// Draining is two-phase: [`BatchQueue::take_batch`] hands out up to
/// `batch_size` items and marks the queue as draining, and
/// [`BatchQueue::complete_batch`] reports the outcome. Items enqueued in
/// between mark the queue dirty so completion asks for another drain.
#[derive(Debug)]
pub struct BatchQueue<T> {
    pending: VecDeque<T>,
    batch_size: usize,
    max_pending: usize,
    draining: bool,
    dirty: bool,
    drain_requested: bool,
    stats: BatchStats,
}

impl<T> BatchQueue<T> {
    pub fn new(batch_size: usize, max_pending: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            pending: VecDeque::new(),
            batch_size,
            max_pending: max_pending.max(batch_size),
            draining: false,
            dirty: false,
            drain_requested: false,
            stats: BatchStats::default(),
        }
    }

    /// Returns `true` when the caller should schedule a drain.
    pub fn enqueue(&mut self, item: T) -> bool {
        if self.pending.len() >= self.max_pending {
            self.pending.pop_front();
            self.stats.items_dropped = self.stats.items_dropped.saturating_add(1);
            log::warn!(
                "batch: pending_full max={} dropped_oldest",
                self.max_pending
            );
        }
        self.pending.push_back(item);

        if self.draining {
            self.dirty = true;
            return false;
        }
        self.request_if_full()
    }

    fn request_if_full(&mut self) -> bool {
        if self.drain_requested || self.pending.len() < self.batch_size {
            return false;
        }
        self.drain_requested = true;
        true
    }

    /// `None` while a drain is in progress or nothing is pending.
    pub fn take_batch(&mut self) -> Option<Vec<T>> {
        if self.draining {
            return None;
        }
        self.drain_requested = false;
        if self.pending.is_empty() {
            return None;
        }
        let count = self.batch_size.min(self.pending.len());
        self.draining = true;
        self.dirty = false;
        Some(self.pending.drain(..count).collect())
    }

    /// Failed batches go back to the front in their original order.
    /// Returns `true` when a follow-up drain should be scheduled.
    pub fn complete_batch(&mut self, batch: Vec<T>, result: anyhow::Result<()>) -> bool {
        self.draining = false;
        let dirty = core::mem::take(&mut self.dirty);
        match result {
            Ok(()) => {
                self.stats.batches_ok = self.stats.batches_ok.saturating_add(1);
                let count = u32::try_from(batch.len()).unwrap_or(u32::MAX);
                self.stats.items_processed = self.stats.items_processed.saturating_add(count);
            }
            Err(err) => {
                self.stats.batches_failed = self.stats.batches_failed.saturating_add(1);
                log::warn!(
                    "batch: drain_failed items={} pending={} err={:#}",
                    batch.len(),
                    self.pending.len(),
                    err
                );
                for item in batch.into_iter().rev() {
                    self.pending.push_front(item);
                }
                return false;
            }
        }

        if self.drain_requested {
            return false;
        }
        if dirty && !self.pending.is_empty() {
            self.drain_requested = true;
            return true;
        }
        self.request_if_full()
    }

    /// Removes everything still pending, ignoring the draining flag.
    pub fn flush(&mut self) -> Vec<T> {
        self.draining = false;
        self.dirty = false;
        self.drain_requested = false;
        self.pending.drain(..).collect()
    }

    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size.max(1);
        self.max_pending = self.max_pending.max(self.batch_size);
    }

    pub fn set_max_pending(&mut self, max_pending: usize) {
        self.max_pending = max_pending.max(self.batch_size);
        while self.pending.len() > self.max_pending {
            self.pending.pop_front();
            self.stats.items_dropped = self.stats.items_dropped.saturating_add(1);
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    pub fn stats(&self) -> BatchStats {
        BatchStats {
            pending: self.pending.len(),
            batch_size: self.batch_size,
            ..self.stats
        }
    }
}
