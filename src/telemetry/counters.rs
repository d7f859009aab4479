use std::collections::HashMap;

use crate::touch::GestureKind;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OperationStats {
    pub count: u32,
    pub total_ms: u64,
    pub max_ms: u64,
    pub last_ms: u64,
}

impl OperationStats {
    fn record(&mut self, duration_ms: u64) {
        self.count = self.count.saturating_add(1);
        self.total_ms = self.total_ms.saturating_add(duration_ms);
        self.max_ms = self.max_ms.max(duration_ms);
        self.last_ms = duration_ms;
    }

    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms as f64 / self.count as f64
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureStats {
    pub count: u32,
    pub success_count: u32,
    pub error_count: u32,
    pub avg_recognition_ms: f64,
}

impl GestureStats {
    fn record(&mut self, recognition_ms: f64, success: bool) {
        self.count = self.count.saturating_add(1);
        if success {
            self.success_count = self.success_count.saturating_add(1);
        } else {
            self.error_count = self.error_count.saturating_add(1);
        }
        self.avg_recognition_ms += (recognition_ms - self.avg_recognition_ms) / self.count as f64;
    }
}

/// Named start/end timing pairs.
#[derive(Debug, Default)]
pub(crate) struct OperationTimings {
    open: HashMap<String, u64>,
    stats: HashMap<String, OperationStats>,
}

impl OperationTimings {
    pub(crate) fn start(&mut self, name: &str, now_ms: u64) {
        self.open.insert(name.to_owned(), now_ms);
    }

    pub(crate) fn end(&mut self, name: &str, now_ms: u64) -> Option<u64> {
        let started_ms = self.open.remove(name)?;
        let duration_ms = now_ms.saturating_sub(started_ms);
        self.stats
            .entry(name.to_owned())
            .or_default()
            .record(duration_ms);
        Some(duration_ms)
    }

    pub(crate) fn get(&self, name: &str) -> Option<OperationStats> {
        self.stats.get(name).copied()
    }

    pub(crate) fn clear(&mut self) {
        self.open.clear();
        self.stats.clear();
    }
}

/// Per-kind counters plus totals over every completed touch sequence.
#[derive(Debug, Default)]
pub(crate) struct GestureCounters {
    per_kind: HashMap<GestureKind, GestureStats>,
    attempts: u32,
    successes: u32,
    recognition_ms_total: f64,
}

impl GestureCounters {
    pub(crate) fn record(&mut self, kind: GestureKind, recognition_ms: f64, success: bool) {
        self.per_kind
            .entry(kind)
            .or_default()
            .record(recognition_ms, success);
        self.attempts = self.attempts.saturating_add(1);
        if success {
            self.successes = self.successes.saturating_add(1);
        }
        self.recognition_ms_total += recognition_ms;
    }

    pub(crate) fn record_unrecognized(&mut self, recognition_ms: f64) {
        self.attempts = self.attempts.saturating_add(1);
        self.recognition_ms_total += recognition_ms;
    }

    pub(crate) fn get(&self, kind: GestureKind) -> Option<GestureStats> {
        self.per_kind.get(&kind).copied()
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn successes(&self) -> u32 {
        self.successes
    }

    pub(crate) fn avg_recognition_ms(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.recognition_ms_total / self.attempts as f64
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
