//! Instance-owned cooperative scheduler.
//!
//! Nothing runs on its own: the owner calls [`Scheduler::poll`] with the
//! current time and executes the returned tasks. Periodic timers anchor on the
//! first poll after [`Scheduler::start`]. Deferred tasks go through a bounded
//! channel and come back on the next poll, never inside the call that
//! deferred them.

use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};

const DEFERRED_CAPACITY: usize = 8;
const MAX_TIMERS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    SampleResources,
    TuneResources,
    DrainBatch,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::SampleResources => "sample_resources",
            Task::TuneResources => "tune_resources",
            Task::DrainBatch => "drain_batch",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    task: Task,
    period_ms: u64,
    next_due_ms: Option<u64>,
}

pub struct Scheduler {
    timers: heapless::Vec<Timer, MAX_TIMERS>,
    deferred: Channel<NoopRawMutex, Task, DEFERRED_CAPACITY>,
    running: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            timers: heapless::Vec::new(),
            deferred: Channel::new(),
            running: false,
        }
    }

    /// Registers or re-periods a timer. A period of zero disables it.
    pub fn every(&mut self, task: Task, period_ms: u64) {
        if let Some(timer) = self.timers.iter_mut().find(|timer| timer.task == task) {
            if timer.period_ms != period_ms {
                timer.period_ms = period_ms;
                timer.next_due_ms = None;
            }
            return;
        }
        let timer = Timer {
            task,
            period_ms,
            next_due_ms: None,
        };
        if self.timers.push(timer).is_err() {
            log::warn!("scheduler: timers_full task={}", task.as_str());
        }
    }

    pub fn period_ms(&self, task: Task) -> Option<u64> {
        self.timers
            .iter()
            .find(|timer| timer.task == task)
            .map(|timer| timer.period_ms)
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        for timer in self.timers.iter_mut() {
            timer.next_due_ms = None;
        }
        log::debug!("scheduler: start timers={}", self.timers.len());
    }

    /// Stops timers and discards deferred work.
    pub fn stop(&mut self) {
        self.running = false;
        while self.deferred.try_receive().is_ok() {}
        log::debug!("scheduler: stop");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Queues a task for the next poll. Returns `false` when the queue is
    /// full or the scheduler is stopped.
    pub fn defer(&mut self, task: Task) -> bool {
        if !self.running {
            return false;
        }
        match self.deferred.try_send(task) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("scheduler: deferred_full task={}", task.as_str());
                false
            }
        }
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Due work: deferred tasks first in FIFO order, then expired timers in
    /// registration order. A timer that fell several periods behind fires once.
    pub fn poll(&mut self, now_ms: u64) -> Vec<Task> {
        let mut due = Vec::new();
        if !self.running {
            return due;
        }

        let queued = self.deferred.len();
        for _ in 0..queued {
            match self.deferred.try_receive() {
                Ok(task) => {
                    if !due.contains(&task) {
                        due.push(task);
                    }
                }
                Err(_) => break,
            }
        }

        for timer in self.timers.iter_mut() {
            if timer.period_ms == 0 {
                continue;
            }
            match timer.next_due_ms {
                None => timer.next_due_ms = Some(now_ms.saturating_add(timer.period_ms)),
                Some(next_due_ms) if now_ms >= next_due_ms => {
                    due.push(timer.task);
                    let next = next_due_ms.saturating_add(timer.period_ms);
                    timer.next_due_ms = Some(if next <= now_ms {
                        now_ms.saturating_add(timer.period_ms)
                    } else {
                        next
                    });
                }
                Some(_) => {}
            }
        }

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_anchor_on_first_poll() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::SampleResources, 100);
        scheduler.start();

        assert!(scheduler.poll(1_000).is_empty());
        assert!(scheduler.poll(1_099).is_empty());
        assert_eq!(scheduler.poll(1_100), vec![Task::SampleResources]);
        assert!(scheduler.poll(1_150).is_empty());
        assert_eq!(scheduler.poll(1_200), vec![Task::SampleResources]);
    }

    #[test]
    fn late_timer_fires_once_and_realigns() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::TuneResources, 100);
        scheduler.start();
        scheduler.poll(0);
        assert_eq!(scheduler.poll(1_000), vec![Task::TuneResources]);
        assert!(scheduler.poll(1_050).is_empty());
        assert_eq!(scheduler.poll(1_100), vec![Task::TuneResources]);
    }

    #[test]
    fn deferred_tasks_run_on_next_poll_before_timers() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::SampleResources, 10);
        scheduler.start();
        scheduler.poll(0);

        assert!(scheduler.defer(Task::DrainBatch));
        assert!(scheduler.defer(Task::DrainBatch));
        assert_eq!(scheduler.pending_deferred(), 2);
        assert_eq!(
            scheduler.poll(10),
            vec![Task::DrainBatch, Task::SampleResources]
        );
        assert_eq!(scheduler.pending_deferred(), 0);
    }

    #[test]
    fn full_deferred_queue_rejects() {
        let mut scheduler = Scheduler::new();
        scheduler.start();
        for _ in 0..DEFERRED_CAPACITY {
            assert!(scheduler.defer(Task::DrainBatch));
        }
        assert!(!scheduler.defer(Task::DrainBatch));
    }

    #[test]
    fn stopped_scheduler_does_nothing() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::SampleResources, 10);
        scheduler.start();
        scheduler.poll(0);
        scheduler.defer(Task::DrainBatch);
        scheduler.stop();

        assert!(!scheduler.is_running());
        assert!(!scheduler.defer(Task::DrainBatch));
        assert!(scheduler.poll(100).is_empty());

        scheduler.start();
        assert!(scheduler.poll(100).is_empty());
        assert_eq!(scheduler.poll(110), vec![Task::SampleResources]);
    }

    #[test]
    fn changing_period_reanchors() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::SampleResources, 10);
        scheduler.start();
        scheduler.poll(0);
        scheduler.every(Task::SampleResources, 50);
        assert_eq!(scheduler.period_ms(Task::SampleResources), Some(50));
        assert!(scheduler.poll(10).is_empty());
        assert!(scheduler.poll(59).is_empty());
        assert_eq!(scheduler.poll(60), vec![Task::SampleResources]);
    }
}
