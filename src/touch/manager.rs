use std::collections::BTreeMap;
use std::time::Instant;

use super::config::{TouchControlConfig, TouchControlConfigPatch};
use super::listeners::{
    FeedbackListener, FeedbackSignal, GestureListener, ListenerRegistry,
};
use super::recognizer::{GestureRecognizer, TouchEndOutcome};
use super::targets::{AccessibilityStatus, TargetIssue, TargetRegistry};
use super::types::{GestureEvent, GestureKind, GestureState, SwipeDirection, TouchPoint, TouchTarget};
use crate::resources::{Adjustment, ResourceManager, ResourceStats};
use crate::scheduler::{Scheduler, Task};
use crate::telemetry::{estimate_sample, PerformanceMonitor, PerformanceSnapshot, ResourceProbe};

const OP_GESTURE: &str = "gesture";
const TUNE_EVERY_SAMPLES: u64 = 5;

pub type BatchProcessor = Box<dyn FnMut(&[GestureEvent]) -> anyhow::Result<()>>;

/// Front door for platform adapters: feeds touches through the recognizer and
/// fans completed gestures out to listeners, telemetry and resources.
pub struct TouchControlManager {
    config: TouchControlConfig,
    recognizer: GestureRecognizer,
    active_touches: BTreeMap<u32, TouchPoint>,
    targets: TargetRegistry,
    listeners: ListenerRegistry,
    monitor: PerformanceMonitor,
    resources: ResourceManager,
    scheduler: Scheduler,
    probe: Option<Box<dyn ResourceProbe>>,
    batch_processor: Option<BatchProcessor>,
    events_since_sample: u32,
    last_sample_ms: Option<u64>,
    last_adjustments: Vec<Adjustment>,
}

impl Default for TouchControlManager {
    fn default() -> Self {
        Self::new(TouchControlConfig::default())
    }
}

impl TouchControlManager {
    pub fn new(config: TouchControlConfig) -> Self {
        let mut scheduler = Scheduler::new();
        Self::schedule_monitoring(&mut scheduler, &config);
        scheduler.start();
        log::info!(
            "touch: manager_start enabled={} sample_period_ms={}",
            config.enabled,
            config.monitoring.sample_period_ms
        );
        Self {
            recognizer: GestureRecognizer::new(config.gesture),
            active_touches: BTreeMap::new(),
            targets: TargetRegistry::new(config.accessibility),
            listeners: ListenerRegistry::default(),
            monitor: PerformanceMonitor::new(config.monitoring.thresholds),
            resources: ResourceManager::new(config.resources),
            scheduler,
            probe: None,
            batch_processor: None,
            events_since_sample: 0,
            last_sample_ms: None,
            last_adjustments: Vec::new(),
            config,
        }
    }

    fn schedule_monitoring(scheduler: &mut Scheduler, config: &TouchControlConfig) {
        let period_ms = if config.monitoring.enabled {
            config.monitoring.sample_period_ms
        } else {
            0
        };
        scheduler.every(Task::SampleResources, period_ms);
        let tune_period_ms = if config.monitoring.adaptive_tuning {
            period_ms.saturating_mul(TUNE_EVERY_SAMPLES)
        } else {
            0
        };
        scheduler.every(Task::TuneResources, tune_period_ms);
    }

    pub fn config(&self) -> &TouchControlConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    // Targets

    pub fn register_touch_target(&mut self, target: TouchTarget) -> Vec<TargetIssue> {
        self.targets.register(target)
    }

    pub fn unregister_touch_target(&mut self, id: &str) -> Option<TouchTarget> {
        self.targets.unregister(id)
    }

    pub fn touch_target(&self, id: &str) -> Option<&TouchTarget> {
        self.targets.get(id)
    }

    pub fn target_at(&self, x: f64, y: f64) -> Option<&TouchTarget> {
        self.targets.target_at(x, y)
    }

    pub fn touch_targets(&self) -> impl Iterator<Item = &TouchTarget> {
        self.targets.iter()
    }

    // Touch input

    /// Returns `true` when the touch opened a new gesture.
    pub fn handle_touch_start(&mut self, touch: TouchPoint) -> bool {
        if !self.config.enabled {
            log::debug!("touch: ignored_disabled id={}", touch.identifier);
            return false;
        }
        self.active_touches.insert(touch.identifier, touch);
        self.events_since_sample = self.events_since_sample.saturating_add(1);
        let started = self.recognizer.on_touch_start(touch);
        if started {
            self.monitor.start_operation(OP_GESTURE, touch.t_ms);
            log::debug!(
                "touch: event kind=start id={} x={:.0} y={:.0} t_ms={}",
                touch.identifier,
                touch.x,
                touch.y,
                touch.t_ms
            );
        }
        started
    }

    pub fn handle_touch_move(&mut self, touch: TouchPoint) -> Option<&GestureState> {
        if !self.config.enabled {
            return None;
        }
        let Some(slot) = self.active_touches.get_mut(&touch.identifier) else {
            log::debug!("touch: move_unknown id={}", touch.identifier);
            return None;
        };
        *slot = touch;
        self.events_since_sample = self.events_since_sample.saturating_add(1);
        self.recognizer.on_touch_move(touch)
    }

    /// Completed gesture, if this release finished one and a rule matched.
    pub fn handle_touch_end(&mut self, touch: TouchPoint) -> Option<GestureEvent> {
        if !self.config.enabled {
            return None;
        }
        self.active_touches.remove(&touch.identifier);
        self.events_since_sample = self.events_since_sample.saturating_add(1);

        let started = Instant::now();
        let outcome = self.recognizer.end_touch(touch);
        let recognition_ms = started.elapsed().as_secs_f64() * 1_000.0;

        match outcome {
            TouchEndOutcome::Pending => None,
            TouchEndOutcome::Unrecognized => {
                self.monitor.end_operation(OP_GESTURE, touch.t_ms);
                self.monitor.record_unrecognized(recognition_ms);
                None
            }
            TouchEndOutcome::Recognized(event) => {
                Some(self.complete_gesture(event, recognition_ms))
            }
        }
    }

    fn complete_gesture(&mut self, mut event: GestureEvent, recognition_ms: f64) -> GestureEvent {
        event.target = event
            .state
            .start()
            .and_then(|start| self.targets.target_at(start.x, start.y))
            .cloned();

        let duration_ms = self.monitor.end_operation(OP_GESTURE, event.t_ms);
        log::info!(
            "touch: event kind={} target={} duration_ms={} t_ms={}",
            event.kind.as_str(),
            event.target.as_ref().map_or("-", |target| target.id.as_str()),
            duration_ms.unwrap_or(0),
            event.t_ms
        );

        let resolved = self.resources.resolve_result(&event);
        if resolved.hit {
            log::debug!(
                "touch: cache_hit kind={} hash={:#010x}",
                event.kind.as_str(),
                resolved.key.hash
            );
        }
        event.result = Some(resolved.result);

        let report = self.listeners.dispatch_gesture(&event);
        self.monitor
            .record_gesture(event.kind, recognition_ms, report.is_clean());

        if self.resources.enqueue(event.clone()) {
            self.scheduler.defer(Task::DrainBatch);
        }

        self.emit_feedback(&event);
        event
    }

    fn emit_feedback(&self, event: &GestureEvent) {
        let feedback = self.config.feedback;
        let accessibility = self.config.accessibility;
        if feedback.haptic_enabled {
            self.listeners
                .dispatch_feedback(&FeedbackSignal::Haptic(event.kind));
        }
        if feedback.audio_enabled {
            self.listeners
                .dispatch_feedback(&FeedbackSignal::Audio(event.kind));
        }
        if accessibility.screen_reader_enabled && accessibility.announce_gestures {
            self.listeners
                .dispatch_feedback(&FeedbackSignal::Announcement(announcement(event)));
        }
    }

    /// Platform cancel: drops every contact and the in-flight gesture.
    pub fn handle_touch_cancel(&mut self) {
        if self.recognizer.is_tracking() {
            log::debug!(
                "touch: event kind=cancel active={}",
                self.active_touches.len()
            );
        }
        self.active_touches.clear();
        self.recognizer.reset();
    }

    pub fn active_touch_count(&self) -> usize {
        self.active_touches.len()
    }

    pub fn active_touch(&self, identifier: u32) -> Option<&TouchPoint> {
        self.active_touches.get(&identifier)
    }

    pub fn gesture_state(&self) -> Option<&GestureState> {
        self.recognizer.state()
    }

    // Listeners

    pub fn on_gesture(&mut self, kind: GestureKind, listener: GestureListener) {
        self.listeners.on_gesture(kind, listener);
    }

    pub fn off_gesture(&mut self, kind: GestureKind, listener: &GestureListener) -> bool {
        self.listeners.off_gesture(kind, listener)
    }

    pub fn on_feedback(&mut self, listener: FeedbackListener) {
        self.listeners.on_feedback(listener);
    }

    pub fn off_feedback(&mut self, listener: &FeedbackListener) -> bool {
        self.listeners.off_feedback(listener)
    }

    pub fn set_batch_processor(&mut self, processor: Option<BatchProcessor>) {
        self.batch_processor = processor;
    }

    pub fn set_resource_probe(&mut self, probe: Option<Box<dyn ResourceProbe>>) {
        self.probe = probe;
    }

    // Configuration

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled == enabled {
            return;
        }
        self.config.enabled = enabled;
        if !enabled {
            self.active_touches.clear();
            self.recognizer.reset();
        }
        log::info!("touch: enabled={}", enabled);
    }

    /// Merges the patch; an in-flight gesture keeps its contacts.
    pub fn update_config(&mut self, patch: &TouchControlConfigPatch) {
        let was_enabled = self.config.enabled;
        let mut config = self.config.clone();
        config.apply(patch);
        config.enabled = was_enabled;

        self.recognizer.configure(config.gesture);
        self.targets.set_config(config.accessibility);
        self.monitor.set_thresholds(config.monitoring.thresholds);
        if patch.resources.is_some() {
            self.resources.update_config(config.resources);
        }
        Self::schedule_monitoring(&mut self.scheduler, &config);
        self.config = config;

        if let Some(enabled) = patch.enabled {
            self.set_enabled(enabled);
        }
        log::debug!("touch: config_updated");
    }

    // Scheduling

    /// Runs scheduled work that is due at `now_ms`. Returns what ran.
    pub fn poll(&mut self, now_ms: u64) -> Vec<Task> {
        let due = self.scheduler.poll(now_ms);
        for task in &due {
            match task {
                Task::SampleResources => self.sample_resources(now_ms),
                Task::TuneResources => self.tune_resources(),
                Task::DrainBatch => self.drain_batch(),
            }
        }
        due
    }

    fn sample_resources(&mut self, now_ms: u64) {
        if !self.config.monitoring.enabled {
            return;
        }
        let sample = match self.probe.as_mut() {
            Some(probe) => probe.sample(now_ms),
            None => {
                let elapsed_ms = self
                    .last_sample_ms
                    .map_or(self.config.monitoring.sample_period_ms, |last| {
                        now_ms.saturating_sub(last)
                    });
                estimate_sample(
                    self.resources.footprint_bytes(),
                    self.events_since_sample,
                    elapsed_ms,
                )
            }
        };
        self.monitor.record_sample(sample, now_ms);
        self.events_since_sample = 0;
        self.last_sample_ms = Some(now_ms);
    }

    fn tune_resources(&mut self) {
        if !self.config.monitoring.enabled || !self.config.monitoring.adaptive_tuning {
            return;
        }
        let snapshot = self.monitor.snapshot();
        let thresholds = *self.monitor.thresholds();
        self.last_adjustments = self.resources.apply_snapshot(&snapshot, &thresholds);
        self.config.resources = *self.resources.config();
        if !self.last_adjustments.is_empty() {
            log::info!(
                "touch: tuned adjustments={} acceptable={}",
                self.last_adjustments.len(),
                self.monitor.is_acceptable(&snapshot)
            );
        }
    }

    fn drain_batch(&mut self) {
        let Some(batch) = self.resources.take_batch() else {
            return;
        };
        let result = match self.batch_processor.as_mut() {
            Some(processor) => processor(batch.as_slice()),
            None => Ok(()),
        };
        log::debug!(
            "touch: batch_drained items={} ok={}",
            batch.len(),
            result.is_ok()
        );
        if self.resources.complete_batch(batch, result) {
            self.scheduler.defer(Task::DrainBatch);
        }
    }

    pub fn last_adjustments(&self) -> &[Adjustment] {
        &self.last_adjustments
    }

    // Reporting

    pub fn performance_snapshot(&self) -> PerformanceSnapshot {
        self.monitor.snapshot()
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.resources.stats()
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn accessibility_status(&self) -> AccessibilityStatus {
        self.targets.status()
    }

    pub fn recommendations(&self) -> Vec<String> {
        let snapshot = self.monitor.snapshot();
        let mut out = self.monitor.recommendations(&snapshot);
        out.extend(self.resources.recommendations());

        let status = self.targets.status();
        if !status.undersized_targets.is_empty() {
            out.push(format!(
                "{} touch targets are smaller than {}px: {}",
                status.undersized_targets.len(),
                self.config.accessibility.min_touch_target_size,
                status.undersized_targets.join(", ")
            ));
        }
        if !status.crowded_pairs.is_empty() {
            out.push(format!(
                "{} touch target pairs are closer than {}px",
                status.crowded_pairs.len(),
                self.config.accessibility.spacing_between_targets
            ));
        }
        if status.screen_reader_enabled && !status.unlabeled_targets.is_empty() {
            out.push(format!(
                "{} touch targets have no accessibility label",
                status.unlabeled_targets.len()
            ));
        }
        out
    }

    // Lifecycle

    /// Stops scheduled work, hands queued events to the batch processor and
    /// drops listeners and in-flight state.
    pub fn teardown(&mut self) {
        self.scheduler.stop();

        let pending = self.resources.flush();
        let batch_size = self.resources.queue().batch_size();
        if let Some(processor) = self.batch_processor.as_mut() {
            for chunk in pending.chunks(batch_size) {
                if let Err(err) = processor(chunk) {
                    log::warn!(
                        "touch: teardown_flush_failed items={} err={:#}",
                        chunk.len(),
                        err
                    );
                }
            }
        }

        self.listeners.clear();
        self.active_touches.clear();
        self.recognizer.reset();
        log::info!("touch: teardown flushed={}", pending.len());
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }
}

fn announcement(event: &GestureEvent) -> String {
    let gesture = match event.kind {
        GestureKind::Tap => "Tap",
        GestureKind::LongPress => "Long press",
        GestureKind::Swipe(SwipeDirection::Left) => "Swipe left",
        GestureKind::Swipe(SwipeDirection::Right) => "Swipe right",
        GestureKind::Swipe(SwipeDirection::Up) => "Swipe up",
        GestureKind::Swipe(SwipeDirection::Down) => "Swipe down",
        GestureKind::Pan => "Pan",
        GestureKind::Pinch => "Pinch",
        GestureKind::Rotate => "Rotate",
    };
    match &event.target {
        Some(target) => {
            let name = target.accessibility_label.as_deref().unwrap_or(&target.id);
            format!("{gesture} on {name}")
        }
        None => gesture.to_owned(),
    }
}
