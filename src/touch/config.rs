use serde::{Deserialize, Serialize};

use crate::resources::{ResourceConfig, ResourceConfigPatch};
use crate::telemetry::{PerformanceThresholds, PerformanceThresholdsPatch};

const GESTURE_MIN_DISTANCE_PX: f64 = 10.0;
const GESTURE_MIN_DURATION_MS: u64 = 500;
const GESTURE_MAX_DURATION_MS: u64 = 300;
const GESTURE_VELOCITY_THRESHOLD_PX_PER_MS: f64 = 0.3;
const GESTURE_SCALE_THRESHOLD: f64 = 0.1;
const GESTURE_ROTATION_THRESHOLD_DEG: f64 = 15.0;
const ACCESSIBILITY_MIN_TARGET_PX: f64 = 44.0;
const ACCESSIBILITY_TARGET_SPACING_PX: f64 = 8.0;
const MONITOR_SAMPLE_PERIOD_MS: u64 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub min_distance: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub velocity_threshold: f64,
    pub scale_threshold: f64,
    pub rotation_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_distance: GESTURE_MIN_DISTANCE_PX,
            min_duration_ms: GESTURE_MIN_DURATION_MS,
            max_duration_ms: GESTURE_MAX_DURATION_MS,
            velocity_threshold: GESTURE_VELOCITY_THRESHOLD_PX_PER_MS,
            scale_threshold: GESTURE_SCALE_THRESHOLD,
            rotation_threshold: GESTURE_ROTATION_THRESHOLD_DEG,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfigPatch {
    pub min_distance: Option<f64>,
    pub min_duration_ms: Option<u64>,
    pub max_duration_ms: Option<u64>,
    pub velocity_threshold: Option<f64>,
    pub scale_threshold: Option<f64>,
    pub rotation_threshold: Option<f64>,
}

impl GestureConfig {
    pub fn apply(&mut self, patch: &GestureConfigPatch) {
        if let Some(value) = patch.min_distance {
            self.min_distance = value;
        }
        if let Some(value) = patch.min_duration_ms {
            self.min_duration_ms = value;
        }
        if let Some(value) = patch.max_duration_ms {
            self.max_duration_ms = value;
        }
        if let Some(value) = patch.velocity_threshold {
            self.velocity_threshold = value;
        }
        if let Some(value) = patch.scale_threshold {
            self.scale_threshold = value;
        }
        if let Some(value) = patch.rotation_threshold {
            self.rotation_threshold = value;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    pub min_touch_target_size: f64,
    pub spacing_between_targets: f64,
    pub screen_reader_enabled: bool,
    pub announce_gestures: bool,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            min_touch_target_size: ACCESSIBILITY_MIN_TARGET_PX,
            spacing_between_targets: ACCESSIBILITY_TARGET_SPACING_PX,
            screen_reader_enabled: false,
            announce_gestures: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfigPatch {
    pub min_touch_target_size: Option<f64>,
    pub spacing_between_targets: Option<f64>,
    pub screen_reader_enabled: Option<bool>,
    pub announce_gestures: Option<bool>,
}

impl AccessibilityConfig {
    pub fn apply(&mut self, patch: &AccessibilityConfigPatch) {
        if let Some(value) = patch.min_touch_target_size {
            self.min_touch_target_size = value;
        }
        if let Some(value) = patch.spacing_between_targets {
            self.spacing_between_targets = value;
        }
        if let Some(value) = patch.screen_reader_enabled {
            self.screen_reader_enabled = value;
        }
        if let Some(value) = patch.announce_gestures {
            self.announce_gestures = value;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub haptic_enabled: bool,
    pub audio_enabled: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            haptic_enabled: true,
            audio_enabled: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfigPatch {
    pub haptic_enabled: Option<bool>,
    pub audio_enabled: Option<bool>,
}

impl FeedbackConfig {
    pub fn apply(&mut self, patch: &FeedbackConfigPatch) {
        if let Some(value) = patch.haptic_enabled {
            self.haptic_enabled = value;
        }
        if let Some(value) = patch.audio_enabled {
            self.audio_enabled = value;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub sample_period_ms: u64,
    pub adaptive_tuning: bool,
    pub thresholds: PerformanceThresholds,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_period_ms: MONITOR_SAMPLE_PERIOD_MS,
            adaptive_tuning: true,
            thresholds: PerformanceThresholds::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfigPatch {
    pub enabled: Option<bool>,
    pub sample_period_ms: Option<u64>,
    pub adaptive_tuning: Option<bool>,
    pub thresholds: Option<PerformanceThresholdsPatch>,
}

impl MonitoringConfig {
    pub fn apply(&mut self, patch: &MonitoringConfigPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.sample_period_ms {
            self.sample_period_ms = value;
        }
        if let Some(value) = patch.adaptive_tuning {
            self.adaptive_tuning = value;
        }
        if let Some(thresholds) = &patch.thresholds {
            self.thresholds.apply(thresholds);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchControlConfig {
    pub enabled: bool,
    pub gesture: GestureConfig,
    pub accessibility: AccessibilityConfig,
    pub feedback: FeedbackConfig,
    pub monitoring: MonitoringConfig,
    pub resources: ResourceConfig,
}

impl Default for TouchControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gesture: GestureConfig::default(),
            accessibility: AccessibilityConfig::default(),
            feedback: FeedbackConfig::default(),
            monitoring: MonitoringConfig::default(),
            resources: ResourceConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchControlConfigPatch {
    pub enabled: Option<bool>,
    pub gesture: Option<GestureConfigPatch>,
    pub accessibility: Option<AccessibilityConfigPatch>,
    pub feedback: Option<FeedbackConfigPatch>,
    pub monitoring: Option<MonitoringConfigPatch>,
    pub resources: Option<ResourceConfigPatch>,
}

impl TouchControlConfig {
    pub fn apply(&mut self, patch: &TouchControlConfigPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(gesture) = &patch.gesture {
            self.gesture.apply(gesture);
        }
        if let Some(accessibility) = &patch.accessibility {
            self.accessibility.apply(accessibility);
        }
        if let Some(feedback) = &patch.feedback {
            self.feedback.apply(feedback);
        }
        if let Some(monitoring) = &patch.monitoring {
            self.monitoring.apply(monitoring);
        }
        if let Some(resources) = &patch.resources {
            self.resources.apply(resources);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_patch_keeps_unspecified_fields() {
        let mut config = GestureConfig::default();
        config.apply(&GestureConfigPatch {
            min_distance: Some(24.0),
            ..GestureConfigPatch::default()
        });
        assert_eq!(config.min_distance, 24.0);
        assert_eq!(config.velocity_threshold, GESTURE_VELOCITY_THRESHOLD_PX_PER_MS);
        assert_eq!(config.min_duration_ms, GESTURE_MIN_DURATION_MS);
    }

    #[test]
    fn nested_patch_from_toml_merges_partially() {
        let patch: TouchControlConfigPatch = toml::from_str(
            r#"
            [gesture]
            velocity_threshold = 0.5

            [accessibility]
            min_touch_target_size = 48.0

            [resources.cache]
            max_entries = 12
            "#,
        )
        .expect("patch parses");

        let mut config = TouchControlConfig::default();
        config.apply(&patch);

        assert!(config.enabled);
        assert_eq!(config.gesture.velocity_threshold, 0.5);
        assert_eq!(config.gesture.min_distance, GESTURE_MIN_DISTANCE_PX);
        assert_eq!(config.accessibility.min_touch_target_size, 48.0);
        assert_eq!(
            config.accessibility.spacing_between_targets,
            ACCESSIBILITY_TARGET_SPACING_PX
        );
        assert_eq!(config.resources.cache.max_entries, 12);
        assert_eq!(
            config.resources.pool,
            crate::resources::PoolConfig::default()
        );
    }

    #[test]
    fn full_config_deserializes_with_defaults() {
        let config: TouchControlConfig = toml::from_str("enabled = false").expect("config parses");
        assert!(!config.enabled);
        assert_eq!(config.gesture, GestureConfig::default());
        assert_eq!(config.monitoring, MonitoringConfig::default());
    }
}
