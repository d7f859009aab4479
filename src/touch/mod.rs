pub mod config;
pub mod geometry;
mod listeners;
mod manager;
mod recognizer;
mod targets;
mod types;

pub use config::{
    AccessibilityConfig, AccessibilityConfigPatch, FeedbackConfig, FeedbackConfigPatch,
    GestureConfig, GestureConfigPatch, MonitoringConfig, MonitoringConfigPatch,
    TouchControlConfig, TouchControlConfigPatch,
};
pub use geometry::Rect;
pub use listeners::{
    DispatchReport, FeedbackListener, FeedbackSignal, GestureListener, ListenerRegistry,
};
pub use manager::{BatchProcessor, TouchControlManager};
pub use recognizer::{classify, GestureRecognizer, TouchEndOutcome};
pub use targets::{AccessibilityStatus, TargetIssue, TargetRegistry};
pub use types::{
    GestureEvent, GestureKind, GestureState, RecognitionResult, SwipeDirection, TouchList,
    TouchPoint, TouchTarget, MAX_TOUCHES,
};
