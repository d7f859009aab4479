//! Platform-agnostic multi-touch gesture recognition with bounded runtime
//! resources.
//!
//! Platform adapters turn native callbacks into [`touch::TouchPoint`]s and feed
//! them to a [`touch::TouchControlManager`], then call
//! [`touch::TouchControlManager::poll`] from their frame or timer loop so
//! sampling, tuning and batch drains can run.

pub mod resources;
pub mod scheduler;
pub mod telemetry;
pub mod touch;

pub use resources::{ResourceConfig, ResourceConfigPatch, ResourceManager};
pub use scheduler::{Scheduler, Task};
pub use telemetry::{PerformanceMonitor, PerformanceSnapshot, PerformanceThresholds, ResourceProbe};
pub use touch::{
    GestureEvent, GestureKind, GestureRecognizer, SwipeDirection, TouchControlConfig,
    TouchControlConfigPatch, TouchControlManager, TouchPoint, TouchTarget,
};
