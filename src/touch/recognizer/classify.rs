use super::super::geometry;
use super::super::types::{GestureKind, GestureState, TouchPoint};
use super::GestureConfig;

/// First matching rule wins; boundaries are strict on both sides.
pub fn classify(config: &GestureConfig, state: &GestureState, end: &TouchPoint) -> Option<GestureKind> {
    let start = state.start()?;
    let distance = geometry::distance(start, end);
    let duration_ms = end.t_ms.saturating_sub(start.t_ms);
    let (vx, vy) = geometry::velocity(start, end);
    let speed = geometry::magnitude(vx, vy);

    if distance < config.min_distance && duration_ms < config.max_duration_ms {
        return Some(GestureKind::Tap);
    }
    if distance < config.min_distance && duration_ms > config.min_duration_ms {
        return Some(GestureKind::LongPress);
    }
    if speed > config.velocity_threshold && distance > config.min_distance {
        let direction = geometry::direction(end.x - start.x, end.y - start.y);
        return Some(GestureKind::Swipe(direction));
    }
    if distance > config.min_distance && speed < config.velocity_threshold {
        return Some(GestureKind::Pan);
    }
    if state.max_concurrent >= 2 {
        if (state.scale - 1.0).abs() > config.scale_threshold {
            return Some(GestureKind::Pinch);
        }
        if state.rotation.abs() > config.rotation_threshold {
            return Some(GestureKind::Rotate);
        }
    }
    None
}
