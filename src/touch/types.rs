use heapless::Vec as FixedVec;

use super::geometry;

/// Upper bound on simultaneously tracked contacts. Extra contacts are ignored.
pub const MAX_TOUCHES: usize = 10;

pub type TouchList = FixedVec<TouchPoint, MAX_TOUCHES>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
    /// Monotonic timestamp in milliseconds.
    pub t_ms: u64,
    pub identifier: u32,
    pub pressure: Option<f32>,
}

impl TouchPoint {
    pub fn new(identifier: u32, x: f64, y: f64, t_ms: u64) -> Self {
        Self {
            x,
            y,
            t_ms,
            identifier,
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    LongPress,
    Swipe(SwipeDirection),
    Pan,
    Pinch,
    Rotate,
}

impl GestureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GestureKind::Tap => "tap",
            GestureKind::LongPress => "long_press",
            GestureKind::Swipe(SwipeDirection::Left) => "swipe_left",
            GestureKind::Swipe(SwipeDirection::Right) => "swipe_right",
            GestureKind::Swipe(SwipeDirection::Up) => "swipe_up",
            GestureKind::Swipe(SwipeDirection::Down) => "swipe_down",
            GestureKind::Pan => "pan",
            GestureKind::Pinch => "pinch",
            GestureKind::Rotate => "rotate",
        }
    }

    /// Stable small integer used when hashing cache keys.
    pub(crate) fn code(self) -> u8 {
        match self {
            GestureKind::Tap => 1,
            GestureKind::LongPress => 2,
            GestureKind::Swipe(SwipeDirection::Left) => 3,
            GestureKind::Swipe(SwipeDirection::Right) => 4,
            GestureKind::Swipe(SwipeDirection::Up) => 5,
            GestureKind::Swipe(SwipeDirection::Down) => 6,
            GestureKind::Pan => 7,
            GestureKind::Pinch => 8,
            GestureKind::Rotate => 9,
        }
    }
}

/// Tracking data for the single in-flight interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureState {
    /// First observed position of each identifier, in arrival order.
    pub start_touches: TouchList,
    /// One entry per active identifier, in arrival order.
    pub current_touches: TouchList,
    /// Last known position of the contact that opened the gesture, kept
    /// after it lifts. Deltas and velocity follow this contact only.
    pub primary: TouchPoint,
    pub delta_x: f64,
    pub delta_y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub is_active: bool,
    pub is_recognized: bool,
    pub max_concurrent: u8,
}

impl GestureState {
    pub(crate) fn begin(touch: TouchPoint) -> Self {
        let mut start_touches = TouchList::new();
        let mut current_touches = TouchList::new();
        // Capacity is never zero, the first push cannot fail.
        let _ = start_touches.push(touch);
        let _ = current_touches.push(touch);
        Self {
            start_touches,
            current_touches,
            primary: touch,
            delta_x: 0.0,
            delta_y: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            is_active: true,
            is_recognized: false,
            max_concurrent: 1,
        }
    }

    pub fn start(&self) -> Option<&TouchPoint> {
        self.start_touches.first()
    }

    pub fn touch(&self, identifier: u32) -> Option<&TouchPoint> {
        self.current_touches
            .iter()
            .find(|touch| touch.identifier == identifier)
    }

    pub fn active_count(&self) -> usize {
        self.current_touches.len()
    }

    /// Records a new position for the primary contact; other identifiers
    /// leave deltas and velocity untouched. Returns `true` when it was the
    /// primary.
    pub(crate) fn update_primary(&mut self, touch: &TouchPoint) -> bool {
        if touch.identifier != self.primary.identifier {
            return false;
        }
        self.primary = *touch;
        if let Some(start) = self.start_touches.first() {
            self.delta_x = touch.x - start.x;
            self.delta_y = touch.y - start.y;
            let (vx, vy) = geometry::velocity(start, touch);
            self.velocity_x = vx;
            self.velocity_y = vy;
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TouchTarget {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub min_size: f64,
    pub accessibility_label: Option<String>,
    pub accessibility_hint: Option<String>,
    pub accessibility_role: Option<String>,
}

impl TouchTarget {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            min_size: 0.0,
            accessibility_label: None,
            accessibility_hint: None,
            accessibility_role: None,
        }
    }

    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.accessibility_label = Some(label.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.accessibility_hint = Some(hint.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.accessibility_role = Some(role.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    /// Owned copy of the final tracking state.
    pub state: GestureState,
    pub target: Option<TouchTarget>,
    /// Typed summary. The manager fills it from the result cache, or
    /// computes and caches it on a miss, before listeners run.
    pub result: Option<RecognitionResult>,
    pub t_ms: u64,
}

/// Compact typed summary of a classification, stored in the result cache.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecognitionResult {
    Tap { x: f64, y: f64 },
    LongPress { x: f64, y: f64, duration_ms: u64 },
    Swipe { direction: SwipeDirection, velocity: f64 },
    Pan { dx: f64, dy: f64 },
    Pinch { scale: f64 },
    Rotate { degrees: f64 },
}

impl RecognitionResult {
    pub fn from_event(event: &GestureEvent) -> Self {
        let state = &event.state;
        let (x, y, started_ms) = state
            .start()
            .map(|touch| (touch.x, touch.y, touch.t_ms))
            .unwrap_or((0.0, 0.0, event.t_ms));
        match event.kind {
            GestureKind::Tap => RecognitionResult::Tap { x, y },
            GestureKind::LongPress => RecognitionResult::LongPress {
                x,
                y,
                duration_ms: event.t_ms.saturating_sub(started_ms),
            },
            GestureKind::Swipe(direction) => RecognitionResult::Swipe {
                direction,
                velocity: state.velocity_x.hypot(state.velocity_y),
            },
            GestureKind::Pan => RecognitionResult::Pan {
                dx: state.delta_x,
                dy: state.delta_y,
            },
            GestureKind::Pinch => RecognitionResult::Pinch { scale: state.scale },
            GestureKind::Rotate => RecognitionResult::Rotate {
                degrees: state.rotation,
            },
        }
    }

    pub fn kind(&self) -> GestureKind {
        match self {
            RecognitionResult::Tap { .. } => GestureKind::Tap,
            RecognitionResult::LongPress { .. } => GestureKind::LongPress,
            RecognitionResult::Swipe { direction, .. } => GestureKind::Swipe(*direction),
            RecognitionResult::Pan { .. } => GestureKind::Pan,
            RecognitionResult::Pinch { .. } => GestureKind::Pinch,
            RecognitionResult::Rotate { .. } => GestureKind::Rotate,
        }
    }
}
