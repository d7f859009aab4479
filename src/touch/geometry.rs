use super::types::{SwipeDirection, TouchPoint, TouchTarget};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl TouchTarget {
    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

pub fn distance(a: &TouchPoint, b: &TouchPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

pub fn angle_degrees(a: &TouchPoint, b: &TouchPoint) -> f64 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Pixels per millisecond. Non-advancing timestamps yield `(0, 0)`.
pub fn velocity(a: &TouchPoint, b: &TouchPoint) -> (f64, f64) {
    if b.t_ms <= a.t_ms {
        return (0.0, 0.0);
    }
    let dt = (b.t_ms - a.t_ms) as f64;
    ((b.x - a.x) / dt, (b.y - a.y) / dt)
}

pub fn magnitude(vx: f64, vy: f64) -> f64 {
    (vx * vx + vy * vy).sqrt()
}

pub fn scale(start: (&TouchPoint, &TouchPoint), current: (&TouchPoint, &TouchPoint)) -> f64 {
    let start_distance = distance(start.0, start.1);
    if start_distance == 0.0 {
        return 1.0;
    }
    distance(current.0, current.1) / start_distance
}

/// Angle change of the pair in degrees, normalized to `(-180, 180]`.
pub fn rotation(start: (&TouchPoint, &TouchPoint), current: (&TouchPoint, &TouchPoint)) -> f64 {
    let delta = angle_degrees(current.0, current.1) - angle_degrees(start.0, start.1);
    normalize_degrees(delta)
}

fn normalize_degrees(mut degrees: f64) -> f64 {
    while degrees > 180.0 {
        degrees -= 360.0;
    }
    while degrees <= -180.0 {
        degrees += 360.0;
    }
    degrees
}

/// Dominant axis of a displacement. Equal magnitudes resolve vertically.
pub fn direction(dx: f64, dy: f64) -> SwipeDirection {
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if dy > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    }
}

pub fn center_distance(a: &Rect, b: &Rect) -> f64 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    magnitude(bx - ax, by - ay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(x: f64, y: f64, t_ms: u64) -> TouchPoint {
        TouchPoint::new(0, x, y, t_ms)
    }

    #[test]
    fn distance_of_3_4_5_triangle() {
        assert_eq!(distance(&point(0.0, 0.0, 0), &point(3.0, 4.0, 0)), 5.0);
    }

    #[test]
    fn velocity_guards_non_advancing_time() {
        let a = point(0.0, 0.0, 100);
        let b = point(50.0, 10.0, 100);
        assert_eq!(velocity(&a, &b), (0.0, 0.0));
        assert_eq!(velocity(&b, &a), (0.0, 0.0));
        let c = point(100.0, 0.0, 300);
        assert_eq!(velocity(&a, &c), (0.5, 0.0));
    }

    #[test]
    fn scale_doubles_when_pair_spreads() {
        let s0 = point(0.0, 0.0, 0);
        let s1 = point(100.0, 0.0, 0);
        let c1 = point(200.0, 0.0, 10);
        assert_eq!(scale((&s0, &s1), (&s0, &c1)), 2.0);
    }

    #[test]
    fn scale_with_coincident_start_pair_is_identity() {
        let s0 = point(10.0, 10.0, 0);
        let c1 = point(90.0, 10.0, 10);
        assert_eq!(scale((&s0, &s0), (&s0, &c1)), 1.0);
    }

    #[test]
    fn rotation_quarter_turn() {
        let origin = point(0.0, 0.0, 0);
        let east = point(100.0, 0.0, 0);
        let south = point(0.0, 100.0, 10);
        assert!((rotation((&origin, &east), (&origin, &south)) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_wraps_across_half_turn() {
        let origin = point(0.0, 0.0, 0);
        let start = point(-100.0, 1.0, 0);
        let current = point(-100.0, -1.0, 10);
        let degrees = rotation((&origin, &start), (&origin, &current));
        assert!(degrees.abs() < 2.0, "unexpected {degrees}");
    }

    #[test]
    fn direction_ties_resolve_vertically() {
        assert_eq!(direction(10.0, 10.0), SwipeDirection::Down);
        assert_eq!(direction(-10.0, -10.0), SwipeDirection::Up);
        assert_eq!(direction(10.0, -10.0), SwipeDirection::Up);
        assert_eq!(direction(11.0, -10.0), SwipeDirection::Right);
        assert_eq!(direction(-11.0, 10.0), SwipeDirection::Left);
        assert_eq!(direction(0.0, 0.0), SwipeDirection::Up);
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect {
            x: 10.0,
            y: 10.0,
            width: 44.0,
            height: 44.0,
        };
        assert!(rect.contains(10.0, 10.0));
        assert!(rect.contains(54.0, 54.0));
        assert!(!rect.contains(54.1, 20.0));
        assert_eq!(rect.center(), (32.0, 32.0));
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(ax in -1e4f64..1e4, ay in -1e4f64..1e4, bx in -1e4f64..1e4, by in -1e4f64..1e4) {
            let a = point(ax, ay, 0);
            let b = point(bx, by, 0);
            prop_assert_eq!(distance(&a, &b), distance(&b, &a));
            prop_assert_eq!(distance(&a, &a), 0.0);
        }

        #[test]
        fn distance_obeys_triangle_inequality(
            ax in -1e4f64..1e4, ay in -1e4f64..1e4,
            bx in -1e4f64..1e4, by in -1e4f64..1e4,
            cx in -1e4f64..1e4, cy in -1e4f64..1e4,
        ) {
            let a = point(ax, ay, 0);
            let b = point(bx, by, 0);
            let c = point(cx, cy, 0);
            prop_assert!(distance(&a, &c) <= distance(&a, &b) + distance(&b, &c) + 1e-6);
        }
    }
}
