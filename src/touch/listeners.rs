use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use super::types::{GestureEvent, GestureKind};

pub type GestureListener = Rc<dyn Fn(&GestureEvent) -> anyhow::Result<()>>;
pub type FeedbackListener = Rc<dyn Fn(&FeedbackSignal) -> anyhow::Result<()>>;

/// Platform feedback requested for a recognized gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedbackSignal {
    Haptic(GestureKind),
    Audio(GestureKind),
    Announcement(String),
}

impl FeedbackSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackSignal::Haptic(_) => "haptic",
            FeedbackSignal::Audio(_) => "audio",
            FeedbackSignal::Announcement(_) => "announcement",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic"
    }
}

/// Runs one listener; errors and panics are logged and reported as `false`.
fn invoke<T: ?Sized>(
    scope: &str,
    name: &str,
    listener: &dyn Fn(&T) -> anyhow::Result<()>,
    value: &T,
) -> bool {
    match catch_unwind(AssertUnwindSafe(|| listener(value))) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            log::warn!("touch: {}_listener_failed kind={} err={:#}", scope, name, err);
            false
        }
        Err(payload) => {
            log::warn!(
                "touch: {}_listener_panicked kind={} msg={}",
                scope,
                name,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

/// Per-kind gesture listeners and feedback listeners, each kept in
/// registration order and removed by `Rc` identity.
#[derive(Default)]
pub struct ListenerRegistry {
    gestures: HashMap<GestureKind, Vec<GestureListener>>,
    feedback: Vec<FeedbackListener>,
}

impl ListenerRegistry {
    pub fn on_gesture(&mut self, kind: GestureKind, listener: GestureListener) {
        self.gestures.entry(kind).or_default().push(listener);
    }

    /// Returns `true` when the listener was registered for `kind`.
    pub fn off_gesture(&mut self, kind: GestureKind, listener: &GestureListener) -> bool {
        let Some(listeners) = self.gestures.get_mut(&kind) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|existing| !Rc::ptr_eq(existing, listener));
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.gestures.remove(&kind);
        }
        removed
    }

    pub fn on_feedback(&mut self, listener: FeedbackListener) {
        self.feedback.push(listener);
    }

    pub fn off_feedback(&mut self, listener: &FeedbackListener) -> bool {
        let before = self.feedback.len();
        self.feedback
            .retain(|existing| !Rc::ptr_eq(existing, listener));
        self.feedback.len() != before
    }

    pub fn gesture_listener_count(&self, kind: GestureKind) -> usize {
        self.gestures.get(&kind).map_or(0, Vec::len)
    }

    pub fn feedback_listener_count(&self) -> usize {
        self.feedback.len()
    }

    /// Calls every listener for the event's kind. A failing listener does not
    /// stop the ones after it.
    pub fn dispatch_gesture(&self, event: &GestureEvent) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(listeners) = self.gestures.get(&event.kind) else {
            return report;
        };
        for listener in listeners {
            if invoke("gesture", event.kind.as_str(), listener.as_ref(), event) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    pub fn dispatch_feedback(&self, signal: &FeedbackSignal) -> DispatchReport {
        let mut report = DispatchReport::default();
        for listener in &self.feedback {
            if invoke("feedback", signal.as_str(), listener.as_ref(), signal) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    pub fn clear(&mut self) {
        self.gestures.clear();
        self.feedback.clear();
    }
}
