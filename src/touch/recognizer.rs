use statig::blocking::IntoStateMachineExt as _;

mod classify;
mod hsm;

pub use classify::classify;

use super::config::GestureConfig;
use super::types::{GestureEvent, GestureState, TouchPoint};
use hsm::RecognizerHsm;

#[derive(Clone, Copy, Debug)]
enum RecognizerEvent {
    TouchStart(TouchPoint),
    TouchMove(TouchPoint),
    TouchEnd(TouchPoint),
    Configure(GestureConfig),
    Reset,
}

/// Result of releasing a contact.
#[derive(Clone, Debug, PartialEq)]
pub enum TouchEndOutcome {
    /// Not tracking, unknown identifier, or other contacts are still down.
    Pending,
    /// Every contact was released and a gesture matched.
    Recognized(GestureEvent),
    /// Every contact was released and no rule matched.
    Unrecognized,
}

impl TouchEndOutcome {
    pub fn into_event(self) -> Option<GestureEvent> {
        match self {
            TouchEndOutcome::Recognized(event) => Some(event),
            TouchEndOutcome::Pending | TouchEndOutcome::Unrecognized => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self, TouchEndOutcome::Pending)
    }
}

#[derive(Debug, Default)]
struct DispatchContext {
    started: bool,
    updated: bool,
    completed: bool,
    recognized: Option<GestureEvent>,
}

impl DispatchContext {
    fn finish_end(self) -> TouchEndOutcome {
        match (self.completed, self.recognized) {
            (_, Some(event)) => TouchEndOutcome::Recognized(event),
            (true, None) => TouchEndOutcome::Unrecognized,
            (false, None) => TouchEndOutcome::Pending,
        }
    }
}

/// Single-interaction gesture state machine.
pub struct GestureRecognizer {
    machine: statig::blocking::StateMachine<RecognizerHsm>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            machine: RecognizerHsm::new(config).state_machine(),
        }
    }

    fn dispatch(&mut self, event: RecognizerEvent) -> DispatchContext {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        context
    }

    /// Returns `true` when the touch opened a new gesture.
    pub fn on_touch_start(&mut self, touch: TouchPoint) -> bool {
        self.dispatch(RecognizerEvent::TouchStart(touch)).started
    }

    /// Live tracking state after the update, `None` when idle.
    pub fn on_touch_move(&mut self, touch: TouchPoint) -> Option<&GestureState> {
        let context = self.dispatch(RecognizerEvent::TouchMove(touch));
        if context.updated {
            self.state()
        } else {
            None
        }
    }

    pub fn on_touch_end(&mut self, touch: TouchPoint) -> Option<GestureEvent> {
        self.end_touch(touch).into_event()
    }

    pub fn end_touch(&mut self, touch: TouchPoint) -> TouchEndOutcome {
        self.dispatch(RecognizerEvent::TouchEnd(touch)).finish_end()
    }

    pub fn reset(&mut self) {
        let _ = self.dispatch(RecognizerEvent::Reset);
    }

    /// Swaps thresholds. An in-flight gesture keeps its tracked touches.
    pub fn configure(&mut self, config: GestureConfig) {
        let _ = self.dispatch(RecognizerEvent::Configure(config));
    }

    pub fn config(&self) -> &GestureConfig {
        &self.machine.inner().config
    }

    pub fn state(&self) -> Option<&GestureState> {
        self.machine.inner().gesture.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.state().is_some()
    }
}
