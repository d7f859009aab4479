use statig::prelude::*;

use super::super::geometry;
use super::super::types::{GestureEvent, GestureState, TouchPoint};
use super::classify::classify;
use super::{DispatchContext, GestureConfig, RecognizerEvent};

pub(super) struct RecognizerHsm {
    pub(super) config: GestureConfig,
    pub(super) gesture: Option<GestureState>,
}

impl RecognizerHsm {
    pub(super) fn new(config: GestureConfig) -> Self {
        Self {
            config,
            gesture: None,
        }
    }

    fn track_move(&mut self, touch: TouchPoint) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };

        match gesture
            .current_touches
            .iter_mut()
            .find(|current| current.identifier == touch.identifier)
        {
            Some(current) => *current = touch,
            None => {
                let seen = gesture
                    .start_touches
                    .iter()
                    .any(|start| start.identifier == touch.identifier);
                // Both lists share MAX_TOUCHES; a contact needs room in each.
                if gesture.current_touches.is_full() || (!seen && gesture.start_touches.is_full())
                {
                    log::debug!(
                        "touch: contact_over_capacity id={} active={} seen={}",
                        touch.identifier,
                        gesture.current_touches.len(),
                        gesture.start_touches.len()
                    );
                    return true;
                }
                let _ = gesture.current_touches.push(touch);
                if !seen {
                    let _ = gesture.start_touches.push(touch);
                }
                let active = gesture.current_touches.len().min(u8::MAX as usize) as u8;
                gesture.max_concurrent = gesture.max_concurrent.max(active);
            }
        }

        gesture.update_primary(&touch);

        // Pair is taken by arrival order, not by identifier.
        if let (Some(s0), Some(s1), Some(c0), Some(c1)) = (
            gesture.start_touches.first(),
            gesture.start_touches.get(1),
            gesture.current_touches.first(),
            gesture.current_touches.get(1),
        ) {
            gesture.scale = geometry::scale((s0, s1), (c0, c1));
            gesture.rotation = geometry::rotation((s0, s1), (c0, c1));
        }

        true
    }

    /// Removes the contact; `true` once no contacts remain.
    fn release(&mut self, touch: &TouchPoint) -> Option<bool> {
        let gesture = self.gesture.as_mut()?;
        let index = gesture
            .current_touches
            .iter()
            .position(|current| current.identifier == touch.identifier)?;
        gesture.current_touches.remove(index);
        gesture.update_primary(touch);
        Some(gesture.current_touches.is_empty())
    }

    /// Classifies on where the primary contact lifted, timed by the last
    /// release so lift order does not change the duration.
    fn finish(&mut self, context: &mut DispatchContext, last: TouchPoint) {
        context.completed = true;
        let Some(mut gesture) = self.gesture.take() else {
            return;
        };
        gesture.is_active = false;
        let end = TouchPoint {
            t_ms: last.t_ms,
            ..gesture.primary
        };
        gesture.update_primary(&end);

        match classify(&self.config, &gesture, &end) {
            Some(kind) => {
                gesture.is_recognized = true;
                context.recognized = Some(GestureEvent {
                    kind,
                    state: gesture,
                    target: None,
                    result: None,
                    t_ms: last.t_ms,
                });
            }
            None => {
                log::debug!(
                    "touch: unrecognized id={} t_ms={} max_concurrent={}",
                    last.identifier,
                    last.t_ms,
                    gesture.max_concurrent
                );
            }
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl RecognizerHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &RecognizerEvent) -> Outcome<State> {
        match event {
            RecognizerEvent::TouchStart(touch) => {
                self.gesture = Some(GestureState::begin(*touch));
                context.started = true;
                Transition(State::tracking())
            }
            RecognizerEvent::TouchMove(touch) | RecognizerEvent::TouchEnd(touch) => {
                log::debug!("touch: ignored_idle id={}", touch.identifier);
                Handled
            }
            RecognizerEvent::Configure(config) => {
                self.config = *config;
                Handled
            }
            RecognizerEvent::Reset => {
                self.gesture = None;
                Handled
            }
        }
    }

    #[state]
    fn tracking(
        &mut self,
        context: &mut DispatchContext,
        event: &RecognizerEvent,
    ) -> Outcome<State> {
        match event {
            RecognizerEvent::TouchStart(touch) => {
                log::debug!("touch: start_ignored_mid_gesture id={}", touch.identifier);
                Handled
            }
            RecognizerEvent::TouchMove(touch) => {
                context.updated = self.track_move(*touch);
                Handled
            }
            RecognizerEvent::TouchEnd(touch) => match self.release(touch) {
                Some(true) => {
                    self.finish(context, *touch);
                    Transition(State::idle())
                }
                Some(false) => Handled,
                None => {
                    log::debug!("touch: end_unknown id={}", touch.identifier);
                    Handled
                }
            },
            RecognizerEvent::Configure(config) => {
                self.config = *config;
                Handled
            }
            RecognizerEvent::Reset => {
                self.gesture = None;
                Transition(State::idle())
            }
        }
    }
}
