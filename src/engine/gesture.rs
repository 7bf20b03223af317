use serde::Serialize;

use crate::events::Intent;

/// Displacement a swipe must exceed before it counts.
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// Start and latest pointer positions of the gesture in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PointerState {
    pub start_pos: Option<f32>,
    pub last_pos: Option<f32>,
}

/// Turns a down/move/up sequence along one axis into an [`Intent`].
#[derive(Debug, Clone, Default)]
pub struct GestureInterpreter {
    pointer: PointerState,
}

impl GestureInterpreter {
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn on_start(&mut self, pos: f32) {
        self.pointer = PointerState {
            start_pos: Some(pos),
            last_pos: Some(pos),
        };
    }

    /// Ignored unless a gesture is in progress; hosts deliver moves out of order.
    pub fn on_move(&mut self, pos: f32) {
        if self.pointer.start_pos.is_some() {
            self.pointer.last_pos = Some(pos);
        }
    }

    /// Finish the gesture. The pointer state is cleared whatever the result.
    pub fn on_end(&mut self) -> Option<Intent> {
        let PointerState {
            start_pos,
            last_pos,
        } = std::mem::take(&mut self.pointer);
        let start = start_pos?;
        let delta = start - last_pos.unwrap_or(start);
        if !delta.is_finite() {
            return None;
        }
        if delta > SWIPE_THRESHOLD {
            Some(Intent::Advance)
        } else if delta < -SWIPE_THRESHOLD {
            Some(Intent::Retreat)
        } else {
            None
        }
    }
}
