use std::collections::BTreeSet;

use serde::Serialize;

use super::gesture::PointerState;

/// Coarse lifecycle of the engine. `Paused` only suppresses autoplay, so it is
/// reported alongside `Idle`/`Transitioning` rather than instead of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Inert,
    Idle,
    Transitioning,
    Disposed,
}

/// Read-only view of the carousel handed to listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CarouselState {
    /// `None` while the show is empty.
    pub current_index: Option<usize>,
    pub slide_count: usize,
    pub is_paused: bool,
    pub is_transitioning: bool,
    pub loaded_indices: BTreeSet<usize>,
    pub pointer: PointerState,
}

impl CarouselState {
    pub fn phase(&self) -> Phase {
        if self.current_index.is_none() {
            Phase::Inert
        } else if self.is_transitioning {
            Phase::Transitioning
        } else {
            Phase::Idle
        }
    }
}

/// Why autoplay is currently held back. Hover and focus only count while
/// `pause-on-hover` is set; a manual pause always counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PauseReasons {
    pub hovered: bool,
    pub focused: bool,
    pub manual: bool,
}

impl PauseReasons {
    pub fn is_paused(&self, pause_on_hover: bool) -> bool {
        self.manual || (pause_on_hover && (self.hovered || self.focused))
    }
}
