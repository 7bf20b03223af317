use serde::{Deserialize, Serialize};

use crate::config::ConfigPatch;
use crate::engine::CarouselState;

/// One item of the show. Position in the list is its index; `media_ref` is
/// handed to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Slide {
    pub label: String,
    #[serde(default)]
    pub media_ref: String,
}

impl Slide {
    pub fn new(label: impl Into<String>, media_ref: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            media_ref: media_ref.into(),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "result", content = "reason")]
pub enum NavigationResult {
    Accepted,
    Rejected(RejectReason),
    /// The engine holds no slides; nothing happened and there is nothing to reject.
    Inert,
}

impl NavigationResult {
    pub fn is_accepted(self) -> bool {
        self == NavigationResult::Accepted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    InTransition,
    AtBoundary,
    OutOfRange,
}

/// Step direction for relative navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Discrete decision derived from a completed swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Advance,
    Retreat,
}

impl From<Intent> for Direction {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Advance => Direction::Forward,
            Intent::Retreat => Direction::Backward,
        }
    }
}

/// Keys the host forwards; anything unmapped arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other,
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            "home" => Key::Home,
            "end" => Key::End,
            _ => Key::Other,
        }
    }
}

/// Everything the host can feed into the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    /// Clock advanced; only timers run.
    Tick,
    Next,
    Prev,
    GoTo(usize),
    Key(Key),
    PointerDown(f32),
    PointerMove(f32),
    PointerUp,
    HoverEnter,
    HoverLeave,
    Focus,
    Blur,
    Pause,
    Resume,
    Reconfigure(ConfigPatch),
    /// Swap the slide list; an empty list makes the engine inert.
    ReplaceSlides(Vec<Slide>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarouselEvent {
    SlideChanged,
    PausedChanged,
}

/// What listeners receive after every accepted mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: CarouselState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<CarouselEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
}
