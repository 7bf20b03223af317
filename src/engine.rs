//! Slideshow navigation engine.
//!
//! [`Engine`] is the public face: it owns a [`Carousel`] state machine, fans
//! snapshots out to listeners and refuses everything once disposed. Hosts feed
//! it stimuli together with the current time; nothing in here sleeps or spawns.

mod announce;
mod autoplay;
mod carousel;
mod gesture;
mod index;
mod preload;
mod state;

use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

pub use autoplay::AutoplayScheduler;
pub use carousel::{Carousel, Outcome, Reduction};
pub use gesture::{GestureInterpreter, PointerState, SWIPE_THRESHOLD};
pub use index::SlideIndexController;
pub use preload::{LoadedSet, window as preload_window};
pub use state::{CarouselState, Phase};

use crate::config::{CarouselConfig, ConfigPatch};
use crate::error::EngineError;
use crate::events::{Key, NavigationResult, Slide, Snapshot, Stimulus};

type Listener = Box<dyn FnMut(&Snapshot) + Send>;

/// Handle returned by [`Engine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Engine {
    carousel: Option<Carousel>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("carousel", &self.carousel)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Engine {
    /// Build an engine positioned on the first slide. Autoplay, when enabled
    /// and there is more than one slide, first fires `interval-ms` after `now`.
    pub fn new(
        slides: Vec<Slide>,
        config: CarouselConfig,
        now: Instant,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        info!(
            slides = slides.len(),
            autoplay = config.autoplay_enabled,
            interval_ms = config.interval_ms,
            looping = config.looping,
            "carousel engine created"
        );
        Ok(Self {
            carousel: Some(Carousel::new(slides, config, now)),
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.carousel.is_none()
    }

    pub fn phase(&self) -> Phase {
        match self.carousel.as_ref() {
            Some(carousel) => carousel.state().phase(),
            None => Phase::Disposed,
        }
    }

    pub fn state(&self) -> Result<CarouselState, EngineError> {
        Ok(self.carousel()?.state())
    }

    pub fn config(&self) -> Result<&CarouselConfig, EngineError> {
        Ok(self.carousel()?.config())
    }

    /// When the host should next call [`Engine::tick`]. `None` means no timer
    /// is pending (autoplay off or paused, no transition running, or disposed).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.carousel.as_ref().and_then(Carousel::next_deadline)
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Snapshot) + Send + 'static,
    ) -> Result<SubscriptionId, EngineError> {
        self.carousel()?;
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        Ok(id)
    }

    /// Returns whether `id` was still subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<bool, EngineError> {
        self.carousel()?;
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        Ok(self.listeners.len() != before)
    }

    /// Feed one stimulus through the state machine. Listeners see every
    /// snapshot before this returns; the same snapshots are handed back.
    pub fn dispatch(
        &mut self,
        stimulus: Stimulus,
        now: Instant,
    ) -> Result<Reduction, EngineError> {
        let carousel = self.carousel.as_mut().ok_or(EngineError::Disposed)?;
        let reduction = carousel.reduce(stimulus, now);
        for snapshot in &reduction.snapshots {
            for (_, listener) in self.listeners.iter_mut() {
                listener(snapshot);
            }
        }
        Ok(reduction)
    }

    /// Process pending timers (lock expiry, autoplay) up to `now`.
    pub fn tick(&mut self, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::Tick, now).map(|_| ())
    }

    pub fn next(&mut self, now: Instant) -> Result<NavigationResult, EngineError> {
        self.navigate(Stimulus::Next, now)
    }

    pub fn prev(&mut self, now: Instant) -> Result<NavigationResult, EngineError> {
        self.navigate(Stimulus::Prev, now)
    }

    pub fn go_to(&mut self, index: usize, now: Instant) -> Result<NavigationResult, EngineError> {
        self.navigate(Stimulus::GoTo(index), now)
    }

    /// Arrow keys step, Home/End jump to the ends. Unmapped keys yield `None`.
    pub fn on_key(
        &mut self,
        key: Key,
        now: Instant,
    ) -> Result<Option<NavigationResult>, EngineError> {
        self.maybe_navigate(Stimulus::Key(key), now)
    }

    pub fn on_pointer_down(&mut self, pos: f32, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::PointerDown(pos), now).map(|_| ())
    }

    pub fn on_pointer_move(&mut self, pos: f32, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::PointerMove(pos), now).map(|_| ())
    }

    /// Completes the gesture; `Some` when it was a swipe and navigation was tried.
    pub fn on_pointer_up(
        &mut self,
        now: Instant,
    ) -> Result<Option<NavigationResult>, EngineError> {
        self.maybe_navigate(Stimulus::PointerUp, now)
    }

    pub fn on_hover_enter(&mut self, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::HoverEnter, now).map(|_| ())
    }

    pub fn on_hover_leave(&mut self, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::HoverLeave, now).map(|_| ())
    }

    pub fn on_focus(&mut self, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::Focus, now).map(|_| ())
    }

    pub fn on_blur(&mut self, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::Blur, now).map(|_| ())
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::Pause, now).map(|_| ())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), EngineError> {
        self.dispatch(Stimulus::Resume, now).map(|_| ())
    }

    /// Merge `patch` into the configuration. An invalid patch leaves the
    /// current configuration untouched.
    pub fn reconfigure(&mut self, patch: ConfigPatch, now: Instant) -> Result<(), EngineError> {
        match self.dispatch(Stimulus::Reconfigure(patch), now)?.outcome {
            Outcome::ConfigRejected(err) => Err(EngineError::InvalidConfig(err)),
            _ => Ok(()),
        }
    }

    pub fn replace_slides(
        &mut self,
        slides: Vec<Slide>,
        now: Instant,
    ) -> Result<(), EngineError> {
        self.dispatch(Stimulus::ReplaceSlides(slides), now).map(|_| ())
    }

    /// Cancel the timer and drop every listener. Any later call is an error.
    pub fn dispose(&mut self) -> Result<(), EngineError> {
        let mut carousel = self.carousel.take().ok_or(EngineError::Disposed)?;
        carousel.shutdown();
        let listeners = self.listeners.len();
        self.listeners.clear();
        debug!(listeners, "carousel engine disposed");
        Ok(())
    }

    fn carousel(&self) -> Result<&Carousel, EngineError> {
        self.carousel.as_ref().ok_or(EngineError::Disposed)
    }

    fn navigate(
        &mut self,
        stimulus: Stimulus,
        now: Instant,
    ) -> Result<NavigationResult, EngineError> {
        Ok(self
            .maybe_navigate(stimulus, now)?
            .unwrap_or(NavigationResult::Inert))
    }

    fn maybe_navigate(
        &mut self,
        stimulus: Stimulus,
        now: Instant,
    ) -> Result<Option<NavigationResult>, EngineError> {
        match self.dispatch(stimulus, now)?.outcome {
            Outcome::Navigation(result) => Ok(Some(result)),
            _ => Ok(None),
        }
    }
}
