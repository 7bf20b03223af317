use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use super::announce;
use super::autoplay::AutoplayScheduler;
use super::gesture::GestureInterpreter;
use super::index::SlideIndexController;
use super::preload::{self, LoadedSet};
use super::state::{CarouselState, PauseReasons};
use crate::config::{CarouselConfig, ConfigError, ConfigPatch};
use crate::events::{CarouselEvent, Direction, Key, NavigationResult, Slide, Snapshot, Stimulus};

/// What a single stimulus amounted to, besides the snapshots it produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to report back to the caller (timers, hover, pointer moves, ...).
    Handled,
    Navigation(NavigationResult),
    /// The update was refused; the previous configuration is still in force.
    ConfigRejected(ConfigError),
}

/// Result of [`Carousel::reduce`]: the caller-facing outcome plus every
/// snapshot emitted along the way, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub outcome: Outcome,
    pub snapshots: Vec<Snapshot>,
}

/// The carousel state machine. Owns all mutable state; the sub-components
/// it holds only ever answer questions or move their own small piece.
///
/// Time is always passed in. Before a stimulus is applied, every deadline up
/// to `now` (lock expiry, autoplay ticks) is replayed in order, so callers can
/// drive it from a real clock or a simulated one.
#[derive(Debug, Clone)]
pub struct Carousel {
    slides: Vec<Slide>,
    config: CarouselConfig,
    index: SlideIndexController,
    autoplay: AutoplayScheduler,
    gesture: GestureInterpreter,
    loaded: LoadedSet,
    pause: PauseReasons,
    paused: bool,
}

impl Carousel {
    /// `config` is expected to be valid already.
    pub fn new(slides: Vec<Slide>, config: CarouselConfig, now: Instant) -> Self {
        let index = SlideIndexController::new(
            slides.len(),
            config.looping,
            Duration::from_millis(config.transition_lock_ms),
        );
        let autoplay = AutoplayScheduler::new(Duration::from_millis(config.interval_ms));
        let mut carousel = Self {
            slides,
            config,
            index,
            autoplay,
            gesture: GestureInterpreter::default(),
            loaded: LoadedSet::default(),
            pause: PauseReasons::default(),
            paused: false,
        };
        carousel.refresh_loaded();
        carousel.sync_autoplay(now);
        carousel
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn state(&self) -> CarouselState {
        CarouselState {
            current_index: self.index.current(),
            slide_count: self.slides.len(),
            is_paused: self.paused,
            is_transitioning: self.index.is_transitioning(),
            loaded_indices: self.loaded.indices().clone(),
            pointer: self.gesture.pointer(),
        }
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.is_running()
    }

    /// Earliest pending deadline (lock expiry or autoplay tick), if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.index.lock_deadline(), self.autoplay.next_deadline()) {
            (Some(lock), Some(tick)) => Some(lock.min(tick)),
            (lock, tick) => lock.or(tick),
        }
    }

    pub fn reduce(&mut self, stimulus: Stimulus, now: Instant) -> Reduction {
        let mut out = Vec::new();
        self.advance_clock(now, &mut out);
        let pointer_before = self.gesture.pointer();
        let replayed = out.len();

        let outcome = match stimulus {
            Stimulus::Tick => Outcome::Handled,
            Stimulus::Next => {
                Outcome::Navigation(self.navigate(Direction::Forward, now, &mut out))
            }
            Stimulus::Prev => {
                Outcome::Navigation(self.navigate(Direction::Backward, now, &mut out))
            }
            Stimulus::GoTo(target) => Outcome::Navigation(self.jump(target, now, &mut out)),
            Stimulus::Key(key) => self.key(key, now, &mut out),
            Stimulus::PointerDown(pos) => {
                self.gesture.on_start(pos);
                Outcome::Handled
            }
            Stimulus::PointerMove(pos) => {
                self.gesture.on_move(pos);
                Outcome::Handled
            }
            Stimulus::PointerUp => match self.gesture.on_end() {
                Some(intent) => {
                    trace!(?intent, "swipe recognised");
                    Outcome::Navigation(self.navigate(intent.into(), now, &mut out))
                }
                None => Outcome::Handled,
            },
            Stimulus::HoverEnter => self.set_pause(|p| p.hovered = true, &mut out),
            Stimulus::HoverLeave => self.set_pause(|p| p.hovered = false, &mut out),
            Stimulus::Focus => self.set_pause(|p| p.focused = true, &mut out),
            Stimulus::Blur => self.set_pause(|p| p.focused = false, &mut out),
            Stimulus::Pause => self.set_pause(|p| p.manual = true, &mut out),
            Stimulus::Resume => self.set_pause(|p| p.manual = false, &mut out),
            Stimulus::Reconfigure(patch) => self.reconfigure(&patch, now, &mut out),
            Stimulus::ReplaceSlides(slides) => self.replace_slides(slides, &mut out),
        };

        // Pointer tracking is state too; publish it unless a snapshot already did.
        if out.len() == replayed && self.gesture.pointer() != pointer_before {
            out.push(self.snapshot(None, None));
        }
        self.sync_autoplay(now);
        Reduction {
            outcome,
            snapshots: out,
        }
    }

    /// Stop the timer for good. Called once, on dispose.
    pub fn shutdown(&mut self) {
        if self.autoplay.is_running() {
            debug!("autoplay cancelled");
        }
        self.autoplay.stop();
        self.gesture = GestureInterpreter::default();
    }

    fn advance_clock(&mut self, now: Instant, out: &mut Vec<Snapshot>) {
        loop {
            let lock_due = self.index.lock_deadline().filter(|at| *at <= now);
            let tick_due = self.autoplay.next_deadline().filter(|at| *at <= now);
            match (lock_due, tick_due) {
                // Ties release the lock first so a tick landing on the expiry goes through.
                (Some(lock), Some(tick)) if lock <= tick => self.release_lock(lock, out),
                (Some(lock), None) => self.release_lock(lock, out),
                (_, Some(_)) => {
                    let Some(due) = self.autoplay.take_due(now) else {
                        break;
                    };
                    let result = self.navigate(Direction::Forward, due, out);
                    if !result.is_accepted() {
                        trace!(?result, "autoplay tick dropped");
                    }
                }
                (None, None) => break,
            }
        }
    }

    fn release_lock(&mut self, at: Instant, out: &mut Vec<Snapshot>) {
        if self.index.release_expired(at) {
            out.push(self.snapshot(None, None));
        }
    }

    fn navigate(
        &mut self,
        direction: Direction,
        now: Instant,
        out: &mut Vec<Snapshot>,
    ) -> NavigationResult {
        let result = self.index.advance(direction, now);
        self.after_navigation(result, out);
        result
    }

    fn jump(&mut self, target: usize, now: Instant, out: &mut Vec<Snapshot>) -> NavigationResult {
        let result = self.index.go_to(target, now);
        self.after_navigation(result, out);
        result
    }

    fn after_navigation(&mut self, result: NavigationResult, out: &mut Vec<Snapshot>) {
        match result {
            NavigationResult::Accepted => self.slide_changed(out),
            NavigationResult::Rejected(reason) => debug!(?reason, "navigation rejected"),
            NavigationResult::Inert => {}
        }
    }

    fn key(&mut self, key: Key, now: Instant, out: &mut Vec<Snapshot>) -> Outcome {
        let result = match key {
            Key::ArrowLeft => self.navigate(Direction::Backward, now, out),
            Key::ArrowRight => self.navigate(Direction::Forward, now, out),
            Key::Home => self.jump(0, now, out),
            Key::End => match self.slides.len().checked_sub(1) {
                Some(last) => self.jump(last, now, out),
                None => NavigationResult::Inert,
            },
            Key::Other => return Outcome::Handled,
        };
        Outcome::Navigation(result)
    }

    fn slide_changed(&mut self, out: &mut Vec<Snapshot>) {
        let Some(current) = self.index.current() else {
            return;
        };
        self.refresh_loaded();
        let total = self.slides.len();
        let announcement = self
            .slides
            .get(current)
            .map(|slide| announce::slide_changed(current, slide, total));
        debug!(index = current, total, "slide changed");
        out.push(self.snapshot(Some(CarouselEvent::SlideChanged), announcement));
    }

    fn set_pause(
        &mut self,
        apply: impl FnOnce(&mut PauseReasons),
        out: &mut Vec<Snapshot>,
    ) -> Outcome {
        apply(&mut self.pause);
        self.update_paused(out);
        Outcome::Handled
    }

    fn update_paused(&mut self, out: &mut Vec<Snapshot>) {
        let paused = self.pause.is_paused(self.config.pause_on_hover);
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        debug!(paused, reasons = ?self.pause, "pause state changed");
        out.push(self.snapshot(
            Some(CarouselEvent::PausedChanged),
            Some(announce::pause_changed(paused)),
        ));
    }

    fn reconfigure(
        &mut self,
        patch: &ConfigPatch,
        now: Instant,
        out: &mut Vec<Snapshot>,
    ) -> Outcome {
        if patch.is_empty() {
            trace!("empty configuration update ignored");
            return Outcome::Handled;
        }
        let next = match self.config.merged(patch) {
            Ok(next) => next,
            Err(err) => {
                warn!(error = %err, ?patch, "configuration update rejected");
                return Outcome::ConfigRejected(err);
            }
        };
        if next == self.config {
            return Outcome::Handled;
        }
        let previous = std::mem::replace(&mut self.config, next);
        info!(config = ?self.config, "carousel reconfigured");

        self.index.set_looping(self.config.looping);
        self.index
            .set_lock_duration(Duration::from_millis(self.config.transition_lock_ms));
        self.autoplay
            .reconfigure(Duration::from_millis(self.config.interval_ms), now);
        if previous.preload_radius != self.config.preload_radius
            || previous.looping != self.config.looping
            || previous.max_loaded != self.config.max_loaded
        {
            self.refresh_loaded();
        }

        let before = out.len();
        self.update_paused(out);
        if out.len() == before {
            out.push(self.snapshot(None, None));
        }
        Outcome::Handled
    }

    fn replace_slides(&mut self, slides: Vec<Slide>, out: &mut Vec<Snapshot>) -> Outcome {
        let was_inert = self.slides.is_empty();
        self.slides = slides;
        self.index.reset_count(self.slides.len());
        self.gesture = GestureInterpreter::default();
        self.loaded.clear();
        self.refresh_loaded();
        info!(count = self.slides.len(), was_inert, "slide list replaced");
        if self.slides.is_empty() {
            out.push(self.snapshot(None, None));
        } else {
            self.slide_changed(out);
        }
        Outcome::Handled
    }

    fn refresh_loaded(&mut self) {
        let Some(current) = self.index.current() else {
            return;
        };
        let window = preload::window(
            current,
            self.slides.len(),
            self.config.preload_radius,
            self.config.looping,
        );
        let evicted = self.loaded.absorb(&window, self.config.max_loaded);
        if !evicted.is_empty() {
            debug!(?evicted, "evicted slides outside preload window");
        }
    }

    fn sync_autoplay(&mut self, now: Instant) {
        let should_run = self.config.autoplay_enabled && self.slides.len() > 1 && !self.paused;
        match (should_run, self.autoplay.is_running()) {
            (true, false) => {
                debug!(interval_ms = self.config.interval_ms, "autoplay started");
                self.autoplay.start(now);
            }
            (false, true) => {
                debug!("autoplay stopped");
                self.autoplay.stop();
            }
            _ => {}
        }
    }

    fn snapshot(&self, event: Option<CarouselEvent>, announcement: Option<String>) -> Snapshot {
        Snapshot {
            state: self.state(),
            event,
            announcement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(n: usize) -> Vec<Slide> {
        (0..n)
            .map(|i| Slide::new(format!("Photo {i}"), format!("photo-{i}.jpg")))
            .collect()
    }

    fn manual() -> CarouselConfig {
        CarouselConfig {
            autoplay_enabled: false,
            ..CarouselConfig::default()
        }
    }

    #[test]
    fn initial_state_preloads_around_first_slide() {
        let t0 = Instant::now();
        let carousel = Carousel::new(slides(5), CarouselConfig::default(), t0);
        let state = carousel.state();
        assert_eq!(state.current_index, Some(0));
        assert_eq!(
            state.loaded_indices,
            std::collections::BTreeSet::from([0, 1, 4])
        );
        assert!(carousel.is_autoplaying());
    }

    #[test]
    fn accepted_navigation_announces_slide() {
        let t0 = Instant::now();
        let mut carousel = Carousel::new(slides(3), manual(), t0);
        let reduction = carousel.reduce(Stimulus::Next, t0);
        assert_eq!(
            reduction.outcome,
            Outcome::Navigation(NavigationResult::Accepted)
        );
        let [snapshot] = reduction.snapshots.as_slice() else {
            panic!("expected one snapshot, got {:?}", reduction.snapshots);
        };
        assert_eq!(snapshot.event, Some(CarouselEvent::SlideChanged));
        assert_eq!(snapshot.announcement.as_deref(), Some("Slide 2 of 3: Photo 1"));
        assert!(snapshot.state.is_transitioning);
    }

    #[test]
    fn rejected_navigation_emits_nothing() {
        let t0 = Instant::now();
        let cfg = CarouselConfig {
            looping: false,
            ..manual()
        };
        let mut carousel = Carousel::new(slides(3), cfg, t0);
        let reduction = carousel.reduce(Stimulus::Prev, t0);
        assert!(reduction.snapshots.is_empty());
    }

    #[test]
    fn lock_release_emits_plain_snapshot() {
        let t0 = Instant::now();
        let mut carousel = Carousel::new(slides(3), manual(), t0);
        carousel.reduce(Stimulus::Next, t0);
        let reduction = carousel.reduce(Stimulus::Tick, t0 + Duration::from_millis(500));
        let [snapshot] = reduction.snapshots.as_slice() else {
            panic!("expected lock release snapshot");
        };
        assert_eq!(snapshot.event, None);
        assert!(!snapshot.state.is_transitioning);
    }

    #[test]
    fn keys_map_to_navigation() {
        let t0 = Instant::now();
        let cfg = CarouselConfig {
            transition_lock_ms: 0,
            ..manual()
        };
        let mut carousel = Carousel::new(slides(4), cfg, t0);
        carousel.reduce(Stimulus::Key(Key::End), t0);
        assert_eq!(carousel.state().current_index, Some(3));
        carousel.reduce(Stimulus::Key(Key::ArrowLeft), t0);
        assert_eq!(carousel.state().current_index, Some(2));
        carousel.reduce(Stimulus::Key(Key::Home), t0);
        assert_eq!(carousel.state().current_index, Some(0));
        carousel.reduce(Stimulus::Key(Key::ArrowRight), t0);
        assert_eq!(carousel.state().current_index, Some(1));
        let other = carousel.reduce(Stimulus::Key(Key::Other), t0);
        assert_eq!(other.outcome, Outcome::Handled);
    }

    #[test]
    fn hover_without_pause_on_hover_keeps_playing() {
        let t0 = Instant::now();
        let cfg = CarouselConfig {
            pause_on_hover: false,
            ..CarouselConfig::default()
        };
        let mut carousel = Carousel::new(slides(3), cfg, t0);
        let reduction = carousel.reduce(Stimulus::HoverEnter, t0);
        assert!(reduction.snapshots.is_empty());
        assert!(carousel.is_autoplaying());
    }

    #[test]
    fn enabling_pause_on_hover_while_hovered_pauses() {
        let t0 = Instant::now();
        let cfg = CarouselConfig {
            pause_on_hover: false,
            ..CarouselConfig::default()
        };
        let mut carousel = Carousel::new(slides(3), cfg, t0);
        carousel.reduce(Stimulus::HoverEnter, t0);
        let patch = ConfigPatch {
            pause_on_hover: Some(true),
            ..ConfigPatch::default()
        };
        let reduction = carousel.reduce(Stimulus::Reconfigure(patch), t0);
        assert_eq!(reduction.snapshots.len(), 1);
        assert_eq!(
            reduction.snapshots[0].event,
            Some(CarouselEvent::PausedChanged)
        );
        assert!(!carousel.is_autoplaying());
    }

    #[test]
    fn pointer_tracking_publishes_snapshots() {
        let t0 = Instant::now();
        let mut carousel = Carousel::new(slides(3), manual(), t0);
        let down = carousel.reduce(Stimulus::PointerDown(200.0), t0);
        assert_eq!(down.snapshots.len(), 1);
        assert_eq!(down.snapshots[0].state.pointer.start_pos, Some(200.0));

        let swipe_move = carousel.reduce(Stimulus::PointerMove(100.0), t0);
        assert_eq!(swipe_move.snapshots[0].state.pointer.last_pos, Some(100.0));

        // An accepted swipe reports the reset pointer in its SlideChanged snapshot.
        let up = carousel.reduce(Stimulus::PointerUp, t0);
        let [snapshot] = up.snapshots.as_slice() else {
            panic!("expected a single snapshot, got {:?}", up.snapshots);
        };
        assert_eq!(snapshot.event, Some(CarouselEvent::SlideChanged));
        assert_eq!(snapshot.state.pointer.start_pos, None);
    }

    #[test]
    fn unchanged_pointer_emits_nothing() {
        let t0 = Instant::now();
        let mut carousel = Carousel::new(slides(3), manual(), t0);
        assert!(carousel.reduce(Stimulus::PointerMove(40.0), t0).snapshots.is_empty());
        assert!(carousel.reduce(Stimulus::PointerUp, t0).snapshots.is_empty());
        carousel.reduce(Stimulus::PointerDown(40.0), t0);
        assert!(carousel.reduce(Stimulus::PointerMove(40.0), t0).snapshots.is_empty());
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let t0 = Instant::now();
        let mut carousel = Carousel::new(slides(3), CarouselConfig::default(), t0);
        let reduction = carousel.reduce(Stimulus::Reconfigure(ConfigPatch::default()), t0);
        assert_eq!(reduction.outcome, Outcome::Handled);
        assert!(reduction.snapshots.is_empty());
    }

    #[test]
    fn single_slide_never_autoplays() {
        let t0 = Instant::now();
        let carousel = Carousel::new(slides(1), CarouselConfig::default(), t0);
        assert!(!carousel.is_autoplaying());
        assert_eq!(carousel.next_deadline(), None);
    }

    #[test]
    fn replacing_slides_toggles_inert() {
        let t0 = Instant::now();
        let mut carousel = Carousel::new(Vec::new(), CarouselConfig::default(), t0);
        assert_eq!(carousel.state().current_index, None);
        assert!(!carousel.is_autoplaying());

        let reduction = carousel.reduce(Stimulus::ReplaceSlides(slides(3)), t0);
        assert_eq!(carousel.state().current_index, Some(0));
        assert_eq!(
            reduction.snapshots[0].announcement.as_deref(),
            Some("Slide 1 of 3: Photo 0")
        );
        assert!(carousel.is_autoplaying());

        carousel.reduce(Stimulus::ReplaceSlides(Vec::new()), t0);
        assert_eq!(carousel.state().current_index, None);
        assert!(carousel.state().loaded_indices.is_empty());
        assert!(!carousel.is_autoplaying());
    }

    #[test]
    fn rejected_reconfigure_keeps_config() {
        let t0 = Instant::now();
        let mut carousel = Carousel::new(slides(3), CarouselConfig::default(), t0);
        let reduction =
            carousel.reduce(Stimulus::Reconfigure(ConfigPatch::interval_ms(0)), t0);
        assert_eq!(
            reduction.outcome,
            Outcome::ConfigRejected(ConfigError::NonPositiveInterval(0))
        );
        assert_eq!(carousel.config().interval_ms, 5000);
        assert!(reduction.snapshots.is_empty());
    }
}
