use std::time::{Duration, Instant};

use crate::events::{Direction, NavigationResult, RejectReason};

/// Current slide, boundary policy and the transition lock.
///
/// Every accepted move locks the controller for `lock` and every request
/// made while locked is refused with [`RejectReason::InTransition`]. This is
/// the one place that serialises navigation from all triggers.
#[derive(Debug, Clone)]
pub struct SlideIndexController {
    current: usize,
    count: usize,
    looping: bool,
    lock: Duration,
    locked_until: Option<Instant>,
}

impl SlideIndexController {
    pub fn new(count: usize, looping: bool, lock: Duration) -> Self {
        Self {
            current: 0,
            count,
            looping,
            lock,
            locked_until: None,
        }
    }

    /// `None` while there are no slides.
    pub fn current(&self) -> Option<usize> {
        (self.count > 0).then_some(self.current)
    }

    pub fn is_transitioning(&self) -> bool {
        self.locked_until.is_some()
    }

    pub fn lock_deadline(&self) -> Option<Instant> {
        self.locked_until
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Applies to the next accepted navigation; a running lock keeps its deadline.
    pub fn set_lock_duration(&mut self, lock: Duration) {
        self.lock = lock;
    }

    /// Swap in a new slide count, clamping the current index into range.
    pub fn reset_count(&mut self, count: usize) {
        self.count = count;
        self.current = if count == 0 {
            0
        } else {
            self.current.min(count - 1)
        };
        if count == 0 {
            self.locked_until = None;
        }
    }

    /// Drop the lock if its deadline is at or before `now`.
    pub fn release_expired(&mut self, now: Instant) -> bool {
        match self.locked_until {
            Some(deadline) if deadline <= now => {
                self.locked_until = None;
                true
            }
            _ => false,
        }
    }

    pub fn advance(&mut self, direction: Direction, now: Instant) -> NavigationResult {
        if let Err(result) = self.precheck() {
            return result;
        }
        let count = self.count as isize;
        let next = self.current as isize + direction.step();
        let target = if self.looping {
            next.rem_euclid(count)
        } else if (0..count).contains(&next) {
            next
        } else {
            return NavigationResult::Rejected(RejectReason::AtBoundary);
        };
        self.accept(target as usize, now)
    }

    /// Jump to `target`. Out-of-range targets are refused, never clamped.
    pub fn go_to(&mut self, target: usize, now: Instant) -> NavigationResult {
        if let Err(result) = self.precheck() {
            return result;
        }
        if target >= self.count {
            return NavigationResult::Rejected(RejectReason::OutOfRange);
        }
        self.accept(target, now)
    }

    fn precheck(&self) -> Result<(), NavigationResult> {
        if self.count == 0 {
            return Err(NavigationResult::Inert);
        }
        if self.is_transitioning() {
            return Err(NavigationResult::Rejected(RejectReason::InTransition));
        }
        Ok(())
    }

    fn accept(&mut self, target: usize, now: Instant) -> NavigationResult {
        self.current = target;
        if !self.lock.is_zero() {
            self.locked_until = Some(now + self.lock);
        }
        NavigationResult::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: Duration = Duration::from_millis(500);

    fn rejected(reason: RejectReason) -> NavigationResult {
        NavigationResult::Rejected(reason)
    }

    #[test]
    fn looping_wraps_both_ways() {
        let t0 = Instant::now();
        let mut ctl = SlideIndexController::new(3, true, Duration::ZERO);
        assert_eq!(ctl.advance(Direction::Backward, t0), NavigationResult::Accepted);
        assert_eq!(ctl.current(), Some(2));
        assert_eq!(ctl.advance(Direction::Forward, t0), NavigationResult::Accepted);
        assert_eq!(ctl.current(), Some(0));
    }

    #[test]
    fn clamped_edges_reject() {
        let t0 = Instant::now();
        let mut ctl = SlideIndexController::new(2, false, Duration::ZERO);
        assert_eq!(
            ctl.advance(Direction::Backward, t0),
            rejected(RejectReason::AtBoundary)
        );
        assert_eq!(ctl.advance(Direction::Forward, t0), NavigationResult::Accepted);
        assert_eq!(
            ctl.advance(Direction::Forward, t0),
            rejected(RejectReason::AtBoundary)
        );
        assert_eq!(ctl.current(), Some(1));
    }

    #[test]
    fn go_to_rejects_out_of_range() {
        let t0 = Instant::now();
        let mut ctl = SlideIndexController::new(4, true, LOCK);
        assert_eq!(ctl.go_to(4, t0), rejected(RejectReason::OutOfRange));
        assert!(!ctl.is_transitioning(), "a refused jump must not lock");
        assert_eq!(ctl.go_to(3, t0), NavigationResult::Accepted);
        assert_eq!(ctl.current(), Some(3));
    }

    #[test]
    fn lock_refuses_until_deadline() {
        let t0 = Instant::now();
        let mut ctl = SlideIndexController::new(5, true, LOCK);
        assert_eq!(ctl.advance(Direction::Forward, t0), NavigationResult::Accepted);
        assert_eq!(ctl.lock_deadline(), Some(t0 + LOCK));

        let almost = t0 + Duration::from_millis(499);
        assert!(!ctl.release_expired(almost));
        assert_eq!(ctl.go_to(4, almost), rejected(RejectReason::InTransition));
        assert_eq!(ctl.go_to(9, almost), rejected(RejectReason::InTransition));
        assert_eq!(ctl.current(), Some(1));

        assert!(ctl.release_expired(t0 + LOCK));
        assert_eq!(ctl.go_to(4, t0 + LOCK), NavigationResult::Accepted);
    }

    #[test]
    fn empty_show_is_inert() {
        let t0 = Instant::now();
        let mut ctl = SlideIndexController::new(0, true, LOCK);
        assert_eq!(ctl.current(), None);
        assert_eq!(ctl.advance(Direction::Forward, t0), NavigationResult::Inert);
        assert_eq!(ctl.go_to(0, t0), NavigationResult::Inert);
        assert!(!ctl.is_transitioning());
    }

    #[test]
    fn reset_count_clamps_current() {
        let t0 = Instant::now();
        let mut ctl = SlideIndexController::new(6, false, Duration::ZERO);
        ctl.go_to(5, t0);
        ctl.reset_count(3);
        assert_eq!(ctl.current(), Some(2));
        ctl.reset_count(0);
        assert_eq!(ctl.current(), None);
    }
}
