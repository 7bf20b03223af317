use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use carousel::CarouselConfig;
pub use patch::ConfigPatch;

/// Reasons a carousel configuration (or an update to one) is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("interval-ms must be greater than zero (got {0})")]
    NonPositiveInterval(i64),
    #[error("preload-radius must not be negative (got {0})")]
    NegativePreloadRadius(i64),
    #[error("transition-lock-ms must not be negative (got {0})")]
    NegativeTransitionLock(i64),
    #[error("max-loaded must be at least one when set")]
    ZeroMaxLoaded,
}

mod carousel {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct CarouselConfig {
        /// Whether the slideshow advances on its own.
        pub autoplay_enabled: bool,
        /// Autoplay cadence, in ms.
        pub interval_ms: u64,
        /// Suspend autoplay while the pointer hovers or focus is inside the carousel.
        pub pause_on_hover: bool,
        /// Wrap around at either end instead of stopping.
        #[serde(rename = "loop")]
        pub looping: bool,
        /// Neighbours on each side of the current slide that count as loaded.
        pub preload_radius: usize,
        /// Minimum spacing between accepted navigations, in ms.
        pub transition_lock_ms: u64,
        /// Optional upper bound on loaded slides. `None` keeps every slide ever
        /// loaded for the lifetime of the engine.
        pub max_loaded: Option<usize>,
    }

    impl Default for CarouselConfig {
        fn default() -> Self {
            Self {
                autoplay_enabled: true,
                interval_ms: Self::DEFAULT_INTERVAL_MS,
                pause_on_hover: true,
                looping: true,
                preload_radius: 1,
                transition_lock_ms: Self::DEFAULT_TRANSITION_LOCK_MS,
                max_loaded: None,
            }
        }
    }

    impl CarouselConfig {
        pub const DEFAULT_INTERVAL_MS: u64 = 5000;
        pub const DEFAULT_TRANSITION_LOCK_MS: u64 = 500;

        pub fn validate(&self) -> Result<(), ConfigError> {
            if self.interval_ms == 0 {
                return Err(ConfigError::NonPositiveInterval(0));
            }
            if self.max_loaded == Some(0) {
                return Err(ConfigError::ZeroMaxLoaded);
            }
            Ok(())
        }

        /// Returns a copy of `self` with `patch` applied, or the first reason the
        /// merged result would be invalid. `self` is never modified.
        pub fn merged(&self, patch: &ConfigPatch) -> Result<Self, ConfigError> {
            let mut next = self.clone();
            if let Some(enabled) = patch.autoplay_enabled {
                next.autoplay_enabled = enabled;
            }
            if let Some(ms) = patch.interval_ms {
                if ms <= 0 {
                    return Err(ConfigError::NonPositiveInterval(ms));
                }
                next.interval_ms = ms as u64;
            }
            if let Some(pause) = patch.pause_on_hover {
                next.pause_on_hover = pause;
            }
            if let Some(looping) = patch.looping {
                next.looping = looping;
            }
            if let Some(radius) = patch.preload_radius {
                next.preload_radius =
                    usize::try_from(radius).map_err(|_| ConfigError::NegativePreloadRadius(radius))?;
            }
            if let Some(ms) = patch.transition_lock_ms {
                next.transition_lock_ms =
                    u64::try_from(ms).map_err(|_| ConfigError::NegativeTransitionLock(ms))?;
            }
            if let Some(limit) = patch.max_loaded {
                next.max_loaded = limit;
            }
            next.validate()?;
            Ok(next)
        }
    }
}

mod patch {
    use super::*;

    /// Partial update to a [`CarouselConfig`]. Absent fields keep their current
    /// value. Numbers are signed because hosts may send anything; validation
    /// happens in [`CarouselConfig::merged`].
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct ConfigPatch {
        pub autoplay_enabled: Option<bool>,
        pub interval_ms: Option<i64>,
        pub pause_on_hover: Option<bool>,
        #[serde(rename = "loop")]
        pub looping: Option<bool>,
        pub preload_radius: Option<i64>,
        pub transition_lock_ms: Option<i64>,
        /// `Some(None)` clears a previously configured bound. YAML `null` reads as
        /// absent, so only programmatic callers can clear it.
        pub max_loaded: Option<Option<usize>>,
    }

    impl ConfigPatch {
        pub fn is_empty(&self) -> bool {
            *self == Self::default()
        }

        pub fn interval_ms(ms: i64) -> Self {
            Self {
                interval_ms: Some(ms),
                ..Self::default()
            }
        }

        pub fn autoplay(enabled: bool) -> Self {
            Self {
                autoplay_enabled: Some(enabled),
                ..Self::default()
            }
        }
    }
}
