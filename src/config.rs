use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

pub use config_model::{CarouselConfig, ConfigError, ConfigPatch};

use crate::events::Slide;

/// A show file: carousel settings plus the ordered slide list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Engine behaviour (autoplay cadence, looping, preload radius, ...).
    pub carousel: CarouselConfig,
    /// Slides in display order. An empty list starts the engine inert.
    pub slides: Vec<Slide>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.carousel
            .validate()
            .context("invalid carousel configuration")?;
        for (index, slide) in self.slides.iter().enumerate() {
            ensure!(
                !slide.label.trim().is_empty(),
                "slides[{index}].label must not be empty"
            );
        }
        Ok(self)
    }
}
