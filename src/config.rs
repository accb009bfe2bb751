use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub use autoplay_model::{AutoplaySettings, CarouselSettings};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    pub autoplay: AutoplaySettings,
    pub carousel: CarouselSettings,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&s)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        // An empty document means "all defaults".
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.autoplay
            .validate()
            .and_then(|()| self.carousel.validate())
            .map_err(|err| Error::InvalidConfig(format!("{err:#}")))?;
        Ok(self)
    }
}
