use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

pub use autoplay::AutoplaySettings;
pub use carousel::CarouselSettings;

mod autoplay {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct AutoplaySettings {
        /// Running time between two advances.
        #[serde(with = "humantime_serde")]
        pub interval: Duration,
        /// Suspend while the pointer is over the carousel.
        pub pause_on_hover: bool,
        /// Suspend while keyboard focus is inside the carousel.
        pub pause_on_focus: bool,
        /// Emit progress fractions between advances (drives a progress bar).
        pub report_progress: bool,
        /// Sampling period for progress fractions.
        #[serde(with = "humantime_serde")]
        pub progress_cadence: Duration,
        /// Start playing as soon as the carousel is mounted.
        pub autostart: bool,
    }

    impl AutoplaySettings {
        pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);
        pub const DEFAULT_PROGRESS_CADENCE: Duration = Duration::from_millis(50);

        /// Wait used between wake-ups: the progress cadence when progress is
        /// reported, otherwise the whole interval.
        pub fn effective_cadence(&self) -> Duration {
            if self.report_progress {
                self.progress_cadence.min(self.interval)
            } else {
                self.interval
            }
        }

        pub fn validate(&self) -> Result<()> {
            ensure!(
                !self.interval.is_zero(),
                "autoplay.interval must be positive"
            );
            ensure!(
                !self.progress_cadence.is_zero(),
                "autoplay.progress-cadence must be positive"
            );
            ensure!(
                self.progress_cadence <= self.interval,
                "autoplay.progress-cadence ({:?}) must not exceed autoplay.interval ({:?})",
                self.progress_cadence,
                self.interval
            );
            Ok(())
        }
    }

    impl Default for AutoplaySettings {
        fn default() -> Self {
            Self {
                interval: Self::DEFAULT_INTERVAL,
                pause_on_hover: true,
                pause_on_focus: true,
                report_progress: true,
                progress_cadence: Self::DEFAULT_PROGRESS_CADENCE,
                autostart: true,
            }
        }
    }
}

mod carousel {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct CarouselSettings {
        pub slides: usize,
        pub per_page: usize,
    }

    impl CarouselSettings {
        /// Autoplay only makes sense when some slides are off-page.
        pub fn needs_autoplay(&self) -> bool {
            self.slides > self.per_page
        }

        pub fn validate(&self) -> Result<()> {
            ensure!(self.per_page > 0, "carousel.per-page must be at least 1");
            Ok(())
        }
    }

    impl Default for CarouselSettings {
        fn default() -> Self {
            Self {
                slides: 5,
                per_page: 1,
            }
        }
    }
}
