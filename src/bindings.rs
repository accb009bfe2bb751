use autoplay_model::{AutoplaySettings, CarouselSettings};
use tracing::debug;

use crate::events::{AutoplayCommand, HostEvent, PauseReason};

/// Maps host input onto autoplay commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayBindings {
    pause_on_hover: bool,
    pause_on_focus: bool,
}

impl AutoplayBindings {
    pub fn new(pause_on_hover: bool, pause_on_focus: bool) -> Self {
        Self {
            pause_on_hover,
            pause_on_focus,
        }
    }

    pub fn from_settings(settings: &AutoplaySettings) -> Self {
        Self::new(settings.pause_on_hover, settings.pause_on_focus)
    }

    /// Autoplay is only mounted when more slides exist than fit on one page.
    pub fn should_mount(carousel: &CarouselSettings) -> bool {
        carousel.needs_autoplay()
    }

    pub fn map(&self, event: HostEvent) -> Vec<AutoplayCommand> {
        use AutoplayCommand::{Pause, Play, Restart};

        let commands = match event {
            HostEvent::PointerEnter if self.pause_on_hover => {
                vec![Pause(Some(PauseReason::Hover))]
            }
            HostEvent::PointerLeave if self.pause_on_hover => {
                vec![Play(Some(PauseReason::Hover))]
            }
            HostEvent::FocusIn if self.pause_on_focus => vec![Pause(Some(PauseReason::Focus))],
            HostEvent::FocusOut if self.pause_on_focus => vec![Play(Some(PauseReason::Focus))],
            // Clicking the play button moves focus into the carousel, so the
            // focus reason has to go first or playback would stay suspended.
            HostEvent::PlayButton => vec![
                Play(Some(PauseReason::Focus)),
                Play(Some(PauseReason::Manual)),
            ],
            HostEvent::PauseButton => vec![Pause(Some(PauseReason::Manual))],
            HostEvent::SlideMoved => vec![Restart],
            HostEvent::PointerEnter
            | HostEvent::PointerLeave
            | HostEvent::FocusIn
            | HostEvent::FocusOut => Vec::new(),
        };
        debug!(?event, ?commands, "host event mapped");
        commands
    }
}

impl Default for AutoplayBindings {
    fn default() -> Self {
        Self::from_settings(&AutoplaySettings::default())
    }
}
