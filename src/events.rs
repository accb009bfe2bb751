use std::fmt;
use std::str::FromStr;

/// Why playback is suspended. Several reasons can be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseReason {
    Hover,
    Focus,
    Manual,
    /// Host-defined reason; distinct tags are distinct reasons.
    Custom(u32),
}

impl fmt::Display for PauseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauseReason::Hover => f.write_str("hover"),
            PauseReason::Focus => f.write_str("focus"),
            PauseReason::Manual => f.write_str("manual"),
            PauseReason::Custom(tag) => write!(f, "custom-{tag}"),
        }
    }
}

/// Commands accepted by the autoplay task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayCommand {
    Play(Option<PauseReason>),
    Pause(Option<PauseReason>),
    /// Rewind the current cycle and play; sent when the slide moved for
    /// another reason than the timer.
    Restart,
    Destroy,
}

/// Notifications emitted by the autoplay task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoplayEvent {
    /// A full interval of running time elapsed; the host shows the next slide.
    Advance,
    /// Fraction of the current interval already elapsed, in `[0, 1)`.
    Progress(f32),
    Paused,
    Resumed,
}

/// Input observed by the host UI around the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    PointerEnter,
    PointerLeave,
    FocusIn,
    FocusOut,
    PlayButton,
    PauseButton,
    SlideMoved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHostEvent(pub String);

impl fmt::Display for UnknownHostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown host event '{}' (expected enter, leave, focus, blur, play, pause or move)",
            self.0
        )
    }
}

impl std::error::Error for UnknownHostEvent {}

impl FromStr for HostEvent {
    type Err = UnknownHostEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enter" => Ok(HostEvent::PointerEnter),
            "leave" => Ok(HostEvent::PointerLeave),
            "focus" => Ok(HostEvent::FocusIn),
            "blur" => Ok(HostEvent::FocusOut),
            "play" => Ok(HostEvent::PlayButton),
            "pause" => Ok(HostEvent::PauseButton),
            "move" => Ok(HostEvent::SlideMoved),
            other => Err(UnknownHostEvent(other.to_string())),
        }
    }
}
