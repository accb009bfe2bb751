pub mod bindings;
pub mod config;
pub mod error;
pub mod events;
pub mod pause_set;
pub mod timer;
pub mod tasks {
    pub mod autoplay;
}

pub use error::{Error, Result};
pub use events::{AutoplayCommand, AutoplayEvent, HostEvent, PauseReason};
pub use timer::{PausableTimer, TimerNotice};
