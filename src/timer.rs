use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::events::PauseReason;
use crate::pause_set::PauseSet;

/// Playback transitions reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerNotice {
    Paused,
    Resumed,
}

type FireFn = Box<dyn FnMut() + Send>;
type ProgressFn = Box<dyn FnMut(f32) + Send>;
type NoticeFn = Box<dyn FnMut(TimerNotice) + Send>;

// Largest f32 below 1.0; progress never reports a full cycle.
const PROGRESS_CEILING: f32 = 1.0 - f32::EPSILON;

// Upper bound on `on_fire` calls for one catch-up; the remaining whole
// intervals are dropped.
const MAX_CATCH_UP_FIRES: u32 = 16;

/// Interval timer that advances only while no pause reason is active.
///
/// Time is accumulated as running time rather than scheduled against the wall
/// clock, so a pause freezes progress inside the current cycle. The timer never
/// reads the clock: every time-dependent call takes `now`.
///
/// Playback starts stopped and runs once `play` has emptied the pause set.
/// `Resumed` is reported on every stopped → running transition and `Paused`
/// whenever the pause set goes from empty to non-empty, including on a timer
/// that was never played. Layering more reasons or releasing only some of
/// them reports nothing.
pub struct PausableTimer {
    interval: Duration,
    elapsed: Duration,
    resumed_at: Option<Instant>,
    pauses: PauseSet,
    started: bool,
    destroyed: bool,
    on_fire: FireFn,
    on_progress: Option<ProgressFn>,
    on_notice: Option<NoticeFn>,
}

impl fmt::Debug for PausableTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PausableTimer")
            .field("interval", &self.interval)
            .field("elapsed", &self.elapsed)
            .field("resumed_at", &self.resumed_at)
            .field("pauses", &self.pauses)
            .field("started", &self.started)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl PausableTimer {
    pub fn new<F>(interval: Duration, on_fire: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if interval.is_zero() {
            return Err(Error::InvalidConfig(
                "autoplay interval must be positive".to_string(),
            ));
        }
        Ok(Self {
            interval,
            elapsed: Duration::ZERO,
            resumed_at: None,
            pauses: PauseSet::new(),
            started: false,
            destroyed: false,
            on_fire: Box::new(on_fire),
            on_progress: None,
            on_notice: None,
        })
    }

    /// Report `elapsed / interval` on every [`advance`](Self::advance) while running.
    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: FnMut(f32) + Send + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    pub fn with_notices<F>(mut self, on_notice: F) -> Self
    where
        F: FnMut(TimerNotice) + Send + 'static,
    {
        self.on_notice = Some(Box::new(on_notice));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// At least one pause reason is active.
    pub fn is_paused(&self) -> bool {
        !self.pauses.is_empty()
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn pause_reasons(&self) -> &PauseSet {
        &self.pauses
    }

    /// Running time in the current cycle, including time not yet settled by
    /// [`advance`](Self::advance).
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.resumed_at {
            Some(since) => self.elapsed + now.saturating_duration_since(since),
            None => self.elapsed,
        }
    }

    pub fn progress(&self, now: Instant) -> f32 {
        self.fraction(self.elapsed(now))
    }

    /// Running time left before the next fire; `None` while stopped.
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.resumed_at
            .map(|_| self.interval.saturating_sub(self.elapsed(now)))
    }

    /// Lift `reason` and resume if no other reason remains.
    pub fn play(&mut self, reason: Option<PauseReason>, now: Instant) {
        if self.destroyed {
            return;
        }
        if self.pauses.remove(reason) {
            debug!(
                reason = ?reason,
                remaining = self.pauses.len(),
                "pause reason lifted"
            );
        }
        if !self.pauses.is_empty() || self.resumed_at.is_some() {
            return;
        }
        self.started = true;
        self.resumed_at = Some(now);
        debug!(
            elapsed_ms = self.elapsed.as_millis() as u64,
            interval_ms = self.interval.as_millis() as u64,
            "autoplay resumed"
        );
        self.notify(TimerNotice::Resumed);
    }

    /// Register `reason` and freeze the current cycle.
    pub fn pause(&mut self, reason: Option<PauseReason>, now: Instant) {
        if self.destroyed {
            return;
        }
        if self.resumed_at.is_some() {
            self.settle(now);
            self.resumed_at = None;
        }
        let was_empty = self.pauses.is_empty();
        if !self.pauses.insert(reason) {
            return;
        }
        debug!(
            reason = ?reason,
            active = self.pauses.len(),
            "pause reason added"
        );
        if was_empty {
            debug!(
                elapsed_ms = self.elapsed.as_millis() as u64,
                started = self.started,
                "autoplay paused"
            );
            self.notify(TimerNotice::Paused);
        }
    }

    /// Rewind the current cycle, then `play(None)`.
    ///
    /// Used when the displayed item moved for another reason than this timer,
    /// so the next fire is a full interval away.
    pub fn restart(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        self.elapsed = Duration::ZERO;
        if self.resumed_at.is_some() {
            self.resumed_at = Some(now);
        }
        trace!("autoplay cycle rewound");
        self.play(None, now);
    }

    /// Account running time up to `now`, firing once per whole interval, then
    /// report progress. Returns the number of fires.
    ///
    /// A gap spanning many intervals fires at most `MAX_CATCH_UP_FIRES` times;
    /// the partial interval left over is kept either way.
    pub fn advance(&mut self, now: Instant) -> u32 {
        if self.resumed_at.is_none() {
            return 0;
        }
        let fired = self.settle(now);
        let fraction = self.fraction(self.elapsed);
        if let Some(on_progress) = self.on_progress.as_mut() {
            on_progress(fraction);
        }
        fired
    }

    /// Stop for good. Later calls are ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.resumed_at = None;
        debug!("autoplay destroyed");
    }

    fn settle(&mut self, now: Instant) -> u32 {
        let Some(since) = self.resumed_at else {
            return 0;
        };
        let total = (self.elapsed + now.saturating_duration_since(since)).as_nanos();
        let interval = self.interval.as_nanos();
        let whole = total / interval;
        let rest = total % interval;

        let fired = u32::try_from(whole)
            .unwrap_or(u32::MAX)
            .min(MAX_CATCH_UP_FIRES);
        for _ in 0..fired {
            (self.on_fire)();
        }
        // rest < interval, so it fits back into a Duration
        self.elapsed = Duration::new(
            (rest / 1_000_000_000) as u64,
            (rest % 1_000_000_000) as u32,
        );
        self.resumed_at = Some(now.max(since));
        if whole > u128::from(fired) {
            debug!(
                intervals = %whole,
                fired,
                "autoplay catch-up coalesced"
            );
        } else if fired > 0 {
            trace!(fired, "autoplay fired");
        }
        fired
    }

    fn fraction(&self, elapsed: Duration) -> f32 {
        let ratio = elapsed.as_secs_f64() / self.interval.as_secs_f64();
        (ratio as f32).clamp(0.0, PROGRESS_CEILING)
    }

    fn notify(&mut self, notice: TimerNotice) {
        if let Some(on_notice) = self.on_notice.as_mut() {
            on_notice(notice);
        }
    }
}
