use std::time::Instant;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver as Outbox, Sender as OutboxSender, unbounded};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AutoplaySettings;
use crate::events::{AutoplayCommand, AutoplayEvent};
use crate::timer::{PausableTimer, TimerNotice};

/// Owns the autoplay timer and paces it against the wall clock.
///
/// Rules:
/// - Commands and ticks are applied from one loop, in the order received.
/// - Timer callbacks only queue events in a local outbox; the loop forwards
///   them to `events` after every step.
/// - Wake up at the earlier of the next fire and the next progress sample.
///   While stopped, only commands and cancellation wake the loop.
/// - `Destroy`, cancellation or a closed command channel destroy the timer and
///   end the task.
pub async fn run(
    settings: AutoplaySettings,
    mut commands: Receiver<AutoplayCommand>,
    events: Sender<AutoplayEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let (outbox_tx, outbox) = unbounded();
    let mut timer = build_timer(&settings, outbox_tx).context("failed to build autoplay timer")?;
    let cadence = settings.effective_cadence();
    info!(
        interval = %humantime::format_duration(settings.interval),
        cadence = %humantime::format_duration(cadence),
        autostart = settings.autostart,
        "autoplay task started"
    );

    if settings.autostart {
        timer.play(None, Instant::now());
    }

    loop {
        if !forward(&outbox, &events).await {
            warn!("autoplay event channel closed");
            break;
        }

        let wait = timer
            .time_until_fire(Instant::now())
            .map(|left| left.min(cadence));

        select! {
            _ = cancel.cancelled() => {
                debug!("autoplay task cancelled");
                break;
            }

            maybe_cmd = commands.recv() => {
                match maybe_cmd {
                    Some(command) => {
                        apply(&mut timer, command, Instant::now());
                        if timer.is_destroyed() {
                            break;
                        }
                    }
                    None => {
                        debug!("autoplay command channel closed");
                        break;
                    }
                }
            }

            _ = sleep(wait.unwrap_or_default()), if wait.is_some() => {
                timer.advance(Instant::now());
            }
        }
    }

    timer.destroy();
    if !forward(&outbox, &events).await {
        debug!("autoplay event channel closed; final events dropped");
    }
    info!("autoplay task stopped");
    Ok(())
}

fn build_timer(
    settings: &AutoplaySettings,
    outbox: OutboxSender<AutoplayEvent>,
) -> crate::Result<PausableTimer> {
    let fire_tx = outbox.clone();
    let mut timer = PausableTimer::new(settings.interval, move || {
        let _ = fire_tx.send(AutoplayEvent::Advance);
    })?;

    if settings.report_progress {
        let progress_tx = outbox.clone();
        timer = timer.with_progress(move |fraction| {
            let _ = progress_tx.send(AutoplayEvent::Progress(fraction));
        });
    }

    Ok(timer.with_notices(move |notice| {
        let event = match notice {
            TimerNotice::Paused => AutoplayEvent::Paused,
            TimerNotice::Resumed => AutoplayEvent::Resumed,
        };
        let _ = outbox.send(event);
    }))
}

fn apply(timer: &mut PausableTimer, command: AutoplayCommand, now: Instant) {
    debug!(?command, "autoplay command");
    match command {
        AutoplayCommand::Play(reason) => timer.play(reason, now),
        AutoplayCommand::Pause(reason) => timer.pause(reason, now),
        AutoplayCommand::Restart => timer.restart(now),
        AutoplayCommand::Destroy => timer.destroy(),
    }
}

async fn forward(outbox: &Outbox<AutoplayEvent>, events: &Sender<AutoplayEvent>) -> bool {
    for event in outbox.try_iter() {
        if events.send(event).await.is_err() {
            return false;
        }
    }
    true
}
