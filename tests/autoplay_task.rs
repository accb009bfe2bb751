use std::time::{Duration, Instant};

use slide_autoplay::config::AutoplaySettings;
use slide_autoplay::tasks::autoplay;
use slide_autoplay::{AutoplayCommand, AutoplayEvent, PauseReason};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Harness {
    commands: mpsc::Sender<AutoplayCommand>,
    events: mpsc::Receiver<AutoplayEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<anyhow::Result<()>>,
}

fn spawn(settings: AutoplaySettings) -> Harness {
    let (commands, command_rx) = mpsc::channel(16);
    let (event_tx, events) = mpsc::channel(256);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(autoplay::run(settings, command_rx, event_tx, cancel.clone()));
    Harness {
        commands,
        events,
        cancel,
        handle,
    }
}

fn quiet(interval_ms: u64) -> AutoplaySettings {
    AutoplaySettings {
        interval: Duration::from_millis(interval_ms),
        report_progress: false,
        ..AutoplaySettings::default()
    }
}

async fn next_non_progress(events: &mut mpsc::Receiver<AutoplayEvent>) -> AutoplayEvent {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("expected an autoplay event")
            .expect("autoplay event channel closed unexpectedly");
        if !matches!(event, AutoplayEvent::Progress(_)) {
            return event;
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn autostart_resumes_then_advances_on_interval() {
    let start = Instant::now();
    let mut h = spawn(quiet(150));

    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Resumed);
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Advance);
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(150),
        "advanced too early: {:?}",
        elapsed
    );

    h.cancel.cancel();
    h.handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stays_stopped_without_autostart() {
    let settings = AutoplaySettings {
        autostart: false,
        ..quiet(50)
    };
    let mut h = spawn(settings);

    let early = tokio::time::timeout(Duration::from_millis(200), h.events.recv()).await;
    assert!(early.is_err(), "no event expected before play");

    h.commands.send(AutoplayCommand::Play(None)).await.unwrap();
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Resumed);
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Advance);

    h.cancel.cancel();
    h.handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn layered_pauses_hold_until_all_lifted() {
    let mut h = spawn(quiet(300));
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Resumed);

    h.commands
        .send(AutoplayCommand::Pause(Some(PauseReason::Manual)))
        .await
        .unwrap();
    h.commands
        .send(AutoplayCommand::Pause(Some(PauseReason::Hover)))
        .await
        .unwrap();
    h.commands
        .send(AutoplayCommand::Play(Some(PauseReason::Hover)))
        .await
        .unwrap();
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Paused);

    let held = tokio::time::timeout(Duration::from_millis(500), h.events.recv()).await;
    assert!(held.is_err(), "manual pause should still hold: {held:?}");

    h.commands
        .send(AutoplayCommand::Play(Some(PauseReason::Manual)))
        .await
        .unwrap();
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Resumed);
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Advance);

    h.cancel.cancel();
    h.handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn progress_reports_fractions_below_one() {
    let settings = AutoplaySettings {
        interval: Duration::from_millis(200),
        progress_cadence: Duration::from_millis(20),
        ..AutoplaySettings::default()
    };
    let mut h = spawn(settings);

    let mut fractions = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), h.events.recv())
            .await
            .expect("expected an autoplay event")
            .expect("autoplay event channel closed unexpectedly");
        match event {
            AutoplayEvent::Progress(fraction) => fractions.push(fraction),
            AutoplayEvent::Advance => break,
            AutoplayEvent::Resumed => {}
            AutoplayEvent::Paused => panic!("unexpected pause"),
        }
    }

    assert!(fractions.len() >= 3, "too few samples: {fractions:?}");
    assert!(fractions.iter().all(|f| (0.0..1.0).contains(f)));
    assert!(
        fractions.windows(2).all(|w| w[0] <= w[1]),
        "progress went backwards: {fractions:?}"
    );

    h.cancel.cancel();
    h.handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn destroy_ends_task_and_closes_events() {
    let mut h = spawn(quiet(1000));
    assert_eq!(next_non_progress(&mut h.events).await, AutoplayEvent::Resumed);

    h.commands.send(AutoplayCommand::Destroy).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), h.handle)
        .await
        .expect("autoplay task should stop after destroy")
        .unwrap()
        .unwrap();

    assert!(h.events.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closed_command_channel_ends_task() {
    let Harness {
        commands,
        events: _events,
        cancel: _cancel,
        handle,
    } = spawn(quiet(1000));
    drop(commands);

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("autoplay task should stop when commands close")
        .unwrap()
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn departed_host_ends_task_cleanly() {
    let Harness {
        commands,
        events,
        cancel: _cancel,
        handle,
    } = spawn(quiet(1000));
    drop(events);

    // The task may already be gone; either way it must wind down.
    let _ = commands.send(AutoplayCommand::Pause(Some(PauseReason::Hover))).await;
    let _ = commands.send(AutoplayCommand::Destroy).await;

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("autoplay task should stop when the host is gone")
        .unwrap()
        .unwrap();
}
