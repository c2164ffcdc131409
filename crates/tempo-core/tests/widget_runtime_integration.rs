//! Widget runtime tests over real channels with paused tokio time.
//!
//! Tokio's clock only paces the tickers; the values the widget reports come
//! from a `ManualClock`, which lets these tests decouple "a tick fired" from
//! "time passed".

use std::time::Duration;

use tempo_core::{
    Command, CountdownState, DurationFields, Event, ManualClock, Target, TimerWidget,
};
use tokio::sync::mpsc;

fn spawn_widget(
    clock: &ManualClock,
    fields: DurationFields,
) -> (mpsc::Sender<Command>, mpsc::Receiver<Event>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(64);
    let widget = TimerWidget::with_periods(
        clock.clone(),
        Duration::from_millis(10),
        Duration::from_millis(100),
        fields,
    );
    tokio::spawn(widget.run(cmd_rx, event_tx));
    (cmd_tx, event_rx)
}

async fn next_event(rx: &mut mpsc::Receiver<Event>) -> Event {
    rx.recv().await.expect("widget stopped unexpectedly")
}

#[tokio::test(start_paused = true)]
async fn ticks_without_clock_progress_do_not_count_up() {
    let clock = ManualClock::new(50_000);
    let (cmd, mut events) = spawn_widget(&clock, DurationFields::default());

    cmd.send(Command::StartOrResume { target: Target::Stopwatch })
        .await
        .unwrap();
    assert!(matches!(next_event(&mut events).await, Event::StopwatchStarted { .. }));

    // Tokio time keeps advancing and ticks keep firing, but the wall clock is
    // frozen, so the display must stay put.
    for _ in 0..20 {
        match next_event(&mut events).await {
            Event::StopwatchSnapshot { elapsed_ms, .. } => assert_eq!(elapsed_ms, 0),
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn throttled_stopwatch_catches_up_from_absolute_time() {
    let clock = ManualClock::new(0);
    let (cmd, mut events) = spawn_widget(&clock, DurationFields::default());

    cmd.send(Command::StartOrResume { target: Target::Stopwatch })
        .await
        .unwrap();
    next_event(&mut events).await;

    // The host was suspended for 7.5 s and delivered no ticks meanwhile.
    clock.set(7_500);

    let mut caught_up = false;
    for _ in 0..100 {
        if let Event::StopwatchSnapshot { elapsed_ms, .. } = next_event(&mut events).await {
            assert!(elapsed_ms == 0 || elapsed_ms == 7_500, "got {elapsed_ms}");
            if elapsed_ms == 7_500 {
                caught_up = true;
                break;
            }
        }
    }
    assert!(caught_up);
}

#[tokio::test(start_paused = true)]
async fn countdown_expires_exactly_once_through_the_loop() {
    let clock = ManualClock::new(0);
    let (cmd, mut events) = spawn_widget(&clock, DurationFields::hms(0, 0, 3));

    cmd.send(Command::Toggle { target: Target::Countdown })
        .await
        .unwrap();
    assert!(matches!(
        next_event(&mut events).await,
        Event::CountdownStarted { duration_ms: 3_000, .. }
    ));

    clock.set(3_000);

    let mut expirations = 0;
    loop {
        match next_event(&mut events).await {
            Event::CountdownExpired { .. } => expirations += 1,
            Event::CountdownSnapshot { state: CountdownState::Finished, remaining_ms, .. } => {
                assert_eq!(remaining_ms, 0);
                break;
            }
            Event::CountdownSnapshot { remaining_ms, .. } => {
                assert!(remaining_ms == 3_000 || remaining_ms == 0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(expirations, 1);

    // Let plenty of tokio time pass; the finished countdown has no ticker left.
    clock.advance(60_000);
    tokio::time::sleep(Duration::from_secs(5)).await;

    cmd.send(Command::Shutdown).await.unwrap();
    while let Some(event) = events.recv().await {
        assert!(
            !matches!(event, Event::CountdownExpired { .. }),
            "expiry raised twice"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn closing_the_command_channel_tears_down() {
    let clock = ManualClock::new(0);
    let (cmd, mut events) = spawn_widget(&clock, DurationFields::hms(0, 1, 0));

    cmd.send(Command::StartOrResume { target: Target::Countdown })
        .await
        .unwrap();
    cmd.send(Command::StartOrResume { target: Target::Stopwatch })
        .await
        .unwrap();
    drop(cmd);

    // The loop ends and drops its event sender, so the stream terminates
    // even though both engines were running.
    let drained = tokio::time::timeout(Duration::from_secs(60), async {
        while events.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok());
}

#[tokio::test(start_paused = true)]
async fn zero_duration_start_is_silent() {
    let clock = ManualClock::new(0);
    let (cmd, mut events) = spawn_widget(
        &clock,
        DurationFields::from_inputs("", "", "", "", "abc", "-4"),
    );

    cmd.send(Command::StartOrResume { target: Target::Countdown })
        .await
        .unwrap();
    match next_event(&mut events).await {
        Event::CountdownSnapshot { state, remaining_ms, .. } => {
            assert_eq!(state, CountdownState::Idle);
            assert_eq!(remaining_ms, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }

    cmd.send(Command::Shutdown).await.unwrap();
    assert!(events.recv().await.is_none());
}
