//! Widget runtime: both engines plus their tick schedulers.
//!
//! Each engine owns at most one live ticker, held in an `Option<Interval>`
//! that is armed when the engine enters `Running` and dropped on every exit
//! path (pause, reset, expiry, teardown). Ticks never carry time themselves;
//! they only prompt a fresh clock read, so a late, skipped or coalesced tick
//! cannot make the display drift.
//!
//! Tickers are tokio intervals, so the methods that arm them (`handle` and the
//! `on_*_tick` callbacks) must run inside a Tokio runtime.
//!
//! ## Usage
//!
//! ```ignore
//! let (cmd_tx, cmd_rx) = tokio::sync::mpsc::channel(16);
//! let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(64);
//! let widget = TimerWidget::new(SystemClock, &Config::default());
//! tokio::spawn(widget.run(cmd_rx, event_tx));
//! cmd_tx.send(Command::StartOrResume { target: Target::Stopwatch }).await?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

use crate::clock::Clock;
use crate::events::Event;
use crate::storage::Config;
use crate::timer::{Countdown, DurationFields, Stopwatch};

/// Which engine a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Stopwatch,
    Countdown,
}

/// Inbound commands from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    StartOrResume { target: Target },
    PauseOrStop { target: Target },
    /// Start when stopped or paused, pause when running.
    Toggle { target: Target },
    Reset { target: Target },
    /// Stopwatch only.
    Lap,
    /// Countdown only, accepted while idle.
    SetDurationFields { fields: DurationFields },
    /// Tear the widget down. Cancels all tickers.
    Shutdown,
}

pub struct TimerWidget<C: Clock> {
    clock: C,
    stopwatch: Stopwatch,
    countdown: Countdown,
    stopwatch_period: Duration,
    countdown_period: Duration,
    stopwatch_ticker: Option<Interval>,
    countdown_ticker: Option<Interval>,
}

impl<C: Clock> TimerWidget<C> {
    /// Mount a widget with cadences and default countdown fields from `config`.
    pub fn new(clock: C, config: &Config) -> Self {
        Self::with_periods(
            clock,
            Duration::from_millis(config.stopwatch.tick_interval_ms),
            Duration::from_millis(config.countdown.tick_interval_ms),
            config.countdown.default_duration,
        )
    }

    pub fn with_periods(
        clock: C,
        stopwatch_period: Duration,
        countdown_period: Duration,
        fields: DurationFields,
    ) -> Self {
        let min = Duration::from_millis(1);
        Self {
            clock,
            stopwatch: Stopwatch::new(),
            countdown: Countdown::new(fields),
            stopwatch_period: stopwatch_period.max(min),
            countdown_period: countdown_period.max(min),
            stopwatch_ticker: None,
            countdown_ticker: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn stopwatch_ticking(&self) -> bool {
        self.stopwatch_ticker.is_some()
    }

    pub fn countdown_ticking(&self) -> bool {
        self.countdown_ticker.is_some()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.stopwatch.elapsed_ms(self.clock.now_ms())
    }

    pub fn remaining_ms(&self) -> u64 {
        self.countdown.remaining_ms(self.clock.now_ms())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one command. Returns the transition event (if the command did
    /// anything) followed by a fresh snapshot of the addressed engine.
    pub fn handle(&mut self, command: Command) -> Vec<Event> {
        let now = self.clock.now_ms();
        let (transition, target) = match command {
            Command::StartOrResume { target } => (
                match target {
                    Target::Stopwatch => self.stopwatch.start(now),
                    Target::Countdown => self.countdown.start(now),
                },
                target,
            ),
            Command::PauseOrStop { target } => (
                match target {
                    Target::Stopwatch => self.stopwatch.pause(now),
                    Target::Countdown => self.countdown.pause(now),
                },
                target,
            ),
            Command::Toggle { target } => (
                match target {
                    Target::Stopwatch => self.stopwatch.toggle(now),
                    Target::Countdown => self.countdown.toggle(now),
                },
                target,
            ),
            Command::Reset { target } => (
                match target {
                    Target::Stopwatch => self.stopwatch.reset(now),
                    Target::Countdown => self.countdown.reset(now),
                },
                target,
            ),
            Command::Lap => (self.stopwatch.lap(now), Target::Stopwatch),
            Command::SetDurationFields { fields } => {
                (self.countdown.set_fields(fields, now), Target::Countdown)
            }
            Command::Shutdown => {
                self.teardown();
                return Vec::new();
            }
        };

        self.sync_tickers();

        let mut events: Vec<Event> = transition.into_iter().collect();
        events.push(match target {
            Target::Stopwatch => self.stopwatch.snapshot(now),
            Target::Countdown => self.countdown.snapshot(now),
        });
        events
    }

    /// Stopwatch tick callback.
    pub fn on_stopwatch_tick(&mut self) -> Vec<Event> {
        if !self.stopwatch.is_running() {
            self.stopwatch_ticker = None;
            return Vec::new();
        }
        let now = self.clock.now_ms();
        self.stopwatch.tick(now);
        vec![self.stopwatch.snapshot(now)]
    }

    /// Countdown tick callback. Emits the expiry event at most once.
    pub fn on_countdown_tick(&mut self) -> Vec<Event> {
        if !self.countdown.is_running() {
            self.countdown_ticker = None;
            return Vec::new();
        }
        let now = self.clock.now_ms();
        let expired = self.countdown.tick(now);
        self.sync_tickers();

        let mut events: Vec<Event> = expired.into_iter().collect();
        events.push(self.countdown.snapshot(now));
        events
    }

    /// Unmount: cancel both tickers and return the engines to their initial
    /// state.
    pub fn teardown(&mut self) {
        self.stopwatch_ticker = None;
        self.countdown_ticker = None;
        let now = self.clock.now_ms();
        self.stopwatch.reset(now);
        self.countdown.reset(now);
        tracing::debug!("widget torn down");
    }

    /// Drive the widget until the command channel closes, a `Shutdown`
    /// arrives, or the event receiver goes away.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>, events: mpsc::Sender<Event>) {
        loop {
            let batch = tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = next_tick(&mut self.countdown_ticker) => self.on_countdown_tick(),
                _ = next_tick(&mut self.stopwatch_ticker) => self.on_stopwatch_tick(),
            };

            for event in batch {
                if events.send(event).await.is_err() {
                    tracing::debug!("event receiver dropped");
                    self.teardown();
                    return;
                }
            }
        }
        self.teardown();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Arm a ticker for each running engine that lacks one, drop the ticker
    /// of every engine that is not running.
    fn sync_tickers(&mut self) {
        sync_ticker(
            &mut self.stopwatch_ticker,
            self.stopwatch.is_running(),
            self.stopwatch_period,
        );
        sync_ticker(
            &mut self.countdown_ticker,
            self.countdown.is_running(),
            self.countdown_period,
        );
    }
}

fn sync_ticker(ticker: &mut Option<Interval>, running: bool, period: Duration) {
    match (running, ticker.is_some()) {
        (true, false) => {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
