//! Stopwatch engine.
//!
//! Elapsed time is never counted up tick by tick. It is always derived from
//! the instant the current run began:
//!
//! ```text
//! elapsed = accumulated + (running ? now - run_since : 0)
//! ```
//!
//! so a late or skipped tick only delays the display, it never skews it.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running <-> Paused
//!    ^__________________/  (reset from any state)
//! ```

use serde::{Deserialize, Serialize};

use crate::events::{timestamp, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchState {
    Stopped,
    Running,
    Paused,
}

/// One recorded lap with its split relative to the previous lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapSplit {
    /// 1-based, oldest lap is 1.
    pub number: usize,
    /// Time since the previous lap (or since zero for the first lap).
    pub split_ms: u64,
    /// Cumulative elapsed time when the lap was recorded.
    pub total_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Stopwatch {
    state: StopwatchState,
    /// Elapsed time frozen at the last pause.
    accumulated_ms: u64,
    /// Clock reading when the current run began. Only set while running.
    run_since_ms: Option<u64>,
    /// Highest elapsed value observed during the current run. Keeps the
    /// display from moving backward if the clock steps back.
    peak_ms: u64,
    /// Cumulative elapsed at each lap, most recent first.
    laps: Vec<u64>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            state: StopwatchState::Stopped,
            accumulated_ms: 0,
            run_since_ms: None,
            peak_ms: 0,
            laps: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Running
    }

    /// Elapsed time as of `now_ms`, never below anything previously shown
    /// during this run.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.run_since_ms {
            Some(since) => {
                let live = self
                    .accumulated_ms
                    .saturating_add(now_ms.saturating_sub(since));
                live.max(self.peak_ms)
            }
            None => self.accumulated_ms,
        }
    }

    /// Cumulative lap times, most recent first.
    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Laps with their split deltas, most recent first.
    pub fn splits(&self) -> Vec<LapSplit> {
        let count = self.laps.len();
        self.laps
            .iter()
            .enumerate()
            .map(|(i, &total)| {
                let previous = self.laps.get(i + 1).copied().unwrap_or(0);
                LapSplit {
                    number: count - i,
                    split_ms: total.saturating_sub(previous),
                    total_ms: total,
                }
            })
            .collect()
    }

    pub fn snapshot(&self, now_ms: u64) -> Event {
        Event::StopwatchSnapshot {
            state: self.state,
            elapsed_ms: self.elapsed_ms(now_ms),
            lap_count: self.laps.len(),
            at: timestamp(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Elapsed time continues from where it was frozen.
    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            StopwatchState::Stopped | StopwatchState::Paused => {
                self.state = StopwatchState::Running;
                self.run_since_ms = Some(now_ms);
                self.peak_ms = self.accumulated_ms;
                tracing::debug!(elapsed_ms = self.accumulated_ms, "stopwatch started");
                Some(Event::StopwatchStarted {
                    elapsed_ms: self.accumulated_ms,
                    at: timestamp(now_ms),
                })
            }
            StopwatchState::Running => None,
        }
    }

    pub fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != StopwatchState::Running {
            return None;
        }
        self.accumulated_ms = self.elapsed_ms(now_ms);
        self.run_since_ms = None;
        self.peak_ms = self.accumulated_ms;
        self.state = StopwatchState::Paused;
        tracing::debug!(elapsed_ms = self.accumulated_ms, "stopwatch paused");
        Some(Event::StopwatchPaused {
            elapsed_ms: self.accumulated_ms,
            at: timestamp(now_ms),
        })
    }

    pub fn toggle(&mut self, now_ms: u64) -> Option<Event> {
        if self.is_running() {
            self.pause(now_ms)
        } else {
            self.start(now_ms)
        }
    }

    /// Record a lap. Ignored unless running.
    pub fn lap(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != StopwatchState::Running {
            return None;
        }
        let previous = self.laps.first().copied().unwrap_or(0);
        // Laps must never go backward, whatever the clock did.
        let total = self.tick(now_ms).max(previous);
        self.laps.insert(0, total);
        let lap_number = self.laps.len();
        tracing::debug!(lap_number, total_ms = total, "lap recorded");
        Some(Event::LapRecorded {
            lap_number,
            total_ms: total,
            split_ms: total - previous,
            at: timestamp(now_ms),
        })
    }

    pub fn reset(&mut self, now_ms: u64) -> Option<Event> {
        self.state = StopwatchState::Stopped;
        self.accumulated_ms = 0;
        self.run_since_ms = None;
        self.peak_ms = 0;
        self.laps.clear();
        tracing::debug!("stopwatch reset");
        Some(Event::StopwatchReset {
            at: timestamp(now_ms),
        })
    }

    /// Recompute the displayed elapsed time from the clock. Call periodically
    /// while running.
    pub fn tick(&mut self, now_ms: u64) -> u64 {
        let elapsed = self.elapsed_ms(now_ms);
        if let Some(since) = self.run_since_ms {
            if now_ms < since {
                tracing::warn!(now_ms, since, "clock moved backward; holding stopwatch display");
            }
            self.peak_ms = elapsed;
        }
        elapsed
    }
}
