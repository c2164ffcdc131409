//! Countdown engine.
//!
//! While running, the countdown stores the clock reading at which it will
//! reach zero rather than a remaining counter. Remaining time is derived on
//! demand as `max(0, target - now)`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Finished
//!           ^  |
//!           |  v
//!        Configured
//! ```
//!
//! `reset` returns to `Idle` from any state. `start` from `Finished` restarts
//! from the configured fields.

use serde::{Deserialize, Serialize};

use super::duration::DurationFields;
use crate::events::{timestamp, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    /// Not started. Duration fields are editable.
    Idle,
    /// Paused with time left.
    Configured,
    Running,
    /// Reached zero. The expiry event has been raised.
    Finished,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    fields: DurationFields,
    state: CountdownState,
    /// Duration of the current run as configured at its fresh start.
    run_duration_ms: u64,
    /// Authoritative remaining time while not running.
    remaining_ms: u64,
    /// Clock reading at which the countdown hits zero. Only set while running.
    target_ms: Option<u64>,
    /// Lowest remaining value observed during the current run. Keeps the
    /// display from moving backward if the clock steps back.
    floor_ms: u64,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DurationFields::default())
    }
}

impl Countdown {
    pub fn new(fields: DurationFields) -> Self {
        Self {
            fields,
            state: CountdownState::Idle,
            run_duration_ms: 0,
            remaining_ms: 0,
            target_ms: None,
            floor_ms: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == CountdownState::Finished
    }

    pub fn fields(&self) -> DurationFields {
        self.fields
    }

    /// Duration the fields currently describe.
    pub fn configured_duration_ms(&self) -> u64 {
        self.fields.total_ms()
    }

    /// Duration of the active run, or of the fields when idle.
    pub fn duration_ms(&self) -> u64 {
        match self.state {
            CountdownState::Idle => self.configured_duration_ms(),
            _ => self.run_duration_ms,
        }
    }

    /// Remaining time as of `now_ms`. Clamped at zero and never above
    /// anything previously shown during this run.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.target_ms {
            Some(target) => target.saturating_sub(now_ms).min(self.floor_ms),
            None => self.remaining_ms,
        }
    }

    /// 0.0 .. 1.0 progress through the current run.
    pub fn progress(&self, now_ms: u64) -> f64 {
        match self.state {
            CountdownState::Idle => 0.0,
            CountdownState::Finished => 1.0,
            _ if self.run_duration_ms == 0 => 0.0,
            _ => {
                let remaining = self.remaining_ms(now_ms) as f64;
                (1.0 - remaining / self.run_duration_ms as f64).clamp(0.0, 1.0)
            }
        }
    }

    pub fn snapshot(&self, now_ms: u64) -> Event {
        Event::CountdownSnapshot {
            state: self.state,
            remaining_ms: self.remaining_ms(now_ms),
            duration_ms: self.duration_ms(),
            at: timestamp(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the duration fields. Only accepted while idle.
    pub fn set_fields(&mut self, fields: DurationFields, now_ms: u64) -> Option<Event> {
        if self.state != CountdownState::Idle {
            tracing::debug!(state = ?self.state, "duration edit ignored outside idle");
            return None;
        }
        self.fields = fields;
        Some(Event::DurationConfigured {
            duration_ms: fields.total_ms(),
            at: timestamp(now_ms),
        })
    }

    /// Start fresh from the fields, or resume from the frozen remaining time.
    ///
    /// A zero duration is silently rejected.
    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            CountdownState::Idle | CountdownState::Finished => {
                let duration = self.configured_duration_ms();
                if duration == 0 {
                    tracing::debug!("zero-length countdown rejected");
                    return None;
                }
                self.run_duration_ms = duration;
                self.run(now_ms, duration);
                tracing::debug!(duration_ms = duration, "countdown started");
                Some(Event::CountdownStarted {
                    duration_ms: duration,
                    at: timestamp(now_ms),
                })
            }
            CountdownState::Configured => {
                let remaining = self.remaining_ms;
                self.run(now_ms, remaining);
                tracing::debug!(remaining_ms = remaining, "countdown resumed");
                Some(Event::CountdownResumed {
                    remaining_ms: remaining,
                    at: timestamp(now_ms),
                })
            }
            CountdownState::Running => None,
        }
    }

    /// Freeze the remaining time.
    ///
    /// If the countdown already ran out since the last tick, it finishes
    /// instead and the expiry event is returned.
    pub fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        let left = self.remaining_ms(now_ms);
        if left == 0 {
            return self.finish(now_ms);
        }
        self.remaining_ms = left;
        self.target_ms = None;
        self.state = CountdownState::Configured;
        tracing::debug!(remaining_ms = left, "countdown paused");
        Some(Event::CountdownPaused {
            remaining_ms: left,
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

    /// Back to idle. The duration fields are kept.
    pub fn reset(&mut self, now_ms: u64) -> Option<Event> {
        self.state = CountdownState::Idle;
        self.run_duration_ms = 0;
        self.remaining_ms = 0;
        self.target_ms = None;
        self.floor_ms = 0;
        tracing::debug!("countdown reset");
        Some(Event::CountdownReset {
            at: timestamp(now_ms),
        })
    }

    /// Recompute remaining time from the clock. Call periodically while
    /// running. Returns `Some(Event::CountdownExpired)` exactly once, on the
    /// tick that observes zero.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let target = match (self.state, self.target_ms) {
            (CountdownState::Running, Some(target)) => target,
            _ => return None,
        };
        let left = self.remaining_ms(now_ms);
        if target.saturating_sub(now_ms) > self.floor_ms {
            tracing::warn!(now_ms, target, "clock moved backward; holding countdown display");
        }
        self.floor_ms = left;
        if left == 0 {
            return self.finish(now_ms);
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn run(&mut self, now_ms: u64, remaining_ms: u64) {
        self.remaining_ms = remaining_ms;
        self.floor_ms = remaining_ms;
        self.target_ms = Some(now_ms.saturating_add(remaining_ms));
        self.state = CountdownState::Running;
    }

    fn finish(&mut self, now_ms: u64) -> Option<Event> {
        self.state = CountdownState::Finished;
        self.remaining_ms = 0;
        self.floor_ms = 0;
        self.target_ms = None;
        tracing::info!(duration_ms = self.run_duration_ms, "countdown expired");
        Some(Event::CountdownExpired {
            duration_ms: self.run_duration_ms,
            at: timestamp(now_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ninety_seconds() -> Countdown {
        Countdown::new(DurationFields::hms(0, 1, 30))
    }

    #[test]
    fn start_pause_resume() {
        let mut cd = ninety_seconds();
        assert_eq!(cd.state(), CountdownState::Idle);
        assert_eq!(cd.configured_duration_ms(), 90_000);

        assert!(cd.start(1_000).is_some());
        assert_eq!(cd.state(), CountdownState::Running);
        assert_eq!(cd.remaining_ms(31_000), 60_000);

        assert!(cd.pause(31_000).is_some());
        assert_eq!(cd.state(), CountdownState::Configured);
        // Frozen while paused.
        assert_eq!(cd.remaining_ms(100_000), 60_000);

        assert!(matches!(
            cd.start(100_000),
            Some(Event::CountdownResumed {
                remaining_ms: 60_000,
                ..
            })
        ));
        assert_eq!(cd.remaining_ms(110_000), 50_000);
    }

    #[test]
    fn immediate_pause_keeps_full_duration() {
        let mut cd = ninety_seconds();
        cd.start(5_000);
        cd.pause(5_000);
        assert_eq!(cd.remaining_ms(5_000), 90_000);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut cd = Countdown::default();
        assert!(cd.start(0).is_none());
        assert_eq!(cd.state(), CountdownState::Idle);
        assert!(cd.tick(1_000).is_none());
    }

    #[test]
    fn expires_exactly_once() {
        let mut cd = Countdown::new(DurationFields::hms(0, 0, 2));
        cd.start(0);
        assert!(cd.tick(1_000).is_none());
        assert!(matches!(
            cd.tick(2_000),
            Some(Event::CountdownExpired {
                duration_ms: 2_000,
                ..
            })
        ));
        assert_eq!(cd.state(), CountdownState::Finished);
        assert!(cd.tick(2_100).is_none());
        assert!(cd.tick(9_000).is_none());
        assert_eq!(cd.remaining_ms(9_000), 0);
    }

    #[test]
    fn resume_ignores_field_edits() {
        let mut cd = ninety_seconds();
        cd.start(0);
        cd.pause(30_000);
        // Edits outside idle are refused.
        assert!(cd.set_fields(DurationFields::hms(5, 0, 0), 0).is_none());
        cd.start(40_000);
        assert_eq!(cd.remaining_ms(40_000), 60_000);
        assert_eq!(cd.duration_ms(), 90_000);
    }

    #[test]
    fn set_fields_only_while_idle() {
        let mut cd = Countdown::default();
        assert!(cd.set_fields(DurationFields::hms(0, 0, 10), 0).is_some());
        cd.start(0);
        assert!(cd.set_fields(DurationFields::hms(0, 0, 20), 0).is_none());
        cd.reset(0);
        assert!(cd.set_fields(DurationFields::hms(0, 0, 20), 0).is_some());
        assert_eq!(cd.configured_duration_ms(), 20_000);
    }

    #[test]
    fn reset_keeps_fields() {
        let mut cd = ninety_seconds();
        cd.start(0);
        cd.reset(0);
        assert_eq!(cd.state(), CountdownState::Idle);
        assert_eq!(cd.remaining_ms(0), 0);
        assert_eq!(cd.configured_duration_ms(), 90_000);
    }

    #[test]
    fn start_after_finish_restarts() {
        let mut cd = Countdown::new(DurationFields::hms(0, 0, 1));
        cd.start(0);
        cd.tick(1_000);
        assert!(cd.is_finished());
        assert!(matches!(
            cd.start(5_000),
            Some(Event::CountdownStarted {
                duration_ms: 1_000,
                ..
            })
        ));
        assert_eq!(cd.remaining_ms(5_400), 600);
    }

    #[test]
    fn pause_after_unobserved_expiry_finishes() {
        let mut cd = Countdown::new(DurationFields::hms(0, 0, 1));
        cd.start(0);
        assert!(matches!(
            cd.pause(1_500),
            Some(Event::CountdownExpired { .. })
        ));
        assert!(cd.is_finished());
        assert!(cd.tick(2_000).is_none());
    }

    #[test]
    fn clock_rollback_never_raises_remaining() {
        let mut cd = ninety_seconds();
        cd.start(10_000);
        assert!(cd.tick(40_000).is_none());
        assert_eq!(cd.remaining_ms(40_000), 60_000);
        // Clock jumps back 20 s.
        assert!(cd.tick(20_000).is_none());
        assert_eq!(cd.remaining_ms(20_000), 60_000);
        // Forward again.
        cd.tick(50_000);
        assert_eq!(cd.remaining_ms(50_000), 50_000);
    }

    #[test]
    fn progress_tracks_run() {
        let mut cd = Countdown::new(DurationFields::hms(0, 0, 10));
        assert_eq!(cd.progress(0), 0.0);
        cd.start(0);
        assert!((cd.progress(2_500) - 0.25).abs() < 1e-9);
        cd.tick(10_000);
        assert_eq!(cd.progress(10_000), 1.0);
    }
}
