use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CountdownState, StopwatchState};

/// Convert a clock reading into an event timestamp.
///
/// Events carry the same clock reading their values were derived from, so a
/// manual clock drives both. Readings past chrono's range map to the epoch.
pub fn timestamp(now_ms: u64) -> DateTime<Utc> {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// Every state change in the widget produces an Event.
/// The presentation layer renders them; `--json` consumers stream them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StopwatchStarted {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    LapRecorded {
        /// 1-based, oldest lap is 1.
        lap_number: usize,
        total_ms: u64,
        split_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchReset {
        at: DateTime<Utc>,
    },
    /// Display refresh for the stopwatch, produced at tick cadence while
    /// running and after every transition.
    StopwatchSnapshot {
        state: StopwatchState,
        elapsed_ms: u64,
        lap_count: usize,
        at: DateTime<Utc>,
    },
    DurationConfigured {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownReset {
        at: DateTime<Utc>,
    },
    /// Raised exactly once per run when the countdown reaches zero.
    CountdownExpired {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// Display refresh for the countdown.
    CountdownSnapshot {
        state: CountdownState,
        remaining_ms: u64,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snapshots are high-frequency display refreshes, everything else is a
    /// discrete transition.
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self,
            Event::StopwatchSnapshot { .. } | Event::CountdownSnapshot { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::CountdownExpired {
            duration_ms: 90_000,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CountdownExpired");
        assert_eq!(json["duration_ms"], 90_000);
    }

    #[test]
    fn snapshot_state_is_lowercase() {
        let event = Event::StopwatchSnapshot {
            state: StopwatchState::Running,
            elapsed_ms: 1_234,
            lap_count: 0,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["state"], "running");
        assert!(event.is_snapshot());
    }

    #[test]
    fn timestamp_follows_clock_reading() {
        assert_eq!(timestamp(0).timestamp_millis(), 0);
        assert_eq!(timestamp(1_700_000_000_123).timestamp_millis(), 1_700_000_000_123);
        assert_eq!(timestamp(u64::MAX), DateTime::<Utc>::default());
    }
}
