//! Countdown duration input.
//!
//! The countdown is configured through six independent unit fields. Calendar
//! units are approximated: a year is 365 days and a month is 30 days. There is
//! no calendar-aware arithmetic here and none is wanted.

use serde::{Deserialize, Serialize};

pub const SECS_PER_MINUTE: u64 = 60;
pub const SECS_PER_HOUR: u64 = 3_600;
pub const SECS_PER_DAY: u64 = 86_400;
/// 30 days.
pub const SECS_PER_MONTH: u64 = 30 * SECS_PER_DAY;
/// 365 days.
pub const SECS_PER_YEAR: u64 = 365 * SECS_PER_DAY;

/// The six duration fields of the countdown form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationFields {
    #[serde(default)]
    pub years: u64,
    #[serde(default)]
    pub months: u64,
    #[serde(default)]
    pub days: u64,
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

impl DurationFields {
    pub fn hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            ..Self::default()
        }
    }

    /// Build fields from raw text inputs, in years/months/days/hours/minutes/
    /// seconds order. Malformed entries count as zero.
    pub fn from_inputs(
        years: &str,
        months: &str,
        days: &str,
        hours: &str,
        minutes: &str,
        seconds: &str,
    ) -> Self {
        Self {
            years: parse_field(years),
            months: parse_field(months),
            days: parse_field(days),
            hours: parse_field(hours),
            minutes: parse_field(minutes),
            seconds: parse_field(seconds),
        }
    }

    /// Total configured duration in whole seconds. Saturates on overflow.
    pub fn total_secs(&self) -> u64 {
        [
            (self.years, SECS_PER_YEAR),
            (self.months, SECS_PER_MONTH),
            (self.days, SECS_PER_DAY),
            (self.hours, SECS_PER_HOUR),
            (self.minutes, SECS_PER_MINUTE),
            (self.seconds, 1),
        ]
        .iter()
        .fold(0u64, |acc, &(count, unit)| {
            acc.saturating_add(count.saturating_mul(unit))
        })
    }

    /// Total configured duration in milliseconds. Saturates on overflow.
    pub fn total_ms(&self) -> u64 {
        self.total_secs().saturating_mul(1000)
    }

    pub fn is_zero(&self) -> bool {
        self.total_secs() == 0
    }
}

/// Parse one duration field leniently.
///
/// Leading whitespace and a single `+` are skipped, then the leading run of
/// ASCII digits is taken. Empty, non-numeric and negative input yields 0.
/// Values too large for `u64` saturate.
pub fn parse_field(input: &str) -> u64 {
    let trimmed = input.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}
