mod countdown;
mod duration;
mod format;
mod stopwatch;

pub use countdown::{Countdown, CountdownState};
pub use duration::{
    parse_field, DurationFields, SECS_PER_DAY, SECS_PER_HOUR, SECS_PER_MINUTE, SECS_PER_MONTH,
    SECS_PER_YEAR,
};
pub use format::{format_elapsed, format_remaining, format_split};
pub use stopwatch::{LapSplit, Stopwatch, StopwatchState};
