//! # Tempo Core Library
//!
//! This library provides the timing engine behind the Tempo stopwatch/countdown
//! widget. The presentation layer (the `tempo` CLI) is a thin adapter over the
//! same types.
//!
//! ## Architecture
//!
//! - **Clock**: a single `now_ms()` read, injectable for tests
//! - **Timer engines**: pure state machines that derive elapsed/remaining time
//!   from absolute clock readings, never from tick counts
//! - **Widget runtime**: owns both engines and at most one ticker per engine,
//!   driven by a single-threaded `tokio::select!` loop
//! - **Storage**: TOML-based configuration (tick cadence, default countdown)
//!
//! ## Key Components
//!
//! - [`Stopwatch`]: elapsed time with pause/resume and laps
//! - [`Countdown`]: target-instant countdown with exactly-once expiry
//! - [`TimerWidget`]: tick scheduling and command dispatch
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod widget;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::Config;
pub use timer::{
    format_elapsed, format_remaining, format_split, Countdown, CountdownState, DurationFields,
    LapSplit, Stopwatch, StopwatchState,
};
pub use widget::{Command, Target, TimerWidget};
