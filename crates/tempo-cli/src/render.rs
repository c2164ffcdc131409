//! Terminal presentation of widget events.

use std::io::Write;

use tempo_core::{
    format_elapsed, format_remaining, format_split, CountdownState, Event, StopwatchState,
};

const BELL: &str = "\x07";

pub struct Renderer {
    json: bool,
    bell: bool,
}

impl Renderer {
    pub fn new(json: bool, bell: bool) -> Self {
        Self { json, bell }
    }

    pub fn render(&self, event: &Event) {
        let mut out = std::io::stdout().lock();
        let written = if self.json {
            match serde_json::to_string(event) {
                Ok(line) => writeln!(out, "{line}"),
                Err(e) => {
                    tracing::warn!(error = %e, "could not serialize event");
                    return;
                }
            }
        } else {
            match self.describe(event) {
                Some(text) => write!(out, "{text}"),
                None => return,
            }
        };
        if written.and_then(|_| out.flush()).is_err() {
            tracing::debug!("stdout closed");
        }
    }

    /// Human-readable rendering. Snapshots redraw the current line in place,
    /// discrete events print on their own line.
    fn describe(&self, event: &Event) -> Option<String> {
        let text = match event {
            Event::StopwatchSnapshot {
                state, elapsed_ms, ..
            } => format!("\r{} {:<9}", format_elapsed(*elapsed_ms), stopwatch_label(*state)),
            Event::CountdownSnapshot {
                state,
                remaining_ms,
                duration_ms,
                ..
            } => {
                // Idle shows what the form would start.
                let shown = match state {
                    CountdownState::Idle => *duration_ms,
                    _ => *remaining_ms,
                };
                format!("\r{} {:<9}", format_remaining(shown), countdown_label(*state))
            }
            Event::LapRecorded {
                lap_number,
                total_ms,
                split_ms,
                ..
            } => format!("\n{}\n", lap_line(*lap_number, *split_ms, *total_ms)),
            Event::StopwatchReset { .. } => "\nReset. No laps recorded\n".to_string(),
            Event::CountdownExpired { .. } => {
                let bell = if self.bell { BELL } else { "" };
                format!("\nTime's Up!{bell}\n")
            }
            Event::CountdownReset { .. } => "\n".to_string(),
            _ => return None,
        };
        Some(text)
    }
}

pub fn lap_line(number: usize, split_ms: u64, total_ms: u64) -> String {
    format!(
        "Lap {:<3} {}  {}",
        number,
        format_split(split_ms),
        format_elapsed(total_ms)
    )
}

fn stopwatch_label(state: StopwatchState) -> &'static str {
    match state {
        StopwatchState::Stopped => "",
        StopwatchState::Running => "running",
        StopwatchState::Paused => "paused",
    }
}

fn countdown_label(state: CountdownState) -> &'static str {
    match state {
        CountdownState::Idle => "idle",
        CountdownState::Configured => "paused",
        CountdownState::Running => "running",
        CountdownState::Finished => "finished",
    }
}
