use clap::Subcommand;
use tempo_core::{format_elapsed, format_remaining};

use super::countdown::DurationArgs;

#[derive(Subcommand)]
pub enum FormatAction {
    /// Stopwatch layout (MM:SS.CC)
    Elapsed {
        /// Milliseconds
        ms: u64,
    },
    /// Countdown layout, rounded up to whole seconds
    Remaining {
        /// Milliseconds
        ms: u64,
    },
    /// Total of the countdown duration fields, in ms and countdown layout
    Duration {
        #[command(flatten)]
        duration: DurationArgs,
    },
}

pub fn run(action: FormatAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FormatAction::Elapsed { ms } => println!("{}", format_elapsed(ms)),
        FormatAction::Remaining { ms } => println!("{}", format_remaining(ms)),
        FormatAction::Duration { duration } => {
            let total = duration.fields().unwrap_or_default().total_ms();
            println!("{} {}", total, format_remaining(total));
        }
    }
    Ok(())
}
