use clap::Args;
use tempo_core::{Command, Config, Target};

use crate::session::{self, SessionOptions};

#[derive(Args)]
pub struct StopwatchArgs {
    /// Stream every event as a JSON line instead of drawing the display
    #[arg(long)]
    pub json: bool,
    /// Mount paused instead of starting immediately
    #[arg(long)]
    pub paused: bool,
}

pub fn run(args: StopwatchArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let target = Target::Stopwatch;
    let initial = if args.paused {
        Vec::new()
    } else {
        vec![Command::StartOrResume { target }]
    };
    session::run(
        SessionOptions {
            target,
            json: args.json,
            bell: false,
            fields: None,
            initial,
        },
        config,
    )
}
