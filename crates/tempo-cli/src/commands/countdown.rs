use clap::Args;
use tempo_core::{Command, Config, DurationFields, Target};

use crate::session::{self, SessionOptions};

/// Duration fields are taken as text and parsed leniently; anything that is
/// not a non-negative number counts as zero.
#[derive(Args, Default)]
pub struct DurationArgs {
    /// Years (365 days each)
    #[arg(long, short = 'y', allow_hyphen_values = true)]
    pub years: Option<String>,
    /// Months (30 days each)
    #[arg(long, short = 'o', allow_hyphen_values = true)]
    pub months: Option<String>,
    #[arg(long, short = 'd', allow_hyphen_values = true)]
    pub days: Option<String>,
    #[arg(long, short = 'H', allow_hyphen_values = true)]
    pub hours: Option<String>,
    #[arg(long, short = 'm', allow_hyphen_values = true)]
    pub minutes: Option<String>,
    #[arg(long, short = 's', allow_hyphen_values = true)]
    pub seconds: Option<String>,
}

impl DurationArgs {
    /// `None` when no field was given at all.
    pub fn fields(&self) -> Option<DurationFields> {
        let given = [
            &self.years,
            &self.months,
            &self.days,
            &self.hours,
            &self.minutes,
            &self.seconds,
        ];
        if given.iter().all(|f| f.is_none()) {
            return None;
        }
        let text = |f: &Option<String>| f.clone().unwrap_or_default();
        Some(DurationFields::from_inputs(
            &text(&self.years),
            &text(&self.months),
            &text(&self.days),
            &text(&self.hours),
            &text(&self.minutes),
            &text(&self.seconds),
        ))
    }
}

#[derive(Args)]
pub struct CountdownArgs {
    #[command(flatten)]
    pub duration: DurationArgs,
    /// Stream every event as a JSON line instead of drawing the display
    #[arg(long)]
    pub json: bool,
    /// Do not ring the terminal bell on expiry
    #[arg(long)]
    pub no_bell: bool,
}

pub fn run(args: CountdownArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let target = Target::Countdown;
    session::run(
        SessionOptions {
            target,
            json: args.json,
            bell: config.countdown.bell && !args.no_bell,
            fields: args.duration.fields(),
            initial: vec![Command::StartOrResume { target }],
        },
        config,
    )
}
