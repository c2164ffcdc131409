use clap::{Parser, Subcommand};
use tempo_core::Config;

mod commands;
mod logging;
mod render;
mod session;

#[derive(Parser)]
#[command(name = "tempo", version, about = "Tempo stopwatch and countdown")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive stopwatch with laps
    Stopwatch(commands::stopwatch::StopwatchArgs),
    /// Interactive countdown timer
    Countdown(commands::countdown::CountdownArgs),
    /// Format durations the way the widget displays them
    Format {
        #[command(subcommand)]
        action: commands::format::FormatAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stopwatch(args) => commands::stopwatch::run(args, &load_config()),
        Commands::Countdown(args) => commands::countdown::run(args, &load_config()),
        Commands::Format { action } => {
            logging::init_logging(&Config::default().logging.level);
            commands::format::run(action)
        }
        Commands::Config { action } => {
            // The config commands load the file themselves and report errors.
            logging::init_logging(&Config::default().logging.level);
            commands::config::run(action)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Load the config for an interactive session and install logging at its
/// level. An unusable config falls back to defaults with a warning.
fn load_config() -> Config {
    match Config::load() {
        Ok(config) => {
            logging::init_logging(&config.logging.level);
            config
        }
        Err(e) => {
            let config = Config::default();
            logging::init_logging(&config.logging.level);
            tracing::warn!(error = %e, "using default configuration");
            config
        }
    }
}
