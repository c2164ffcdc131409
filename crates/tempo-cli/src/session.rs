//! Interactive session: stdin lines in, rendered events out.
//!
//! Everything runs on one current-thread runtime. The widget runs as its own
//! task; this module forwards parsed keystrokes to it and renders what comes
//! back until the widget shuts down.

use tempo_core::{
    Command, Config, CountdownState, DurationFields, Event, SystemClock, Target, TimerWidget,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::render::Renderer;

/// One line of user input, interpreted for the active engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Quit,
    Unknown(String),
}

pub fn parse_input(target: Target, line: &str) -> Input {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("");
    match (target, head) {
        (_, "q" | "quit") => Input::Quit,
        (_, "r" | "reset") => Input::Command(Command::Reset { target }),
        (Target::Stopwatch, "" | "s" | "start" | "pause") => {
            Input::Command(Command::Toggle { target })
        }
        (Target::Stopwatch, "l" | "lap") => Input::Command(Command::Lap),
        (Target::Countdown, "" | "p" | "pause" | "resume") => {
            Input::Command(Command::Toggle { target })
        }
        (Target::Countdown, "s" | "start") => Input::Command(Command::StartOrResume { target }),
        (Target::Countdown, "set") => {
            let fields: Vec<&str> = words.collect();
            let field = |i: usize| fields.get(i).copied().unwrap_or("");
            Input::Command(Command::SetDurationFields {
                fields: DurationFields::from_inputs(
                    field(0),
                    field(1),
                    field(2),
                    field(3),
                    field(4),
                    field(5),
                ),
            })
        }
        _ => Input::Unknown(line.trim().to_string()),
    }
}

pub struct SessionOptions {
    pub target: Target,
    pub json: bool,
    pub bell: bool,
    /// Countdown fields to mount with, overriding the configured default.
    pub fields: Option<DurationFields>,
    /// Commands sent before any input is read.
    pub initial: Vec<Command>,
}

pub fn run(options: SessionOptions, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(drive(options, config));
    // Stdin reads are blocking; don't wait for a pending line on exit.
    runtime.shutdown_background();
    result
}

async fn drive(options: SessionOptions, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(16);
    let (event_tx, mut events) = mpsc::channel::<Event>(256);
    let mut config = config.clone();
    if let Some(fields) = options.fields {
        config.countdown.default_duration = fields;
    }
    let widget = TimerWidget::new(SystemClock, &config);
    tokio::spawn(widget.run(cmd_rx, event_tx));

    for command in options.initial {
        cmd_tx.send(command).await?;
    }

    let (input_tx, mut inputs) = mpsc::channel::<Input>(16);
    let target = options.target;
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if input_tx.send(parse_input(target, &line)).await.is_err() {
                break;
            }
        }
    });

    let renderer = Renderer::new(options.json, options.bell);
    let mut stdin_open = true;
    let mut countdown_state: Option<CountdownState> = None;

    loop {
        tokio::select! {
            input = inputs.recv(), if stdin_open => match input {
                Some(Input::Command(command)) => {
                    let _ = cmd_tx.send(command).await;
                }
                Some(Input::Unknown(text)) => {
                    tracing::warn!(input = %text, "unrecognized input");
                    eprintln!("{}", help(target));
                }
                Some(Input::Quit) => {
                    let _ = cmd_tx.send(Command::Shutdown).await;
                }
                None => {
                    stdin_open = false;
                    // Without input a stopwatch can never be stopped, and a
                    // countdown only has something to wait for while running.
                    if target == Target::Stopwatch || countdown_idle(countdown_state) {
                        let _ = cmd_tx.send(Command::Shutdown).await;
                    }
                }
            },
            event = events.recv() => {
                let Some(event) = event else { break };
                renderer.render(&event);
                match &event {
                    Event::CountdownExpired { .. } => {
                        let _ = cmd_tx.send(Command::Shutdown).await;
                    }
                    Event::CountdownSnapshot { state, .. } => {
                        countdown_state = Some(*state);
                        if !stdin_open && countdown_idle(countdown_state) {
                            let _ = cmd_tx.send(Command::Shutdown).await;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    if !options.json {
        println!();
    }
    Ok(())
}

/// A countdown that has reported a state other than running.
fn countdown_idle(state: Option<CountdownState>) -> bool {
    matches!(state, Some(s) if s != CountdownState::Running)
}

fn help(target: Target) -> &'static str {
    match target {
        Target::Stopwatch => "keys: <enter>/s start-pause, l lap, r reset, q quit",
        Target::Countdown => {
            "keys: <enter>/p pause-resume, s start, r reset, set Y MO D H M S, q quit"
        }
    }
}
