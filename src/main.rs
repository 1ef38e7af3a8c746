//! tonewindow - a time-gated tone and track player
//!
//! Plays a sine tone (normal mode) or a looping track (special mode) while
//! the local hour is inside a daily window. Playback can be forced on or off
//! from the console at any time.

use std::io;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use tonewindow::cli::{read_commands, CheckArgs, Cli, Commands, ConsoleView, Display, RunArgs};
use tonewindow::scheduler::{
    Clock, Command, FixedClock, PlaybackController, PlaybackEvent, ScheduleEvaluator, SystemClock,
};
use tonewindow::sound::{discover_tracks, RodioAudioBackend};
use tonewindow::types::ScheduleCheck;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            run_console(args).await?;
        }
        Some(Commands::Check(args)) => {
            check(&args)?;
        }
        Some(Commands::Tracks(args)) => {
            Display::show_tracks(&discover_tracks(&args.assets));
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

// ============================================================================
// run
// ============================================================================

/// Runs the interactive scheduler until `quit`, Ctrl-C, or an internal error.
async fn run_console(args: RunArgs) -> Result<()> {
    let config = args.to_config();
    config.validate().map_err(|e| anyhow!(e))?;

    let backend = Rc::new(RodioAudioBackend::new(config.asset_root.clone()));
    let controller = PlaybackController::new(backend.clone(), backend);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<PlaybackEvent>();
    let (command_tx, command_rx) = mpsc::unbounded_channel::<Command>();

    let mut evaluator = ScheduleEvaluator::new(config, controller, Rc::new(SystemClock), event_tx)
        .with_acknowledged(args.yes);

    if args.yes {
        Display::show_help();
    } else {
        Display::show_greeting();
    }

    // Blocking stdin reader; left detached so an idle read never holds up exit
    let stdin_tx = command_tx.clone();
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || read_commands(io::stdin().lock(), stdin_tx))
        .context("Failed to start console input thread")?;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Ctrl-C received");
            let _ = command_tx.send(Command::Quit);
        }
    });

    let printer = tokio::spawn(print_events(event_rx, ConsoleView::new(args.yes)));

    let result = evaluator.run(command_rx).await;

    // Closing the event channel lets the printer drain and finish
    drop(evaluator);
    printer.await.context("Event printer task failed")?;

    result
}

/// Prints scheduler events until the channel closes.
async fn print_events(mut events: mpsc::UnboundedReceiver<PlaybackEvent>, mut view: ConsoleView) {
    while let Some(event) = events.recv().await {
        if let Some(line) = view.render(&event) {
            println!("{}", line);
        }
    }
}

// ============================================================================
// check
// ============================================================================

fn check(args: &CheckArgs) -> Result<()> {
    let window = args.window.to_window();
    window.validate().map_err(|e| anyhow!(e))?;

    let clock: Box<dyn Clock> = match args.hour {
        Some(hour) => Box::new(FixedClock::new(hour)),
        None => Box::new(SystemClock),
    };
    let result = ScheduleCheck::evaluate(&window, clock.current_hour());

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize check")?;
        println!("{}", json);
    } else {
        Display::show_check(&result);
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
