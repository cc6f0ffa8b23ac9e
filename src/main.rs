use anyhow::Result;
use calcpro::calculator::{CalculatorEngine, JsonFileStore, KeyValueStore, MemoryStore};
use calcpro::config::Config;
use calcpro::repl::{Repl, ReplOptions, evaluate_keys, format_history_line};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Immediate-execution scientific calculator.
#[derive(Parser, Debug)]
#[command(name = "calcpro", version, about)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the history store (overrides the config)
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,

    /// Keep history in memory only
    #[arg(long, global = true)]
    no_persist: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a keystroke string, e.g. "5+3-2=", and print the display
    Eval { keys: String },
    /// Print the stored calculation history
    History {
        /// Delete all stored entries instead
        #[arg(long)]
        clear: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "calcpro=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("CALCPRO_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    if let Some(path) = cli.history_file {
        config.history_file = Some(path);
    }
    if cli.no_persist {
        config.persist_history = false;
    }

    let store: Box<dyn KeyValueStore> = if config.persist_history {
        let path = config.history_path();
        info!(path = %path.display(), "Using history store");
        Box::new(JsonFileStore::new(path))
    } else {
        Box::new(MemoryStore::new())
    };
    let mut engine = CalculatorEngine::with_store(store);

    match cli.command {
        Some(Command::Eval { keys }) => {
            let display = evaluate_keys(&mut engine, &keys)?;
            println!("{}", display.text);
            if display.is_error {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Command::History { clear: true }) => {
            engine.clear_history();
            println!("History cleared");
        }
        Some(Command::History { clear: false }) => {
            if engine.history().is_empty() {
                println!("No calculations yet");
            }
            for (i, entry) in engine.history().iter().enumerate() {
                println!("{}", format_history_line(i + 1, entry));
            }
        }
        None => {
            let options = ReplOptions {
                error_reset: config.error_reset(),
                show_pending: config.show_pending,
            };
            let stdin = io::stdin();
            let mut repl = Repl::new(engine, options, io::stdout());
            repl.run(stdin.lock())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
