//! Terminal front end: reads keystroke lines, drives the engine and renders
//! the display after every line.

use crate::calculator::{CalculatorEngine, HistoryEntry, State};
use crate::clipboard::copy_display;
use crate::input::parse_keystrokes;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const HELP: &str = "\
Keys: 0-9 . + - * / ^ = (or Enter)
Functions: sqrt sin cos tan log ln factorial (or !)
Constants: pi e
Editing: c (clear)  ce (clear entry)  bs (backspace)  neg (toggle sign)
Commands: :history  :recall N  :clear-history  :copy  :help  :quit";

/// Front-end options.
#[derive(Debug, Clone, Copy)]
pub struct ReplOptions {
    /// Clear an error this long after it was shown.
    pub error_reset: Option<Duration>,
    pub show_pending: bool,
}

/// What the loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive session around a [`CalculatorEngine`].
pub struct Repl<W: Write> {
    engine: CalculatorEngine,
    options: ReplOptions,
    out: W,
    /// When the current error was first shown.
    error_shown_at: Option<Instant>,
}

impl<W: Write> Repl<W> {
    pub fn new(engine: CalculatorEngine, options: ReplOptions, out: W) -> Self {
        Self {
            engine,
            options,
            out,
            error_shown_at: None,
        }
    }

    pub fn engine(&self) -> &CalculatorEngine {
        &self.engine
    }

    /// Read lines until EOF or `:quit`.
    pub fn run(&mut self, input: impl BufRead) -> Result<()> {
        writeln!(self.out, "calcpro - type :help for keys")?;
        self.render()?;

        for line in input.lines() {
            let line = line.context("Failed to read input")?;
            self.auto_clear(Instant::now());
            if self.process_line(line.trim())? == Flow::Quit {
                break;
            }
        }

        info!(history = self.engine.history().len(), "Session ended");
        Ok(())
    }

    /// Clear a displayed error once its reset delay has passed.
    pub fn auto_clear(&mut self, now: Instant) {
        let (Some(shown_at), Some(delay)) = (self.error_shown_at, self.options.error_reset) else {
            return;
        };
        if now.duration_since(shown_at) >= delay {
            debug!(?delay, "Auto-clearing error");
            self.engine.clear();
            self.error_shown_at = None;
        }
    }

    fn process_line(&mut self, line: &str) -> Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        if let Some(command) = line.strip_prefix(':') {
            return self.command(command);
        }

        match parse_keystrokes(line) {
            Ok(events) => {
                for event in events {
                    self.engine.handle(event);
                }
            }
            Err(e) => {
                writeln!(self.out, "! {}", e)?;
                return Ok(Flow::Continue);
            }
        }

        self.render()?;
        Ok(Flow::Continue)
    }

    fn command(&mut self, command: &str) -> Result<Flow> {
        let mut parts = command.split_whitespace();
        match parts.next().unwrap_or_default() {
            "q" | "quit" | "exit" => return Ok(Flow::Quit),
            "h" | "help" => writeln!(self.out, "{}", HELP)?,
            "history" => self.print_history()?,
            "clear-history" => {
                self.engine.clear_history();
                writeln!(self.out, "History cleared")?;
            }
            "recall" => {
                match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                    Some(n) if n >= 1 && n <= self.engine.history().len() => {
                        self.engine.use_history_result(n - 1);
                    }
                    _ => writeln!(self.out, "! usage: :recall N (1 is newest)")?,
                }
                self.render()?;
            }
            "copy" => match copy_display(&self.engine.display()) {
                Ok(()) => writeln!(self.out, "Copied")?,
                Err(e) => {
                    warn!(error = %e, "Copy failed");
                    writeln!(self.out, "! {}", e)?;
                }
            },
            other => writeln!(self.out, "! unknown command :{}", other)?,
        }
        Ok(Flow::Continue)
    }

    fn render(&mut self) -> Result<()> {
        let display = self.engine.display();

        if self.engine.state() == State::Error {
            if self.error_shown_at.is_none() {
                self.error_shown_at = Some(Instant::now());
            }
        } else {
            self.error_shown_at = None;
        }

        if self.options.show_pending
            && let Some(pending) = self.engine.pending_expression()
        {
            writeln!(self.out, "  {}", pending)?;
        }
        if display.is_error {
            writeln!(self.out, "= {}  (press c to clear)", display.text)?;
        } else {
            writeln!(self.out, "= {}", display.text)?;
        }
        Ok(())
    }

    fn print_history(&mut self) -> Result<()> {
        if self.engine.history().is_empty() {
            writeln!(self.out, "No calculations yet")?;
            return Ok(());
        }
        let lines: Vec<String> = self
            .engine
            .history()
            .iter()
            .enumerate()
            .map(|(i, entry)| format_history_line(i + 1, entry))
            .collect();
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}

/// `"1. 5 + 3 = 8  (14:02:11)"`
pub fn format_history_line(position: usize, entry: &HistoryEntry) -> String {
    format!(
        "{}. {} = {}  ({})",
        position,
        entry.expression,
        entry.result,
        entry.timestamp.format("%H:%M:%S")
    )
}

/// Feed one keystroke string to `engine` and return the final display.
pub fn evaluate_keys(engine: &mut CalculatorEngine, keys: &str) -> Result<crate::calculator::Display> {
    let events = parse_keystrokes(keys).with_context(|| format!("Invalid keystrokes: {}", keys))?;
    for event in events {
        engine.handle(event);
    }
    Ok(engine.display())
}
