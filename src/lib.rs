//! Immediate-execution scientific calculator.
//!
//! The [`calculator`] module holds the engine; [`input`] normalizes keys into
//! engine events and [`repl`] is a terminal front end that renders the display.

pub mod calculator;
pub mod clipboard;
pub mod config;
pub mod input;
pub mod repl;

pub use calculator::{CalcError, CalculatorEngine, Display, State};
pub use config::Config;
pub use input::{InputEvent, parse_keystrokes};
