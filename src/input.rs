//! Input normalization.
//!
//! Keyboard keys and typed keystroke strings are turned into the discrete
//! [`InputEvent`] set the engine understands.

use crate::calculator::{Constant, Function, Operator};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// A semantic calculator input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Digit(u8),
    Decimal,
    Operator(Operator),
    Equals,
    Function(Function),
    Constant(Constant),
    ToggleSign,
    Clear,
    ClearEntry,
    Backspace,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unrecognized key `{0}`")]
    UnknownKey(String),
}

lazy_static! {
    /// Single keystrokes: a digit, a symbol, or a run of letters naming a
    /// function, constant or command.
    static ref KEYSTROKE: Regex = Regex::new(
        r"\d|[A-Za-z]+|[^\s\dA-Za-z]"
    ).unwrap();
}

impl InputEvent {
    /// Map a single key or key name to an event.
    ///
    /// Key names follow browser conventions (`Enter`, `Escape`, `Backspace`)
    /// and are matched case-insensitively.
    pub fn from_key(key: &str) -> Option<Self> {
        if let Some(op) = Operator::from_symbol(key) {
            return Some(Self::Operator(op));
        }
        if let Some(func) = Function::from_name(key) {
            return Some(Self::Function(func));
        }
        if let Some(constant) = Constant::from_name(key) {
            return Some(Self::Constant(constant));
        }

        if let [b] = key.as_bytes()
            && b.is_ascii_digit()
        {
            return Some(Self::Digit(b - b'0'));
        }

        match key.to_ascii_lowercase().as_str() {
            "." | "," => Some(Self::Decimal),
            "=" | "enter" => Some(Self::Equals),
            "c" | "escape" | "esc" => Some(Self::Clear),
            "ce" | "delete" => Some(Self::ClearEntry),
            "backspace" | "bs" | "<" => Some(Self::Backspace),
            "neg" | "±" => Some(Self::ToggleSign),
            _ => None,
        }
    }
}

/// Split a keystroke string such as `"5+3-2="` or `"171 factorial"` into
/// events.
pub fn parse_keystrokes(input: &str) -> Result<Vec<InputEvent>, InputError> {
    KEYSTROKE
        .find_iter(input)
        .map(|token| {
            let key = token.as_str();
            InputEvent::from_key(key).ok_or_else(|| InputError::UnknownKey(key.to_string()))
        })
        .collect()
}
