//! Immediate-execution calculator state machine.
//!
//! Operators are applied eagerly left to right with no precedence: choosing
//! a new operator first evaluates the pending one against the current input.

use super::error::{CalcError, ERROR_MARKER};
use super::format::{format_input, format_value, parse_operand, stringify};
use super::history::{History, HistoryEntry, KeyValueStore, MemoryStore};
use super::ops::{Constant, Function, Operator};
use crate::input::InputEvent;
use tracing::debug;

/// Coarse engine state, derived from the operand registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Typing an operand with no operation pending.
    Entering,
    /// An operator has been chosen and waits for its second operand.
    OperatorPending,
    /// An operation failed. Only `clear()` leaves this state.
    Error,
}

/// What the display sink should show after an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Display {
    pub text: String,
    pub is_error: bool,
}

/// The calculator: operand registers, pending operator and history.
pub struct CalculatorEngine {
    current_input: String,
    previous_operand: Option<f64>,
    pending_operator: Option<Operator>,
    awaiting_new_operand: bool,
    error: Option<CalcError>,
    history: History,
}

impl Default for CalculatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorEngine {
    /// Engine with an in-memory history that is not persisted.
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Engine whose history is loaded from and written through to `store`.
    pub fn with_store(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            current_input: "0".to_string(),
            previous_operand: None,
            pending_operator: None,
            awaiting_new_operand: false,
            error: None,
            history: History::load(store),
        }
    }

    pub fn state(&self) -> State {
        if self.error.is_some() {
            State::Error
        } else if self.pending_operator.is_some() {
            State::OperatorPending
        } else {
            State::Entering
        }
    }

    /// The failure latched by the last operation, if any.
    pub fn error(&self) -> Option<CalcError> {
        self.error
    }

    /// The raw current input, e.g. `"3."` while typing.
    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    pub fn previous_operand(&self) -> Option<f64> {
        self.previous_operand
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending_operator
    }

    pub fn awaiting_new_operand(&self) -> bool {
        self.awaiting_new_operand
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Formatted display value plus the error flag.
    pub fn display(&self) -> Display {
        match self.error {
            Some(_) => Display {
                text: ERROR_MARKER.to_string(),
                is_error: true,
            },
            None => Display {
                text: format_input(&self.current_input),
                is_error: false,
            },
        }
    }

    /// The `"<operand> <op>"` line shown above the display while an
    /// operator is pending.
    pub fn pending_expression(&self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        match (self.previous_operand, self.pending_operator) {
            (Some(operand), Some(op)) => Some(format!("{} {}", stringify(operand), op)),
            _ => None,
        }
    }

    /// Dispatch a normalized input event.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Digit(d) => self.input_digit(d),
            InputEvent::Decimal => self.input_decimal(),
            InputEvent::Operator(op) => self.input_operator(op),
            InputEvent::Equals => self.equals(),
            InputEvent::Function(func) => self.apply_function(func),
            InputEvent::Constant(c) => self.apply_constant(c),
            InputEvent::ToggleSign => self.toggle_sign(),
            InputEvent::Clear => self.clear(),
            InputEvent::ClearEntry => self.clear_entry(),
            InputEvent::Backspace => self.backspace(),
        }
    }

    /// Type a digit. Values above 9 are ignored.
    ///
    /// A digit that would push the operand past the largest finite `f64`
    /// latches [`CalcError::Overflow`] and leaves the input as it was.
    pub fn input_digit(&mut self, digit: u8) {
        if self.error.is_some() || digit > 9 {
            return;
        }

        let ch = char::from(b'0' + digit);
        if self.awaiting_new_operand {
            self.current_input = ch.to_string();
            self.awaiting_new_operand = false;
        } else if self.current_input == "0" {
            self.current_input = ch.to_string();
        } else {
            let mut extended = self.current_input.clone();
            extended.push(ch);
            if parse_operand(&extended).is_none() {
                self.fail(CalcError::Overflow);
                return;
            }
            self.current_input = extended;
        }
    }

    /// Type a decimal point. A second point in the same operand is ignored.
    pub fn input_decimal(&mut self) {
        if self.error.is_some() {
            return;
        }

        if self.awaiting_new_operand {
            self.current_input = "0.".to_string();
            self.awaiting_new_operand = false;
        } else if !self.current_input.contains('.') {
            self.current_input.push('.');
        }
    }

    /// Choose a binary operator, first evaluating any pending one.
    pub fn input_operator(&mut self, op: Operator) {
        if self.error.is_some() {
            return;
        }

        let value = match self.current_value() {
            Ok(value) => value,
            Err(e) => {
                self.fail(e);
                return;
            }
        };
        match (self.previous_operand, self.pending_operator) {
            (Some(previous), Some(pending)) => match pending.apply(previous, value) {
                Ok(result) => {
                    debug!(%pending, previous, value, result, "Applied pending operator");
                    self.previous_operand = Some(result);
                    self.current_input = stringify(result);
                }
                Err(e) => {
                    self.fail(e);
                    return;
                }
            },
            (None, _) => self.previous_operand = Some(value),
            (Some(_), None) => {}
        }

        self.pending_operator = Some(op);
        self.awaiting_new_operand = true;
    }

    /// Evaluate the pending operation and record it in the history.
    /// Does nothing when no operation is pending.
    ///
    /// The history expression shows the operands as parsed numbers, so a
    /// typed `3.` is recorded as `3`.
    pub fn equals(&mut self) {
        if self.error.is_some() {
            return;
        }
        let (Some(previous), Some(op)) = (self.previous_operand, self.pending_operator) else {
            return;
        };

        let outcome = self
            .current_value()
            .and_then(|value| Ok((value, op.apply(previous, value)?)));
        let (value, result) = match outcome {
            Ok(pair) => pair,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        let expression = format!("{} {} {}", stringify(previous), op, stringify(value));
        debug!(%expression, result, "Evaluated expression");
        self.history
            .push(HistoryEntry::new(expression, format_value(result)));

        self.current_input = stringify(result);
        self.previous_operand = None;
        self.pending_operator = None;
        self.awaiting_new_operand = true;
    }

    /// Apply a unary function to the current input and record it in the history.
    pub fn apply_function(&mut self, func: Function) {
        if self.error.is_some() {
            return;
        }

        let outcome = self
            .current_value()
            .and_then(|value| Ok((value, func.evaluate(value)?)));
        let (value, result) = match outcome {
            Ok(pair) => pair,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        let expression = format!("{}({})", func, stringify(value));
        debug!(%expression, result, "Applied function");
        self.history
            .push(HistoryEntry::new(expression, format_value(result)));

        self.current_input = stringify(result);
        self.awaiting_new_operand = true;
    }

    /// Replace the current input with a constant.
    pub fn apply_constant(&mut self, constant: Constant) {
        if self.error.is_some() {
            return;
        }

        self.current_input = stringify(constant.value());
        self.awaiting_new_operand = true;
    }

    /// Negate the current input. `"0"` is left alone.
    pub fn toggle_sign(&mut self) {
        if self.error.is_some() || self.current_input == "0" {
            return;
        }

        self.current_input = match self.current_input.strip_prefix('-') {
            Some(rest) => rest.to_string(),
            None => format!("-{}", self.current_input),
        };
    }

    /// Reset everything except the history. Also leaves the error state.
    pub fn clear(&mut self) {
        if let Some(error) = self.error.take() {
            debug!(%error, "Cleared error state");
        }
        self.current_input = "0".to_string();
        self.previous_operand = None;
        self.pending_operator = None;
        self.awaiting_new_operand = false;
    }

    /// Reset only the current input, keeping any pending operation.
    pub fn clear_entry(&mut self) {
        if self.error.is_some() {
            return;
        }
        self.current_input = "0".to_string();
    }

    /// Remove the last typed character.
    pub fn backspace(&mut self) {
        if self.error.is_some() {
            return;
        }

        self.current_input.pop();
        // Drop dangling text such as the `e-` left over from `2.5e-8`
        while !self.current_input.is_empty() && parse_operand(&self.current_input).is_none() {
            self.current_input.pop();
        }
        if self.current_input.is_empty() {
            self.current_input = "0".to_string();
        }
    }

    /// Load the result of history entry `index` (0 is newest) as the current
    /// input. Out-of-range indices are ignored.
    pub fn use_history_result(&mut self, index: usize) {
        if self.error.is_some() {
            return;
        }
        let Some(result) = self
            .history
            .get(index)
            .and_then(|entry| parse_operand(&entry.result))
        else {
            return;
        };

        self.current_input = stringify(result);
        self.awaiting_new_operand = true;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// The current input as a number. Every mutator keeps the input
    /// parseable, so an error here means the buffer was corrupted.
    fn current_value(&self) -> Result<f64, CalcError> {
        parse_operand(&self.current_input).ok_or(CalcError::InvalidInput)
    }

    /// Latch `error`. Operand registers and history stay as they were.
    fn fail(&mut self, error: CalcError) {
        debug!(%error, input = %self.current_input, "Operation failed");
        self.error = Some(error);
    }
}
