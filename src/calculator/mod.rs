//! Calculator engine.
//!
//! This module provides:
//! - Closed operator, function and constant sets
//! - The immediate-execution evaluation state machine
//! - A bounded calculation history persisted to key-value storage
//! - Display formatting of results

mod engine;
mod error;
mod format;
mod history;
mod ops;

pub use engine::{CalculatorEngine, Display, State};
pub use error::{CalcError, ERROR_MARKER};
pub use format::{format_value, parse_operand, stringify};
pub use history::{
    HISTORY_KEY, HISTORY_LIMIT, History, HistoryEntry, JsonFileStore, KeyValueStore, MemoryStore,
    StoreError,
};
pub use ops::{Constant, FACTORIAL_LIMIT, Function, Operator};
