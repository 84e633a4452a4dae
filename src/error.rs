//! Error and diagnostic types
//!
//! Fatal errors abort a stack computation with no partial result. Diagnostics
//! are collected alongside a successful result and never halt computation.

use std::fmt;
use thiserror::Error;

/// Invalid category tree or option configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("duplicate category name '{name}' under '{parent}'")]
    DuplicateName { parent: String, name: String },

    #[error("category name '{name}' under '{parent}' is reserved for collapsed remainders")]
    ReservedName { parent: String, name: String },

    #[error("category '{name}' has threshold {threshold}, must be in [0, 1]")]
    ThresholdOutOfRange { name: String, threshold: f64 },

    #[error("category '{name}' must define exactly one of `key`, `keys` or `children`")]
    AmbiguousPayload { name: String },

    #[error("core index {core} out of range for a run with {ncores} cores")]
    CoreOutOfRange { core: usize, ncores: usize },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Fatal errors for a stack computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StackError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("incompatible run: {0}")]
    IncompatibleRun(String),

    #[error(
        "no per-cycle-stat ('{marker}') counters found, simulation did not use the interval core model"
    )]
    MissingModel { marker: String },
}

pub type Result<T> = std::result::Result<T, StackError>;

/// Non-fatal findings collected while building a stack
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Diagnostic {
    /// Critical-path or functional-unit counter with no entry in the mapping tables.
    /// Its cycles remain in `Base`.
    UnmappedCounter { counter: String },

    /// Per-port functional-unit counter naming a unit outside the unit table.
    /// The whole counter, known units included, is left out of the split.
    UnknownFunctionalUnit { counter: String, unit: String },

    /// Reconciled category that no node of the category tree consumes
    UnusedKey { key: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmappedCounter { counter } => {
                write!(f, "counter '{}' is missing from the mapping tables", counter)
            }
            Diagnostic::UnknownFunctionalUnit { counter, unit } => write!(
                f,
                "counter '{}' names unknown functional unit '{}', whole counter skipped",
                counter, unit
            ),
            Diagnostic::UnusedKey { key } => {
                write!(f, "category '{}' is not consumed by any tree node", key)
            }
        }
    }
}
