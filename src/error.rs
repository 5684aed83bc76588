//! Error types for the award compilation and calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading staged data,
//! compiling awards, applying rules, or calculating pay rates.

use thiserror::Error;

/// The main error type for the engine.
///
/// Expected failure modes of the compile/calculate commands (unknown award,
/// invalid staged values) are reported through the structured outcome types;
/// `EngineError` is what the underlying operations propagate with `?` before
/// those outcomes are assembled, and what read queries and loaders return
/// directly.
///
/// # Example
///
/// ```
/// use award_compiler::error::EngineError;
///
/// let error = EngineError::AwardNotFound {
///     code: "MA999999".to_string(),
/// };
/// assert_eq!(error.to_string(), "Award not found: MA999999");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A staging dataset file could not be read or parsed.
    #[error("Failed to load staging data from '{path}': {message}")]
    StagingLoad {
        /// The path to the staging file.
        path: String,
        /// A description of the load failure.
        message: String,
    },

    /// A staging table is missing a column the engine depends on.
    ///
    /// Column-name drift between the staging producer and this engine is
    /// caught when the dataset is loaded, not deep inside a compile run.
    #[error("Staging table '{table}' is missing expected column '{column}'")]
    SchemaMismatch {
        /// The staging table with the missing column.
        table: String,
        /// The column that was expected but absent.
        column: String,
    },

    /// Award code was not found in the staging store.
    #[error("Award not found: {code}")]
    AwardNotFound {
        /// The award code that was not found.
        code: String,
    },

    /// Rule code was not found in the rule catalog.
    #[error("Rule not found: {code}")]
    RuleNotFound {
        /// The rule code that was not found.
        code: String,
    },

    /// A list/filter parameter was out of range or malformed.
    #[error("Invalid filter '{field}': {message}")]
    InvalidFilter {
        /// The filter field that was invalid.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// Another compile or calculation for the same award is in flight.
    ///
    /// Compile runs delete and re-insert the award's output rows, so two
    /// concurrent writers on one award code cannot safely interleave.
    #[error("A compile or calculation for award '{award_code}' is already in flight")]
    CompileInFlight {
        /// The contended award code.
        award_code: String,
    },

    /// The backing store failed in a way the caller cannot recover from.
    #[error("Storage failure: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Creates a storage failure error from any displayable cause.
    pub fn storage(message: impl Into<String>) -> Self {
        EngineError::Storage {
            message: message.into(),
        }
    }

    /// Returns true for faults that must abort a multi-award run instead
    /// of being recorded against one award and skipped past.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Storage { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
