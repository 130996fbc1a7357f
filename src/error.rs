//! Typed errors shared by the lexer, parser, and evaluator.

use thiserror::Error;

/// Result type for formula operations
pub type Result<T> = std::result::Result<T, TdxError>;

/// Errors raised while lexing, parsing, or evaluating a formula.
///
/// Lexer and parser failures abort the whole call with no partial output;
/// evaluator failures abort the current `evaluate` but leave assignments
/// made by earlier statements visible in the context.
#[derive(Debug, Error)]
pub enum TdxError {
    /// Invalid structure or an unrecognized character in the source text
    #[error("Syntax error: {message} at line {line}, column {column}")]
    Syntax {
        message: String,
        position: usize,
        line: u32,
        column: u32,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// Identifier or function name that resolves to nothing
    #[error("Name '{name}' is not defined")]
    Name {
        name: String,
        available: Vec<String>,
    },

    /// Operand or argument of the wrong value category
    #[error("Type error: {0}")]
    Type(String),

    /// Value outside its allowed range (bad period, length mismatch, ...)
    #[error("Value error: {0}")]
    Value(String),

    /// Function call with too few or too many arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    Argument {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Catch-all for failures during evaluation, naming the operator or
    /// function that produced them
    #[error("Runtime error in '{context}': {message}")]
    Runtime { context: String, message: String },
}

impl TdxError {
    /// Syntax error at an explicit source location.
    pub fn syntax_at(
        message: impl Into<String>,
        position: usize,
        line: u32,
        column: u32,
    ) -> TdxError {
        TdxError::Syntax {
            message: message.into(),
            position,
            line,
            column,
            expected: None,
            actual: None,
        }
    }

    /// A "did you mean" hint for name errors, matching by substring the way
    /// an interactive formula editor would.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            TdxError::Name { name, available } => {
                let lower = name.to_lowercase();
                let matches: Vec<&str> = available
                    .iter()
                    .filter(|cand| {
                        let c = cand.to_lowercase();
                        c.contains(&lower) || lower.contains(&c)
                    })
                    .take(3)
                    .map(String::as_str)
                    .collect();
                if matches.is_empty() {
                    None
                } else {
                    Some(format!("Did you mean: {}?", matches.join(", ")))
                }
            }
            TdxError::Syntax {
                expected: Some(expected),
                actual: Some(actual),
                ..
            } => Some(format!("Expected {}, but got '{}'", expected, actual)),
            _ => None,
        }
    }
}
