//! # TDX Formula Language - Abstract Syntax Tree
//!
//! This module defines the tokens and Abstract Syntax Tree (AST) for the
//! TDX formula language, the expression language used by technical-analysis
//! tools to compute indicators over tabular OHLCV time-series data.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens, the operator/keyword tables, and the
//!   precedence ladder
//! - **[operators]** - Binary and unary operators
//! - **[nodes]** - Expression nodes and the top-level program
//!
//! ## Core Concepts
//!
//! ### Programs and Statements
//!
//! A formula is a sequence of statements separated by `;` or newlines.
//! Statements are either assignments or bare expressions; the last
//! statement's value is the program result:
//!
//! ```text
//! MA5 := MA(CLOSE, 5);
//! MA10 := MA(CLOSE, 10);
//! MA5 > MA10 AND VOLUME > 1000
//! ```
//!
//! ### Vectorized Values
//!
//! Column names like `CLOSE` evaluate to a whole series, one value per time
//! bar. Operators broadcast: a scalar combined with a series applies
//! elementwise, and two series combine row by row.
//!
//! ### Historical Offset
//!
//! `EXPR[n]` reads `n` bars back: `CLOSE[1]` is yesterday's close on every
//! row, with the first row padded by a missing-value marker.
//!
//! ### Case Insensitivity
//!
//! Identifiers fold to upper case during lexing, so `close`, `Close`, and
//! `CLOSE` all denote the same column.
//!
//! ## Examples
//!
//! ### Golden Cross
//!
//! ```text
//! MA(CLOSE, 5) > MA(CLOSE, 10) AND MA(CLOSE, 5)[1] <= MA(CLOSE, 10)[1]
//! ```
//!
//! ### Conditional Signal
//!
//! ```text
//! IF(CLOSE > OPEN, VOLUME, -VOLUME)
//! ```

pub mod nodes;
pub mod operators;
pub mod tokens;

pub use nodes::{Expr, Program};
pub use operators::{BinOp, UnaryOp};
pub use tokens::{DELIMITERS, OPERATORS, Precedence, Token, TokenKind, keyword};
