//! # tdx-formula
//!
//! An interpreter for the TDX technical-analysis formula language, the
//! expression language used to compute trading indicators and signals over
//! tabular OHLCV time-series data.
//!
//! The pipeline is classic: [`lexer`] turns text into tokens, [`parser`]
//! builds an [`ast::Program`], and [`evaluator::Evaluator`] walks the tree
//! against a [`context::Context`] holding variables, a bound
//! [`table::DataTable`], and registered indicator functions. The
//! [`interpreter::Interpreter`] façade wires the stages together.
//!
//! ```
//! use tdx_formula::{DataTable, Interpreter, Value};
//!
//! let mut interp = Interpreter::new();
//! let table = DataTable::from_columns([
//!     ("OPEN", vec![10.0, 11.5, 11.0]),
//!     ("CLOSE", vec![11.0, 11.2, 12.0]),
//! ]).unwrap();
//! interp.bind_table(table);
//!
//! let up_day = interp.evaluate("CLOSE > OPEN").unwrap();
//! assert_eq!(up_day, Value::Bools(vec![true, false, true]));
//! ```

pub mod ast;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod table;
pub mod value;

pub use ast::{BinOp, Expr, Precedence, Program, Token, TokenKind, UnaryOp};
pub use context::Context;
pub use error::{Result, TdxError};
pub use evaluator::Evaluator;
pub use interpreter::Interpreter;
pub use lexer::{Lexer, tokenize};
pub use parser::{MAX_NESTING_DEPTH, Parser, parse};
pub use table::DataTable;
pub use value::{Value, shift};
