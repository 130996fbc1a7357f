//! High-level entry point tying the pipeline together.

use crate::ast::Program;
use crate::context::Context;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::lexer;
use crate::parser;
use crate::table::DataTable;
use crate::value::Value;

/// A formula interpreter with a persistent [`Context`].
///
/// Assignments made by one `evaluate` call stay visible to the next, so a
/// session can build up named intermediates:
///
/// ```
/// use tdx_formula::{DataTable, Interpreter, Value};
///
/// let mut interp = Interpreter::new();
/// let table = DataTable::from_columns([("CLOSE", vec![10.0, 11.0, 12.0])]).unwrap();
/// interp.bind_table(table);
///
/// interp.evaluate("PREV := CLOSE[1]").unwrap();
/// let result = interp.evaluate("CLOSE > PREV").unwrap();
/// assert_eq!(result, Value::Bools(vec![false, true, true]));
/// ```
pub struct Interpreter {
    context: Context,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            context: Context::new(),
        }
    }

    /// Tokenizes, parses, and evaluates `formula` against the owned context.
    pub fn evaluate(&mut self, formula: &str) -> Result<Value> {
        let program = self.parse(formula)?;
        Evaluator::new(&mut self.context).evaluate(&program)
    }

    /// Parses `formula` without evaluating it.
    pub fn parse(&self, formula: &str) -> Result<Program> {
        let tokens = lexer::tokenize(formula)?;
        parser::parse(tokens)
    }

    /// True when `formula` is syntactically well formed. Never touches the
    /// context, so an unknown column or function still validates.
    pub fn validate(&self, formula: &str) -> bool {
        self.parse(formula).is_ok()
    }

    pub fn bind_table(&mut self, table: DataTable) {
        self.context.bind_table(table);
    }

    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.context.register_function(name, function);
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
