//! Execution context: variable scopes, bound data, and registered functions.

use std::collections::HashMap;

use crate::error::{Result, TdxError};
use crate::table::DataTable;
use crate::value::Value;

/// A registered indicator function.
///
/// Implementations validate their own arguments and return typed errors,
/// which the evaluator propagates unchanged.
pub type FunctionImpl = Box<dyn Fn(&[Value]) -> Result<Value>>;

/// Everything a formula can see while it runs.
///
/// Name resolution order: variable scopes from innermost to outermost,
/// then columns of the bound table. Function names live in their own
/// namespace and never shadow variables.
pub struct Context {
    scopes: Vec<HashMap<String, Value>>,
    table: Option<DataTable>,
    functions: HashMap<String, FunctionImpl>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            scopes: vec![HashMap::new()],
            table: None,
            functions: HashMap::new(),
        }
    }

    /// Opens a nested variable scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Closes the innermost scope, discarding its variables. The global
    /// scope cannot be popped.
    pub fn pop_scope(&mut self) -> Result<()> {
        if self.scopes.len() <= 1 {
            return Err(TdxError::Runtime {
                context: "scope".to_string(),
                message: "Cannot pop the global scope".to_string(),
            });
        }
        self.scopes.pop();
        Ok(())
    }

    /// Binds `name` in the innermost scope, shadowing any outer binding
    /// and any table column of the same name.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        let name = name.to_uppercase();
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Resolves a name: scopes innermost-first, then table columns.
    pub fn get_variable(&self, name: &str) -> Result<Value> {
        let name = name.to_uppercase();
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(&name) {
                return Ok(value.clone());
            }
        }
        if let Some(table) = &self.table {
            if let Some(column) = table.column(&name) {
                return Ok(Value::Series(column.to_vec()));
            }
        }
        Err(TdxError::Name {
            name,
            available: self.available_names(),
        })
    }

    pub fn has_variable(&self, name: &str) -> bool {
        let name = name.to_uppercase();
        self.scopes.iter().any(|scope| scope.contains_key(&name))
            || self
                .table
                .as_ref()
                .is_some_and(|table| table.has_column(&name))
    }

    /// Binds a data table. Existing variables and functions are kept;
    /// column lookups now resolve against the new table.
    pub fn bind_table(&mut self, table: DataTable) {
        self.table = Some(table);
    }

    pub fn table(&self) -> Option<&DataTable> {
        self.table.as_ref()
    }

    /// Registers a function under an upper-cased name, replacing any
    /// previous registration.
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.functions
            .insert(name.to_uppercase(), Box::new(function));
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_uppercase())
    }

    /// Invokes a registered function, forwarding its result or error as-is.
    pub fn call_function(&self, name: &str, args: &[Value]) -> Result<Value> {
        let name = name.to_uppercase();
        let function = self.functions.get(&name).ok_or_else(|| TdxError::Name {
            name: name.clone(),
            available: self.available_names(),
        })?;
        function(args)
    }

    /// Every resolvable name, sorted: variables, columns, and functions.
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.keys().cloned())
            .collect();
        if let Some(table) = &self.table {
            names.extend(table.column_names());
        }
        names.extend(self.functions.keys().cloned());
        names.sort();
        names.dedup();
        names
    }

    /// Drops all variables and the bound table; registered functions stay.
    pub fn clear(&mut self) {
        self.scopes = vec![HashMap::new()];
        self.table = None;
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

#[test]
fn test_global_scope_cannot_be_popped() {
    let mut context = Context::new();
    assert!(context.pop_scope().is_err());
    context.push_scope();
    assert!(context.pop_scope().is_ok());
    assert!(context.pop_scope().is_err());
}

#[test]
fn test_scopes_shadow_columns() {
    let mut context = Context::new();
    let mut table = DataTable::new();
    table.insert_column("CLOSE", vec![1.0, 2.0]).unwrap();
    context.bind_table(table);

    assert_eq!(
        context.get_variable("close").unwrap(),
        Value::Series(vec![1.0, 2.0])
    );

    context.set_variable("close", Value::Integer(7));
    assert_eq!(context.get_variable("CLOSE").unwrap(), Value::Integer(7));
}
