use crate::ast::{BinOp, UnaryOp};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Nodes are immutable once built and exclusively own their children, so
/// the tree has no back-edges or cycles. Evaluation, printing, and any
/// other traversal dispatch by exhaustively matching on the variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Integer constant
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// Floating-point constant
    ///
    /// # Example
    /// ```text
    /// 3.14
    /// ```
    Float(f64),

    /// String constant
    ///
    /// # Example
    /// ```text
    /// "buy"
    /// ```
    String(String),

    /// Variable or data-column reference (upper-cased name)
    ///
    /// # Examples
    /// ```text
    /// CLOSE
    /// MA5
    /// ```
    Identifier(String),

    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary prefix operation (negation, logical NOT)
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Named function invocation
    ///
    /// # Example
    /// ```text
    /// MA(CLOSE, 5)
    /// ```
    Call { name: String, args: Vec<Expr> },

    /// Variable assignment; yields the assigned value
    ///
    /// # Example
    /// ```text
    /// MA5 := MA(CLOSE, 5)
    /// ```
    Assign { name: String, value: Box<Expr> },

    /// Conditional selection; only the taken branch is evaluated
    ///
    /// # Example
    /// ```text
    /// IF(CLOSE > OPEN, 1, 0)
    /// ```
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Historical-offset access: each row of `base` shifted `index` bars back
    ///
    /// # Example
    /// ```text
    /// CLOSE[1]
    /// ```
    Index { base: Box<Expr>, index: Box<Expr> },
}

/// A complete formula: zero or more statements evaluated strictly in order.
///
/// The value of the last statement is the program result; assignments made
/// by earlier statements stay visible to later ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Expr>,
}

impl Program {
    pub fn new(statements: Vec<Expr>) -> Self {
        Program { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
