use std::fmt;

/// Lexical token kind.
///
/// Literal-carrying variants hold their decoded payload; identifiers and
/// keywords are upper-cased by the lexer, so `close` and `CLOSE` arrive
/// here as the same name.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 1000
    /// ```
    Integer(i64),

    /// Floating-point literal (digits on both sides of the dot)
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Float(f64),

    /// String literal enclosed in double quotes, `\"` and `\\` escapes
    String(String),

    /// Variable, column, or function name (upper-cased)
    ///
    /// # Examples
    /// ```text
    /// CLOSE
    /// MA
    /// MY_VAR
    /// ```
    Identifier(String),

    // Arithmetic operators
    /// Addition (`+`)
    Plus,
    /// Subtraction or unary negation (`-`)
    Minus,
    /// Multiplication (`*`)
    Star,
    /// Division (`/`)
    Slash,
    /// Modulo (`%`)
    Percent,
    /// Power (`^`), right-associative
    Caret,

    // Comparison operators
    /// Equality (`=`)
    Equal,
    /// Inequality (`<>` or `!=`)
    NotEqual,
    /// Greater than (`>`)
    Greater,
    /// Less than (`<`)
    Less,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than or equal (`<=`)
    LessEqual,

    // Logical keywords
    /// Logical AND (word, not symbol)
    And,
    /// Logical OR (word, not symbol)
    Or,
    /// Logical NOT (word, not symbol), right-associative prefix
    Not,

    /// Assignment (`:=`), handled at the statement level
    Assign,

    /// Conditional keyword: `IF(cond, then, else)`
    If,

    // Delimiters
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Left bracket for historical-offset access
    LBracket,
    /// Right bracket
    RBracket,
    /// Argument separator
    Comma,
    /// Statement separator
    Semicolon,

    // Structural
    /// Statement-separating newline (kept as a token)
    Newline,
    /// End of input
    Eof,
}

/// Binding strength levels, loosest to tightest.
///
/// The parser's climb loop consumes an infix operator only while its
/// precedence is at least the current minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Power,
    Primary,
}

impl Precedence {
    /// The next-tighter level, used as the right-hand minimum for
    /// left-associative operators (right-associative ones reuse their own
    /// level, which is what makes `2 ^ 3 ^ 4` nest to the right).
    pub fn one_tighter(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Power,
            Precedence::Power | Precedence::Primary => Precedence::Primary,
        }
    }
}

impl TokenKind {
    pub fn precedence(&self) -> Precedence {
        match self {
            TokenKind::Or => Precedence::Or,
            TokenKind::And => Precedence::And,
            TokenKind::Equal | TokenKind::NotEqual => Precedence::Equality,
            TokenKind::Greater
            | TokenKind::Less
            | TokenKind::GreaterEqual
            | TokenKind::LessEqual => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
            TokenKind::Not => Precedence::Unary,
            TokenKind::Caret => Precedence::Power,
            _ => Precedence::None,
        }
    }

    pub fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Caret
                | TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::Greater
                | TokenKind::Less
                | TokenKind::GreaterEqual
                | TokenKind::LessEqual
                | TokenKind::And
                | TokenKind::Or
        )
    }

    pub fn is_unary_operator(&self) -> bool {
        matches!(self, TokenKind::Minus | TokenKind::Not)
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, TokenKind::Caret | TokenKind::Not)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Integer(n) => write!(f, "{}", n),
            TokenKind::Float(n) => write!(f, "{}", n),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::NotEqual => write!(f, "<>"),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::Less => write!(f, "<"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::And => write!(f, "AND"),
            TokenKind::Or => write!(f, "OR"),
            TokenKind::Not => write!(f, "NOT"),
            TokenKind::Assign => write!(f, ":="),
            TokenKind::If => write!(f, "IF"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with its source location (byte offset of the first
/// character plus 1-based line and column).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize, line: u32, column: u32) -> Self {
        Token {
            kind,
            position,
            line,
            column,
        }
    }
}

/// Operator spellings, longest first so `<=` is never split into `<` `=`.
pub const OPERATORS: &[(&str, TokenKind)] = &[
    ("<>", TokenKind::NotEqual),
    ("!=", TokenKind::NotEqual),
    (">=", TokenKind::GreaterEqual),
    ("<=", TokenKind::LessEqual),
    (":=", TokenKind::Assign),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("^", TokenKind::Caret),
    ("=", TokenKind::Equal),
    (">", TokenKind::Greater),
    ("<", TokenKind::Less),
];

pub const DELIMITERS: &[(char, TokenKind)] = &[
    ('(', TokenKind::LParen),
    (')', TokenKind::RParen),
    ('[', TokenKind::LBracket),
    (']', TokenKind::RBracket),
    (',', TokenKind::Comma),
    (';', TokenKind::Semicolon),
];

/// Keyword lookup for an already upper-cased identifier.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "IF" => Some(TokenKind::If),
        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "NOT" => Some(TokenKind::Not),
        _ => None,
    }
}
