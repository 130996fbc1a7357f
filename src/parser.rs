//! Precedence-climbing recursive-descent parser.

use crate::ast::{BinOp, Expr, Precedence, Program, Token, TokenKind, UnaryOp};
use crate::error::{Result, TdxError};

/// Hard ceiling on expression nesting, guarding the recursive descent
/// against stack exhaustion on pathological input.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parses a token sequence (as produced by [`crate::lexer::tokenize`])
/// into a [`Program`].
///
/// The first structural violation aborts the parse; no partial AST is
/// returned and no error recovery is attempted.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parses the whole token stream into a program.
    ///
    /// Statements may be separated by `;`, newlines, or both; blank lines
    /// produce no statement.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.check(&TokenKind::Newline) || self.check(&TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Expr> {
        if self.check_assignment() {
            return self.parse_assignment();
        }
        self.parse_expression()
    }

    /// One-token lookahead: an identifier immediately followed by `:=`.
    fn check_assignment(&self) -> bool {
        if !matches!(self.peek().kind, TokenKind::Identifier(_)) {
            return false;
        }
        matches!(
            self.tokens.get(self.current + 1).map(|t| &t.kind),
            Some(TokenKind::Assign)
        )
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let name = match self.advance().kind.clone() {
            TokenKind::Identifier(name) => name,
            _ => unreachable!("checked by check_assignment"),
        };
        self.expect(&TokenKind::Assign, "Expected ':=' after variable name")?;
        let value = self.parse_expression()?;
        Ok(Expr::Assign {
            name,
            value: Box::new(value),
        })
    }

    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_precedence(Precedence::Or)
    }

    /// Climb: parse a prefix expression, then fold infix operators while
    /// their precedence stays at or above `min`.
    fn parse_precedence(&mut self, min: Precedence) -> Result<Expr> {
        self.enter_nesting()?;

        let mut left = self.parse_prefix()?;

        while !self.is_at_end() {
            let kind = &self.peek().kind;
            if !kind.is_binary_operator() || kind.precedence() < min {
                break;
            }
            let operator = self.advance().clone();
            left = self.parse_infix(left, &operator)?;
        }

        self.depth -= 1;
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        if self.is_at_end() {
            let token = self.peek();
            return Err(TdxError::Syntax {
                message: "Unexpected end of input".to_string(),
                position: token.position,
                line: token.line,
                column: token.column,
                expected: Some(
                    "number, string, identifier, '(', '-', 'NOT', or 'IF'".to_string(),
                ),
                actual: Some("end of input".to_string()),
            });
        }
        let token = self.advance().clone();

        let mut expr = match token.kind {
            TokenKind::Integer(n) => Expr::Integer(n),
            TokenKind::Float(n) => Expr::Float(n),
            TokenKind::String(s) => Expr::String(s),
            TokenKind::Identifier(name) => self.parse_identifier_or_call(name)?,
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "Expected ')' after expression")?;
                inner
            }
            TokenKind::Minus => {
                let operand = self.parse_precedence(Precedence::Unary)?;
                Expr::Unary {
                    op: UnaryOp::Negate,
                    operand: Box::new(operand),
                }
            }
            TokenKind::Not => {
                let operand = self.parse_precedence(Precedence::Unary)?;
                Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                }
            }
            TokenKind::If => self.parse_conditional()?,
            ref kind => {
                return Err(TdxError::Syntax {
                    message: format!("Unexpected token '{}'", kind),
                    position: token.position,
                    line: token.line,
                    column: token.column,
                    expected: Some(
                        "number, string, identifier, '(', '-', 'NOT', or 'IF'".to_string(),
                    ),
                    actual: Some(kind.to_string()),
                });
            }
        };

        // Historical-offset postfix binds tighter than any operator.
        while self.check(&TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expression()?;
            self.expect(&TokenKind::RBracket, "Expected ']' after offset")?;
            expr = Expr::Index {
                base: Box::new(expr),
                index: Box::new(index),
            };
        }

        Ok(expr)
    }

    fn parse_identifier_or_call(&mut self, name: String) -> Result<Expr> {
        if !self.check(&TokenKind::LParen) {
            return Ok(Expr::Identifier(name));
        }
        self.advance();

        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }
        self.expect(&TokenKind::RParen, "Expected ')' after function arguments")?;

        Ok(Expr::Call { name, args })
    }

    /// `IF` has already been consumed.
    fn parse_conditional(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::LParen, "Expected '(' after 'IF'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::Comma, "Expected ',' after condition")?;
        let then_branch = self.parse_expression()?;
        self.expect(&TokenKind::Comma, "Expected ',' after true value")?;
        let else_branch = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "Expected ')' after false value")?;

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn parse_infix(&mut self, left: Expr, operator: &Token) -> Result<Expr> {
        let op = BinOp::from_token(&operator.kind).ok_or_else(|| TdxError::Syntax {
            message: format!("'{}' is not a binary operator", operator.kind),
            position: operator.position,
            line: operator.line,
            column: operator.column,
            expected: Some("binary operator".to_string()),
            actual: Some(operator.kind.to_string()),
        })?;

        // Left-associative operators raise the right-hand minimum one level;
        // right-associative ones keep their own level.
        let min = if operator.kind.is_right_associative() {
            operator.kind.precedence()
        } else {
            operator.kind.precedence().one_tighter()
        };
        let right = self.parse_precedence(min)?;

        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn enter_nesting(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            let token = self.peek();
            return Err(TdxError::syntax_at(
                format!("Formula nesting exceeds {} levels", MAX_NESTING_DEPTH),
                token.position,
                token.line,
                token.column,
            ));
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        // The lexer guarantees a trailing Eof token.
        self.tokens
            .get(self.current)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let token = self.peek();
        Err(TdxError::Syntax {
            message: message.to_string(),
            position: token.position,
            line: token.line,
            column: token.column,
            expected: Some(format!("'{}'", kind)),
            actual: Some(token.kind.to_string()),
        })
    }
}

/// Convenience function: parse a token sequence into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}
