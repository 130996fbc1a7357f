//! Regex-driven scanner turning formula text into positioned tokens.

use regex::Regex;

use crate::ast::{DELIMITERS, OPERATORS, Token, TokenKind, keyword};
use crate::error::{Result, TdxError};

/// Tokenizes TDX formula source text.
///
/// The scan is total: it either produces the complete token sequence
/// (terminated by [`TokenKind::Eof`]) or fails with a syntax error carrying
/// the exact byte offset, line, and column of the offending character.
pub struct Lexer {
    text: String,
    position: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,

    number_re: Regex,
    string_re: Regex,
    identifier_re: Regex,
    whitespace_re: Regex,
    comment_re: Regex,
}

impl Lexer {
    pub fn new() -> Self {
        Lexer {
            text: String::new(),
            position: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            // Digits, optionally a dot with digits on both sides.
            number_re: Regex::new(r"\A\d+(?:\.\d+)?").expect("number pattern"),
            // Double-quoted, backslash escapes any following character.
            string_re: Regex::new(r#"\A"(?:[^"\\]|\\.)*""#).expect("string pattern"),
            identifier_re: Regex::new(r"\A[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern"),
            whitespace_re: Regex::new(r"\A[ \t\r]+").expect("whitespace pattern"),
            // `//` and `#` run to end of line; `{ }` blocks may span lines.
            comment_re: Regex::new(r"\A(?://[^\n]*|#[^\n]*|\{(?s:.*?)\})").expect("comment pattern"),
        }
    }

    /// Scans `text` into a token sequence ending with `Eof`.
    pub fn tokenize(&mut self, text: &str) -> Result<Vec<Token>> {
        self.text = text.to_string();
        self.position = 0;
        self.line = 1;
        self.column = 1;
        self.tokens = Vec::new();

        while self.position < self.text.len() {
            if self.skip_whitespace() {
                continue;
            }
            if self.skip_comment() {
                continue;
            }
            if self.handle_newline() {
                continue;
            }
            if self.match_number()? {
                continue;
            }
            if self.match_string() {
                continue;
            }
            if self.match_operator() {
                continue;
            }
            if self.match_delimiter() {
                continue;
            }
            if self.match_identifier() {
                continue;
            }
            return Err(self.unknown_character());
        }

        self.push_token(TokenKind::Eof);
        Ok(std::mem::take(&mut self.tokens))
    }

    fn rest(&self) -> &str {
        &self.text[self.position..]
    }

    fn push_token(&mut self, kind: TokenKind) {
        self.tokens
            .push(Token::new(kind, self.position, self.line, self.column));
    }

    // The scan helpers copy the match out of the borrowed input before
    // touching position state; a live `Match` pins `self` immutably.

    fn skip_whitespace(&mut self) -> bool {
        let Some(end) = self.whitespace_re.find(self.rest()).map(|m| m.end()) else {
            return false;
        };
        self.column += end as u32;
        self.position += end;
        true
    }

    fn skip_comment(&mut self) -> bool {
        let Some(comment) = self
            .comment_re
            .find(self.rest())
            .map(|m| m.as_str().to_string())
        else {
            return false;
        };
        let newlines = comment.matches('\n').count() as u32;
        if newlines > 0 {
            self.line += newlines;
            let tail = comment.rsplit('\n').next().unwrap_or("");
            self.column = tail.chars().count() as u32 + 1;
        } else {
            self.column += comment.chars().count() as u32;
        }
        self.position += comment.len();
        true
    }

    fn handle_newline(&mut self) -> bool {
        if self.rest().starts_with('\n') {
            self.push_token(TokenKind::Newline);
            self.line += 1;
            self.column = 1;
            self.position += 1;
            return true;
        }
        false
    }

    fn match_number(&mut self) -> Result<bool> {
        let Some(literal) = self
            .number_re
            .find(self.rest())
            .map(|m| m.as_str().to_string())
        else {
            return Ok(false);
        };
        let kind = if literal.contains('.') {
            let value = literal.parse::<f64>().map_err(|e| {
                TdxError::syntax_at(
                    format!("Invalid number '{}': {}", literal, e),
                    self.position,
                    self.line,
                    self.column,
                )
            })?;
            TokenKind::Float(value)
        } else {
            match literal.parse::<i64>() {
                Ok(value) => TokenKind::Integer(value),
                // Out of integer range: keep the value as a float.
                Err(_) => TokenKind::Float(literal.parse::<f64>().map_err(|e| {
                    TdxError::syntax_at(
                        format!("Invalid number '{}': {}", literal, e),
                        self.position,
                        self.line,
                        self.column,
                    )
                })?),
            }
        };
        self.push_token(kind);
        self.column += literal.len() as u32;
        self.position += literal.len();
        Ok(true)
    }

    fn match_string(&mut self) -> bool {
        let Some(raw) = self
            .string_re
            .find(self.rest())
            .map(|m| m.as_str().to_string())
        else {
            return false;
        };
        let value = unescape(&raw[1..raw.len() - 1]);
        self.push_token(TokenKind::String(value));
        self.column += raw.chars().count() as u32;
        self.position += raw.len();
        true
    }

    fn match_operator(&mut self) -> bool {
        for (symbol, kind) in OPERATORS {
            if self.rest().starts_with(symbol) {
                self.push_token(kind.clone());
                self.column += symbol.len() as u32;
                self.position += symbol.len();
                return true;
            }
        }
        false
    }

    fn match_delimiter(&mut self) -> bool {
        let Some(ch) = self.rest().chars().next() else {
            return false;
        };
        for (symbol, kind) in DELIMITERS {
            if ch == *symbol {
                self.push_token(kind.clone());
                self.column += 1;
                self.position += 1;
                return true;
            }
        }
        false
    }

    fn match_identifier(&mut self) -> bool {
        let Some(raw) = self
            .identifier_re
            .find(self.rest())
            .map(|m| m.as_str().to_string())
        else {
            return false;
        };
        let folded = raw.to_uppercase();
        let kind = match keyword(&folded) {
            Some(kw) => kw,
            None => TokenKind::Identifier(folded),
        };
        self.push_token(kind);
        self.column += raw.len() as u32;
        self.position += raw.len();
        true
    }

    fn unknown_character(&self) -> TdxError {
        let ch = self.rest().chars().next().unwrap_or('\0');
        TdxError::syntax_at(
            format!("Unknown character '{}'", ch),
            self.position,
            self.line,
            self.column,
        )
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Lexer::new()
    }
}

/// Decodes `\"` and `\\`; any other backslash pair is kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convenience function: tokenize `text` with a fresh lexer.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    Lexer::new().tokenize(text)
}

#[test]
fn test_keywords_fold_case() {
    let tokens = tokenize("if AND or Not").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::If);
    assert_eq!(tokens[1].kind, TokenKind::And);
    assert_eq!(tokens[2].kind, TokenKind::Or);
    assert_eq!(tokens[3].kind, TokenKind::Not);
    assert_eq!(tokens[4].kind, TokenKind::Eof);
}

#[test]
fn test_longest_operator_wins() {
    let tokens = tokenize("a <= b").unwrap();
    assert_eq!(tokens[1].kind, TokenKind::LessEqual);
    let tokens = tokenize("a < = b").unwrap();
    assert_eq!(tokens[1].kind, TokenKind::Less);
    assert_eq!(tokens[2].kind, TokenKind::Equal);
}
