//! Tokenizer for LookML.
//!
//! Comments (`#` to end of line) are skipped but every character still
//! advances the line/column counters, so token positions are always the
//! physical positions in the original file.

use crate::error::{ParseError, ParseResult};
use std::fmt;

/// Kind of a LookML token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Bare literal: keys, names, unquoted values, numbers
    Word(String),
    /// Double-quoted string with escapes resolved
    Quoted(String),
    /// Raw text of an expression value, up to (not including) `;;`
    Expr(String),
    Colon,
    Comma,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "'{w}'"),
            TokenKind::Quoted(s) => write!(f, "string \"{s}\""),
            TokenKind::Expr(_) => write!(f, "expression"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its physical span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// Returns true for keys whose value is raw text terminated by `;;`.
pub fn is_expression_key(key: &str) -> bool {
    key == "sql"
        || key.starts_with("sql_")
        || key == "html"
        || key == "expression"
        || key == "expression_custom_filter"
}

/// Characters that end a bare word.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | ',' | '{' | '}' | '[' | ']' | '"')
}

struct Lexer<'a> {
    src: &'a str,
    path: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
}

/// Tokenize a whole file. The returned vector always ends with `Eof`.
pub fn tokenize(path: &str, src: &str) -> ParseResult<Vec<Token>> {
    let mut lexer = Lexer {
        src,
        path,
        pos: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, line: u32, column: u32) {
        self.tokens.push(Token {
            kind,
            line,
            column,
            end_line: self.line,
            end_column: self.column,
        });
    }

    fn run(&mut self) -> ParseResult<()> {
        while let Some(c) = self.peek() {
            let (line, column) = (self.line, self.column);
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '#' => self.skip_comment(),
                ':' => {
                    self.bump();
                    self.push(TokenKind::Colon, line, column);
                    if let Some(key) = self.expression_key() {
                        self.lex_expression(&key, line, column)?;
                    }
                }
                ',' => {
                    self.bump();
                    self.push(TokenKind::Comma, line, column);
                }
                '{' => {
                    self.bump();
                    self.push(TokenKind::LBrace, line, column);
                }
                '}' => {
                    self.bump();
                    self.push(TokenKind::RBrace, line, column);
                }
                '[' => {
                    self.bump();
                    self.push(TokenKind::LBracket, line, column);
                }
                ']' => {
                    self.bump();
                    self.push(TokenKind::RBracket, line, column);
                }
                '"' => self.lex_quoted(line, column)?,
                _ => self.lex_word(line, column),
            }
        }
        let (line, column) = (self.line, self.column);
        self.push(TokenKind::Eof, line, column);
        Ok(())
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// The key before the colon just pushed, if its value is an expression.
    fn expression_key(&self) -> Option<String> {
        let n = self.tokens.len();
        if n < 2 {
            return None;
        }
        match &self.tokens[n - 2].kind {
            TokenKind::Word(key) if is_expression_key(key) => Some(key.clone()),
            _ => None,
        }
    }

    fn lex_word(&mut self, line: u32, column: u32) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_delimiter(c) {
                break;
            }
            self.bump();
        }
        let word = self.src[start..self.pos].to_string();
        self.push(TokenKind::Word(word), line, column);
    }

    fn lex_quoted(&mut self, line: u32, column: u32) -> ParseResult<()> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::UnterminatedString {
                        path: self.path.to_string(),
                        line,
                        column,
                    })
                }
                Some('"') => break,
                Some('\\') => match self.peek() {
                    Some(next @ ('"' | '\\')) => {
                        self.bump();
                        value.push(next);
                    }
                    _ => value.push('\\'),
                },
                Some(c) => value.push(c),
            }
        }
        self.push(TokenKind::Quoted(value), line, column);
        Ok(())
    }

    /// Consume raw text up to `;;`. The terminator is consumed too.
    fn lex_expression(&mut self, key: &str, colon_line: u32, colon_column: u32) -> ParseResult<()> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let (line, column) = (self.line, self.column);
        let Some(offset) = self.src[self.pos..].find(";;") else {
            return Err(ParseError::UnterminatedExpression {
                path: self.path.to_string(),
                line: colon_line,
                column: colon_column,
                key: key.to_string(),
            });
        };
        let end = self.pos + offset;
        let text = self.src[self.pos..end].trim_end().to_string();
        while self.pos < end {
            self.bump();
        }
        self.bump();
        self.bump();
        self.push(TokenKind::Expr(text), line, column);
        Ok(())
    }
}

#[cfg(test)]
#[path = "lexer_test.rs"]
mod tests;
