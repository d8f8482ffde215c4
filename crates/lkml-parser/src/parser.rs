//! Recursive-descent parser turning tokens into a [`Document`].
//!
//! The grammar is shape-driven: any `key: name { ... }` becomes a block
//! whatever the key is, so unknown kinds parse like known ones.

use crate::error::{ParseError, ParseResult};
use crate::lexer::{tokenize, Token, TokenKind};
use lkml_core::{Block, BlockKind, Document, Property, SourceLocation, Value};

/// Deepest block/list nesting followed before the file is rejected.
pub const MAX_NESTING: usize = 64;

/// Parse one file into a [`Document`].
///
/// Never panics on malformed input; the first syntax error is returned.
pub fn parse_document(path: &str, text: &str) -> ParseResult<Document> {
    let tokens = tokenize(path, text)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        path,
        depth: 0,
    };
    let (properties, blocks) = parser.parse_items(None)?;
    log::debug!(
        "Parsed {}: {} top-level blocks, {} properties",
        path,
        blocks.len(),
        properties.len()
    );
    Ok(Document {
        path: path.to_string(),
        properties,
        blocks,
    })
}

/// Block currently being parsed, used to explain unterminated blocks.
struct OpenBlock<'a> {
    keyword: &'a str,
    line: u32,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    path: &'a str,
    /// Open blocks and lists around the current token
    depth: usize,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &'a Token {
        // tokenize() always ends with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &'a TokenKind {
        &self.cur().kind
    }

    fn peek_next(&self) -> &'a TokenKind {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> &'a Token {
        let t = self.cur();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, expected: impl Into<String>) -> ParseError {
        let t = self.cur();
        ParseError::Unexpected {
            path: self.path.to_string(),
            line: t.line,
            column: t.column,
            expected: expected.into(),
            found: t.kind.to_string(),
        }
    }

    fn location(&self, start: &Token, end: &Token) -> SourceLocation {
        SourceLocation {
            path: self.path.to_string(),
            line: start.line,
            column: start.column,
            end_line: end.end_line,
            end_column: end.end_column,
        }
    }

    /// Step into a block or list opened by the current token.
    fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            let t = self.cur();
            return Err(ParseError::NestingTooDeep {
                path: self.path.to_string(),
                line: t.line,
                column: t.column,
                max_depth: MAX_NESTING,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn previous(&self) -> &'a Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    fn expect_colon(&mut self) -> ParseResult<()> {
        if self.peek() == &TokenKind::Colon {
            self.advance();
            Ok(())
        } else {
            Err(self.err("':'"))
        }
    }

    /// Parse `key: ...` items until the closing brace of `open` (or end of
    /// input at top level).
    fn parse_items(&mut self, open: Option<&OpenBlock<'_>>) -> ParseResult<(Vec<Property>, Vec<Block>)> {
        let mut properties = Vec::new();
        let mut blocks = Vec::new();
        loop {
            match (self.peek(), open) {
                (TokenKind::Eof, None) => break,
                (TokenKind::Eof, Some(block)) => {
                    return Err(self.err(format!(
                        "'}}' closing {} opened at line {}",
                        block.keyword, block.line
                    )))
                }
                (TokenKind::RBrace, Some(_)) => break,
                (TokenKind::Word(_), _) => match self.parse_item()? {
                    Item::Property(p) => properties.push(p),
                    Item::Block(b) => blocks.push(b),
                },
                _ => return Err(self.err("a property name")),
            }
        }
        Ok((properties, blocks))
    }

    fn parse_item(&mut self) -> ParseResult<Item> {
        let key_token = self.advance();
        let TokenKind::Word(key) = &key_token.kind else {
            return Err(self.err("a property name"));
        };
        self.expect_colon()?;

        match self.peek() {
            TokenKind::LBrace => {
                let block = self.parse_block_body(key, None, key_token)?;
                let location = block.location.clone();
                Ok(Item::Property(Property {
                    name: key.clone(),
                    value: Value::Block(Box::new(block)),
                    location,
                }))
            }
            TokenKind::LBracket => {
                let value = self.parse_list()?;
                Ok(Item::Property(Property {
                    name: key.clone(),
                    value,
                    location: self.location(key_token, self.previous()),
                }))
            }
            TokenKind::Expr(text) => {
                self.advance();
                Ok(Item::Property(Property {
                    name: key.clone(),
                    value: Value::String(text.clone()),
                    location: self.location(key_token, self.previous()),
                }))
            }
            TokenKind::Word(name) | TokenKind::Quoted(name)
                if self.peek_next() == &TokenKind::LBrace =>
            {
                self.advance();
                let block = self.parse_block_body(key, Some(name.clone()), key_token)?;
                Ok(Item::Block(block))
            }
            TokenKind::Word(_) | TokenKind::Quoted(_) => {
                let value = self.parse_scalar()?;
                Ok(Item::Property(Property {
                    name: key.clone(),
                    value,
                    location: self.location(key_token, self.previous()),
                }))
            }
            _ => Err(self.err(format!("a value for '{key}'"))),
        }
    }

    /// Parse `{ items }`; the current token is the opening brace.
    fn parse_block_body(
        &mut self,
        keyword: &str,
        name: Option<String>,
        start: &Token,
    ) -> ParseResult<Block> {
        self.enter()?;
        self.advance(); // '{'
        let open = OpenBlock {
            keyword,
            line: start.line,
        };
        let (properties, children) = self.parse_items(Some(&open))?;
        let end = self.advance(); // '}'
        self.depth -= 1;
        Ok(Block {
            kind: BlockKind::from_keyword(keyword),
            name,
            properties,
            children,
            location: self.location(start, end),
        })
    }

    /// Parse `[ item, ... ]`; the current token is the opening bracket.
    fn parse_list(&mut self) -> ParseResult<Value> {
        self.enter()?;
        let open = self.advance();
        let mut items = Vec::new();
        loop {
            if self.peek() == &TokenKind::RBracket {
                self.advance();
                break;
            }
            if self.peek() == &TokenKind::Eof {
                return Err(self.err(format!("']' closing list opened at line {}", open.line)));
            }
            items.push(self.parse_list_item()?);
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBracket => {}
                _ => return Err(self.err("',' or ']'")),
            }
        }
        self.depth -= 1;
        Ok(Value::List(items))
    }

    fn parse_list_item(&mut self) -> ParseResult<Value> {
        match self.peek() {
            TokenKind::LBracket => self.parse_list(),
            TokenKind::Word(key) | TokenKind::Quoted(key) if self.peek_next() == &TokenKind::Colon => {
                self.advance();
                self.advance();
                let value = match self.peek() {
                    TokenKind::LBracket => self.parse_list()?,
                    _ => self.parse_scalar()?,
                };
                Ok(Value::Pair {
                    key: key.clone(),
                    value: Box::new(value),
                })
            }
            _ => self.parse_scalar(),
        }
    }

    fn parse_scalar(&mut self) -> ParseResult<Value> {
        match self.peek() {
            TokenKind::Word(w) => {
                self.advance();
                Ok(scalar_from_word(w))
            }
            TokenKind::Quoted(s) => {
                self.advance();
                Ok(Value::String(s.clone()))
            }
            _ => Err(self.err("a value")),
        }
    }
}

enum Item {
    Property(Property),
    Block(Block),
}

/// Interpret a bare word: `yes`/`no`, numbers, otherwise a string.
fn scalar_from_word(word: &str) -> Value {
    match word {
        "yes" => return Value::Bool(true),
        "no" => return Value::Bool(false),
        _ => {}
    }
    if looks_numeric(word) {
        if let Ok(n) = word.parse::<f64>() {
            return Value::Number(n);
        }
    }
    Value::String(word.to_string())
}

/// Guard against `f64::from_str` accepting words like `inf` or `NaN`.
fn looks_numeric(word: &str) -> bool {
    let digits = word.strip_prefix(['-', '+']).unwrap_or(word);
    digits.starts_with(|c: char| c.is_ascii_digit())
        || (digits.starts_with('.') && digits[1..].starts_with(|c: char| c.is_ascii_digit()))
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
