//! Parse buffer and tokenizer: turn a query string into a lazy, pushback-1
//! stream of [`Token`]s.

use crate::error::{Error, ParseError};
use crate::token::{Token, TokenKind};

/// A cursor over a query string. Never backtracks implicitly; callers who
/// need to try-and-rewind must save `pos()` and call `reset_to`.
pub struct ParseBuffer {
    chars: Vec<char>,
    pos: usize,
}

impl ParseBuffer {
    pub fn new(s: &str) -> Self {
        ParseBuffer {
            chars: s.chars().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset_to(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn more(&self) -> bool {
        self.pos < self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn get(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Reads and returns a run of characters from `allowed`.
    pub fn set(&mut self, allowed: &str) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if allowed.contains(c) {
                s.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        s
    }

    pub fn space(&mut self) -> String {
        self.set(" \n\t\r")
    }

    /// Reads `literal`, case-insensitively, returning `true` on success and
    /// consuming it; returns `false` and consumes nothing otherwise.
    pub fn literal(&mut self, literal: &str) -> bool {
        let lit: Vec<char> = literal.chars().collect();
        if self.pos + lit.len() > self.chars.len() {
            return false;
        }
        let window = &self.chars[self.pos..self.pos + lit.len()];
        let matches = window
            .iter()
            .zip(lit.iter())
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase());
        if matches {
            self.pos += lit.len();
        }
        matches
    }

    pub fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }
}

const OPERATORS: &[&str] = &["=", "*", ".", "[", "]", "(", ")", ",", "<", ">"];
const KEYWORDS: &[&str] = &[
    "SELECT", "AS", "FROM", "JOIN", "ON", "WHERE", "GROUP", "BY", "ORDER", "LIMIT", "DESC", "ASC",
    "OR", "AND", "ARRAY", "TRUE", "FALSE", "INT",
];

/// Lazy tokenizer with a one-token push-back buffer.
pub struct Tokenizer {
    buf: ParseBuffer,
    pushback: Option<Token>,
}

impl Tokenizer {
    pub fn new(sql: &str) -> Self {
        Tokenizer {
            buf: ParseBuffer::new(sql),
            pushback: None,
        }
    }

    pub fn unget(&mut self, t: Token) {
        debug_assert!(self.pushback.is_none(), "tokenizer only supports one-token push-back");
        self.pushback = Some(t);
    }

    /// Returns the next token without consuming it. Repeated calls return
    /// the same token until [`Tokenizer::next`] is called.
    pub fn peek(&mut self) -> Result<Token, Error> {
        let t = self.next()?;
        if t.kind != TokenKind::End || self.pushback.is_none() {
            self.unget(t.clone());
        }
        Ok(t)
    }

    pub fn next(&mut self) -> Result<Token, Error> {
        if let Some(t) = self.pushback.take() {
            return Ok(t);
        }
        self.buf.space();
        let Some(c) = self.buf.peek() else {
            return Ok(Token::end());
        };

        if c == '\'' {
            let s = read_quote(&mut self.buf, '\'')?;
            return Ok(Token::new(TokenKind::String, s));
        }
        if c == '"' {
            let s = read_quote(&mut self.buf, '"')?;
            return Ok(Token::new(TokenKind::Identifier, s));
        }
        if c == '-' {
            let save = self.buf.pos();
            self.buf.get();
            if matches!(self.buf.peek(), Some(d) if d.is_ascii_digit()) {
                let digits = self.buf.set("0123456789");
                return Ok(Token::new(TokenKind::Number, format!("-{digits}")));
            }
            self.buf.reset_to(save);
        }
        if c.is_ascii_digit() {
            let digits = self.buf.set("0123456789");
            return Ok(Token::new(TokenKind::Number, digits));
        }
        if let Some(op) = OPERATORS.iter().find(|op| self.buf.peek() == op.chars().next()) {
            self.buf.get();
            return Ok(Token::new(TokenKind::Operator, *op));
        }

        let word = self
            .buf
            .set("0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_");
        if word.is_empty() {
            return Err(ParseError::UnexpectedTrailing { rest: self.buf.rest() }.into());
        }
        if let Some(kw) = KEYWORDS.iter().find(|kw| word.eq_ignore_ascii_case(kw)) {
            return Ok(Token::new(TokenKind::Keyword, *kw));
        }
        Ok(Token::new(TokenKind::Identifier, word))
    }

    /// Consumes the next token if it exactly matches `(kind, text)`.
    pub fn eat(&mut self, kind: TokenKind, text: &str) -> Result<bool, Error> {
        let t = self.peek()?;
        if t.kind == kind && t.text == text {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes the next token if it is the keyword `word` (case-insensitive).
    pub fn eat_keyword(&mut self, word: &str) -> Result<bool, Error> {
        let t = self.peek()?;
        if t.is_keyword(word) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn read_quote(b: &mut ParseBuffer, q: char) -> Result<String, Error> {
    if !b.literal(&q.to_string()) {
        return Err(ParseError::ExpectedChar { ch: q }.into());
    }
    let mut s = String::new();
    while b.more() {
        if b.literal("\\") {
            if let Some(c) = b.get() {
                s.push(c);
            }
            continue;
        }
        if b.peek() == Some(q) {
            break;
        }
        if let Some(c) = b.get() {
            s.push(c);
        }
    }
    if !b.literal(&q.to_string()) {
        return Err(ParseError::ExpectedChar { ch: q }.into());
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(sql: &str) -> Vec<Token> {
        let mut tr = Tokenizer::new(sql);
        let mut out = vec![];
        loop {
            let t = tr.next().unwrap();
            if t.kind == TokenKind::End {
                break;
            }
            out.push(t);
        }
        out
    }

    #[test]
    fn lexes_select_star() {
        let ts = tokens("SELECT * FROM t1");
        assert_eq!(ts[0], Token::new(TokenKind::Keyword, "SELECT"));
        assert_eq!(ts[1], Token::new(TokenKind::Operator, "*"));
        assert_eq!(ts[2], Token::new(TokenKind::Keyword, "FROM"));
        assert_eq!(ts[3], Token::new(TokenKind::Identifier, "t1"));
    }

    #[test]
    fn string_escapes() {
        let ts = tokens(r"'it\'s'");
        assert_eq!(ts[0], Token::new(TokenKind::String, "it's"));
    }

    #[test]
    fn quoted_identifier_preserves_case() {
        let ts = tokens(r#""MixedCase""#);
        assert_eq!(ts[0], Token::new(TokenKind::Identifier, "MixedCase"));
    }

    #[test]
    fn negative_number() {
        let ts = tokens("-4");
        assert_eq!(ts[0], Token::new(TokenKind::Number, "-4"));
    }

    #[test]
    fn bare_minus_is_not_a_number() {
        // no digits follow '-', so '-' itself is not one of our operators:
        // this should surface as an unexpected-trailing error from the
        // tokenizer since it isn't a recognized lexeme on its own.
        let mut tr = Tokenizer::new("- x");
        assert!(tr.next().is_err());
    }

    #[test]
    fn pushback_replays_same_token() {
        let mut tr = Tokenizer::new("SELECT 1");
        let t1 = tr.peek().unwrap();
        let t2 = tr.peek().unwrap();
        assert_eq!(t1, t2);
        let t3 = tr.next().unwrap();
        assert_eq!(t1, t3);
    }

    #[test]
    fn unexpected_trailing_characters_error() {
        let mut tr = Tokenizer::new("select 1 $$$");
        tr.next().unwrap();
        tr.next().unwrap();
        assert!(tr.next().is_err());
    }
}
