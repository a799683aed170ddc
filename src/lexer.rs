use num_bigint::BigInt;
use tracing::trace;

use crate::error::{ParseError, ParseResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number(BigInt),
    Symbol(String),
    LPar,
    RPar,
    Dot,
    Quote,
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub offset: usize,
}

impl Token {
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Symbol(s) => format!("symbol {}", s),
            TokenKind::LPar => "'('".into(),
            TokenKind::RPar => "')'".into(),
            TokenKind::Dot => "'.'".into(),
            TokenKind::Quote => "quote".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

/// Pull-style supplier of tokens for the parser.
///
/// Fails on a lexical error, and when asked for another token after `Eof`
/// has already been handed out.
pub trait TokenSource {
    fn next_token(&mut self) -> ParseResult<Token>;
}

/// Tokenizer over a string slice.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            src: input.as_bytes(),
            pos: 0,
            done: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                self.pos += 1;
            }
            if self.peek() == Some(b';') {
                while let Some(c) = self.bump() {
                    if c == b'\n' {
                        break;
                    }
                }
                continue;
            }
            break;
        }
    }

    fn read_word(&mut self, start: usize) -> TokenKind {
        while matches!(self.peek(), Some(c) if is_symbol_char(c)) {
            self.pos += 1;
        }
        // Symbol characters are ASCII, so the slice is valid UTF-8.
        let word = String::from_utf8_lossy(&self.src[start..self.pos]);
        match parse_number(&word) {
            Some(n) => TokenKind::Number(n),
            None => TokenKind::Symbol(word.to_ascii_uppercase()),
        }
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> ParseResult<Token> {
        if self.done {
            return Err(ParseError::new("unexpected end of input", self.pos));
        }
        self.skip_ws_and_comments();
        let offset = self.pos;
        let kind = match self.bump() {
            None => {
                self.done = true;
                TokenKind::Eof
            }
            Some(b'(') => TokenKind::LPar,
            Some(b')') => TokenKind::RPar,
            Some(b'.') => TokenKind::Dot,
            Some(b'\'') => TokenKind::Quote,
            Some(c) if is_symbol_char(c) => self.read_word(offset),
            Some(c) => {
                let shown = if c.is_ascii() {
                    (c as char).to_string()
                } else {
                    format!("\\x{:02x}", c)
                };
                return Err(ParseError::new(
                    format!("unexpected character '{}'", shown),
                    offset,
                ));
            }
        };
        let token = Token { kind, offset };
        trace!(offset, token = %token.describe(), "token");
        Ok(token)
    }
}

fn is_symbol_char(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            b'+' | b'-' | b'*' | b'/' | b'<' | b'>' | b'=' | b'!' | b'?' | b'_' | b':'
        )
}

/// An optional sign followed by one or more decimal digits.
fn parse_number(word: &str) -> Option<BigInt> {
    let (negative, digits) = match word.as_bytes().first()? {
        b'-' => (true, &word[1..]),
        b'+' => (false, &word[1..]),
        _ => (false, word),
    };
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)?;
    Some(if negative { -magnitude } else { magnitude })
}
