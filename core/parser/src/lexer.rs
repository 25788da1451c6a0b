//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans raw input text and produces a stream of spanned Tokens.
//! CONTEXT: This is the first stage of the range pipeline. Unlike a formula
//! lexer it keeps whitespace as tokens and records character offsets, because
//! the sequence builder must be able to rebuild the input exactly.
//!
//! Range references are recognized as whole tokens (see `scan.rs`). Everything
//! else is lexed just far enough to keep references out of strings, quoted
//! names and function names.
//!
//! SUPPORTED OPERATORS:
//! - Single char: + - * / ^ & % ( ) { } , ; : = < > ! $
//! - Multi char: <= >= <>
//! - Quoted identifiers: 'Sheet Name'
//! - Bracketed unit prefixes: [Book1]

use thiserror::Error;

use crate::scan::{is_sheet_char, read_quoted, read_unit, scan_reference};
use crate::token::{SpannedToken, Token};

/// Lexically broken input. Offsets are character positions of the opening
/// delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated string literal at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("Unterminated quoted sheet name at offset {offset}")]
    UnterminatedQuote { offset: usize },

    #[error("Unbalanced bracket at offset {offset}")]
    UnbalancedBracket { offset: usize },
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Lexes the whole input. The EOF token is not included.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            if spanned.token == Token::EOF {
                return Ok(tokens);
            }
            tokens.push(spanned);
        }
    }

    /// Advances the lexer and returns the next token with its span.
    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        let start = self.pos;

        let Some(&ch) = self.chars.get(start) else {
            return Ok(SpannedToken::new(Token::EOF, start, start));
        };

        if self.at_word_boundary() {
            if let Some(reference) = scan_reference(&self.chars, start)? {
                self.pos = reference.end;
                let text = self.slice(start, reference.end);
                return Ok(SpannedToken::new(Token::Reference(text), start, reference.end));
            }
        }

        self.pos += 1;
        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Asterisk,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '&' => Token::Ampersand,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            ':' => Token::Colon,
            '!' => Token::Exclamation,
            '$' => Token::Dollar,
            '=' => Token::Equals,

            // Handle < and potentially <= or <>
            '<' => self.read_less_than_operator(),

            // Handle > and potentially >=
            '>' => self.read_greater_than_operator(),

            '"' => self.read_string(start)?,

            // A quoted name that was not a sheet prefix
            '\'' => {
                let (name, after) = read_quoted(&self.chars, start)?;
                self.pos = after;
                Token::QuotedIdentifier(name)
            }

            // A bracket group that did not prefix a reference (e.g. Table1[Col])
            '[' => {
                let (_, after) = read_unit(&self.chars, start)?;
                self.pos = after;
                Token::Identifier(self.slice(start, after))
            }
            ']' => return Err(LexError::UnbalancedBracket { offset: start }),

            ch if ch.is_whitespace() => self.read_whitespace(start),

            ch if ch.is_ascii_digit() || ch == '.' => self.read_number(start),

            ch if is_sheet_char(ch) || ch == '\\' => self.read_identifier(start),

            ch => Token::Illegal(ch),
        };

        Ok(SpannedToken::new(token, start, self.pos))
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// A reference cannot start in the middle of a word ("1A1", "xA1").
    fn at_word_boundary(&self) -> bool {
        self.pos == 0 || !is_sheet_char(self.chars[self.pos - 1])
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Handles operators starting with '<': <, <=, <>
    fn read_less_than_operator(&mut self) -> Token {
        match self.peek() {
            Some('=') => {
                self.pos += 1;
                Token::LessEqual
            }
            Some('>') => {
                self.pos += 1;
                Token::NotEqual
            }
            _ => Token::LessThan,
        }
    }

    /// Handles operators starting with '>': >, >=
    fn read_greater_than_operator(&mut self) -> Token {
        match self.peek() {
            Some('=') => {
                self.pos += 1;
                Token::GreaterEqual
            }
            _ => Token::GreaterThan,
        }
    }

    /// Reads a double-quoted string. A doubled quote is an escaped quote.
    fn read_string(&mut self, start: usize) -> Result<Token, LexError> {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            self.pos += 1;
            if ch == '"' {
                if self.peek() == Some('"') {
                    result.push('"');
                    self.pos += 1;
                    continue;
                }
                return Ok(Token::String(result));
            }
            result.push(ch);
        }
        Err(LexError::UnterminatedString { offset: start })
    }

    fn read_whitespace(&mut self, start: usize) -> Token {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        Token::Whitespace(self.slice(start, self.pos))
    }

    fn read_number(&mut self, start: usize) -> Token {
        let mut has_dot = self.chars[start] == '.';
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.pos += 1;
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Number(self.slice(start, self.pos))
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        // Allow letters, digits, '_' and '.' as continuation characters.
        while self.peek().is_some_and(|ch| is_sheet_char(ch) || ch == '\\') {
            self.pos += 1;
        }
        Token::Identifier(self.slice(start, self.pos))
    }
}
