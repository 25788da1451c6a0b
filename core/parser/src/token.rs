//! FILENAME: core/parser/src/token.rs
//! PURPOSE: Token definitions for the range reference lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and grouped by the
//! sequence builder into literal runs and reference nodes. Every token keeps the
//! character span it was read from, so the source text can be rebuilt exactly.

/// Tokens recognized by the range reference lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    /// A complete range reference: A1, $A$1:B2, Sheet1!A:A, [Book]'My Sheet'!1:3.
    /// Holds the reference text exactly as typed.
    Reference(String),

    // Literals
    Number(String),
    String(String),
    Identifier(String),
    /// Quoted identifier not followed by '!': 'Sheet Name'
    QuotedIdentifier(String),
    Whitespace(String),

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Caret,
    Ampersand,
    Percent,
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    /// Sheet reference separator: !
    Exclamation,
    /// Absolute reference marker: $
    Dollar,

    // Special
    EOF,
    Illegal(char),
}

impl Token {
    pub fn is_reference(&self) -> bool {
        matches!(self, Token::Reference(_))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Reference(s) => write!(f, "REF({})", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::QuotedIdentifier(s) => write!(f, "'{}'", s),
            Token::Whitespace(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Asterisk => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Ampersand => write!(f, "&"),
            Token::Percent => write!(f, "%"),
            Token::Equals => write!(f, "="),
            Token::NotEqual => write!(f, "<>"),
            Token::LessThan => write!(f, "<"),
            Token::GreaterThan => write!(f, ">"),
            Token::LessEqual => write!(f, "<="),
            Token::GreaterEqual => write!(f, ">="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Exclamation => write!(f, "!"),
            Token::Dollar => write!(f, "$"),
            Token::EOF => write!(f, "EOF"),
            Token::Illegal(c) => write!(f, "ILLEGAL({})", c),
        }
    }
}

/// A token together with the character offsets `[start, end)` it covers.
#[derive(Debug, PartialEq, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

impl SpannedToken {
    pub fn new(token: Token, start: usize, end: usize) -> Self {
        SpannedToken { token, start, end }
    }
}
