//! Token types produced by the Pith lexer.

use crate::span::Span;

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or operator word, e.g. `app`, `+`, `empty?`, `count!`.
    Word(String),
    /// Numeric literal, e.g. `42`, `-7`, `3.5`.
    Number(f64),
    /// String literal with escapes already resolved.
    String(String),

    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    End,
    If,
    Else,
    Do,
    True,
    False,
    Nil,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Word(_) => "word",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Colon => "`:`",
            Self::Dot => "`.`",
            Self::LBracket => "`[`",
            Self::RBracket => "`]`",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::End => "`end`",
            Self::If => "`if`",
            Self::Else => "`else`",
            Self::Do => "`do`",
            Self::True => "`true`",
            Self::False => "`false`",
            Self::Nil => "`nil`",
            Self::Eof => "end of input",
        }
    }

    /// Maps a reserved word to its keyword kind.
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "end" => Self::End,
            "if" => Self::If,
            "else" => Self::Else,
            "do" => Self::Do,
            "true" => Self::True,
            "false" => Self::False,
            "nil" => Self::Nil,
            _ => return None,
        };
        Some(kind)
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// The word text, if this is a `Word` token.
    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Word(w) => Some(w),
            _ => None,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line()
    }
}
