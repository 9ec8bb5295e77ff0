use thiserror::Error;

use crate::span::Pos;

pub type ExecutionResult<T = ()> = Result<T, PithError>;

/// Coarse error category, for hosts that only care about the class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Stack,
    Type,
    Name,
    Io,
}

/// An unexpected character. The lexer records it and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected character '{ch}' at line {}", pos.line)]
pub struct LexError {
    pub ch: char,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PithError {
    #[error("parse error at line {line}: {message}")]
    Parse { message: String, line: usize },

    #[error("stack underflow in '{word}'")]
    StackUnderflow { word: String },
    #[error("stack overflow (capacity {capacity})")]
    StackOverflow { capacity: usize },
    #[error("call depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },

    #[error("{word}: {message}")]
    Type { word: String, message: String },

    #[error("unknown word: {0}")]
    UnknownWord(String),
    #[error("unknown dictionary: {0}")]
    UnknownDictionary(String),
    #[error("unknown slot '{0}' in path")]
    UnknownSlot(String),
    #[error("unknown signal: {0}")]
    UnknownSignal(String),
    #[error("'{0}' is not a dictionary")]
    NotADictionary(String),

    #[error("{path}: {message}")]
    FileSystem { path: String, message: String },
}

impl PithError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::StackUnderflow { .. } | Self::StackOverflow { .. } | Self::DepthExceeded { .. } => {
                ErrorKind::Stack
            }
            Self::Type { .. } => ErrorKind::Type,
            Self::UnknownWord(_)
            | Self::UnknownDictionary(_)
            | Self::UnknownSlot(_)
            | Self::UnknownSignal(_)
            | Self::NotADictionary(_) => ErrorKind::Name,
            Self::FileSystem { .. } => ErrorKind::Io,
        }
    }

    pub fn parse(message: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
        }
    }

    pub fn type_error(word: &str, message: impl Into<String>) -> Self {
        Self::Type {
            word: word.to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: impl std::fmt::Display, err: &std::io::Error) -> Self {
        Self::FileSystem {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}
