//! Error types for each stage of the pipeline.
//!
//! Parse-time failures ([`LexError`], [`ParseError`]) carry a [`Position`]
//! and abort the pipeline immediately. Runtime failures are a single
//! [`RuntimeError`] kind, matching `spec.md`'s two-layer error design.

use std::fmt;

use crate::token::Position;

/// Failures raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnterminatedString(Position),
    InvalidNumber(String, Position),
    UnexpectedChar(char, Position),
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedString(p) | Self::InvalidNumber(_, p) | Self::UnexpectedChar(_, p) => *p,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString(p) => write!(f, "{p}: unterminated string literal"),
            Self::InvalidNumber(lexeme, p) => write!(f, "{p}: invalid number literal '{lexeme}'"),
            Self::UnexpectedChar(c, p) => write!(f, "{p}: unexpected character '{c}'"),
        }
    }
}

impl std::error::Error for LexError {}

/// Failures raised while building the syntax tree from a token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedToken { found: String, position: Position },
    UnexpectedEndOfInput { position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnexpectedToken { position, .. } | Self::UnexpectedEndOfInput { position } => {
                *position
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, position } => {
                write!(f, "{position}: unexpected token {found}")
            }
            Self::UnexpectedEndOfInput { position } => {
                write!(f, "{position}: unexpected end of input")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A single runtime failure kind, covering every case `spec.md` §7 names:
/// undefined names, non-callables, arity mismatch, division by zero,
/// invalid indices, type mismatches, missing/circular imports.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub message: String,
    pub position: Position,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn undefined_name(name: &str, position: Position) -> Self {
        Self::new(format!("Undefined name '{name}'"), position)
    }

    pub fn not_callable(name: &str, position: Position) -> Self {
        Self::new(format!("'{name}' is not callable"), position)
    }

    pub fn arity_mismatch(name: &str, expected: usize, found: usize, position: Position) -> Self {
        Self::new(
            format!("'{name}' expects {expected} argument(s), got {found}"),
            position,
        )
    }

    pub fn division_by_zero(position: Position) -> Self {
        Self::new("Division by zero", position)
    }

    pub fn invalid_index(position: Position) -> Self {
        Self::new("Invalid index", position)
    }

    pub fn type_mismatch(message: impl Into<String>, position: Position) -> Self {
        Self::new(message.into(), position)
    }

    pub fn grimoire_not_found(path: &str, position: Position) -> Self {
        Self::new(format!("Grimoire not found: {path}"), position)
    }

    pub fn circular_import(path: &str, position: Position) -> Self {
        Self::new(format!("Circular import: {path}"), position)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Umbrella error returned by the top-level `Engine` entry points, covering
/// all three pipeline stages so an embedder can match on one type.
#[derive(Debug, Clone, PartialEq)]
pub enum WitcherError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl fmt::Display for WitcherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WitcherError {}

impl From<LexError> for WitcherError {
    fn from(e: LexError) -> Self {
        Self::Lex(e)
    }
}

impl From<ParseError> for WitcherError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<RuntimeError> for WitcherError {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}
