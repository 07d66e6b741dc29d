//! Token and position types shared by the lexer and parser.

use std::fmt;

/// A location in the source text, tracked as 1-based line and column.
///
/// # Limitations
///
/// Only the position of the *first* error in a run is ever surfaced; the
/// interpreter does not attempt to recover and continue after a lex or
/// parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    /// The position of the very first character of a source file.
    pub const START: Self = Self { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn line(self) -> u32 {
        self.line
    }

    pub fn column(self) -> u32 {
        self.column
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of a lexical token.
///
/// Literal kinds carry their own payload variant; keyword kinds are plain
/// unit variants resolved from the keyword table in [`super::lexer`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Text(String),
    Identifier(String),
    Truth,
    Falsehood,

    // Keywords
    Igni,      // if
    Elixir,    // else
    Quen,      // while
    Yrden,     // for
    Aard,      // funcdef
    Hunt,      // return
    Contract,  // let
    Mutation,  // const
    Medallion, // print
    Grimoire,  // import
    And,
    Or,
    Not,
    /// `axii` — reserved, currently unused by any production.
    Axii,

    // Operators and delimiters
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    /// Bare `!`, lexed per the single-character operator table but not
    /// produced by any grammar production — `not` is the spelling for
    /// logical negation.
    Bang,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Arrow,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,

    // Structural
    Newline,
    EndOfInput,
}

impl TokenKind {
    /// Maps a lowercase identifier lexeme to its keyword kind, if any.
    pub fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "igni" => Self::Igni,
            "elixir" => Self::Elixir,
            "quen" => Self::Quen,
            "yrden" => Self::Yrden,
            "aard" => Self::Aard,
            "hunt" => Self::Hunt,
            "contract" => Self::Contract,
            "mutation" => Self::Mutation,
            "medallion" => Self::Medallion,
            "grimoire" => Self::Grimoire,
            "truth" => Self::Truth,
            "falsehood" => Self::Falsehood,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "axii" => Self::Axii,
            _ => return None,
        })
    }
}

/// A single lexical token, tagged with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.kind, self.position)
    }
}
