//! # Witcher — a tiny tree-walking scripting interpreter
//!
//! Witcher is a small, dynamically typed scripting language with
//! Witcher-themed keywords (`igni`, `quen`, `yrden`, `aard`, `hunt`, …). This
//! crate is the interpreter's core: a lexer, a recursive-descent parser, and
//! a tree-walking evaluator, exposed as a library so an embedder can drive
//! the pipeline directly instead of going through the `witcher` binary.
//!
//! ```
//! use witcher::Engine;
//!
//! let mut engine = Engine::new();
//! engine.eval(r#"medallion("Hello, Witcher!")"#).unwrap();
//! ```
//!
//! The three pipeline stages are also available individually for embedders
//! that only need tokens or a syntax tree:
//!
//! ```
//! let tokens = witcher::tokenize("contract x = 1").unwrap();
//! let program = witcher::parse(tokens).unwrap();
//! assert_eq!(program.len(), 1);
//! ```

mod ast;
mod builtins;
mod engine;
mod error;
mod lexer;
mod parser;
mod scope;
mod token;
mod value;

pub use ast::{BinOp, Expr, Program, Stmt, UnaryOp};
pub use engine::Engine;
pub use error::{LexError, ParseError, RuntimeError, WitcherError};
pub use lexer::tokenize;
pub use parser::parse;
pub use token::{Position, Token, TokenKind};
pub use value::{Bestiary, Function, Value};
