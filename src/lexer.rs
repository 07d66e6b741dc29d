//! Converts source text into a flat token stream.
//!
//! A single left-to-right pass over the bytes of the source, tracking
//! `(line, column)` as it goes. Stateless across calls: nothing survives
//! between two invocations of [`tokenize`].

use crate::error::LexError;
use crate::token::{Position, Token, TokenKind};

/// Tokenizes `source`, producing a sequence terminated by [`TokenKind::EndOfInput`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    chars: Vec<char>,
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            src: source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.position();

            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                '\n' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Newline, start));
                }
                '"' | '\'' => {
                    let text = self.read_string(c)?;
                    tokens.push(Token::new(TokenKind::Text(text), start));
                }
                c if c.is_ascii_digit() => {
                    let n = self.read_number()?;
                    tokens.push(Token::new(TokenKind::Number(n), start));
                }
                c if c.is_alphabetic() || c == '_' => {
                    let word = self.read_identifier();
                    let kind = TokenKind::keyword(&word)
                        .unwrap_or(TokenKind::Identifier(word));
                    tokens.push(Token::new(kind, start));
                }
                _ => {
                    let kind = self.read_operator(start)?;
                    tokens.push(Token::new(kind, start));
                }
            }
        }

        tokens.push(Token::new(TokenKind::EndOfInput, self.position()));
        Ok(tokens)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position();
        self.advance(); // opening quote
        let mut out = String::new();

        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString(start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        None => return Err(LexError::UnterminatedString(start)),
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some('\\') => out.push('\\'),
                        Some(c) if c == quote => out.push(quote),
                        Some(other) => out.push(other),
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> Result<f64, LexError> {
        let start_pos = self.position();
        let start = self.pos;
        let mut seen_dot = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let lexeme: String = self.chars[start..self.pos].iter().collect();
        lexeme
            .parse::<f64>()
            .map_err(|_| LexError::InvalidNumber(lexeme, start_pos))
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_operator(&mut self, start: Position) -> Result<TokenKind, LexError> {
        let two: Option<(char, char)> = self.peek().zip(self.peek_at(1));

        if let Some(kind) = two.and_then(|(a, b)| match (a, b) {
            ('=', '=') => Some(TokenKind::EqualEqual),
            ('!', '=') => Some(TokenKind::NotEqual),
            ('<', '=') => Some(TokenKind::LessEqual),
            ('>', '=') => Some(TokenKind::GreaterEqual),
            ('-', '>') => Some(TokenKind::Arrow),
            _ => None,
        }) {
            self.advance();
            self.advance();
            return Ok(kind);
        }

        let c = self.advance().expect("checked by caller");
        Ok(match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Assign,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            other => return Err(LexError::UnexpectedChar(other, start)),
        })
    }
}
