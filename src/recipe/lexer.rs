// src/recipe/lexer.rs

//! Shell-subset lexer for PKGBUILDs
//!
//! Splits recipe text into words the way a POSIX shell would for the small
//! part of the grammar PKGBUILD metadata uses:
//!
//! - blanks, newlines and unquoted `;` separate words
//! - `'...'` is literal, `"..."` honors `\"`, `\\`, `\$`, `` \` `` and
//!   line continuations
//! - an unquoted backslash escapes the next character; backslash-newline
//!   joins lines
//! - `#` at the start of a word comments out the rest of the line
//! - unquoted `(` and `)` are tokens of their own, except that `name=(`
//!   opens an array literal
//! - `$(...)` and `${...}` are kept verbatim inside the word
//!
//! Quotes are removed from word text. Nothing is expanded or executed.

use crate::error::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Lexical token kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A plain word
    Word(String),
    /// `name=value` or `name+=value`
    Assign {
        name: String,
        append: bool,
        value: String,
    },
    /// `name=(` or `name+=(`
    ArrayStart { name: String, append: bool },
    /// Unquoted `(` not opening an array literal
    OpenParen,
    /// Unquoted `)`
    CloseParen,
}

/// A token and the line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
        }
    }

    /// Current line number (1-based)
    pub fn line(&self) -> usize {
        self.line
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch == Some('\n') {
            self.line += 1;
        }
        ch
    }

    fn skip_blanks_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            match ch {
                ' ' | '\t' | '\r' | '\n' | ';' => {
                    self.advance();
                }
                '#' => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '\\' => {
                    // Only a line continuation counts as blank
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'\n') {
                        self.advance();
                        self.advance();
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Next token, or `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_blanks_and_comments();
        let line = self.line;

        let kind = match self.chars.peek() {
            None => return Ok(None),
            Some('(') => {
                self.advance();
                TokenKind::OpenParen
            }
            Some(')') => {
                self.advance();
                TokenKind::CloseParen
            }
            Some(_) => self.read_word()?,
        };

        Ok(Some(Token { kind, line }))
    }

    fn read_word(&mut self) -> Result<TokenKind> {
        let mut text = String::new();
        // Whether everything read so far was unquoted and unescaped
        let mut plain = true;
        let mut assignment: Option<(String, bool)> = None;

        while let Some(&ch) = self.chars.peek() {
            match ch {
                ' ' | '\t' | '\r' | '\n' | ';' | ')' => break,
                '(' => {
                    if let Some((name, append)) = assignment.take() {
                        if text.is_empty() {
                            self.advance();
                            return Ok(TokenKind::ArrayStart { name, append });
                        }
                        assignment = Some((name, append));
                    }
                    break;
                }
                '\'' => {
                    plain = false;
                    self.read_single_quoted(&mut text)?;
                }
                '"' => {
                    plain = false;
                    self.read_double_quoted(&mut text)?;
                }
                '\\' => {
                    plain = false;
                    self.advance();
                    match self.advance() {
                        Some('\n') => {}
                        Some(escaped) => text.push(escaped),
                        None => text.push('\\'),
                    }
                }
                '$' => {
                    plain = false;
                    self.advance();
                    text.push('$');
                    match self.chars.peek() {
                        Some('(') => self.read_balanced('(', ')', "command substitution", &mut text)?,
                        Some('{') => self.read_balanced('{', '}', "parameter expansion", &mut text)?,
                        _ => {}
                    }
                }
                '=' if assignment.is_none() && plain => {
                    self.advance();
                    let (name, append) = match text.strip_suffix('+') {
                        Some(name) => (name.to_string(), true),
                        None => (text.clone(), false),
                    };
                    if is_name(&name) {
                        assignment = Some((name, append));
                        text.clear();
                    } else {
                        plain = false;
                        text.push('=');
                    }
                }
                _ => {
                    self.advance();
                    text.push(ch);
                }
            }
        }

        Ok(match assignment {
            Some((name, append)) => TokenKind::Assign {
                name,
                append,
                value: text,
            },
            None => TokenKind::Word(text),
        })
    }

    fn read_single_quoted(&mut self, text: &mut String) -> Result<()> {
        let start = self.line;
        self.advance();
        loop {
            match self.advance() {
                Some('\'') => return Ok(()),
                Some(ch) => text.push(ch),
                None => {
                    return Err(Error::Unterminated {
                        construct: "single-quoted string",
                        line: start,
                    });
                }
            }
        }
    }

    fn read_double_quoted(&mut self, text: &mut String) -> Result<()> {
        let start = self.line;
        self.advance();
        loop {
            match self.advance() {
                Some('"') => return Ok(()),
                Some('\\') => match self.chars.peek() {
                    Some('\n') => {
                        self.advance();
                    }
                    Some(&escaped @ ('"' | '\\' | '$' | '`')) => {
                        self.advance();
                        text.push(escaped);
                    }
                    _ => text.push('\\'),
                },
                Some(ch) => text.push(ch),
                None => {
                    return Err(Error::Unterminated {
                        construct: "double-quoted string",
                        line: start,
                    });
                }
            }
        }
    }

    /// Copy a `$(...)` or `${...}` group verbatim, tracking nesting
    fn read_balanced(
        &mut self,
        open: char,
        close: char,
        construct: &'static str,
        text: &mut String,
    ) -> Result<()> {
        let start = self.line;
        let mut depth = 0usize;
        loop {
            match self.advance() {
                Some(ch) => {
                    text.push(ch);
                    if ch == open {
                        depth += 1;
                    } else if ch == close {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(());
                        }
                    }
                }
                None => {
                    return Err(Error::Unterminated {
                        construct,
                        line: start,
                    });
                }
            }
        }
    }
}

/// Whether `name` is a valid variable name (`\w+`)
pub fn is_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
