// src/recipe/tokenizer.rs

//! Assignment extraction from PKGBUILD tokens
//!
//! Turns the lexer's token stream into assignment events:
//!
//! - `name=value` becomes a scalar assignment
//! - `name=(` through the matching `)` becomes one array assignment,
//!   however many lines and words the literal spans
//! - everything between a standalone `{` and the next standalone `}` is a
//!   function body and is dropped unread
//!
//! Any other word (commands, function names, stray parens) is ignored.
//! Brace handling is a flat toggle: a `}` always ends the body, even if a
//! nested `{` was seen inside it.

use crate::error::{Error, Result};
use crate::recipe::lexer::{Lexer, Token, TokenKind};
use tracing::trace;

/// Right-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedValue {
    Scalar(String),
    Array(Vec<String>),
}

/// One variable assignment found at the top level of a recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    /// `+=` rather than `=`
    pub append: bool,
    pub value: AssignedValue,
    pub line: usize,
}

/// Iterator over the top-level assignments of a recipe
pub struct Tokenizer<'a> {
    lexer: Lexer<'a>,
    /// Line of the `{` that opened the function body being skipped
    function_start: Option<usize>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            function_start: None,
            done: false,
        }
    }

    fn next_assignment(&mut self) -> Result<Option<Assignment>> {
        while let Some(Token { kind, line }) = self.lexer.next_token()? {
            if let Some(start) = self.function_start {
                if matches!(&kind, TokenKind::Word(word) if word == "}") {
                    trace!("Skipped function body on lines {}-{}", start, line);
                    self.function_start = None;
                }
                continue;
            }

            match kind {
                TokenKind::Word(word) if word == "{" => self.function_start = Some(line),
                TokenKind::Assign {
                    name,
                    append,
                    value,
                } => {
                    return Ok(Some(Assignment {
                        name,
                        append,
                        value: AssignedValue::Scalar(value),
                        line,
                    }));
                }
                TokenKind::ArrayStart { name, append } => {
                    let elements = self.read_array(line)?;
                    return Ok(Some(Assignment {
                        name,
                        append,
                        value: AssignedValue::Array(elements),
                        line,
                    }));
                }
                _ => {}
            }
        }

        match self.function_start {
            Some(line) => Err(Error::Unterminated {
                construct: "function body",
                line,
            }),
            None => Ok(None),
        }
    }

    /// Collect array elements up to the closing `)`
    fn read_array(&mut self, start: usize) -> Result<Vec<String>> {
        let mut elements = Vec::new();

        loop {
            let Some(token) = self.lexer.next_token()? else {
                return Err(Error::Unterminated {
                    construct: "array literal",
                    line: start,
                });
            };

            match token.kind {
                TokenKind::CloseParen => return Ok(elements),
                TokenKind::Word(word) => elements.push(word),
                TokenKind::Assign {
                    name,
                    append,
                    value,
                } => {
                    // `options=(foo=bar)` is just an element containing '='
                    let op = if append { "+=" } else { "=" };
                    elements.push(format!("{}{}{}", name, op, value));
                }
                TokenKind::ArrayStart { .. } | TokenKind::OpenParen => {
                    return Err(Error::ParseError(format!(
                        "line {}: unexpected '(' inside array literal started on line {}",
                        token.line, start
                    )));
                }
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Assignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_assignment() {
            Ok(Some(assignment)) => Some(Ok(assignment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignments(source: &str) -> Vec<(String, AssignedValue)> {
        Tokenizer::new(source)
            .map(|a| {
                let a = a.unwrap();
                (a.name, a.value)
            })
            .collect()
    }

    fn scalar(name: &str, value: &str) -> (String, AssignedValue) {
        (name.to_string(), AssignedValue::Scalar(value.to_string()))
    }

    fn array(name: &str, values: &[&str]) -> (String, AssignedValue) {
        (
            name.to_string(),
            AssignedValue::Array(values.iter().map(|v| v.to_string()).collect()),
        )
    }

    #[test]
    fn test_array_spanning_words() {
        assert_eq!(
            assignments(r#"depends=(foo bar "baz qux")"#),
            vec![array("depends", &["foo", "bar", "baz qux"])]
        );
    }

    #[test]
    fn test_multiline_arrays() {
        let source = "
            source=(foo \\
            baz)
            depends=(eggs \\
                spam\\
                pancakes)
            makedepends(funky_town # got to get funky!
                pan)
        ";
        assert_eq!(
            assignments(source),
            vec![
                array("source", &["foo", "baz"]),
                array("depends", &["eggs", "spam", "pancakes"]),
            ]
        );
    }

    #[test]
    fn test_array_over_several_lines() {
        let source = "arch=(\n  'x86_64'\n  'aarch64'\n)\npkgname=foo";
        assert_eq!(
            assignments(source),
            vec![array("arch", &["x86_64", "aarch64"]), scalar("pkgname", "foo")]
        );
    }

    #[test]
    fn test_quoted_close_paren_is_an_element() {
        assert_eq!(
            assignments(r#"optdepends=("foo: needed for (bar)")"#),
            vec![array("optdepends", &["foo: needed for (bar)"])]
        );
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(assignments("backup=()"), vec![array("backup", &[])]);
    }

    #[test]
    fn test_element_with_equals() {
        assert_eq!(
            assignments("options=(foo=bar)"),
            vec![array("options", &["foo=bar"])]
        );
    }

    #[test]
    fn test_function_body_skipped() {
        let source = "
            pkgname=foo
            build() {
                pkgname=bar
                depends=(nope)
            }
            pkgver=1.0
        ";
        assert_eq!(
            assignments(source),
            vec![scalar("pkgname", "foo"), scalar("pkgver", "1.0")]
        );
    }

    #[test]
    fn test_function_keyword_form() {
        let source = "function package {\n  url=nope\n}\nurl=yes";
        assert_eq!(assignments(source), vec![scalar("url", "yes")]);
    }

    #[test]
    fn test_brace_toggle_is_flat() {
        let source = "
            build() {
                if true; then { a=1; }; fi
                b=2
            }
            c=3
        ";
        // The first '}' ends suppression
        assert_eq!(
            assignments(source),
            vec![scalar("b", "2"), scalar("c", "3")]
        );
    }

    #[test]
    fn test_parameter_expansion_braces_are_not_functions() {
        assert_eq!(
            assignments("source=(${pkgname}.tar.gz)\nurl=x"),
            vec![array("source", &["${pkgname}.tar.gz"]), scalar("url", "x")]
        );
    }

    #[test]
    fn test_commands_ignored() {
        assert_eq!(
            assignments("echo hello\n[[ -n x ]] && foo=bar"),
            vec![scalar("foo", "bar")]
        );
    }

    #[test]
    fn test_append_flag() {
        let result: Vec<_> = Tokenizer::new("depends+=(x)").map(|a| a.unwrap()).collect();
        assert_eq!(result.len(), 1);
        assert!(result[0].append);
        assert_eq!(result[0].value, AssignedValue::Array(vec!["x".to_string()]));
    }

    #[test]
    fn test_unterminated_array() {
        let mut tokenizer = Tokenizer::new("pkgname=foo\ndepends=(a b\nc");
        assert!(tokenizer.next().unwrap().is_ok());
        let err = tokenizer.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::Unterminated {
                construct: "array literal",
                line: 2
            }
        ));
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_unterminated_function_body() {
        let err = Tokenizer::new("build() {\n make\n")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Unterminated {
                construct: "function body",
                line: 1
            }
        ));
    }

    #[test]
    fn test_nested_array_rejected() {
        let err = Tokenizer::new("a=(b (c))")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_assignment_lines() {
        let lines: Vec<usize> = Tokenizer::new("a=1\n\nb=(x\ny)\nc=3")
            .map(|a| a.unwrap().line)
            .collect();
        assert_eq!(lines, vec![1, 3, 5]);
    }
}
