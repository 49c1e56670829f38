//! Line-aware tokenizer for expression blocks.
//!
//! Produces a flat token stream with explicit `Newline`, `Indent` and `Dedent`
//! markers so the parser can handle indentation-delimited `if` blocks. Lines
//! inside open brackets continue the current logical line.

use std::fmt;

/// Token kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Name(String),
    /// String literal with escapes already processed
    Str(String),
    /// Integer literal
    Int(i64),
    /// Operator or punctuation
    Op(&'static str),
    /// End of a logical line
    Newline,
    /// Indentation increased
    Indent,
    /// Indentation decreased
    Dedent,
    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => write!(f, "'{n}'"),
            Self::Str(s) => write!(f, "string \"{s}\""),
            Self::Int(i) => write!(f, "{i}"),
            Self::Op(op) => write!(f, "'{op}'"),
            Self::Newline => write!(f, "end of line"),
            Self::Indent => write!(f, "indent"),
            Self::Dedent => write!(f, "dedent"),
            Self::Eof => write!(f, "end of expression"),
        }
    }
}

/// Token with the 1-based line it starts on
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Tokenizer error with its line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

const TWO_CHAR_OPS: &[&str] = &["==", "!="];
const ONE_CHAR_OPS: &[&str] = &["=", "(", ")", "[", "]", ",", ":", ".", "+"];

/// Tokenizer for expression source
pub struct Tokenizer {
    tokens: Vec<Token>,
    indents: Vec<usize>,
    depth: usize,
}

impl Tokenizer {
    /// Tokenize entire input
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut tokenizer = Self {
            tokens: Vec::new(),
            indents: vec![0],
            depth: 0,
        };

        let mut last_line = 1;
        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            last_line = line;
            tokenizer.line(raw.trim_end_matches('\r'), line)?;
        }

        if tokenizer.depth > 0 {
            return Err(LexError {
                line: last_line,
                message: "unexpected end of expression inside brackets".to_string(),
            });
        }

        let end = last_line;
        while tokenizer.indents.len() > 1 {
            tokenizer.indents.pop();
            tokenizer.push(TokenKind::Dedent, end);
        }
        tokenizer.push(TokenKind::Eof, end);
        Ok(tokenizer.tokens)
    }

    fn push(&mut self, kind: TokenKind, line: usize) {
        self.tokens.push(Token {
            kind,
            line,
        });
    }

    fn line(&mut self, raw: &str, line: usize) -> Result<(), LexError> {
        let rest = raw.trim_start_matches([' ', '\t']);
        let blank = rest.is_empty() || rest.starts_with('#');

        if self.depth == 0 {
            if blank {
                return Ok(());
            }
            self.indentation(indent_width(&raw[..raw.len() - rest.len()]), line)?;
        }

        self.scan(rest, line)?;

        if self.depth == 0 {
            self.push(TokenKind::Newline, line);
        }
        Ok(())
    }

    fn indentation(&mut self, width: usize, line: usize) -> Result<(), LexError> {
        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.push(TokenKind::Indent, line);
        } else if width < current {
            while self.indents.last().is_some_and(|top| *top > width) {
                self.indents.pop();
                self.push(TokenKind::Dedent, line);
            }
            if self.indents.last() != Some(&width) {
                return Err(LexError {
                    line,
                    message: "unindent does not match any outer indentation level".to_string(),
                });
            }
        }
        Ok(())
    }

    fn scan(&mut self, text: &str, line: usize) -> Result<(), LexError> {
        let mut chars = text.char_indices().peekable();

        while let Some(&(pos, c)) = chars.peek() {
            match c {
                ' ' | '\t' => {
                    chars.next();
                }
                '#' => break,
                '"' | '\'' => {
                    chars.next();
                    let value = read_string(&mut chars, c, line)?;
                    self.push(TokenKind::Str(value), line);
                }
                c if c.is_ascii_digit() => {
                    let mut end = pos;
                    while let Some(&(i, d)) = chars.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        end = i + d.len_utf8();
                        chars.next();
                    }
                    let value = text[pos..end].parse::<i64>().map_err(|e| LexError {
                        line,
                        message: format!("invalid number '{}': {e}", &text[pos..end]),
                    })?;
                    self.push(TokenKind::Int(value), line);
                }
                c if c.is_alphabetic() || c == '_' => {
                    let mut end = pos;
                    while let Some(&(i, d)) = chars.peek() {
                        if !(d.is_alphanumeric() || d == '_') {
                            break;
                        }
                        end = i + d.len_utf8();
                        chars.next();
                    }
                    self.push(TokenKind::Name(text[pos..end].to_string()), line);
                }
                _ => {
                    let rest = &text[pos..];
                    let op = TWO_CHAR_OPS
                        .iter()
                        .chain(ONE_CHAR_OPS)
                        .find(|op| rest.starts_with(**op))
                        .copied()
                        .ok_or_else(|| LexError {
                            line,
                            message: format!("unexpected character '{c}'"),
                        })?;

                    for _ in 0..op.len() {
                        chars.next();
                    }
                    match op {
                        "(" | "[" => self.depth += 1,
                        ")" | "]" => {
                            self.depth = self.depth.checked_sub(1).ok_or_else(|| LexError {
                                line,
                                message: format!("unmatched '{op}'"),
                            })?;
                        }
                        _ => {}
                    }
                    self.push(TokenKind::Op(op), line);
                }
            }
        }
        Ok(())
    }
}

/// Width of leading whitespace, with tabs advancing to the next multiple of 8.
fn indent_width(prefix: &str) -> usize {
    prefix.chars().fold(0, |width, c| if c == '\t' { (width / 8 + 1) * 8 } else { width + 1 })
}

fn read_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    line: usize,
) -> Result<String, LexError> {
    let mut value = String::new();
    loop {
        let Some((_, c)) = chars.next() else {
            return Err(LexError {
                line,
                message: "unterminated string literal".to_string(),
            });
        };
        match c {
            c if c == quote => return Ok(value),
            '\\' => match chars.next().map(|(_, e)| e) {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('\\') => value.push('\\'),
                Some('"') => value.push('"'),
                Some('\'') => value.push('\''),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => {
                    return Err(LexError {
                        line,
                        message: "unterminated string literal".to_string(),
                    });
                }
            },
            c => value.push(c),
        }
    }
}
