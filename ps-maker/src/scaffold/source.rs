//! Minimal structural view of a PHP class file
//!
//! The class body is split into its top-level members, each kept as an
//! opaque span of the original text. Comments, strings and heredocs are
//! skipped while scanning so braces inside them are not counted.
//!
//! ```text
//! <?php ... class Foo {   header
//!     public $a;          member (with its leading whitespace and docblock)
//!     function b() {}     member
//! ⏎                       tail
//! }⏎                      footer
//! ```
//!
//! Concatenating the four parts gives back the input unchanged, so adding a
//! member is a pure insertion.

use std::fmt;
use thiserror::Error;

/// Reasons a source file cannot be split into members
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// No named class declaration found
    #[error("no class declaration found")]
    NoClass,

    /// `class` keyword without a name or an opening brace
    #[error("malformed class declaration on line {line}")]
    MalformedClass {
        /// 1-based line of the `class` keyword
        line: usize,
    },

    /// String, comment or heredoc runs to the end of the file
    #[error("unterminated {what} starting on line {line}")]
    Unterminated {
        /// What was left open
        what: &'static str,
        /// 1-based line where it starts
        line: usize,
    },

    /// Class body is never closed
    #[error("class {0} is missing its closing brace")]
    UnclosedClass(String),
}

/// One top-level member of the class body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    text: String,
    name: Option<String>,
}

impl Member {
    /// Original text, including leading whitespace and comments
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Method name, for `function` members
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A PHP file holding one class, split around its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    class_name: String,
    header: String,
    members: Vec<Member>,
    tail: String,
    footer: String,
}

impl SourceDocument {
    /// Split `source` around the members of its first named class
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if no class is found or the file cannot be
    /// scanned to the closing brace of that class.
    pub fn parse(source: &str) -> Result<Self, SourceError> {
        let mut scanner = Scanner::new(source);
        let (class_name, body_start) = find_class(&mut scanner)?;

        let mut depth = 1_usize;
        let mut start = body_start;
        let mut members = Vec::new();
        let mut name = None;
        let mut awaiting_name = false;

        loop {
            let Some(token) = scanner.next_token()? else {
                return Err(SourceError::UnclosedClass(class_name));
            };

            let member_end = match token {
                Token::Punct(b'{', _) => {
                    depth += 1;
                    None
                }
                Token::Punct(b'}', at) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Self {
                            class_name,
                            header: source[..body_start].to_string(),
                            members,
                            tail: source[start..at].to_string(),
                            footer: source[at..].to_string(),
                        });
                    }
                    (depth == 1).then_some(at + 1)
                }
                Token::Punct(b';', at) if depth == 1 => Some(at + 1),
                _ => None,
            };

            if depth == 1 {
                match token {
                    Token::Word(word) if awaiting_name => {
                        name.get_or_insert_with(|| word.to_string());
                        awaiting_name = false;
                    }
                    Token::Word(word) => awaiting_name = word.eq_ignore_ascii_case("function"),
                    Token::Punct(b'&', _) => {}
                    _ => awaiting_name = false,
                }
            }

            if let Some(end) = member_end {
                members.push(Member {
                    text: source[start..end].to_string(),
                    name: name.take(),
                });
                start = end;
                awaiting_name = false;
            }
        }
    }

    /// Short name of the class
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Members in source order
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Whether a method with this name is declared (PHP names are case-insensitive)
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.members
            .iter()
            .filter_map(Member::name)
            .any(|member| member.eq_ignore_ascii_case(name))
    }

    /// Append a member after the last existing one
    ///
    /// `text` is the member as it should appear, indentation included. A blank
    /// line separates it from the previous member.
    pub fn append_member(&mut self, text: &str) {
        let separator = if self.members.is_empty() { "\n" } else { "\n\n" };
        let name = Self::parse(&format!("<?php class M {{\n{text}\n}}"))
            .ok()
            .and_then(|doc| doc.members.into_iter().find_map(|member| member.name));

        self.members.push(Member {
            text: format!("{separator}{text}"),
            name,
        });
    }

    /// Serialize back to source text
    #[must_use]
    pub fn to_source(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;
        for member in &self.members {
            f.write_str(&member.text)?;
        }
        f.write_str(&self.tail)?;
        f.write_str(&self.footer)
    }
}

/// Locate the first named class; returns its name and the offset just past `{`
fn find_class(scanner: &mut Scanner<'_>) -> Result<(String, usize), SourceError> {
    let mut previous: Option<Token<'_>> = None;

    loop {
        let Some(token) = scanner.next_token()? else {
            return Err(SourceError::NoClass);
        };

        if let Token::Word(word) = token {
            if word.eq_ignore_ascii_case("class") && declares_class(previous) {
                let line = scanner.line();
                let Some(Token::Word(name)) = scanner.next_token()? else {
                    return Err(SourceError::MalformedClass { line });
                };

                loop {
                    match scanner.next_token()? {
                        Some(Token::Punct(b'{', at)) => return Ok((name.to_string(), at + 1)),
                        Some(Token::Punct(b';', _)) | None => {
                            return Err(SourceError::MalformedClass { line })
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        previous = Some(token);
    }
}

/// `class` is a declaration unless it follows `::`, `->` or `new`
fn declares_class(previous: Option<Token<'_>>) -> bool {
    match previous {
        Some(Token::Punct(b':' | b'>', _)) => false,
        Some(Token::Word(word)) => !word.eq_ignore_ascii_case("new"),
        _ => true,
    }
}

#[derive(Debug, Clone, Copy)]
enum Token<'a> {
    Word(&'a str),
    Variable,
    Literal,
    Punct(u8, usize),
}

const fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte >= 0x80
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn line_at(&self, pos: usize) -> usize {
        self.bytes[..pos].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn line(&self) -> usize {
        self.line_at(self.pos)
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, SourceError> {
        loop {
            let Some(byte) = self.peek(0) else {
                return Ok(None);
            };

            match byte {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.skip_line(),
                b'#' if self.peek(1) != Some(b'[') => self.skip_line(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
                b'\'' | b'"' | b'`' => {
                    self.skip_quoted(byte)?;
                    return Ok(Some(Token::Literal));
                }
                b'<' if self.src[self.pos..].starts_with("<<<") => {
                    self.skip_heredoc()?;
                    return Ok(Some(Token::Literal));
                }
                b'$' => {
                    self.pos += 1;
                    self.take_word();
                    return Ok(Some(Token::Variable));
                }
                b if is_word_byte(b) => {
                    let start = self.pos;
                    self.take_word();
                    return Ok(Some(Token::Word(&self.src[start..self.pos])));
                }
                _ => {
                    let at = self.pos;
                    self.pos += 1;
                    return Ok(Some(Token::Punct(byte, at)));
                }
            }
        }
    }

    fn take_word(&mut self) {
        while self.peek(0).is_some_and(is_word_byte) {
            self.pos += 1;
        }
    }

    fn skip_line(&mut self) {
        while self.peek(0).is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), SourceError> {
        let start = self.pos;
        match self.src[start + 2..].find("*/") {
            Some(offset) => {
                self.pos = start + 2 + offset + 2;
                Ok(())
            }
            None => Err(SourceError::Unterminated {
                what: "comment",
                line: self.line_at(start),
            }),
        }
    }

    fn skip_quoted(&mut self, quote: u8) -> Result<(), SourceError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None => {
                    return Err(SourceError::Unterminated {
                        what: "string",
                        line: self.line_at(start),
                    })
                }
                Some(b'\\') => self.pos += 2,
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_heredoc(&mut self) -> Result<(), SourceError> {
        let start = self.pos;
        let unterminated = SourceError::Unterminated {
            what: "heredoc",
            line: self.line_at(start),
        };

        self.pos += 3;
        while matches!(self.peek(0), Some(b' ' | b'\t' | b'\'' | b'"')) {
            self.pos += 1;
        }
        let label_start = self.pos;
        self.take_word();
        let label = &self.src[label_start..self.pos];
        if label.is_empty() {
            return Err(unterminated);
        }

        let Some(newline) = self.src[self.pos..].find('\n') else {
            return Err(unterminated);
        };
        let mut line_start = self.pos + newline + 1;

        while line_start < self.src.len() {
            let line = &self.src[line_start..];
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            let candidate = &line[indent..];
            if candidate.starts_with(label)
                && !candidate
                    .as_bytes()
                    .get(label.len())
                    .copied()
                    .is_some_and(is_word_byte)
            {
                self.pos = line_start + indent + label.len();
                return Ok(());
            }
            match line.find('\n') {
                Some(offset) => line_start += offset + 1,
                None => break,
            }
        }

        Err(unterminated)
    }
}
