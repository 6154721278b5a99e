//! Source text scanner

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::errors::{ParseError, ParseErrorKind};

/// How a block body is terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyEnd {
    /// `{ ... }`
    Brace,
    /// A bodyless block (`PAT foo c d e`) ends at the end of the line
    EndOfLine,
}

/// Whitespace within a block body, a bodyless block cannot span multiple lines
pub(crate) fn is_space(b: u8, end: BodyEnd) -> bool {
    match end {
        BodyEnd::Brace => b.is_ascii_whitespace(),
        BodyEnd::EndOfLine => b.is_ascii_whitespace() && b != b'\n',
    }
}

pub(crate) fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_')
}

pub(crate) fn is_word_byte(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_')
}

/// A cursor into the source text.
///
/// Positions are byte indexes into the complete text so errors can be converted into a line and
/// character by [`ParseError::new`].
pub(crate) struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, pos: usize) -> Self {
        Self {
            text,
            pos: pos.min(text.len()),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn first_byte(&self) -> Option<u8> {
        self.remaining().bytes().next()
    }

    pub fn second_byte(&self) -> Option<u8> {
        self.remaining().as_bytes().get(1).copied()
    }

    pub fn first_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advances `n` bytes, `n` MUST end on a char boundary
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
    }

    /// Moves the cursor back to an earlier position
    pub fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.pos);
        self.pos = pos.min(self.pos);
    }

    pub fn read_while(&mut self, pattern: impl Fn(u8) -> bool) -> &'a str {
        let r = self.remaining();
        let len = r.bytes().take_while(|&b| pattern(b)).count();
        self.pos += len;
        &r[..len]
    }

    /// Reads `[_a-zA-Z][_a-zA-Z0-9]*`
    pub fn read_name(&mut self) -> Option<&'a str> {
        match self.first_byte() {
            Some(b) if is_name_start(b) => Some(self.read_while(is_word_byte)),
            _ => None,
        }
    }

    /// Skips a single `// line` or `/* block */` comment.
    ///
    /// Returns false if there is no comment (or the block comment is not closed).
    pub fn skip_comment(&mut self) -> bool {
        let r = self.remaining();

        if r.starts_with("//") {
            let len = r.find('\n').unwrap_or(r.len());
            self.pos += len;
            true
        } else if let Some(block) = r.strip_prefix("/*") {
            match block.find("*/") {
                Some(i) => {
                    self.pos += i + 4;
                    true
                }
                None => false,
            }
        } else {
            false
        }
    }

    /// Reads a directive argument string.
    ///
    /// The argument ends at a `{`, `}`, newline or comment.
    pub fn read_argument(&mut self) -> &'a str {
        let r = self.remaining();
        let bytes = r.as_bytes();

        let mut len = 0;
        while let Some(&b) = bytes.get(len) {
            match b {
                b'{' | b'}' | b'\n' => break,
                b'/' if matches!(bytes.get(len + 1), Some(b'/') | Some(b'*')) => break,
                _ => len += 1,
            }
        }

        self.pos += len;
        &r[..len]
    }

    /// Reads the arguments of a directive or track command (if any).
    ///
    /// Arguments are separated from the name by spaces or tabs.
    /// Returns the position and text of the arguments.
    pub fn read_command_arguments(&mut self) -> Option<(usize, &'a str)> {
        let before = self.pos;

        if matches!(self.first_byte(), Some(b' ') | Some(b'\t')) {
            self.read_while(|b| b == b' ' || b == b'\t');

            let pos = self.pos;
            let args = self.read_argument();
            if !args.is_empty() {
                return Some((pos, args));
            }
        }

        self.pos = before;
        None
    }

    /// Consumes the end of a block body if it is at the cursor
    pub fn at_body_end(&mut self, end: BodyEnd) -> bool {
        match end {
            BodyEnd::Brace => {
                if self.first_byte() == Some(b'}') {
                    self.advance(1);
                    true
                } else {
                    false
                }
            }
            BodyEnd::EndOfLine => {
                let r = self.remaining();
                let t = r.trim_start_matches([' ', '\t']);
                let spaces = r.len() - t.len();

                if t.is_empty() {
                    self.pos = self.text.len();
                    true
                } else if t.starts_with("\r\n") {
                    self.pos += spaces + 2;
                    true
                } else if t.starts_with('\n') {
                    self.pos += spaces + 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.text, self.pos, kind)
    }

    pub fn error_at(&self, pos: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.text, pos, kind)
    }

    pub fn unexpected_character(&self) -> ParseError {
        match self.first_char() {
            Some(c) => self.error(ParseErrorKind::UnexpectedCharacter(c)),
            None => self.error(ParseErrorKind::UnexpectedCharacter('\0')),
        }
    }
}
