//! FilePos

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::fmt::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FilePos {
    pub(crate) line_number: u32,
    pub(crate) line_char: u32,
    pub(crate) char_index: u32,
}

impl FilePos {
    /// Converts a byte index into a line/char position.
    ///
    /// `line_number` and `line_char` are 1-based, `line_char` counts characters (not bytes).
    pub fn from_index(text: &str, index: usize) -> Self {
        let index = index.min(text.len());
        let before = text.get(..index).unwrap_or(text);

        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_number = before.bytes().filter(|&b| b == b'\n').count() + 1;
        let line_char = before[line_start..].chars().count() + 1;

        Self {
            line_number: line_number.try_into().unwrap_or(u32::MAX),
            line_char: line_char.try_into().unwrap_or(u32::MAX),
            char_index: index.try_into().unwrap_or(u32::MAX),
        }
    }

    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn line_char(&self) -> u32 {
        self.line_char
    }

    pub fn char_index(&self) -> u32 {
        self.char_index
    }
}

impl Display for FilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, char {}", self.line_number, self.line_char)
    }
}
