//! Parsed song data

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::ast::CommandSet;
use crate::data::NamedList;
use crate::driver_constants::DEFAULT_MASTER_TIME;

/// Free text and timing directives.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub title: String,
    pub composer: String,
    pub programmer: String,
    pub description: String,
    pub out_format: String,
    pub var_header: String,
    pub out_header: String,
    pub out_file: String,

    /// Timer 2 preset
    pub master_time: u16,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            composer: String::new(),
            programmer: String::new(),
            description: String::new(),
            out_format: String::new(),
            var_header: String::new(),
            out_header: String::new(),
            out_file: String::new(),
            master_time: DEFAULT_MASTER_TIME,
        }
    }
}

/// Directives that change how the MML dialect is parsed and how macros are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// `v` values are 0-15 (`true`) or 0-3 (`false`)
    pub vol_level_is_mml: bool,
    /// Swaps `<` and `>`
    pub octave_reverse: bool,
    /// `q` values are 0-8
    pub short_quantize: bool,
    /// Macros are recompiled at every call using the caller's state
    pub transclude_macro: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            vol_level_is_mml: true,
            octave_reverse: false,
            short_quantize: false,
            transclude_macro: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Song {
    /// Every file included while parsing the song
    pub includes: Vec<String>,

    pub metadata: Metadata,
    pub dialect: Dialect,

    pub bgm: NamedList<CommandSet>,
    pub pattern: NamedList<CommandSet>,
    pub sfx: NamedList<CommandSet>,
    pub macros: NamedList<CommandSet>,
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }
}
