//! Pokémon mini music language compiler

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod file_pos;

pub mod ast;
pub mod command;
pub mod compiler;
pub mod data;
pub mod driver_constants;
pub mod errors;
pub mod export;
pub mod notes;
pub mod number_parsing;
pub mod parser;
pub mod pitch_table;
pub mod song;

pub use compiler::{compile, CompileSelection, CompiledSong};
pub use file_pos::FilePos;
pub use parser::{parse, parse_with_loader, IncludeLoader};
pub use song::Song;
