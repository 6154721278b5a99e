//! Compiled song exporters

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod pmas;

pub use self::pmas::PmasExporter;

use crate::command::CompiledCommand;
use crate::compiler::CompiledSong;

pub trait Exporter {
    fn generate_asm_file(song: &CompiledSong) -> Result<String, std::fmt::Error>;
}

/// Encodes a command list into sound-engine words
pub fn to_words(commands: &[CompiledCommand]) -> Vec<u16> {
    commands.iter().flat_map(|c| c.to_words()).collect()
}

/// Exports the compiled song as PMAS assembly
pub fn to_pmas(song: &CompiledSong) -> Result<String, std::fmt::Error> {
    PmasExporter::generate_asm_file(song)
}
