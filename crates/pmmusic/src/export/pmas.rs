//! PMAS assembly generator

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::{to_words, Exporter};

use crate::ast::hexify;
use crate::command::CompiledCommand;
use crate::compiler::CompiledSong;
use crate::data::NamedList;

use std::fmt::Write;

const WORDS_PER_LINE: usize = 8;

pub struct PmasExporter {}

fn write_words(out: &mut String, commands: &[CompiledCommand]) -> std::fmt::Result {
    for (i, w) in to_words(commands).into_iter().enumerate() {
        match i % WORDS_PER_LINE {
            0 => write!(out, "\n\t.dw {}", hexify(w.into(), 4))?,
            _ => write!(out, ",{}", hexify(w.into(), 4))?,
        }
    }
    Ok(())
}

fn write_command_lists(
    out: &mut String,
    heading: &str,
    lists: &NamedList<Vec<CompiledCommand>>,
) -> std::fmt::Result {
    write!(out, ";\n; {:>3} {}\n;\n", lists.len(), heading)?;
    for (name, commands) in lists.iter() {
        write!(out, "\n{}:", name)?;
        write_words(out, commands)?;
        out.push('\n');
    }
    Ok(())
}

#[rustfmt::skip::macros(writeln)]
impl Exporter for PmasExporter {
    fn generate_asm_file(song: &CompiledSong) -> Result<String, std::fmt::Error> {
        let meta = &song.metadata;
        let mut out = String::with_capacity(4096);

        writeln!(out, "; Music exported with pmsound v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "; Data file")?;
        writeln!(out, ";")?;

        for (label, value) in [
            ("Title", &meta.title),
            ("Composer", &meta.composer),
            ("Programmer", &meta.programmer),
            ("Description", &meta.description),
        ] {
            if !value.is_empty() {
                writeln!(out, "; {}: {}", label, value)?;
            }
        }
        write!(out, "; Master time: {}, ({})", hexify(meta.master_time.into(), 4), meta.master_time)?;
        out += "\n\n\t.align 2\n\n";

        write_command_lists(&mut out, "Pattern(s)", &song.pattern)?;
        write_command_lists(&mut out, "SFX", &song.sfx)?;

        write!(out, ";\n; {:>3} BGM\n;\n", song.bgm.len())?;
        for (name, patterns) in song.bgm.iter() {
            write!(out, "\n{}:", name)?;
            for p in patterns {
                write!(out, "\n\t.dd {}", p)?;
            }
            out.push('\n');
        }

        Ok(out)
    }
}
