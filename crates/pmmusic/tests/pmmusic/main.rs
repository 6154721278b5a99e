//! pmmusic tests

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod bgm;
mod directives;
mod effects;
mod loops;
mod mml;
mod track;

use pmmusic::ast::{Command, CommandSet};
use pmmusic::command::CompiledCommand;
use pmmusic::data::Name;
use pmmusic::errors::{CompilerError, ParseError};
use pmmusic::export::to_words;
use pmmusic::{compile, parse, CompileSelection, Song};

fn name(s: &str) -> Name {
    s.parse().unwrap()
}

fn parse_ok(text: &str) -> Song {
    match parse(text) {
        Ok(s) => s,
        Err(e) => panic!("parse error: {}", e),
    }
}

fn parse_err(text: &str) -> ParseError {
    match parse(text) {
        Ok(_) => panic!("expected a parse error: {:?}", text),
        Err(e) => e,
    }
}

fn pattern<'a>(song: &'a Song, p: &str) -> &'a CommandSet {
    match song.pattern.get(p) {
        Some(c) => c,
        None => panic!("missing pattern {}", p),
    }
}

/// Returns the first command of the `foo` MML pattern
fn mml_command(mml: &str) -> Command {
    let song = parse_ok(&format!("PAT foo {{ {} }}", mml));
    pattern(&song, "foo").commands[0].clone()
}

/// Returns the first command of the `foo` track pattern
fn track_command(track: &str) -> Command {
    let song = parse_ok(&format!("PAT_T foo {{ {} }}", track));
    pattern(&song, "foo").commands[0].clone()
}

fn compile_pattern(text: &str, p: &str) -> Result<Vec<CompiledCommand>, CompilerError> {
    let song = parse_ok(text);
    let c = compile(&song, &CompileSelection::pattern(p))?;
    Ok(c.pattern.get(p).cloned().unwrap_or_default())
}

fn pattern_words(text: &str, p: &str) -> Vec<u16> {
    match compile_pattern(text, p) {
        Ok(c) => to_words(&c),
        Err(e) => panic!("compile error: {}", e),
    }
}

fn pattern_error(text: &str, p: &str) -> CompilerError {
    match compile_pattern(text, p) {
        Ok(_) => panic!("expected a compiler error"),
        Err(e) => e,
    }
}
