//! pm-emu tests

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod playback;
mod player;

use pm_emu::engine::DEFAULT_RAM_OFFSET;
use pm_emu::MusicEngine;
use pmmusic::command::CompiledCommand;
use pmmusic::{compile, parse, CompileSelection, CompiledSong};

fn compile_song(text: &str, selection: impl FnOnce(&pmmusic::Song) -> CompileSelection) -> CompiledSong {
    let song = match parse(text) {
        Ok(s) => s,
        Err(e) => panic!("parse error: {}", e),
    };
    match compile(&song, &selection(&song)) {
        Ok(c) => c,
        Err(e) => panic!("compile error: {}", e),
    }
}

fn bgm_patterns(song: &CompiledSong, name: &str) -> Vec<Vec<CompiledCommand>> {
    song.bgm_commands(name).into_iter().map(|p| p.to_vec()).collect()
}

fn sfx_commands(song: &CompiledSong, name: &str) -> Vec<CompiledCommand> {
    song.sfx.get(name).cloned().unwrap()
}

fn new_engine(song: &CompiledSong) -> MusicEngine {
    MusicEngine::new(song.metadata.master_time, DEFAULT_RAM_OFFSET).unwrap()
}
