// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{bgm_patterns, compile_song, new_engine, sfx_commands};

use pm_emu::player::CYCLES_PER_STEP;
use pm_emu::registers::addresses::{AUD_VOL, TMR3_PIVOT, TMR3_PRESET};
use pmmusic::CompileSelection;

use std::cell::Cell;
use std::rc::Rc;

const ROW_TRACK: &str = "PAT_T foo { ROW w4, v15, %$80, E-5 }";

#[test]
fn row_writes_tone_registers() {
    let song = compile_song(ROW_TRACK, |_| CompileSelection::pattern("foo"));
    let mut engine = new_engine(&song);

    let pattern = song.pattern.get("foo").cloned().unwrap();
    engine.play_sfx(pattern, None);
    engine.irq().unwrap();

    let r = engine.registers();
    assert_eq!(r.read_u16(TMR3_PRESET), 0x17b2);
    assert_eq!(r.read_u16(TMR3_PIVOT), 0x0bd9);
    assert_eq!(r.read(AUD_VOL), 3);
    assert_eq!(r.timers[2].preset(), 0x17b2);
    assert_eq!(r.timers[2].pivot, 0x0bd9);
}

#[test]
fn row_in_bgm() {
    let text = format!("{}\nBGM song {{ foo }}", ROW_TRACK);
    let song = compile_song(&text, |_| CompileSelection::bgm("song"));
    let mut engine = new_engine(&song);

    engine.play_bgm(bgm_patterns(&song, "song"), None);
    engine.irq().unwrap();

    let r = engine.registers();
    assert_eq!(r.read_u16(TMR3_PRESET), 0x17b2);
    assert_eq!(r.read_u16(TMR3_PIVOT), 0x0bd9);
}

#[test]
fn looping_bgm_never_ends() {
    let song = compile_song("BGM song {| a }\nPAT a c", |_| CompileSelection::bgm("song"));
    let mut engine = new_engine(&song);

    engine.play_bgm(bgm_patterns(&song, "song"), None);
    for _ in 0..200 {
        assert!(engine.emulate(CYCLES_PER_STEP).unwrap());
        assert!(engine.is_playing_bgm());
    }
}

#[test]
fn bgm_ends() {
    let song = compile_song("BGM song { a b }\nPAT a c\nPAT b d", |_| {
        CompileSelection::bgm("song")
    });
    let mut engine = new_engine(&song);

    let ended = Rc::new(Cell::new(false));
    let e = ended.clone();
    engine.play_bgm(bgm_patterns(&song, "song"), Some(Box::new(move || e.set(true))));

    let mut steps = 0;
    while engine.emulate(CYCLES_PER_STEP).unwrap() {
        steps += 1;
        assert!(steps < 200, "BGM did not end");
    }
    assert!(ended.get());
    assert!(!engine.is_playing_bgm());
}

#[test]
fn ram_writes() {
    let song = compile_song("SFX s { !16:$ab c ; }", |_| CompileSelection::sfx("s"));
    let mut engine = new_engine(&song);

    engine.play_sfx(sfx_commands(&song, "s"), None);
    engine.irq().unwrap();
    assert_eq!(engine.ram()[16], 0xab);
}

#[test]
fn master_time() {
    let song = compile_song("MASTERTIME 1000\nSFX s c ;", |_| CompileSelection::sfx("s"));
    let engine = new_engine(&song);
    let r = engine.registers();
    assert_eq!(r.timers[1].preset(), 1000);
}
