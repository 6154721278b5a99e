// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{bgm_patterns, compile_song, new_engine, sfx_commands};

use pm_emu::errors::{EngineError, PlayerError, SinkError};
use pm_emu::{Filter, Player, Sink, SoundEngine};
use pmmusic::CompileSelection;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::Ordering;

#[derive(Default)]
struct Recording {
    opened: bool,
    closed: bool,
    samples: Vec<i16>,
}

struct MemorySink(Rc<RefCell<Recording>>);

impl Sink for MemorySink {
    fn open(&mut self) -> Result<(), SinkError> {
        self.0.borrow_mut().opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.0.borrow_mut().closed = true;
        Ok(())
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), SinkError> {
        self.0.borrow_mut().samples.extend_from_slice(samples);
        Ok(())
    }
}

fn player() -> (Player, Rc<RefCell<Recording>>) {
    let recording = Rc::new(RefCell::new(Recording::default()));
    let mut player = Player::new();
    player.add_sink(Box::new(MemorySink(recording.clone())));
    (player, recording)
}

#[test]
fn play_sfx() {
    let song = compile_song("SFX s { l8 c e g ; }", |_| CompileSelection::sfx("s"));
    let mut engine = new_engine(&song);
    engine.play_sfx(sfx_commands(&song, "s"), None);

    let (mut player, recording) = player();
    player.play(&mut engine).unwrap();

    let r = recording.borrow();
    assert!(r.opened);
    assert!(r.closed);
    assert!(r.samples.len() > 1000);
    assert!(r.samples.iter().any(|&s| s != 0));
    assert!(!engine.is_playing_sfx());
}

#[test]
fn play_without_filter() {
    let song = compile_song("SFX s c ;", |_| CompileSelection::sfx("s"));
    let mut engine = new_engine(&song);
    engine.synth_mut().change_filter(Filter::Disabled);
    engine.play_sfx(sfx_commands(&song, "s"), None);

    let (mut player, recording) = player();
    player.play(&mut engine).unwrap();

    let r = recording.borrow();
    assert!(r.samples.iter().all(|&s| s == 0 || s == 0x4000));
    assert!(r.samples.contains(&0x4000));
}

#[test]
fn generated_engine() {
    let song = compile_song("SFX s c ;", |_| CompileSelection::sfx("s"));
    let mut engine = new_engine(&song);
    engine.synth_mut().change_engine(SoundEngine::Generated);
    engine.play_sfx(sfx_commands(&song, "s"), None);

    let (mut player, recording) = player();
    player.play(&mut engine).unwrap();

    // 612 samples per step
    let r = recording.borrow();
    assert_eq!(r.samples.len() % 612, 0);
    assert!(r.samples.len() >= 36 * 612);
    assert!(r.samples.iter().any(|&s| s != 0));
}

#[test]
fn stop_flag() {
    let song = compile_song("BGM song {| a }\nPAT a c", |_| CompileSelection::bgm("song"));
    let mut engine = new_engine(&song);

    let ended = Rc::new(RefCell::new(false));
    let e = ended.clone();
    engine.play_bgm(
        bgm_patterns(&song, "song"),
        Some(Box::new(move || *e.borrow_mut() = true)),
    );

    let (mut player, recording) = player();
    player.stop_flag().store(true, Ordering::Relaxed);
    player.play(&mut engine).unwrap();

    assert!(*ended.borrow());
    assert!(!engine.is_playing_bgm());
    assert!(recording.borrow().closed);
}

#[test]
fn engine_error() {
    // SFX without an end command
    let song = compile_song("SFX s c", |_| CompileSelection::sfx("s"));
    let mut engine = new_engine(&song);
    engine.play_sfx(sfx_commands(&song, "s"), None);

    let (mut player, recording) = player();
    let e = player.play(&mut engine).unwrap_err();

    assert!(matches!(e, PlayerError::Engine(EngineError::SfxOutOfRange)));
    assert!(recording.borrow().closed);
}
