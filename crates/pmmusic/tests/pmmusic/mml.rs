// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{mml_command, name, parse_err, parse_ok, pattern};

use pmmusic::ast::{Command, CommandSet, Effect, Loop, PlayNote, PulseWidth, Ram};
use pmmusic::errors::{BlockKind, ParseErrorKind};
use pmmusic::notes::Note;

fn note(note: Note, length: Option<i32>, extend: u8) -> Command {
    Command::PlayNote(PlayNote {
        note,
        length,
        extend,
    })
}

fn effect(kind: char, params: &[i64]) -> Command {
    Command::EffectStart(Effect {
        kind,
        params: params.to_vec(),
    })
}

#[test]
fn aliases() {
    let expected = CommandSet::new(vec![Command::End]);

    assert_eq!(pattern(&parse_ok("PATTERN foo { ; }"), "foo"), &expected);
    assert_eq!(pattern(&parse_ok("PAT foo ;"), "foo"), &expected);
    assert_eq!(parse_ok("SFX foo { ; }").sfx.get("foo"), Some(&expected));
    assert_eq!(parse_ok("SFX foo ;").sfx.get("foo"), Some(&expected));
    assert_eq!(parse_ok("MACRO A { ; }").macros.get("A"), Some(&expected));
    assert_eq!(parse_ok("MACRO A ;").macros.get("A"), Some(&expected));
}

#[test]
fn notes() {
    assert_eq!(mml_command("e"), note(Note::E, None, 0));
    assert_eq!(mml_command("e1"), note(Note::E, Some(1), 0));
    assert_eq!(mml_command("e2...."), note(Note::E, Some(2), 4));
    assert_eq!(mml_command("e."), note(Note::E, None, 1));
    assert_eq!(mml_command("e-"), note(Note::DSharp, None, 0));
    assert_eq!(mml_command("c-"), note(Note::CFlat, None, 0));
    assert_eq!(mml_command("b+"), note(Note::BSharp, None, 0));
    assert_eq!(mml_command("b#"), note(Note::BSharp, None, 0));
    assert_eq!(mml_command("r"), note(Note::Rest, None, 0));
    assert_eq!(mml_command("r-2."), note(Note::Rest, Some(-2), 1));
    assert_eq!(mml_command("r$-a"), note(Note::Rest, Some(-0xa), 0));
}

#[test]
fn value_commands() {
    assert_eq!(
        mml_command("%128"),
        Command::PulseWidth(PulseWidth {
            width: 128,
            percent: false
        })
    );
    assert_eq!(
        mml_command("/80"),
        Command::PulseWidth(PulseWidth {
            width: 80,
            percent: true
        })
    );
    assert_eq!(
        mml_command("\\8"),
        Command::PulseWidth(PulseWidth {
            width: 8,
            percent: true
        })
    );
    assert_eq!(mml_command("v4"), Command::Volume(4));
    assert_eq!(mml_command("w56"), Command::Wait(56));
    assert_eq!(
        mml_command("!$00:$8b"),
        Command::Ram(Ram {
            addr: 0x00,
            data: 0x8b
        })
    );
    assert_eq!(mml_command("l64"), Command::Length(64));
    assert_eq!(mml_command("o2"), Command::Octave(2));
    assert_eq!(mml_command("q17"), Command::Quant(17));
    assert_eq!(mml_command("s23"), Command::Sustain(23));
    assert_eq!(mml_command("A"), Command::PlayMacro(name("A")));
}

#[test]
fn octave_steps() {
    assert_eq!(mml_command("<"), Command::StepOctave { up: false });
    assert_eq!(mml_command(">"), Command::StepOctave { up: true });

    let first = |text| pattern(&parse_ok(text), "f").commands[0].clone();
    assert_eq!(first("OCTREV 1\nPAT f <"), Command::StepOctave { up: true });
    assert_eq!(first("OCTREV 1\nPAT f >"), Command::StepOctave { up: false });
}

#[test]
fn effects() {
    assert_eq!(mml_command("xt3"), Command::EffectTicks(3));
    assert_eq!(mml_command("xt"), Command::EffectTicks(1));
    assert_eq!(mml_command("xd"), effect('d', &[]));
    assert_eq!(mml_command("xA1"), effect('A', &[1]));
    assert_eq!(mml_command("xa3:7"), effect('a', &[3, 7]));
    assert_eq!(mml_command("xp-36"), effect('p', &[-36]));
    assert_eq!(mml_command("xs$ffffffff"), effect('s', &[0xffffffff]));
    assert_eq!(mml_command("xr20"), effect('r', &[20]));
}

#[test]
fn dialect_switches() {
    let first = |text| pattern(&parse_ok(text), "f").commands[0].clone();

    assert_eq!(first("VOLLVL system\nPAT f v2"), Command::Volume(8));
    assert_eq!(first("VOLLVL system\nPAT f v3"), Command::Volume(15));
    assert_eq!(first("SHORTQ yes\nPAT f q7"), Command::Quant(56));

    assert!(matches!(
        parse_err("VOLLVL system\nPAT f v4").kind,
        ParseErrorKind::InvalidSystemVolume(4)
    ));
}

#[test]
fn sequence() {
    let song = parse_ok("PAT foo { o3 l8 c d+4 [ e r ]3 A ; }");
    assert_eq!(
        pattern(&song, "foo").commands,
        [
            Command::Octave(3),
            Command::Length(8),
            note(Note::C, None, 0),
            note(Note::DSharp, Some(4), 0),
            Command::Loop(Loop {
                repeats: 3,
                commands: vec![note(Note::E, None, 0), note(Note::Rest, None, 0)],
            }),
            Command::PlayMacro(name("A")),
            Command::End,
        ]
    );
}

#[test]
fn nested_loops() {
    let song = parse_ok("PAT foo { [ c [ d ] ]4 }");
    assert_eq!(
        pattern(&song, "foo").commands,
        [Command::Loop(Loop {
            repeats: 4,
            commands: vec![
                note(Note::C, None, 0),
                Command::Loop(Loop {
                    repeats: 2,
                    commands: vec![note(Note::D, None, 0)],
                }),
            ],
        })]
    );
}

#[test]
fn multiline_pattern() {
    let song = parse_ok("PAT foo {\n  c // comment\n  d /* comment */ e\n}\nPAT bar f");

    assert_eq!(pattern(&song, "foo").commands.len(), 3);
    assert_eq!(
        pattern(&song, "bar").commands,
        [note(Note::F, None, 0)]
    );
}

#[test]
fn mml_errors() {
    let e = parse_err("PAT foo {\n c d\n  j }");
    assert!(matches!(e.kind, ParseErrorKind::UnexpectedCharacter('j')));
    assert_eq!(e.pos.line_number(), 3);
    assert_eq!(e.pos.line_char(), 3);

    assert!(matches!(parse_err("PAT foo [ c").kind, ParseErrorKind::UnclosedLoop));
    assert!(matches!(parse_err("PAT foo c ]").kind, ParseErrorKind::UnexpectedEndLoop));
    assert!(matches!(
        parse_err("PAT foo { c").kind,
        ParseErrorKind::UnexpectedEndOfFile(BlockKind::Mml)
    ));
    assert!(matches!(parse_err("PAT foo { w }").kind, ParseErrorKind::ExpectedNumber));
    assert!(matches!(parse_err("PAT foo { x }").kind, ParseErrorKind::ExpectedEffect));
}
