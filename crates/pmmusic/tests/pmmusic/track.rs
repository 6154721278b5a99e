// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{name, parse_err, parse_ok, pattern, track_command};

use pmmusic::ast::{Command, CommandSet, Effect, Loop, PulseWidth, Ram, Row, RowNote};
use pmmusic::errors::{BlockKind, ParseErrorKind};
use pmmusic::notes::Note;

fn row_note(note: Note, octave: i32) -> Option<RowNote> {
    Some(RowNote {
        note,
        octave: Some(octave),
    })
}

#[test]
fn aliases() {
    let expected = CommandSet::new(vec![Command::End]);

    for text in [
        "PATTERN_TRACK foo { END }",
        "PATTERN_T foo END",
        "PAT_TRACK foo END",
        "PAT_T foo END",
    ] {
        assert_eq!(pattern(&parse_ok(text), "foo"), &expected, "{}", text);
    }

    assert_eq!(parse_ok("SFX_TRACK foo { END }").sfx.get("foo"), Some(&expected));
    assert_eq!(parse_ok("SFX_T foo END").sfx.get("foo"), Some(&expected));
    assert_eq!(parse_ok("MACRO_TRACK A { END }").macros.get("A"), Some(&expected));
    assert_eq!(parse_ok("MACRO_T A END").macros.get("A"), Some(&expected));
}

#[test]
fn row() {
    let expected = Command::Row(Row {
        wait: Some(4),
        volume: Some(15),
        pulse_width: Some(PulseWidth {
            width: 0x80,
            percent: false,
        }),
        note: row_note(Note::E, 5),
        ..Default::default()
    });

    assert_eq!(track_command("ROW w4, v15, %$80, E-5"), expected);
    assert_eq!(track_command("ROW w4; v15; %$80; E-5"), expected);
    assert_eq!(track_command("row E-5, %$80, v15, w4"), expected);
}

#[test]
fn row_fields() {
    assert_eq!(
        track_command("ROW E#5"),
        Command::Row(Row {
            note: row_note(Note::F, 5),
            ..Default::default()
        })
    );

    for pw in ["ROW /80", "ROW \\80"] {
        assert_eq!(
            track_command(pw),
            Command::Row(Row {
                pulse_width: Some(PulseWidth {
                    width: 80,
                    percent: true
                }),
                ..Default::default()
            })
        );
    }

    assert_eq!(
        track_command("ROW !$25:$50"),
        Command::Row(Row {
            ram: Some(Ram {
                addr: 0x25,
                data: 0x50
            }),
            ..Default::default()
        })
    );
    assert_eq!(
        track_command("ROW q40"),
        Command::Row(Row {
            quant: Some(40),
            ..Default::default()
        })
    );
    assert_eq!(
        track_command("ROW s40"),
        Command::Row(Row {
            sustain: Some(40),
            ..Default::default()
        })
    );
    assert_eq!(
        track_command("ROW -"),
        Command::Row(Row {
            note: Some(RowNote {
                note: Note::Rest,
                octave: None
            }),
            ..Default::default()
        })
    );
}

#[test]
fn row_effects() {
    let effect = |kind, params: &[i64]| Effect {
        kind,
        params: params.to_vec(),
    };

    assert_eq!(
        track_command("ROW xt2, xa2:3"),
        Command::Row(Row {
            effect_ticks: Some(2),
            effect: Some(effect('a', &[2, 3])),
            ..Default::default()
        })
    );
    assert_eq!(
        track_command("ROW xd"),
        Command::Row(Row {
            effect: Some(effect('d', &[])),
            ..Default::default()
        })
    );
    assert_eq!(
        track_command("ROW xp2"),
        Command::Row(Row {
            effect: Some(effect('p', &[2])),
            ..Default::default()
        })
    );
    assert_eq!(
        track_command("ROW xx-2:$0a:4:5"),
        Command::Row(Row {
            effect: Some(effect('x', &[-2, 0x0a, 4, 5])),
            ..Default::default()
        })
    );
}

#[test]
fn row_octave_is_remembered() {
    let song = parse_ok("PAT_T foo {\n  ROW C-3\n  ROW D\n}");
    let c = &pattern(&song, "foo").commands;

    assert_eq!(
        c[1],
        Command::Row(Row {
            note: row_note(Note::D, 3),
            ..Default::default()
        })
    );
}

#[test]
fn loop_and_macro() {
    let expected = |repeats| {
        CommandSet::new(vec![Command::Loop(Loop {
            repeats,
            commands: vec![Command::PlayMacro(name("A"))],
        })])
    };

    let song = parse_ok("PAT_T foo {\n  LOOP\n  MACRO A\n  ENDLOOP\n}");
    assert_eq!(pattern(&song, "foo"), &expected(2));

    let song = parse_ok("PAT_T foo {\n  MARK\n  MACRO A\n  ENDL\n}");
    assert_eq!(pattern(&song, "foo"), &expected(2));

    let song = parse_ok("PAT_T foo {\n  DO\n  MACRO A\n  REPEAT 3\n}");
    assert_eq!(pattern(&song, "foo"), &expected(3));
}

#[test]
fn track_errors() {
    let e = parse_err("PAT_T foo {\n  ROW w4, z3\n}");
    assert!(matches!(e.kind, ParseErrorKind::UnknownRowCommand(ref s) if s == "z3"));
    assert_eq!(e.pos.line_number(), 2);
    assert_eq!(e.pos.line_char(), 11);

    assert!(matches!(
        parse_err("PAT_T foo { PLAY }").kind,
        ParseErrorKind::UnknownTrackCommand(_)
    ));
    assert!(matches!(
        parse_err("PAT_T foo { ROW w1:2 }").kind,
        ParseErrorKind::WrongNumberOfArguments("w", 2)
    ));
    assert!(matches!(
        parse_err("PAT_T foo {\n LOOP\n END\n}").kind,
        ParseErrorKind::UnclosedLoop
    ));
    assert!(matches!(
        parse_err("PAT_T foo {\n ENDLOOP\n}").kind,
        ParseErrorKind::UnexpectedEndLoop
    ));
    assert!(matches!(
        parse_err("PAT_T foo {\n END\n").kind,
        ParseErrorKind::UnexpectedEndOfFile(BlockKind::Track)
    ));
}
