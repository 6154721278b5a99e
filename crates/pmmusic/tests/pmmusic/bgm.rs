// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{name, parse_err, parse_ok, pattern};

use pmmusic::ast::{Command, CommandSet};
use pmmusic::errors::{BlockKind, ParseErrorKind};

fn play(p: &str) -> Command {
    Command::PlayPattern(name(p))
}

fn assert_bgm(text: &str, expected: &[Command], end: Command) {
    let song = parse_ok(text);
    assert_eq!(song.bgm.get("foo"), Some(&CommandSet::new(expected.to_vec())), "{}", text);
    assert_eq!(pattern(&song, "foo_ENDBGM"), &CommandSet::new(vec![end]), "{}", text);
}

#[test]
fn bgm_without_loop() {
    let expected = [play("bar"), play("foo_ENDBGM")];

    assert_bgm("BGM foo { bar }", &expected, Command::End);
    assert_bgm("BGM foo { bar |}", &expected, Command::End);
    assert_bgm("BGM foo bar", &expected, Command::End);
    assert_bgm("BGM foo\n{\n  bar\n}", &expected, Command::End);
}

#[test]
fn bgm_with_loop() {
    assert_bgm(
        "BGM foo {| bar }",
        &[play("bar"), play("foo_ENDBGM")],
        Command::JumpPattern(-1),
    );
    assert_bgm(
        "BGM foo { intro; a b | c d }",
        &[
            play("intro"),
            play("a"),
            play("b"),
            play("c"),
            play("d"),
            play("foo_ENDBGM"),
        ],
        Command::JumpPattern(-2),
    );
}

#[test]
fn empty_bgm_is_dropped() {
    for text in ["BGM foo {}", "BGM foo { }", "BGM foo {|}", "BGM foo {\n}"] {
        let song = parse_ok(text);
        assert!(!song.bgm.contains("foo"), "{}", text);
        assert!(!song.pattern.contains("foo_ENDBGM"), "{}", text);
    }

    let song = parse_ok("BGM foo {}\nBGM bar { a }");
    assert_eq!(song.bgm.len(), 1);
    assert!(song.bgm.contains("bar"));
}

#[test]
fn multiline_bgm() {
    assert_bgm(
        "BGM foo {\n  a // first\n  b /* second */\n}",
        &[play("a"), play("b"), play("foo_ENDBGM")],
        Command::End,
    );
}

#[test]
fn bodyless_bgm_ends_at_end_of_line() {
    let song = parse_ok("BGM foo a b\nTITLE t");
    assert_eq!(
        song.bgm.get("foo"),
        Some(&CommandSet::new(vec![play("a"), play("b"), play("foo_ENDBGM")]))
    );
    assert_eq!(song.metadata.title, "t");
}

#[test]
fn bgm_errors() {
    assert!(matches!(
        parse_err("BGM foo { a | b | c }").kind,
        ParseErrorKind::MultipleBgmLoops
    ));
    assert!(matches!(
        parse_err("BGM foo { a ").kind,
        ParseErrorKind::UnexpectedEndOfFile(BlockKind::Bgm)
    ));
    assert!(matches!(
        parse_err("BGM foo { a 2b }").kind,
        ParseErrorKind::UnexpectedCharacter('2')
    ));
}
