// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{parse_err, parse_ok};

use pmmusic::errors::{BlockKind, ParseErrorKind};
use pmmusic::parse_with_loader;

use std::io;

#[test]
fn include() {
    let mut loaded = Vec::new();
    let mut loader = |f: &str| -> Result<String, io::Error> {
        loaded.push(f.to_owned());
        Ok("TITLE included".to_owned())
    };

    let song = parse_with_loader("INCLUDE abc.txt", Some(&mut loader)).unwrap();
    assert_eq!(song.metadata.title, "included");
    assert_eq!(song.includes, ["abc.txt"]);
    assert_eq!(loaded, ["abc.txt"]);
}

#[test]
fn include_without_loader() {
    let e = parse_err("INCLUDE abc.txt");
    assert!(matches!(e.kind, ParseErrorKind::IncludeNotSupported));
}

#[test]
fn recursive_include() {
    let mut loader = |f: &str| -> Result<String, io::Error> {
        match f {
            "a.txt" => Ok("INCLUDE b.txt".to_owned()),
            _ => Ok("\n\nINCLUDE a.txt".to_owned()),
        }
    };

    let e = parse_with_loader("INCLUDE a.txt", Some(&mut loader)).unwrap_err();
    let ParseErrorKind::InIncludedFile(f, e) = e.kind else {
        panic!("expected InIncludedFile")
    };
    assert_eq!(f, "a.txt");

    let ParseErrorKind::InIncludedFile(f, e) = e.kind else {
        panic!("expected InIncludedFile")
    };
    assert_eq!(f, "b.txt");
    assert!(matches!(e.kind, ParseErrorKind::RecursiveInclude(ref f) if f == "a.txt"));
    assert_eq!(e.pos.line_number(), 3);
}

#[test]
fn include_load_error() {
    let mut loader = |_: &str| -> Result<String, io::Error> {
        Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
    };
    let e = parse_with_loader("INCLUDE missing", Some(&mut loader)).unwrap_err();
    assert!(matches!(e.kind, ParseErrorKind::CannotLoadInclude(ref f, _) if f == "missing"));
}

#[test]
fn free_text() {
    assert_eq!(parse_ok("TITLE Re:Hello world").metadata.title, "Re:Hello world");
    assert_eq!(parse_ok("COMPOSER 律可").metadata.composer, "律可");
    assert_eq!(parse_ok("PROGRAMMER none yet :3").metadata.programmer, "none yet :3");
    assert_eq!(parse_ok("OUTFORMAT asm").metadata.out_format, "asm");
    assert_eq!(parse_ok("OUTFORMAT c").metadata.out_format, "c");
    assert_eq!(parse_ok("VARHEADER header.inc").metadata.var_header, "header.inc");
    assert_eq!(parse_ok("OUTHEADER header.inc").metadata.out_header, "header.inc");
    assert_eq!(parse_ok("OUTFILE music.asm").metadata.out_file, "music.asm");
}

#[test]
fn directive_names_are_case_insensitive() {
    assert_eq!(parse_ok("title lower case").metadata.title, "lower case");
    assert_eq!(parse_ok("Title  spaces  ").metadata.title, "spaces");
}

#[test]
fn comments() {
    let song = parse_ok("// comment\nTITLE a // comment\n/* block\n comment */ COMPOSER b");
    assert_eq!(song.metadata.title, "a");
    assert_eq!(song.metadata.composer, "b");
}

#[test]
fn description() {
    assert_eq!(
        parse_ok("DESCRIPTION THX!! Half a million!!!").metadata.description,
        "THX!! Half a million!!!"
    );
    assert_eq!(
        parse_ok("DESCRIPTION {\n    THX!! Half a million!!!\n    With gratitude to everyone!!!\n}")
            .metadata
            .description,
        "THX!! Half a million!!!\nWith gratitude to everyone!!!"
    );

    let e = parse_err("DESCRIPTION {\n abc");
    assert!(matches!(
        e.kind,
        ParseErrorKind::UnexpectedEndOfFile(BlockKind::Description)
    ));
}

#[test]
fn master_time() {
    assert_eq!(parse_ok("").metadata.master_time, 260);
    assert_eq!(parse_ok("MASTERTIME $00FF").metadata.master_time, 0x00ff);
    assert_eq!(parse_ok("MTIME $01FF").metadata.master_time, 0x01ff);
    assert_eq!(parse_ok("MTIME #10").metadata.master_time, 0x10);
    assert_eq!(parse_ok("MTIME 300").metadata.master_time, 300);

    assert_eq!(parse_ok("MTIME $FFFF").metadata.master_time, 0xffff);
    assert_eq!(parse_ok("MTIME 0").metadata.master_time, 0);

    assert!(matches!(parse_err("MTIME abc").kind, ParseErrorKind::ExpectedNumber));
    assert!(matches!(
        parse_err("MASTERTIME 70000").kind,
        ParseErrorKind::NumberOutOfRange(70000)
    ));
    assert!(matches!(
        parse_err("MASTERTIME -5").kind,
        ParseErrorKind::NumberOutOfRange(-5)
    ));
    assert!(matches!(
        parse_err("MTIME $10000").kind,
        ParseErrorKind::NumberOutOfRange(0x10000)
    ));
}

#[test]
fn master_bpm() {
    assert_eq!(parse_ok("MASTERBPM 114, 128").metadata.master_time, 255);
    assert_eq!(parse_ok("MBPM 100.78, 150").metadata.master_time, 247);

    assert!(matches!(parse_err("MBPM 100").kind, ParseErrorKind::MasterBpmArguments));
    assert!(matches!(parse_err("MBPM 0, 150").kind, ParseErrorKind::InvalidBpm));
    assert!(matches!(parse_err("MBPM x, 150").kind, ParseErrorKind::ExpectedFloat));
    assert!(matches!(
        parse_err("MBPM 120, 256").kind,
        ParseErrorKind::InvalidBpmWait(256)
    ));
    assert!(matches!(
        parse_err("MBPM 120, 0").kind,
        ParseErrorKind::NumberOutOfRange(-1)
    ));
}

#[test]
fn vol_level() {
    assert!(parse_ok("VOLLEVEL mml").dialect.vol_level_is_mml);
    assert!(parse_ok("VOLLVL 16").dialect.vol_level_is_mml);
    assert!(!parse_ok("VOLLVL system").dialect.vol_level_is_mml);
    assert!(!parse_ok("VOLLVL 4").dialect.vol_level_is_mml);

    assert!(matches!(parse_err("VOLLVL 0").kind, ParseErrorKind::InvalidVolLevel(_)));
}

#[test]
fn octave_reverse() {
    assert!(parse_ok("OCTAVEREV yes").dialect.octave_reverse);
    assert!(!parse_ok("OCTREV no").dialect.octave_reverse);
    assert!(parse_ok("OCTREV 1").dialect.octave_reverse);
    assert!(!parse_ok("OCTREV 0").dialect.octave_reverse);
    assert!(parse_ok("OCTREV TRUE").dialect.octave_reverse);
    assert!(!parse_ok("OCTREV false").dialect.octave_reverse);

    assert!(matches!(parse_err("OCTREV q").kind, ParseErrorKind::ExpectedBoolean));
}

#[test]
fn short_quantize() {
    assert!(parse_ok("SHORTQUANTIZE yes").dialect.short_quantize);
    assert!(!parse_ok("SHORTQ no").dialect.short_quantize);
    assert!(parse_ok("SHORTQ 1").dialect.short_quantize);
    assert!(!parse_ok("SHORTQ false").dialect.short_quantize);

    assert!(matches!(parse_err("SHORTQ q").kind, ParseErrorKind::ExpectedBoolean));
}

#[test]
fn transclude_macro() {
    assert!(parse_ok("TRANSCLUDEMACRO yes").dialect.transclude_macro);
    assert!(!parse_ok("TMACRO no").dialect.transclude_macro);
}

#[test]
fn unknown_directive() {
    let e = parse_err("TITLE a\n  FOO bar");
    assert!(matches!(e.kind, ParseErrorKind::UnknownDirective(ref d) if d == "FOO"));
    assert_eq!(e.pos.line_number(), 2);
    assert_eq!(e.pos.line_char(), 3);
}

#[test]
fn unexpected_braces() {
    assert!(matches!(parse_err("TITLE a\n{ }").kind, ParseErrorKind::UnexpectedBodyStart));
    assert!(matches!(parse_err("}").kind, ParseErrorKind::UnexpectedBodyEnd));
    assert!(matches!(parse_err("PAT\n{ c }").kind, ParseErrorKind::MissingName));
}

#[test]
fn pending_body_is_cleared_by_other_directives() {
    let e = parse_err("PAT foo\nTITLE a\n{ c }");
    assert!(matches!(e.kind, ParseErrorKind::UnexpectedBodyStart));
}
