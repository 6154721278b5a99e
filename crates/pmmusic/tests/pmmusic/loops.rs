// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{pattern_error, pattern_words};

use pmmusic::errors::{CompilerError, ValidationError};

const NOTE: [u16; 3] = [0x3706, 0x3bb8, 0x1ddc];

fn mark(id: u16) -> [u16; 2] {
    [0x8300, id << 10]
}

fn repeat(id: u16, n: u16) -> [u16; 2] {
    [0x8300, (id << 10) | n]
}

fn words(parts: &[&[u16]]) -> Vec<u16> {
    parts.concat()
}

#[test]
fn simple_loop() {
    assert_eq!(
        pattern_words("PAT foo { [ c ]3 }", "foo"),
        words(&[&mark(0), &NOTE, &repeat(0, 2)])
    );
    assert_eq!(
        pattern_words("PAT foo { [ c ] }", "foo"),
        words(&[&mark(0), &NOTE, &repeat(0, 1)])
    );
}

#[test]
fn zero_and_one_repeats() {
    assert!(pattern_words("PAT foo { [ c ]0 }", "foo").is_empty());
    assert_eq!(pattern_words("PAT foo { [ c ]1 }", "foo"), NOTE);
}

#[test]
fn track_loop() {
    assert_eq!(
        pattern_words("PAT_T foo {\n  LOOP\n  ROW w6, C-4\n  REPEAT 4\n}", "foo"),
        words(&[&mark(0), &NOTE, &repeat(0, 3)])
    );
}

#[test]
fn three_nested_loops() {
    assert_eq!(
        pattern_words("PAT foo { [[[ c ]]] }", "foo"),
        words(&[
            &mark(0),
            &mark(1),
            &mark(2),
            &NOTE,
            &repeat(2, 1),
            &repeat(1, 1),
            &repeat(0, 1)
        ])
    );
}

#[test]
fn four_nested_loops() {
    assert_eq!(
        pattern_error("PAT foo { [[[[ c ]]]] }", "foo"),
        CompilerError::LoopsExceeded
    );
}

#[test]
fn negative_repeats() {
    assert_eq!(
        pattern_error("PAT foo { [ c ]-1 }", "foo"),
        CompilerError::Validation(ValidationError::NegativeLoopRepeats(-1))
    );
}

#[test]
fn macro_loops_are_nested() {
    assert_eq!(
        pattern_words("MACRO A { [ c ] }\nPAT foo { [ A ] }", "foo"),
        words(&[&mark(0), &mark(1), &NOTE, &repeat(1, 1), &repeat(0, 1)])
    );
}
