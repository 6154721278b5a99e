//! BGM pattern list parser

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::scanner::{is_space, BodyEnd, Scanner};
use crate::data::Name;
use crate::errors::{BlockKind, ParseError, ParseErrorKind};

/// The pattern names of a BGM.
///
/// `tail` contains the patterns after the `|` loop marker (if any).
#[derive(Debug, Default)]
pub(crate) struct PatternList {
    pub intro: Vec<Name>,
    pub tail: Option<Vec<Name>>,
}

fn is_separator(b: u8, end: BodyEnd) -> bool {
    b == b';' || is_space(b, end)
}

pub(crate) fn parse_pattern_list(
    s: &mut Scanner,
    end: BodyEnd,
) -> Result<PatternList, ParseError> {
    let start = s.pos();
    let mut out = PatternList::default();

    loop {
        if s.at_body_end(end) {
            return Ok(out);
        }
        if s.is_at_end() {
            return Err(s.error_at(start, ParseErrorKind::UnexpectedEndOfFile(BlockKind::Bgm)));
        }
        if s.skip_comment() {
            continue;
        }

        match s.first_byte() {
            Some(b'|') => {
                if out.tail.is_some() {
                    return Err(s.error(ParseErrorKind::MultipleBgmLoops));
                }
                s.advance(1);
                out.tail = Some(Vec::new());
            }
            Some(b) if is_separator(b, end) => {
                s.read_while(|b| is_separator(b, end));
            }
            _ => {
                let name = match s.read_name() {
                    Some(n) => Name::try_new(n.to_owned()),
                    None => None,
                };
                let Some(name) = name else {
                    return Err(s.unexpected_character());
                };

                match &mut out.tail {
                    Some(t) => t.push(name),
                    None => out.intro.push(name),
                }
            }
        }
    }
}
