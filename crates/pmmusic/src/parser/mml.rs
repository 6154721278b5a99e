//! MML dialect parser

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::scanner::{is_space, BodyEnd, Scanner};
use super::LoopStack;
use crate::ast::{Command, CommandSet, Effect, PlayNote, PulseWidth, Ram};
use crate::data::Name;
use crate::driver_constants::MAX_NOTE_EXTENSION;
use crate::errors::{BlockKind, ParseError, ParseErrorKind};
use crate::notes::Note;
use crate::number_parsing::{read_num, to_i32};
use crate::song::Dialect;

/// `v` values when `VOLLEVEL system` is used
const SYSTEM_VOLUME_TABLE: [i32; 4] = [0, 4, 8, 15];

fn read_optional_number(s: &mut Scanner) -> Result<Option<i64>, ParseError> {
    match read_num(s.remaining()) {
        Ok(Some((v, len))) => {
            s.advance(len);
            Ok(Some(v))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(s.error(e)),
    }
}

fn read_number(s: &mut Scanner) -> Result<i64, ParseError> {
    match read_optional_number(s)? {
        Some(v) => Ok(v),
        None => Err(s.error(ParseErrorKind::ExpectedNumber)),
    }
}

fn to_i32_at(s: &Scanner, pos: usize, v: i64) -> Result<i32, ParseError> {
    to_i32(v).map_err(|e| s.error_at(pos, e))
}

fn read_i32(s: &mut Scanner) -> Result<i32, ParseError> {
    let pos = s.pos();
    let v = read_number(s)?;
    to_i32_at(s, pos, v)
}

/// Reads the optional length and dots of a note or rest
fn read_note_length(s: &mut Scanner, note: Note) -> Result<PlayNote, ParseError> {
    let pos = s.pos();
    let length = read_optional_number(s)?
        .map(to_i32)
        .transpose()
        .map_err(|e| s.error_at(pos, e))?;

    let dots = s.remaining().bytes().take_while(|&b| b == b'.').count();
    let extend = dots.min(MAX_NOTE_EXTENSION.into());
    s.advance(extend);

    Ok(PlayNote {
        note,
        length,
        extend: extend as u8,
    })
}

fn parse_effect(s: &mut Scanner) -> Result<Command, ParseError> {
    let pos = s.pos();

    // skip `x`
    s.advance(1);
    let kind = match s.first_byte() {
        Some(b) if b.is_ascii_alphanumeric() || b == b'_' => b as char,
        _ => return Err(s.error(ParseErrorKind::ExpectedEffect)),
    };
    s.advance(1);

    let mut params = Vec::new();
    if let Some(v) = read_optional_number(s)? {
        params.push(v);

        while s.first_byte() == Some(b':') {
            match read_num(&s.remaining()[1..]) {
                Ok(Some((v, len))) => {
                    s.advance(len + 1);
                    params.push(v);
                }
                Ok(None) => break,
                Err(e) => return Err(s.error(e)),
            }
        }
    }

    if kind == 't' {
        match params.as_slice() {
            [] => Ok(Command::EffectTicks(1)),
            &[t] => Ok(Command::EffectTicks(to_i32(t).map_err(|e| s.error_at(pos, e))?)),
            l => Err(s.error_at(
                pos,
                ParseErrorKind::WrongNumberOfArguments("xt", l.len()),
            )),
        }
    } else {
        Ok(Command::EffectStart(Effect { kind, params }))
    }
}

/// Parses a single letter command with a required numeric argument
fn parse_value_command(s: &mut Scanner, c: u8, dialect: &Dialect) -> Result<Command, ParseError> {
    let pos = s.pos();
    s.advance(1);

    let cmd = match c {
        b'%' => Command::PulseWidth(PulseWidth {
            width: read_i32(s)?,
            percent: false,
        }),
        b'\\' | b'/' => Command::PulseWidth(PulseWidth {
            width: read_i32(s)?,
            percent: true,
        }),
        b'v' => {
            let v = read_number(s)?;
            if dialect.vol_level_is_mml {
                Command::Volume(to_i32_at(s, pos, v)?)
            } else {
                let v = usize::try_from(v)
                    .ok()
                    .and_then(|i| SYSTEM_VOLUME_TABLE.get(i))
                    .ok_or_else(|| s.error_at(pos, ParseErrorKind::InvalidSystemVolume(v)))?;
                Command::Volume(*v)
            }
        }
        b'w' => Command::Wait(read_i32(s)?),
        b'l' => Command::Length(read_i32(s)?),
        b'o' => Command::Octave(read_i32(s)?),
        b'q' => {
            let q = read_number(s)?;
            if dialect.short_quantize {
                Command::Quant(to_i32_at(s, pos, q.saturating_add(1).saturating_mul(7))?)
            } else {
                Command::Quant(to_i32_at(s, pos, q)?)
            }
        }
        b's' => Command::Sustain(read_i32(s)?),
        b'!' => {
            let addr = read_i32(s)?;
            if s.first_byte() != Some(b':') {
                return Err(s.error(ParseErrorKind::ExpectedNumber));
            }
            s.advance(1);
            let data = read_i32(s)?;
            Command::Ram(Ram { addr, data })
        }
        _ => return Err(s.error_at(pos, ParseErrorKind::UnexpectedCharacter(c as char))),
    };
    Ok(cmd)
}

pub(crate) fn parse_mml(
    s: &mut Scanner,
    end: BodyEnd,
    dialect: &Dialect,
) -> Result<CommandSet, ParseError> {
    let start = s.pos();
    let mut loops = LoopStack::new();

    loop {
        if s.at_body_end(end) {
            return loops.finish().map_err(|k| s.error(k));
        }
        if s.is_at_end() {
            return Err(s.error_at(start, ParseErrorKind::UnexpectedEndOfFile(BlockKind::Mml)));
        }
        if s.skip_comment() {
            continue;
        }

        let pos = s.pos();
        let Some(c) = s.first_byte() else {
            continue;
        };

        match c {
            b'[' => {
                s.advance(1);
                loops.start_loop();
            }
            b']' => {
                s.advance(1);
                let repeats = read_optional_number(s)?
                    .map(to_i32)
                    .transpose()
                    .map_err(|e| s.error_at(pos, e))?;
                loops.end_loop(repeats).map_err(|e| s.error_at(pos, e))?;
            }
            b'a'..=b'g' => {
                let len = match s.second_byte() {
                    Some(b'-' | b'+' | b'#') => 2,
                    _ => 1,
                };
                let note = Note::parse_mml(&s.remaining()[..len])
                    .ok_or_else(|| s.unexpected_character())?;
                s.advance(len);
                loops.push(Command::PlayNote(read_note_length(s, note)?));
            }
            b'r' => {
                s.advance(1);
                loops.push(Command::PlayNote(read_note_length(s, Note::Rest)?));
            }
            b'%' | b'\\' | b'/' | b'v' | b'w' | b'l' | b'o' | b'q' | b's' | b'!' => {
                loops.push(parse_value_command(s, c, dialect)?);
            }
            b'<' => {
                s.advance(1);
                loops.push(Command::StepOctave {
                    up: dialect.octave_reverse,
                });
            }
            b'>' => {
                s.advance(1);
                loops.push(Command::StepOctave {
                    up: !dialect.octave_reverse,
                });
            }
            b';' => {
                s.advance(1);
                loops.push(Command::End);
            }
            b'A'..=b'Z' => {
                s.advance(1);
                let name = Name::try_new((c as char).to_string())
                    .ok_or_else(|| s.error_at(pos, ParseErrorKind::UnexpectedCharacter(c as char)))?;
                loops.push(Command::PlayMacro(name));
            }
            b'x' => {
                loops.push(parse_effect(s)?);
            }
            c if is_space(c, end) => {
                s.read_while(|b| is_space(b, end));
            }
            _ => return Err(s.unexpected_character()),
        }
    }
}
