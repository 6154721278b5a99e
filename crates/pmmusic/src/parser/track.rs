//! Tracker dialect parser

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::scanner::{is_space, BodyEnd, Scanner};
use super::LoopStack;
use crate::ast::{Command, CommandSet, Effect, PulseWidth, Ram, Row, RowNote};
use crate::data::Name;
use crate::errors::{BlockKind, ParseError, ParseErrorKind};
use crate::notes::Note;
use crate::number_parsing::{parse_colon_list, parse_num1, read_num, to_i32};

const DEFAULT_OCTAVE: i32 = 4;

fn is_separator(b: u8, end: BodyEnd) -> bool {
    b == b',' || b == b';' || is_space(b, end)
}

pub(crate) fn parse_track(s: &mut Scanner, end: BodyEnd) -> Result<CommandSet, ParseError> {
    let start = s.pos();
    let mut loops = LoopStack::new();
    let mut last_octave = DEFAULT_OCTAVE;

    loop {
        if s.at_body_end(end) {
            return loops.finish().map_err(|k| s.error(k));
        }
        if s.is_at_end() {
            return Err(s.error_at(start, ParseErrorKind::UnexpectedEndOfFile(BlockKind::Track)));
        }
        if s.skip_comment() {
            continue;
        }

        match s.first_byte() {
            Some(b) if is_separator(b, end) => {
                s.read_while(|b| is_separator(b, end));
            }
            _ => {
                let cmd_pos = s.pos();
                let Some(cmd) = s.read_name() else {
                    return Err(s.unexpected_character());
                };
                let args = s.read_command_arguments();

                match cmd.to_ascii_uppercase().as_str() {
                    "ROW" => {
                        let row = match args {
                            Some((pos, args)) => parse_row(s, pos, args, &mut last_octave)?,
                            None => Row::default(),
                        };
                        loops.push(Command::Row(row));
                    }
                    "LOOP" | "MARK" | "DO" => loops.start_loop(),
                    "ENDLOOP" | "ENDL" | "REPEAT" => {
                        let repeats = match args {
                            Some((pos, a)) if !a.trim().is_empty() => {
                                let r = parse_num1(a.trim()).and_then(to_i32);
                                Some(r.map_err(|k| s.error_at(pos, k))?)
                            }
                            _ => None,
                        };
                        loops
                            .end_loop(repeats)
                            .map_err(|k| s.error_at(cmd_pos, k))?;
                    }
                    "MACRO" => {
                        let name = match args {
                            Some((pos, a)) => {
                                let a = a.trim();
                                Name::try_new(a.to_owned()).ok_or_else(|| {
                                    s.error_at(pos, ParseErrorKind::InvalidName(a.to_owned()))
                                })?
                            }
                            None => return Err(s.error(ParseErrorKind::MissingName)),
                        };
                        loops.push(Command::PlayMacro(name));
                    }
                    "END" => loops.push(Command::End),
                    _ => {
                        return Err(s.error_at(
                            cmd_pos,
                            ParseErrorKind::UnknownTrackCommand(cmd.to_owned()),
                        ))
                    }
                }
            }
        }
    }
}

/// Parses the `,` or `;` separated fields of a `ROW` command
fn parse_row(
    s: &Scanner,
    args_pos: usize,
    args: &str,
    last_octave: &mut i32,
) -> Result<Row, ParseError> {
    let mut row = Row::default();

    let mut offset = 0;
    for sub in args.split([',', ';']) {
        let sub_pos = args_pos + offset + (sub.len() - sub.trim_start().len());
        offset += sub.len() + 1;

        let sub = sub.trim();
        if sub.is_empty() {
            continue;
        }

        parse_row_field(&mut row, sub, last_octave).map_err(|k| s.error_at(sub_pos, k))?;
    }

    Ok(row)
}

/// Returns the number if it fills all of `s`
fn whole_num(s: &str) -> Result<Option<i64>, ParseErrorKind> {
    match read_num(s)? {
        Some((v, len)) if len == s.len() => Ok(Some(v)),
        _ => Ok(None),
    }
}

/// Parses a note field (`E-5`, `C#4`, `f_3`, `A`).
///
/// The octave is optional and defaults to the last octave used in the block.
fn parse_row_note(s: &str, last_octave: i32) -> Result<Option<(Note, i32)>, ParseErrorKind> {
    let mut chars = s.chars();
    let Some(natural) = chars.next().and_then(Note::from_letter) else {
        return Ok(None);
    };
    let rest = chars.as_str();

    let octave = |s: &str| -> Result<Option<i32>, ParseErrorKind> {
        if s.is_empty() {
            return Ok(Some(last_octave));
        }
        whole_num(s)?.map(to_i32).transpose()
    };

    let sharp = match rest.bytes().next() {
        Some(b'-' | b'_' | b' ') => Some(false),
        Some(b'+' | b'#') => Some(true),
        _ => None,
    };
    if let Some(sharp) = sharp {
        if let Some(o) = octave(&rest[1..])? {
            let note = match (sharp, natural.semitone()) {
                (true, Some(n)) => Note::from_semitone(n + 1).unwrap_or(natural),
                _ => natural,
            };
            return Ok(Some((note, o)));
        }
    }

    Ok(octave(rest)?.map(|o| (natural, o)))
}

fn one_argument(name: &'static str, args: &str) -> Result<i32, ParseErrorKind> {
    match parse_colon_list(args)?.as_slice() {
        &[a] => to_i32(a),
        l => Err(ParseErrorKind::WrongNumberOfArguments(name, l.len())),
    }
}

fn parse_row_field(row: &mut Row, sub: &str, last_octave: &mut i32) -> Result<(), ParseErrorKind> {
    if let Some((note, octave)) = parse_row_note(sub, *last_octave)? {
        *last_octave = octave;
        row.note = Some(RowNote {
            note,
            octave: Some(octave),
        });
        return Ok(());
    }

    let mut chars = sub.chars();
    let c = chars.next().map(|c| c.to_ascii_lowercase());
    let args = chars.as_str();

    match c {
        Some('-' | '_') => match args.chars().next() {
            Some(c) => return Err(ParseErrorKind::UnexpectedCharacter(c)),
            None => {
                row.note = Some(RowNote {
                    note: Note::Rest,
                    octave: None,
                })
            }
        },
        Some('w') => row.wait = Some(one_argument("w", args)?),
        Some('v') => row.volume = Some(one_argument("v", args)?),
        Some('q') => row.quant = Some(one_argument("q", args)?),
        Some('s') => row.sustain = Some(one_argument("s", args)?),
        Some('%') => {
            row.pulse_width = Some(PulseWidth {
                width: one_argument("%", args)?,
                percent: false,
            })
        }
        Some('/' | '\\') => {
            row.pulse_width = Some(PulseWidth {
                width: one_argument("/", args)?,
                percent: true,
            })
        }
        Some('!') => match parse_colon_list(args)?.as_slice() {
            &[addr, data] => {
                row.ram = Some(Ram {
                    addr: to_i32(addr)?,
                    data: to_i32(data)?,
                })
            }
            l => return Err(ParseErrorKind::WrongNumberOfArguments("!", l.len())),
        },
        Some('x') => {
            let mut chars = args.chars();
            let kind = chars.next().ok_or(ParseErrorKind::ExpectedEffect)?;
            let args = chars.as_str();

            if kind == 't' {
                row.effect_ticks = Some(one_argument("xt", args)?);
            } else {
                row.effect = Some(Effect {
                    kind,
                    params: parse_colon_list(args)?,
                });
            }
        }
        _ => return Err(ParseErrorKind::UnknownRowCommand(sub.to_owned())),
    }

    Ok(())
}
