//! Music abstract syntax tree

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::data::{Name, NamedList};
use crate::errors::ValidationError;
use crate::notes::Note;

use std::fmt::{Display, Write};

/// An ordered list of commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSet {
    pub commands: Vec<Command>,
}

impl CommandSet {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, c: Command) {
        self.commands.push(c)
    }
}

/// A [`CommandSet`] that is played `repeats` times.
///
/// 0 repeats skips the loop, 1 repeat plays the body once without a loop marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub repeats: i32,
    pub commands: Vec<Command>,
}

impl Default for Loop {
    fn default() -> Self {
        Self {
            repeats: 2,
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowNote {
    pub note: Note,
    pub octave: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseWidth {
    pub width: i32,
    pub percent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ram {
    pub addr: i32,
    pub data: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: char,
    pub params: Vec<i64>,
}

/// A tracker row, every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub note: Option<RowNote>,
    pub wait: Option<i32>,
    pub volume: Option<i32>,
    pub pulse_width: Option<PulseWidth>,
    pub quant: Option<i32>,
    pub sustain: Option<i32>,
    pub ram: Option<Ram>,
    pub effect_ticks: Option<i32>,
    pub effect: Option<Effect>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayNote {
    pub note: Note,
    pub length: Option<i32>,
    pub extend: u8,
}

impl PlayNote {
    pub fn new(note: Note) -> Self {
        Self {
            note,
            length: None,
            extend: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CommandSet(CommandSet),
    Loop(Loop),
    Row(Row),
    PlayPattern(Name),
    PlayMacro(Name),
    JumpPattern(i32),
    End,
    PlayNote(PlayNote),
    Wait(i32),
    Volume(i32),
    PulseWidth(PulseWidth),
    Ram(Ram),
    Length(i32),
    StepOctave { up: bool },
    Octave(i32),
    Quant(i32),
    Sustain(i32),
    EffectTicks(i32),
    EffectStart(Effect),
}

/// Limits used when validating a command.
///
/// A `None` limit is not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bounds<'a> {
    pub min_octave: Option<i32>,
    pub max_octave: Option<i32>,
    pub max_wait: Option<i32>,
    pub max_width: Option<i32>,
    pub max_quant: Option<i32>,
    pub max_sustain: Option<i32>,
    pub max_length: Option<i32>,
    pub max_extend: Option<u8>,
    pub min_addr: i32,
    pub max_addr: Option<i32>,
    pub data_bits: u32,
    pub max_effect_ticks: Option<i32>,

    pub patterns: Option<&'a NamedList<CommandSet>>,
    pub macros: Option<&'a NamedList<CommandSet>>,
    pub effects: Option<&'a [char]>,
}

// Validation
// ==========

fn check_max(
    v: i32,
    max: Option<i32>,
    e: fn(i32, Option<i32>) -> ValidationError,
) -> Result<(), ValidationError> {
    match max {
        Some(m) if v > m => Err(e(v, max)),
        _ if v < 1 => Err(e(v, max)),
        _ => Ok(()),
    }
}

pub fn validate_wait(ticks: i32, max: Option<i32>) -> Result<(), ValidationError> {
    check_max(ticks, max, ValidationError::WaitOutOfRange)
}

pub fn validate_volume(volume: i32) -> Result<(), ValidationError> {
    match volume {
        0..=15 => Ok(()),
        v => Err(ValidationError::VolumeOutOfRange(v)),
    }
}

pub fn validate_length(length: i32, max: Option<i32>) -> Result<(), ValidationError> {
    check_max(length, max, ValidationError::LengthOutOfRange)
}

pub fn validate_quant(quant: i32, max: Option<i32>) -> Result<(), ValidationError> {
    check_max(quant, max, ValidationError::QuantOutOfRange)
}

pub fn validate_sustain(sustain: i32, max: Option<i32>) -> Result<(), ValidationError> {
    check_max(sustain, max, ValidationError::SustainOutOfRange)
}

pub fn validate_effect_ticks(ticks: i32, max: Option<i32>) -> Result<(), ValidationError> {
    check_max(ticks, max, ValidationError::EffectTicksOutOfRange)
}

pub fn validate_octave(
    octave: i32,
    min: Option<i32>,
    max: Option<i32>,
) -> Result<(), ValidationError> {
    if let Some(min) = min {
        if octave < min {
            return Err(ValidationError::OctaveTooLow(octave, min));
        }
    }
    if let Some(max) = max {
        if octave > max {
            return Err(ValidationError::OctaveTooHigh(octave, max));
        }
    }
    Ok(())
}

fn validate_name(
    name: &Name,
    names: Option<&NamedList<CommandSet>>,
    e: fn(Name) -> ValidationError,
) -> Result<(), ValidationError> {
    match names {
        Some(n) if !n.contains(name.as_str()) => Err(e(name.clone())),
        _ => Ok(()),
    }
}

impl PulseWidth {
    /// Raw pulse width, percentages are scaled to `max_width`
    pub fn out_of(&self, max_width: i32) -> i32 {
        if self.percent {
            let w = i64::from(max_width) * i64::from(self.width) / 100;
            w.clamp(0, max_width.into()) as i32
        } else {
            self.width
        }
    }

    pub fn validate(&self, max_width: Option<i32>) -> Result<(), ValidationError> {
        if self.percent {
            match self.width {
                0..=100 => Ok(()),
                w => Err(ValidationError::PulseWidthPercentOutOfRange(w)),
            }
        } else {
            match max_width {
                Some(m) if self.width > m => {
                    Err(ValidationError::PulseWidthOutOfRange(self.width, max_width))
                }
                _ if self.width < 0 => Err(ValidationError::PulseWidthOutOfRange(self.width, None)),
                _ => Ok(()),
            }
        }
    }
}

impl Ram {
    pub fn validate(&self, b: &Bounds) -> Result<(), ValidationError> {
        let Some(max) = b.max_addr else {
            return Ok(());
        };

        if self.addr < b.min_addr || self.addr > max {
            return Err(ValidationError::RamAddressOutOfRange {
                addr: self.addr,
                min: b.min_addr,
                max,
            });
        }

        let mask = 1_i64.checked_shl(b.data_bits).map_or(-1, |m| m - 1);
        if i64::from(self.data) & mask != i64::from(self.data) {
            return Err(ValidationError::RamDataOutOfRange {
                data: self.data,
                bits: b.data_bits,
            });
        }
        Ok(())
    }
}

impl Effect {
    pub fn validate(&self, effects: Option<&[char]>) -> Result<(), ValidationError> {
        match effects {
            Some(e) if !e.contains(&self.kind) => Err(ValidationError::UnsupportedEffect(self.kind)),
            _ => Ok(()),
        }
    }
}

impl PlayNote {
    pub fn validate(&self, max_length: Option<i32>, max_extend: Option<u8>) -> Result<(), ValidationError> {
        if let Some(l) = self.length {
            check_max(l, max_length, ValidationError::NoteLengthOutOfRange)?;
        }
        match max_extend {
            Some(0) if self.extend > 0 => Err(ValidationError::NoteExtensionNotAllowed),
            Some(m) if self.extend > m => Err(ValidationError::NoteExtensionOutOfRange(self.extend, m)),
            _ => Ok(()),
        }
    }
}

impl Row {
    pub fn validate(&self, b: &Bounds) -> Result<(), ValidationError> {
        if let Some(RowNote {
            note,
            octave: Some(o),
        }) = self.note
        {
            if note != Note::Rest {
                validate_octave(o, b.min_octave, b.max_octave)?;
            }
        }
        if let Some(w) = self.wait {
            validate_wait(w, b.max_wait)?;
        }
        if let Some(v) = self.volume {
            validate_volume(v)?;
        }
        if let Some(pw) = &self.pulse_width {
            pw.validate(b.max_width)?;
        }
        if let Some(q) = self.quant {
            validate_quant(q, b.max_quant)?;
        }
        if let Some(s) = self.sustain {
            validate_sustain(s, b.max_sustain)?;
        }
        if let Some(ram) = &self.ram {
            ram.validate(b)?;
        }
        if let Some(t) = self.effect_ticks {
            validate_effect_ticks(t, b.max_effect_ticks)?;
        }
        if let Some(e) = &self.effect {
            e.validate(b.effects)?;
        }
        Ok(())
    }
}

impl Command {
    /// Checks the command's fields against `b`.
    ///
    /// Child commands of a [`CommandSet`] or [`Loop`] are not validated.
    pub fn validate(&self, b: &Bounds) -> Result<(), ValidationError> {
        match self {
            Self::CommandSet(_) | Self::JumpPattern(_) | Self::End | Self::StepOctave { .. } => {
                Ok(())
            }
            Self::Loop(l) => match l.repeats {
                r if r < 0 => Err(ValidationError::NegativeLoopRepeats(r)),
                _ => Ok(()),
            },
            Self::Row(r) => r.validate(b),
            Self::PlayPattern(n) => validate_name(n, b.patterns, ValidationError::UndefinedPattern),
            Self::PlayMacro(n) => validate_name(n, b.macros, ValidationError::UndefinedMacro),
            Self::PlayNote(n) => n.validate(b.max_length, b.max_extend),
            Self::Wait(t) => validate_wait(*t, b.max_wait),
            Self::Volume(v) => validate_volume(*v),
            Self::PulseWidth(pw) => pw.validate(b.max_width),
            Self::Ram(r) => r.validate(b),
            Self::Length(l) => validate_length(*l, b.max_length),
            Self::Octave(o) => validate_octave(*o, b.min_octave, b.max_octave),
            Self::Quant(q) => validate_quant(*q, b.max_quant),
            Self::Sustain(s) => validate_sustain(*s, b.max_sustain),
            Self::EffectTicks(t) => validate_effect_ticks(*t, b.max_effect_ticks),
            Self::EffectStart(e) => e.validate(b.effects),
        }
    }
}

// Display
// =======

pub(crate) fn hexify(n: i64, len: usize) -> String {
    if n < 0 {
        format!("$-{:0len$x}", n.unsigned_abs(), len = len.saturating_sub(1))
    } else {
        format!("${:0len$x}", n, len = len)
    }
}

impl Display for PulseWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.percent {
            true => write!(f, "/{}", self.width),
            false => write!(f, "%{}", self.width),
        }
    }
}

impl Display for Ram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "!{}:{}",
            hexify(self.addr.into(), 2),
            hexify(self.data.into(), 2)
        )
    }
}

impl Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.kind)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_char(':')?;
            }
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = Vec::new();

        if let Some(w) = self.wait {
            out.push(format!("w{}", w));
        }
        if let Some(v) = self.volume {
            out.push(format!("v{}", v));
        }
        if let Some(pw) = self.pulse_width {
            out.push(pw.to_string());
        }
        if let Some(q) = self.quant {
            out.push(format!("q{}", q));
        }
        if let Some(s) = self.sustain {
            out.push(format!("s{}", s));
        }
        if let Some(ram) = self.ram {
            out.push(ram.to_string());
        }
        if let Some(t) = self.effect_ticks {
            out.push(format!("xt{}", t));
        }
        if let Some(e) = &self.effect {
            out.push(e.to_string());
        }
        if let Some(n) = self.note {
            match (n.note, n.octave) {
                (Note::Rest, _) => out.push("-".to_owned()),
                (note, Some(o)) => out.push(note.tracker_str(o)),
                (note, None) => out.push(note.mml_str().to_ascii_uppercase()),
            }
        }

        write!(f, "ROW {}", out.join(", "))
    }
}

impl Display for PlayNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.note.mml_str())?;
        if let Some(l) = self.length {
            write!(f, "{}", l)?;
        }
        for _ in 0..self.extend {
            f.write_char('.')?;
        }
        Ok(())
    }
}

fn fmt_children(
    f: &mut std::fmt::Formatter<'_>,
    commands: &[Command],
    indent: usize,
) -> std::fmt::Result {
    for c in commands {
        f.write_char('\n')?;
        c.fmt_indented(f, indent)?;
    }
    Ok(())
}

impl Command {
    fn fmt_indented(&self, f: &mut std::fmt::Formatter<'_>, indent: usize) -> std::fmt::Result {
        write!(f, "{:indent$}", "", indent = indent)?;

        match self {
            Self::CommandSet(cs) => {
                f.write_str("CommandSet:")?;
                fmt_children(f, &cs.commands, indent + 2)
            }
            Self::Loop(l) => {
                write!(f, "Loop({}) [", l.repeats)?;
                fmt_children(f, &l.commands, indent + 2)?;
                write!(f, "\n{:indent$}]", "", indent = indent)
            }
            Self::Row(r) => write!(f, "{}", r),
            Self::PlayPattern(n) => write!(f, "PlayPattern {}", n),
            Self::PlayMacro(n) => write!(f, "MACRO {}", n),
            Self::JumpPattern(o) => write!(f, "JumpPattern {}", o),
            Self::End => f.write_str("END"),
            Self::PlayNote(n) => write!(f, "{}", n),
            Self::Wait(t) => write!(f, "w{}", t),
            Self::Volume(v) => write!(f, "v{}", v),
            Self::PulseWidth(pw) => write!(f, "{}", pw),
            Self::Ram(r) => write!(f, "{}", r),
            Self::Length(l) => write!(f, "l{}", l),
            Self::StepOctave { up: true } => f.write_char('>'),
            Self::StepOctave { up: false } => f.write_char('<'),
            Self::Octave(o) => write!(f, "o{}", o),
            Self::Quant(q) => write!(f, "q{}", q),
            Self::Sustain(s) => write!(f, "s{}", s),
            Self::EffectTicks(t) => write!(f, "xt{}", t),
            Self::EffectStart(e) => write!(f, "{}", e),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl Display for CommandSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CommandSet:")?;
        fmt_children(f, &self.commands, 2)
    }
}
