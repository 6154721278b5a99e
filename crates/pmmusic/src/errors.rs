//! A single location for all of the errors in the music compiler

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::data::Name;
use crate::file_pos::FilePos;

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Bgm,
    Track,
    Mml,
    Description,
}

#[derive(Debug)]
pub enum ParseErrorKind {
    UnexpectedCharacter(char),
    UnexpectedEndOfFile(BlockKind),
    UnexpectedBodyStart,
    UnexpectedBodyEnd,

    UnknownDirective(String),
    UnknownTrackCommand(String),
    UnknownRowCommand(String),
    MissingName,
    InvalidName(String),

    ExpectedNumber,
    ExpectedFloat,
    ExpectedBoolean,
    ExpectedEffect,
    NumberOutOfRange(i64),
    WrongNumberOfArguments(&'static str, usize),

    IncludeNotSupported,
    RecursiveInclude(String),
    CannotLoadInclude(String, String),
    InIncludedFile(String, Box<ParseError>),

    MasterBpmArguments,
    InvalidBpm,
    InvalidBpmWait(i64),
    InvalidVolLevel(String),
    InvalidSystemVolume(i64),

    MultipleBgmLoops,
    UnexpectedEndLoop,
    UnclosedLoop,
}

#[derive(Debug)]
pub struct ParseError {
    pub pos: FilePos,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(text: &str, index: usize, kind: ParseErrorKind) -> Self {
        Self {
            pos: FilePos::from_index(text, index),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    WaitOutOfRange(i32, Option<i32>),
    VolumeOutOfRange(i32),
    PulseWidthPercentOutOfRange(i32),
    PulseWidthOutOfRange(i32, Option<i32>),
    QuantOutOfRange(i32, Option<i32>),
    SustainOutOfRange(i32, Option<i32>),
    LengthOutOfRange(i32, Option<i32>),
    NoteLengthOutOfRange(i32, Option<i32>),
    NoteExtensionNotAllowed,
    NoteExtensionOutOfRange(u8, u8),
    OctaveTooLow(i32, i32),
    OctaveTooHigh(i32, i32),
    RamAddressOutOfRange { addr: i32, min: i32, max: i32 },
    RamDataOutOfRange { data: i32, bits: u32 },
    EffectTicksOutOfRange(i32, Option<i32>),
    NegativeLoopRepeats(i32),

    UndefinedPattern(Name),
    UndefinedMacro(Name),
    UnsupportedEffect(char),
    EffectArguments(char, usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompilerError {
    NoBgm(String),
    NoPattern(String),
    NoSfx(String),
    WeirdBgm(Name),
    LoopsExceeded,
    UnexpectedPlayPattern(Name),
    UnexpectedCommandSet,
    Validation(ValidationError),
}

impl From<ValidationError> for CompilerError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// Display
// =======

impl Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bgm => write!(f, "BGM"),
            Self::Track => write!(f, "TRACK"),
            Self::Mml => write!(f, "MML"),
            Self::Description => write!(f, "DESCRIPTION"),
        }
    }
}

impl Display for ParseErrorKind {
    #[rustfmt::skip::macros(write)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character {:?}", c),
            Self::UnexpectedEndOfFile(b) => write!(f, "unexpected end of file while processing {}", b),
            Self::UnexpectedBodyStart => write!(f, "unexpected start of body"),
            Self::UnexpectedBodyEnd => write!(f, "unexpected end of body"),

            Self::UnknownDirective(s) => write!(f, "unknown directive {}", s),
            Self::UnknownTrackCommand(s) => write!(f, "unknown track command {}", s),
            Self::UnknownRowCommand(s) => write!(f, "unknown ROW command {:?}", s),
            Self::MissingName => write!(f, "expected name"),
            Self::InvalidName(s) => write!(f, "invalid name {:?}", s),

            Self::ExpectedNumber => write!(f, "expected number"),
            Self::ExpectedFloat => write!(f, "expected float"),
            Self::ExpectedBoolean => write!(f, "expected boolean"),
            Self::ExpectedEffect => write!(f, "expected effect"),
            Self::NumberOutOfRange(n) => write!(f, "number out of range ({})", n),
            Self::WrongNumberOfArguments(c, n) => write!(f, "{} expects {} argument(s)", c, n),

            Self::IncludeNotSupported => write!(f, "INCLUDE not supported"),
            Self::RecursiveInclude(s) => write!(f, "recursive INCLUDE {:?}", s),
            Self::CannotLoadInclude(s, e) => write!(f, "cannot load INCLUDE {:?}: {}", s, e),
            Self::InIncludedFile(s, e) => write!(f, "in {}: {}", s, e),

            Self::MasterBpmArguments => write!(f, "MASTERBPM expects two arguments"),
            Self::InvalidBpm => write!(f, "invalid BPM value to MASTERBPM, must be > 0"),
            Self::InvalidBpmWait(w) => write!(f, "invalid wait value to MASTERBPM ({}), must be between 0 and 255", w),
            Self::InvalidVolLevel(s) => write!(f, "invalid VOLLEVEL, must be mml or system, got {:?}", s),
            Self::InvalidSystemVolume(v) => write!(f, "invalid system volume level {}, must be between 0 and 3", v),

            Self::MultipleBgmLoops => write!(f, "can only mark one loop in BGM"),
            Self::UnexpectedEndLoop => write!(f, "unexpected end of loop"),
            Self::UnclosedLoop => write!(f, "loop is not closed"),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            // The included file's error already carries its own position
            ParseErrorKind::InIncludedFile(..) => write!(f, "{}", self.kind),
            _ => write!(f, "{} at {}", self.kind, self.pos),
        }
    }
}

fn write_max(f: &mut std::fmt::Formatter<'_>, name: &str, v: i32, max: &Option<i32>) -> std::fmt::Result {
    match max {
        Some(max) => write!(f, "invalid {} {}, must be between 1 and {}", name, v, max),
        None => write!(f, "invalid {} {}, must be at least 1", name, v),
    }
}

impl Display for ValidationError {
    #[rustfmt::skip::macros(write)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitOutOfRange(v, max) => write_max(f, "wait", *v, max),
            Self::VolumeOutOfRange(v) => write!(f, "invalid volume {}, must be between 0 and 15", v),
            Self::PulseWidthPercentOutOfRange(v) => write!(f, "invalid pulse width {}, must be between 0% and 100%", v),
            Self::PulseWidthOutOfRange(v, Some(max)) => write!(f, "invalid pulse width {}, must be between 0 and {}", v, max),
            Self::PulseWidthOutOfRange(v, None) => write!(f, "invalid pulse width {}, cannot be negative", v),
            Self::QuantOutOfRange(v, max) => write_max(f, "quant", *v, max),
            Self::SustainOutOfRange(v, max) => write_max(f, "sustain", *v, max),
            Self::LengthOutOfRange(v, max) => write_max(f, "length", *v, max),
            Self::NoteLengthOutOfRange(v, max) => write_max(f, "note length", *v, max),
            Self::NoteExtensionNotAllowed => write!(f, "note length extension is not allowed"),
            Self::NoteExtensionOutOfRange(_, max) => write!(f, "invalid note length extension, max is {}", ".".repeat((*max).into())),
            Self::OctaveTooLow(o, min) => write!(f, "invalid octave {}, must be at least {}", o, min),
            Self::OctaveTooHigh(o, max) => write!(f, "invalid octave {}, must be no more than {}", o, max),
            Self::RamAddressOutOfRange { addr, min, max } => write!(f, "invalid RAM address {}, must be between {} and {}", hex(*addr, 4), hex(*min, 4), hex(*max, 4)),
            Self::RamDataOutOfRange { data, bits } => write!(f, "invalid RAM data {}, does not fit within {} bits", hex(*data, 2), bits),
            Self::EffectTicksOutOfRange(v, max) => write_max(f, "effect ticks", *v, max),
            Self::NegativeLoopRepeats(_) => write!(f, "loop repeats must be 0 or more"),

            Self::UndefinedPattern(n) => write!(f, "pattern {:?} is not defined", n.as_str()),
            Self::UndefinedMacro(n) => write!(f, "macro {:?} is not defined", n.as_str()),
            Self::UnsupportedEffect(c) => write!(f, "effect {:?} is not supported", c),
            Self::EffectArguments(c, n) => write!(f, "x{} expects at most {} argument(s)", c, n),
        }
    }
}

fn hex(v: i32, len: usize) -> String {
    format!("${:0len$x}", v, len = len)
}

impl Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBgm(n) => write!(f, "no BGM {}", n),
            Self::NoPattern(n) => write!(f, "no pattern {}", n),
            Self::NoSfx(n) => write!(f, "no sfx {}", n),
            Self::WeirdBgm(n) => write!(f, "BGM {} must only contain pattern references", n),
            Self::LoopsExceeded => write!(f, "number of loops exceeded"),
            Self::UnexpectedPlayPattern(n) => write!(f, "unexpected PlayPattern {}", n),
            Self::UnexpectedCommandSet => write!(f, "unexpected CommandSet"),
            Self::Validation(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for CompilerError {}
