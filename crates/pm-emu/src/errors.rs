//! Sound emulator errors

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::fmt::Display;

/// A fault in a compiled command stream.
///
/// The engine disables both streams before returning one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    BgmOutOfRange,
    SfxOutOfRange,
    InvalidPattern(i32),
    RecursiveOverflow,
    MissingLoopMark(u8),
    RamOffsetOutOfRange(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError(pub String);

#[derive(Debug)]
pub enum PlayerError {
    Engine(EngineError),
    Sink(SinkError),
}

impl From<EngineError> for PlayerError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<SinkError> for PlayerError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BgmOutOfRange => write!(f, "player error: BGM out of range"),
            Self::SfxOutOfRange => write!(f, "player error: SFX out of range"),
            Self::InvalidPattern(p) => write!(f, "player error: BGM invalid pattern {}", p),
            Self::RecursiveOverflow => write!(f, "player error: recursive overflow"),
            Self::MissingLoopMark(id) => write!(f, "player error: no loop mark for loop {}", id),
            Self::RamOffsetOutOfRange(o) => write!(f, "RAM offset out of range: {:#06x}", o),
        }
    }
}

impl Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for PlayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(e) => e.fmt(f),
            Self::Sink(e) => write!(f, "audio output error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for SinkError {}
impl std::error::Error for PlayerError {}
