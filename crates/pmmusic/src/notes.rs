//! Note and pitch functions and structs

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// A note within an octave.
///
/// `CFlat` and `BSharp` spill into the previous and next octave.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Note {
    Rest,
    CFlat,
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
    BSharp,
}

const NOTES: [Note; 14] = [
    Note::CFlat,
    Note::C,
    Note::CSharp,
    Note::D,
    Note::DSharp,
    Note::E,
    Note::F,
    Note::FSharp,
    Note::G,
    Note::GSharp,
    Note::A,
    Note::ASharp,
    Note::B,
    Note::BSharp,
];

fn parse_pitch_char(c: char) -> Option<i32> {
    match c.to_ascii_lowercase() {
        'c' => Some(0),
        'd' => Some(2),
        'e' => Some(4),
        'f' => Some(5),
        'g' => Some(7),
        'a' => Some(9),
        'b' => Some(11),
        _ => None,
    }
}

impl Note {
    /// Semitones above C, `None` for a rest
    pub fn semitone(self) -> Option<i32> {
        match self {
            Note::Rest => None,
            n => NOTES
                .iter()
                .position(|&i| i == n)
                .and_then(|i| i32::try_from(i).ok())
                .map(|i| i - 1),
        }
    }

    pub fn from_semitone(s: i32) -> Option<Note> {
        usize::try_from(s + 1)
            .ok()
            .and_then(|i| NOTES.get(i))
            .copied()
    }

    /// A natural note from its letter (case insensitive)
    pub fn from_letter(c: char) -> Option<Note> {
        parse_pitch_char(c).and_then(Self::from_semitone)
    }

    /// Parses an MML note: a letter followed by an optional `-` (flat), `+` or `#` (sharp).
    pub fn parse_mml(s: &str) -> Option<Note> {
        let mut chars = s.chars();
        let pitch = parse_pitch_char(chars.next()?)?;

        let offset = match chars.next() {
            None => 0,
            Some('-') => -1,
            Some('+') | Some('#') => 1,
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }

        Self::from_semitone(pitch + offset)
    }

    /// MML spelling of the note (`c`, `c+`, `c-`, `r`)
    pub fn mml_str(self) -> &'static str {
        match self {
            Note::Rest => "r",
            Note::CFlat => "c-",
            Note::C => "c",
            Note::CSharp => "c+",
            Note::D => "d",
            Note::DSharp => "d+",
            Note::E => "e",
            Note::F => "f",
            Note::FSharp => "f+",
            Note::G => "g",
            Note::GSharp => "g+",
            Note::A => "a",
            Note::ASharp => "a+",
            Note::B => "b",
            Note::BSharp => "b+",
        }
    }

    /// Tracker spelling of the note and octave (`E-5`, `C#4`).
    ///
    /// `CFlat` and `BSharp` are written as the equivalent note in the neighbouring octave.
    pub fn tracker_str(self, octave: i32) -> String {
        let (n, octave) = match self {
            Note::Rest => return "---".to_owned(),
            Note::CFlat => (Note::B, octave - 1),
            Note::BSharp => (Note::C, octave + 1),
            n => (n, octave),
        };
        let s = n.mml_str().to_ascii_uppercase().replace('+', "#");
        if s.len() == 1 {
            format!("{}-{}", s, octave)
        } else {
            format!("{}{}", s, octave)
        }
    }
}
