//! Pokémon mini sound hardware and music engine emulator

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

pub mod engine;
pub mod errors;
pub mod filters;
pub mod player;
pub mod registers;
pub mod synth;
pub mod timers;

pub use engine::MusicEngine;
pub use filters::Filter;
pub use player::{Player, Sink};
pub use synth::{SoundEngine, AUDIO_FREQ};
