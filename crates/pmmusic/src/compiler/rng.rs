//! Random number generator used by the `xr` effect

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

/// MSVC style linear congruential generator
#[derive(Debug, Clone)]
pub(crate) struct Rng {
    state: u32,
}

impl Rng {
    pub fn new() -> Self {
        Self { state: 1 }
    }

    pub fn srand(&mut self, seed: i64) {
        self.state = seed as u32;
    }

    /// Returns a value between 0 and 0x7fff
    pub fn rand(&mut self) -> i32 {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345);
        ((self.state >> 16) & 0x7fff) as i32
    }
}
