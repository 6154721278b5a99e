//! Compiled sound-engine commands

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Flags of a [`CompiledCommand`]
pub mod flags {
    pub const VOL: u8 = 1;
    pub const WRITERAM: u8 = 2;
    pub const PRESET: u8 = 4;
    pub const PIVOT: u8 = 8;
    pub const END: u8 = 16;
    pub const PATTERN: u8 = 32;
    pub const MARK: u8 = 64;
    pub const LOOP: u8 = 128;
}

// Flags of the first word of an encoded command.
mod word_flags {
    pub const NO_VOLUME: u16 = 0x0300;
    pub const VOLUME: u16 = 0x0400;
    pub const WRITERAM: u16 = 0x0800;
    pub const PRESET: u16 = 0x1000;
    pub const PIVOT: u16 = 0x2000;
    pub const PATTERN: u16 = 0x4000;
    pub const LOOP: u16 = 0x8000;

    pub const END_MASK: u16 = 0xfc00;
    pub const END: u16 = 0x4401;
}

/// A single sound-engine command.
///
/// `flags` selects which fields are used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompiledCommand {
    pub flags: u8,
    pub wait: u8,
    pub volume: u8,
    pub ram_addr: u8,
    pub ram_data: u8,
    pub preset: u16,
    pub pivot: u16,
    /// Pattern offset in words (a jump) or patterns (`PATTERN` flag)
    pub pattern: i32,
    pub loop_id: u8,
    pub loop_num: i32,
}

impl CompiledCommand {
    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// A pattern jump or pattern end command
    pub fn jump(pattern: i32) -> Self {
        Self {
            flags: flags::PATTERN,
            pattern,
            ..Default::default()
        }
    }

    /// Encodes the command into 16 bit words
    pub fn to_words(&self) -> Vec<u16> {
        use word_flags as w;

        let mut out = vec![0];
        let mut first = u16::from(self.wait);

        if self.has(flags::VOL) {
            first |= w::VOLUME + (u16::from(self.volume & 3) << 8);
        } else {
            first |= w::NO_VOLUME;
        }
        if self.has(flags::WRITERAM) {
            first |= w::WRITERAM;
            out.push((u16::from(self.ram_addr) << 8) | u16::from(self.ram_data));
        }
        if self.has(flags::PRESET) {
            first |= w::PRESET;
            out.push(self.preset);
        }
        if self.has(flags::PIVOT) {
            first |= w::PIVOT;
            out.push(self.pivot);
        }

        if self.has(flags::END) {
            first &= w::END_MASK;
            first |= w::END;
            out.push(0);
        } else if self.has(flags::PATTERN) {
            first |= w::PATTERN;
            out.push(self.pattern.wrapping_mul(4) as u16);
        }

        let loop_id = u16::from(self.loop_id) << 10;
        if self.has(flags::MARK) {
            first |= w::LOOP;
            out.push(loop_id);
        } else if self.has(flags::LOOP) && self.loop_num != 0 {
            first |= w::LOOP;
            out.push(loop_id | (self.loop_num & 0xff) as u16);
        }

        out[0] = first;
        out
    }
}
