//! Output filters

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::str::FromStr;

const HP_P_COEFF: i64 = 40960;
const LP_P_COEFF: i64 = 4096;
const LP_N_COEFF: i64 = 65535 - LP_P_COEFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    Disabled,
    #[default]
    Piezo,
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "piezo" => Ok(Self::Piezo),
            _ => Err(format!("unknown filter {:?}", s)),
        }
    }
}

fn clamp_i16(v: i64) -> i16 {
    v.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}

// 32 bit arithmetic shift of a wide product
fn shr16(v: i64) -> i64 {
    i64::from((v as i32) >> 16)
}

#[derive(Debug, Clone)]
pub(crate) struct FilterState {
    filter: Filter,
    hp: [i64; 4],
    lp: [i64; 4],
}

impl FilterState {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            hp: [0; 4],
            lp: [0; 4],
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn apply(&mut self, sample: i32) -> i16 {
        match self.filter {
            Filter::Disabled => clamp_i16(sample.into()),
            Filter::Piezo => self.piezo(sample.into()),
        }
    }

    fn piezo(&mut self, sample: i64) -> i16 {
        let prev = self.hp;
        let hp = &mut self.hp;

        // High pass to simulate a piezo speaker
        hp[0] = sample;
        hp[1] = shr16(HP_P_COEFF * (hp[0] + prev[1] - prev[0]));
        hp[2] = shr16(HP_P_COEFF * (hp[1] + prev[2] - prev[1]));
        hp[3] = shr16(HP_P_COEFF * (hp[2] + prev[3] - prev[2]));

        let sample = clamp_i16(hp[3] << 2);

        // Low pass to remove spikes
        let lp = &mut self.lp;
        lp[0] = sample.into();
        lp[1] = shr16(lp[1] * LP_P_COEFF + lp[0] * LP_N_COEFF);
        lp[2] = shr16(lp[2] * LP_P_COEFF + lp[1] * LP_N_COEFF);
        lp[3] = shr16(lp[3] * LP_P_COEFF + lp[2] * LP_N_COEFF);

        clamp_i16(lp[3] << 1)
    }
}
