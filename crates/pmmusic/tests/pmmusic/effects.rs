// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::{compile_pattern, pattern_error};

use pmmusic::errors::{CompilerError, ValidationError};

const C4: u16 = 0x3bb8;
const E4: u16 = 0x2f65;
const G4: u16 = 0x27db;
const C5: u16 = 0x1ddb;

fn waits_and_presets(mml: &str) -> (Vec<u8>, Vec<u16>) {
    let c = compile_pattern(&format!("PAT foo {{ {} }}", mml), "foo").unwrap();
    for cmd in &c {
        assert_eq!(cmd.pivot, cmd.preset / 2, "default pulse width pivot");
    }
    (
        c.iter().map(|c| c.wait).collect(),
        c.iter().map(|c| c.preset).collect(),
    )
}

#[test]
fn arpeggio() {
    let (waits, presets) = waits_and_presets("xa4:7 c");
    assert_eq!(waits, [1; 6]);
    assert_eq!(presets, [C4, E4, G4, C4, E4, G4]);
}

#[test]
fn arpeggio_effect_ticks() {
    let (waits, presets) = waits_and_presets("xt2 xa4:7 c");
    assert_eq!(waits, [2, 2, 2]);
    assert_eq!(presets, [C4, E4, G4]);
}

#[test]
fn arpeggio_phase() {
    let (_, presets) = waits_and_presets("xA1 xa4:7 c");
    assert_eq!(presets, [E4, G4, C4, E4, G4, C4]);

    let (_, presets) = waits_and_presets("xA-1 xa4:7 c");
    assert_eq!(presets, [G4, C4, E4, G4, C4, E4]);
}

#[test]
fn arpeggio_off_portion_keeps_wait() {
    let (waits, presets) = waits_and_presets("q32 xa4:7 c");
    assert_eq!(waits, [1, 1, 1, 3]);
    assert_eq!(presets, [C4, E4, G4, C4]);
}

#[test]
fn portamento() {
    let (waits, presets) = waits_and_presets("xp12 c");
    assert_eq!(waits, [1; 6]);
    assert_eq!(presets, [C4, 0x36bd, 0x31c3, 0x2cc9, 0x27cf, 0x22d5]);
    assert!(presets.iter().all(|&p| p <= C4 && p > C5));
}

#[test]
fn random() {
    let (waits, presets) = waits_and_presets("xr12 c");
    assert_eq!(waits, [1; 6]);
    assert_eq!(presets, [0x2c5f, 0x3678, 0x3280, 0x2bc1, 0x1f6b, 0x3697]);

    let (_, reseeded) = waits_and_presets("xs1 xr12 c");
    assert_eq!(reseeded, presets);

    let (_, presets) = waits_and_presets("xs2 xr12 c");
    assert_eq!(presets[..2], [0x3ae4, 0x26ec]);
}

#[test]
fn seed_does_not_change_effect() {
    let (waits, presets) = waits_and_presets("xa4:7 xs5 c");
    assert_eq!(waits, [1; 6]);
    assert_eq!(presets, [C4, E4, G4, C4, E4, G4]);
}

#[test]
fn disable_effect() {
    let (waits, presets) = waits_and_presets("xa4:7 xd c");
    assert_eq!(waits, [6]);
    assert_eq!(presets, [C4]);
}

#[test]
fn effect_errors() {
    let error = |mml: &str| pattern_error(&format!("PAT foo {{ {} }}", mml), "foo");

    assert_eq!(
        error("xz"),
        CompilerError::Validation(ValidationError::UnsupportedEffect('z'))
    );
    assert_eq!(
        error("xd1"),
        CompilerError::Validation(ValidationError::EffectArguments('d', 0))
    );
    assert_eq!(
        error("xa1:2:3"),
        CompilerError::Validation(ValidationError::EffectArguments('a', 2))
    );
    assert_eq!(
        error("xp1:2"),
        CompilerError::Validation(ValidationError::EffectArguments('p', 1))
    );
    assert_eq!(
        error("xt0"),
        CompilerError::Validation(ValidationError::EffectTicksOutOfRange(0, Some(128)))
    );
}
