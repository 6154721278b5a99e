//! Music compiler

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod context;
mod rng;

use self::context::{map_volume, Context, EffectType};
use self::rng::Rng;
use crate::ast::{
    validate_effect_ticks, validate_length, validate_octave, validate_quant, validate_sustain,
    validate_volume, validate_wait, Bounds, Command, Effect, PlayNote, Row,
};
use crate::command::{flags, CompiledCommand};
use crate::data::{Name, NamedList};
use crate::driver_constants::*;
use crate::errors::{CompilerError, ValidationError};
use crate::notes::Note;
use crate::pitch_table::note_preset;
use crate::song::{Metadata, Song};

use std::collections::HashMap;

/// The presets of a rest
const REST_PRESETS: [i32; 3] = [-1; 3];

/// The BGM, pattern and SFX names to compile
#[derive(Debug, Clone, Default)]
pub struct CompileSelection {
    pub bgm: Vec<String>,
    pub pattern: Vec<String>,
    pub sfx: Vec<String>,
}

impl CompileSelection {
    /// Selects every BGM, pattern and SFX in the song
    pub fn all(song: &Song) -> Self {
        let names = |l: &NamedList<_>| l.names().map(|n| n.to_string()).collect();

        Self {
            bgm: names(&song.bgm),
            pattern: names(&song.pattern),
            sfx: names(&song.sfx),
        }
    }

    pub fn bgm(name: &str) -> Self {
        Self {
            bgm: vec![name.to_owned()],
            ..Default::default()
        }
    }

    pub fn sfx(name: &str) -> Self {
        Self {
            sfx: vec![name.to_owned()],
            ..Default::default()
        }
    }

    pub fn pattern(name: &str) -> Self {
        Self {
            pattern: vec![name.to_owned()],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledSong {
    pub metadata: Metadata,

    /// The patterns played by each BGM
    pub bgm: NamedList<Vec<Name>>,
    pub pattern: NamedList<Vec<CompiledCommand>>,
    pub sfx: NamedList<Vec<CompiledCommand>>,
}

impl CompiledSong {
    /// The compiled patterns of a BGM, unknown names are empty
    pub fn bgm_commands(&self, bgm: &str) -> Vec<&[CompiledCommand]> {
        self.bgm
            .get(bgm)
            .map(|patterns| {
                patterns
                    .iter()
                    .map(|p| self.pattern.get(p.as_str()).map_or(&[][..], |c| c.as_slice()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn row_bounds() -> Bounds<'static> {
    Bounds {
        min_octave: Some(MIN_OCTAVE),
        max_octave: Some(MAX_OCTAVE),
        max_wait: Some(MAX_WAIT),
        max_width: Some(MAX_PULSE_WIDTH),
        max_quant: Some(MAX_QUANTIZE),
        max_sustain: Some(MAX_SUSTAIN),
        max_addr: Some(MAX_RAM_ADDRESS),
        data_bits: RAM_DATA_BITS,
        max_effect_ticks: Some(MAX_EFFECT_TICKS),
        ..Default::default()
    }
}

fn ram_bounds() -> Bounds<'static> {
    Bounds {
        max_addr: Some(MAX_RAM_ADDRESS),
        data_bits: RAM_DATA_BITS,
        ..Default::default()
    }
}

fn note_presets(note: Note, ctx: &Context) -> [i32; 3] {
    match note.semitone() {
        Some(s) => {
            let s = i64::from(s);
            [
                note_preset(s, ctx.octave),
                note_preset(s + ctx.note2, ctx.octave),
                note_preset(s + ctx.note3, ctx.octave),
            ]
        }
        None => REST_PRESETS,
    }
}

/// Interpolates between two presets, `pos` is a 15 bit fraction
fn blend_presets(pos: i32, p1: i32, p2: i32) -> i32 {
    let v = i64::from(0x8000 - pos) * i64::from(p1) + i64::from(pos) * i64::from(p2);
    (v as i32) >> 15
}

struct Compiler<'a> {
    song: &'a Song,
    patterns: NamedList<Vec<CompiledCommand>>,
    macros: HashMap<Name, Vec<CompiledCommand>>,
    rng: Rng,
}

impl<'a> Compiler<'a> {
    fn new(song: &'a Song) -> Self {
        Self {
            song,
            patterns: NamedList::new(),
            macros: HashMap::new(),
            rng: Rng::new(),
        }
    }

    /// Compiles a list of commands.
    ///
    /// `repeats` is `Some` if the commands are the body of a loop.
    fn compile_block(
        &mut self,
        commands: &[Command],
        repeats: Option<i32>,
        loop_id: i32,
        ctx: &mut Context,
    ) -> Result<Vec<CompiledCommand>, CompilerError> {
        if loop_id == MAX_LOOP_ID {
            return Err(CompilerError::LoopsExceeded);
        }

        let mut out = Vec::new();
        let mut loop_id = loop_id;

        if let Some(repeats) = repeats {
            loop_id = loop_id.max(0);

            if repeats == 0 {
                return Ok(out);
            }
            if repeats > 1 {
                out.push(CompiledCommand {
                    flags: flags::MARK,
                    loop_id: loop_id as u8,
                    ..Default::default()
                });
            }
        }

        for c in commands {
            self.compile_command(c, loop_id, ctx, &mut out)?;
        }

        if let Some(repeats) = repeats {
            if repeats > 1 {
                out.push(CompiledCommand {
                    flags: flags::LOOP,
                    loop_id: loop_id as u8,
                    loop_num: repeats - 1,
                    ..Default::default()
                });
            }
        }

        Ok(out)
    }

    fn compile_command(
        &mut self,
        command: &Command,
        loop_id: i32,
        ctx: &mut Context,
        out: &mut Vec<CompiledCommand>,
    ) -> Result<(), CompilerError> {
        let song = self.song;

        match command {
            Command::Loop(l) => {
                command.validate(&Bounds::default())?;
                let c = self.compile_block(&l.commands, Some(l.repeats), loop_id + 1, ctx)?;
                out.extend(c);
            }
            Command::Row(row) => self.compile_row(row, ctx, out)?,
            Command::PlayNote(n) => self.compile_play_note(n, ctx, out)?,

            Command::Wait(t) => {
                validate_wait(*t, Some(MAX_WAIT))?;
                ctx.wait = *t;
            }
            Command::Volume(v) => {
                validate_volume(*v)?;
                ctx.volume = map_volume(*v);
            }
            Command::PulseWidth(pw) => {
                pw.validate(Some(MAX_PULSE_WIDTH))?;
                ctx.pulse = pw.out_of(MAX_PULSE_WIDTH);
            }
            Command::Ram(ram) => {
                ram.validate(&ram_bounds())?;
                ctx.ram_addr = ram.addr;
                ctx.ram_data = ram.data;
            }
            Command::Length(l) => {
                validate_length(*l, Some(MAX_NOTE_LENGTH))?;
                ctx.length = *l;
            }
            Command::StepOctave { up } => ctx.step_octave(*up),
            Command::Octave(o) => {
                validate_octave(*o, Some(MIN_OCTAVE), Some(MAX_OCTAVE))?;
                ctx.octave = *o;
            }
            Command::Quant(q) => {
                validate_quant(*q, Some(MAX_QUANTIZE))?;
                ctx.quantize = *q;
            }
            Command::Sustain(s) => {
                validate_sustain(*s, Some(MAX_SUSTAIN))?;
                ctx.sustain = *s;
            }
            Command::EffectTicks(t) => {
                validate_effect_ticks(*t, Some(MAX_EFFECT_TICKS))?;
                ctx.effect_ticks = *t;
            }
            Command::EffectStart(e) => self.start_effect(e, ctx)?,

            Command::PlayMacro(name) => {
                let (name, set) = song
                    .macros
                    .get_with_name(name.as_str())
                    .ok_or_else(|| ValidationError::UndefinedMacro(name.clone()))?;

                if song.dialect.transclude_macro {
                    let c = self.compile_block(&set.commands, None, loop_id, ctx)?;
                    out.extend(c);
                } else if let Some(c) = self.macros.get(name) {
                    out.extend_from_slice(c);
                } else {
                    let c =
                        self.compile_block(&set.commands, None, loop_id, &mut Context::default())?;
                    out.extend_from_slice(&c);
                    self.macros.insert(name.clone(), c);
                }
            }
            Command::PlayPattern(name) => {
                if !out.is_empty() {
                    return Err(CompilerError::UnexpectedPlayPattern(name.clone()));
                }
                let (name, pattern) = song
                    .pattern
                    .get_with_name(name.as_str())
                    .ok_or_else(|| ValidationError::UndefinedPattern(name.clone()))?;

                if !self.patterns.contains(name.as_str()) {
                    let mut c = self.compile_block(
                        &pattern.commands,
                        None,
                        loop_id,
                        &mut Context::default(),
                    )?;

                    // Play the next pattern of the BGM
                    if !matches!(
                        pattern.commands.last(),
                        Some(Command::End | Command::JumpPattern(_))
                    ) {
                        c.push(CompiledCommand::jump(1));
                    }
                    self.patterns.insert(name.clone(), c);
                }
            }
            Command::JumpPattern(offset) => out.push(CompiledCommand::jump(*offset)),
            Command::End => out.push(CompiledCommand {
                flags: flags::VOL | flags::END,
                wait: 1,
                volume: 0,
                ..Default::default()
            }),
            Command::CommandSet(_) => return Err(CompilerError::UnexpectedCommandSet),
        }

        Ok(())
    }

    fn compile_row(
        &mut self,
        row: &Row,
        ctx: &mut Context,
        out: &mut Vec<CompiledCommand>,
    ) -> Result<(), CompilerError> {
        row.validate(&row_bounds())?;

        let mut note = Note::Rest;
        if let Some(n) = row.note {
            note = n.note;
            if let Some(o) = n.octave {
                ctx.octave = o;
            }
        }
        if let Some(w) = row.wait {
            ctx.wait = w;
        }
        if let Some(v) = row.volume {
            ctx.volume = map_volume(v);
        }
        if let Some(pw) = &row.pulse_width {
            ctx.pulse = pw.out_of(MAX_PULSE_WIDTH);
        }
        if let Some(q) = row.quant {
            ctx.quantize = q;
        }
        if let Some(s) = row.sustain {
            ctx.sustain = s;
        }
        if let Some(ram) = &row.ram {
            ctx.ram_addr = ram.addr;
            ctx.ram_data = ram.data;
        }
        if let Some(t) = row.effect_ticks {
            ctx.effect_ticks = t;
        }
        if let Some(e) = &row.effect {
            self.start_effect(e, ctx)?;
        }

        let presets = note_presets(note, ctx);
        self.quant_sustain(out, ctx.wait, presets, ctx);

        Ok(())
    }

    fn compile_play_note(
        &mut self,
        n: &PlayNote,
        ctx: &mut Context,
        out: &mut Vec<CompiledCommand>,
    ) -> Result<(), CompilerError> {
        n.validate(Some(MAX_NOTE_LENGTH), Some(MAX_NOTE_EXTENSION))?;

        let length = f64::from(n.length.unwrap_or(ctx.length))
            / NOTE_EXTENSION_DIVISORS[usize::from(n.extend)];
        if length <= 0.0 {
            return Ok(());
        }
        let wait = (f64::from(ctx.wait) / length).trunc() as i32;

        match n.note {
            Note::Rest => out.push(CompiledCommand {
                flags: flags::VOL,
                wait: wait.max(1) as u8,
                volume: 0,
                ..Default::default()
            }),
            note => {
                let presets = note_presets(note, ctx);
                self.quant_sustain(out, wait, presets, ctx);
            }
        }
        Ok(())
    }

    fn start_effect(&mut self, e: &Effect, ctx: &mut Context) -> Result<(), ValidationError> {
        let max_args = |n: usize| match e.params.len() {
            l if l > n => Err(ValidationError::EffectArguments(e.kind, n)),
            _ => Ok(()),
        };
        let arg = |i: usize| e.params.get(i).copied();

        ctx.effect = match e.kind {
            'd' => {
                max_args(0)?;
                EffectType::None
            }
            'A' => {
                max_args(1)?;
                ctx.arp_ptr = arg(0).unwrap_or(0).rem_euclid(3) as usize;
                EffectType::None
            }
            'a' => {
                max_args(2)?;
                ctx.note2 = arg(0).unwrap_or(0);
                ctx.note3 = arg(1).unwrap_or(0);
                EffectType::Arpeggio
            }
            'p' => {
                max_args(1)?;
                ctx.note2 = arg(0).unwrap_or(0);
                EffectType::Portamento
            }
            'r' => {
                max_args(1)?;
                ctx.note2 = arg(0).unwrap_or(0);
                EffectType::Random
            }
            's' => {
                max_args(1)?;
                self.rng.srand(arg(0).unwrap_or(1));
                return Ok(());
            }
            c => return Err(ValidationError::UnsupportedEffect(c)),
        };
        Ok(())
    }

    /// Splits a note into sustain, release and off commands
    fn quant_sustain(
        &mut self,
        out: &mut Vec<CompiledCommand>,
        wait: i32,
        presets: [i32; 3],
        ctx: &mut Context,
    ) {
        let wait = wait.max(1);
        let wait_on = wait * ctx.quantize / 64;
        let wait_off = wait - wait_on;

        if wait_on != 0 {
            let wait_sus = wait_on * ctx.sustain / 64;
            let wait_rel = wait_on - wait_sus;

            if wait_sus != 0 {
                self.make_note(out, wait_sus, 0, wait_on, presets, ctx.volume, ctx);
            }
            if wait_rel != 0 {
                let volume = ctx.volume - 1;
                self.make_note(out, wait_rel, wait_sus, wait_on, presets, volume, ctx);
            }
        }
        if wait_off != 0 {
            self.make_note(out, wait_off, 0, wait_off, presets, 0, ctx);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn make_note(
        &mut self,
        out: &mut Vec<CompiledCommand>,
        wait: i32,
        port_offset: i32,
        port_total: i32,
        presets: [i32; 3],
        volume: i32,
        ctx: &mut Context,
    ) {
        let mut wait = wait.max(1);
        let mut port_offset = port_offset;
        let effect_wait = ctx.effect_ticks.clamp(1, 255) as u8;

        while wait > 0 {
            let mut c = CompiledCommand {
                flags: flags::VOL,
                wait: wait.min(255) as u8,
                ..Default::default()
            };
            if presets[0] >= 0 {
                c.flags |= flags::PRESET | flags::PIVOT;
            }

            let preset = match ctx.effect {
                EffectType::None => presets[0],
                EffectType::Arpeggio => presets[ctx.arp_ptr],
                EffectType::Portamento => {
                    let pos = (port_offset * 0x8000)
                        .checked_div(port_total)
                        .unwrap_or(0);
                    blend_presets(pos, presets[0], presets[1])
                }
                EffectType::Random => {
                    let pos = self.rng.rand();
                    blend_presets(pos, presets[0], presets[1])
                }
            };
            if ctx.effect != EffectType::None && volume != 0 {
                c.wait = effect_wait;
            }

            c.preset = preset as u16;
            c.pivot = ((i64::from(preset) * i64::from(ctx.pulse)) as i32 / 256) as u16;
            c.volume = volume.clamp(0, 3) as u8;

            if let Some((addr, data)) = ctx.take_ram_write() {
                c.flags |= flags::WRITERAM;
                c.ram_addr = addr;
                c.ram_data = data;
            }

            out.push(c);

            wait -= i32::from(c.wait);
            port_offset += i32::from(c.wait);
            ctx.arp_ptr = (ctx.arp_ptr + 1) % 3;
        }
    }
}

/// Compiles the selected BGM, patterns and SFX of a song.
///
/// The patterns used by the selected BGM are also compiled.
pub fn compile(song: &Song, selection: &CompileSelection) -> Result<CompiledSong, CompilerError> {
    let mut compiler = Compiler::new(song);

    let mut out = CompiledSong {
        metadata: song.metadata.clone(),
        bgm: NamedList::new(),
        pattern: NamedList::new(),
        sfx: NamedList::new(),
    };

    for b in &selection.bgm {
        let (name, bgm) = song
            .bgm
            .get_with_name(b)
            .ok_or_else(|| CompilerError::NoBgm(b.clone()))?;

        let c = compiler.compile_block(&bgm.commands, None, -1, &mut Context::default())?;
        if !c.is_empty() {
            return Err(CompilerError::WeirdBgm(name.clone()));
        }

        let patterns = bgm
            .commands
            .iter()
            .map(|c| match c {
                Command::PlayPattern(p) => Ok(p.clone()),
                _ => Err(CompilerError::WeirdBgm(name.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("compiled BGM {} ({} patterns)", name, patterns.len());
        out.bgm.insert(name.clone(), patterns);
    }

    let bgm_patterns = compiler.patterns.names().map(|n| n.to_string());
    let pattern_names: Vec<String> = selection.pattern.iter().cloned().chain(bgm_patterns).collect();

    for p in &pattern_names {
        let (name, pattern) = song
            .pattern
            .get_with_name(p)
            .ok_or_else(|| CompilerError::NoPattern(p.clone()))?;

        let c = match compiler.patterns.get(p) {
            Some(c) => c.clone(),
            None => {
                let c =
                    compiler.compile_block(&pattern.commands, None, -1, &mut Context::default())?;
                compiler.patterns.insert(name.clone(), c.clone());
                c
            }
        };
        log::debug!("compiled pattern {} ({} commands)", name, c.len());
        out.pattern.insert(name.clone(), c);
    }

    for s in &selection.sfx {
        let (name, sfx) = song
            .sfx
            .get_with_name(s)
            .ok_or_else(|| CompilerError::NoSfx(s.clone()))?;

        let c = compiler.compile_block(&sfx.commands, None, -1, &mut Context::default())?;
        log::debug!("compiled SFX {} ({} commands)", name, c.len());
        out.sfx.insert(name.clone(), c);
    }

    Ok(out)
}
