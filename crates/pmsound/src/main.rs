//! pmsound binary

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod config;
mod cpal_sink;
mod loader;
mod wav_sink;

use config::PlayerConfig;
use cpal_sink::CpalSink;
use loader::FileLoader;
use wav_sink::WavSink;

use pm_emu::{Filter, MusicEngine, Player, SoundEngine};
use pmmusic::{compile, CompileSelection, CompiledSong, Song};

use clap::{Args, Parser, Subcommand};
use tracing::Level;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

macro_rules! error {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit(1);
    }};
}

#[derive(Parser)]
#[command(author, version)]
#[command(about = "Pokémon mini music compiler and player")]
#[command(arg_required_else_help = true)]
struct ArgParser {
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    #[arg(help = "verbose output (repeat for more)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a song to PMAS assembly
    #[command(alias = "c")]
    Compile(CompileArgs),

    /// Play a BGM, SFX or pattern
    #[command(alias = "p")]
    Play(PlayArgs),
}

// Compile
// =======

#[derive(Args)]
struct CompileArgs {
    #[arg(short = 'o', long, value_name = "PATH", help = "output file or directory")]
    out: Option<PathBuf>,

    #[arg(short = 'a', long, help = "compile every BGM, pattern and SFX (default)")]
    all: bool,

    #[arg(short = 'b', long, value_name = "NAME", num_args = 1.., help = "BGM to compile")]
    bgm: Vec<String>,

    #[arg(short = 's', long, value_name = "NAME", num_args = 1.., help = "SFX to compile")]
    sfx: Vec<String>,

    #[arg(short = 'p', long, value_name = "NAME", num_args = 1.., help = "pattern to compile")]
    pattern: Vec<String>,

    #[arg(value_name = "FILE", help = "song file")]
    file: PathBuf,
}

fn output_path(input: &Path, out: Option<&Path>) -> PathBuf {
    match out {
        Some(o) if o.extension().is_some() => o.to_path_buf(),
        Some(dir) => {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            dir.join(stem).with_extension("asm")
        }
        None => input.with_extension("asm"),
    }
}

fn compile_song(args: CompileArgs) {
    let song = load_song(&args.file);

    let nothing_selected = args.bgm.is_empty() && args.sfx.is_empty() && args.pattern.is_empty();

    let selection = if args.all || nothing_selected {
        CompileSelection::all(&song)
    } else {
        CompileSelection {
            bgm: args.bgm,
            pattern: args.pattern,
            sfx: args.sfx,
        }
    };

    let compiled = compile_selection(&song, &selection);

    let text = match pmmusic::export::to_pmas(&compiled) {
        Ok(s) => s,
        Err(e) => error!("Cannot export song: {}", e),
    };

    let path = output_path(&args.file, args.out.as_deref());
    write_data(&path, text);
    println!("wrote to {}", path.display());
}

// Play
// ====

#[derive(Args)]
struct PlayArgs {
    #[arg(short = 's', long, value_name = "ENGINE")]
    #[arg(help = "sound engine: direct, generated, emulated or direct_pwm")]
    sound: Option<SoundEngine>,

    #[arg(long, help = "disable the piezo filter")]
    no_piezo: bool,

    #[arg(short = 'w', long, value_name = "WAV_FILE", help = "write to a WAV file")]
    wav: Option<PathBuf>,

    #[arg(short = 'c', long, value_name = "JSON_FILE", help = "player configuration file")]
    config: Option<PathBuf>,

    #[arg(value_name = "FILE", help = "song file")]
    file: PathBuf,

    #[arg(value_name = "NAME", help = "BGM, SFX or pattern name")]
    name: String,
}

fn start_playback(engine: &mut MusicEngine, song: &Song, name: &str) {
    if song.bgm.contains(name) {
        let compiled = compile_selection(song, &CompileSelection::bgm(name));
        let patterns = compiled
            .bgm_commands(name)
            .into_iter()
            .map(<[_]>::to_vec)
            .collect();

        tracing::info!("playing BGM {}", name);
        engine.play_bgm(patterns, None);
    } else if song.sfx.contains(name) {
        let compiled = compile_selection(song, &CompileSelection::sfx(name));
        let commands = compiled.sfx.get(name).cloned().unwrap_or_default();

        tracing::info!("playing SFX {}", name);
        engine.play_sfx(commands, None);
    } else if song.pattern.contains(name) {
        let compiled = compile_selection(song, &CompileSelection::pattern(name));
        let commands = compiled.pattern.get(name).cloned().unwrap_or_default();

        tracing::info!("playing pattern {}", name);
        engine.play_sfx(commands, None);
    } else {
        error!("Cannot find BGM, SFX or pattern: {}", name);
    }
}

fn play_song(args: PlayArgs) {
    let song = load_song(&args.file);

    let mut config = match &args.config {
        Some(path) => match config::load_config_file(path) {
            Ok(c) => c,
            Err(e) => error!("{}", e),
        },
        None => PlayerConfig::default(),
    };
    if let Some(engine) = args.sound {
        config.engine = Some(engine);
    }
    if args.no_piezo {
        config.filter = Some(Filter::Disabled);
    }

    let mut engine = match config.build_engine(&song.metadata) {
        Ok(e) => e,
        Err(e) => error!("Cannot create music engine: {}", e),
    };

    start_playback(&mut engine, &song, &args.name);

    let mut player = Player::new();
    match args.wav {
        Some(path) => player.add_sink(Box::new(WavSink::new(path))),
        None => {
            player.add_sink(Box::new(CpalSink::new()));
            println!("Press Ctrl+C to stop...");
        }
    }

    let stop = player.stop_flag();
    if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
        tracing::warn!("Cannot set Ctrl+C handler: {}", e);
    }

    if let Err(e) = player.play(&mut engine) {
        error!("{}", e);
    }
}

fn main() {
    let args = ArgParser::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Compile(c) => compile_song(c),
        Command::Play(p) => play_song(p),
    }
}

fn load_song(path: &Path) -> Song {
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => error!("Cannot load {}: {}", path.display(), e),
    };

    let mut loader = FileLoader::new(path);
    match pmmusic::parse_with_loader(&text, Some(&mut loader)) {
        Ok(song) => song,
        Err(e) => error!("{}: {}", path.display(), e),
    }
}

fn compile_selection(song: &Song, selection: &CompileSelection) -> CompiledSong {
    match compile(song, selection) {
        Ok(c) => c,
        Err(e) => error!("Cannot compile song: {}", e),
    }
}

fn write_data(path: &Path, data: String) {
    match fs::write(path, data) {
        Ok(()) => (),
        Err(why) => error!("Error writing {}: {}", path.display(), why),
    }
}
