//! Music source parser

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod bgm;
mod mml;
mod scanner;
mod track;

use self::scanner::{BodyEnd, Scanner};
use crate::ast::{Command, CommandSet, Loop};
use crate::data::Name;
use crate::errors::{BlockKind, ParseError, ParseErrorKind};
use crate::number_parsing::{master_bpm_to_time, parse_bool, parse_num1, to_u16};
use crate::song::Song;

/// Loads the text of an `INCLUDE` file
pub trait IncludeLoader {
    fn load(&mut self, filename: &str) -> Result<String, std::io::Error>;
}

impl<F> IncludeLoader for F
where
    F: FnMut(&str) -> Result<String, std::io::Error>,
{
    fn load(&mut self, filename: &str) -> Result<String, std::io::Error> {
        self(filename)
    }
}

/// Builds the commands of a block, handling nested loops
pub(crate) struct LoopStack {
    top: Vec<Command>,
    loops: Vec<Loop>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self {
            top: Vec::new(),
            loops: Vec::new(),
        }
    }

    pub fn push(&mut self, c: Command) {
        match self.loops.last_mut() {
            Some(l) => l.commands.push(c),
            None => self.top.push(c),
        }
    }

    pub fn start_loop(&mut self) {
        self.loops.push(Loop::default());
    }

    pub fn end_loop(&mut self, repeats: Option<i32>) -> Result<(), ParseErrorKind> {
        let mut l = self.loops.pop().ok_or(ParseErrorKind::UnexpectedEndLoop)?;
        if let Some(r) = repeats {
            l.repeats = r;
        }
        self.push(Command::Loop(l));
        Ok(())
    }

    pub fn finish(self) -> Result<CommandSet, ParseErrorKind> {
        match self.loops.is_empty() {
            true => Ok(CommandSet::new(self.top)),
            false => Err(ParseErrorKind::UnclosedLoop),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Namespace {
    Pattern,
    Sfx,
    Macro,
}

#[derive(Debug, Clone, Copy)]
enum Opener {
    Bgm,
    Track(Namespace),
    Mml(Namespace),
}

/// A directive that is waiting for a `{ ... }` body
enum Pending {
    None,
    Description,
    Block(Opener, Name),
}

fn block_opener(directive: &str) -> Option<Opener> {
    use Namespace::*;

    match directive {
        "BGM" => Some(Opener::Bgm),
        "PATTERN_TRACK" | "PATTERN_T" | "PAT_TRACK" | "PAT_T" => Some(Opener::Track(Pattern)),
        "SFX_TRACK" | "SFX_T" => Some(Opener::Track(Sfx)),
        "MACRO_TRACK" | "MACRO_T" => Some(Opener::Track(Macro)),
        "PATTERN" | "PAT" => Some(Opener::Mml(Pattern)),
        "SFX" => Some(Opener::Mml(Sfx)),
        "MACRO" => Some(Opener::Mml(Macro)),
        _ => None,
    }
}

/// Dedents a `DESCRIPTION { ... }` body.
///
/// The first line is trimmed, the other lines lose the smallest indent of the non-first lines.
fn dedent_description(body: &str) -> String {
    let body = body.trim().replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = body.split('\n').map(str::trim_end);

    let first = lines.next().unwrap_or("").trim_start();
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .map(|l| l.bytes().take_while(|&b| b == b' ' || b == b'\t').count())
        .min()
        .unwrap_or(0);

    let mut out = first.to_owned();
    for l in rest {
        out.push('\n');
        out.push_str(&l[indent..]);
    }
    out
}

struct Parser<'l> {
    song: Song,
    loader: Option<&'l mut dyn IncludeLoader>,
    include_stack: Vec<String>,
}

impl Parser<'_> {
    fn parse_text(&mut self, text: &str) -> Result<(), ParseError> {
        let mut s = Scanner::new(text, 0);
        let mut pending = Pending::None;

        loop {
            s.read_while(|b| b.is_ascii_whitespace());
            if s.is_at_end() {
                return Ok(());
            }
            if s.skip_comment() {
                continue;
            }

            match s.first_byte() {
                Some(b'{') => {
                    s.advance(1);
                    match std::mem::replace(&mut pending, Pending::None) {
                        Pending::None => {
                            return Err(s.error_at(s.pos() - 1, ParseErrorKind::UnexpectedBodyStart))
                        }
                        Pending::Description => self.parse_description_body(&mut s)?,
                        Pending::Block(opener, name) => {
                            self.parse_block(&mut s, opener, name, BodyEnd::Brace)?
                        }
                    }
                }
                Some(b'}') => return Err(s.error(ParseErrorKind::UnexpectedBodyEnd)),
                _ => {
                    let pos = s.pos();
                    let Some(name) = s.read_name() else {
                        return Err(s.unexpected_character());
                    };
                    let (args_pos, args) = s.read_command_arguments().unwrap_or((s.pos(), ""));

                    pending = self.process_directive(&mut s, pos, name, args_pos, args)?;
                }
            }
        }
    }

    fn process_directive(
        &mut self,
        s: &mut Scanner,
        pos: usize,
        directive: &str,
        args_pos: usize,
        args: &str,
    ) -> Result<Pending, ParseError> {
        let upper = directive.to_ascii_uppercase();
        let value = args.trim();
        let arg_error = |k| s.error_at(args_pos, k);
        let meta = &mut self.song.metadata;
        let dialect = &mut self.song.dialect;

        match upper.as_str() {
            "INCLUDE" => self.include(s, pos, value)?,
            "TITLE" => meta.title = value.to_owned(),
            "COMPOSER" => meta.composer = value.to_owned(),
            "PROGRAMMER" => meta.programmer = value.to_owned(),
            "DESCRIPTION" => {
                meta.description = value.to_owned();
                return Ok(Pending::Description);
            }
            "OUTFORMAT" => meta.out_format = value.to_owned(),
            "VARHEADER" => meta.var_header = value.to_owned(),
            "OUTHEADER" => meta.out_header = value.to_owned(),
            "OUTFILE" => meta.out_file = value.to_owned(),
            "MASTERTIME" | "MTIME" => {
                meta.master_time = parse_num1(value).and_then(to_u16).map_err(arg_error)?;
            }
            "MASTERBPM" | "MBPM" => {
                let (bpm, wait) = match args.split(',').collect::<Vec<_>>().as_slice() {
                    &[bpm, wait] => (bpm.trim(), wait.trim()),
                    _ => return Err(s.error_at(pos, ParseErrorKind::MasterBpmArguments)),
                };
                let bpm: f64 = bpm
                    .parse()
                    .map_err(|_| arg_error(ParseErrorKind::ExpectedFloat))?;
                let wait = parse_num1(wait).map_err(arg_error)?;

                if bpm.is_nan() || bpm <= 0.0 {
                    return Err(arg_error(ParseErrorKind::InvalidBpm));
                }
                if !(0..=255).contains(&wait) {
                    return Err(arg_error(ParseErrorKind::InvalidBpmWait(wait)));
                }
                meta.master_time = to_u16(master_bpm_to_time(bpm, wait).into()).map_err(arg_error)?;
            }
            "VOLLEVEL" | "VOLLVL" => {
                dialect.vol_level_is_mml = match value.to_ascii_lowercase().as_str() {
                    "mml" | "16" => true,
                    "system" | "4" => false,
                    _ => return Err(arg_error(ParseErrorKind::InvalidVolLevel(value.to_owned()))),
                };
            }
            "OCTAVEREV" | "OCTREV" => {
                dialect.octave_reverse =
                    parse_bool(value).ok_or_else(|| arg_error(ParseErrorKind::ExpectedBoolean))?;
            }
            "SHORTQUANTIZE" | "SHORTQ" => {
                dialect.short_quantize =
                    parse_bool(value).ok_or_else(|| arg_error(ParseErrorKind::ExpectedBoolean))?;
            }
            "TRANSCLUDEMACRO" | "TMACRO" => {
                dialect.transclude_macro =
                    parse_bool(value).ok_or_else(|| arg_error(ParseErrorKind::ExpectedBoolean))?;
            }
            d => match block_opener(d) {
                Some(opener) => return self.open_block(s, opener, args_pos, args),
                None => {
                    return Err(s.error_at(
                        pos,
                        ParseErrorKind::UnknownDirective(directive.to_owned()),
                    ))
                }
            },
        }

        Ok(Pending::None)
    }

    /// Processes the `name [body]` arguments of a block opener.
    ///
    /// A body on the same line is parsed immediately, otherwise the block waits for a `{`.
    fn open_block(
        &mut self,
        s: &mut Scanner,
        opener: Opener,
        args_pos: usize,
        args: &str,
    ) -> Result<Pending, ParseError> {
        let trimmed = args.trim_start();
        let name_pos = args_pos + (args.len() - trimmed.len());

        let name_len = trimmed
            .bytes()
            .enumerate()
            .take_while(|&(i, b)| match i {
                0 => scanner::is_name_start(b),
                _ => scanner::is_word_byte(b),
            })
            .count();
        if name_len == 0 {
            return Err(s.error_at(name_pos, ParseErrorKind::MissingName));
        }
        let name = Name::try_new(trimmed[..name_len].to_owned())
            .ok_or_else(|| s.error_at(name_pos, ParseErrorKind::MissingName))?;

        let after_name = &trimmed[name_len..];
        let body = after_name.trim_start();

        if body.trim_end().is_empty() {
            Ok(Pending::Block(opener, name))
        } else {
            let body_pos = name_pos + name_len + (after_name.len() - body.len());
            s.rewind(body_pos);
            self.parse_block(s, opener, name, BodyEnd::EndOfLine)?;
            Ok(Pending::None)
        }
    }

    fn parse_block(
        &mut self,
        s: &mut Scanner,
        opener: Opener,
        name: Name,
        end: BodyEnd,
    ) -> Result<(), ParseError> {
        let song = &mut self.song;

        let (namespace, set) = match opener {
            Opener::Bgm => {
                let list = bgm::parse_pattern_list(s, end)?;
                add_bgm(song, name, list);
                return Ok(());
            }
            Opener::Track(ns) => (ns, track::parse_track(s, end)?),
            Opener::Mml(ns) => (ns, mml::parse_mml(s, end, &song.dialect)?),
        };

        log::trace!("parsed {:?} {}", namespace, name);

        match namespace {
            Namespace::Pattern => song.pattern.insert(name, set),
            Namespace::Sfx => song.sfx.insert(name, set),
            Namespace::Macro => song.macros.insert(name, set),
        }
        Ok(())
    }

    fn parse_description_body(&mut self, s: &mut Scanner) -> Result<(), ParseError> {
        let start = s.pos();
        let r = s.remaining();

        match r.find('}') {
            Some(i) => {
                self.song.metadata.description = dedent_description(&r[..i]);
                s.advance(i + 1);
                Ok(())
            }
            None => Err(s.error_at(
                start,
                ParseErrorKind::UnexpectedEndOfFile(BlockKind::Description),
            )),
        }
    }

    fn include(&mut self, s: &Scanner, pos: usize, filename: &str) -> Result<(), ParseError> {
        let Some(loader) = self.loader.as_mut() else {
            return Err(s.error_at(pos, ParseErrorKind::IncludeNotSupported));
        };

        if self.include_stack.iter().any(|f| f == filename) {
            return Err(s.error_at(pos, ParseErrorKind::RecursiveInclude(filename.to_owned())));
        }

        let text = loader.load(filename).map_err(|e| {
            s.error_at(
                pos,
                ParseErrorKind::CannotLoadInclude(filename.to_owned(), e.to_string()),
            )
        })?;

        log::debug!("including {}", filename);

        self.song.includes.push(filename.to_owned());
        self.include_stack.push(filename.to_owned());
        let r = self.parse_text(&text);
        self.include_stack.pop();

        r.map_err(|e| {
            s.error_at(
                pos,
                ParseErrorKind::InIncludedFile(filename.to_owned(), Box::new(e)),
            )
        })
    }
}

/// Adds a BGM and its end-of-song pattern to the song.
///
/// The end-of-song pattern jumps back to the start of the looping patterns (if any).
/// A BGM without any patterns is not added.
fn add_bgm(song: &mut Song, name: Name, list: bgm::PatternList) {
    if list.intro.is_empty() && list.tail.as_ref().map_or(true, Vec::is_empty) {
        log::debug!("skipping empty BGM {}", name.as_str());
        return;
    }

    let end_name = name.end_of_bgm_name();

    let mut commands: Vec<Command> = list.intro.into_iter().map(Command::PlayPattern).collect();

    let end_command = match list.tail {
        Some(tail) if !tail.is_empty() => {
            let n_tail = i32::try_from(tail.len()).unwrap_or(i32::MAX);
            commands.extend(tail.into_iter().map(Command::PlayPattern));
            Command::JumpPattern(-n_tail)
        }
        _ => Command::End,
    };
    commands.push(Command::PlayPattern(end_name.clone()));

    song.pattern.insert(end_name, CommandSet::new(vec![end_command]));
    song.bgm.insert(name, CommandSet::new(commands));
}

/// Parses music source text.
///
/// `INCLUDE` directives are an error.
pub fn parse(text: &str) -> Result<Song, ParseError> {
    parse_with_loader(text, None)
}

/// Parses music source text, loading `INCLUDE` files with `loader`.
pub fn parse_with_loader(
    text: &str,
    loader: Option<&mut dyn IncludeLoader>,
) -> Result<Song, ParseError> {
    let mut parser = Parser {
        song: Song::new(),
        loader,
        include_stack: Vec::new(),
    };
    parser.parse_text(text)?;

    let song = parser.song;
    log::debug!(
        "parsed {} BGM, {} patterns, {} SFX, {} macros",
        song.bgm.len(),
        song.pattern.len(),
        song.sfx.len(),
        song.macros.len()
    );
    Ok(song)
}
