//! Player configuration file

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use pm_emu::engine::{DEFAULT_RAM_OFFSET, MAX_MASTER_VOLUME};
use pm_emu::errors::EngineError;
use pm_emu::{Filter, MusicEngine, SoundEngine};
use pmmusic::song::Metadata;

use serde::{Deserialize, Deserializer};

use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

fn from_str_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    #[serde(default, deserialize_with = "from_str_option")]
    pub engine: Option<SoundEngine>,
    #[serde(default, deserialize_with = "from_str_option")]
    pub filter: Option<Filter>,

    pub bgm_volume: Option<u8>,
    pub sfx_volume: Option<u8>,

    pub ram_offset: Option<u16>,

    /// Overrides the song's master time
    pub master_time: Option<u16>,
}

#[derive(Debug)]
pub enum ConfigError {
    OpenError(String, std::io::Error),
    SerdeError(String, serde_json::Error),
    VolumeOutOfRange(&'static str, u8),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenError(file, e) => write!(f, "Unable to open {}: {}", file, e),
            Self::SerdeError(file, e) => write!(f, "Unable to read {}: {}", file, e),
            Self::VolumeOutOfRange(field, v) => write!(
                f,
                "{} out of range ({}, max {})",
                field, v, MAX_MASTER_VOLUME
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PlayerConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        for (field, v) in [("bgm_volume", self.bgm_volume), ("sfx_volume", self.sfx_volume)] {
            if let Some(v) = v {
                if v > MAX_MASTER_VOLUME {
                    return Err(ConfigError::VolumeOutOfRange(field, v));
                }
            }
        }
        Ok(self)
    }

    pub fn from_json(json: &str, file_name: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str::<Self>(json) {
            Ok(c) => c.validate(),
            Err(e) => Err(ConfigError::SerdeError(file_name.to_owned(), e)),
        }
    }

    /// Creates a music engine for `song`
    pub fn build_engine(&self, song: &Metadata) -> Result<MusicEngine, EngineError> {
        let master_time = self.master_time.unwrap_or(song.master_time);
        let ram_offset = self.ram_offset.unwrap_or(DEFAULT_RAM_OFFSET);

        let mut engine = MusicEngine::new(master_time, ram_offset)?;

        let synth = engine.synth_mut();
        synth.change_engine(self.engine.unwrap_or_default());
        synth.change_filter(self.filter.unwrap_or_default());

        engine.set_bgm_volume(self.bgm_volume.unwrap_or(MAX_MASTER_VOLUME));
        engine.set_sfx_volume(self.sfx_volume.unwrap_or(MAX_MASTER_VOLUME));

        Ok(engine)
    }
}

pub fn load_config_file(path: &Path) -> Result<PlayerConfig, ConfigError> {
    let file_name = path.display().to_string();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Err(ConfigError::OpenError(file_name, e)),
    };
    let reader = BufReader::new(file);

    match serde_json::from_reader::<_, PlayerConfig>(reader) {
        Ok(c) => c.validate(),
        Err(e) => Err(ConfigError::SerdeError(file_name, e)),
    }
}
