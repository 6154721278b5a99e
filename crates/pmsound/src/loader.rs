//! `INCLUDE` file loader

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use pmmusic::IncludeLoader;

use relative_path::RelativePath;

use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSION: &str = "pmmusic";

/// Loads include files relative to the directory of the main song file.
pub struct FileLoader {
    dir: PathBuf,
}

impl FileLoader {
    pub fn new(song_path: &Path) -> Self {
        let dir = song_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn resolve(&self, filename: &str) -> PathBuf {
        let mut path = if Path::new(filename).is_absolute() {
            PathBuf::from(filename)
        } else {
            RelativePath::new(filename).to_logical_path(&self.dir)
        };

        if path.extension().is_none() {
            path.set_extension(DEFAULT_EXTENSION);
        }
        path
    }
}

impl IncludeLoader for FileLoader {
    fn load(&mut self, filename: &str) -> Result<String, std::io::Error> {
        let path = self.resolve(filename);
        log::debug!("loading include file {}", path.display());

        fs::read_to_string(path)
    }
}
