/*
 *  features/loader.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Locates and reads <model id>.mccs feature definition files
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, data_dir};
use log::debug;
use thiserror::Error;

use super::registry::{Created, FeatureRegistry, FeatureRegistryError};
use crate::model_key::MonitorModelKey;

pub const DEFINITION_EXTENSION: &str = "mccs";
pub const SYSTEM_DEFINITION_DIR: &str = "/usr/share/ddcio";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Registry(#[from] FeatureRegistryError),
}

/// Resolves feature definitions for a model across an ordered list of
/// directories; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct FeatureDefinitionLoader {
    search_dirs: Vec<PathBuf>,
}

impl FeatureDefinitionLoader {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// `extra` first, then `~/.config/ddcio`, `~/.local/share/ddcio` and
    /// the system directory.
    pub fn with_default_dirs(extra: &[PathBuf]) -> Self {
        let mut dirs = extra.to_vec();
        if let Some(dir) = config_dir() {
            dirs.push(dir.join("ddcio"));
        }
        if let Some(dir) = data_dir() {
            dirs.push(dir.join("ddcio"));
        }
        dirs.push(PathBuf::from(SYSTEM_DEFINITION_DIR));
        Self::new(dirs)
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    pub fn file_name(key: &MonitorModelKey) -> Option<String> {
        key.model_id_string().map(|id| format!("{}.{}", id, DEFINITION_EXTENSION))
    }

    pub fn find(&self, key: &MonitorModelKey) -> Option<PathBuf> {
        let name = Self::file_name(key)?;
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&name))
            .find(|p| p.is_file())
    }

    /// Reads a definition file into lines. Content that is not valid UTF-8
    /// is not a definition and yields `None`.
    pub fn read_lines(path: &Path) -> Result<Option<Vec<String>>, LoaderError> {
        let bytes = fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text.lines().map(str::to_string).collect())),
            Err(e) => {
                debug!("{} is not valid UTF-8: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Resolves `key` into `registry`. Cached records are returned as-is
    /// without touching the filesystem.
    pub fn load_into<'r>(
        &self,
        registry: &'r mut FeatureRegistry,
        key: &MonitorModelKey,
    ) -> Result<Created<'r>, LoaderError> {
        if registry.get(key).is_some() {
            return Ok(registry.get_or_create::<String>(key, None, None)?);
        }

        let Some(path) = self.find(key) else {
            debug!("No feature definition for {} in {:?}", key, self.search_dirs);
            return Ok(registry.get_or_create::<String>(key, None, None)?);
        };

        debug!("Loading feature definition for {} from {}", key, path.display());
        let lines = Self::read_lines(&path)?;
        let source = path.to_string_lossy().into_owned();
        Ok(registry.get_or_create(key, lines.as_deref(), Some(source.as_str()))?)
    }
}
