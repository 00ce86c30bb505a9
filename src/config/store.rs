//! Storage backends for component configuration files.
//!
//! A component at `location` keeps one file per environment and format at
//! `<location>/config/<environment>.<ext>`. The store only moves bytes; the
//! component decides which format to try and how to decode it.

use super::format::Serialization;
use crate::error::{ConfigError, ConfigResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under a component holding its environment files.
pub const CONFIG_DIR: &str = "config";

/// Conventional file path for a component's environment config.
pub fn config_file_path(location: &Path, environment: &str, format: Serialization) -> PathBuf {
    location
        .join(CONFIG_DIR)
        .join(format!("{}.{}", environment, format.extension()))
}

/// Loader and writer for persisted configuration bytes.
pub trait ConfigStore {
    /// Read the file for `environment` in `format`. A missing file is
    /// `Ok(None)`; any other failure is an error.
    fn read(
        &self,
        location: &Path,
        environment: &str,
        format: Serialization,
    ) -> ConfigResult<Option<Vec<u8>>>;

    /// Persist `bytes`, creating missing directories.
    fn write(
        &self,
        location: &Path,
        environment: &str,
        format: Serialization,
        bytes: &[u8],
    ) -> ConfigResult<()>;
}

/// Filesystem-backed store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ConfigStore for FsStore {
    fn read(
        &self,
        location: &Path,
        environment: &str,
        format: Serialization,
    ) -> ConfigResult<Option<Vec<u8>>> {
        let file = config_file_path(location, environment, format);
        match std::fs::read(&file) {
            Ok(bytes) => {
                debug!(file = %file.display(), "Read component config");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::io(&file, e)),
        }
    }

    fn write(
        &self,
        location: &Path,
        environment: &str,
        format: Serialization,
        bytes: &[u8],
    ) -> ConfigResult<()> {
        let file = config_file_path(location, environment, format);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        std::fs::write(&file, bytes).map_err(|e| ConfigError::io(&file, e))?;
        debug!(file = %file.display(), "Wrote component config");
        Ok(())
    }
}

/// In-memory store keyed by the conventional file path.
///
/// Not thread-safe; a single command owns it for its whole run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, as if it had been written earlier.
    pub fn insert(
        &self,
        location: impl AsRef<Path>,
        environment: &str,
        format: Serialization,
        contents: impl Into<Vec<u8>>,
    ) {
        let file = config_file_path(location.as_ref(), environment, format);
        self.files.borrow_mut().insert(file, contents.into());
    }

    /// Contents of a stored file as UTF-8 text.
    pub fn contents(
        &self,
        location: impl AsRef<Path>,
        environment: &str,
        format: Serialization,
    ) -> Option<String> {
        let file = config_file_path(location.as_ref(), environment, format);
        self.files
            .borrow()
            .get(&file)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl ConfigStore for MemoryStore {
    fn read(
        &self,
        location: &Path,
        environment: &str,
        format: Serialization,
    ) -> ConfigResult<Option<Vec<u8>>> {
        let file = config_file_path(location, environment, format);
        Ok(self.files.borrow().get(&file).cloned())
    }

    fn write(
        &self,
        location: &Path,
        environment: &str,
        format: Serialization,
        bytes: &[u8],
    ) -> ConfigResult<()> {
        let file = config_file_path(location, environment, format);
        self.files.borrow_mut().insert(file, bytes.to_vec());
        Ok(())
    }
}
