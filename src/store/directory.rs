/*
 * Copyright 2019-2021 Wren Powell
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::fs::{remove_file, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

use crate::error::{Error, Result};

use super::compression::Compression;
use super::key_store::KeyStore;

/// The default mode for creating data files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// The default mode for creating the root directory.
pub const DEFAULT_DIR_MODE: u32 = 0o744;

/// Return an error if the given `key` cannot be used as a file name.
pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.chars().any(std::path::is_separator) {
        Err(Error::InvalidKey(key.to_owned()))
    } else {
        Ok(())
    }
}

/// A `KeyStore` which persists each key as one file in a directory in the local file system.
///
/// The key space is flat; a key must be usable as a file name and cannot contain path separator
/// characters. A directory with the same name as a key is a conflict, not a missing key, and is
/// reported as [`Error::KeyConflict`].
///
/// [`Error::KeyConflict`]: crate::Error::KeyConflict
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    /// The path of the store's root directory.
    root: PathBuf,

    /// The mode used to create data files.
    file_mode: u32,

    /// The mode used to create the root directory.
    dir_mode: u32,

    /// The compression method applied to values at rest.
    compression: Compression,
}

impl DirectoryStore {
    /// Create a new `DirectoryStore` with its root at the given `path`.
    ///
    /// The root directory is not created until the first `store` call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DirectoryStore {
            root: path.into(),
            file_mode: DEFAULT_FILE_MODE,
            dir_mode: DEFAULT_DIR_MODE,
            compression: Compression::None,
        }
    }

    /// Use the given `file_mode` and `dir_mode` when creating files and directories.
    ///
    /// These have no effect on non-Unix platforms.
    pub fn with_modes(mut self, file_mode: u32, dir_mode: u32) -> Self {
        self.file_mode = file_mode;
        self.dir_mode = dir_mode;
        self
    }

    /// Apply the given `compression` to values at rest.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// The path of the store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The mode used to create data files.
    pub(crate) fn file_mode(&self) -> u32 {
        self.file_mode
    }

    /// The compression method applied to values at rest.
    pub(crate) fn compression(&self) -> &Compression {
        &self.compression
    }

    /// Return the path of the file which holds the value for the given `key`.
    ///
    /// The file may or may not exist.
    pub(crate) fn key_path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.root.join(key))
    }

    /// Create the root directory if it does not already exist.
    pub(crate) fn create_root(&self) -> io::Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(self.dir_mode);
        builder.create(&self.root)
    }

    /// Create or overwrite the file at `path` with the given raw `bytes`.
    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(self.file_mode);
        let mut file = options.open(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

impl KeyStore for DirectoryStore {
    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        self.create_root()?;

        if path.is_dir() {
            return Err(Error::KeyConflict {
                key: key.to_owned(),
                path,
            });
        }

        let bytes = self.compression.compress(value)?;
        self.write_file(&path, &bytes)?;

        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.key_path(key)?;

        if path.is_dir() {
            return Err(Error::KeyConflict {
                key: key.to_owned(),
                path,
            });
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(Error::KeyNotFound(key.to_owned()))
            }
            Err(error) => return Err(error.into()),
        };

        self.compression.decompress(&bytes)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;

        // Deleting a key which does not exist is not an error.
        match remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
