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

use std::path::PathBuf;

use crate::store::{Compression, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};

/// The configuration for opening a [`FlatStore`].
///
/// Typically you'll construct this with [`new`] and chain method calls to change the defaults.
///
/// Every instance sharing a root directory must use the same `compression` setting; see
/// [`Compression`].
///
/// # Examples
/// ```no_run
/// use flat_store::db::{FlatStore, StoreConfig};
///
/// let store = FlatStore::open(StoreConfig::new("/tmp/flat-store").with_caching())?;
/// # Ok::<(), flat_store::Error>(())
/// ```
///
/// [`FlatStore`]: crate::db::FlatStore
/// [`new`]: crate::db::StoreConfig::new
/// [`Compression`]: crate::store::Compression
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StoreConfig {
    /// The path of the root directory which holds the data files.
    pub root: PathBuf,

    /// The mode used to create data files.
    ///
    /// This has no effect on non-Unix platforms.
    pub file_mode: u32,

    /// The mode used to create the root directory.
    ///
    /// This has no effect on non-Unix platforms.
    pub dir_mode: u32,

    /// The compression method applied to values at rest.
    pub compression: Compression,

    /// Whether reads and writes go through a process-local in-memory cache.
    ///
    /// Caching must be enabled for the watcher to be available.
    pub caching: bool,
}

impl StoreConfig {
    /// Create a configuration with its root directory at the given `path` and the defaults for
    /// everything else: mode 0644 files, a mode 0744 root directory, no compression, and no
    /// caching.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            root: path.into(),
            file_mode: DEFAULT_FILE_MODE,
            dir_mode: DEFAULT_DIR_MODE,
            compression: Compression::None,
            caching: false,
        }
    }

    /// Enable the process-local in-memory cache.
    pub fn with_caching(mut self) -> Self {
        self.caching = true;
        self
    }

    /// Apply the given `compression` to values at rest.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Use the given `file_mode` and `dir_mode` when creating files and directories.
    pub fn with_modes(mut self, file_mode: u32, dir_mode: u32) -> Self {
        self.file_mode = file_mode;
        self.dir_mode = dir_mode;
        self
    }
}
