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

use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error as DeriveError;

/// The error type for operations with a store.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// There is no value for the given key.
    ///
    /// This is an expected outcome and not a fault; use [`Error::is_not_found`] to test for it
    /// instead of matching on error messages.
    #[error("the key `{0}` was not found")]
    KeyNotFound(String),

    /// The given key contains a path separator and cannot name a file.
    #[error("the key `{0}` contains a path separator")]
    InvalidKey(String),

    /// The given key collides with a directory in the root directory.
    #[error("the key `{key}` collides with the directory at `{}`", path.display())]
    KeyConflict {
        /// The key which could not be used.
        key: String,

        /// The path of the colliding directory.
        path: PathBuf,
    },

    /// The given key is reserved for internal use.
    #[error("the key `{0}` is reserved and cannot be used")]
    ReservedKey(String),

    /// The watcher was requested but caching is not enabled on this store.
    #[error("caching is not enabled on this store")]
    CacheDisabled,

    /// A value could not be serialized.
    #[error("a value could not be serialized")]
    Serialize,

    /// A value could not be deserialized.
    ///
    /// This is returned when the mailbox record is corrupt or when a compressed value cannot be
    /// decoded.
    #[error("a value could not be deserialized")]
    Deserialize,

    /// An I/O error occurred.
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Return whether this error is [`Error::KeyNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_))
    }
}

/// The result type for operations with a store.
pub type Result<T> = result::Result<T, Error>;
