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
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{ChainStore, DirectoryStore, KeyStore, MemoryCache};

use super::config::StoreConfig;
use super::lock::PathLock;
use super::mailbox::{MailboxClient, RESERVED_KEY};
use super::watcher::Watcher;

/// Return an error if the given `key` is reserved for internal use.
fn check_reserved(key: &str) -> Result<()> {
    if key == RESERVED_KEY {
        Err(Error::ReservedKey(key.to_owned()))
    } else {
        Ok(())
    }
}

/// A key-value store which persists each key as one file in a root directory.
///
/// A `FlatStore` wires the backends in the [`crate::store`] module into one handle. With caching
/// enabled, reads and writes go through a [`ChainStore`] which places a [`MemoryCache`] in front
/// of the [`DirectoryStore`]; otherwise they go to the directory store alone.
///
/// Independent instances — in this process or in others — can share one root directory. The
/// plain operations never lock; the `_with_lock` variants and [`mutate`] take an advisory lock
/// on the key's data file so that cooperating writers never interleave. Cached entries are never
/// revalidated against disk; with the watcher enabled, instances propagate invalidations to each
/// other through a shared mailbox record, and an entry cached by one instance is evicted within
/// one sync interval of another instance's write.
///
/// [`ChainStore`]: crate::store::ChainStore
/// [`MemoryCache`]: crate::store::MemoryCache
/// [`DirectoryStore`]: crate::store::DirectoryStore
/// [`mutate`]: crate::db::FlatStore::mutate
#[derive(Debug)]
pub struct FlatStore {
    /// The durable backend, also used to resolve key paths for locking.
    directory: DirectoryStore,

    /// The backend the plain operations go through.
    backend: Box<dyn KeyStore>,

    /// The cache in front of the durable backend, if caching is enabled.
    cache: Option<MemoryCache>,

    /// This instance's view of the shared mailbox record.
    mailbox: MailboxClient,

    /// The ID which identifies this instance in the mailbox record.
    id: Uuid,

    /// The running watcher task, if enabled.
    watcher: Option<Watcher>,
}

impl FlatStore {
    /// Open a store with the given `config`, creating its root directory if necessary.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let directory = DirectoryStore::new(&config.root)
            .with_modes(config.file_mode, config.dir_mode)
            .with_compression(config.compression);
        directory.create_root()?;

        let cache = if config.caching {
            Some(MemoryCache::new())
        } else {
            None
        };

        let backend: Box<dyn KeyStore> = match &cache {
            Some(cache) => Box::new(ChainStore::new(vec![
                Box::new(cache.clone()),
                Box::new(directory.clone()),
            ])),
            None => Box::new(directory.clone()),
        };

        let id = Uuid::new_v4();
        let mailbox = MailboxClient::new(&directory, id);

        Ok(FlatStore {
            directory,
            backend,
            cache,
            mailbox,
            id,
            watcher: None,
        })
    }

    /// The ID which identifies this instance in the mailbox record.
    ///
    /// A new ID is generated every time a store is opened.
    pub fn instance_id(&self) -> Uuid {
        self.id
    }

    /// The path of the store's root directory.
    pub fn root(&self) -> &Path {
        self.directory.root()
    }

    /// Store the given `value` under the given `key`.
    ///
    /// If a value with the given `key` already exists, it is overwritten.
    ///
    /// # Errors
    /// - `Error::InvalidKey`: The `key` contains a path separator.
    /// - `Error::ReservedKey`: The `key` is reserved for internal use.
    /// - `Error::KeyConflict`: A directory with the same name as the `key` exists.
    /// - `Error::Io`: An I/O error occurred.
    pub fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        check_reserved(key)?;
        self.backend.store(key, value)?;
        self.notify(key)
    }

    /// Return the value stored under the given `key`.
    ///
    /// With caching enabled, this returns the cached value without consulting the file system
    /// when the key is cached.
    ///
    /// # Errors
    /// - `Error::KeyNotFound`: There is no value with the given `key`.
    /// - `Error::InvalidKey`: The `key` contains a path separator.
    /// - `Error::ReservedKey`: The `key` is reserved for internal use.
    /// - `Error::KeyConflict`: A directory with the same name as the `key` exists.
    /// - `Error::Deserialize`: The value's compressed stream is corrupt.
    /// - `Error::Io`: An I/O error occurred.
    pub fn load(&self, key: &str) -> Result<Vec<u8>> {
        check_reserved(key)?;
        self.backend.load(key)
    }

    /// Remove the value stored under the given `key`.
    ///
    /// If there is no value with the given `key`, this method does nothing and returns `Ok`.
    ///
    /// # Errors
    /// - `Error::InvalidKey`: The `key` contains a path separator.
    /// - `Error::ReservedKey`: The `key` is reserved for internal use.
    /// - `Error::Io`: An I/O error occurred.
    pub fn delete(&self, key: &str) -> Result<()> {
        check_reserved(key)?;
        self.backend.delete(key)?;
        self.notify(key)
    }

    /// Return whether there is a value stored under the given `key`.
    ///
    /// A cached entry answers without touching the file system. A directory with the same name
    /// as the `key` does not count as a value.
    ///
    /// # Errors
    /// - `Error::InvalidKey`: The `key` contains a path separator.
    /// - `Error::ReservedKey`: The `key` is reserved for internal use.
    /// - `Error::Io`: An I/O error occurred.
    pub fn exists(&self, key: &str) -> Result<bool> {
        check_reserved(key)?;

        if let Some(cache) = &self.cache {
            if cache.contains(key) {
                return Ok(true);
            }
        }

        let path = self.directory.key_path(key)?;
        match std::fs::metadata(&path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    /// Store the given `value` under the given `key` while holding an exclusive lock on the
    /// key's data file.
    ///
    /// This has the same contract as [`store`], and is additionally safe against cooperating
    /// writers in other processes: no other locked write or [`mutate`] on the same key can
    /// interleave with it.
    ///
    /// [`store`]: crate::db::FlatStore::store
    /// [`mutate`]: crate::db::FlatStore::mutate
    pub fn store_with_lock(&self, key: &str, value: &[u8]) -> Result<()> {
        check_reserved(key)?;
        let path = self.directory.key_path(key)?;
        self.directory.create_root()?;

        if path.is_dir() {
            return Err(Error::KeyConflict {
                key: key.to_owned(),
                path,
            });
        }

        let _lock = PathLock::exclusive_create(&path, self.directory.file_mode())?;
        self.backend.store(key, value)?;
        self.notify(key)
    }

    /// Return the value stored under the given `key` while holding a shared lock on the key's
    /// data file.
    ///
    /// This has the same contract as [`load`]. The shared lock excludes locked writers, so the
    /// returned bytes are always a fully-old or fully-new value, never a partial write —
    /// provided every writer holds the exclusive lock for its entire write.
    ///
    /// [`load`]: crate::db::FlatStore::load
    pub fn load_with_lock(&self, key: &str) -> Result<Vec<u8>> {
        check_reserved(key)?;
        let path = self.directory.key_path(key)?;

        if path.is_dir() {
            return Err(Error::KeyConflict {
                key: key.to_owned(),
                path,
            });
        }

        // A missing data file is not an error yet; the cache may still hold the key.
        let _lock = match PathLock::shared(&path) {
            Ok(lock) => Some(lock),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => return Err(error.into()),
        };

        self.backend.load(key)
    }

    /// Atomically transform the value stored under the given `key`.
    ///
    /// If `transform` is `None`, this method does nothing and performs no I/O. Otherwise the
    /// current value is read, transformed, and written back while an exclusive lock on the key's
    /// data file is held, so concurrent `mutate` and locked-write calls on the same key from any
    /// cooperating instance never lose updates.
    ///
    /// # Errors
    /// - `Error::KeyNotFound`: There is no value with the given `key`.
    /// - `Error::InvalidKey`: The `key` contains a path separator.
    /// - `Error::ReservedKey`: The `key` is reserved for internal use.
    /// - `Error::KeyConflict`: A directory with the same name as the `key` exists.
    /// - `Error::Deserialize`: The value's compressed stream is corrupt.
    /// - `Error::Io`: An I/O error occurred.
    pub fn mutate<F>(&self, key: &str, transform: Option<F>) -> Result<()>
    where
        F: FnOnce(&mut Vec<u8>),
    {
        check_reserved(key)?;

        let transform = match transform {
            Some(transform) => transform,
            None => return Ok(()),
        };

        let path = self.directory.key_path(key)?;

        if path.is_dir() {
            return Err(Error::KeyConflict {
                key: key.to_owned(),
                path,
            });
        }

        let mut lock = match PathLock::exclusive(&path) {
            Ok(lock) => lock,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(Error::KeyNotFound(key.to_owned()))
            }
            Err(error) => return Err(error.into()),
        };

        let bytes = lock.read_bytes()?;
        let mut value = self.directory.compression().decompress(&bytes)?;

        transform(&mut value);

        lock.write_bytes(&self.directory.compression().compress(&value)?)?;

        if let Some(cache) = &self.cache {
            cache.store(key, &value)?;
        }

        self.notify(key)
    }

    /// Start the watcher, which keeps this instance's cache coherent with writes made by other
    /// instances sharing the root directory.
    ///
    /// This registers the instance in the shared mailbox record and starts a background task
    /// which drains the instance's queue of pending invalidations every `frequency`, evicting
    /// the drained keys from the local cache. Coherency is eventual: an entry cached here is
    /// evicted within one `frequency` of another instance's write.
    ///
    /// Failures inside a sync cycle do not stop the task; they are delivered through the
    /// returned channel and dropped once it is full. If the watcher is already enabled, it is
    /// restarted with the new `frequency`.
    ///
    /// # Errors
    /// - `Error::CacheDisabled`: Caching is not enabled on this store.
    /// - `Error::Deserialize`: The mailbox record is corrupt.
    /// - `Error::Io`: An I/O error occurred.
    pub fn enable_watcher(&mut self, frequency: Duration) -> Result<Receiver<Error>> {
        let cache = self.cache.clone().ok_or(Error::CacheDisabled)?;

        self.disable_watcher();
        self.mailbox.subscribe()?;

        let (watcher, errors) = Watcher::start(self.mailbox.clone(), cache, frequency);
        self.watcher = Some(watcher);

        Ok(errors)
    }

    /// Stop the watcher.
    ///
    /// No sync cycle starts after this method returns; a cycle already in flight completes
    /// undisturbed. The instance's mailbox entry is not removed, so other instances keep
    /// queueing invalidations for it until the record is cleaned up externally.
    ///
    /// This method does nothing if the watcher is not enabled.
    pub fn disable_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
    }

    /// Apply this instance's pending invalidations immediately instead of waiting for the next
    /// watcher tick.
    ///
    /// # Errors
    /// - `Error::CacheDisabled`: Caching is not enabled on this store.
    /// - `Error::Deserialize`: The mailbox record is corrupt.
    /// - `Error::Io`: An I/O error occurred.
    pub fn sync_cache(&self) -> Result<()> {
        let cache = self.cache.as_ref().ok_or(Error::CacheDisabled)?;
        self.mailbox.sync(cache)
    }

    /// Broadcast an invalidation for `key` to the other instances sharing the root directory.
    ///
    /// Writes are only broadcast while this instance participates in the coherency protocol,
    /// which is when its watcher is enabled.
    fn notify(&self, key: &str) -> Result<()> {
        if self.watcher.is_some() {
            self.mailbox.broadcast(key)?;
        }
        Ok(())
    }
}

impl Drop for FlatStore {
    fn drop(&mut self) {
        self.disable_watcher();
    }
}
