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

use crate::error::{Error, Result};

use super::key_store::KeyStore;

/// A `KeyStore` which composes an ordered list of backends into one logical store.
///
/// Reads return the value from the first backend which holds the key, falling through to the
/// next backend on [`Error::KeyNotFound`]. Writes go to every backend in order. The typical
/// wiring places a [`MemoryCache`] first and a [`DirectoryStore`] second, so reads prefer the
/// cache and only fall through to disk on a miss.
///
/// A `store` which fails part-way through the list does not roll back backends which were
/// already written, so the backends can be left inconsistent with each other.
///
/// [`Error::KeyNotFound`]: crate::Error::KeyNotFound
/// [`MemoryCache`]: crate::store::MemoryCache
/// [`DirectoryStore`]: crate::store::DirectoryStore
#[derive(Debug)]
pub struct ChainStore {
    backends: Vec<Box<dyn KeyStore>>,
}

impl ChainStore {
    /// Create a new `ChainStore` over the given `backends`, in order.
    ///
    /// # Panics
    /// Panics if `backends` is empty.
    pub fn new(backends: Vec<Box<dyn KeyStore>>) -> Self {
        assert!(
            !backends.is_empty(),
            "a chain store requires at least one backend"
        );
        ChainStore { backends }
    }
}

impl KeyStore for ChainStore {
    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        for backend in &self.backends {
            backend.store(key, value)?;
        }
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<u8>> {
        for backend in &self.backends {
            match backend.load(key) {
                Ok(value) => return Ok(value),
                Err(error) if error.is_not_found() => continue,
                Err(error) => return Err(error),
            }
        }
        Err(Error::KeyNotFound(key.to_owned()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        for backend in &self.backends {
            match backend.delete(key) {
                Ok(()) => {}
                Err(error) if error.is_not_found() => continue,
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }
}
