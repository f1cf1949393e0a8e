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

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

use super::key_store::KeyStore;

/// A `KeyStore` which holds values in memory.
///
/// Values in a `MemoryCache` are not stored persistently and are only accessible to the current
/// process. Entries never expire; they are only removed by `delete` or by watcher-driven
/// eviction. Cloning a `MemoryCache` is cheap, and clones share the same map.
///
/// This type is typically placed in front of a [`DirectoryStore`] in a [`ChainStore`] so that
/// reads prefer the cache and only fall through to disk on a miss.
///
/// [`DirectoryStore`]: crate::store::DirectoryStore
/// [`ChainStore`]: crate::store::ChainStore
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryCache {
    /// Create a new empty `MemoryCache`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return whether the cache holds a value for the given `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().unwrap().contains_key(key)
    }

    /// Remove the value for the given `key`, if any.
    pub(crate) fn evict(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

impl KeyStore for MemoryCache {
    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.entries
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.evict(key);
        Ok(())
    }
}
