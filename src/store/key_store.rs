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

use std::fmt;

use static_assertions::assert_obj_safe;

use crate::error::Result;

/// A backend which maps keys to opaque byte values.
///
/// A `KeyStore` provides only the most basic storage operations over a flat key space. Backends
/// are composed into one logical store by [`ChainStore`], and the [`FlatStore`] handle builds the
/// locking, mutation, and cache-coherency features on top of them.
///
/// [`ChainStore`]: crate::store::ChainStore
/// [`FlatStore`]: crate::db::FlatStore
pub trait KeyStore: fmt::Debug + Send + Sync {
    /// Store the given `value` under the given `key`.
    ///
    /// If a value with the given `key` already exists, it is overwritten.
    fn store(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Return the value stored under the given `key`.
    ///
    /// # Errors
    /// - `Error::KeyNotFound`: There is no value with the given `key`.
    fn load(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove the value stored under the given `key`.
    ///
    /// If there is no value with the given `key`, this method does nothing and returns `Ok`.
    fn delete(&self, key: &str) -> Result<()>;
}

assert_obj_safe!(KeyStore);

impl KeyStore for Box<dyn KeyStore> {
    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        self.as_ref().store(key, value)
    }

    fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.as_ref().load(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.as_ref().delete(key)
    }
}
