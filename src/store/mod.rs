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

//! Low-level backends for key-value storage.
//!
//! This module provides the storage backends a [`FlatStore`](crate::db::FlatStore) is built
//! from. A backend provides only the most basic storage operations over a flat key space and
//! doesn't have to worry about locking, mutation, or cache coherency; those features are
//! implemented at a higher level in the [`crate::db`] module.
//!
//! All backends implement the [`KeyStore`] trait. Backends can be composed into one logical
//! store with [`ChainStore`], which tries each backend in order.
//!
//! [`KeyStore`]: crate::store::KeyStore
//! [`ChainStore`]: crate::store::ChainStore

pub use self::chain::ChainStore;
pub use self::compression::Compression;
pub use self::directory::{DirectoryStore, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
pub use self::key_store::KeyStore;
pub use self::memory::MemoryCache;

mod chain;
mod compression;
mod directory;
mod key_store;
mod memory;
