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

//! The high-level key-value store.
//!
//! This module provides [`FlatStore`], the handle which composes the backends in the
//! [`crate::store`] module and adds advisory locking, atomic mutation, and cross-instance cache
//! coherency on top of them. Use [`StoreConfig`] to open a store.
//!
//! [`FlatStore`]: crate::db::FlatStore
//! [`StoreConfig`]: crate::db::StoreConfig

pub use self::config::StoreConfig;
pub use self::flat_store::FlatStore;
pub use self::mailbox::RESERVED_KEY;

mod config;
mod flat_store;
mod lock;
mod mailbox;
mod watcher;
