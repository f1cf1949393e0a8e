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

//! `flat-store` is a local key-value store which persists each key as one file in a root
//! directory.
//!
//! The key space is flat: a key is any string which can be used as a file name, and its value is
//! an opaque sequence of bytes. On top of that simple layout, this crate provides:
//! - An in-memory cache in front of the durable storage, composed through an ordered backend
//!   chain
//! - Lock-guarded reads, writes, and atomic read-modify-write mutation, safe across threads and
//!   OS processes
//! - A cache-coherency watcher which propagates invalidations between independent instances
//!   sharing one root directory
//! - Optional transparent compression of values at rest
//!
//! The [`db::FlatStore`] handle is the main entry point. The backends it is built from live in
//! the [`store`] module and implement the [`store::KeyStore`] trait, so custom wirings are
//! possible as well.
//!
//! # Examples
//! ```no_run
//! use flat_store::db::{FlatStore, StoreConfig};
//!
//! fn main() -> flat_store::Result<()> {
//!     let store = FlatStore::open(StoreConfig::new("./data").with_caching())?;
//!
//!     store.store("greeting", b"hello")?;
//!     assert_eq!(store.load("greeting")?, b"hello");
//!
//!     store.delete("greeting")?;
//!     assert!(store.load("greeting").unwrap_err().is_not_found());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Coherency between instances
//! Cached entries are never revalidated against the file system; they are only evicted when
//! another instance announces a write. Call [`db::FlatStore::enable_watcher`] on each instance
//! to participate in that protocol. Coherency is eventual: an entry cached by instance B is
//! evicted within one of B's sync intervals after instance A writes the key.
//!
//! # Features
//! LZ4 compression support is gated behind the `compression` cargo feature.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use error::{Error, Result};

pub mod db;
mod error;
pub mod store;
