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
use std::mem;
use std::path::PathBuf;

use rmp_serde::{from_read, to_vec};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{Compression, DirectoryStore, MemoryCache};

use super::lock::PathLock;

/// The key under which the mailbox record is stored.
///
/// This key is reserved for internal use; application operations on it fail with
/// [`Error::ReservedKey`].
///
/// [`Error::ReservedKey`]: crate::Error::ReservedKey
pub const RESERVED_KEY: &str = ".mailbox";

/// The shared record of pending cache invalidations.
///
/// Each instance sharing a root directory owns one queue, keyed by its instance ID. A queue is
/// only appended to by other instances and only cleared, in bulk, by its owner.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Mailbox {
    queues: HashMap<Uuid, Vec<String>>,
}

impl Mailbox {
    /// Ensure there is a (possibly empty) queue for the instance with the given `id`.
    fn register(&mut self, id: Uuid) {
        self.queues.entry(id).or_default();
    }

    /// Append `key` to the queue of every instance except the one with the given `id`.
    fn push_to_others(&mut self, id: Uuid, key: &str) {
        for (instance, queue) in self.queues.iter_mut() {
            if *instance != id {
                queue.push(key.to_owned());
            }
        }
    }

    /// Remove and return the pending keys for the instance with the given `id`.
    fn drain(&mut self, id: Uuid) -> Vec<String> {
        match self.queues.get_mut(&id) {
            Some(queue) => mem::take(queue),
            None => Vec::new(),
        }
    }
}

/// A handle for one instance's view of the shared mailbox record.
///
/// Every access to the record is a read-modify-write sequence performed under an exclusive lock
/// on the mailbox file, so concurrent instances never observe a partially updated record.
#[derive(Debug, Clone)]
pub(crate) struct MailboxClient {
    /// The path of the mailbox file in the root directory.
    path: PathBuf,

    /// The mode used to create the mailbox file.
    file_mode: u32,

    /// The compression applied to the serialized record.
    compression: Compression,

    /// The ID of the instance this client belongs to.
    id: Uuid,
}

impl MailboxClient {
    /// Create a new `MailboxClient` for the instance with the given `id`.
    pub fn new(directory: &DirectoryStore, id: Uuid) -> Self {
        MailboxClient {
            path: directory.root().join(RESERVED_KEY),
            file_mode: directory.file_mode(),
            compression: directory.compression().clone(),
            id,
        }
    }

    /// Read the record under the mailbox lock, apply `operation` to it, and write it back.
    ///
    /// A missing or empty mailbox file reads as an empty record.
    fn with_record<T>(&self, operation: impl FnOnce(&mut Mailbox) -> T) -> Result<T> {
        let mut lock = PathLock::exclusive_create(&self.path, self.file_mode)?;

        let bytes = lock.read_bytes()?;
        let mut record = if bytes.is_empty() {
            Mailbox::default()
        } else {
            let serialized = self.compression.decompress(&bytes)?;
            from_read(serialized.as_slice()).map_err(|_| Error::Deserialize)?
        };

        let output = operation(&mut record);

        let serialized = to_vec(&record).map_err(|_| Error::Serialize)?;
        lock.write_bytes(&self.compression.compress(&serialized)?)?;

        Ok(output)
    }

    /// Ensure this instance has a queue in the record, creating the record if necessary.
    pub fn subscribe(&self) -> Result<()> {
        self.with_record(|record| record.register(self.id))
    }

    /// Append `key` to the queue of every other known instance.
    pub fn broadcast(&self, key: &str) -> Result<()> {
        self.with_record(|record| record.push_to_others(self.id, key))
    }

    /// Drain this instance's queue and evict each pending key from the given `cache`.
    pub fn sync(&self, cache: &MemoryCache) -> Result<()> {
        self.with_record(|record| {
            for key in record.drain(self.id) {
                cache.evict(&key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_appended_for_others_only() {
        let mut record = Mailbox::default();
        let writer = Uuid::new_v4();
        let reader = Uuid::new_v4();

        record.register(writer);
        record.register(reader);
        record.push_to_others(writer, "stale");

        assert_eq!(record.drain(writer), Vec::<String>::new());
        assert_eq!(record.drain(reader), vec![String::from("stale")]);
    }

    #[test]
    fn drain_clears_the_queue() {
        let mut record = Mailbox::default();
        let writer = Uuid::new_v4();
        let reader = Uuid::new_v4();

        record.register(reader);
        record.push_to_others(writer, "first");
        record.push_to_others(writer, "second");

        assert_eq!(
            record.drain(reader),
            vec![String::from("first"), String::from("second")]
        );
        assert_eq!(record.drain(reader), Vec::<String>::new());
    }

    #[test]
    fn register_preserves_pending_keys() {
        let mut record = Mailbox::default();
        let writer = Uuid::new_v4();
        let reader = Uuid::new_v4();

        record.register(reader);
        record.push_to_others(writer, "pending");
        record.register(reader);

        assert_eq!(record.drain(reader), vec![String::from("pending")]);
    }
}
