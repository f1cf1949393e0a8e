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

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::Error;
use crate::store::MemoryCache;

use super::mailbox::MailboxClient;

/// The capacity of the watcher's error channel.
///
/// Errors from sync cycles are dropped once the channel is full.
const ERROR_BUFFER: usize = 8;

/// The flag used to stop the watcher thread.
#[derive(Debug, Default)]
struct Shutdown {
    stopped: Mutex<bool>,
    signal: Condvar,
}

/// A periodic background task which applies pending cache invalidations.
///
/// Every tick, the task drains this instance's mailbox queue and evicts the drained keys from
/// the local cache. A failed cycle is reported through the error channel and does not stop
/// subsequent ticks.
#[derive(Debug)]
pub(crate) struct Watcher {
    shutdown: Arc<Shutdown>,
    thread: JoinHandle<()>,
}

impl Watcher {
    /// Start a new watcher task which syncs the given `cache` every `frequency`.
    ///
    /// Returns the watcher and the receiving end of its error channel.
    pub fn start(
        client: MailboxClient,
        cache: MemoryCache,
        frequency: Duration,
    ) -> (Self, Receiver<Error>) {
        let (error_tx, error_rx) = mpsc::sync_channel(ERROR_BUFFER);
        let shutdown = Arc::new(Shutdown::default());
        let task_shutdown = Arc::clone(&shutdown);

        let thread =
            thread::spawn(move || run(client, cache, frequency, task_shutdown, error_tx));

        (Watcher { shutdown, thread }, error_rx)
    }

    /// Stop the watcher and wait for its thread to finish.
    ///
    /// No tick starts after this method returns. A cycle which is already in flight is allowed
    /// to complete.
    pub fn stop(self) {
        *self.shutdown.stopped.lock().unwrap() = true;
        self.shutdown.signal.notify_all();
        let _ = self.thread.join();
    }
}

fn run(
    client: MailboxClient,
    cache: MemoryCache,
    frequency: Duration,
    shutdown: Arc<Shutdown>,
    errors: SyncSender<Error>,
) {
    let mut stopped = shutdown.stopped.lock().unwrap();
    while !*stopped {
        let (guard, timeout) = shutdown.signal.wait_timeout(stopped, frequency).unwrap();
        stopped = guard;

        if *stopped {
            break;
        }

        if timeout.timed_out() {
            // The shutdown flag must not be held across the sync, or `stop` would block on an
            // in-flight cycle's mailbox I/O.
            drop(stopped);
            if let Err(error) = client.sync(&cache) {
                let _ = errors.try_send(error);
            }
            stopped = shutdown.stopped.lock().unwrap();
        }
    }
}
