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

use std::fs::remove_file;
use std::sync::Arc;
use std::thread;

use flat_store::db::FlatStore;
use flat_store::Result;

mod common;

use common::{random_buffer, store_config};

const WRITER_THREADS: usize = 8;

const WRITES_PER_THREAD: usize = 16;

#[test]
fn absent_transform_is_a_no_op() -> Result<()> {
    let (_temp_dir, config) = store_config();
    let store = FlatStore::open(config)?;

    // Succeeds even though the key does not exist, because no I/O happens.
    store.mutate("missing", None::<fn(&mut Vec<u8>)>)?;
    Ok(())
}

#[test]
fn mutating_a_missing_key_errs() -> Result<()> {
    let (_temp_dir, config) = store_config();
    let store = FlatStore::open(config)?;

    let result = store.mutate("missing", Some(|value: &mut Vec<u8>| value.push(0)));

    assert!(result.unwrap_err().is_not_found());
    Ok(())
}

#[test]
fn transform_replaces_the_value() -> Result<()> {
    let (_temp_dir, config) = store_config();
    let store = FlatStore::open(config)?;

    store.store("test", b"hello")?;
    store.mutate("test", Some(|value: &mut Vec<u8>| value.reverse()))?;

    assert_eq!(store.load("test")?, b"olleh");
    Ok(())
}

#[test]
fn mutation_updates_the_cache() -> Result<()> {
    let (_temp_dir, config) = store_config();
    let root = config.root.clone();
    let store = FlatStore::open(config.with_caching())?;

    store.store("test", b"hello")?;
    store.mutate("test", Some(|value: &mut Vec<u8>| value.reverse()))?;

    // Only the cache can answer once the data file is gone.
    remove_file(root.join("test"))?;

    assert_eq!(store.load("test")?, b"olleh");
    Ok(())
}

#[test]
fn concurrent_mutations_lose_no_updates() -> Result<()> {
    let (_temp_dir, config) = store_config();
    let store = Arc::new(FlatStore::open(config)?);
    let initial = random_buffer();

    store.store("counter", &initial)?;

    let threads = (0..WRITER_THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..WRITES_PER_THREAD {
                    store
                        .mutate("counter", Some(|value: &mut Vec<u8>| value.push(1)))
                        .unwrap();
                }
            })
        })
        .collect::<Vec<_>>();

    for thread in threads {
        thread.join().unwrap();
    }

    let expected_len = initial.len() + WRITER_THREADS * WRITES_PER_THREAD;
    assert_eq!(store.load("counter")?.len(), expected_len);
    Ok(())
}

#[cfg(feature = "compression")]
mod compression {
    use flat_store::store::Compression;

    use super::*;

    #[test]
    fn mutation_round_trips_through_the_codec() -> Result<()> {
        let (_temp_dir, config) = store_config();
        let store =
            FlatStore::open(config.with_compression(Compression::Lz4 { level: 1 }))?;

        store.store("test", b"hello")?;
        store.mutate("test", Some(|value: &mut Vec<u8>| value.extend(b" world")))?;

        assert_eq!(store.load("test")?, b"hello world");
        Ok(())
    }
}
