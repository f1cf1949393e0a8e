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

use std::fs::create_dir_all;

use tempfile::tempdir;

use flat_store::store::{DirectoryStore, KeyStore};
use flat_store::{Error, Result};

mod common;

use common::random_buffer;

#[test]
fn stored_value_is_loaded() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = DirectoryStore::new(temp_dir.path().join("store"));
    let expected = random_buffer();

    store.store("test", &expected)?;

    assert_eq!(store.load("test")?, expected);
    Ok(())
}

#[test]
fn storing_overwrites_the_previous_value() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = DirectoryStore::new(temp_dir.path().join("store"));
    let expected = random_buffer();

    store.store("test", &random_buffer())?;
    store.store("test", &expected)?;

    assert_eq!(store.load("test")?, expected);
    Ok(())
}

#[test]
fn loading_a_missing_key_errs() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = DirectoryStore::new(temp_dir.path().join("store"));

    let result = store.load("missing");

    assert!(matches!(result, Err(Error::KeyNotFound(key)) if key == "missing"));
    Ok(())
}

#[test]
fn deleting_a_missing_key_succeeds() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = DirectoryStore::new(temp_dir.path().join("store"));

    store.delete("missing")?;
    Ok(())
}

#[test]
fn deleted_key_is_not_found() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = DirectoryStore::new(temp_dir.path().join("store"));

    store.store("test", &random_buffer())?;
    store.delete("test")?;

    assert!(store.load("test").unwrap_err().is_not_found());
    Ok(())
}

#[test]
fn key_with_separator_is_invalid() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = DirectoryStore::new(temp_dir.path().join("store"));

    assert!(matches!(
        store.store("sub/key", &random_buffer()),
        Err(Error::InvalidKey(key)) if key == "sub/key"
    ));
    assert!(matches!(
        store.load("sub/key"),
        Err(Error::InvalidKey(_))
    ));
    assert!(matches!(
        store.delete("sub/key"),
        Err(Error::InvalidKey(_))
    ));
    Ok(())
}

#[test]
fn key_validation_happens_before_any_io() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("store");
    let store = DirectoryStore::new(&root);

    let result = store.store("sub/key", &random_buffer());

    assert!(matches!(result, Err(Error::InvalidKey(_))));
    // The root directory is only created once a legal store call is made.
    assert!(!root.exists());
    Ok(())
}

#[test]
fn storing_onto_a_directory_errs() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("store");
    let store = DirectoryStore::new(&root);
    create_dir_all(root.join("taken"))?;

    let result = store.store("taken", &random_buffer());

    assert!(matches!(result, Err(Error::KeyConflict { key, .. }) if key == "taken"));
    Ok(())
}

#[test]
fn loading_a_directory_errs() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("store");
    let store = DirectoryStore::new(&root);
    create_dir_all(root.join("taken"))?;

    let result = store.load("taken");

    assert!(matches!(result, Err(Error::KeyConflict { key, .. }) if key == "taken"));
    Ok(())
}

#[cfg(feature = "compression")]
mod compression {
    use flat_store::store::Compression;

    use super::*;

    #[test]
    fn compressed_value_round_trips() -> Result<()> {
        let temp_dir = tempdir()?;
        let store = DirectoryStore::new(temp_dir.path().join("store"))
            .with_compression(Compression::Lz4 { level: 1 });
        let expected = random_buffer();

        store.store("test", &expected)?;

        assert_eq!(store.load("test")?, expected);
        Ok(())
    }

    #[test]
    fn corrupt_compressed_stream_errs() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path().join("store");
        let store =
            DirectoryStore::new(&root).with_compression(Compression::Lz4 { level: 1 });

        store.store("test", &random_buffer())?;
        std::fs::write(root.join("test"), b"not an lz4 stream")?;

        assert!(matches!(store.load("test"), Err(Error::Deserialize)));
        Ok(())
    }
}
