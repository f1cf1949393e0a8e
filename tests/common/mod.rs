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

#![allow(dead_code)]

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tempfile::TempDir;

use flat_store::db::StoreConfig;

/// The size of test data buffers.
const BUFFER_SIZE: usize = 2048;

/// Return a configuration with a root directory inside a new temporary directory.
///
/// The `TempDir` must be kept alive for as long as the store is in use.
pub fn store_config() -> (TempDir, StoreConfig) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(temp_dir.path().join("store"));
    (temp_dir, config)
}

/// Return a buffer of random bytes.
pub fn random_buffer() -> Vec<u8> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    SmallRng::from_entropy().fill_bytes(&mut buffer);
    buffer
}
