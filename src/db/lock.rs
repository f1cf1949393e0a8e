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

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use fs2::FileExt;

/// An advisory lock acquired on a file.
///
/// The lock is scoped to one path and is safe across threads and OS processes. Acquiring the
/// lock blocks until any conflicting lock is released. The lock is released when this value is
/// dropped.
///
/// Because the lock is advisory, it only excludes other cooperating lock holders; it does not
/// stop an unlocked writer from touching the file.
#[derive(Debug)]
pub(crate) struct PathLock {
    file: File,
}

impl PathLock {
    /// Acquire an exclusive lock on the existing file at `path`.
    ///
    /// This fails with `ErrorKind::NotFound` if the file does not exist.
    pub fn exclusive(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        file.lock_exclusive()?;
        Ok(PathLock { file })
    }

    /// Acquire an exclusive lock on the file at `path`, creating it if it does not exist.
    pub fn exclusive_create(path: &Path, mode: u32) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        options.mode(mode);
        let file = options.open(path)?;
        file.lock_exclusive()?;
        Ok(PathLock { file })
    }

    /// Acquire a shared lock on the existing file at `path`.
    ///
    /// This fails with `ErrorKind::NotFound` if the file does not exist.
    pub fn shared(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        file.lock_shared()?;
        Ok(PathLock { file })
    }

    /// Read the entire contents of the locked file.
    pub fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Replace the contents of the locked file with the given `bytes` and flush them to disk.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.sync_all()
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
