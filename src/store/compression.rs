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

#[cfg(feature = "compression")]
use {
    lz4::{Decoder as Lz4Decoder, EncoderBuilder as Lz4EncoderBuilder},
    std::io::{Read, Write},
};

#[cfg(feature = "compression")]
use crate::error::Error;
use crate::error::Result;

/// A data compression method.
///
/// Every instance sharing a root directory must use the same compression method, since the
/// method is not recorded in the data files themselves.
#[derive(Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Compression {
    /// Do not compress data.
    None,

    /// Compress data using the LZ4 compression algorithm.
    #[cfg(feature = "compression")]
    #[cfg_attr(docsrs, doc(cfg(feature = "compression")))]
    Lz4 {
        /// The compression level to use.
        ///
        /// This is a number in the range 1-9, where 1 gives the fastest compression and 9 gives
        /// the highest compression ratio.
        level: u32,
    },
}

impl Compression {
    /// Compresses the given `data` and returns it.
    pub(crate) fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            #[cfg(feature = "compression")]
            Compression::Lz4 { level } => {
                let mut output = Vec::with_capacity(data.len());
                let mut encoder = Lz4EncoderBuilder::new().level(*level).build(&mut output)?;
                encoder.write_all(data)?;
                let (_, result) = encoder.finish();
                result?;
                Ok(output)
            }
        }
    }

    /// Decompresses the given `data` and returns it.
    ///
    /// A corrupt compressed stream is reported as [`Error::Deserialize`].
    ///
    /// [`Error::Deserialize`]: crate::Error::Deserialize
    pub(crate) fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            #[cfg(feature = "compression")]
            Compression::Lz4 { .. } => {
                let mut output = Vec::with_capacity(data.len());
                let mut decoder = Lz4Decoder::new(data).map_err(|_| Error::Deserialize)?;
                decoder
                    .read_to_end(&mut output)
                    .map_err(|_| Error::Deserialize)?;
                let (_, result) = decoder.finish();
                result.map_err(|_| Error::Deserialize)?;
                Ok(output)
            }
        }
    }
}
