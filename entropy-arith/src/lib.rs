//! # Entropy Arith
//!
//! Generic binary arithmetic codec (§4.5): a 56-bit range coder driven by
//! any [`entropy_predictors::Predictor`], with a chunked block protocol so
//! a multi-megabyte block doesn't require unbounded intermediate state.
//!
//! - [`coder`]: the raw per-bit [`coder::ArithEncoder`]/[`coder::ArithDecoder`]
//! - [`BlockCodec`]: chunk framing (VarInt length + coded bytes per chunk)
//!   over `entropy_core::bitstream`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod coder;

use coder::{ArithDecoder, ArithEncoder};
use entropy_core::bitstream::{BitReader, BitWriter};
use entropy_core::error::Result;
use entropy_core::varint::{read_var_int, write_var_int};
use entropy_predictors::Predictor;
use std::io::{Read, Write};

const MIN_CHUNK_BYTES: usize = 64;

/// Choose a chunk size in `[64, total/8]`, the adaptive range named in the
/// per-chunk protocol.
fn choose_chunk_size(total: usize) -> usize {
    if total <= MIN_CHUNK_BYTES {
        return total;
    }
    (total / 8).clamp(MIN_CHUNK_BYTES, total)
}

/// Encodes/decodes a byte block through a predictor-driven arithmetic
/// coder, chunked for periodic flush points. The predictor's learned state
/// persists across chunks within one block; only the coder's `(low, high)`
/// window resets at each chunk boundary.
pub struct BlockCodec<P: Predictor> {
    predictor: P,
}

impl<P: Predictor> BlockCodec<P> {
    /// Wrap a predictor instance for one block.
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    /// Replace the learned predictor state, discarding everything observed
    /// so far.
    pub fn reset(&mut self, predictor: P) {
        self.predictor = predictor;
    }

    /// Encode `data`, writing VarInt-length-prefixed chunks to `writer`.
    pub fn write<W: Write>(&mut self, writer: &mut BitWriter<W>, data: &[u8]) -> Result<()> {
        let chunk_size = choose_chunk_size(data.len()).max(1);
        for chunk in data.chunks(chunk_size) {
            let mut encoder = ArithEncoder::new(&mut self.predictor);
            for &byte in chunk {
                encoder.encode_byte(byte);
            }
            let coded = encoder.finish();

            writer.align_to_byte()?;
            write_var_int(coded.len() as u32, |b| writer.write_bits(b as u64, 8))?;
            writer.write_array(&coded, coded.len() * 8)?;
        }
        Ok(())
    }

    /// Decode `total_len` bytes previously written by [`write`](Self::write).
    pub fn read<R: Read>(&mut self, reader: &mut BitReader<R>, total_len: usize) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(total_len);
        let chunk_size = choose_chunk_size(total_len).max(1);

        while output.len() < total_len {
            let this_chunk = chunk_size.min(total_len - output.len());

            reader.align_to_byte();
            let coded_len = read_var_int(|| reader.read_bits(8).map(|v| v as u8))? as usize;
            let mut coded = vec![0u8; coded_len];
            reader.read_array(&mut coded, coded_len * 8)?;

            let mut decoder = ArithDecoder::new(&mut self.predictor, &coded)?;
            for _ in 0..this_chunk {
                output.push(decoder.decode_byte());
            }
        }

        Ok(output)
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::coder::{ArithDecoder, ArithEncoder};
    pub use crate::BlockCodec;
}

#[cfg(test)]
mod tests {
    use super::*;
    use entropy_predictors::Fpaq;
    use std::io::Cursor;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            let mut codec = BlockCodec::new(Fpaq::new());
            codec.write(&mut writer, data).unwrap();
            writer.flush().unwrap();
        }
        let mut reader = BitReader::new(Cursor::new(output));
        let mut codec = BlockCodec::new(Fpaq::new());
        codec.read(&mut reader, data.len()).unwrap()
    }

    #[test]
    fn test_roundtrip_small_block() {
        let data = b"the quick brown fox".to_vec();
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_roundtrip_multi_chunk_block() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_roundtrip_empty_block() {
        let data: Vec<u8> = Vec::new();
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_chunk_size_bounds() {
        assert_eq!(choose_chunk_size(10), 10);
        assert_eq!(choose_chunk_size(100_000), 12_500);
        assert!(choose_chunk_size(1000) >= MIN_CHUNK_BYTES);
    }
}
