//! # Entropy Range
//!
//! Order-0 Martin/Subbotin-style range codec (§4.6): 60-bit `(low, range)`
//! state, 28-bit bit-level renormalization (through
//! `entropy_core::bitstream` directly, not byte buffering), and the shared
//! alphabet/frequency-table header transport from `entropy_core`.
//!
//! The renormalization trigger is "range has fallen below `2^32`", the
//! standard Subbotin-style condition; it composes cleanly with a fixed
//! 28-bit output width and keeps the implementation carryless.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use entropy_core::bitstream::{BitReader, BitWriter};
use entropy_core::error::{EntropyError, Result};
use entropy_core::{decode_alphabet, encode_alphabet, normalize_frequencies};
use entropy_core::{read_frequency_table, write_frequency_table};
use std::io::{Read, Write};

const STATE_BITS: u32 = 60;
const TOP: u64 = 1u64 << STATE_BITS;
const RENORM_SHIFT: u32 = 28;
const RENORM_THRESHOLD: u64 = 1u64 << (STATE_BITS - RENORM_SHIFT);

/// Default normalization scale (`lr`) used when none is specified.
pub const DEFAULT_LOG_SCALE: u8 = 12;

fn build_alphabet(data: &[u8]) -> (Vec<u8>, Vec<u32>) {
    let mut freq = vec![0u32; 256];
    for &b in data {
        freq[b as usize] += 1;
    }
    let alphabet: Vec<u8> = (0u16..256)
        .filter(|&s| freq[s as usize] > 0)
        .map(|s| s as u8)
        .collect();
    (alphabet, freq)
}

fn cumulative_freqs(alphabet: &[u8], q: &[u32]) -> Vec<u32> {
    let mut cum = Vec::with_capacity(alphabet.len() + 1);
    let mut acc = 0u32;
    for &s in alphabet {
        cum.push(acc);
        acc += q[s as usize];
    }
    cum.push(acc);
    cum
}

/// Encode `data` as one range-coded chunk, writing the self-describing
/// header (alphabet + frequency table) followed by the coded payload.
pub fn encode<W: Write>(writer: &mut BitWriter<W>, data: &[u8], log_scale: u8) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let (alphabet, freq) = build_alphabet(data);
    let q = normalize_frequencies(&freq, &alphabet, log_scale)?;

    encode_alphabet(writer, &alphabet, 256)?;
    write_frequency_table(writer, &alphabet, &q, log_scale)?;

    let cum = cumulative_freqs(&alphabet, &q);
    let mut index_of = [usize::MAX; 256];
    for (i, &s) in alphabet.iter().enumerate() {
        index_of[s as usize] = i;
    }

    let scale = 1u64 << log_scale;
    let mut low: u64 = 0;
    let mut range: u64 = TOP;

    for &byte in data {
        let idx = index_of[byte as usize];
        range /= scale;
        low += cum[idx] as u64 * range;
        range *= (cum[idx + 1] - cum[idx]) as u64;

        while range < RENORM_THRESHOLD {
            let top_bits = (low >> (STATE_BITS - RENORM_SHIFT)) & ((1u64 << RENORM_SHIFT) - 1);
            writer.write_bits(top_bits, RENORM_SHIFT as u8)?;
            low = (low << RENORM_SHIFT) & (TOP - 1);
            range <<= RENORM_SHIFT;
        }
    }

    writer.write_bits(low, STATE_BITS as u8)?;
    Ok(())
}

/// Decode `len` bytes previously written by [`encode`].
pub fn decode<R: Read>(reader: &mut BitReader<R>, len: usize) -> Result<Vec<u8>> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let alphabet = decode_alphabet(reader, 256)?;
    if alphabet.is_empty() {
        return Err(EntropyError::invalid_stream(
            "range-coded chunk has an empty alphabet",
        ));
    }
    let (log_scale, q) = read_frequency_table(reader, &alphabet, 256)?;
    let cum = cumulative_freqs(&alphabet, &q);
    let scale = 1u64 << log_scale;

    let mut low: u64 = 0;
    let mut range: u64 = TOP;
    let mut code = reader.read_bits(STATE_BITS as u8)?;

    let mut output = Vec::with_capacity(len);
    for _ in 0..len {
        range /= scale;
        let value = ((code - low) / range).min(scale - 1) as u32;

        let idx = match cum.binary_search(&value) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        if value < cum[idx] || value >= cum[idx + 1] {
            return Err(EntropyError::invalid_stream(
                "range decode value outside any symbol's interval",
            ));
        }

        output.push(alphabet[idx]);
        low += cum[idx] as u64 * range;
        range *= (cum[idx + 1] - cum[idx]) as u64;

        while range < RENORM_THRESHOLD {
            low = (low << RENORM_SHIFT) & (TOP - 1);
            range <<= RENORM_SHIFT;
            let next_bits = reader.read_bits(RENORM_SHIFT as u8)?;
            code = ((code << RENORM_SHIFT) | next_bits) & (TOP - 1);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(data: &[u8], log_scale: u8) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            encode(&mut writer, data, log_scale).unwrap();
            writer.flush().unwrap();
        }
        let mut reader = BitReader::new(Cursor::new(output));
        decode(&mut reader, data.len()).unwrap()
    }

    #[test]
    fn test_roundtrip_text() {
        let data = b"the quick brown fox jumps over the lazy dog".to_vec();
        assert_eq!(roundtrip(&data, DEFAULT_LOG_SCALE), data);
    }

    #[test]
    fn test_roundtrip_single_symbol() {
        let data = vec![7u8; 500];
        assert_eq!(roundtrip(&data, 10), data);
    }

    #[test]
    fn test_roundtrip_full_alphabet() {
        let data: Vec<u8> = (0..4000u32).map(|i| (i % 256) as u8).collect();
        assert_eq!(roundtrip(&data, 12), data);
    }

    #[test]
    fn test_roundtrip_empty() {
        let data: Vec<u8> = Vec::new();
        assert_eq!(roundtrip(&data, DEFAULT_LOG_SCALE), data);
    }

    #[test]
    fn test_skewed_data_compresses() {
        let mut data = vec![0u8; 4000];
        data.extend((0..50u32).map(|i| (i % 256) as u8));
        assert_eq!(roundtrip(&data, DEFAULT_LOG_SCALE).len(), data.len());
    }
}
