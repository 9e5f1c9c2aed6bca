//! Frequency normalization (§4.2.2 of the format this workspace implements).
//!
//! Rescales raw symbol counts to a power-of-two target sum `scale = 2^lr`
//! while keeping every present symbol at a frequency of at least 1 and
//! approximating the empirical distribution as closely as integer rounding
//! allows.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{EntropyError, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::{Read, Write};

/// Minimum allowed `lr` (log2 of the normalization scale).
pub const MIN_LOG_SCALE: u8 = 8;
/// Maximum allowed `lr`.
pub const MAX_LOG_SCALE: u8 = 16;

/// Maximum `lr` the range and ANS wire headers can express, since both
/// encode `lr - MIN_LOG_SCALE` in a 3-bit field.
pub const MAX_WIRE_LOG_SCALE: u8 = MIN_LOG_SCALE + 7;

/// Alphabet-count threshold above which the frequency-table transport uses
/// 12-symbol sub-chunks instead of 6.
const SUBCHUNK_THRESHOLD: usize = 64;
const SUBCHUNK_LARGE: usize = 12;
const SUBCHUNK_SMALL: usize = 6;
const WIDTH_HEADER_BITS: u8 = 4;

fn subchunk_size(alphabet_len: usize) -> usize {
    if alphabet_len >= SUBCHUNK_THRESHOLD {
        SUBCHUNK_LARGE
    } else {
        SUBCHUNK_SMALL
    }
}

fn bits_for(v: u32) -> u32 {
    32 - v.leading_zeros().min(32)
}

/// Write a normalized frequency table for `alphabet` (§4.6/§4.7 header
/// transport): `lr - 8` in 3 bits, then frequencies in sub-chunks with a
/// per-chunk bit-width header, omitting the first symbol's frequency
/// (the decoder recovers it as `scale - sum(others)`).
pub fn write_frequency_table<W: Write>(
    writer: &mut BitWriter<W>,
    alphabet: &[u8],
    q: &[u32],
    log_scale: u8,
) -> Result<()> {
    if !(MIN_LOG_SCALE..=MAX_WIRE_LOG_SCALE).contains(&log_scale) {
        return Err(EntropyError::invalid_parameter(format!(
            "log_scale {log_scale} exceeds the wire header's 3-bit range"
        )));
    }
    writer.write_bits((log_scale - MIN_LOG_SCALE) as u64, 3)?;

    if alphabet.len() <= 1 {
        return Ok(());
    }

    let rest: Vec<u32> = alphabet[1..].iter().map(|&s| q[s as usize]).collect();
    let chunk_size = subchunk_size(alphabet.len());
    for chunk in rest.chunks(chunk_size) {
        let max = chunk.iter().copied().max().unwrap_or(0);
        let width = bits_for(max).max(1);
        writer.write_bits((width - 1) as u64, WIDTH_HEADER_BITS)?;
        for &f in chunk {
            writer.write_bits(f as u64, width as u8)?;
        }
    }
    Ok(())
}

/// Read a frequency table written by [`write_frequency_table`]; `alphabet`
/// must be the same sorted symbol list the encoder used. Returns
/// `(log_scale, q)` where `q` is indexed by symbol value, matching
/// [`normalize_frequencies`]'s output shape.
pub fn read_frequency_table<R: Read>(
    reader: &mut BitReader<R>,
    alphabet: &[u8],
    universe: usize,
) -> Result<(u8, Vec<u32>)> {
    let log_scale = reader.read_bits(3)? as u8 + MIN_LOG_SCALE;
    let scale: u64 = 1u64 << log_scale;

    let mut q = vec![0u32; universe];
    if alphabet.is_empty() {
        return Ok((log_scale, q));
    }
    if alphabet.len() == 1 {
        q[alphabet[0] as usize] = scale as u32;
        return Ok((log_scale, q));
    }

    let chunk_size = subchunk_size(alphabet.len());
    let rest_len = alphabet.len() - 1;
    let mut rest = Vec::with_capacity(rest_len);
    let mut remaining = rest_len;
    while remaining > 0 {
        let this_chunk = remaining.min(chunk_size);
        let width = reader.read_bits(WIDTH_HEADER_BITS)? as u32 + 1;
        for _ in 0..this_chunk {
            rest.push(reader.read_bits(width as u8)? as u32);
        }
        remaining -= this_chunk;
    }

    let sum: u64 = rest.iter().map(|&f| f as u64).sum();
    if sum >= scale {
        return Err(EntropyError::invalid_stream(
            "frequency table's trailing entries already consume the whole scale",
        ));
    }
    let first = (scale - sum) as u32;
    if first == 0 {
        return Err(EntropyError::invalid_stream(
            "recovered first frequency is zero",
        ));
    }

    q[alphabet[0] as usize] = first;
    for (&s, &f) in alphabet[1..].iter().zip(rest.iter()) {
        q[s as usize] = f;
    }
    Ok((log_scale, q))
}

/// Normalize `freq` (indexed by symbol value, over the same universe as
/// `alphabet`'s values) so the present symbols sum to `2^log_scale`, with
/// every present symbol at frequency >= 1.
///
/// Returns a vector the same length as `freq`; positions not in `alphabet`
/// are zero.
pub fn normalize_frequencies(freq: &[u32], alphabet: &[u8], log_scale: u8) -> Result<Vec<u32>> {
    if !(MIN_LOG_SCALE..=MAX_LOG_SCALE).contains(&log_scale) {
        return Err(EntropyError::invalid_parameter(format!(
            "log_scale {log_scale} out of range [{MIN_LOG_SCALE}, {MAX_LOG_SCALE}]"
        )));
    }
    if alphabet.is_empty() {
        return Err(EntropyError::invalid_parameter(
            "cannot normalize an empty alphabet",
        ));
    }

    let scale: u64 = 1u64 << log_scale;
    let total: u64 = alphabet.iter().map(|&s| freq[s as usize] as u64).sum();
    if total == 0 {
        return Err(EntropyError::invalid_parameter(
            "alphabet symbols all have zero frequency",
        ));
    }

    let mut q = vec![0u32; freq.len()];

    // Fast path: already at target scale.
    if total == scale {
        for &s in alphabet {
            q[s as usize] = freq[s as usize];
        }
        return Ok(q);
    }

    // err[s] = sf - q[s] * total, in raw-frequency*scale units; positive
    // means q[s] still under-represents the symbol.
    let mut err = vec![0i64; freq.len()];

    for &s in alphabet {
        let f = freq[s as usize] as u64;
        let sf = f * scale;
        let qs = if sf <= total {
            1
        } else {
            round_to_nearest(sf, total)
        };
        q[s as usize] = qs as u32;
        err[s as usize] = sf as i64 - (qs as i64) * (total as i64);
    }

    let sum: i64 = alphabet.iter().map(|&s| q[s as usize] as i64).sum();
    let mut diff = scale as i64 - sum;
    if diff == 0 {
        return Ok(q);
    }

    // Fast path: the largest bucket can absorb the whole shortfall/excess
    // without being driven to zero.
    if let Some(&max_symbol) = alphabet
        .iter()
        .max_by_key(|&&s| (q[s as usize], freq[s as usize], s))
    {
        let new_value = q[max_symbol as usize] as i64 + diff;
        if new_value > 0 {
            q[max_symbol as usize] = new_value as u32;
            return Ok(q);
        }
    }

    // Slow path: priority queue ordered by (desc |directed error|, desc
    // frequency, desc symbol), repeatedly nudging the top entry by one step
    // toward the target and reinserting with its updated error.
    let direction: i64 = diff.signum();
    let mut heap: BinaryHeap<QueueEntry> = BinaryHeap::new();
    for &s in alphabet {
        let key = direction * err[s as usize];
        if key > 0 {
            heap.push(QueueEntry {
                key,
                freq: freq[s as usize],
                symbol: s,
            });
        }
    }

    while diff != 0 {
        let Some(top) = heap.pop() else {
            return Err(EntropyError::invalid_stream(
                "frequency normalization could not converge",
            ));
        };
        let s = top.symbol as usize;

        if direction < 0 && q[s] <= 1 {
            // Would zero out this symbol; drop it and try the next.
            continue;
        }

        q[s] = (q[s] as i64 + direction) as u32;
        diff -= direction;
        err[s] -= direction * total as i64;

        let new_key = direction * err[s];
        if new_key > 0 {
            heap.push(QueueEntry {
                key: new_key,
                freq: freq[s],
                symbol: s as u8,
            });
        }
    }

    Ok(q)
}

fn round_to_nearest(sf: u64, total: u64) -> u64 {
    let floor = sf / total;
    let rem = sf - floor * total;
    // Compare |rem| vs |rem - total| to choose the closer integer.
    if rem * 2 >= total {
        floor + 1
    } else {
        floor
    }
}

#[derive(Eq, PartialEq)]
struct QueueEntry {
    key: i64,
    freq: u32,
    symbol: u8,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.key, self.freq, self.symbol).cmp(&(other.key, other.freq, other.symbol))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normalized(freq: &[u32], alphabet: &[u8], log_scale: u8) -> Vec<u32> {
        let q = normalize_frequencies(freq, alphabet, log_scale).unwrap();
        let sum: u64 = alphabet.iter().map(|&s| q[s as usize] as u64).sum();
        assert_eq!(sum, 1u64 << log_scale);
        for &s in alphabet {
            assert!(q[s as usize] >= 1, "symbol {s} normalized to zero");
        }
        q
    }

    #[test]
    fn test_already_at_scale() {
        let mut freq = vec![0u32; 4];
        freq[0] = 64;
        freq[1] = 64;
        freq[2] = 64;
        freq[3] = 64;
        assert_normalized(&freq, &[0, 1, 2, 3], 8);
    }

    #[test]
    fn test_uniform_small_alphabet() {
        let mut freq = vec![0u32; 256];
        for s in 0..4u8 {
            freq[s as usize] = 1;
        }
        assert_normalized(&freq, &[0, 1, 2, 3], 8);
    }

    #[test]
    fn test_skewed_distribution() {
        let mut freq = vec![0u32; 256];
        freq[0] = 1000;
        freq[1] = 1;
        freq[2] = 1;
        freq[3] = 1;
        assert_normalized(&freq, &[0, 1, 2, 3], 8);
    }

    #[test]
    fn test_single_symbol() {
        let mut freq = vec![0u32; 256];
        freq[5] = 999;
        let q = assert_normalized(&freq, &[5], 10);
        assert_eq!(q[5], 1 << 10);
    }

    #[test]
    fn test_large_alphabet_256() {
        let mut freq = vec![1u32; 256];
        freq[100] = 5000;
        let alphabet: Vec<u8> = (0..=255u16).map(|v| v as u8).collect();
        assert_normalized(&freq, &alphabet, 12);
    }

    #[test]
    fn test_rejects_bad_log_scale() {
        let freq = vec![1u32; 4];
        assert!(normalize_frequencies(&freq, &[0, 1, 2, 3], 7).is_err());
        assert!(normalize_frequencies(&freq, &[0, 1, 2, 3], 17).is_err());
    }

    #[test]
    fn test_rejects_all_zero_frequency() {
        let freq = vec![0u32; 4];
        assert!(normalize_frequencies(&freq, &[0, 1, 2, 3], 8).is_err());
    }

    #[test]
    fn test_near_uniform_many_symbols_low_scale() {
        // lr=8 (scale=256) with 200 symbols stresses the slow path.
        let mut freq = vec![0u32; 256];
        for s in 0..200u16 {
            freq[s as usize] = 1;
        }
        let alphabet: Vec<u8> = (0..200u16).map(|v| v as u8).collect();
        assert_normalized(&freq, &alphabet, 8);
    }

    fn wire_roundtrip(freq: &[u32], alphabet: &[u8], log_scale: u8) -> (u8, Vec<u32>) {
        let q = normalize_frequencies(freq, alphabet, log_scale).unwrap();
        let mut output = Vec::new();
        {
            let mut writer = crate::bitstream::BitWriter::new(&mut output);
            write_frequency_table(&mut writer, alphabet, &q, log_scale).unwrap();
            writer.flush().unwrap();
        }
        let mut reader = crate::bitstream::BitReader::new(std::io::Cursor::new(output));
        read_frequency_table(&mut reader, alphabet, freq.len()).unwrap()
    }

    #[test]
    fn test_frequency_table_wire_roundtrip_small_alphabet() {
        let mut freq = vec![0u32; 256];
        freq[10] = 900;
        freq[20] = 1;
        freq[30] = 1;
        let alphabet = vec![10u8, 20, 30];
        let expected = normalize_frequencies(&freq, &alphabet, 10).unwrap();
        let (log_scale, q) = wire_roundtrip(&freq, &alphabet, 10);
        assert_eq!(log_scale, 10);
        assert_eq!(q, expected);
    }

    #[test]
    fn test_frequency_table_wire_roundtrip_large_alphabet() {
        let mut freq = vec![1u32; 256];
        freq[5] = 2000;
        let alphabet: Vec<u8> = (0..=255u16).map(|v| v as u8).collect();
        let expected = normalize_frequencies(&freq, &alphabet, 12).unwrap();
        let (log_scale, q) = wire_roundtrip(&freq, &alphabet, 12);
        assert_eq!(log_scale, 12);
        assert_eq!(q, expected);
    }

    #[test]
    fn test_frequency_table_single_symbol() {
        let mut freq = vec![0u32; 256];
        freq[7] = 42;
        let alphabet = vec![7u8];
        let (log_scale, q) = wire_roundtrip(&freq, &alphabet, 9);
        assert_eq!(log_scale, 9);
        assert_eq!(q[7], 1 << 9);
    }

    #[test]
    fn test_write_frequency_table_rejects_lr_above_wire_range() {
        let q = vec![1u32; 256];
        let mut output = Vec::new();
        let mut writer = crate::bitstream::BitWriter::new(&mut output);
        assert!(write_frequency_table(&mut writer, &[0, 1], &q, 16).is_err());
    }
}
