//! Alphabet transport (§4.2.1 of the format this workspace implements).
//!
//! An alphabet is the sorted set of symbol values actually observed in a
//! chunk, drawn from a `alphabet_size`-symbol universe (`alphabet_size` is a
//! power of two, at most 256). Three self-describing encodings exist; the
//! encoder picks whichever produces the fewest bits for the given alphabet:
//!
//! - **Full** — every universe symbol is present.
//! - **Bit-mask** — universe is 256 and `32 <= count <= 224`: four 64-bit
//!   masks cover symbols 0..255.
//! - **Delta** — the present symbols, or their complement (whichever is
//!   shorter), transmitted as `current - previous - 1` deltas in
//!   fixed-size chunks, each chunk prefixed by the bit width its deltas
//!   need.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{EntropyError, Result};
use std::io::{Read, Write};

const BITMASK_MIN_COUNT: usize = 32;
const BITMASK_MAX_COUNT: usize = 224;
const DELTA_CHUNKS: usize = 4;

/// Number of bits needed to represent `v` (0 maps to 0, matching
/// `ceil(log2(v + 1))` for v > 0).
fn bit_width(v: u32) -> u32 {
    32 - v.leading_zeros().min(32)
}

/// Encode `alphabet` (sorted ascending, all values `< alphabet_size`) using
/// whichever of the three transport encodings is shortest.
pub fn encode_alphabet<W: Write>(
    writer: &mut BitWriter<W>,
    alphabet: &[u8],
    alphabet_size: usize,
) -> Result<()> {
    validate(alphabet, alphabet_size)?;

    if alphabet.len() == alphabet_size {
        return encode_full(writer, alphabet_size);
    }

    let bitmask_cost = bitmask_cost(alphabet_size, alphabet.len());
    let (delta_absent, delta_cost_present) = delta_candidate(alphabet, alphabet_size, false);
    let (delta_present_is_cheaper, delta_cost) = {
        let (_, cost_absent) = delta_candidate(alphabet, alphabet_size, true);
        if cost_absent < delta_cost_present {
            (false, cost_absent)
        } else {
            (true, delta_cost_present)
        }
    };
    let _ = delta_absent;

    match bitmask_cost {
        Some(cost) if cost <= delta_cost => encode_bitmask(writer, alphabet),
        _ => encode_delta(writer, alphabet, alphabet_size, !delta_present_is_cheaper),
    }
}

/// Decode an alphabet written by [`encode_alphabet`].
pub fn decode_alphabet<R: Read>(reader: &mut BitReader<R>, alphabet_size: usize) -> Result<Vec<u8>> {
    if reader.read_bit()? {
        // PARTIAL
        if reader.read_bit()? {
            // BIT_ENCODED_256
            if alphabet_size != 256 {
                return Err(EntropyError::invalid_stream(
                    "bit-mask alphabet encoding requires a 256-symbol universe",
                ));
            }
            decode_bitmask(reader)
        } else {
            decode_delta(reader, alphabet_size)
        }
    } else {
        decode_full(reader, alphabet_size)
    }
}

fn validate(alphabet: &[u8], alphabet_size: usize) -> Result<()> {
    if !alphabet_size.is_power_of_two() || alphabet_size > 256 {
        return Err(EntropyError::invalid_parameter(
            "alphabet_size must be a power of two no greater than 256",
        ));
    }
    for w in alphabet.windows(2) {
        if w[0] >= w[1] {
            return Err(EntropyError::invalid_parameter(
                "alphabet must be sorted strictly ascending",
            ));
        }
    }
    if let Some(&max) = alphabet.last() {
        if max as usize >= alphabet_size {
            return Err(EntropyError::invalid_parameter(
                "alphabet symbol exceeds universe size",
            ));
        }
    }
    Ok(())
}

// ---- Full ----

fn encode_full<W: Write>(writer: &mut BitWriter<W>, alphabet_size: usize) -> Result<()> {
    writer.write_bit(false)?; // FULL
    if alphabet_size == 256 {
        writer.write_bit(false)?; // ALPHABET_256
    } else {
        writer.write_bit(true)?;
        let width = bit_width(alphabet_size as u32).max(1);
        writer.write_bits((width - 1) as u64, 5)?;
        writer.write_bits(alphabet_size as u64, width as u8)?;
    }
    Ok(())
}

fn decode_full<R: Read>(reader: &mut BitReader<R>, alphabet_size: usize) -> Result<Vec<u8>> {
    let count = if !reader.read_bit()? {
        256
    } else {
        let width = reader.read_bits(5)? as u32 + 1;
        reader.read_bits(width as u8)? as usize
    };
    if count != alphabet_size || count > 256 {
        return Err(EntropyError::invalid_stream(
            "full alphabet count does not match universe size",
        ));
    }
    Ok((0..count as u16).map(|s| s as u8).collect())
}

// ---- Bit-mask ----

fn bitmask_cost(alphabet_size: usize, count: usize) -> Option<usize> {
    if alphabet_size == 256 && (BITMASK_MIN_COUNT..=BITMASK_MAX_COUNT).contains(&count) {
        Some(2 + 256)
    } else {
        None
    }
}

fn encode_bitmask<W: Write>(writer: &mut BitWriter<W>, alphabet: &[u8]) -> Result<()> {
    writer.write_bit(true)?; // PARTIAL
    writer.write_bit(true)?; // BIT_ENCODED_256
    let mut masks = [0u64; 4];
    for &s in alphabet {
        let idx = s as usize / 64;
        let bit = s as usize % 64;
        masks[idx] |= 1u64 << bit;
    }
    for mask in masks {
        writer.write_bits(mask, 64)?;
    }
    Ok(())
}

fn decode_bitmask<R: Read>(reader: &mut BitReader<R>) -> Result<Vec<u8>> {
    let mut symbols = Vec::new();
    for chunk in 0..4u32 {
        let mask = reader.read_bits(64)?;
        for bit in 0..64u32 {
            if mask & (1u64 << bit) != 0 {
                symbols.push((chunk * 64 + bit) as u8);
            }
        }
    }
    Ok(symbols)
}

// ---- Delta ----

/// Returns the total bit cost of encoding `alphabet` (or its complement)
/// through the delta scheme, not counting the two PARTIAL/DELTA marker bits.
fn delta_candidate(alphabet: &[u8], alphabet_size: usize, use_absent: bool) -> (Vec<u8>, usize) {
    let list = if use_absent {
        complement(alphabet, alphabet_size)
    } else {
        alphabet.to_vec()
    };
    let cost = 1 + 4 + bit_width(list.len() as u32).max(1) as usize + deltas_cost(&list);
    (list, cost)
}

fn complement(alphabet: &[u8], alphabet_size: usize) -> Vec<u8> {
    let mut present = vec![false; alphabet_size];
    for &s in alphabet {
        present[s as usize] = true;
    }
    (0..alphabet_size as u16)
        .filter(|&s| !present[s as usize])
        .map(|s| s as u8)
        .collect()
}

fn deltas(list: &[u8]) -> Vec<u32> {
    let mut prev: i32 = -1;
    list.iter()
        .map(|&s| {
            let d = (s as i32) - prev - 1;
            prev = s as i32;
            d as u32
        })
        .collect()
}

fn deltas_cost(list: &[u8]) -> usize {
    if list.is_empty() {
        return 0;
    }
    let d = deltas(list);
    let chunk_size = list.len().div_ceil(DELTA_CHUNKS);
    let mut cost = 0;
    for chunk in d.chunks(chunk_size) {
        let max_delta = chunk.iter().copied().max().unwrap_or(0);
        let width = bit_width(max_delta).max(1);
        cost += 4 + width as usize * chunk.len();
    }
    cost
}

fn encode_delta<W: Write>(
    writer: &mut BitWriter<W>,
    alphabet: &[u8],
    alphabet_size: usize,
    use_absent: bool,
) -> Result<()> {
    writer.write_bit(true)?; // PARTIAL
    writer.write_bit(false)?; // DELTA
    writer.write_bit(use_absent)?;

    let list = if use_absent {
        complement(alphabet, alphabet_size)
    } else {
        alphabet.to_vec()
    };

    let size_width = bit_width(list.len() as u32).max(1);
    writer.write_bits((size_width - 1) as u64, 4)?;
    writer.write_bits(list.len() as u64, size_width as u8)?;

    if list.is_empty() {
        return Ok(());
    }

    let d = deltas(&list);
    let chunk_size = list.len().div_ceil(DELTA_CHUNKS);
    for chunk in d.chunks(chunk_size) {
        let max_delta = chunk.iter().copied().max().unwrap_or(0);
        let width = bit_width(max_delta).max(1);
        writer.write_bits((width - 1) as u64, 4)?;
        for &delta in chunk {
            writer.write_bits(delta as u64, width as u8)?;
        }
    }
    Ok(())
}

fn decode_delta<R: Read>(reader: &mut BitReader<R>, alphabet_size: usize) -> Result<Vec<u8>> {
    let use_absent = reader.read_bit()?;

    let size_width = reader.read_bits(4)? as u32 + 1;
    let count = reader.read_bits(size_width as u8)? as usize;
    if count > alphabet_size {
        return Err(EntropyError::invalid_stream(
            "delta-encoded alphabet count exceeds universe size",
        ));
    }

    let mut list = Vec::with_capacity(count);
    if count > 0 {
        let chunk_size = count.div_ceil(DELTA_CHUNKS);
        let mut prev: i32 = -1;
        let mut remaining = count;
        while remaining > 0 {
            let this_chunk = remaining.min(chunk_size);
            let width = reader.read_bits(4)? as u32 + 1;
            for _ in 0..this_chunk {
                let delta = reader.read_bits(width as u8)? as i32;
                let sym = prev + delta + 1;
                if !(0..alphabet_size as i32).contains(&sym) {
                    return Err(EntropyError::invalid_stream(
                        "delta-encoded alphabet symbol out of range",
                    ));
                }
                list.push(sym as u8);
                prev = sym;
            }
            remaining -= this_chunk;
        }
    }

    if use_absent {
        Ok(complement(&list, alphabet_size))
    } else {
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(alphabet: &[u8], alphabet_size: usize) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            encode_alphabet(&mut writer, alphabet, alphabet_size).unwrap();
            writer.flush().unwrap();
        }
        let mut reader = BitReader::new(Cursor::new(output));
        decode_alphabet(&mut reader, alphabet_size).unwrap()
    }

    #[test]
    fn test_full_alphabet_256() {
        let full: Vec<u8> = (0..=255).collect();
        assert_eq!(roundtrip(&full, 256), full);
    }

    #[test]
    fn test_full_alphabet_small_universe() {
        let full: Vec<u8> = (0..16).collect();
        assert_eq!(roundtrip(&full, 16), full);
    }

    #[test]
    fn test_bitmask_range() {
        let alphabet: Vec<u8> = (0..100u16).map(|v| v as u8).collect();
        assert_eq!(roundtrip(&alphabet, 256), alphabet);
    }

    #[test]
    fn test_delta_sparse() {
        let alphabet = vec![3u8, 7, 8, 200, 255];
        assert_eq!(roundtrip(&alphabet, 256), alphabet);
    }

    #[test]
    fn test_delta_near_full() {
        // 250 of 256 symbols present -> complement encoding should win.
        let mut alphabet: Vec<u8> = (0..=255).collect();
        alphabet.retain(|&s| ![10u8, 20, 30, 40, 50, 60].contains(&s));
        assert_eq!(roundtrip(&alphabet, 256), alphabet);
    }

    #[test]
    fn test_single_symbol() {
        let alphabet = vec![42u8];
        assert_eq!(roundtrip(&alphabet, 256), alphabet);
    }

    #[test]
    fn test_two_symbols() {
        let alphabet = vec![0u8, 255];
        assert_eq!(roundtrip(&alphabet, 256), alphabet);
    }

    #[test]
    fn test_empty_alphabet_rejected_by_validation() {
        // Empty alphabet with alphabet_size 0 is invalid (not power of two).
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        assert!(encode_alphabet(&mut writer, &[], 0).is_err());
    }

    #[test]
    fn test_unsorted_alphabet_rejected() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        assert!(encode_alphabet(&mut writer, &[5, 3], 256).is_err());
    }
}
