//! # Entropy ANS
//!
//! Table-based rANS (§4.7), orders 0 and 1. Grounded on the teacher's
//! `fse.rs` tANS codec: this module keeps its three-way split (table
//! construction, a bit reader/writer pair, and a decoder that drives the
//! table), but builds `encSymbol` reciprocal-division entries instead of a
//! zstd-style spread table, since rANS normalizes arithmetically rather
//! than by interleaving symbols across states.
//!
//! Order-1's context for position `i` is `data[i - 1]` (`0` for `i == 0`):
//! the byte immediately preceding it in the original sequence. The encoder
//! has the whole buffer available up front, so it looks this up directly
//! regardless of its right-to-left symbol walk; the decoder, walking
//! left-to-right, always has it already produced.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod table;

use entropy_core::bitstream::{BitReader, BitWriter};
use entropy_core::error::{EntropyError, Result};
use entropy_core::frequency::{read_frequency_table, write_frequency_table};
use entropy_core::{
    decode_alphabet, encode_alphabet, normalize_frequencies, read_var_int, write_var_int,
};
use std::io::{Read, Write};
use table::{AnsTable, TOP};

const CONTEXTS: usize = 256;

/// Selects order-0 (single table) or order-1 (256 previous-byte-keyed
/// tables) rANS coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsOrder {
    /// One shared frequency table for the whole block.
    Zero,
    /// 256 frequency tables, selected by the previous output byte.
    One,
}

fn byte_histogram(data: &[u8]) -> Vec<u32> {
    let mut freq = vec![0u32; 256];
    for &b in data {
        freq[b as usize] += 1;
    }
    freq
}

fn alphabet_of(freq: &[u32]) -> Vec<u8> {
    (0u16..256)
        .filter(|&s| freq[s as usize] > 0)
        .map(|s| s as u8)
        .collect()
}

fn context_of(data: &[u8], i: usize) -> u8 {
    if i == 0 {
        0
    } else {
        data[i - 1]
    }
}

fn build_order1_histograms(data: &[u8]) -> Vec<Vec<u32>> {
    let mut hist = vec![vec![0u32; 256]; CONTEXTS];
    for i in 0..data.len() {
        let ctx = context_of(data, i) as usize;
        hist[ctx][data[i] as usize] += 1;
    }
    hist
}

fn write_table<W: Write>(
    writer: &mut BitWriter<W>,
    freq: &[u32],
    log_scale: u8,
) -> Result<AnsTable> {
    let alphabet = alphabet_of(freq);
    let q = normalize_frequencies(freq, &alphabet, log_scale)?;
    encode_alphabet(writer, &alphabet, 256)?;
    write_frequency_table(writer, &alphabet, &q, log_scale)?;
    AnsTable::build(&alphabet, &q, log_scale)
}

fn read_table<R: Read>(reader: &mut BitReader<R>) -> Result<AnsTable> {
    let alphabet = decode_alphabet(reader, 256)?;
    if alphabet.is_empty() {
        return Err(EntropyError::invalid_stream(
            "rANS table has an empty alphabet",
        ));
    }
    let (log_scale, q) = read_frequency_table(reader, &alphabet, 256)?;
    AnsTable::build(&alphabet, &q, log_scale)
}

/// Encode `data` with the rANS family coder, writing a self-describing
/// header (one table for order 0, up to 256 for order 1) followed by the
/// state and renormalization scratch bytes.
pub fn encode<W: Write>(
    writer: &mut BitWriter<W>,
    data: &[u8],
    log_scale: u8,
    order: AnsOrder,
) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let tables: Vec<Option<AnsTable>> = match order {
        AnsOrder::Zero => {
            let freq = byte_histogram(data);
            vec![Some(write_table(writer, &freq, log_scale)?)]
        }
        AnsOrder::One => {
            let hist = build_order1_histograms(data);
            let mut used = vec![false; CONTEXTS];
            for (ctx, row) in hist.iter().enumerate() {
                used[ctx] = row.iter().any(|&f| f > 0);
            }
            for &u in &used {
                writer.write_bit(u)?;
            }
            let mut tables = Vec::with_capacity(CONTEXTS);
            for (ctx, row) in hist.iter().enumerate() {
                if used[ctx] {
                    tables.push(Some(write_table(writer, row, log_scale)?));
                } else {
                    tables.push(None);
                }
            }
            tables
        }
    };

    let table_for = |ctx: u8| -> Result<&AnsTable> {
        let idx = match order {
            AnsOrder::Zero => 0,
            AnsOrder::One => ctx as usize,
        };
        tables[idx].as_ref().ok_or_else(|| {
            EntropyError::invalid_stream("rANS context table missing for a used context")
        })
    };

    let mut scratch: Vec<u8> = Vec::new();
    let mut state: u32 = TOP;
    for i in (0..data.len()).rev() {
        let ctx = context_of(data, i);
        let table = table_for(ctx)?;
        let sym = table
            .encode_symbol(data[i])
            .ok_or_else(|| EntropyError::invalid_stream("symbol missing from its rANS table"))?;
        state = sym.put(state, |byte| scratch.push(byte));
    }
    scratch.reverse();

    write_var_int(scratch.len() as u32, |b| writer.write_bits(b as u64, 8))?;
    writer.write_bits(state as u64, 32)?;
    writer.write_array(&scratch, scratch.len() * 8)?;
    Ok(())
}

/// Decode `len` bytes previously written by [`encode`].
pub fn decode<R: Read>(
    reader: &mut BitReader<R>,
    len: usize,
    order: AnsOrder,
) -> Result<Vec<u8>> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let tables: Vec<Option<AnsTable>> = match order {
        AnsOrder::Zero => vec![Some(read_table(reader)?)],
        AnsOrder::One => {
            let mut used = vec![false; CONTEXTS];
            for slot in used.iter_mut() {
                *slot = reader.read_bit()?;
            }
            let mut tables = Vec::with_capacity(CONTEXTS);
            for &u in &used {
                if u {
                    tables.push(Some(read_table(reader)?));
                } else {
                    tables.push(None);
                }
            }
            tables
        }
    };

    let table_for = |ctx: u8| -> Result<&AnsTable> {
        let idx = match order {
            AnsOrder::Zero => 0,
            AnsOrder::One => ctx as usize,
        };
        tables[idx].as_ref().ok_or_else(|| {
            EntropyError::invalid_stream("rANS decode hit a context with no table")
        })
    };

    let scratch_len = read_var_int(|| reader.read_bits(8).map(|v| v as u8))? as usize;
    let mut state = reader.read_bits(32)? as u32;
    let mut scratch = vec![0u8; scratch_len];
    reader.read_array(&mut scratch, scratch_len * 8)?;
    let mut cursor = 0usize;

    let mut output: Vec<u8> = Vec::with_capacity(len);
    for i in 0..len {
        let ctx = if i == 0 { 0 } else { output[i - 1] };
        let table = table_for(ctx)?;
        let scale = 1u32 << table.log_scale();
        let c = state & (scale - 1);
        let symbol = table.symbol_at(c);
        output.push(symbol);

        let start = table.cum_freq(symbol);
        let freq = table.freq_of(symbol);
        state = freq * (state >> table.log_scale()) + c - start;

        while state < TOP {
            if cursor + 2 > scratch.len() {
                return Err(EntropyError::unexpected_eof(16));
            }
            state = (state << 8) | scratch[cursor] as u32;
            state = (state << 8) | scratch[cursor + 1] as u32;
            cursor += 2;
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(data: &[u8], log_scale: u8, order: AnsOrder) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            encode(&mut writer, data, log_scale, order).unwrap();
            writer.flush().unwrap();
        }
        let mut reader = BitReader::new(Cursor::new(output));
        decode(&mut reader, data.len(), order).unwrap()
    }

    #[test]
    fn test_order0_roundtrip_text() {
        let data = b"the quick brown fox jumps over the lazy dog".to_vec();
        assert_eq!(roundtrip(&data, 12, AnsOrder::Zero), data);
    }

    #[test]
    fn test_order0_roundtrip_single_symbol() {
        let data = vec![42u8; 300];
        assert_eq!(roundtrip(&data, 10, AnsOrder::Zero), data);
    }

    #[test]
    fn test_order1_roundtrip_text() {
        let data = b"abababababababababcabababababab".to_vec();
        assert_eq!(roundtrip(&data, 12, AnsOrder::One), data);
    }

    #[test]
    fn test_order1_roundtrip_single_byte() {
        let data = vec![9u8];
        assert_eq!(roundtrip(&data, 8, AnsOrder::One), data);
    }

    #[test]
    fn test_empty_input() {
        let data: Vec<u8> = Vec::new();
        assert_eq!(roundtrip(&data, 12, AnsOrder::Zero), data);
    }
}
