//! # Entropy Huffman
//!
//! Canonical Huffman codec (§4.8) built on Moffat-Katajainen in-place
//! length construction, a packed 32-bit `(length, code)` fast encode
//! path, and a single `2^14`-entry decode table.
//!
//! Table construction and code assignment follow the teacher's sorted
//! canonical shape (`HuffmanTable::from_weights`'s sort-then-assign loop
//! in `oxiarc-zstd`), generalized from zstd's power-of-two weight scheme
//! to arbitrary Moffat-Katajainen lengths; decoding reads MSB-first
//! through `entropy_core::bitstream` rather than the teacher's
//! backward/sentinel-bit reader, since this format has no FSE-style
//! trailing sentinel to anchor against.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codes;
pub mod length;
pub mod table;

use codes::{assign_codes, Code};
use entropy_core::bitstream::{BitReader, BitWriter};
use entropy_core::error::{EntropyError, Result};
use entropy_core::frequency::{normalize_frequencies, MAX_LOG_SCALE, MIN_LOG_SCALE};
use entropy_core::{decode_alphabet, encode_alphabet, exp_golomb};
use length::code_lengths;
use std::io::{Read, Write};
use table::{DecodeTable, DECODE_TABLE_BITS, MAX_SYMBOL_SIZE};

/// Code length assumed for the first transmitted symbol's Exp-Golomb
/// delta base.
const INITIAL_PREV_LENGTH: i32 = 2;
/// Number of renormalize-and-retry attempts beyond the first try.
const MAX_RETRIES: u8 = 3;

fn byte_histogram(data: &[u8]) -> Vec<u32> {
    let mut freq = vec![0u32; 256];
    for &b in data {
        freq[b as usize] += 1;
    }
    freq
}

/// Build code lengths for `alphabet`, renormalizing to a smaller scale and
/// retrying (up to [`MAX_RETRIES`] times) whenever Moffat-Katajainen
/// produces a length over [`MAX_SYMBOL_SIZE`].
fn build_lengths(alphabet: &[u8], raw_freq: &[u32]) -> Result<Vec<u32>> {
    for attempt in 0..=MAX_RETRIES {
        let log_scale = (MAX_LOG_SCALE as i32 - 2 * attempt as i32).max(MIN_LOG_SCALE as i32) as u8;
        let q = normalize_frequencies(raw_freq, alphabet, log_scale)?;
        let freq: Vec<u64> = alphabet.iter().map(|&s| q[s as usize] as u64).collect();
        let lengths = code_lengths(&freq);
        if lengths.iter().all(|&l| l <= MAX_SYMBOL_SIZE) {
            return Ok(lengths);
        }
    }
    Err(EntropyError::invalid_stream(
        "Huffman length construction exceeded the maximum code length after all retries",
    ))
}

fn write_lengths<W: Write>(writer: &mut BitWriter<W>, lengths: &[u32]) -> Result<()> {
    let mut prev = INITIAL_PREV_LENGTH;
    for &length in lengths {
        exp_golomb::encode(writer, length as i32 - prev, true)?;
        prev = length as i32;
    }
    Ok(())
}

fn read_lengths<R: Read>(reader: &mut BitReader<R>, count: usize) -> Result<Vec<u32>> {
    let mut prev = INITIAL_PREV_LENGTH;
    let mut lengths = Vec::with_capacity(count);
    for _ in 0..count {
        let delta = exp_golomb::decode(reader, true)?;
        let length = prev + delta;
        if length <= 0 || length as u32 > MAX_SYMBOL_SIZE {
            return Err(EntropyError::invalid_stream(
                "decoded Huffman code length out of range",
            ));
        }
        lengths.push(length as u32);
        prev = length;
    }
    Ok(lengths)
}

/// Encode `data` as one canonical-Huffman chunk.
pub fn encode<W: Write>(writer: &mut BitWriter<W>, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let raw_freq = byte_histogram(data);
    let alphabet: Vec<u8> = (0u16..256)
        .filter(|&s| raw_freq[s as usize] > 0)
        .map(|s| s as u8)
        .collect();

    let lengths = build_lengths(&alphabet, &raw_freq)?;
    encode_alphabet(writer, &alphabet, 256)?;
    write_lengths(writer, &lengths)?;

    let codes = assign_codes(&alphabet, &lengths);
    let mut by_symbol = vec![table::pack(Code { code: 0, length: 0 }); 256];
    for (i, &s) in alphabet.iter().enumerate() {
        by_symbol[s as usize] = table::pack(codes[i]);
    }

    for chunk in data.chunks(4) {
        let mut acc: u64 = 0;
        let mut total_bits: u8 = 0;
        for &byte in chunk {
            let c = table::unpack(by_symbol[byte as usize]);
            acc = (acc << c.length) | c.code as u64;
            total_bits += c.length as u8;
        }
        writer.write_bits(acc, total_bits)?;
    }

    Ok(())
}

struct Window<'r, R: Read> {
    reader: &'r mut BitReader<R>,
    bits: u64,
    n: u32,
}

impl<'r, R: Read> Window<'r, R> {
    fn new(reader: &'r mut BitReader<R>) -> Self {
        Self { reader, bits: 0, n: 0 }
    }

    fn refill(&mut self, want: u32) {
        while self.n < want {
            match self.reader.read_bit() {
                Ok(bit) => {
                    self.bits = (self.bits << 1) | bit as u64;
                    self.n += 1;
                }
                Err(_) => break,
            }
        }
    }

    fn top(&self, k: u32) -> u16 {
        if self.n >= k {
            ((self.bits >> (self.n - k)) & ((1u64 << k) - 1)) as u16
        } else {
            ((self.bits << (k - self.n)) & ((1u64 << k) - 1)) as u16
        }
    }

    fn consume(&mut self, k: u32) {
        let k = k.min(self.n);
        self.n -= k;
        self.bits &= (1u64 << self.n) - 1;
    }
}

/// Decode `len` bytes previously written by [`encode`].
pub fn decode<R: Read>(reader: &mut BitReader<R>, len: usize) -> Result<Vec<u8>> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let alphabet = decode_alphabet(reader, 256)?;
    if alphabet.is_empty() {
        return Err(EntropyError::invalid_stream(
            "Huffman chunk has an empty alphabet",
        ));
    }
    let lengths = read_lengths(reader, alphabet.len())?;
    let codes = assign_codes(&alphabet, &lengths);
    let table = DecodeTable::build(&alphabet, &codes);
    let max_length = table.max_length();

    let mut window = Window::new(reader);
    let mut output = Vec::with_capacity(len);
    for _ in 0..len {
        window.refill(max_length);
        let entry = table.lookup(window.top(DECODE_TABLE_BITS));
        if entry.length == 0 {
            return Err(EntropyError::invalid_stream(
                "Huffman decode table miss: corrupt stream or empty code",
            ));
        }
        output.push(entry.symbol);
        window.consume(entry.length as u32);
    }

    Ok(output)
}
