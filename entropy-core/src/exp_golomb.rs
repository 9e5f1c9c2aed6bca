//! Exp-Golomb codec for small signed/unsigned integers.
//!
//! Used to transmit Huffman code-length deltas (§4.8's header transport):
//! `encode`/`decode` take a `signed` flag and both call sites must agree on
//! it, since the bitstream does not self-describe signedness.
//!
//! Encoding of a value `v`: let `m = |v|` and `u = m + 1`, `log = floor(log2
//! u)`. Emit `log` zero bits, then `u` in `log + 1` bits, then — only when
//! `m != 0` and the call is in signed mode — a sign bit (`1` = negative).
//! `v == 0` therefore always encodes as the single bit `1`, matching the
//! spec's explicit zero shortcut.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{EntropyError, Result};
use std::io::{Read, Write};

/// Encode `v` in signed or unsigned Exp-Golomb form.
///
/// In unsigned mode `v` must be non-negative.
pub fn encode<W: Write>(writer: &mut BitWriter<W>, v: i32, signed: bool) -> Result<()> {
    if !signed && v < 0 {
        return Err(EntropyError::invalid_parameter(
            "negative value in unsigned Exp-Golomb mode",
        ));
    }

    let magnitude = v.unsigned_abs();
    let u = magnitude as u64 + 1;
    let log = 63 - u.leading_zeros(); // floor(log2(u))

    for _ in 0..log {
        writer.write_bit(false)?;
    }
    writer.write_bits(u, (log + 1) as u8)?;

    if signed && magnitude != 0 {
        writer.write_bit(v < 0)?;
    }

    Ok(())
}

/// Decode a value previously written by [`encode`] with the same `signed`
/// flag.
pub fn decode<R: Read>(reader: &mut BitReader<R>, signed: bool) -> Result<i32> {
    let mut log = 0u32;
    loop {
        if reader.read_bit()? {
            break;
        }
        log += 1;
        if log >= 32 {
            return Err(EntropyError::invalid_stream(
                "Exp-Golomb prefix exceeds 32 leading zero bits",
            ));
        }
    }

    let u: u64 = if log == 0 {
        1
    } else {
        (1u64 << log) | reader.read_bits(log as u8)?
    };
    let magnitude = (u - 1) as i64;
    if magnitude > i32::MAX as i64 {
        return Err(EntropyError::invalid_stream(
            "Exp-Golomb magnitude overflows i32",
        ));
    }

    if signed && magnitude != 0 {
        let negative = reader.read_bit()?;
        Ok(if negative {
            -(magnitude as i32)
        } else {
            magnitude as i32
        })
    } else {
        Ok(magnitude as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(v: i32, signed: bool) -> i32 {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            encode(&mut writer, v, signed).unwrap();
            writer.flush().unwrap();
        }
        let mut reader = BitReader::new(Cursor::new(output));
        decode(&mut reader, signed).unwrap()
    }

    #[test]
    fn test_zero_is_one_bit() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            encode(&mut writer, 0, true).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(output[0] & 0x80, 0x80); // first bit is 1
        assert_eq!(roundtrip(0, true), 0);
    }

    #[test]
    fn test_signed_roundtrip() {
        for v in -300..=300 {
            assert_eq!(roundtrip(v, true), v);
        }
    }

    #[test]
    fn test_unsigned_roundtrip() {
        for v in 0..600 {
            assert_eq!(roundtrip(v, false), v);
        }
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        assert!(encode(&mut writer, -1, false).is_err());
    }

    #[test]
    fn test_multiple_values_in_sequence() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            for v in [2, -5, 0, 127, -128, 1] {
                encode(&mut writer, v, true).unwrap();
            }
            writer.flush().unwrap();
        }

        let mut reader = BitReader::new(Cursor::new(output));
        for expected in [2, -5, 0, 127, -128, 1] {
            assert_eq!(decode(&mut reader, true).unwrap(), expected);
        }
    }
}
