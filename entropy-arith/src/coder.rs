//! The raw 56-bit binary arithmetic coder (§4.5): encodes/decodes one bit
//! at a time against a predictor's probability estimate.

use entropy_core::error::{EntropyError, Result};
use entropy_predictors::Predictor;

const STATE_BITS: u32 = 56;
const TOP: u64 = (1u64 << STATE_BITS) - 1;
const RENORM_MASK: u64 = 0x00FF_FFFF_FF00_0000;

/// Encodes bits one at a time, driven by a predictor, into a byte buffer.
pub struct ArithEncoder<'p, P: Predictor> {
    predictor: &'p mut P,
    low: u64,
    high: u64,
    output: Vec<u8>,
}

impl<'p, P: Predictor> ArithEncoder<'p, P> {
    /// Start a new coded block with fresh `(low, high)` state. `predictor`
    /// is borrowed, not reset, so its learned state can span many blocks.
    pub fn new(predictor: &'p mut P) -> Self {
        Self {
            predictor,
            low: 0,
            high: TOP,
            output: Vec::new(),
        }
    }

    /// Encode one bit.
    pub fn encode_bit(&mut self, bit: bool) {
        let p = self.predictor.get() as u64;
        let split = ((self.high - self.low) >> 4) * p >> 8;

        if bit {
            self.high = self.low + split;
        } else {
            self.low = self.low + split + 1;
        }
        self.predictor.update(bit);

        while (self.low ^ self.high) & RENORM_MASK == 0 {
            let top32 = (self.high >> 24) as u32;
            self.output.extend_from_slice(&top32.to_be_bytes());
            self.low = (self.low << 32) & TOP;
            self.high = ((self.high << 32) | 0xFFFF_FFFF) & TOP;
        }
    }

    /// Encode a whole byte, MSB first.
    pub fn encode_byte(&mut self, byte: u8) {
        for i in (0..8).rev() {
            self.encode_bit((byte >> i) & 1 != 0);
        }
    }

    /// Flush the remaining state (7 bytes, the full 56-bit `low`) and
    /// return the coded bytes.
    pub fn finish(mut self) -> Vec<u8> {
        for shift in (0..STATE_BITS).step_by(8).rev() {
            self.output.push((self.low >> shift) as u8);
        }
        self.output
    }
}

/// Decodes bits one at a time, driven by a predictor, from a byte slice.
pub struct ArithDecoder<'p, 'd, P: Predictor> {
    predictor: &'p mut P,
    low: u64,
    high: u64,
    current: u64,
    input: &'d [u8],
    pos: usize,
}

impl<'p, 'd, P: Predictor> ArithDecoder<'p, 'd, P> {
    /// Start decoding `input`, priming the 56-bit `current` window from
    /// its first 7 bytes.
    pub fn new(predictor: &'p mut P, input: &'d [u8]) -> Result<Self> {
        let mut current = 0u64;
        let mut pos = 0;
        for _ in 0..(STATE_BITS / 8) {
            let byte = *input
                .get(pos)
                .ok_or_else(|| EntropyError::unexpected_eof(8))?;
            current = (current << 8) | byte as u64;
            pos += 1;
        }
        Ok(Self {
            predictor,
            low: 0,
            high: TOP,
            current,
            input,
            pos,
        })
    }

    fn next_byte(&mut self) -> u8 {
        let byte = self.input.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte
    }

    /// Decode one bit.
    pub fn decode_bit(&mut self) -> bool {
        let p = self.predictor.get() as u64;
        let split = ((self.high - self.low) >> 4) * p >> 8;
        let bit = self.current <= self.low + split;

        if bit {
            self.high = self.low + split;
        } else {
            self.low = self.low + split + 1;
        }
        self.predictor.update(bit);

        while (self.low ^ self.high) & RENORM_MASK == 0 {
            self.low = (self.low << 32) & TOP;
            self.high = ((self.high << 32) | 0xFFFF_FFFF) & TOP;
            let mut next4 = 0u64;
            for _ in 0..4 {
                next4 = (next4 << 8) | self.next_byte() as u64;
            }
            self.current = ((self.current << 32) | next4) & TOP;
        }

        bit
    }

    /// Decode one whole byte, MSB first.
    pub fn decode_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.decode_bit() as u8;
        }
        byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entropy_predictors::Fpaq;

    #[test]
    fn test_single_byte_roundtrip() {
        let mut enc_predictor = Fpaq::new();
        let mut encoder = ArithEncoder::new(&mut enc_predictor);
        encoder.encode_byte(0xA5);
        let coded = encoder.finish();

        let mut dec_predictor = Fpaq::new();
        let mut decoder = ArithDecoder::new(&mut dec_predictor, &coded).unwrap();
        assert_eq!(decoder.decode_byte(), 0xA5);
    }

    #[test]
    fn test_many_bytes_roundtrip() {
        let data: Vec<u8> = (0..=255u16).map(|v| v as u8).cycle().take(2000).collect();

        let mut enc_predictor = Fpaq::new();
        let mut encoder = ArithEncoder::new(&mut enc_predictor);
        for &byte in &data {
            encoder.encode_byte(byte);
        }
        let coded = encoder.finish();

        let mut dec_predictor = Fpaq::new();
        let mut decoder = ArithDecoder::new(&mut dec_predictor, &coded).unwrap();
        let decoded: Vec<u8> = (0..data.len()).map(|_| decoder.decode_byte()).collect();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_skewed_data_compresses() {
        let data = vec![0u8; 5000];
        let mut enc_predictor = Fpaq::new();
        let mut encoder = ArithEncoder::new(&mut enc_predictor);
        for &byte in &data {
            encoder.encode_byte(byte);
        }
        let coded = encoder.finish();
        assert!(coded.len() < data.len() / 4);
    }
}
