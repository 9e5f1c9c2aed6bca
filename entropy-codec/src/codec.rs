//! The [`Codec`] trait every leaf coder implements, and the concrete
//! wrappers that adapt each crate's free functions to it.

use entropy_core::bitstream::{BitReader, BitWriter};
use entropy_core::error::Result;
use entropy_predictors::{Cm, Fpaq, Tpaq, TpaqSize};
use std::io::Cursor;

use crate::tag::CodecTag;

/// A byte-block codec identified by one [`CodecTag`].
///
/// Fixed to `Vec<u8>`/`Cursor<Vec<u8>>` rather than generic `Read`/`Write`
/// so `Box<dyn Codec>` is object-safe; every leaf codec already builds its
/// own `BitReader`/`BitWriter` internally; this just settles on one
/// concrete backing buffer for all of them to share behind the trait.
pub trait Codec {
    /// Encode `data`, appending coded bits to `writer`.
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()>;

    /// Decode `len` bytes previously written by [`write`](Codec::write).
    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>>;

    /// The tag identifying which codec this is.
    fn bitstream(&self) -> CodecTag;

    /// Discard any learned predictor state, returning the codec to its
    /// just-constructed condition so it can be reused for an unrelated
    /// block.
    fn dispose(&mut self);
}

/// Pass-through codec: `write`/`read` copy bytes verbatim. Matches tag 0.
#[derive(Debug, Default)]
pub struct NullCodec;

impl Codec for NullCodec {
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()> {
        writer.align_to_byte()?;
        writer.write_array(data, data.len() * 8)
    }

    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>> {
        reader.align_to_byte();
        let mut buf = vec![0u8; len];
        reader.read_array(&mut buf, len * 8)?;
        Ok(buf)
    }

    fn bitstream(&self) -> CodecTag {
        CodecTag::None
    }

    fn dispose(&mut self) {}
}

/// Canonical Huffman codec. Matches tag 1.
#[derive(Debug, Default)]
pub struct HuffmanCodec;

impl Codec for HuffmanCodec {
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()> {
        entropy_huffman::encode(writer, data)
    }

    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>> {
        entropy_huffman::decode(reader, len)
    }

    fn bitstream(&self) -> CodecTag {
        CodecTag::Huffman
    }

    fn dispose(&mut self) {}
}

/// Range coder. Matches tag 4.
#[derive(Debug, Clone, Copy)]
pub struct RangeCodec {
    log_scale: u8,
}

impl RangeCodec {
    /// Create a range codec that normalizes frequency tables to
    /// `2^log_scale`.
    pub fn new(log_scale: u8) -> Self {
        Self { log_scale }
    }
}

impl Codec for RangeCodec {
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()> {
        entropy_range::encode(writer, data, self.log_scale)
    }

    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>> {
        entropy_range::decode(reader, len)
    }

    fn bitstream(&self) -> CodecTag {
        CodecTag::Range
    }

    fn dispose(&mut self) {}
}

/// Table-based ANS codec, order-0 or order-1. Matches tags 5 and 8.
#[derive(Debug, Clone, Copy)]
pub struct AnsCodec {
    log_scale: u8,
    order: entropy_ans::AnsOrder,
}

impl AnsCodec {
    /// Create an order-0 ANS codec.
    pub fn order0(log_scale: u8) -> Self {
        Self {
            log_scale,
            order: entropy_ans::AnsOrder::Zero,
        }
    }

    /// Create an order-1 ANS codec.
    pub fn order1(log_scale: u8) -> Self {
        Self {
            log_scale,
            order: entropy_ans::AnsOrder::One,
        }
    }
}

impl Codec for AnsCodec {
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()> {
        entropy_ans::encode(writer, data, self.log_scale, self.order)
    }

    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>> {
        entropy_ans::decode(reader, len, self.order)
    }

    fn bitstream(&self) -> CodecTag {
        match self.order {
            entropy_ans::AnsOrder::Zero => CodecTag::Ans0,
            entropy_ans::AnsOrder::One => CodecTag::Ans1,
        }
    }

    fn dispose(&mut self) {}
}

/// Binary arithmetic coding driven by the FPAQ predictor. Matches tag 2.
#[derive(Debug)]
pub struct FpaqCodec {
    inner: entropy_arith::BlockCodec<Fpaq>,
}

impl Default for FpaqCodec {
    fn default() -> Self {
        Self {
            inner: entropy_arith::BlockCodec::new(Fpaq::new()),
        }
    }
}

impl Codec for FpaqCodec {
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()> {
        self.inner.write(writer, data)
    }

    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>> {
        self.inner.read(reader, len)
    }

    fn bitstream(&self) -> CodecTag {
        CodecTag::Fpaq
    }

    fn dispose(&mut self) {
        self.inner.reset(Fpaq::new());
    }
}

/// Binary arithmetic coding driven by the Context Model predictor. Matches
/// tag 6.
#[derive(Debug)]
pub struct CmCodec {
    inner: entropy_arith::BlockCodec<Cm>,
}

impl Default for CmCodec {
    fn default() -> Self {
        Self {
            inner: entropy_arith::BlockCodec::new(Cm::new()),
        }
    }
}

impl Codec for CmCodec {
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()> {
        self.inner.write(writer, data)
    }

    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>> {
        self.inner.read(reader, len)
    }

    fn bitstream(&self) -> CodecTag {
        CodecTag::Cm
    }

    fn dispose(&mut self) {
        self.inner.reset(Cm::new());
    }
}

/// Binary arithmetic coding driven by the TPAQ predictor, optionally with
/// APM refinement (`extra`, tag 9). Matches tags 7 and 9.
#[derive(Debug)]
pub struct TpaqCodec {
    inner: entropy_arith::BlockCodec<Tpaq>,
    size: TpaqSize,
    extra: bool,
}

impl TpaqCodec {
    /// Create a TPAQ codec of the given size tier.
    pub fn new(size: TpaqSize, extra: bool) -> Self {
        Self {
            inner: entropy_arith::BlockCodec::new(Tpaq::new(size, extra)),
            size,
            extra,
        }
    }
}

impl Codec for TpaqCodec {
    fn write(&mut self, writer: &mut BitWriter<Vec<u8>>, data: &[u8]) -> Result<()> {
        self.inner.write(writer, data)
    }

    fn read(&mut self, reader: &mut BitReader<Cursor<Vec<u8>>>, len: usize) -> Result<Vec<u8>> {
        self.inner.read(reader, len)
    }

    fn bitstream(&self) -> CodecTag {
        if self.extra {
            CodecTag::TpaqX
        } else {
            CodecTag::Tpaq
        }
    }

    fn dispose(&mut self) {
        self.inner.reset(Tpaq::new(self.size, self.extra));
    }
}
