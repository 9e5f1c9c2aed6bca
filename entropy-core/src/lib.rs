//! # Entropy Core
//!
//! Shared primitives for the entropy-coding workspace.
//!
//! - [`bitstream`]: MSB-first bit-level I/O shared by every coder
//! - [`alphabet`]: self-describing alphabet transport (full/bit-mask/delta)
//! - [`frequency`]: frequency-table normalization to a power-of-two scale
//! - [`varint`]: 7-bit base-128 VarInt
//! - [`exp_golomb`]: signed/unsigned Exp-Golomb codec for small integers
//! - [`entropy_estimator`]: order-0 entropy score used to gate incompressible
//!   blocks
//! - [`error`]: shared error type
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ entropy_codec: CodecTag dispatch, Null codec             │
//! ├─────────────────────────────────────────────────────────┤
//! │ entropy_huffman / entropy_arith / entropy_range /         │
//! │ entropy_ans: leaf codecs                                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ entropy_predictors: FPAQ / CM / TPAQ bit predictors       │
//! ├─────────────────────────────────────────────────────────┤
//! │ entropy_core (this crate): bitstream, alphabet,           │
//! │ frequency, varint, exp-golomb, entropy estimator          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use entropy_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0xAB, 8).unwrap();
//!     writer.flush().unwrap();
//! }
//! let mut reader = BitReader::new(Cursor::new(output));
//! assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod alphabet;
pub mod bitstream;
pub mod entropy_estimator;
pub mod error;
pub mod exp_golomb;
pub mod frequency;
pub mod varint;

pub use alphabet::{decode_alphabet, encode_alphabet};
pub use bitstream::{BitReader, BitWriter};
pub use entropy_estimator::{estimate, ENTROPY_SCALE, INCOMPRESSIBLE_THRESHOLD};
pub use error::{EntropyError, Result};
pub use frequency::{normalize_frequencies, read_frequency_table, write_frequency_table};
pub use varint::{read_var_int, write_var_int};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{EntropyError, Result};
    pub use crate::{decode_alphabet, encode_alphabet, estimate, normalize_frequencies};
}
