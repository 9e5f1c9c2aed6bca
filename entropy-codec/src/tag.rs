//! The one-byte codec tag (§4.9) identifying which leaf codec produced a
//! chunk, and the configuration each tag's codec is constructed with.

use entropy_core::error::{EntropyError, Result};
use entropy_predictors::TpaqSize;

/// Identifies which leaf codec a chunk was coded with.
///
/// Values match the wire tag byte exactly; `Paq` (3) is a retired variant
/// kept only so [`TryFrom<u8>`] can name it in the unsupported-codec error
/// instead of falling through to "unknown tag".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodecTag {
    /// Pass-through, no coding applied.
    None = 0,
    /// Canonical Huffman.
    Huffman = 1,
    /// Binary arithmetic coding driven by the FPAQ predictor.
    Fpaq = 2,
    /// Retired PAQ variant; constructible as a tag but never as a codec.
    Paq = 3,
    /// Range coder.
    Range = 4,
    /// Order-0 table-based ANS.
    Ans0 = 5,
    /// Binary arithmetic coding driven by the Context Model predictor.
    Cm = 6,
    /// Binary arithmetic coding driven by the TPAQ predictor.
    Tpaq = 7,
    /// Order-1 table-based ANS.
    Ans1 = 8,
    /// Binary arithmetic coding driven by TPAQ with APM refinement.
    TpaqX = 9,
}

impl CodecTag {
    /// The wire tag byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CodecTag {
    type Error = EntropyError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Huffman),
            2 => Ok(Self::Fpaq),
            3 => Ok(Self::Paq),
            4 => Ok(Self::Range),
            5 => Ok(Self::Ans0),
            6 => Ok(Self::Cm),
            7 => Ok(Self::Tpaq),
            8 => Ok(Self::Ans1),
            9 => Ok(Self::TpaqX),
            other => Err(EntropyError::unsupported_codec(other)),
        }
    }
}

/// Construction parameters for a codec, keyed by [`CodecTag`].
///
/// [`crate::CodecFactory::create`] matches a `config` variant against its
/// `tag`, so a mismatched pairing (e.g. `Range` tag with `Ans { .. }`
/// config) is an invalid-parameter error rather than a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecConfig {
    /// No parameters: `None`, `Huffman`, `Fpaq`, `Cm`.
    Plain,
    /// Parameters for `Range`, `Ans0`, `Ans1`: the frequency-table log scale.
    LogScale {
        /// `log2` of the frequency normalization total, `8..=15`.
        log_scale: u8,
    },
    /// Parameters for `Tpaq`, `TpaqX`: table size tier.
    Tpaq {
        /// Predictor table size tier.
        size: TpaqSize,
    },
}

impl CodecConfig {
    /// The configuration a tag uses when the caller has no specific
    /// preference.
    pub fn default_for(tag: CodecTag) -> Self {
        match tag {
            CodecTag::None | CodecTag::Huffman | CodecTag::Fpaq | CodecTag::Cm => Self::Plain,
            CodecTag::Range | CodecTag::Ans0 | CodecTag::Ans1 => {
                Self::LogScale { log_scale: 14 }
            }
            CodecTag::Tpaq | CodecTag::TpaqX => Self::Tpaq {
                size: TpaqSize::Medium,
            },
            CodecTag::Paq => Self::Plain,
        }
    }
}
