//! # Entropy Codec
//!
//! Codec tag dispatch (§4.9): a `CodecFactory` that builds any leaf coder
//! behind one `Box<dyn Codec>`, the way `oxiarc_archive::detect` glues
//! gzip/zip/tar/lzh/... behind one `ArchiveFormat` entry point.
//!
//! - [`tag`]: [`tag::CodecTag`] wire tag and [`tag::CodecConfig`] parameters
//! - [`codec`]: the [`codec::Codec`] trait and its concrete leaf-codec
//!   wrappers
//! - [`CodecFactory`]: `create(tag, config) -> Box<dyn Codec>`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod tag;

pub use codec::{AnsCodec, Codec, CmCodec, FpaqCodec, HuffmanCodec, NullCodec, RangeCodec, TpaqCodec};
pub use entropy_core::error::{EntropyError, Result};
pub use entropy_predictors::TpaqSize;
pub use tag::{CodecConfig, CodecTag};

use entropy_core::frequency::{MAX_WIRE_LOG_SCALE, MIN_LOG_SCALE};

fn validate_log_scale(log_scale: u8) -> Result<()> {
    if !(MIN_LOG_SCALE..=MAX_WIRE_LOG_SCALE).contains(&log_scale) {
        return Err(EntropyError::invalid_parameter(format!(
            "log_scale {log_scale} out of range [{MIN_LOG_SCALE}, {MAX_WIRE_LOG_SCALE}]"
        )));
    }
    Ok(())
}

/// Builds a [`Codec`] for a given [`CodecTag`], validating `config` eagerly
/// against the parameter table the tag expects.
pub struct CodecFactory;

impl CodecFactory {
    /// Construct the codec identified by `tag`, configured by `config`.
    ///
    /// Returns `InvalidParameter` if `config`'s shape doesn't match what
    /// `tag` expects (e.g. a `Tpaq` config paired with the `Range` tag), or
    /// if a `LogScale` value falls outside `[8, 15]`. Returns
    /// `UnsupportedCodec` for the retired `Paq` tag.
    pub fn create(tag: CodecTag, config: CodecConfig) -> Result<Box<dyn Codec>> {
        match (tag, config) {
            (CodecTag::None, CodecConfig::Plain) => Ok(Box::new(NullCodec)),
            (CodecTag::Huffman, CodecConfig::Plain) => Ok(Box::new(HuffmanCodec)),
            (CodecTag::Fpaq, CodecConfig::Plain) => Ok(Box::new(FpaqCodec::default())),
            (CodecTag::Cm, CodecConfig::Plain) => Ok(Box::new(CmCodec::default())),
            (CodecTag::Range, CodecConfig::LogScale { log_scale }) => {
                validate_log_scale(log_scale)?;
                Ok(Box::new(RangeCodec::new(log_scale)))
            }
            (CodecTag::Ans0, CodecConfig::LogScale { log_scale }) => {
                validate_log_scale(log_scale)?;
                Ok(Box::new(AnsCodec::order0(log_scale)))
            }
            (CodecTag::Ans1, CodecConfig::LogScale { log_scale }) => {
                validate_log_scale(log_scale)?;
                Ok(Box::new(AnsCodec::order1(log_scale)))
            }
            (CodecTag::Tpaq, CodecConfig::Tpaq { size }) => Ok(Box::new(TpaqCodec::new(size, false))),
            (CodecTag::TpaqX, CodecConfig::Tpaq { size }) => Ok(Box::new(TpaqCodec::new(size, true))),
            (CodecTag::Paq, _) => Err(EntropyError::unsupported_codec(CodecTag::Paq.as_u8())),
            (tag, _) => Err(EntropyError::invalid_parameter(format!(
                "config shape does not match codec tag {tag:?}"
            ))),
        }
    }

    /// Construct the codec identified by `tag` with its default config.
    pub fn create_default(tag: CodecTag) -> Result<Box<dyn Codec>> {
        Self::create(tag, CodecConfig::default_for(tag))
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::codec::Codec;
    pub use crate::{CodecConfig, CodecFactory, CodecTag};
}
