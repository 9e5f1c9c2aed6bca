//! # Entropy Predictors
//!
//! Adaptive bit predictors shared by `entropy_arith`'s binary coder.
//!
//! - [`predictor::Predictor`]: the capability trait every model implements
//! - [`fpaq::Fpaq`]: 256-entry order-0-ish byte-context predictor
//! - [`cm::Cm`]: three-counter Context Model
//! - [`tpaq::Tpaq`]: context-mixing predictor with a match model
//! - [`apm::Apm`]: adaptive probability map (secondary estimation)
//! - [`tables`]: shared squash/stretch and bit-history state tables

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod apm;
pub mod cm;
pub mod fpaq;
pub mod predictor;
pub mod tables;
pub mod tpaq;

pub use apm::{Apm, ApmKind};
pub use cm::Cm;
pub use fpaq::Fpaq;
pub use predictor::Predictor;
pub use tpaq::{Tpaq, TpaqSize};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::predictor::Predictor;
    pub use crate::{Cm, Fpaq, Tpaq, TpaqSize};
}
