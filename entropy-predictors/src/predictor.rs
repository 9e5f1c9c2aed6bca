//! The `Predictor` capability trait shared by every bit model in this crate.

/// A bit predictor: supplies a probability estimate for the next bit and
/// absorbs the observed outcome.
///
/// Implementations are used as trait objects by `entropy_arith`'s binary
/// coder, so the trait is kept object-safe.
pub trait Predictor {
    /// Probability that the next bit is 1, scaled to `[0, 4095]`.
    fn get(&self) -> u16;

    /// Absorb the observed bit, updating internal state for the next call
    /// to [`get`](Predictor::get).
    fn update(&mut self, bit: bool);
}
