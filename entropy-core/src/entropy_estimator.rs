//! Order-0 entropy estimator (§4.2.4 of the format this workspace implements).
//!
//! Computes `Σ f[s] * log2(N/f[s])`, normalizes by the 8-bit-per-symbol
//! ceiling, and returns a fixed-point score in `[0, 1024]`. Callers compare
//! the score against [`INCOMPRESSIBLE_THRESHOLD`] to decide whether a block
//! is worth coding at all; this module never makes that decision itself.

use crate::error::{EntropyError, Result};
use std::sync::OnceLock;

/// Fixed-point scale the estimator's score is expressed in.
pub const ENTROPY_SCALE: u32 = 1024;

/// Score at or above which a block is considered incompressible.
pub const INCOMPRESSIBLE_THRESHOLD: u32 = 973;

/// Tabulated `log2(n)` for `n` in `1..=256`, built once on first use.
fn log2_table() -> &'static [f64; 257] {
    static TABLE: OnceLock<[f64; 257]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0f64; 257];
        for (n, slot) in table.iter_mut().enumerate().skip(1) {
            *slot = (n as f64).log2();
        }
        table
    })
}

fn log2_of(n: u32) -> f64 {
    let table = log2_table();
    if (n as usize) < table.len() {
        table[n as usize]
    } else {
        (n as f64).log2()
    }
}

/// Estimate the order-0 entropy of the symbol counts in `freq` (indexed by
/// symbol value) restricted to `alphabet`, over `total` observations.
///
/// Returns a score in `[0, ENTROPY_SCALE]`: `ENTROPY_SCALE` means every
/// symbol of a full 256-symbol alphabet was equally likely (maximal
/// entropy, 8 bits/symbol); 0 means a single symbol accounted for
/// everything.
pub fn estimate(freq: &[u32], alphabet: &[u8], total: u32) -> Result<u32> {
    if total == 0 {
        return Err(EntropyError::invalid_parameter(
            "cannot estimate entropy of zero observations",
        ));
    }

    let log2_total = log2_of(total);
    let mut bits = 0f64;
    for &s in alphabet {
        let f = freq[s as usize];
        if f == 0 {
            continue;
        }
        bits += f as f64 * (log2_total - log2_of(f));
    }

    let avg_bits_per_symbol = bits / total as f64;
    let score = (avg_bits_per_symbol / 8.0 * ENTROPY_SCALE as f64).round();
    Ok(score.clamp(0.0, ENTROPY_SCALE as f64) as u32)
}
