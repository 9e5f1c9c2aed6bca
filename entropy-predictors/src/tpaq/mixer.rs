//! Single-layer logistic mixer (§4.4.3): blends the eight per-context
//! predictions into one probability.

use crate::tables::squash;

const INPUTS: usize = 8;

const LEARN_RATE_BEGIN: i32 = 60 * 128;
const LEARN_RATE_END: i32 = 11 * 128;

/// One mixer instance: eight weights, a skew term, and a geometrically
/// decaying learning rate.
#[derive(Debug, Clone)]
pub struct Mixer {
    weights: [i32; INPUTS],
    skew: i32,
    learn_rate: i32,
    inputs: [i32; INPUTS],
    pr: i32,
}

impl Mixer {
    /// Create a new mixer with all weights at a neutral starting point.
    pub fn new() -> Self {
        Self {
            weights: [1 << 14; INPUTS],
            skew: 0,
            learn_rate: LEARN_RATE_BEGIN,
            inputs: [0; INPUTS],
            pr: 2048,
        }
    }

    /// Mix the eight stretched predictions and return a probability in
    /// `[0, 4095]`.
    pub fn mix(&mut self, predictions: [i32; INPUTS]) -> u16 {
        self.inputs = predictions;
        let dot: i64 = predictions
            .iter()
            .zip(self.weights.iter())
            .map(|(&p, &w)| p as i64 * w as i64)
            .sum();
        let d = ((dot + self.skew as i64 + 65536) >> 17) as i32;
        let p = squash(d);
        self.pr = p;
        p as u16
    }

    /// Update weights and skew from the observed bit, decaying the learning
    /// rate toward [`LEARN_RATE_END`].
    pub fn update(&mut self, bit: bool) {
        let target: i32 = if bit { 4096 } else { 0 };
        let err = ((target - self.pr) * self.learn_rate) >> 10;
        if err != 0 {
            if self.learn_rate > LEARN_RATE_END {
                self.learn_rate -= (self.learn_rate - LEARN_RATE_END) >> 6;
            }
            self.skew += err;
            for (w, &input) in self.weights.iter_mut().zip(self.inputs.iter()) {
                *w += (input * err) >> 12;
            }
        }
    }

}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

/// A small pool of mixers selected by `c4 & mixer_mask`.
#[derive(Debug, Clone)]
pub struct MixerPool {
    mixers: Vec<Mixer>,
    mask: usize,
    active: usize,
}

impl MixerPool {
    /// Create a pool of `2^log_size` mixers.
    pub fn new(log_size: u32) -> Self {
        let size = 1usize << log_size;
        Self {
            mixers: (0..size).map(|_| Mixer::new()).collect(),
            mask: size - 1,
            active: 0,
        }
    }

    /// Select which mixer in the pool handles the next byte.
    pub fn select(&mut self, key: u32) {
        self.active = key as usize & self.mask;
    }

    /// Mix through the currently selected mixer.
    pub fn mix(&mut self, predictions: [i32; INPUTS]) -> u16 {
        self.mixers[self.active].mix(predictions)
    }

    /// Update the currently selected mixer.
    pub fn update(&mut self, bit: bool) {
        self.mixers[self.active].update(bit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixer_starts_near_midpoint() {
        let mut m = Mixer::new();
        let p = m.mix([0; INPUTS]);
        assert!((1900..=2200).contains(&p));
    }

    #[test]
    fn test_mixer_learns_strong_signal() {
        let mut m = Mixer::new();
        let strong_one = [2000i32; INPUTS];
        for _ in 0..500 {
            m.mix(strong_one);
            m.update(true);
        }
        assert!(m.mix(strong_one) > 3000);
    }

    #[test]
    fn test_mixer_pool_selects_distinct_mixers() {
        let mut pool = MixerPool::new(2);
        pool.select(0);
        pool.mix([500; INPUTS]);
        pool.update(true);
        pool.select(1);
        let p = pool.mix([500; INPUTS]);
        assert!((1900..=2200).contains(&p));
    }
}
