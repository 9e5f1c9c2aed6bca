//! TPAQ (§4.4.3): the context-mixing predictor. Combines seven bit-history
//! state contexts and an eighth match-model prediction through a mixer,
//! optionally refined by two adaptive probability maps in "extra" mode.
//!
//! The original design points seven `cp0..cp6` cells directly into a state
//! table; here those become plain `usize` indices into flat `Vec<u8>`
//! tables ("index-plus-slice"), so nothing in this module touches a raw
//! pointer.

mod match_model;
mod mixer;

use crate::apm::{Apm, ApmKind};
use crate::predictor::Predictor;
use crate::tables::{next_state, state_stretch, BitState};
use match_model::MatchModel;
use mixer::MixerPool;

const NUM_STATE_SLOTS: usize = 7;
const SMALL0_LOG: u32 = 16;
const SMALL1_LOG: u32 = 24;
const BUFFER_LOG: u32 = 20; // scaled down from the format's 64 MiB ring for
                            // a workspace that never allocates gigabytes of
                            // state tables at default settings.

/// Table-size tier for a [`Tpaq`] predictor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TpaqSize {
    /// Smallest tables; suitable for small blocks or constrained memory.
    Small,
    /// Default size for typical blocks.
    Medium,
    /// Largest tables, for maximal context resolution on big blocks.
    Large,
}

impl TpaqSize {
    fn big_states_log(self) -> u32 {
        match self {
            TpaqSize::Small => 20,
            TpaqSize::Medium => 22,
            TpaqSize::Large => 24,
        }
    }

    fn hash_log(self) -> u32 {
        match self {
            TpaqSize::Small => 18,
            TpaqSize::Medium => 20,
            TpaqSize::Large => 22,
        }
    }

    fn mixer_log(self) -> u32 {
        match self {
            TpaqSize::Small => 9,
            TpaqSize::Medium => 13,
            TpaqSize::Large => 16,
        }
    }
}

fn combine(a: u32, b: u32) -> u32 {
    a.wrapping_mul(2_654_435_761)
        .wrapping_add(b)
        .wrapping_mul(2_246_822_519)
        ^ a.rotate_left(15)
}

/// The context-mixing predictor. Sized by [`TpaqSize`]; `extra` selects the
/// two-stage APM refinement pass ("TPAQX", codec tag 9).
#[derive(Debug, Clone)]
pub struct Tpaq {
    extra: bool,

    small0: Vec<BitState>,
    small1: Vec<BitState>,
    big: Vec<BitState>,
    big_mask: u32,

    buffer: Vec<u8>,
    buffer_mask: usize,
    pos: usize,

    c0: u16,
    c4: u32,
    c8: u32,
    bit_pos: u8,

    base_contexts: [u32; NUM_STATE_SLOTS],
    slot_index: [usize; NUM_STATE_SLOTS],

    matcher: MatchModel,
    mixers: MixerPool,

    apm1: Option<Apm>,
    apm0: Option<Apm>,

    pr: u16,
    last_predictions: [i32; 8],
}

impl Tpaq {
    /// Create a new TPAQ predictor of the given size tier.
    ///
    /// `extra` enables the two-stage APM refinement ("TPAQX").
    pub fn new(size: TpaqSize, extra: bool) -> Self {
        let big_log = size.big_states_log();
        let buffer_size = 1usize << BUFFER_LOG;
        Self {
            extra,
            small0: vec![0u8; 1 << SMALL0_LOG],
            small1: vec![0u8; 1 << SMALL1_LOG],
            big: vec![0u8; 1 << big_log],
            big_mask: (1u32 << big_log) - 1,
            buffer: vec![0u8; buffer_size],
            buffer_mask: buffer_size - 1,
            pos: 0,
            c0: 1,
            c4: 0,
            c8: 0,
            bit_pos: 0,
            base_contexts: [0; NUM_STATE_SLOTS],
            slot_index: [0; NUM_STATE_SLOTS],
            matcher: MatchModel::new(size.hash_log()),
            mixers: MixerPool::new(size.mixer_log()),
            apm1: extra.then(|| Apm::new(ApmKind::Logistic, 256, 7)),
            apm0: extra.then(|| Apm::new(ApmKind::Logistic, 65536, 7)),
            pr: 2048,
            last_predictions: [0; 8],
        }
    }

    fn looks_textual(&self) -> bool {
        // Few high bits set across the last four bytes is a common ASCII
        // text heuristic.
        (self.c4 & 0x8080_8080).count_ones() <= 1
    }

    fn state_table(&self, slot: usize) -> &Vec<BitState> {
        match slot {
            0 => &self.small0,
            1 => &self.small1,
            _ => &self.big,
        }
    }

    fn state_table_mut(&mut self, slot: usize) -> &mut Vec<BitState> {
        match slot {
            0 => &mut self.small0,
            1 => &mut self.small1,
            _ => &mut self.big,
        }
    }

    fn slot_mask(&self, slot: usize) -> u32 {
        match slot {
            0 => (1u32 << SMALL0_LOG) - 1,
            1 => (1u32 << SMALL1_LOG) - 1,
            _ => self.big_mask,
        }
    }

    fn repoint(&mut self, slot: usize) {
        let idx = combine(self.base_contexts[slot], self.c0 as u32) & self.slot_mask(slot);
        self.slot_index[slot] = idx as usize;
    }

    fn recompute_byte_contexts(&mut self) {
        let textual = self.looks_textual();
        self.base_contexts[0] = self.c4 & 0xFF;
        self.base_contexts[1] = self.c4 & 0xFFFF;
        for (i, slot) in self.base_contexts.iter_mut().enumerate().skip(2) {
            let order = i as u32; // 2..6
            let seed = if textual { 0xA5A5_5A5A } else { 0x1234_5678 };
            *slot = combine(self.c4.wrapping_add(order), self.c8 ^ seed);
        }
        for slot in 0..NUM_STATE_SLOTS {
            self.repoint(slot);
        }
    }

    fn on_byte_complete(&mut self, byte: u8) {
        self.buffer[self.pos & self.buffer_mask] = byte;
        self.pos += 1;
        self.c8 = (self.c8 << 8) | (self.c4 >> 24);
        self.c4 = (self.c4 << 8) | byte as u32;
        let hash = combine(self.c4, self.c8);
        self.mixers.select(self.c4 & 0xFFFF);
        self.recompute_byte_contexts();
        self.matcher.update(&self.buffer, self.pos, hash);
        self.c0 = 1;
        self.bit_pos = 0;
    }
}

impl Predictor for Tpaq {
    fn get(&self) -> u16 {
        self.pr
    }

    fn update(&mut self, bit: bool) {
        self.mixers.update(bit);

        let mut predictions = [0i32; 8];
        for slot in 0..NUM_STATE_SLOTS {
            let table = self.state_table_mut(slot);
            table[self.slot_index[slot]] = next_state(table[self.slot_index[slot]], bit);
        }

        self.c0 = (self.c0 << 1) | bit as u16;
        self.bit_pos += 1;
        let byte_complete = self.c0 >= 256;
        let completed_byte = if byte_complete { (self.c0 & 0xFF) as u8 } else { 0 };

        if byte_complete {
            self.on_byte_complete(completed_byte);
        } else {
            for slot in 0..NUM_STATE_SLOTS {
                self.repoint(slot);
            }
        }

        for slot in 0..NUM_STATE_SLOTS {
            let table = self.state_table(slot);
            predictions[slot] = state_stretch(table[self.slot_index[slot]]);
        }

        predictions[7] = match self.matcher.predict(&self.buffer, self.bit_pos % 8) {
            Some((predicted_bit, len)) => {
                let mag = (len.min(28) * 64) as i32;
                if predicted_bit {
                    mag
                } else {
                    -mag
                }
            }
            None => 0,
        };
        self.last_predictions = predictions;

        let mut p = self.mixers.mix(predictions);

        if self.extra {
            let c0 = self.c0 as usize & 0xFF;
            if let Some(apm1) = &mut self.apm1 {
                p = apm1.get(Some(bit), p, c0);
            }
            if self.looks_textual() {
                if let Some(apm0) = &mut self.apm0 {
                    let ctx = (self.c4 as usize) & 0xFFFF;
                    p = apm0.get(Some(bit), p, ctx);
                }
            }
        }

        let sign = if p > 2048 {
            1
        } else if p < 2048 {
            -1
        } else {
            0
        };
        self.pr = (p as i32 + sign).clamp(0, 4095) as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_near_midpoint() {
        let tpaq = Tpaq::new(TpaqSize::Small, false);
        assert!((1900..=2200).contains(&(tpaq.get() as i32)));
    }

    #[test]
    fn test_learns_repeated_byte() {
        let mut tpaq = Tpaq::new(TpaqSize::Small, false);
        for _ in 0..300 {
            for bit in [true, false, true, false, true, false, true, false] {
                tpaq.update(bit);
            }
        }
        // Predicting the first bit of the next (repeated) byte.
        assert!(tpaq.get() > 2048);
    }

    #[test]
    fn test_extra_mode_stays_in_range() {
        let mut tpaq = Tpaq::new(TpaqSize::Small, true);
        for i in 0..400 {
            tpaq.update(i % 5 == 0);
            assert!(tpaq.get() <= 4095);
        }
    }

    #[test]
    fn test_large_size_allocates_larger_tables() {
        let small = Tpaq::new(TpaqSize::Small, false);
        let large = Tpaq::new(TpaqSize::Large, false);
        assert!(large.big.len() > small.big.len());
    }
}
