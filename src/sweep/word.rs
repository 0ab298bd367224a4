// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Word-level fast path for the sweep kernel.
//!
//! When the sweep domain fits inside one 64-bit word, the index-pair
//! formulation collapses to a SWAR butterfly: the word is treated as 64
//! bit-sliced lanes and each of the six low dimensions is combined through
//! a half-width interleave mask. The result is bit-identical to the
//! index-pair formulation (verified exhaustively in the tests).

use super::SweepOp;

/// Interleave masks isolating the lower half-lane at granularity
/// 1, 2, 4, 8, 16 and 32.
pub(crate) const MASK64_SINGLE: [u64; 6] = [
    0x5555555555555555,
    0x3333333333333333,
    0x0f0f0f0f0f0f0f0f,
    0x00ff00ff00ff00ff,
    0x0000ffff0000ffff,
    0x00000000ffffffff,
];

/// Sweep the six in-word dimensions of `word` selected by `mask`.
///
/// `mask` here selects dimensions 0..6 (bit values 1..32), matching the
/// low six bits of an index-space mask. Combinator output is re-masked so
/// clamp combinators cannot escape their half-lanes.
#[inline]
pub fn sweep_word(word: &mut u64, mask: u64, op: SweepOp) {
    for (i, &m) in MASK64_SINGLE.iter().enumerate() {
        if mask & (1 << i) == 0 {
            continue;
        }
        let shift = 1u32 << i;
        let lo = *word & m;
        let hi = (*word >> shift) & m;
        let (lo, hi) = op.apply(lo, hi);
        *word = ((hi & m) << shift) | (lo & m);
    }
}
