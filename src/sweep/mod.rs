// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Generic in-place sweep over a power-of-two array.
//!
//! For every dimension `i` selected by `mask`, the index space splits into
//! disjoint pairs `{j, j | 2^i}` (over all `j` with bit `i` clear) and a
//! pairwise combinator is applied to each pair in place. Depending on the
//! combinator this realizes the zeta transform (upward/downward closure),
//! the Moebius transform, extremal-element reduction, coordinate swaps or
//! the Walsh-Hadamard butterfly.
//!
//! Dimension order within one call does not matter: each dimension's pairs
//! are disjoint, so any combinator that only reads and writes its own pair
//! commutes across dimensions. A new combinator must keep that property.
//!
//! [`sweep`] is the index-pair formulation over arbitrary `Copy` cells;
//! [`SweepOp`] is the closed set of bit-sliced combinators used by the set
//! types, where one `u64` carries 64 parallel lanes; `word::sweep_word` is
//! the SWAR fast path for dimensions living inside a single word.

pub mod word;

pub use word::sweep_word;

use strum_macros::EnumIter;

/// Apply `f` to every index pair of each dimension selected by `mask`.
///
/// `arr.len()` must be a power of two. The inner loop walks submasks in
/// descending order, which keeps the branch pattern identical across the
/// whole pass.
///
/// # Panics
///
/// Panics if `arr.len()` is not a power of two.
pub fn sweep<T, F>(arr: &mut [T], mask: u64, f: F)
where
    T: Copy,
    F: Fn(T, T) -> (T, T),
{
    let size = arr.len() as u64;
    assert!(
        size.is_power_of_two(),
        "sweep array length must be a power of two"
    );
    let n = size.trailing_zeros();
    for i in 0..n {
        let bit = 1u64 << i;
        if mask & bit == 0 {
            continue;
        }
        let msk = (size - 1) ^ bit;
        let mut j = msk;
        for _ in 0..(size >> 1) {
            let lo = j as usize;
            let hi = (j | bit) as usize;
            let (a, b) = f(arr[lo], arr[hi]);
            arr[lo] = a;
            arr[hi] = b;
            j = j.wrapping_sub(1) & msk;
        }
    }
}

/// Named pairwise combinators over bit-sliced `u64` lanes.
///
/// Each variant maps a pair `(a, b)` of lane words (with `a` at the lower
/// index and `b` at the partner index one dimension up) to a new pair. The
/// `..Up` forms push information from `a` into `b`, the `..Down` forms the
/// reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SweepOp {
    /// `b |= a`: upward closure propagation (zeta-up).
    OrUp,
    /// `a |= b`: downward closure propagation (zeta-down).
    OrDown,
    /// `b ^= a`: Moebius transform.
    XorUp,
    /// `a ^= b`: inverse parity transform.
    XorDown,
    /// `b &= a`.
    AndUp,
    /// `a &= b`.
    AndDown,
    /// Exchange the pair (coordinate flip).
    Swap,
    /// `b &= !a`: keep `b` only where `a` is absent (minimal extraction).
    LessUp,
    /// `a &= !b`: keep `a` only where `b` is absent (maximal extraction).
    MoreDown,
    /// `b = 0`.
    ZeroUp,
    /// `a = 0`.
    ZeroDown,
    /// `b = all ones`.
    OneUp,
    /// `a = all ones`.
    OneDown,
}

impl SweepOp {
    /// Combine one lane-word pair.
    #[inline]
    pub fn apply(self, a: u64, b: u64) -> (u64, u64) {
        match self {
            SweepOp::OrUp => (a, b | a),
            SweepOp::OrDown => (a | b, b),
            SweepOp::XorUp => (a, b ^ a),
            SweepOp::XorDown => (a ^ b, b),
            SweepOp::AndUp => (a, b & a),
            SweepOp::AndDown => (a & b, b),
            SweepOp::Swap => (b, a),
            SweepOp::LessUp => (a, b & !a),
            SweepOp::MoreDown => (a & !b, b),
            SweepOp::ZeroUp => (a, 0),
            SweepOp::ZeroDown => (0, b),
            SweepOp::OneUp => (a, u64::MAX),
            SweepOp::OneDown => (u64::MAX, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_zeta_up_propagates_to_supersets() {
        // indicator of {0b01} over n=2; zeta-up fills 0b01 and 0b11
        let mut arr = [0u64, 1, 0, 0];
        sweep(&mut arr, u64::MAX, |a, b| SweepOp::OrUp.apply(a, b));
        assert_eq!(arr, [0, 1, 0, 1]);
    }

    #[test]
    fn test_sweep_mobius_involution() {
        let mut arr = [1u64, 0, 1, 1, 0, 1, 0, 0];
        let orig = arr;
        sweep(&mut arr, u64::MAX, |a, b| SweepOp::XorUp.apply(a, b));
        sweep(&mut arr, u64::MAX, |a, b| SweepOp::XorUp.apply(a, b));
        assert_eq!(arr, orig);
    }

    #[test]
    fn test_sweep_respects_mask() {
        let mut arr = [0u64, 1, 0, 0];
        // only dimension 1 swept; 0b01's superset via bit 1 is 0b11
        sweep(&mut arr, 0b10, |a, b| SweepOp::OrUp.apply(a, b));
        assert_eq!(arr, [0, 1, 0, 1]);
        // dimension 0 alone does not reach 0b11 from 0b01
        let mut arr = [0u64, 1, 0, 0];
        sweep(&mut arr, 0b01, |a, b| SweepOp::OrUp.apply(a, b));
        assert_eq!(arr, [0, 1, 0, 0]);
    }

    #[test]
    fn test_walsh_hadamard_butterfly() {
        // constant zero function: spectrum concentrates at index 0
        let mut arr = [1i64; 8];
        sweep(&mut arr, u64::MAX, |a, b| (a + b, a - b));
        assert_eq!(arr[0], 8);
        assert!(arr[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_swap_reverses_coordinates() {
        let mut arr = [10u64, 11, 12, 13];
        sweep(&mut arr, u64::MAX, |a, b| SweepOp::Swap.apply(a, b));
        assert_eq!(arr, [13, 12, 11, 10]);
    }
}
