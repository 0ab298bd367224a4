// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Dense subsets of the ternary cube, for prime-implicant reduction.
//!
//! A [`TernarySet`] of dimension `n` covers the base-3 domain `3^n`: each
//! coordinate takes the value 0, 1 or 2, where in the Quine-McCluskey
//! reading 0/1 are literal values and 2 is "don't care". Indices are packed
//! two bits per digit, so the backing [`PackedBits`] has length `4^n` and
//! cell `x` is addressed by the base-4 number whose digits are the ternary
//! digits of `x`. The digit pattern 3 never occurs; those cells stay zero,
//! and both sweep combinators preserve zeros, so sweeping over the padded
//! base-4 space is sound.
//!
//! The sweep skeleton mirrors the binary one: for each dimension the
//! domain splits into disjoint triples `{j, j + s, j + 2s}` (digit 0/1/2 at
//! that position) combined by a triple combinator. Digits 0..3 live inside
//! one word and use a SWAR fast path; higher digits sweep whole-word
//! triples in base-4 word-index space.

use crate::bits::PackedBits;
use crate::error::{Error, Result};
use crate::lattice::LatticeSet;
use strum_macros::EnumIter;

/// Largest supported ternary dimension (`4^31` bits of backing storage is
/// already far past practical sizes).
pub const MAX_TERNARY_DIMENSION: u32 = 31;

/// In-word masks isolating cells with digit 0 at position 0, 1 and 2.
const MASKS_TERNARY: [u64; 3] = [
    0x1111111111111111,
    0x000f000f000f000f,
    0x000000000000ffff,
];

/// Triple combinators over bit-sliced lanes `(a, b, c)` = cells with digit
/// 0, 1 and 2 at the swept position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum TernaryOp {
    /// `c |= a & b`: where both literal cofactors are covered, cover the
    /// don't-care cell (implicant expansion).
    ExpandOr,
    /// `a &= !c; b &= !c`: drop literal cells subsumed by a don't-care
    /// (implicant reduction).
    ReduceNotAnd,
}

impl TernaryOp {
    /// Combine one lane-word triple.
    #[inline]
    pub fn apply(self, a: u64, b: u64, c: u64) -> (u64, u64, u64) {
        match self {
            TernaryOp::ExpandOr => (a, b, c | (a & b)),
            TernaryOp::ReduceNotAnd => (a & !c, b & !c, c),
        }
    }
}

/// Sweep the in-word digits of `word` selected by `mask` (bits 0..3).
fn sweep3_word(word: &mut u64, mask: u64, op: TernaryOp) {
    for (d, &m) in MASKS_TERNARY.iter().enumerate() {
        if mask & (1 << d) == 0 {
            continue;
        }
        let shift = 1u32 << (2 * d);
        let a = *word & m;
        let b = (*word >> shift) & m;
        let c = (*word >> (2 * shift)) & m;
        let (a, b, c) = op.apply(a, b, c);
        let keep = *word & !(m | (m << shift) | (m << (2 * shift)));
        *word = keep | (a & m) | ((b & m) << shift) | ((c & m) << (2 * shift));
    }
}

/// Sweep whole-word triples for digits at position 3 and above; `mask` bit
/// `d` selects word-index digit `d` (ternary digit `d + 3`).
fn sweep3_words(words: &mut [u64], mask: u64, op: TernaryOp) {
    let size = words.len() as u64;
    debug_assert!(size.is_power_of_two() && size.trailing_zeros() % 2 == 0);
    let digits = size.trailing_zeros() / 2;
    for d in 0..digits {
        if mask & (1u64 << d) == 0 {
            continue;
        }
        let s = 1u64 << (2 * d);
        for j in 0..size {
            if (j >> (2 * d)) & 3 != 0 {
                continue;
            }
            let (j0, j1, j2) = (j as usize, (j + s) as usize, (j + 2 * s) as usize);
            let (a, b, c) = op.apply(words[j0], words[j1], words[j2]);
            words[j0] = a;
            words[j1] = b;
            words[j2] = c;
        }
    }
}

/// Spread the bits of `x` into even positions: binary index to packed
/// ternary index with digits equal to the bits.
pub fn spread(x: u64, n: u32) -> u64 {
    let mut idx = 0u64;
    for i in 0..n {
        idx |= ((x >> i) & 1) << (2 * i);
    }
    idx
}

/// Decode the ternary digits of packed index `idx`, least significant
/// first.
pub fn digits(idx: u64, n: u32) -> Vec<u8> {
    (0..n).map(|i| ((idx >> (2 * i)) & 3) as u8).collect()
}

/// A subset of the ternary cube `{0,1,2}^n`, stored densely over packed
/// base-4 indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TernarySet {
    n: u32,
    bits: PackedBits,
}

impl TernarySet {
    /// Create the empty set of dimension `n`.
    pub fn new(n: u32) -> Result<Self> {
        if n > MAX_TERNARY_DIMENSION {
            return Err(Error::Config {
                reason: format!(
                    "ternary dimension {} exceeds maximum {}",
                    n, MAX_TERNARY_DIMENSION
                ),
            });
        }
        Ok(Self {
            n,
            bits: PackedBits::new(1u64 << (2 * n)),
        })
    }

    /// Lift a lattice set: every member's bits become ternary digits.
    pub fn from_lattice(s: &LatticeSet) -> Result<Self> {
        let mut t = Self::new(s.dimension())?;
        s.for_each_support(|x| t.bits.set_raw(spread(x, t.n)));
        Ok(t)
    }

    /// Dimension `n` of the cube.
    pub fn dimension(&self) -> u32 {
        self.n
    }

    fn check_index(&self, idx: u64) -> Result<()> {
        if idx >= self.bits.len() {
            return Err(Error::OutOfRange {
                index: idx,
                len: self.bits.len(),
            });
        }
        for i in 0..self.n {
            if (idx >> (2 * i)) & 3 == 3 {
                return Err(Error::OutOfRange {
                    index: idx,
                    len: self.bits.len(),
                });
            }
        }
        Ok(())
    }

    /// Membership test for packed index `idx`.
    pub fn contains(&self, idx: u64) -> Result<bool> {
        self.check_index(idx)?;
        Ok(self.bits.get_raw(idx))
    }

    /// Add packed index `idx`.
    pub fn set(&mut self, idx: u64) -> Result<()> {
        self.check_index(idx)?;
        self.bits.set_raw(idx);
        Ok(())
    }

    /// Number of members.
    pub fn weight(&self) -> u64 {
        self.bits.weight()
    }

    /// Ascending list of member packed indices.
    pub fn support(&self) -> Vec<u64> {
        self.bits.support()
    }

    fn full_mask(&self) -> u64 {
        (1u64 << self.n) - 1
    }

    /// Run one triple combinator over the dimensions selected by `mask`.
    pub fn do_sweep3(&mut self, op: TernaryOp, mask: u64) {
        let mask = mask & self.full_mask();
        let hi = mask >> 3;
        let lo = mask & 0b111;
        if hi != 0 {
            sweep3_words(self.bits.words_mut(), hi, op);
        }
        if lo != 0 {
            for w in self.bits.words_mut() {
                sweep3_word(w, lo, op);
            }
        }
        self.bits.trim();
    }

    /// Quine-McCluskey step: expand implicants upward, then drop subsumed
    /// literal cells. After a full-mask call the support is the set of
    /// prime implicants of the starting minterms.
    pub fn do_quine_mccluskey(&mut self, mask: u64) {
        self.do_sweep3(TernaryOp::ExpandOr, mask);
        self.do_sweep3(TernaryOp::ReduceNotAnd, mask);
    }

    /// Pure form of [`Self::do_quine_mccluskey`].
    pub fn quine_mccluskey(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_quine_mccluskey(mask);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: u64 = u64::MAX;

    #[test]
    fn test_spread_and_digits() {
        assert_eq!(spread(0b101, 3), 0b01_00_01);
        assert_eq!(digits(0b10_00_01, 3), vec![1, 0, 2]);
    }

    #[test]
    fn test_invalid_digit_rejected() {
        let mut t = TernarySet::new(2).unwrap();
        assert!(t.set(0b0011).is_err()); // digit 3
        assert!(t.set(0b0010).is_ok()); // digit 2 is fine
    }

    #[test]
    fn test_from_lattice() {
        let s = LatticeSet::from_indices(2, &[0b11]).unwrap();
        let t = TernarySet::from_lattice(&s).unwrap();
        assert_eq!(t.support(), vec![0b0101]);
    }

    #[test]
    fn test_qmc_single_variable() {
        // both cofactors present -> one don't-care implicant
        let mut t = TernarySet::new(1).unwrap();
        t.set(0).unwrap();
        t.set(1).unwrap();
        t.do_quine_mccluskey(ALL);
        assert_eq!(t.support(), vec![2]);
    }

    #[test]
    fn test_qmc_two_variables_half_cube() {
        // minterms {00, 01}: prime implicant is (x1=0, x0=-)
        let s = LatticeSet::from_indices(2, &[0b00, 0b01]).unwrap();
        let mut t = TernarySet::from_lattice(&s).unwrap();
        t.do_quine_mccluskey(ALL);
        assert_eq!(t.support(), vec![0b0010]);
        assert_eq!(digits(0b0010, 2), vec![2, 0]);
    }

    #[test]
    fn test_qmc_full_square_collapses() {
        // all four minterms of n=2 -> single all-don't-care implicant
        let s = LatticeSet::from_indices(2, &[0, 1, 2, 3]).unwrap();
        let mut t = TernarySet::from_lattice(&s).unwrap();
        t.do_quine_mccluskey(ALL);
        assert_eq!(t.support(), vec![0b1010]);
    }

    #[test]
    fn test_qmc_isolated_minterm_survives() {
        let s = LatticeSet::from_indices(2, &[0b01]).unwrap();
        let mut t = TernarySet::from_lattice(&s).unwrap();
        t.do_quine_mccluskey(ALL);
        assert_eq!(t.support(), vec![0b0001]);
    }

    #[test]
    fn test_qmc_crosses_word_boundary() {
        // n=4: 4^4 = 256 cells over four words; minterms {0000..1111} all
        // present collapse to the all-don't-care implicant
        let s = LatticeSet::from_indices(4, &(0..16).collect::<Vec<_>>()).unwrap();
        let mut t = TernarySet::from_lattice(&s).unwrap();
        t.do_quine_mccluskey(ALL);
        assert_eq!(t.support(), vec![0b10_10_10_10]);
    }
}
