// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Dense subsets of the Boolean lattice.
//!
//! A [`LatticeSet`] of dimension `n` is a bit vector of length `2^n`
//! indexed by n-bit integers: index `x` denotes the subset of an n-element
//! ground set given by its binary representation, and "bit set at `x`"
//! means `x` is a member. All lattice operations (closures, Moebius
//! transform, extremal-element extraction) are compositions of sweep
//! combinators over this array.
//!
//! The sweep itself is run bit-sliced: dimensions 6 and above sweep the
//! backing word array directly (each word is 64 parallel lanes), then the
//! low six dimensions sweep inside every word through the SWAR fast path.
//!
//! Every operation comes in two forms: an in-place `do_*` method, and a
//! pure copy-then-mutate method of the same name without the prefix. All
//! of them take a dimension `mask`; pass `u64::MAX` to sweep every
//! dimension.

use crate::bits::{word_index, PackedBits};
use crate::error::{Error, Result};
use crate::sweep::{sweep, sweep_word, SweepOp};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};

/// Largest supported dimension: `2^62` bits is the practical ceiling for a
/// word-indexed backing array.
pub const MAX_DIMENSION: u32 = 62;

/// A subset of the n-dimensional Boolean lattice, stored densely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeSet {
    n: u32,
    bits: PackedBits,
}

impl LatticeSet {
    /// Create the empty set of dimension `n`.
    pub fn new(n: u32) -> Result<Self> {
        if n > MAX_DIMENSION {
            return Err(Error::Config {
                reason: format!("set dimension {} exceeds maximum {}", n, MAX_DIMENSION),
            });
        }
        Ok(Self::with_dimension(n))
    }

    pub(crate) fn with_dimension(n: u32) -> Self {
        debug_assert!(n <= MAX_DIMENSION);
        Self {
            n,
            bits: PackedBits::new(1u64 << n),
        }
    }

    /// Create a set of dimension `n` containing exactly `indices`.
    pub fn from_indices(n: u32, indices: &[u64]) -> Result<Self> {
        let mut s = Self::new(n)?;
        for &x in indices {
            s.bits.set(x)?;
        }
        Ok(s)
    }

    /// Dimension `n` of the lattice.
    pub fn dimension(&self) -> u32 {
        self.n
    }

    /// Number of points in the domain (`2^n`).
    pub fn domain_size(&self) -> u64 {
        1u64 << self.n
    }

    /// Backing bit vector.
    pub fn bits(&self) -> &PackedBits {
        &self.bits
    }

    fn full_mask(&self) -> u64 {
        (1u64 << self.n) - 1
    }

    fn check_dimension(&self, other: &Self) -> Result<()> {
        if self.n == other.n {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                left: self.n as u64,
                right: other.n as u64,
            })
        }
    }

    // ========================================
    // Membership
    // ========================================

    /// Membership test for index `x`.
    pub fn contains(&self, x: u64) -> Result<bool> {
        self.bits.get(x)
    }

    /// Add index `x`.
    pub fn set(&mut self, x: u64) -> Result<()> {
        self.bits.set(x)
    }

    /// Remove index `x`.
    pub fn unset(&mut self, x: u64) -> Result<()> {
        self.bits.unset(x)
    }

    /// Set membership of `x` to `value`.
    pub fn set_to(&mut self, x: u64, value: bool) -> Result<()> {
        self.bits.set_to(x, value)
    }

    /// Toggle membership of `x`.
    pub fn flip(&mut self, x: u64) -> Result<()> {
        self.bits.flip(x)
    }

    #[inline]
    pub(crate) fn insert(&mut self, x: u64) {
        self.bits.set_raw(x);
    }

    /// Remove every member.
    pub fn clear_all(&mut self) {
        self.bits.clear_all();
    }

    /// Make this the full set.
    pub fn fill(&mut self) {
        self.bits.fill();
    }

    /// True iff the set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// True iff every index is a member.
    pub fn is_full(&self) -> bool {
        self.bits.is_full()
    }

    /// Number of members.
    pub fn weight(&self) -> u64 {
        self.bits.weight()
    }

    /// Ascending list of member indices.
    pub fn support(&self) -> Vec<u64> {
        self.bits.support()
    }

    /// Visit members in ascending order.
    pub fn for_each_support<F: FnMut(u64)>(&self, f: F) {
        self.bits.for_each_support(f)
    }

    // ========================================
    // Set algebra (dimensions must match)
    // ========================================

    /// `self |= other`.
    pub fn or_with(&mut self, other: &Self) -> Result<()> {
        self.check_dimension(other)?;
        self.bits.merge_or(&other.bits);
        Ok(())
    }

    /// `self &= other`.
    pub fn and_with(&mut self, other: &Self) -> Result<()> {
        self.check_dimension(other)?;
        self.bits.merge_and(&other.bits);
        Ok(())
    }

    /// `self ^= other`.
    pub fn xor_with(&mut self, other: &Self) -> Result<()> {
        self.check_dimension(other)?;
        self.bits.xor_with(&other.bits)
    }

    /// `self &= !other`.
    pub fn diff_with(&mut self, other: &Self) -> Result<()> {
        self.check_dimension(other)?;
        self.bits.andnot_with(&other.bits)
    }

    pub(crate) fn merge_or(&mut self, other: &Self) {
        debug_assert_eq!(self.n, other.n);
        self.bits.merge_or(&other.bits);
    }

    pub(crate) fn merge_and(&mut self, other: &Self) {
        debug_assert_eq!(self.n, other.n);
        self.bits.merge_and(&other.bits);
    }

    /// Subset test.
    pub fn is_subset(&self, other: &Self) -> Result<bool> {
        self.check_dimension(other)?;
        self.bits.le(&other.bits)
    }

    /// Strict subset test.
    pub fn is_strict_subset(&self, other: &Self) -> Result<bool> {
        self.check_dimension(other)?;
        self.bits.lt(&other.bits)
    }

    /// Superset test.
    pub fn is_superset(&self, other: &Self) -> Result<bool> {
        other.is_subset(self)
    }

    // ========================================
    // Sweep-based transforms
    // ========================================

    /// Run one combinator over the dimensions selected by `mask`.
    ///
    /// This is the raw engine underneath all the named transforms below.
    pub fn do_sweep(&mut self, op: SweepOp, mask: u64) {
        let mask = mask & self.full_mask();
        let hi = mask >> 6;
        let lo = mask & 0x3f;
        if hi != 0 {
            sweep(self.bits.words_mut(), hi, |a, b| op.apply(a, b));
        }
        if lo != 0 {
            for w in self.bits.words_mut() {
                sweep_word(w, lo, op);
            }
        }
        self.bits.trim();
    }

    /// Moebius transform (ANF coefficients of the indicator function).
    pub fn do_mobius(&mut self, mask: u64) {
        self.do_sweep(SweepOp::XorUp, mask);
    }

    /// Inverse parity transform (dual of the Moebius transform).
    pub fn do_parity_set(&mut self, mask: u64) {
        self.do_sweep(SweepOp::XorDown, mask);
    }

    /// Close upward: add every superset of every member.
    pub fn do_upper_set(&mut self, mask: u64) {
        self.do_sweep(SweepOp::OrUp, mask);
    }

    /// Close downward: add every subset of every member.
    pub fn do_lower_set(&mut self, mask: u64) {
        self.do_sweep(SweepOp::OrDown, mask);
    }

    /// Reduce to the minimal elements generating the same upper closure.
    pub fn do_min_set(&mut self, mask: u64) {
        self.do_upper_set(mask);
        self.do_sweep(SweepOp::LessUp, mask);
    }

    /// Reduce to the maximal elements generating the same lower closure.
    pub fn do_max_set(&mut self, mask: u64) {
        self.do_lower_set(mask);
        self.do_sweep(SweepOp::MoreDown, mask);
    }

    /// Set complement (bitwise NOT with trim).
    pub fn do_complement(&mut self) {
        self.bits.complement();
    }

    /// Flip the coordinates selected by `mask`: member `x` moves to
    /// `x ^ mask`. A position permutation, not a complement.
    pub fn do_not(&mut self, mask: u64) {
        let mask = mask & self.full_mask();
        let lo = mask & 0x3f;
        let hi = (mask >> 6) as usize;
        if lo != 0 {
            for w in self.bits.words_mut() {
                sweep_word(w, lo, SweepOp::Swap);
            }
        }
        if hi != 0 {
            let words = self.bits.words_mut();
            for i in 0..words.len() {
                let j = i ^ hi;
                if j > i {
                    words.swap(i, j);
                }
            }
        }
    }

    /// Division-core convenience: Moebius, then max-set, then coordinate
    /// flip. The composite used by division-property consumers.
    pub fn do_div_core(&mut self, mask: u64) {
        self.do_mobius(mask);
        self.do_max_set(mask);
        self.do_not(mask);
    }

    /// Complement taken in the upper-set representation, re-extracted as a
    /// max-set. `is_upper` skips the initial closure when the set is
    /// already upward closed.
    pub fn do_complement_upper_to_lower(&mut self, is_upper: bool, mask: u64) {
        if !is_upper {
            self.do_upper_set(mask);
        }
        self.do_complement();
        self.do_max_set(mask);
    }

    /// Complement taken in the lower-set representation, re-extracted as a
    /// min-set. `is_lower` skips the initial closure when the set is
    /// already downward closed.
    pub fn do_complement_lower_to_upper(&mut self, is_lower: bool, mask: u64) {
        if !is_lower {
            self.do_lower_set(mask);
        }
        self.do_complement();
        self.do_min_set(mask);
    }

    /// Replace a min-set by its strict one-step successors: every member
    /// `u` is removed and all `u | 2^i` for swept `i` are added.
    /// `is_minset` skips the initial min-set reduction.
    pub fn do_upper_set_up1(&mut self, is_minset: bool, mask: u64) {
        if !is_minset {
            self.do_min_set(u64::MAX);
        }
        let supp = self.bits.support();
        {
            let words = self.bits.words_mut();
            for &uv in &supp {
                words[word_index(uv)] = 0;
            }
        }
        for &uv in &supp {
            for i in 0..self.n {
                if mask & (1u64 << i) == 0 {
                    continue;
                }
                let uv2 = uv | (1u64 << i);
                if uv2 != uv {
                    self.bits.set_raw(uv2);
                }
            }
        }
    }

    /// Walsh-Hadamard spectrum of the indicator function, members encoded
    /// as -1 and non-members as +1.
    pub fn walsh_hadamard(&self, mask: u64) -> Vec<i64> {
        let mut ret = vec![1i64; self.domain_size() as usize];
        self.for_each_support(|x| ret[x as usize] = -1);
        sweep(&mut ret, mask & self.full_mask(), |a, b| (a + b, a - b));
        ret
    }

    // ========================================
    // Pure copy-then-mutate forms
    // ========================================

    /// Pure form of [`Self::do_mobius`].
    pub fn mobius(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_mobius(mask);
        r
    }

    /// Pure form of [`Self::do_parity_set`].
    pub fn parity_set(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_parity_set(mask);
        r
    }

    /// Pure form of [`Self::do_upper_set`].
    pub fn upper_set(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_upper_set(mask);
        r
    }

    /// Pure form of [`Self::do_lower_set`].
    pub fn lower_set(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_lower_set(mask);
        r
    }

    /// Pure form of [`Self::do_min_set`].
    pub fn min_set(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_min_set(mask);
        r
    }

    /// Pure form of [`Self::do_max_set`].
    pub fn max_set(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_max_set(mask);
        r
    }

    /// Pure form of [`Self::do_complement`].
    pub fn complement(&self) -> Self {
        let mut r = self.clone();
        r.do_complement();
        r
    }

    /// Pure form of [`Self::do_not`].
    pub fn not_(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_not(mask);
        r
    }

    /// Pure form of [`Self::do_div_core`].
    pub fn div_core(&self, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_div_core(mask);
        r
    }

    /// Pure form of [`Self::do_complement_upper_to_lower`].
    pub fn complement_upper_to_lower(&self, is_upper: bool, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_complement_upper_to_lower(is_upper, mask);
        r
    }

    /// Pure form of [`Self::do_complement_lower_to_upper`].
    pub fn complement_lower_to_upper(&self, is_lower: bool, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_complement_lower_to_upper(is_lower, mask);
        r
    }

    /// Pure form of [`Self::do_upper_set_up1`].
    pub fn upper_set_up1(&self, is_minset: bool, mask: u64) -> Self {
        let mut r = self.clone();
        r.do_upper_set_up1(is_minset, mask);
        r
    }

    // ========================================
    // Slicing and statistics
    // ========================================

    /// The sub-lattice of dimension `n - h` holding exactly the indices
    /// whose top `h` bits equal `value`, sliced as a contiguous word range.
    ///
    /// Requires `n - h >= 6` so the slice is word-aligned.
    pub fn head_fixed(&self, h: u32, value: u64) -> Result<Self> {
        if h > self.n || self.n - h < 6 {
            return Err(Error::Config {
                reason: format!(
                    "head_fixed needs 6 <= n-h, got n={} h={}",
                    self.n, h
                ),
            });
        }
        if value >= (1u64 << h) {
            return Err(Error::OutOfRange {
                index: value,
                len: 1u64 << h,
            });
        }
        let shift = self.n - h - 6;
        let start = (value << shift) as usize;
        let end = ((value + 1) << shift) as usize;
        Ok(Self {
            n: self.n - h,
            bits: PackedBits::from_words(self.bits.words()[start..end].to_vec()),
        })
    }

    /// Member counts bucketed by Hamming weight; entry `w` counts members
    /// of weight `w`.
    pub fn counts_by_weights(&self) -> Vec<u64> {
        let mut res = vec![0u64; self.n as usize + 1];
        self.for_each_support(|x| res[x.count_ones() as usize] += 1);
        res
    }

    /// Member counts bucketed by the weight pair of the top `n1` and
    /// bottom `n2` coordinates; requires `n1 + n2 == n`.
    pub fn counts_by_weight_pairs(&self, n1: u32, n2: u32) -> Result<BTreeMap<(u32, u32), u64>> {
        if n1 + n2 != self.n {
            return Err(Error::Config {
                reason: format!("weight pair split {}+{} != {}", n1, n2, self.n),
            });
        }
        let mut res = BTreeMap::new();
        let mask2 = (1u64 << n2) - 1;
        self.for_each_support(|x| {
            let l = (x >> n2).count_ones();
            let r = (x & mask2).count_ones();
            *res.entry((l, r)).or_insert(0) += 1;
        });
        Ok(res)
    }

    // ========================================
    // Persistence
    // ========================================

    /// Serialize through the [`PackedBits`] sparse/dense format.
    pub fn write_into<W: Write>(&self, w: &mut W) -> Result<()> {
        self.bits.write_into(w)
    }

    /// Deserialize; the bit length must be a power of two.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let bits = PackedBits::read_from(r)?;
        Self::from_bits(bits)
    }

    /// Save to a file, auto-choosing the encoding.
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        self.bits.save_to_file(path)
    }

    /// Load from a file written by [`Self::save_to_file`].
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::from_bits(PackedBits::load_from_file(path)?)
    }

    fn from_bits(bits: PackedBits) -> Result<Self> {
        let len = bits.len();
        if !len.is_power_of_two() {
            return Err(Error::CorruptFile {
                reason: "lattice set bit length is not a power of two",
            });
        }
        Ok(Self {
            n: len.trailing_zeros(),
            bits,
        })
    }
}

impl fmt::Display for LatticeSet {
    /// Format as `LatticeSet(n=4, wt=3 | 1:2 2:1)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LatticeSet(n={}, wt={} |", self.n, self.weight())?;
        for (w, cnt) in self.counts_by_weights().iter().enumerate() {
            if *cnt != 0 {
                write!(f, " {}:{}", w, cnt)?;
            }
        }
        write!(f, ")")
    }
}
