// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Word-packed bit vector storage.
//!
//! [`PackedBits`] is the foundation of every set type in this crate: a bit
//! vector of declared length `len`, packed into 64-bit words. All higher
//! structures (lattice sets over 2^n points, ternary cubes over packed
//! base-4 indices) are views over one `PackedBits`.
//!
//! # Invariant
//!
//! `words.len() == ceil(len / 64)`, and every bit at index >= `len` in the
//! final word is zero ("trimmed"). Operations that could disturb the tail
//! (fill, complement, resize) re-trim before returning.

pub mod serialize;

use crate::error::{Error, Result};
use std::fmt;

/// Word index of bit `x`.
#[inline]
pub(crate) fn word_index(x: u64) -> usize {
    (x >> 6) as usize
}

/// Position of bit `x` within its word.
#[inline]
pub(crate) fn bit_index(x: u64) -> u32 {
    (x & 0x3f) as u32
}

/// Number of words needed for `len` bits.
#[inline]
pub(crate) fn word_count(len: u64) -> usize {
    ((len >> 6) + u64::from(len & 0x3f != 0)) as usize
}

/// A fixed-length bit vector packed into 64-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBits {
    len: u64,
    words: Vec<u64>,
}

impl PackedBits {
    /// Create an all-zero bit vector of `len` bits.
    pub fn new(len: u64) -> Self {
        Self {
            len,
            words: vec![0; word_count(len)],
        }
    }

    /// Adopt a raw word array; the length is `words.len() * 64`.
    pub fn from_words(words: Vec<u64>) -> Self {
        Self {
            len: (words.len() as u64) << 6,
            words,
        }
    }

    /// Declared length in bits.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Number of backing words.
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// Zero any bits at or past `len` in the final word.
    pub(crate) fn trim(&mut self) {
        let tail = bit_index(self.len);
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    fn check_index(&self, x: u64) -> Result<()> {
        if x < self.len {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                index: x,
                len: self.len,
            })
        }
    }

    fn check_len(&self, other: &Self) -> Result<()> {
        if self.len == other.len {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                left: self.len,
                right: other.len,
            })
        }
    }

    /// Read bit `x`.
    pub fn get(&self, x: u64) -> Result<bool> {
        self.check_index(x)?;
        Ok(self.get_raw(x))
    }

    /// Set bit `x` to one.
    pub fn set(&mut self, x: u64) -> Result<()> {
        self.check_index(x)?;
        self.set_raw(x);
        Ok(())
    }

    /// Set bit `x` to zero.
    pub fn unset(&mut self, x: u64) -> Result<()> {
        self.check_index(x)?;
        self.words[word_index(x)] &= !(1u64 << bit_index(x));
        Ok(())
    }

    /// Set bit `x` to `value`.
    pub fn set_to(&mut self, x: u64, value: bool) -> Result<()> {
        self.check_index(x)?;
        let w = &mut self.words[word_index(x)];
        *w &= !(1u64 << bit_index(x));
        *w |= u64::from(value) << bit_index(x);
        Ok(())
    }

    /// Toggle bit `x`.
    pub fn flip(&mut self, x: u64) -> Result<()> {
        self.check_index(x)?;
        self.words[word_index(x)] ^= 1u64 << bit_index(x);
        Ok(())
    }

    #[inline]
    pub(crate) fn get_raw(&self, x: u64) -> bool {
        debug_assert!(x < self.len);
        (self.words[word_index(x)] >> bit_index(x)) & 1 != 0
    }

    #[inline]
    pub(crate) fn set_raw(&mut self, x: u64) {
        debug_assert!(x < self.len);
        self.words[word_index(x)] |= 1u64 << bit_index(x);
    }

    /// Set every bit to one.
    pub fn fill(&mut self) {
        for w in &mut self.words {
            *w = u64::MAX;
        }
        self.trim();
    }

    /// Set every bit to zero.
    pub fn clear_all(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    /// True iff no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// True iff every bit up to `len` is set.
    pub fn is_full(&self) -> bool {
        if self.len == 0 {
            return true;
        }
        let (last, head) = self.words.split_last().unwrap_or((&0, &[]));
        if head.iter().any(|&w| w != u64::MAX) {
            return false;
        }
        let tail = bit_index(self.len);
        if tail != 0 {
            *last == (1u64 << tail) - 1
        } else {
            *last == u64::MAX
        }
    }

    /// Population count.
    pub fn weight(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Visit every set bit index in ascending order, skipping zero words.
    pub fn for_each_support<F: FnMut(u64)>(&self, mut f: F) {
        for (wi, &word) in self.words.iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let b = w.trailing_zeros();
                f(((wi as u64) << 6) | u64::from(b));
                w &= w - 1;
            }
        }
    }

    /// Ascending list of set bit indices.
    pub fn support(&self) -> Vec<u64> {
        let mut inds = Vec::new();
        self.for_each_support(|x| inds.push(x));
        inds
    }

    /// Grow or shrink to `len` bits; new bits are zero, removed bits are lost.
    pub fn resize(&mut self, len: u64) {
        self.len = len;
        self.words.resize(word_count(len), 0);
        self.trim();
    }

    /// Invert every bit (with trim).
    pub fn complement(&mut self) {
        for w in &mut self.words {
            *w = !*w;
        }
        self.trim();
    }

    /// `self |= other`.
    pub fn or_with(&mut self, other: &Self) -> Result<()> {
        self.check_len(other)?;
        self.merge_or(other);
        Ok(())
    }

    /// `self &= other`.
    pub fn and_with(&mut self, other: &Self) -> Result<()> {
        self.check_len(other)?;
        self.merge_and(other);
        Ok(())
    }

    /// `self ^= other`.
    pub fn xor_with(&mut self, other: &Self) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a ^= *b;
        }
        Ok(())
    }

    /// `self &= !other` (set difference).
    pub fn andnot_with(&mut self, other: &Self) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
        Ok(())
    }

    pub(crate) fn merge_or(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    pub(crate) fn merge_and(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// Subset test: `self <= other` iff `(self & other) == self` wordwise.
    pub fn le(&self, other: &Self) -> Result<bool> {
        self.check_len(other)?;
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .all(|(&a, &b)| a & b == a))
    }

    /// Strict subset test.
    pub fn lt(&self, other: &Self) -> Result<bool> {
        Ok(self.le(other)? && self.words != other.words)
    }

    /// Superset test.
    pub fn ge(&self, other: &Self) -> Result<bool> {
        other.le(self)
    }

    /// Strict superset test.
    pub fn gt(&self, other: &Self) -> Result<bool> {
        other.lt(self)
    }
}

impl fmt::Display for PackedBits {
    /// Format as `<PackedBits len=.. wt=..>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<PackedBits len={} wt={}>", self.len, self.weight())
    }
}
