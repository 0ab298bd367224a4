// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Parallel strong composition: the division core of a keyed two-table
//! function.
//!
//! Given `tab1 : 2^n -> 2^r` and `tab2 : 2^r -> 2^m`, the composed keyed
//! function is `x -> tab2[tab1[x] ^ key]` over keys in `[0, 2^r)`. For
//! every key and every output coordinate mask `v`, the engine forms the
//! AND of the selected single-bit product sets, takes its Moebius
//! transform, and ORs it into the shared accumulator `current[v]`; the per
//! key cost is `O(2^m * 2^n)` and dominates the run.
//!
//! Keys are independent, so a batch fans out across a thread pool; the
//! only shared mutable state is the `2^m`-entry accumulator array, guarded
//! by one mutex per output mask `v`. OR-accumulation is commutative and
//! associative, so the final `current[v]` does not depend on key order or
//! interleaving, and partial results from any prefix of key batches are
//! well defined. Finalize runs after the batch has drained (a barrier) and
//! folds the accumulators into the division core; its reduction is only
//! final once every key has been consumed.

use crate::error::{Error, Result};
use crate::lattice::LatticeSet;
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use std::sync::{Mutex, MutexGuard};

/// Upper bound on `n`, `r`, `m` and `n + m`.
const MAX_WIDTH: u32 = 62;
/// Upper bound on `m` alone: the accumulator array holds `2^m` sets.
const MAX_OUTPUT_WIDTH: u32 = 24;

/// Division-core composition of two tabulated functions under all keys.
pub struct StrongComposition {
    n: u32,
    r: u32,
    m: u32,
    tab1: Vec<u64>,
    tab2: Vec<u64>,
    keys_left: Vec<u64>,
    current: Vec<Mutex<LatticeSet>>,
    ones: LatticeSet,
    divcore: LatticeSet,
}

fn lock_ignoring_poison(m: &Mutex<LatticeSet>) -> MutexGuard<'_, LatticeSet> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl StrongComposition {
    /// Set up a composition over input width `n`, key width `r` and output
    /// width `m`; `tab1` must have `2^n` entries below `2^r`, `tab2` must
    /// have `2^r` entries below `2^m`. All keys `[0, 2^r)` start pending.
    pub fn new(n: u32, r: u32, m: u32, tab1: Vec<u64>, tab2: Vec<u64>) -> Result<Self> {
        if n > MAX_WIDTH || r > MAX_WIDTH || m > MAX_OUTPUT_WIDTH || n + m > MAX_WIDTH {
            return Err(Error::Config {
                reason: format!("unsupported widths n={} r={} m={}", n, r, m),
            });
        }
        if tab1.len() as u64 != 1u64 << n {
            return Err(Error::Config {
                reason: format!("tab1 has {} entries, expected 2^{}", tab1.len(), n),
            });
        }
        if tab2.len() as u64 != 1u64 << r {
            return Err(Error::Config {
                reason: format!("tab2 has {} entries, expected 2^{}", tab2.len(), r),
            });
        }
        if tab1.iter().any(|&y| y >= 1u64 << r) {
            return Err(Error::Config {
                reason: format!("tab1 value exceeds 2^{}", r),
            });
        }
        if tab2.iter().any(|&y| y >= 1u64 << m) {
            return Err(Error::Config {
                reason: format!("tab2 value exceeds 2^{}", m),
            });
        }

        let mut ones = LatticeSet::with_dimension(n);
        ones.fill();
        Ok(Self {
            n,
            r,
            m,
            tab1,
            tab2,
            keys_left: (0..1u64 << r).collect(),
            current: (0..1u64 << m)
                .map(|_| Mutex::new(LatticeSet::with_dimension(n)))
                .collect(),
            ones,
            divcore: LatticeSet::with_dimension(n + m),
        })
    }

    /// Input bit width.
    pub fn input_width(&self) -> u32 {
        self.n
    }

    /// Key bit width.
    pub fn key_width(&self) -> u32 {
        self.r
    }

    /// Output bit width.
    pub fn output_width(&self) -> u32 {
        self.m
    }

    /// Replace the pending key list; every key must be below `2^r`.
    pub fn set_keys(&mut self, keys: Vec<u64>) -> Result<()> {
        if let Some(&bad) = keys.iter().find(|&&k| k >= 1u64 << self.r) {
            return Err(Error::OutOfRange {
                index: bad,
                len: 1u64 << self.r,
            });
        }
        self.keys_left = keys;
        Ok(())
    }

    /// Shuffle the pending keys for load balancing across batches.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.keys_left.shuffle(rng);
    }

    /// Number of keys not yet processed.
    pub fn keys_remaining(&self) -> usize {
        self.keys_left.len()
    }

    /// True once every key has been consumed; only then is the division
    /// core final.
    pub fn is_complete(&self) -> bool {
        self.keys_left.is_empty()
    }

    /// Consume up to `limit` pending keys in parallel, then fold the
    /// accumulators into the division core. Safe to call repeatedly with
    /// any chunk sizes; the result after the final chunk is independent of
    /// the chunking.
    pub fn process(&mut self, limit: u64) {
        let take = (limit.min(self.keys_left.len() as u64)) as usize;
        let split = self.keys_left.len() - take;
        let keys = self.keys_left.split_off(split);
        {
            let this = &*self;
            keys.par_iter().for_each(|&key| this.process_key(key));
        }
        self.finalize();
    }

    /// Consume every remaining key.
    pub fn process_all(&mut self) {
        self.process(u64::MAX);
    }

    /// The accumulated division core (dimension `n + m`); final only once
    /// [`Self::is_complete`] holds.
    pub fn divcore(&self) -> &LatticeSet {
        &self.divcore
    }

    /// Consume the engine, returning the division core.
    pub fn into_divcore(self) -> LatticeSet {
        self.divcore
    }

    fn process_key(&self, key: u64) {
        let domain = 1u64 << self.n;

        // single-bit product sets: products[i] at x = bit i of the
        // composed function
        let mut products = Vec::with_capacity(self.m as usize);
        for i in 0..self.m {
            let mut p = LatticeSet::with_dimension(self.n);
            for x in 0..domain {
                let y = self.tab2[(self.tab1[x as usize] ^ key) as usize];
                if (y >> i) & 1 != 0 {
                    p.insert(x);
                }
            }
            products.push(p);
        }

        for v in 0..(1u64 << self.m) {
            let mut cur = self.ones.clone();
            for (i, p) in products.iter().enumerate() {
                if (v >> i) & 1 != 0 {
                    cur.merge_and(p);
                }
            }
            cur.do_mobius(u64::MAX);

            let mut acc = lock_ignoring_poison(&self.current[v as usize]);
            acc.merge_or(&cur);
        }
    }

    fn finalize(&mut self) {
        let umask = (1u64 << self.n) - 1;
        for v in 0..(1u64 << self.m) {
            let supp = {
                let mut acc = lock_ignoring_poison(&self.current[v as usize]);
                acc.do_max_set(u64::MAX);
                acc.support()
            };
            for u in supp {
                self.divcore.insert(((u ^ umask) << self.m) | v);
            }
        }
        self.divcore.do_min_set(u64::MAX);
    }
}
