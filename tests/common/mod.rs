// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.
#![allow(dead_code)] // not every test binary uses every helper

use divcore::{LatticeSet, SweepOp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded RNG so fixtures are reproducible across runs.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A lattice set of dimension `n` where each index is a member with
/// probability `density`.
pub fn random_set(n: u32, density: f64, rng: &mut StdRng) -> LatticeSet {
    let mut s = LatticeSet::new(n).unwrap();
    for x in 0..(1u64 << n) {
        if rng.gen_bool(density) {
            s.set(x).unwrap();
        }
    }
    s
}

/// Reference sweep: unpack the set into one cell per index, run the
/// index-pair formulation, pack back. The word-level fast path inside
/// `LatticeSet::do_sweep` must match this exactly.
pub fn naive_sweep(s: &LatticeSet, op: SweepOp, mask: u64) -> LatticeSet {
    let n = s.dimension();
    let mut cells: Vec<u64> = (0..(1u64 << n))
        .map(|x| u64::from(s.contains(x).unwrap()))
        .collect();
    divcore::sweep(&mut cells, mask, |a, b| {
        let (a, b) = op.apply(a, b);
        (a & 1, b & 1)
    });
    let mut out = LatticeSet::new(n).unwrap();
    for (x, &c) in cells.iter().enumerate() {
        if c != 0 {
            out.set(x as u64).unwrap();
        }
    }
    out
}
