// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Division-core engine for vectorial Boolean functions (S-boxes).
//!
//! The crate computes and manipulates division cores: monotone set
//! structures over the Boolean lattice that describe how input/output
//! bit correlations propagate through a tabulated function. Its users
//! enumerate, transform and persist very large (2^20 - 2^40 element)
//! subsets of a hypercube domain.
//!
//! # Architecture
//!
//! Four layers, leaves first:
//!
//! - [`bits::PackedBits`] - fixed-width word-packed bit storage with a
//!   sparse/dense binary persistence format; foundation for everything
//!   else.
//! - [`sweep`] - the generic in-place transform kernel: for each selected
//!   dimension, combine disjoint index pairs with a pure combinator
//!   ([`sweep::SweepOp`]). Realizes the zeta/Moebius transform family, the
//!   Walsh-Hadamard butterfly and extremal reductions, with a word-level
//!   bit-sliced fast path. [`ternary`] generalizes the skeleton to base-3
//!   domains for Quine-McCluskey prime-implicant reduction.
//! - [`lattice::LatticeSet`] - a subset of the n-dimensional Boolean
//!   lattice stored as one `PackedBits` of length 2^n, exposing closures,
//!   min/max-set extraction, complements and slicing as sweep compositions.
//! - [`compose::StrongComposition`] - the parallel algorithm deriving the
//!   division core of a keyed composition of two tabulated functions,
//!   fanning independent keys across a thread pool and merging through
//!   per-output-mask accumulators.
//!
//! # Concurrency
//!
//! Nothing below the composition layer is internally concurrent. The
//! composition fans out per key; the only shared mutable state is the
//! accumulator array, one mutex per output mask, merged by commutative OR.

pub mod bits;
pub mod compose;
pub mod error;
pub mod lattice;
pub mod sweep;
pub mod ternary;

// Re-export commonly used types
pub use bits::PackedBits;
pub use compose::StrongComposition;
pub use error::{Error, Result};
pub use lattice::LatticeSet;
pub use sweep::{sweep, sweep_word, SweepOp};
pub use ternary::{TernaryOp, TernarySet};
