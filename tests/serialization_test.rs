// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Round-trip and rejection tests for the sparse/dense set file format.

mod common;

use common::{random_set, rng};
use divcore::bits::serialize::{MARKER_END, TAG_DENSE, TAG_SPARSE};
use divcore::{Error, LatticeSet, PackedBits};
use std::io::Cursor;

fn round_trip(bits: &PackedBits, forced: Option<bool>) -> PackedBits {
    let mut buf = Vec::new();
    match forced {
        Some(true) => bits.write_sparse(&mut buf).unwrap(),
        Some(false) => bits.write_dense(&mut buf).unwrap(),
        None => bits.write_into(&mut buf).unwrap(),
    }
    PackedBits::read_from(&mut Cursor::new(buf)).unwrap()
}

#[test]
fn test_round_trip_empty_full_random() {
    let mut r = rng(0xcafe);
    for n in [0u32, 3, 6, 10, 14] {
        let empty = LatticeSet::new(n).unwrap();
        let mut full = LatticeSet::new(n).unwrap();
        full.fill();
        let dense = random_set(n, 0.5, &mut r);
        let sparse = random_set(n, 0.02, &mut r);
        for s in [&empty, &full, &dense, &sparse] {
            for forced in [None, Some(true), Some(false)] {
                assert_eq!(&round_trip(s.bits(), forced), s.bits(), "n={}", n);
            }
        }
    }
}

#[test]
fn test_lattice_round_trip_recovers_dimension() {
    let mut r = rng(0xd00d);
    let s = random_set(9, 0.3, &mut r);
    let mut buf = Vec::new();
    s.write_into(&mut buf).unwrap();
    let back = LatticeSet::read_from(&mut Cursor::new(buf)).unwrap();
    assert_eq!(back.dimension(), 9);
    assert_eq!(back, s);
}

#[test]
fn test_sparse_chosen_for_thin_sets() {
    let s = LatticeSet::from_indices(12, &[5, 99, 710]).unwrap();
    let mut buf = Vec::new();
    s.write_into(&mut buf).unwrap();
    assert_eq!(u64::from_le_bytes(buf[..8].try_into().unwrap()), TAG_SPARSE);
    // n = 4096 picks 2-byte elements: 4 header words + 3*2 bytes + marker
    assert_eq!(buf.len(), 32 + 6 + 8);
}

#[test]
fn test_dense_chosen_for_thick_sets() {
    let mut s = LatticeSet::new(12).unwrap();
    s.fill();
    let mut buf = Vec::new();
    s.write_into(&mut buf).unwrap();
    assert_eq!(u64::from_le_bytes(buf[..8].try_into().unwrap()), TAG_DENSE);
    assert_eq!(buf.len(), 32 + (4096 / 8) + 8);
}

#[test]
fn test_bad_tag_rejected() {
    let mut buf = Vec::new();
    PackedBits::new(64).write_into(&mut buf).unwrap();
    buf[..8].copy_from_slice(&0xdeadbeefu64.to_le_bytes());
    assert!(matches!(
        PackedBits::read_from(&mut Cursor::new(buf)),
        Err(Error::CorruptFile { .. })
    ));
}

#[test]
fn test_bad_end_marker_rejected() {
    let mut buf = Vec::new();
    let mut b = PackedBits::new(64);
    b.set(13).unwrap();
    b.write_dense(&mut buf).unwrap();
    let at = buf.len() - 8;
    buf[at..].copy_from_slice(&(MARKER_END ^ 1).to_le_bytes());
    assert!(matches!(
        PackedBits::read_from(&mut Cursor::new(buf)),
        Err(Error::CorruptFile { .. })
    ));
}

#[test]
fn test_truncated_file_rejected() {
    let mut buf = Vec::new();
    let mut b = PackedBits::new(256);
    b.fill();
    b.write_dense(&mut buf).unwrap();
    buf.truncate(buf.len() - 12);
    assert!(PackedBits::read_from(&mut Cursor::new(buf)).is_err());
}

#[test]
fn test_sparse_index_past_length_rejected() {
    // hand-built sparse block claiming len 8 with element 9
    let mut buf = Vec::new();
    buf.extend_from_slice(&TAG_SPARSE.to_le_bytes());
    buf.extend_from_slice(&8u64.to_le_bytes());
    buf.extend_from_slice(&1u64.to_le_bytes());
    buf.extend_from_slice(&1u64.to_le_bytes());
    buf.push(9);
    buf.extend_from_slice(&MARKER_END.to_le_bytes());
    assert!(matches!(
        PackedBits::read_from(&mut Cursor::new(buf)),
        Err(Error::CorruptFile { .. })
    ));
}

#[test]
fn test_non_power_of_two_rejected_for_lattice() {
    let mut buf = Vec::new();
    let b = PackedBits::new(100);
    b.write_into(&mut buf).unwrap();
    assert!(matches!(
        LatticeSet::read_from(&mut Cursor::new(buf)),
        Err(Error::CorruptFile { .. })
    ));
}

#[test]
fn test_dense_width_marker_validated() {
    let mut buf = Vec::new();
    let b = PackedBits::new(64);
    b.write_dense(&mut buf).unwrap();
    // width marker is the fourth header word
    buf[24..32].copy_from_slice(&4u64.to_le_bytes());
    assert!(matches!(
        PackedBits::read_from(&mut Cursor::new(buf)),
        Err(Error::CorruptFile { .. })
    ));
}

#[test]
fn test_save_and_load_file() {
    let dir = std::env::temp_dir().join("divcore_serialize_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("set.bin");

    let s = LatticeSet::from_indices(8, &[0, 7, 200]).unwrap();
    s.save_to_file(&path).unwrap();
    let back = LatticeSet::load_from_file(&path).unwrap();
    assert_eq!(back, s);

    std::fs::remove_file(&path).ok();
}
