// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Binary persistence for [`PackedBits`].
//!
//! Two magic-tagged little-endian layouts:
//!
//! - Sparse: `[tag][len][count][elem_width][count * elem_width bytes of
//!   sorted support indices][end marker]`, where `elem_width` is the
//!   smallest of 1/2/4/8 bytes that fits any index below `len`.
//! - Dense: `[tag][len][word_count][8][word_count * 8 bytes of raw
//!   words][end marker]`.
//!
//! The writer picks sparse whenever its payload is smaller; both forms can
//! also be forced. The loader rejects unknown tags, inconsistent sizes and
//! missing end markers with [`Error::CorruptFile`].

use super::{word_count, PackedBits};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Format tag for the sparse (support list) encoding.
pub const TAG_SPARSE: u64 = 0x1c674e0bf03fea6f;
/// Format tag for the dense (raw words) encoding.
pub const TAG_DENSE: u64 = 0x556483ae0da9468f;
/// Trailing marker closing every serialized block.
pub const MARKER_END: u64 = 0x6891a2b5f8bb0b7c;

/// Smallest element byte width that fits every index below `len`.
pub(crate) fn elem_width(len: u64) -> u64 {
    if len < 1 << 8 {
        1
    } else if len < 1 << 16 {
        2
    } else if len < 1 << 32 {
        4
    } else {
        8
    }
}

fn write_u64<W: Write>(w: &mut W, v: u64) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

impl PackedBits {
    /// Write in whichever encoding is smaller for this set.
    pub fn write_into<W: Write>(&self, w: &mut W) -> Result<()> {
        let supp = self.support();
        if supp.len() as u64 * elem_width(self.len) < self.word_len() as u64 * 8 {
            self.write_sparse_support(w, &supp)
        } else {
            self.write_dense(w)
        }
    }

    /// Write in the sparse (support list) encoding regardless of size.
    pub fn write_sparse<W: Write>(&self, w: &mut W) -> Result<()> {
        self.write_sparse_support(w, &self.support())
    }

    fn write_sparse_support<W: Write>(&self, w: &mut W, supp: &[u64]) -> Result<()> {
        let width = elem_width(self.len);
        write_u64(w, TAG_SPARSE)?;
        write_u64(w, self.len)?;
        write_u64(w, supp.len() as u64)?;
        write_u64(w, width)?;
        for &x in supp {
            w.write_all(&x.to_le_bytes()[..width as usize])?;
        }
        write_u64(w, MARKER_END)
    }

    /// Write in the dense (raw words) encoding regardless of size.
    pub fn write_dense<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, TAG_DENSE)?;
        write_u64(w, self.len)?;
        write_u64(w, self.word_len() as u64)?;
        write_u64(w, 8)?;
        for &word in self.words() {
            write_u64(w, word)?;
        }
        write_u64(w, MARKER_END)
    }

    /// Read back a set written by any of the `write_*` methods.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let tag = read_u64(r)?;
        let len = read_u64(r)?;
        let count = read_u64(r)?;
        let width = read_u64(r)?;

        let mut res = PackedBits::new(len);
        match tag {
            TAG_SPARSE => {
                if !matches!(width, 1 | 2 | 4 | 8) {
                    return Err(Error::CorruptFile {
                        reason: "unsupported sparse element width",
                    });
                }
                for _ in 0..count {
                    let mut buf = [0u8; 8];
                    r.read_exact(&mut buf[..width as usize])?;
                    let x = u64::from_le_bytes(buf);
                    res.set(x).map_err(|_| Error::CorruptFile {
                        reason: "support index past declared length",
                    })?;
                }
            }
            TAG_DENSE => {
                if width != 8 {
                    return Err(Error::CorruptFile {
                        reason: "dense width marker is not 8",
                    });
                }
                if count as usize != word_count(len) {
                    return Err(Error::CorruptFile {
                        reason: "dense word count does not match length",
                    });
                }
                for w in res.words_mut() {
                    *w = read_u64(r)?;
                }
                let tail = len & 0x3f;
                if tail != 0 {
                    if let Some(&last) = res.words().last() {
                        if last >> tail != 0 {
                            return Err(Error::CorruptFile {
                                reason: "set bits past declared length",
                            });
                        }
                    }
                }
            }
            _ => {
                return Err(Error::CorruptFile {
                    reason: "unknown format tag",
                });
            }
        }

        if read_u64(r)? != MARKER_END {
            return Err(Error::CorruptFile {
                reason: "missing end marker",
            });
        }
        Ok(res)
    }

    /// Save to a file, auto-choosing the encoding.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_into(&mut w)?;
        w.flush()?;
        Ok(())
    }

    /// Load from a file written by [`PackedBits::save_to_file`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut r = BufReader::new(File::open(path)?);
        Self::read_from(&mut r)
    }
}
