//! This module contains the word-aligned bit writer and reader that every other
//! kernel in this crate is built on.
//!
//! Fields are packed **most-significant-bit first**: the first field written
//! occupies the highest bits of the first word. Both sides buffer through a
//! 64-bit accumulator, so a field of up to 32 bits can straddle a word boundary
//! without special casing at the call site.
//!
//! The reader is a bounds-checked cursor over a `&[u32]` slice. Running off the
//! end of the slice is reported as `CodecError::UnexpectedEndOfStream` rather
//! than reading foreign memory.

use crate::error::{CodecError, Result};
use crate::utils::low_mask;

//==================================================================================
// 1. BitWriter
//==================================================================================

/// Appends bit fields to a caller-owned word buffer.
///
/// The writer borrows the output vector for its lifetime and only ever appends
/// to it; words already present before `new` are left untouched.
pub struct BitWriter<'a> {
    out: &'a mut Vec<u32>,
    start: usize,
    acc: u64,
    fill: u32,
}

impl<'a> BitWriter<'a> {
    pub fn new(out: &'a mut Vec<u32>) -> Self {
        let start = out.len();
        Self {
            out,
            start,
            acc: 0,
            fill: 0,
        }
    }

    /// Appends the low `bits` bits of `value`.
    #[inline]
    pub fn write(&mut self, value: u32, bits: u32) {
        debug_assert!(bits <= 32, "bit count {} outside 0..=32", bits);
        if bits == 0 {
            return;
        }
        self.acc = (self.acc << bits) | u64::from(value & low_mask(bits));
        self.fill += bits;
        if self.fill >= 32 {
            self.fill -= 32;
            self.out.push((self.acc >> self.fill) as u32);
            self.acc &= (1u64 << self.fill) - 1;
        }
    }

    /// Zero-pads and emits any partial word.
    ///
    /// Returns the number of words written by this writer so far.
    pub fn flush(&mut self) -> usize {
        if self.fill > 0 {
            self.out.push((self.acc << (32 - self.fill)) as u32);
            self.acc = 0;
            self.fill = 0;
        }
        self.out.len() - self.start
    }

    /// Total bits written, including the buffered partial word.
    pub fn bits_written(&self) -> u64 {
        (self.out.len() - self.start) as u64 * 32 + u64::from(self.fill)
    }
}

//==================================================================================
// 2. BitReader
//==================================================================================

/// Reads bit fields from a compressed word slice.
pub struct BitReader<'a> {
    input: &'a [u32],
    pos: usize,
    acc: u64,
    avail: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(input: &'a [u32]) -> Self {
        Self {
            input,
            pos: 0,
            acc: 0,
            avail: 0,
        }
    }

    /// Reads the next `bits`-bit unsigned field.
    #[inline]
    pub fn read(&mut self, bits: u32) -> Result<u32> {
        debug_assert!(bits <= 32, "bit count {} outside 0..=32", bits);
        if bits == 0 {
            return Ok(0);
        }
        if self.avail < bits {
            let word = *self
                .input
                .get(self.pos)
                .ok_or(CodecError::UnexpectedEndOfStream {
                    needed: self.pos + 1,
                    available: self.input.len(),
                })?;
            self.acc = (self.acc << 32) | u64::from(word);
            self.avail += 32;
            self.pos += 1;
        }
        self.avail -= bits;
        let value = (self.acc >> self.avail) as u32 & low_mask(bits);
        self.acc &= (1u64 << self.avail) - 1;
        Ok(value)
    }

    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read(1)? == 1)
    }

    /// Discards the unread remainder of the current word.
    pub fn align(&mut self) {
        self.acc = 0;
        self.avail = 0;
    }

    /// Words touched so far (a partially read word counts as consumed).
    pub fn words_consumed(&self) -> usize {
        self.pos
    }

    /// Words not yet touched by the reader.
    pub fn remaining_words(&self) -> &'a [u32] {
        &self.input[self.pos..]
    }
}
