//! This module provides a set of shared, low-level utility functions used
//! throughout the codec kernels.
//!
//! Its primary responsibilities include:
//! 1.  Computing the bit-length of a value with the portable leading-zero count.
//! 2.  Allocating call-local scratch buffers fallibly, so that allocation
//!     failure surfaces as a `CodecError` instead of an abort.
//! 3.  Marshalling `u32` words to and from little-endian byte buffers.

use crate::error::{CodecError, Result};

//==================================================================================
// 1. Bit-Length Helpers
//==================================================================================

/// Returns the number of bits needed to represent `value`, i.e. `ceil(log2(value + 1))`.
///
/// Zero maps to zero.
#[inline]
pub fn bit_length(value: u32) -> u32 {
    32 - value.leading_zeros()
}

/// Returns the largest bit-length found in `values` (zero for an empty slice).
#[inline]
pub fn max_bit_length(values: &[u32]) -> u32 {
    bit_length(values.iter().fold(0, |acc, &v| acc | v))
}

/// Mask of the low `bits` bits, valid for `bits` in `0..=32`.
#[inline]
pub fn low_mask(bits: u32) -> u32 {
    debug_assert!(bits <= 32);
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Number of 32-bit words needed to hold `bits` bits.
#[inline]
pub fn words_for_bits(bits: u64) -> usize {
    bits.div_ceil(32) as usize
}

//==================================================================================
// 2. Scratch Allocation
//==================================================================================

/// Allocates a zero-filled scratch vector of `len` elements.
///
/// Uses `try_reserve_exact` so that an allocation failure is reported as
/// `CodecError::Allocation`, which the caller can recover from by chunking.
pub fn scratch_vec<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, T::default());
    Ok(v)
}

/// Reserves room for `additional` more elements in `buf`, fallibly.
pub fn reserve(buf: &mut Vec<u32>, additional: usize) -> Result<()> {
    buf.try_reserve(additional)?;
    Ok(())
}

//==================================================================================
// 3. Word <-> Byte Marshalling
//==================================================================================

/// Serializes words as little-endian bytes, appending to `out`.
pub fn words_to_le_bytes(words: &[u32], out: &mut Vec<u8>) {
    out.reserve(words.len() * 4);
    for &w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
}

/// Parses a little-endian byte buffer back into words.
///
/// # Errors
/// Returns `CodecError::FrameFormat` if the length is not a multiple of four.
pub fn le_bytes_to_words(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return Err(CodecError::FrameFormat(format!(
            "payload length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    let mut words = Vec::new();
    words.try_reserve_exact(bytes.len() / 4)?;
    words.extend(
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])),
    );
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_length_edges() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(2), 2);
        assert_eq!(bit_length(255), 8);
        assert_eq!(bit_length(256), 9);
        assert_eq!(bit_length(u32::MAX), 32);
        assert_eq!(max_bit_length(&[]), 0);
        assert_eq!(max_bit_length(&[3, 17, 4]), 5);
    }

    #[test]
    fn test_low_mask() {
        assert_eq!(low_mask(0), 0);
        assert_eq!(low_mask(5), 0b11111);
        assert_eq!(low_mask(32), u32::MAX);
    }

    #[test]
    fn test_word_byte_roundtrip() {
        let words = vec![0x0102_0304, 0, u32::MAX];
        let mut bytes = Vec::new();
        words_to_le_bytes(&words, &mut bytes);
        assert_eq!(&bytes[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(le_bytes_to_words(&bytes).unwrap(), words);
        assert!(le_bytes_to_words(&bytes[..5]).is_err());
    }
}
