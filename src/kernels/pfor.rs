//! This module contains the PForDelta and OPTPForDelta frame-of-reference kernels.
//!
//! The input is cut into blocks of `block_size` values (the last block may be
//! shorter). Every block shares one bit width `b`; values that do not fit in `b`
//! bits are still packed (truncated to their low `b` bits) and their high parts
//! travel in an exception side-channel compressed with Simple16.
//!
//! # Block layout
//!
//! ```text
//! | header word | Simple16 exception words | b-bit codewords (word aligned) |
//!
//! header: bits[31:26] = b, bits[25:16] = exception count, bits[15:0] = exception words
//! ```
//!
//! The exception payload is `[gap_0 .. gap_k, high_0 - 1 .. high_k - 1]`, where
//! `gap_0` is the absolute position of the first exception, later gaps are the
//! distance from the previous exception, and `high_i = value >> b`.
//! `b = 32` stores the block raw and never carries exceptions.
//!
//! The two codecs differ only in how `b` is chosen:
//! * PForDelta takes the smallest candidate width whose exception count stays
//!   within `ceil(exception_ratio * len)`.
//! * OPTPForDelta computes the exact encoded size for every candidate width and
//!   keeps the cheapest one.

use crate::error::{CodecError, Result};
use crate::kernels::bitpack::{pack_words, packed_words, unpack_words};
use crate::kernels::{simple16, CodecKind, IntegerCodec};
use crate::utils::{max_bit_length, reserve, scratch_vec};

//==================================================================================
// 0. Constants
//==================================================================================

/// Candidate block widths, ascending.
pub const POSSIBLE_WIDTHS: [u32; 17] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 16, 20, 32];

/// The 10-bit exception count field.
pub const MAX_EXCEPTIONS: usize = (1 << 10) - 1;
/// The 16-bit exception word count field.
pub const MAX_EXCEPTION_WORDS: usize = (1 << 16) - 1;

pub const DEFAULT_BLOCK_SIZE: usize = 32;
pub const MAX_BLOCK_SIZE: usize = MAX_EXCEPTIONS;
pub const DEFAULT_EXCEPTION_RATIO: f64 = 0.1;

const WIDTH_SHIFT: u32 = 26;
const COUNT_SHIFT: u32 = 16;
const COUNT_MASK: u32 = 0x3FF;
const WORDS_MASK: u32 = 0xFFFF;

//==================================================================================
// 1. Width Selection
//==================================================================================

/// How a block's common bit width is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSelection {
    /// First width whose exception count is within the configured ratio.
    Threshold,
    /// Width minimizing the exact encoded block size.
    Optimal,
}

/// Builds the Simple16 exception payload for `block` at width `b`.
/// Returns `None` if a high part would not fit the Simple16 domain.
fn collect_exceptions(block: &[u32], b: u32) -> Option<Vec<u32>> {
    if b >= 32 {
        return Some(Vec::new());
    }
    let mut gaps = Vec::new();
    let mut highs = Vec::new();
    let mut prev = 0usize;
    for (pos, &v) in block.iter().enumerate() {
        let high = v >> b;
        if high == 0 {
            continue;
        }
        if high - 1 > simple16::MAX_VALUE {
            return None;
        }
        gaps.push((pos - prev) as u32);
        highs.push(high - 1);
        prev = pos;
    }
    gaps.extend(highs);
    Some(gaps)
}

fn exception_count(block: &[u32], b: u32) -> usize {
    if b >= 32 {
        return 0;
    }
    block.iter().filter(|&&v| v >> b != 0).count()
}

/// Smallest width at which every high part stays inside the Simple16 domain.
fn min_viable_width(block: &[u32]) -> u32 {
    max_bit_length(block).saturating_sub(simple16::PAYLOAD_BITS)
}

/// Exact encoded size in words of `block` at width `b`, or `None` when the
/// header fields cannot represent the exceptions.
pub fn try_width(block: &[u32], b: u32) -> Option<usize> {
    let exceptions = collect_exceptions(block, b)?;
    let count = exceptions.len() / 2;
    if count > MAX_EXCEPTIONS {
        return None;
    }
    let exception_words = simple16::encoded_words(&exceptions);
    if exception_words > MAX_EXCEPTION_WORDS {
        return None;
    }
    Some(1 + exception_words + packed_words(block.len(), b))
}

fn select_threshold(block: &[u32], ratio: f64) -> u32 {
    let allowed = allowed_exceptions(block.len(), ratio);
    let floor = min_viable_width(block);
    for &b in POSSIBLE_WIDTHS.iter().filter(|&&b| b >= floor) {
        if exception_count(block, b) <= allowed.min(MAX_EXCEPTIONS) && try_width(block, b).is_some() {
            return b;
        }
    }
    32
}

/// Exceptions a block of `len` values may carry under `ratio`; at least one.
fn allowed_exceptions(len: usize, ratio: f64) -> usize {
    ((ratio * len as f64).floor() as usize).max(1)
}

/// Ties on size go to the width with fewer exceptions, then to the narrower width.
fn select_optimal(block: &[u32]) -> u32 {
    let floor = min_viable_width(block);
    let mut best = (packed_words(block.len(), 32) + 1, 0usize, 32u32);
    for &b in POSSIBLE_WIDTHS.iter().filter(|&&b| b >= floor && b < 32) {
        if let Some(size) = try_width(block, b) {
            let candidate = (size, exception_count(block, b), b);
            if candidate < best {
                best = candidate;
            }
        }
    }
    best.2
}

//==================================================================================
// 2. Block Encode / Decode
//==================================================================================

/// Encodes one block at a forced width `b`, appending to `out`.
/// Returns words written.
///
/// # Errors
/// * `CodecError::CapacityExceeded` if the exceptions overflow the header fields.
/// * `CodecError::ValueOutOfDomain` if an exception's high part exceeds 28 bits.
pub fn encode_block(block: &[u32], b: u32, out: &mut Vec<u32>) -> Result<usize> {
    assert!(b <= 32, "bit width {} outside 0..=32", b);
    let exceptions = collect_exceptions(block, b).ok_or_else(|| {
        let value = block.iter().copied().max().unwrap_or(0);
        CodecError::ValueOutOfDomain {
            value,
            max_bits: b + simple16::PAYLOAD_BITS,
        }
    })?;
    let count = exceptions.len() / 2;
    if count > MAX_EXCEPTIONS {
        return Err(CodecError::CapacityExceeded {
            field: "exception_count",
            value: count,
            limit: MAX_EXCEPTIONS,
        });
    }

    let mut exception_words = Vec::new();
    simple16::encode(&exceptions, &mut exception_words)?;
    if exception_words.len() > MAX_EXCEPTION_WORDS {
        return Err(CodecError::CapacityExceeded {
            field: "exception_words",
            value: exception_words.len(),
            limit: MAX_EXCEPTION_WORDS,
        });
    }

    let start = out.len();
    reserve(out, 1 + exception_words.len() + packed_words(block.len(), b))?;
    out.push((b << WIDTH_SHIFT) | ((count as u32) << COUNT_SHIFT) | exception_words.len() as u32);
    out.extend_from_slice(&exception_words);
    pack_words(block, b, out);
    Ok(out.len() - start)
}

/// Decodes one block of `out.len()` values from the front of `input`.
/// Returns words consumed.
pub fn decode_block(input: &[u32], out: &mut [u32]) -> Result<usize> {
    let header = *input.first().ok_or(CodecError::UnexpectedEndOfStream {
        needed: 1,
        available: 0,
    })?;
    let b = header >> WIDTH_SHIFT;
    let count = ((header >> COUNT_SHIFT) & COUNT_MASK) as usize;
    let words = (header & WORDS_MASK) as usize;
    if b > 32 {
        return Err(CodecError::InvalidHeader(format!("block width {} > 32", b)));
    }
    if b == 32 && count > 0 {
        return Err(CodecError::InvalidHeader(
            "raw block must not carry exceptions".to_string(),
        ));
    }
    if count > out.len() {
        return Err(CodecError::InvalidHeader(format!(
            "{} exceptions in a block of {}",
            count,
            out.len()
        )));
    }
    let exception_end = 1 + words;
    if input.len() < exception_end {
        return Err(CodecError::UnexpectedEndOfStream {
            needed: exception_end,
            available: input.len(),
        });
    }

    let mut exceptions: Vec<u32> = scratch_vec(2 * count)?;
    let used = simple16::decode(&input[1..exception_end], &mut exceptions)?;
    if used != words {
        return Err(CodecError::CorruptStream(format!(
            "exception stream used {} of {} words",
            used, words
        )));
    }

    let packed = unpack_words(&input[exception_end..], b, out)?;

    let (gaps, highs) = exceptions.split_at(count);
    let mut pos = 0usize;
    for (i, (&gap, &high)) in gaps.iter().zip(highs).enumerate() {
        if i > 0 && gap == 0 {
            return Err(CodecError::CorruptStream("repeated exception position".to_string()));
        }
        pos += gap as usize;
        let slot = out.get_mut(pos).ok_or_else(|| {
            CodecError::CorruptStream(format!("exception position {} out of block", pos))
        })?;
        let restored = (u64::from(high) + 1) << b;
        if restored > u64::from(u32::MAX) {
            return Err(CodecError::CorruptStream(format!(
                "exception at {} overflows 32 bits",
                pos
            )));
        }
        *slot |= restored as u32;
    }
    Ok(exception_end + packed)
}

//==================================================================================
// 3. The Codec
//==================================================================================

/// PForDelta / OPTPForDelta, depending on `selection`.
#[derive(Debug, Clone)]
pub struct PForDelta {
    block_size: usize,
    exception_ratio: f64,
    selection: WidthSelection,
}

impl Default for PForDelta {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            exception_ratio: DEFAULT_EXCEPTION_RATIO,
            selection: WidthSelection::Threshold,
        }
    }
}

impl PForDelta {
    /// Plain PForDelta with a threshold width heuristic.
    pub fn new(block_size: usize, exception_ratio: f64) -> Result<Self> {
        validate_block_size(block_size)?;
        if !(exception_ratio > 0.0 && exception_ratio <= 1.0) {
            return Err(CodecError::InvalidConfig(format!(
                "exception ratio {} outside (0, 1]",
                exception_ratio
            )));
        }
        Ok(Self {
            block_size,
            exception_ratio,
            selection: WidthSelection::Threshold,
        })
    }

    /// OPTPForDelta: exact-size width search.
    pub fn optimal(block_size: usize) -> Result<Self> {
        validate_block_size(block_size)?;
        Ok(Self {
            block_size,
            exception_ratio: DEFAULT_EXCEPTION_RATIO,
            selection: WidthSelection::Optimal,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The width this codec would choose for `block`.
    pub fn select_width(&self, block: &[u32]) -> u32 {
        match self.selection {
            WidthSelection::Threshold => select_threshold(block, self.exception_ratio),
            WidthSelection::Optimal => select_optimal(block),
        }
    }
}

fn validate_block_size(block_size: usize) -> Result<()> {
    if block_size == 0 || block_size > MAX_BLOCK_SIZE {
        return Err(CodecError::InvalidConfig(format!(
            "block size {} outside 1..={}",
            block_size, MAX_BLOCK_SIZE
        )));
    }
    Ok(())
}

impl IntegerCodec for PForDelta {
    fn kind(&self) -> CodecKind {
        match self.selection {
            WidthSelection::Threshold => CodecKind::PForDelta,
            WidthSelection::Optimal => CodecKind::OptPForDelta,
        }
    }

    fn encode_array(&self, input: &[u32], output: &mut Vec<u32>) -> Result<usize> {
        let start = output.len();
        let mut exceptions = 0usize;
        for block in input.chunks(self.block_size) {
            let b = self.select_width(block);
            exceptions += exception_count(block, b);
            log::trace!("pfor block: len={} b={}", block.len(), b);
            encode_block(block, b, output)?;
        }
        let written = output.len() - start;
        log_metric!(
            "event" = "pfor_encode",
            "codec" = self.kind(),
            "values" = input.len(),
            "exceptions" = exceptions,
            "words" = written
        );
        Ok(written)
    }

    fn decode_array(&self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let mut consumed = 0usize;
        for block in output.chunks_mut(self.block_size) {
            consumed += decode_block(&input[consumed..], block)?;
        }
        Ok(consumed)
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(codec: &PForDelta, input: &[u32]) -> Vec<u32> {
        let mut encoded = Vec::new();
        let written = codec.encode_array(input, &mut encoded).unwrap();
        assert_eq!(written, encoded.len());
        let mut decoded = vec![0u32; input.len()];
        let consumed = codec.decode_array(&encoded, &mut decoded).unwrap();
        assert_eq!(consumed, encoded.len());
        decoded
    }

    #[test]
    fn test_single_outlier_becomes_sole_exception() {
        let input = [0u32, 1, 2, 3, 4, 5, 6, 1_000_000];
        for codec in [PForDelta::new(8, 0.1).unwrap(), PForDelta::optimal(8).unwrap()] {
            assert_eq!(codec.select_width(&input), 3);
            let mut encoded = Vec::new();
            codec.encode_array(&input, &mut encoded).unwrap();
            let header = encoded[0];
            assert_eq!(header >> 26, 3);
            assert_eq!((header >> 16) & 0x3FF, 1);
            assert_eq!(roundtrip(&codec, &input), input);
        }
    }

    #[test]
    fn test_threshold_keeps_exceptions_within_ratio() {
        assert_eq!(allowed_exceptions(32, 0.1), 3);
        assert_eq!(allowed_exceptions(8, 0.1), 1);
        assert_eq!(allowed_exceptions(1, 0.1), 1);

        let codec = PForDelta::default();
        let mut block = vec![1u32; 32];
        for slot in block.iter_mut().step_by(8) {
            *slot = 1000;
        }
        // Four outliers are 12.5% of the block: widen instead of excepting them.
        assert_eq!(codec.select_width(&block), 10);
        block[0] = 1;
        assert_eq!(codec.select_width(&block), 1);
        assert_eq!(roundtrip(&codec, &block), block);
    }

    #[test]
    fn test_no_exceptions_and_all_exceptions() {
        let codec = PForDelta::new(32, 0.1).unwrap();
        let small: Vec<u32> = (0..32).map(|i| i % 4).collect();
        assert_eq!(roundtrip(&codec, &small), small);

        // Every value is an exception at width 0.
        let block: Vec<u32> = (1..=32).collect();
        let mut encoded = Vec::new();
        encode_block(&block, 0, &mut encoded).unwrap();
        assert_eq!((encoded[0] >> 16) & 0x3FF, 32);
        let mut decoded = vec![0u32; 32];
        decode_block(&encoded, &mut decoded).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_raw_block_for_full_width_values() {
        let codec = PForDelta::optimal(16).unwrap();
        let input = vec![u32::MAX; 16];
        let mut encoded = Vec::new();
        codec.encode_array(&input, &mut encoded).unwrap();
        assert_eq!(encoded[0] >> 26, 32);
        assert_eq!(encoded.len(), 17);
        assert_eq!(roundtrip(&codec, &input), input);
    }

    #[test]
    fn test_partial_last_block_and_empty_input() {
        let codec = PForDelta::optimal(32).unwrap();
        let input: Vec<u32> = (0..77u32).map(|i| i * i).collect();
        assert_eq!(roundtrip(&codec, &input), input);
        assert!(roundtrip(&codec, &[]).is_empty());
    }

    #[test]
    fn test_optimal_is_never_larger_than_threshold() {
        let input: Vec<u32> = (0..512u32)
            .map(|i| if i % 13 == 0 { i * 7919 } else { i % 9 })
            .collect();
        let mut plain = Vec::new();
        PForDelta::new(128, 0.1).unwrap().encode_array(&input, &mut plain).unwrap();
        let mut opt = Vec::new();
        PForDelta::optimal(128).unwrap().encode_array(&input, &mut opt).unwrap();
        assert!(opt.len() <= plain.len());
    }

    #[test]
    fn test_forced_width_exceeding_simple16_domain() {
        let err = encode_block(&[u32::MAX], 0, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CodecError::ValueOutOfDomain { .. }));
    }

    #[test]
    fn test_forced_width_exceeding_exception_capacity() {
        let block = vec![1u32; 2000];
        let err = encode_block(&block, 0, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::CapacityExceeded { field: "exception_count", value: 2000, limit: 1023 }
        ));
    }

    #[test]
    fn test_invalid_block_size_rejected() {
        assert!(PForDelta::new(0, 0.1).is_err());
        assert!(PForDelta::optimal(MAX_BLOCK_SIZE + 1).is_err());
        assert!(PForDelta::new(32, 0.0).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_header() {
        let mut out = vec![0u32; 4];
        assert!(matches!(
            decode_block(&[33 << 26], &mut out),
            Err(CodecError::InvalidHeader(_))
        ));
        assert!(matches!(
            decode_block(&[(32 << 26) | (1 << 16)], &mut out),
            Err(CodecError::InvalidHeader(_))
        ));
        assert!(matches!(
            decode_block(&[], &mut out),
            Err(CodecError::UnexpectedEndOfStream { .. })
        ));
    }
}
