//! This module contains the Simple16 word-aligned packer.
//!
//! Each output word carries a 4-bit descriptor id in bits `[31:28]` and a 28-bit
//! payload laid out according to that descriptor's `(count, width)` schedule,
//! most-significant slot first. The encoder tries the sixteen descriptors in
//! order of decreasing value count and takes the first one whose slots can hold
//! the remaining input prefix, so every word packs as many values as the table
//! allows for that prefix.
//!
//! Near the end of the input a descriptor may have more slots than values left;
//! the unused slots are zero-filled and the decoder stops at the requested count.
//!
//! Simple16 only represents values below `2^28`. Wider values are rejected with
//! `CodecError::ValueOutOfDomain`.

use crate::error::{CodecError, Result};
use crate::kernels::{CodecKind, IntegerCodec};
use crate::utils::{bit_length, low_mask};

/// Payload bits available per word.
pub const PAYLOAD_BITS: u32 = 28;

/// Largest value Simple16 can carry in a single slot.
pub const MAX_VALUE: u32 = (1 << PAYLOAD_BITS) - 1;

/// One Simple16 layout: runs of `(count, width)` slots, highest bits first.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub runs: &'static [(u8, u8)],
    pub total: u8,
}

const fn descriptor(runs: &'static [(u8, u8)]) -> Descriptor {
    let mut total = 0u8;
    let mut i = 0;
    while i < runs.len() {
        total += runs[i].0;
        i += 1;
    }
    Descriptor { runs, total }
}

/// The sixteen layouts, ordered by decreasing number of values per word.
pub static DESCRIPTORS: [Descriptor; 16] = [
    descriptor(&[(28, 1)]),
    descriptor(&[(7, 2), (14, 1)]),
    descriptor(&[(7, 1), (7, 2), (7, 1)]),
    descriptor(&[(14, 1), (7, 2)]),
    descriptor(&[(14, 2)]),
    descriptor(&[(1, 4), (8, 3)]),
    descriptor(&[(1, 3), (4, 4), (3, 3)]),
    descriptor(&[(7, 4)]),
    descriptor(&[(4, 5), (2, 4)]),
    descriptor(&[(2, 4), (4, 5)]),
    descriptor(&[(3, 6), (2, 5)]),
    descriptor(&[(2, 5), (3, 6)]),
    descriptor(&[(4, 7)]),
    descriptor(&[(1, 10), (2, 9)]),
    descriptor(&[(2, 14)]),
    descriptor(&[(1, 28)]),
];

//==================================================================================
// 1. Core Logic
//==================================================================================

/// Returns true if `descriptor` can hold the leading values of `input`
/// (up to its slot count, or fewer at the end of the input).
fn fits(descriptor: &Descriptor, input: &[u32]) -> bool {
    let mut values = input.iter();
    for &(count, width) in descriptor.runs {
        for _ in 0..count {
            match values.next() {
                Some(&v) if bit_length(v) > u32::from(width) => return false,
                Some(_) => {}
                None => return true,
            }
        }
    }
    true
}

/// Picks the descriptor for the next word. `input` must be non-empty and every
/// value must be `<= MAX_VALUE`, which guarantees descriptor 15 matches.
pub fn select_descriptor(input: &[u32]) -> usize {
    DESCRIPTORS
        .iter()
        .position(|d| fits(d, input))
        .unwrap_or(DESCRIPTORS.len() - 1)
}

/// Packs the next word from the front of `input`. Returns `(word, consumed)`.
pub fn pack_word(input: &[u32]) -> (u32, usize) {
    let id = select_descriptor(input);
    let d = &DESCRIPTORS[id];
    let mut word = (id as u32) << PAYLOAD_BITS;
    let mut shift = PAYLOAD_BITS;
    let mut values = input.iter();
    for &(count, width) in d.runs {
        let width = u32::from(width);
        for _ in 0..count {
            shift -= width;
            let v = values.next().copied().unwrap_or(0);
            word |= (v & low_mask(width)) << shift;
        }
    }
    (word, (d.total as usize).min(input.len()))
}

/// Unpacks one word into `out`, writing at most `out.len()` values.
/// Returns the number of values written.
pub fn unpack_word(word: u32, out: &mut [u32]) -> Result<usize> {
    let id = word >> PAYLOAD_BITS;
    let d = DESCRIPTORS
        .get(id as usize)
        .ok_or(CodecError::InvalidDescriptor(id))?;
    let mut shift = PAYLOAD_BITS;
    let mut produced = 0usize;
    for &(count, width) in d.runs {
        let width = u32::from(width);
        for _ in 0..count {
            shift -= width;
            if produced == out.len() {
                return Ok(produced);
            }
            out[produced] = (word >> shift) & low_mask(width);
            produced += 1;
        }
    }
    Ok(produced)
}

/// Encodes all of `input`, appending words to `output`. Returns words written.
///
/// # Errors
/// `CodecError::ValueOutOfDomain` if any value needs more than 28 bits.
pub fn encode(input: &[u32], output: &mut Vec<u32>) -> Result<usize> {
    if let Some(&bad) = input.iter().find(|&&v| v > MAX_VALUE) {
        return Err(CodecError::ValueOutOfDomain {
            value: bad,
            max_bits: PAYLOAD_BITS,
        });
    }
    let start = output.len();
    output.try_reserve(input.len() / 2 + 1)?;
    let mut pos = 0usize;
    while pos < input.len() {
        let (word, consumed) = pack_word(&input[pos..]);
        output.push(word);
        pos += consumed;
    }
    Ok(output.len() - start)
}

/// Decodes exactly `output.len()` values from `input`. Returns words consumed.
pub fn decode(input: &[u32], output: &mut [u32]) -> Result<usize> {
    let mut produced = 0usize;
    let mut consumed = 0usize;
    while produced < output.len() {
        let word = *input
            .get(consumed)
            .ok_or(CodecError::UnexpectedEndOfStream {
                needed: consumed + 1,
                available: input.len(),
            })?;
        produced += unpack_word(word, &mut output[produced..])?;
        consumed += 1;
    }
    Ok(consumed)
}

/// Number of words `encode` would emit for `input`, without writing them.
pub fn encoded_words(input: &[u32]) -> usize {
    let mut pos = 0usize;
    let mut words = 0usize;
    while pos < input.len() {
        let id = select_descriptor(&input[pos..]);
        pos += (DESCRIPTORS[id].total as usize).min(input.len() - pos);
        words += 1;
    }
    words
}

//==================================================================================
// 2. IntegerCodec Adapter
//==================================================================================

/// The standalone Simple16 codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct Simple16;

impl IntegerCodec for Simple16 {
    fn kind(&self) -> CodecKind {
        CodecKind::Simple16
    }

    fn encode_array(&self, input: &[u32], output: &mut Vec<u32>) -> Result<usize> {
        encode(input, output)
    }

    fn decode_array(&self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        decode(input, output)
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
