//! This module contains the fixed-width bit-packing kernels shared by PForDelta,
//! VSEncoding and VSE-R.
//!
//! Every width `0..=32` gets its own monomorphized routine through a `const`
//! generic parameter, and the runtime width is mapped onto those instances by the
//! `dispatch_width!` macro. The hot path packs groups of 32 values, which at `B`
//! bits per value always fill exactly `B` words, so each group is word aligned
//! and the compiler can fully unroll the inner loop. Tails shorter than 32
//! values go through the generic `BitWriter`/`BitReader`.
//!
//! The layout is identical to writing each value with `BitWriter::write(v, B)`:
//! most-significant bit first, fields straddling word boundaries as needed.

use crate::error::{CodecError, Result};
use crate::kernels::bitstream::{BitReader, BitWriter};
use crate::utils::{low_mask, words_for_bits};

/// Values per fully-unrolled group.
pub const GROUP: usize = 32;

/// Expands a runtime bit width into a call of the matching `const`-generic
/// instance of `$func`.
macro_rules! dispatch_width {
    ($bits:expr, $func:ident ( $($arg:expr),* $(,)? )) => {
        match $bits {
            0 => $func::<0>($($arg),*),
            1 => $func::<1>($($arg),*),
            2 => $func::<2>($($arg),*),
            3 => $func::<3>($($arg),*),
            4 => $func::<4>($($arg),*),
            5 => $func::<5>($($arg),*),
            6 => $func::<6>($($arg),*),
            7 => $func::<7>($($arg),*),
            8 => $func::<8>($($arg),*),
            9 => $func::<9>($($arg),*),
            10 => $func::<10>($($arg),*),
            11 => $func::<11>($($arg),*),
            12 => $func::<12>($($arg),*),
            13 => $func::<13>($($arg),*),
            14 => $func::<14>($($arg),*),
            15 => $func::<15>($($arg),*),
            16 => $func::<16>($($arg),*),
            17 => $func::<17>($($arg),*),
            18 => $func::<18>($($arg),*),
            19 => $func::<19>($($arg),*),
            20 => $func::<20>($($arg),*),
            21 => $func::<21>($($arg),*),
            22 => $func::<22>($($arg),*),
            23 => $func::<23>($($arg),*),
            24 => $func::<24>($($arg),*),
            25 => $func::<25>($($arg),*),
            26 => $func::<26>($($arg),*),
            27 => $func::<27>($($arg),*),
            28 => $func::<28>($($arg),*),
            29 => $func::<29>($($arg),*),
            30 => $func::<30>($($arg),*),
            31 => $func::<31>($($arg),*),
            32 => $func::<32>($($arg),*),
            other => panic!("bit width {} outside 0..=32", other),
        }
    };
}

//==================================================================================
// 1. Generic Core Logic (one instance per width)
//==================================================================================

/// Packs exactly 32 values into `B` words. Bits above `B` are discarded.
#[inline(always)]
fn pack_group<const B: u32>(input: &[u32], out: &mut [u32]) {
    debug_assert_eq!(input.len(), GROUP);
    debug_assert_eq!(out.len(), B as usize);
    if B == 0 {
        return;
    }
    out.fill(0);
    let mask = low_mask(B);
    for (i, &raw) in input.iter().enumerate() {
        let v = raw & mask;
        let bit = i * B as usize;
        let w = bit / 32;
        let off = (bit % 32) as u32;
        if off + B <= 32 {
            out[w] |= ((v as u64) << (32 - off - B)) as u32;
        } else {
            let spill = off + B - 32;
            out[w] |= v >> spill;
            out[w + 1] |= ((v as u64) << (32 - spill)) as u32;
        }
    }
}

/// Unpacks 32 values from `B` words.
#[inline(always)]
fn unpack_group<const B: u32>(input: &[u32], out: &mut [u32]) {
    debug_assert_eq!(input.len(), B as usize);
    debug_assert_eq!(out.len(), GROUP);
    if B == 0 {
        out.fill(0);
        return;
    }
    let mask = u64::from(low_mask(B));
    for (i, slot) in out.iter_mut().enumerate() {
        let bit = i * B as usize;
        let w = bit / 32;
        let off = (bit % 32) as u32;
        let hi = u64::from(input[w]) << 32;
        let lo = if off + B > 32 { u64::from(input[w + 1]) } else { 0 };
        *slot = (((hi | lo) >> (64 - off - B)) & mask) as u32;
    }
}

fn pack_words_fixed<const B: u32>(values: &[u32], out: &mut Vec<u32>) -> usize {
    let start = out.len();
    let mut groups = values.chunks_exact(GROUP);
    for group in &mut groups {
        let at = out.len();
        out.resize(at + B as usize, 0);
        pack_group::<B>(group, &mut out[at..]);
    }
    let tail = groups.remainder();
    if !tail.is_empty() {
        let mut writer = BitWriter::new(out);
        for &v in tail {
            writer.write(v, B);
        }
        writer.flush();
    }
    out.len() - start
}

fn unpack_words_fixed<const B: u32>(input: &[u32], out: &mut [u32]) -> Result<()> {
    let mut src = 0usize;
    let mut groups = out.chunks_exact_mut(GROUP);
    for group in &mut groups {
        unpack_group::<B>(&input[src..src + B as usize], group);
        src += B as usize;
    }
    let tail = groups.into_remainder();
    if !tail.is_empty() {
        let mut reader = BitReader::new(&input[src..]);
        for slot in tail.iter_mut() {
            *slot = reader.read(B)?;
        }
    }
    Ok(())
}

fn pack_stream_fixed<const B: u32>(values: &[u32], writer: &mut BitWriter) {
    for &v in values {
        writer.write(v, B);
    }
}

fn unpack_stream_fixed<const B: u32>(reader: &mut BitReader, out: &mut [u32]) -> Result<()> {
    for slot in out.iter_mut() {
        *slot = reader.read(B)?;
    }
    Ok(())
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Number of words `count` values occupy at `bits` bits each.
#[inline]
pub fn packed_words(count: usize, bits: u32) -> usize {
    words_for_bits(count as u64 * u64::from(bits))
}

/// Packs `values` at `bits` bits each into a fresh, word-aligned region appended
/// to `out`. Returns the number of words written.
///
/// Values wider than `bits` are truncated to their low bits; callers that need
/// the high bits (PForDelta exceptions) carry them separately.
pub fn pack_words(values: &[u32], bits: u32, out: &mut Vec<u32>) -> usize {
    assert!(bits <= 32, "bit width {} outside 0..=32", bits);
    dispatch_width!(bits, pack_words_fixed(values, out))
}

/// Unpacks `out.len()` values of `bits` bits from the start of `input`.
/// Returns the number of words consumed.
///
/// # Errors
/// `CodecError::UnexpectedEndOfStream` if `input` is shorter than the packed region.
pub fn unpack_words(input: &[u32], bits: u32, out: &mut [u32]) -> Result<usize> {
    let needed = packed_words(out.len(), bits);
    if input.len() < needed {
        return Err(CodecError::UnexpectedEndOfStream {
            needed,
            available: input.len(),
        });
    }
    if bits > 32 {
        return Err(CodecError::InvalidHeader(format!("bit width {} > 32", bits)));
    }
    dispatch_width!(bits, unpack_words_fixed(&input[..needed], out))?;
    Ok(needed)
}

/// Writes `values` at `bits` bits each into an in-progress bit stream.
pub fn pack_stream(values: &[u32], bits: u32, writer: &mut BitWriter) {
    assert!(bits <= 32, "bit width {} outside 0..=32", bits);
    dispatch_width!(bits, pack_stream_fixed(values, writer))
}

/// Reads `out.len()` values of `bits` bits each from an in-progress bit stream.
pub fn unpack_stream(reader: &mut BitReader, bits: u32, out: &mut [u32]) -> Result<()> {
    if bits > 32 {
        return Err(CodecError::InvalidHeader(format!("bit width {} > 32", bits)));
    }
    dispatch_width!(bits, unpack_stream_fixed(reader, out))
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
