//! This module contains VSEncodingNaive, the simplest consumer of the partition
//! engine.
//!
//! Every value's bit length is rounded up to one of sixteen representable
//! widths, the resulting weights are partitioned with the unaligned cost model,
//! and each block is written inline into a single bit stream as
//!
//! ```text
//! | codeLog: 4 bits | codeLen: 3 bits | len values at LOG_REMAP[codeLog] bits |
//! ```
//!
//! There is no end-of-stream marker: the decoder stops once the caller's output
//! slice is full.

use crate::error::{CodecError, Result};
use crate::kernels::bitpack::{pack_stream, unpack_stream};
use crate::kernels::bitstream::{BitReader, BitWriter};
use crate::kernels::partition::{self, BlockCost, PartitionParams};
use crate::kernels::{CodecKind, IntegerCodec};
use crate::utils::{bit_length, reserve, scratch_vec};

/// Representable block widths, indexed by `codeLog`.
pub const LOG_REMAP: [u32; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 16, 20, 32];

/// Block lengths, indexed by `codeLen`.
pub const LENGTHS: [usize; 8] = [1, 2, 4, 6, 8, 16, 32, 64];

pub const CODE_LOG_BITS: u32 = 4;
pub const CODE_LEN_BITS: u32 = 3;

/// `codeLog` for every bit length `0..=32`.
const REMAP_CODE: [u8; 33] = build_remap_code();

const fn build_remap_code() -> [u8; 33] {
    let mut table = [0u8; 33];
    let mut bits = 0;
    while bits <= 32 {
        let mut code = 0;
        while LOG_REMAP[code] < bits as u32 {
            code += 1;
        }
        table[bits] = code as u8;
        bits += 1;
    }
    table
}

/// Smallest `codeLog` whose width holds `value`.
#[inline]
pub fn remap_code(value: u32) -> u32 {
    u32::from(REMAP_CODE[bit_length(value) as usize])
}

/// Representable width for `value`.
#[inline]
pub fn remapped_width(value: u32) -> u32 {
    LOG_REMAP[remap_code(value) as usize]
}

/// `codeLog` for a width that is already one of `LOG_REMAP`.
pub(crate) fn width_code(width: u32) -> u32 {
    u32::from(REMAP_CODE[width as usize])
}

fn length_code(len: usize) -> u32 {
    LENGTHS
        .iter()
        .position(|&l| l == len)
        .unwrap_or_else(|| panic!("block length {} not in catalog", len)) as u32
}

#[derive(Debug, Default, Clone, Copy)]
pub struct VSEncodingNaive;

impl VSEncodingNaive {
    pub fn params() -> PartitionParams<'static> {
        PartitionParams {
            fixed_cost: u64::from(CODE_LOG_BITS + CODE_LEN_BITS),
            catalog: &LENGTHS,
            zero_catalog: None,
            cost: BlockCost::Unaligned,
        }
    }
}

impl IntegerCodec for VSEncodingNaive {
    fn kind(&self) -> CodecKind {
        CodecKind::VSEncodingNaive
    }

    fn encode_array(&self, input: &[u32], output: &mut Vec<u32>) -> Result<usize> {
        let mut weights: Vec<u32> = scratch_vec(input.len())?;
        for (w, &v) in weights.iter_mut().zip(input) {
            *w = remapped_width(v);
        }
        let partition = partition::compute(&weights, &Self::params())?;
        reserve(output, partition.cost().div_ceil(32) as usize)?;

        let mut writer = BitWriter::new(output);
        for block in partition.blocks() {
            let width = weights[block.clone()].iter().copied().max().unwrap_or(0);
            writer.write(width_code(width), CODE_LOG_BITS);
            writer.write(length_code(block.len()), CODE_LEN_BITS);
            pack_stream(&input[block], width, &mut writer);
        }
        debug_assert_eq!(writer.bits_written(), partition.cost());
        let written = writer.flush();
        log::debug!(
            "vse-naive: {} values in {} blocks, {} words",
            input.len(),
            partition.num_blocks(),
            written
        );
        Ok(written)
    }

    fn decode_array(&self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let mut reader = BitReader::new(input);
        let mut produced = 0usize;
        while produced < output.len() {
            let width = LOG_REMAP[reader.read(CODE_LOG_BITS)? as usize];
            let len = LENGTHS[reader.read(CODE_LEN_BITS)? as usize];
            let end = produced + len;
            if end > output.len() {
                return Err(CodecError::CorruptStream(format!(
                    "block of {} overruns output at {} of {}",
                    len,
                    produced,
                    output.len()
                )));
            }
            unpack_stream(&mut reader, width, &mut output[produced..end])?;
            produced = end;
        }
        Ok(reader.words_consumed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u32]) -> (Vec<u32>, usize) {
        let mut encoded = Vec::new();
        let written = VSEncodingNaive.encode_array(input, &mut encoded).unwrap();
        let mut decoded = vec![0u32; input.len()];
        let consumed = VSEncodingNaive.decode_array(&encoded, &mut decoded).unwrap();
        assert_eq!(consumed, written);
        (decoded, written)
    }

    #[test]
    fn test_remap_table() {
        assert_eq!(remapped_width(0), 0);
        assert_eq!(remapped_width(4095), 12);
        assert_eq!(remapped_width(4096), 16);
        assert_eq!(remapped_width(70_000), 20);
        assert_eq!(remapped_width(1 << 20), 32);
        assert_eq!(remapped_width(u32::MAX), 32);
        for &w in LOG_REMAP.iter() {
            assert_eq!(LOG_REMAP[width_code(w) as usize], w);
        }
    }

    #[test]
    fn test_roundtrip_mixed() {
        let input: Vec<u32> = (0..300u32)
            .map(|i| match i % 50 {
                0 => u32::MAX - i,
                1..=9 => i * 1000,
                _ => i % 5,
            })
            .collect();
        assert_eq!(roundtrip(&input).0, input);
    }

    #[test]
    fn test_all_zeros_cost_only_headers() {
        let input = vec![0u32; 128];
        let (decoded, written) = roundtrip(&input);
        assert_eq!(decoded, input);
        // Two 64-long blocks, 7 header bits each.
        assert_eq!(written, 1);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(roundtrip(&[]), (vec![], 0));
        assert_eq!(roundtrip(&[42]).0, vec![42]);
    }

    #[test]
    fn test_decode_overrun_is_corrupt() {
        let mut encoded = Vec::new();
        VSEncodingNaive.encode_array(&[1u32; 64], &mut encoded).unwrap();
        let mut decoded = vec![0u32; 10];
        assert!(matches!(
            VSEncodingNaive.decode_array(&encoded, &mut decoded),
            Err(CodecError::CorruptStream(_))
        ));
    }
}
