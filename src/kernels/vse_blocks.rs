//! This module contains VSEncoding, the block variant of the VSEncoding family.
//!
//! Compared to VSEncodingNaive it trades a little space for decode speed:
//! blocks are charged with the word-aligned cost model so every block payload
//! starts on a word boundary and can be unpacked with the grouped bit-packing
//! kernel, and all-zero blocks draw their length from a second catalog of
//! long lengths so runs of zeros cost a single header byte.
//!
//! # Layout
//!
//! ```text
//! | block count | headers: 1 byte per block, 4 per word | payloads, word aligned |
//!
//! header byte = codeLog << 4 | codeLen
//! codeLen indexes ZERO_LENGTHS when LOG_REMAP[codeLog] == 0, LENGTHS otherwise
//! ```

use crate::error::{CodecError, Result};
use crate::kernels::bitpack::{pack_words, unpack_words};
use crate::kernels::bitstream::{BitReader, BitWriter};
use crate::kernels::partition::{self, BlockCost, PartitionParams};
use crate::kernels::vse_naive::{remapped_width, width_code, LOG_REMAP};
use crate::kernels::{CodecKind, IntegerCodec};
use crate::utils::{reserve, scratch_vec};

/// Block lengths for blocks with a non-zero width, indexed by `codeLen`.
pub const LENGTHS: [usize; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 16, 32, 64];

/// Block lengths for all-zero blocks, indexed by `codeLen`.
pub const ZERO_LENGTHS: [usize; 16] = [
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
];

const HEADER_BITS: u32 = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct VSEncoding;

impl VSEncoding {
    pub fn params() -> PartitionParams<'static> {
        PartitionParams {
            fixed_cost: u64::from(HEADER_BITS),
            catalog: &LENGTHS,
            zero_catalog: Some(&ZERO_LENGTHS),
            cost: BlockCost::WordAligned,
        }
    }
}

fn code_of(catalog: &[usize], len: usize) -> u32 {
    catalog
        .iter()
        .position(|&l| l == len)
        .unwrap_or_else(|| panic!("block length {} not in catalog", len)) as u32
}

impl IntegerCodec for VSEncoding {
    fn kind(&self) -> CodecKind {
        CodecKind::VSEncoding
    }

    fn encode_array(&self, input: &[u32], output: &mut Vec<u32>) -> Result<usize> {
        let mut weights: Vec<u32> = scratch_vec(input.len())?;
        for (w, &v) in weights.iter_mut().zip(input) {
            *w = remapped_width(v);
        }
        let partition = partition::compute(&weights, &Self::params())?;
        let start = output.len();
        reserve(output, 1 + partition.cost().div_ceil(32) as usize)?;

        output.push(partition.num_blocks() as u32);
        let mut widths = Vec::with_capacity(partition.num_blocks());
        {
            let mut writer = BitWriter::new(output);
            for block in partition.blocks() {
                let width = weights[block.clone()].iter().copied().max().unwrap_or(0);
                let len_code = if width == 0 {
                    code_of(&ZERO_LENGTHS, block.len())
                } else {
                    code_of(&LENGTHS, block.len())
                };
                writer.write((width_code(width) << 4) | len_code, HEADER_BITS);
                widths.push(width);
            }
            writer.flush();
        }
        for (block, &width) in partition.blocks().zip(&widths) {
            if width > 0 {
                pack_words(&input[block], width, output);
            }
        }

        let written = output.len() - start;
        log_metric!(
            "event" = "vse_encode",
            "values" = input.len(),
            "blocks" = partition.num_blocks(),
            "words" = written
        );
        Ok(written)
    }

    fn decode_array(&self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let num_blocks = *input.first().ok_or(CodecError::UnexpectedEndOfStream {
            needed: 1,
            available: 0,
        })? as usize;
        if num_blocks > output.len() {
            return Err(CodecError::InvalidHeader(format!(
                "{} blocks for {} values",
                num_blocks,
                output.len()
            )));
        }

        let mut headers: Vec<(u32, usize)> = scratch_vec(num_blocks)?;
        let mut reader = BitReader::new(&input[1..]);
        for header in headers.iter_mut() {
            let byte = reader.read(HEADER_BITS)?;
            let width = LOG_REMAP[(byte >> 4) as usize];
            let len_code = (byte & 0xF) as usize;
            let len = if width == 0 {
                ZERO_LENGTHS[len_code]
            } else {
                LENGTHS[len_code]
            };
            *header = (width, len);
        }
        let mut pos = 1 + reader.words_consumed();

        let mut produced = 0usize;
        for &(width, len) in &headers {
            let end = produced + len;
            if end > output.len() {
                return Err(CodecError::CorruptStream(format!(
                    "block of {} overruns output at {} of {}",
                    len,
                    produced,
                    output.len()
                )));
            }
            pos += unpack_words(&input[pos..], width, &mut output[produced..end])?;
            produced = end;
        }
        if produced != output.len() {
            return Err(CodecError::CorruptStream(format!(
                "blocks cover {} of {} values",
                produced,
                output.len()
            )));
        }
        Ok(pos)
    }
}
