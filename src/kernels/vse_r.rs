//! This module contains VSE-R, which separates *where* the bits go from the
//! bits themselves.
//!
//! Three channels are written back to back:
//! 1. the bit-length class of every value (`bit_length(v)`, 0 for zero), coded
//!    with VSEncodingNaive so the class sequence itself is optimally partitioned;
//! 2. a histogram of how many values fall in each non-zero class, Elias-delta
//!    coded as `count + 1`;
//! 3. one packed stream per non-empty class, holding that class's values in
//!    input order at exactly `class` bits each.
//!
//! ```text
//! | class words L | L words: classes | histogram (word aligned) | class 1 | class 2 | ... | class 32 |
//! ```
//!
//! Zero values live entirely in channel 1: the zero class has no stream.

use crate::error::{CodecError, Result};
use crate::kernels::bitpack::{pack_words, unpack_words};
use crate::kernels::bitstream::{BitReader, BitWriter};
use crate::kernels::elias::{read_delta, write_delta};
use crate::kernels::vse_naive::VSEncodingNaive;
use crate::kernels::{CodecKind, IntegerCodec};
use crate::utils::{bit_length, reserve, scratch_vec};

/// Number of bit-length classes, zero included.
pub const NUM_CLASSES: usize = 33;

#[derive(Debug, Default, Clone, Copy)]
pub struct VseR;

impl IntegerCodec for VseR {
    fn kind(&self) -> CodecKind {
        CodecKind::VseR
    }

    fn encode_array(&self, input: &[u32], output: &mut Vec<u32>) -> Result<usize> {
        let start = output.len();
        let mut classes: Vec<u32> = scratch_vec(input.len())?;
        let mut histogram = [0usize; NUM_CLASSES];
        for (c, &v) in classes.iter_mut().zip(input) {
            *c = bit_length(v);
            histogram[*c as usize] += 1;
        }

        // Channel 1: class sequence, prefixed with its word count.
        let len_at = output.len();
        output.push(0);
        let class_words = VSEncodingNaive.encode_array(&classes, output)?;
        output[len_at] = class_words as u32;

        // Channel 2: histogram of the non-zero classes.
        {
            let mut writer = BitWriter::new(output);
            for &count in &histogram[1..] {
                write_delta(&mut writer, count as u64 + 1);
            }
            writer.flush();
        }

        // Channel 3: one stream per class.
        let mut bucket: Vec<u32> = Vec::new();
        for class in 1..NUM_CLASSES {
            let count = histogram[class];
            if count == 0 {
                continue;
            }
            bucket.clear();
            bucket.try_reserve(count)?;
            bucket.extend(
                input
                    .iter()
                    .zip(&classes)
                    .filter(|&(_, &c)| c as usize == class)
                    .map(|(&v, _)| v),
            );
            reserve(output, count * class / 32 + 1)?;
            pack_words(&bucket, class as u32, output);
        }

        let written = output.len() - start;
        log_metric!(
            "event" = "vse_r_encode",
            "values" = input.len(),
            "zeros" = histogram[0],
            "class_words" = class_words,
            "words" = written
        );
        Ok(written)
    }

    fn decode_array(&self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let class_words = *input.first().ok_or(CodecError::UnexpectedEndOfStream {
            needed: 1,
            available: 0,
        })? as usize;
        let classes_end = 1 + class_words;
        if input.len() < classes_end {
            return Err(CodecError::UnexpectedEndOfStream {
                needed: classes_end,
                available: input.len(),
            });
        }

        // Channel 1.
        let mut classes: Vec<u32> = scratch_vec(output.len())?;
        let used = VSEncodingNaive.decode_array(&input[1..classes_end], &mut classes)?;
        if used != class_words {
            return Err(CodecError::CorruptStream(format!(
                "class stream used {} of {} words",
                used, class_words
            )));
        }
        let mut observed = [0usize; NUM_CLASSES];
        for &c in &classes {
            let slot = observed.get_mut(c as usize).ok_or_else(|| {
                CodecError::CorruptStream(format!("bit-length class {} > 32", c))
            })?;
            *slot += 1;
        }

        // Channel 2.
        let mut reader = BitReader::new(&input[classes_end..]);
        for class in 1..NUM_CLASSES {
            let count = read_delta(&mut reader)? - 1;
            if count != observed[class] as u64 {
                return Err(CodecError::CorruptStream(format!(
                    "histogram says {} values of class {}, stream has {}",
                    count, class, observed[class]
                )));
            }
        }
        let mut pos = classes_end + reader.words_consumed();

        // Channel 3.
        let mut streams: Vec<Vec<u32>> = vec![Vec::new(); NUM_CLASSES];
        for class in 1..NUM_CLASSES {
            let count = observed[class];
            if count == 0 {
                continue;
            }
            let mut values: Vec<u32> = scratch_vec(count)?;
            pos += unpack_words(&input[pos..], class as u32, &mut values)?;
            streams[class] = values;
        }

        let mut cursors = [0usize; NUM_CLASSES];
        for (slot, &c) in output.iter_mut().zip(&classes) {
            let c = c as usize;
            *slot = if c == 0 {
                0
            } else {
                let v = streams[c][cursors[c]];
                cursors[c] += 1;
                v
            };
        }
        Ok(pos)
    }
}
