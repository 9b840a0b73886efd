// In: src/bridge/stateless_api.rs

use crate::bridge::format::{FrameHeader, FrameStats, FRAME_HEADER_SIZE};
use crate::config::{CodecConfig, DecodeBound};
use crate::error::{CodecError, Result};
use crate::kernels;
use crate::utils::{le_bytes_to_words, low_mask, scratch_vec, words_to_le_bytes};

/// Compresses `values` with `config.codec` into a self-describing frame.
pub fn compress(values: &[u32], config: &CodecConfig) -> Result<Vec<u8>> {
    config.validate()?;
    let max_bits = config.codec.max_value_bits();
    if let Some(&value) = values.iter().find(|&&v| v > low_mask(max_bits)) {
        return Err(CodecError::ValueOutOfDomain { value, max_bits });
    }

    let mut words = Vec::new();
    let written = kernels::dispatch_encode(config.codec, config, values, &mut words)?;
    let header = FrameHeader::new(config.codec, config.pfor_block_size, values.len(), written)?;

    let mut out = Vec::new();
    out.try_reserve_exact(FRAME_HEADER_SIZE + written * 4)?;
    header.write(&mut out);
    words_to_le_bytes(&words, &mut out);
    log::debug!(
        "compress: {} values -> {} bytes with {}",
        values.len(),
        out.len(),
        config.codec
    );
    Ok(out)
}

/// Decompresses a frame produced by [`compress`].
///
/// The codec and its block size come from the frame header; `config` only
/// supplies the `decode_bound` policy.
pub fn decompress(bytes: &[u8], config: &CodecConfig) -> Result<Vec<u32>> {
    let header = FrameHeader::read(bytes)?;
    let codec = header.codec()?;
    let words = le_bytes_to_words(&bytes[FRAME_HEADER_SIZE..])?;

    let stored = header.word_count();
    if stored > words.len() {
        return Err(CodecError::UnexpectedEndOfStream {
            needed: stored,
            available: words.len(),
        });
    }
    if stored < words.len() && config.decode_bound == DecodeBound::Strict {
        return Err(CodecError::FrameFormat(format!(
            "{} trailing words after a {}-word payload",
            words.len() - stored,
            stored
        )));
    }

    let frame_config = CodecConfig {
        codec,
        pfor_block_size: header.block_size(),
        ..config.clone()
    };
    let limit = codec.max_values(stored, frame_config.pfor_block_size);
    if header.value_count() > limit {
        return Err(CodecError::FrameFormat(format!(
            "{} values cannot fit in {} {} words (at most {})",
            header.value_count(),
            stored,
            codec,
            limit
        )));
    }
    let mut values: Vec<u32> = scratch_vec(header.value_count())?;
    let consumed = kernels::dispatch_decode(codec, &frame_config, &words[..stored], &mut values)?;
    if consumed != stored {
        match config.decode_bound {
            DecodeBound::Strict => {
                return Err(CodecError::CorruptStream(format!(
                    "{} consumed {} of {} payload words",
                    codec, consumed, stored
                )));
            }
            DecodeBound::Advisory => log::warn!(
                "{} consumed {} of {} payload words",
                codec,
                consumed,
                stored
            ),
        }
    }
    Ok(values)
}

/// Reports a frame's codec and sizes without decoding the payload.
pub fn analyze(bytes: &[u8]) -> Result<FrameStats> {
    let header = FrameHeader::read(bytes)?;
    let value_count = header.value_count();
    let data_size = bytes.len() - FRAME_HEADER_SIZE;
    let bits_per_value = if value_count == 0 {
        0.0
    } else {
        (data_size * 8) as f64 / value_count as f64
    };
    Ok(FrameStats {
        codec: header.codec()?,
        value_count,
        header_size: FRAME_HEADER_SIZE,
        data_size,
        total_size: bytes.len(),
        bits_per_value,
    })
}
