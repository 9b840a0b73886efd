// In: src/bridge/format.rs

//! Defines the on-wire frame produced by `bridge::compress`.
//!
//! ```text
//! | magic "TIC1" | codec id | version | block size | value count | word count | payload words... |
//! |     4 B      |   1 B    |   1 B   |  2 B (LE)  |   4 B (LE)  |  4 B (LE)  |   4 B each (LE)   |
//! ```
//!
//! The header is a plain-old-data struct of byte arrays, so it has no padding
//! and is read and written with `bytemuck` regardless of host endianness.

use bytemuck::{Pod, Zeroable};

use crate::error::{CodecError, Result};
use crate::kernels::CodecKind;

/// The magic number identifying a framed integer-codec payload.
pub const FRAME_MAGIC: &[u8; 4] = b"TIC1";
/// The current version of the frame format.
pub const FRAME_FORMAT_VERSION: u8 = 1;
pub const FRAME_HEADER_SIZE: usize = std::mem::size_of::<FrameHeader>();

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct FrameHeader {
    magic: [u8; 4],
    codec_id: u8,
    version: u8,
    block_size: [u8; 2],
    value_count: [u8; 4],
    word_count: [u8; 4],
}

impl FrameHeader {
    pub(crate) fn new(
        codec: CodecKind,
        block_size: usize,
        value_count: usize,
        word_count: usize,
    ) -> Result<Self> {
        Ok(Self {
            magic: *FRAME_MAGIC,
            codec_id: codec.id(),
            version: FRAME_FORMAT_VERSION,
            block_size: narrow::<u16>("block_size", block_size, usize::from(u16::MAX))?.to_le_bytes(),
            value_count: narrow::<u32>("value_count", value_count, u32::MAX as usize)?.to_le_bytes(),
            word_count: narrow::<u32>("word_count", word_count, u32::MAX as usize)?.to_le_bytes(),
        })
    }

    /// Parses and validates the header at the front of `bytes`.
    pub(crate) fn read(bytes: &[u8]) -> Result<Self> {
        let head = bytes.get(..FRAME_HEADER_SIZE).ok_or_else(|| {
            CodecError::FrameFormat(format!(
                "frame of {} bytes is shorter than the {}-byte header",
                bytes.len(),
                FRAME_HEADER_SIZE
            ))
        })?;
        let header: FrameHeader = bytemuck::try_pod_read_unaligned(head)
            .map_err(|e| CodecError::FrameFormat(e.to_string()))?;
        if &header.magic != FRAME_MAGIC {
            return Err(CodecError::FrameFormat(format!(
                "bad magic {:?}",
                header.magic
            )));
        }
        if header.version != FRAME_FORMAT_VERSION {
            return Err(CodecError::FrameFormat(format!(
                "unsupported frame version {}",
                header.version
            )));
        }
        Ok(header)
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::bytes_of(self));
    }

    pub(crate) fn codec(&self) -> Result<CodecKind> {
        CodecKind::from_id(self.codec_id)
    }

    pub(crate) fn block_size(&self) -> usize {
        usize::from(u16::from_le_bytes(self.block_size))
    }

    pub(crate) fn value_count(&self) -> usize {
        u32::from_le_bytes(self.value_count) as usize
    }

    pub(crate) fn word_count(&self) -> usize {
        u32::from_le_bytes(self.word_count) as usize
    }
}

fn narrow<T: TryFrom<usize>>(field: &'static str, value: usize, limit: usize) -> Result<T> {
    T::try_from(value).map_err(|_| CodecError::CapacityExceeded {
        field,
        value,
        limit,
    })
}

/// The public-facing struct for frame analysis results, returned by `analyze`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub codec: CodecKind,
    pub value_count: usize,
    pub header_size: usize,
    pub data_size: usize,
    pub total_size: usize,
    /// Payload bits per value; 0 for an empty frame.
    pub bits_per_value: f64,
}
