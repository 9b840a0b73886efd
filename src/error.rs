// In: src/error.rs

//! This module defines the single, unified error type for the entire codec library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    // =========================================================================
    // === Encode-Side Errors (input outside a codec's domain or capacity)
    // =========================================================================
    #[error("Value {value} does not fit the codec domain of {max_bits} bits")]
    ValueOutOfDomain { value: u32, max_bits: u32 },

    #[error("Block header field '{field}' overflow: {value} exceeds limit {limit}")]
    CapacityExceeded {
        field: &'static str,
        value: usize,
        limit: usize,
    },

    #[error("Scratch allocation failed: {0}")]
    Allocation(String),

    // =========================================================================
    // === Decode-Side Errors (malformed or truncated compressed streams)
    // =========================================================================
    #[error("Unexpected end of stream: needed word {needed}, only {available} available")]
    UnexpectedEndOfStream { needed: usize, available: usize },

    #[error("Invalid Simple16 descriptor id {0}")]
    InvalidDescriptor(u32),

    #[error("Invalid block header: {0}")]
    InvalidHeader(String),

    #[error("Corrupt compressed stream: {0}")]
    CorruptStream(String),

    // =========================================================================
    // === Configuration & Framing Errors
    // =========================================================================
    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Frame serialization/deserialization failed: {0}")]
    FrameFormat(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g. the log file sink).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading a `CodecConfig`.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<std::collections::TryReserveError> for CodecError {
    fn from(err: std::collections::TryReserveError) -> Self {
        CodecError::Allocation(err.to_string())
    }
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
