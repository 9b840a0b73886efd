// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the byte-oriented public face of the library. The kernels speak
// in `u32` words and need the caller to remember the codec, its parameters and the
// value count; the bridge packages all of that into a self-describing frame.
//
// Data Flow (Compression):
//
//   1. [Stateless API (compress)]   -> Receives `&[u32]` + `&CodecConfig`
//         |
//         `-> a. Calls `kernels::dispatch_encode` for the configured codec
//         |
//         `-> b. Prepends a `format::FrameHeader` and serializes the words (LE)
//
// Data Flow (Decompression):
//
//   1. [Stateless API (decompress)] -> Receives `&[u8]` (a frame)
//         |
//         `-> a. Parses and validates the `FrameHeader`
//         |
//         `-> b. Calls `kernels::dispatch_decode` with the codec and block size
//         |      recorded in the header, bounded by the stored word count
//         |
//         `-> c. Applies the `DecodeBound` policy to the words left unread
//
// ====================================================================================
pub(crate) mod format;
pub mod stateless_api;

// --- Low-Level Stateless API ---
pub use stateless_api::{analyze, compress, decompress};

// --- Format Constants and Structs ---
pub use format::{FrameStats, FRAME_FORMAT_VERSION, FRAME_HEADER_SIZE, FRAME_MAGIC};

#[cfg(test)]
mod tests;
