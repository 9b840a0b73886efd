//! This file is the root of the `tambak_intcodec` Rust crate.
//!
//! The crate implements bit-packed codecs for sequences of 32-bit unsigned
//! integers such as postings-list gaps: Simple16, PForDelta / OPTPForDelta,
//! the VSEncoding family (VSEncodingNaive, VSEncoding, VSE-R) and the Elias
//! universal codes. Its responsibilities here are limited to:
//! 1.  Declaring the top-level modules (`kernels`, `bridge`, etc.).
//! 2.  Re-exporting the types most callers need.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod utils;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use bridge::{analyze, compress, decompress, FrameStats};
pub use config::{CodecConfig, DecodeBound};
pub use error::{CodecError, Result};
pub use kernels::elias::Elias;
pub use kernels::pfor::PForDelta;
pub use kernels::simple16::Simple16;
pub use kernels::vse_blocks::VSEncoding;
pub use kernels::vse_naive::VSEncodingNaive;
pub use kernels::vse_r::VseR;
pub use kernels::{build_codec, dispatch_decode, dispatch_encode, CodecKind, IntegerCodec};
pub use observability::enable_verbose_logging;
