//! This module serves as the public API and dispatcher for the collection of all
//! integer-sequence codecs.
//!
//! It declares the kernel sub-modules, the `IntegerCodec` trait every codec
//! implements, the `CodecKind` registry naming them, and the unified
//! `dispatch_encode` / `dispatch_decode` entry points used by the bridge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Bit-level plumbing shared by every codec.
pub mod bitpack;
pub mod bitstream;

/// Word-oriented codecs.
pub mod pfor;
pub mod simple16;

/// The VSEncoding family.
pub mod partition;
pub mod vse_blocks;
pub mod vse_naive;
pub mod vse_r;

/// Universal codes and transforms.
pub mod dgap;
pub mod elias;

//==================================================================================
// 2. The Codec Contract
//==================================================================================

/// A codec over arrays of `u32`.
///
/// `encode_array` appends to `output` and returns the number of words written.
/// `decode_array` fills exactly `output.len()` values from the front of `input`
/// and returns the number of words consumed. No codec reads past `input`; a
/// stream that would require it is reported as an error.
pub trait IntegerCodec {
    fn kind(&self) -> CodecKind;

    fn encode_array(&self, input: &[u32], output: &mut Vec<u32>) -> Result<usize>;

    fn decode_array(&self, input: &[u32], output: &mut [u32]) -> Result<usize>;
}

/// Every codec this crate ships, with a stable numeric id used in frame headers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CodecKind {
    #[serde(rename = "simple16")]
    Simple16,
    #[serde(rename = "pfor_delta")]
    PForDelta,
    #[default]
    #[serde(rename = "opt_pfor_delta")]
    OptPForDelta,
    #[serde(rename = "vs_encoding")]
    VSEncoding,
    #[serde(rename = "vs_encoding_naive")]
    VSEncodingNaive,
    #[serde(rename = "vse_r")]
    VseR,
    #[serde(rename = "elias_gamma")]
    EliasGamma,
    #[serde(rename = "elias_delta")]
    EliasDelta,
}

impl CodecKind {
    pub const ALL: [CodecKind; 8] = [
        CodecKind::Simple16,
        CodecKind::PForDelta,
        CodecKind::OptPForDelta,
        CodecKind::VSEncoding,
        CodecKind::VSEncodingNaive,
        CodecKind::VseR,
        CodecKind::EliasGamma,
        CodecKind::EliasDelta,
    ];

    pub fn id(self) -> u8 {
        match self {
            CodecKind::Simple16 => 1,
            CodecKind::PForDelta => 2,
            CodecKind::OptPForDelta => 3,
            CodecKind::VSEncoding => 4,
            CodecKind::VSEncodingNaive => 5,
            CodecKind::VseR => 6,
            CodecKind::EliasGamma => 7,
            CodecKind::EliasDelta => 8,
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or_else(|| CodecError::UnsupportedCodec(format!("codec id {}", id)))
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::Simple16 => "simple16",
            CodecKind::PForDelta => "pfor_delta",
            CodecKind::OptPForDelta => "opt_pfor_delta",
            CodecKind::VSEncoding => "vs_encoding",
            CodecKind::VSEncodingNaive => "vs_encoding_naive",
            CodecKind::VseR => "vse_r",
            CodecKind::EliasGamma => "elias_gamma",
            CodecKind::EliasDelta => "elias_delta",
        }
    }

    /// Largest bit width an input value may have for this codec.
    pub fn max_value_bits(self) -> u32 {
        match self {
            CodecKind::Simple16 => simple16::PAYLOAD_BITS,
            _ => 32,
        }
    }

    /// Upper bound on the number of values `words` payload words can decode to.
    ///
    /// `block_size` only matters for the PFor variants, which spend at least one
    /// header word per block.
    pub fn max_values(self, words: usize, block_size: usize) -> usize {
        // 4+3-bit header covering at most 64 zero-width values.
        let naive = |words: usize| {
            let headers = words.saturating_mul(32) / (CODE_HEADER_BITS as usize);
            headers.saturating_mul(vse_naive::LENGTHS[vse_naive::LENGTHS.len() - 1])
        };
        match self {
            CodecKind::Simple16 => words.saturating_mul(simple16::PAYLOAD_BITS as usize),
            CodecKind::PForDelta | CodecKind::OptPForDelta => words.saturating_mul(block_size),
            CodecKind::VSEncoding => {
                let longest = vse_blocks::ZERO_LENGTHS[vse_blocks::ZERO_LENGTHS.len() - 1];
                words.saturating_sub(1).saturating_mul(4).saturating_mul(longest)
            }
            CodecKind::VSEncodingNaive => naive(words),
            CodecKind::VseR => naive(words.saturating_sub(1)),
            CodecKind::EliasGamma | CodecKind::EliasDelta => words.saturating_mul(32),
        }
    }
}

const CODE_HEADER_BITS: u32 = vse_naive::CODE_LOG_BITS + vse_naive::CODE_LEN_BITS;

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| CodecError::UnsupportedCodec(s.to_string()))
    }
}

//==================================================================================
// 3. Public API (Unified Dispatchers)
//==================================================================================

/// Instantiates the codec named by `kind`, parameterized from `config`.
pub fn build_codec(kind: CodecKind, config: &CodecConfig) -> Result<Box<dyn IntegerCodec>> {
    let codec: Box<dyn IntegerCodec> = match kind {
        CodecKind::Simple16 => Box::new(simple16::Simple16),
        CodecKind::PForDelta => Box::new(pfor::PForDelta::new(
            config.pfor_block_size,
            config.pfor_exception_ratio,
        )?),
        CodecKind::OptPForDelta => Box::new(pfor::PForDelta::optimal(config.pfor_block_size)?),
        CodecKind::VSEncoding => Box::new(vse_blocks::VSEncoding),
        CodecKind::VSEncodingNaive => Box::new(vse_naive::VSEncodingNaive),
        CodecKind::VseR => Box::new(vse_r::VseR),
        CodecKind::EliasGamma => Box::new(elias::Elias::gamma()),
        CodecKind::EliasDelta => Box::new(elias::Elias::delta()),
    };
    Ok(codec)
}

/// The single, unified dispatcher for all ENCODE operations.
pub fn dispatch_encode(
    kind: CodecKind,
    config: &CodecConfig,
    input: &[u32],
    output: &mut Vec<u32>,
) -> Result<usize> {
    let codec = build_codec(kind, config)?;
    let written = codec.encode_array(input, output)?;
    log::debug!(
        "{}: encoded {} values into {} words",
        kind,
        input.len(),
        written
    );
    Ok(written)
}

/// The single, unified dispatcher for all DECODE operations.
pub fn dispatch_decode(
    kind: CodecKind,
    config: &CodecConfig,
    input: &[u32],
    output: &mut [u32],
) -> Result<usize> {
    let codec = build_codec(kind, config)?;
    codec.decode_array(input, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_names_are_unique_and_reversible() {
        for kind in CodecKind::ALL {
            assert_eq!(CodecKind::from_id(kind.id()).unwrap(), kind);
            assert_eq!(kind.to_string().parse::<CodecKind>().unwrap(), kind);
        }
        assert!(CodecKind::from_id(0).is_err());
        assert_eq!("VSE-R".parse::<CodecKind>().unwrap(), CodecKind::VseR);
        assert!(matches!(
            "lz4".parse::<CodecKind>(),
            Err(CodecError::UnsupportedCodec(_))
        ));
    }

    #[test]
    fn test_serde_names_match_display() {
        for kind in CodecKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_build_codec_reports_its_kind() {
        let config = CodecConfig::default();
        for kind in CodecKind::ALL {
            assert_eq!(build_codec(kind, &config).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_dispatch_roundtrip_every_codec() {
        let config = CodecConfig::default();
        let input: Vec<u32> = (0..333u32).map(|i| (i * 7919) % 5000).collect();
        for kind in CodecKind::ALL {
            let mut encoded = Vec::new();
            let written = dispatch_encode(kind, &config, &input, &mut encoded).unwrap();
            let mut decoded = vec![0u32; input.len()];
            let consumed = dispatch_decode(kind, &config, &encoded, &mut decoded).unwrap();
            assert_eq!(consumed, written, "{}", kind);
            assert_eq!(decoded, input, "{}", kind);
        }
    }

    #[test]
    fn test_max_values_bounds_real_encodings() {
        let config = CodecConfig::default();
        let sparse: Vec<u32> = (0..70_000u32).map(|i| if i % 9000 == 0 { i } else { 0 }).collect();
        let dense: Vec<u32> = (0..1000u32).map(|i| (i * 7919) % 5000).collect();
        for kind in CodecKind::ALL {
            for input in [&sparse, &dense] {
                let mut encoded = Vec::new();
                let written = dispatch_encode(kind, &config, input, &mut encoded).unwrap();
                assert!(
                    kind.max_values(written, config.pfor_block_size) >= input.len(),
                    "{}",
                    kind
                );
            }
        }
        assert_eq!(CodecKind::Simple16.max_values(0, 32), 0);
        assert_eq!(CodecKind::PForDelta.max_values(usize::MAX, 1023), usize::MAX);
    }

    #[test]
    fn test_bad_block_size_is_config_error() {
        let config = CodecConfig {
            pfor_block_size: 0,
            ..CodecConfig::default()
        };
        assert!(matches!(
            build_codec(CodecKind::PForDelta, &config),
            Err(CodecError::InvalidConfig(_))
        ));
    }
}
