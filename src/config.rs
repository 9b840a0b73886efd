// In: src/config.rs

//! The single source of truth for codec configuration.
//!
//! `CodecConfig` is created once at the application boundary (in code, or from
//! a JSON document) and passed by reference to the dispatchers and the bridge.
//! Every field has a serde default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::kernels::pfor::{DEFAULT_BLOCK_SIZE, DEFAULT_EXCEPTION_RATIO, MAX_BLOCK_SIZE};
use crate::kernels::CodecKind;

//==================================================================================
// I. Configuration Enums
//==================================================================================

/// How the frame layer treats the stored compressed word count on decode.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodeBound {
    /// **Default:** the word count is an upper bound the codec may not read
    /// past, and it must be consumed exactly; trailing words are an error.
    #[default]
    Strict,

    /// The word count still bounds the read, but unread trailing words are
    /// tolerated.
    Advisory,
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Codec used by `bridge::compress`.
    #[serde(default)]
    pub codec: CodecKind,

    /// Values per PForDelta block. At most 1023 so that a block made entirely
    /// of exceptions still fits the 10-bit exception count.
    #[serde(default = "default_pfor_block_size")]
    pub pfor_block_size: usize,

    /// Largest fraction of a block plain PForDelta lets become exceptions.
    /// Ignored by OPTPForDelta.
    #[serde(default = "default_pfor_exception_ratio")]
    pub pfor_exception_ratio: f64,

    #[serde(default)]
    pub decode_bound: DecodeBound,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::default(),
            pfor_block_size: default_pfor_block_size(),
            pfor_exception_ratio: default_pfor_exception_ratio(),
            decode_bound: DecodeBound::default(),
        }
    }
}

impl CodecConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.pfor_block_size == 0 || self.pfor_block_size > MAX_BLOCK_SIZE {
            return Err(CodecError::InvalidConfig(format!(
                "pfor_block_size {} outside 1..={}",
                self.pfor_block_size, MAX_BLOCK_SIZE
            )));
        }
        if !(self.pfor_exception_ratio > 0.0 && self.pfor_exception_ratio <= 1.0) {
            return Err(CodecError::InvalidConfig(format!(
                "pfor_exception_ratio {} outside (0, 1]",
                self.pfor_exception_ratio
            )));
        }
        if self.pfor_block_size != DEFAULT_BLOCK_SIZE {
            log::debug!(
                "non-default pfor_block_size {} (default {})",
                self.pfor_block_size,
                DEFAULT_BLOCK_SIZE
            );
        }
        Ok(())
    }
}

/// Helper for `serde` to provide a default for `pfor_block_size`.
fn default_pfor_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

/// Helper for `serde` to provide a default for `pfor_exception_ratio`.
fn default_pfor_exception_ratio() -> f64 {
    DEFAULT_EXCEPTION_RATIO
}
