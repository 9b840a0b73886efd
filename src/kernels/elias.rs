//! This module contains the Elias gamma and Elias delta universal codes.
//!
//! Both codes represent a positive integer `x` without any side information:
//! * gamma: `bit_length(x) - 1` zero bits followed by `x` in `bit_length(x)` bits;
//! * delta: `bit_length(x)` in gamma, followed by `x` without its leading one bit.
//!
//! As standalone codecs each input value `v` is coded as `v + 1` in 64-bit
//! arithmetic, so zero and `u32::MAX` are both representable. VSE-R reuses the
//! delta code for its bit-length histogram.

use crate::error::{CodecError, Result};
use crate::kernels::bitstream::{BitReader, BitWriter};
use crate::kernels::{CodecKind, IntegerCodec};
use crate::utils::reserve;

/// Largest gamma prefix accepted while decoding (`x < 2^64`).
const MAX_PREFIX: u32 = 63;

#[inline]
fn bit_length64(x: u64) -> u32 {
    64 - x.leading_zeros()
}

fn write_wide(writer: &mut BitWriter, value: u64, bits: u32) {
    if bits > 32 {
        writer.write((value >> 32) as u32, bits - 32);
        writer.write(value as u32, 32);
    } else {
        writer.write(value as u32, bits);
    }
}

fn read_wide(reader: &mut BitReader, bits: u32) -> Result<u64> {
    if bits > 32 {
        let hi = u64::from(reader.read(bits - 32)?);
        let lo = u64::from(reader.read(32)?);
        Ok((hi << 32) | lo)
    } else {
        Ok(u64::from(reader.read(bits)?))
    }
}

//==================================================================================
// 1. Single-Value Operations
//==================================================================================

/// Writes `x >= 1` in Elias gamma.
pub fn write_gamma(writer: &mut BitWriter, x: u64) {
    debug_assert!(x >= 1, "gamma code is defined for positive integers");
    let len = bit_length64(x);
    let mut zeros = len - 1;
    while zeros > 0 {
        let run = zeros.min(32);
        writer.write(0, run);
        zeros -= run;
    }
    write_wide(writer, x, len);
}

/// Reads one Elias gamma value.
pub fn read_gamma(reader: &mut BitReader) -> Result<u64> {
    let mut zeros = 0u32;
    while !reader.read_bit()? {
        zeros += 1;
        if zeros > MAX_PREFIX {
            return Err(CodecError::CorruptStream(
                "gamma prefix longer than 63 bits".to_string(),
            ));
        }
    }
    if zeros == 0 {
        return Ok(1);
    }
    Ok((1u64 << zeros) | read_wide(reader, zeros)?)
}

/// Writes `x >= 1` in Elias delta.
pub fn write_delta(writer: &mut BitWriter, x: u64) {
    debug_assert!(x >= 1, "delta code is defined for positive integers");
    let len = bit_length64(x);
    write_gamma(writer, u64::from(len));
    if len > 1 {
        write_wide(writer, x, len - 1);
    }
}

/// Reads one Elias delta value.
pub fn read_delta(reader: &mut BitReader) -> Result<u64> {
    let len = read_gamma(reader)?;
    if len == 0 || len > 64 {
        return Err(CodecError::CorruptStream(format!(
            "delta length prefix {} outside 1..=64",
            len
        )));
    }
    let len = len as u32;
    if len == 1 {
        return Ok(1);
    }
    Ok((1u64 << (len - 1)) | read_wide(reader, len - 1)?)
}

//==================================================================================
// 2. IntegerCodec Adapters
//==================================================================================

/// Which universal code an `Elias` codec uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliasCode {
    Gamma,
    Delta,
}

#[derive(Debug, Clone, Copy)]
pub struct Elias {
    code: EliasCode,
}

impl Elias {
    pub fn gamma() -> Self {
        Self { code: EliasCode::Gamma }
    }

    pub fn delta() -> Self {
        Self { code: EliasCode::Delta }
    }
}

impl IntegerCodec for Elias {
    fn kind(&self) -> CodecKind {
        match self.code {
            EliasCode::Gamma => CodecKind::EliasGamma,
            EliasCode::Delta => CodecKind::EliasDelta,
        }
    }

    fn encode_array(&self, input: &[u32], output: &mut Vec<u32>) -> Result<usize> {
        reserve(output, input.len() / 4 + 1)?;
        let mut writer = BitWriter::new(output);
        for &v in input {
            let x = u64::from(v) + 1;
            match self.code {
                EliasCode::Gamma => write_gamma(&mut writer, x),
                EliasCode::Delta => write_delta(&mut writer, x),
            }
        }
        Ok(writer.flush())
    }

    fn decode_array(&self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let mut reader = BitReader::new(input);
        for slot in output.iter_mut() {
            let x = match self.code {
                EliasCode::Gamma => read_gamma(&mut reader)?,
                EliasCode::Delta => read_delta(&mut reader)?,
            };
            *slot = u32::try_from(x - 1).map_err(|_| {
                CodecError::CorruptStream(format!("decoded value {} exceeds 32 bits", x - 1))
            })?;
        }
        Ok(reader.words_consumed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_known_codes() {
        // 1 -> "1", 2 -> "010", 5 -> "00101"
        let mut words = Vec::new();
        let mut writer = BitWriter::new(&mut words);
        write_gamma(&mut writer, 1);
        write_gamma(&mut writer, 2);
        write_gamma(&mut writer, 5);
        assert_eq!(writer.bits_written(), 9);
        writer.flush();
        assert_eq!(words, vec![0b1_010_00101 << 23]);
    }

    #[test]
    fn test_delta_known_codes() {
        // 1 -> "1", 2 -> "0100", 17 -> "001010001"
        let mut words = Vec::new();
        let mut writer = BitWriter::new(&mut words);
        write_delta(&mut writer, 1);
        write_delta(&mut writer, 2);
        write_delta(&mut writer, 17);
        assert_eq!(writer.bits_written(), 14);
        writer.flush();

        let mut reader = BitReader::new(&words);
        assert_eq!(read_delta(&mut reader).unwrap(), 1);
        assert_eq!(read_delta(&mut reader).unwrap(), 2);
        assert_eq!(read_delta(&mut reader).unwrap(), 17);
    }

    #[test]
    fn test_codecs_roundtrip_full_range() {
        let input = vec![0u32, 1, 2, 3, 100, 65_535, 1 << 31, u32::MAX, 0, 7];
        for codec in [Elias::gamma(), Elias::delta()] {
            let mut encoded = Vec::new();
            let written = codec.encode_array(&input, &mut encoded).unwrap();
            assert_eq!(written, encoded.len());
            let mut decoded = vec![0u32; input.len()];
            assert_eq!(codec.decode_array(&encoded, &mut decoded).unwrap(), written);
            assert_eq!(decoded, input);
        }
    }

    #[test]
    fn test_gamma_rejects_runaway_prefix() {
        let zeros = vec![0u32; 4];
        let mut reader = BitReader::new(&zeros);
        assert!(matches!(read_gamma(&mut reader), Err(CodecError::CorruptStream(_))));
    }
}
