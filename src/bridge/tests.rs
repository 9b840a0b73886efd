use super::*;
use crate::config::{CodecConfig, DecodeBound};
use crate::error::CodecError;
use crate::kernels::CodecKind;

/// Sorted docids turned into gaps, the workload these codecs target.
fn postings_gaps() -> Vec<u32> {
    let mut docs: Vec<u32> = (0..2000u32).map(|i| i * 13 + (i % 7) * 1000).collect();
    docs.sort_unstable();
    crate::kernels::dgap::to_gaps(&mut docs);
    docs
}

#[test]
fn test_every_codec_roundtrips_through_a_frame() {
    let values = postings_gaps();
    for kind in CodecKind::ALL {
        let config = CodecConfig::default().with_codec(kind);
        let frame = compress(&values, &config).unwrap();
        assert_eq!(&frame[..4], FRAME_MAGIC);
        assert_eq!(decompress(&frame, &config).unwrap(), values, "{}", kind);
    }
}

#[test]
fn test_decompress_uses_block_size_from_header() {
    let values: Vec<u32> = (0..500u32).map(|i| if i % 50 == 0 { 1 << 20 } else { i % 9 }).collect();
    let writer = CodecConfig {
        codec: CodecKind::PForDelta,
        pfor_block_size: 128,
        ..CodecConfig::default()
    };
    let frame = compress(&values, &writer).unwrap();
    // Reader config disagrees on the block size; the header wins.
    assert_eq!(decompress(&frame, &CodecConfig::default()).unwrap(), values);
}

#[test]
fn test_analyze_reports_sizes() {
    let values = vec![0u32; 1000];
    let frame = compress(&values, &CodecConfig::default().with_codec(CodecKind::VSEncoding)).unwrap();
    let stats = analyze(&frame).unwrap();
    assert_eq!(stats.codec, CodecKind::VSEncoding);
    assert_eq!(stats.value_count, 1000);
    assert_eq!(stats.header_size, FRAME_HEADER_SIZE);
    assert_eq!(stats.header_size + stats.data_size, stats.total_size);
    assert!(stats.bits_per_value < 1.0);
}

#[test]
fn test_empty_input_frame() {
    let frame = compress(&[], &CodecConfig::default()).unwrap();
    assert_eq!(frame.len(), FRAME_HEADER_SIZE);
    assert!(decompress(&frame, &CodecConfig::default()).unwrap().is_empty());
    assert_eq!(analyze(&frame).unwrap().bits_per_value, 0.0);
}

#[test]
fn test_trailing_words_follow_decode_bound() {
    let values: Vec<u32> = (0..100).collect();
    let mut frame = compress(&values, &CodecConfig::default()).unwrap();
    frame.extend_from_slice(&[0xAB; 4]);

    let strict = CodecConfig::default();
    assert!(matches!(
        decompress(&frame, &strict),
        Err(CodecError::FrameFormat(_))
    ));

    let advisory = CodecConfig {
        decode_bound: DecodeBound::Advisory,
        ..CodecConfig::default()
    };
    assert_eq!(decompress(&frame, &advisory).unwrap(), values);
}

#[test]
fn test_malformed_frames_are_rejected() {
    let values: Vec<u32> = (0..64).collect();
    let frame = compress(&values, &CodecConfig::default()).unwrap();
    let config = CodecConfig::default();

    assert!(matches!(
        decompress(&frame[..10], &config),
        Err(CodecError::FrameFormat(_))
    ));

    let mut bad_magic = frame.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        decompress(&bad_magic, &config),
        Err(CodecError::FrameFormat(_))
    ));

    let mut bad_codec = frame.clone();
    bad_codec[4] = 200;
    assert!(matches!(
        decompress(&bad_codec, &config),
        Err(CodecError::UnsupportedCodec(_))
    ));

    let truncated = &frame[..frame.len() - 4];
    assert!(matches!(
        decompress(truncated, &config),
        Err(CodecError::UnexpectedEndOfStream { .. })
    ));

    let ragged = &frame[..frame.len() - 1];
    assert!(matches!(
        decompress(ragged, &config),
        Err(CodecError::FrameFormat(_))
    ));
}

#[test]
fn test_simple16_frame_rejects_wide_values() {
    let config = CodecConfig::default().with_codec(CodecKind::Simple16);
    assert!(matches!(
        compress(&[1, 2, 1 << 28], &config),
        Err(CodecError::ValueOutOfDomain { .. })
    ));
}

#[test]
fn test_invalid_config_is_rejected_before_encoding() {
    let config = CodecConfig {
        pfor_exception_ratio: 2.0,
        ..CodecConfig::default()
    };
    assert!(matches!(
        compress(&[1, 2, 3], &config),
        Err(CodecError::InvalidConfig(_))
    ));
}

/// A frame header with the given counts and no trustworthy payload.
fn forged_frame(codec: CodecKind, value_count: u32, payload: &[u32]) -> Vec<u8> {
    let mut frame = FRAME_MAGIC.to_vec();
    frame.push(codec.id());
    frame.push(FRAME_FORMAT_VERSION);
    frame.extend_from_slice(&32u16.to_le_bytes());
    frame.extend_from_slice(&value_count.to_le_bytes());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    for word in payload {
        frame.extend_from_slice(&word.to_le_bytes());
    }
    frame
}

#[test]
fn test_value_count_beyond_payload_density_is_rejected() {
    let config = CodecConfig::default();
    for kind in CodecKind::ALL {
        for value_count in [500_000_000, u32::MAX] {
            assert!(
                matches!(
                    decompress(&forged_frame(kind, value_count, &[]), &config),
                    Err(CodecError::FrameFormat(_))
                ),
                "{}",
                kind
            );
        }
    }

    // One Simple16 word carries at most 28 values.
    let frame = forged_frame(CodecKind::Simple16, 29, &[0]);
    assert!(matches!(
        decompress(&frame, &config),
        Err(CodecError::FrameFormat(_))
    ));
    let frame = forged_frame(CodecKind::Simple16, 28, &[0]);
    assert_eq!(decompress(&frame, &config).unwrap(), vec![0u32; 28]);
}
