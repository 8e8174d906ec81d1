use super::*;
use crate::{
    container::{
        attribute::AttributeValue,
        half::f32_to_f16_bits,
        header::PixelType,
    },
    foundation::error::DecodeErrorKind,
};

#[path = "../../support/exr_builder.rs"]
mod builder;

use builder::{ExrBuilder, TestSamples, NONE, ZIP, ZIPS};

fn sample_builder(width: usize, height: usize) -> ExrBuilder {
    let n = width * height;
    let half: Vec<u16> = (0..n).map(|i| f32_to_f16_bits(i as f32 * 0.25 - 3.0)).collect();
    let float: Vec<f32> = (0..n).map(|i| (i as f32).sin() * 100.0).collect();
    let uint: Vec<u32> = (0..n).map(|i| (i as u32).wrapping_mul(2_654_435_761)).collect();
    ExrBuilder::new(width, height)
        .channel("B", TestSamples::Half(half))
        .channel("Z", TestSamples::Float(float))
        .channel("id", TestSamples::Uint(uint))
}

#[test]
fn raw_decode_is_bit_exact() {
    let b = sample_builder(5, 3);
    let img = decode_container(&b.build()).unwrap();
    assert_eq!((img.width(), img.height()), (5, 3));
    assert_eq!(img.channel_names().collect::<Vec<_>>(), ["B", "Z", "id"]);

    for (ch, (_, expected, _)) in img.channels().iter().zip(&b.channels) {
        match (&ch.samples, expected) {
            (ChannelSamples::Half(a), TestSamples::Half(e)) => assert_eq!(a, e),
            (ChannelSamples::U32(a), TestSamples::Uint(e)) => assert_eq!(a, e),
            (ChannelSamples::F32(a), TestSamples::Float(e)) => {
                let a: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
                let e: Vec<u32> = e.iter().map(|v| v.to_bits()).collect();
                assert_eq!(a, e);
            }
            other => panic!("type mismatch {other:?}"),
        }
    }
    assert_eq!(img.channel("Z").unwrap().desc.pixel_type, PixelType::Float);
}

#[test]
fn zip_and_zips_match_raw() {
    // 37 rows: several 16-line zip blocks plus a short tail block
    let b = sample_builder(7, 37);
    let raw = decode_container(&b.clone().compression(NONE).build()).unwrap();
    let zip = decode_container(&b.clone().compression(ZIP).build()).unwrap();
    let zips = decode_container(&b.compression(ZIPS).build()).unwrap();
    assert_eq!(raw.channels(), zip.channels());
    assert_eq!(raw.channels(), zips.channels());
}

#[test]
fn data_window_origin_is_respected() {
    let b = sample_builder(4, 20).origin(-3, 100).compression(ZIP);
    let img = decode_container(&b.build()).unwrap();
    assert_eq!(img.data_window().min.y, 100);
    let reference = decode_container(&sample_builder(4, 20).build()).unwrap();
    assert_eq!(img.channels(), reference.channels());
}

#[test]
fn feature_flags_are_unsupported_format() {
    for flag in [0x200, 0x800, 0x1000] {
        let bytes = sample_builder(2, 2).version(2 | flag).build();
        let err = decode_container(&bytes).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedFormat, "flag {flag:#x}");
    }
    let long_names = sample_builder(2, 2).version(2 | 0x400).build();
    assert!(decode_container(&long_names).is_ok());
}

#[test]
fn unsupported_compressions_are_classified() {
    for c in [1u8, 4, 5, 6, 7, 8, 9] {
        let err = decode_container(&sample_builder(2, 2).compression(c).build()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedCompression, "compression {c}");
    }
    let err = decode_container(&sample_builder(2, 2).compression(42).build()).unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::MalformedStructure);
}

#[test]
fn unknown_attribute_type_is_its_own_class_unless_kept() {
    let bytes = sample_builder(2, 2)
        .attribute("chromaticities", "chromaticities", vec![0; 32])
        .build();
    let err = decode_container(&bytes).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnsupportedAttribute {
            name: "chromaticities".into(),
            type_name: "chromaticities".into()
        }
    );

    let opts = DecodeOptions {
        keep_unknown_attributes: true,
    };
    let img = decode_container_with(&bytes, &opts).unwrap();
    match img.attribute("chromaticities") {
        Some(AttributeValue::Opaque { type_name, bytes }) => {
            assert_eq!(type_name, "chromaticities");
            assert_eq!(bytes.len(), 32);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_required_attributes_fail() {
    for attr in ["channels", "compression", "dataWindow"] {
        let err = decode_container(&sample_builder(2, 2).without(attr).build()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::MalformedStructure, "{attr}");
    }
}

#[test]
fn subsampled_channels_are_rejected() {
    let bytes = ExrBuilder::new(2, 2)
        .subsampled_channel("RY", TestSamples::Half(vec![0; 4]), (2, 2))
        .build();
    assert_eq!(
        decode_container(&bytes).unwrap_err().kind(),
        DecodeErrorKind::UnsupportedFormat
    );
}

#[test]
fn every_truncation_fails_without_panicking() {
    let bytes = sample_builder(3, 4).compression(ZIPS).build();
    for len in 0..bytes.len() {
        assert!(decode_container(&bytes[..len]).is_err(), "prefix {len}");
    }
}

#[test]
fn corrupt_block_header_is_malformed() {
    let mut bytes = sample_builder(3, 1).build();
    // the single block starts right after its 8-byte offset table entry, which ends the file
    // minus (8 + payload); rewrite its scanline number to lie outside the window
    let payload = 3 * (2 + 4 + 4);
    let block_start = bytes.len() - payload - 8;
    bytes[block_start..block_start + 4].copy_from_slice(&7i32.to_le_bytes());
    let err = decode_container(&bytes).unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::MalformedStructure);
}

#[test]
fn note_and_multi_view_accessors() {
    let bytes = sample_builder(2, 1)
        .string("Note", "{\"ipd\":0.065}")
        .string_vector("multiView", &["left", "right"])
        .build();
    let img = decode_container(&bytes).unwrap();
    assert_eq!(img.note(), Some("{\"ipd\":0.065}"));
    assert_eq!(img.multi_view().unwrap(), ["left", "right"]);
}

#[test]
fn decode_many_keeps_results_independent() {
    let good = sample_builder(2, 2).build();
    let bad = good[..10].to_vec();
    let out = decode_many(&[good.clone(), bad, good], &DecodeOptions::default());
    assert!(out[0].is_ok());
    assert!(out[1].is_err());
    assert!(out[2].is_ok());
}
