use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        OdsError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        OdsError::synthesis("x")
            .to_string()
            .contains("synthesis error:")
    );
    assert!(
        OdsError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        OdsError::from(DecodeError::malformed("x"))
            .to_string()
            .contains("decode error: malformed structure:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = OdsError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn decode_kinds_separate_unsupported_from_corrupt() {
    assert!(DecodeError::unsupported_format("tiled").is_unsupported());
    assert!(DecodeError::unsupported_compression("piz").is_unsupported());
    let attr = DecodeError::UnsupportedAttribute {
        name: "chromaticities".to_string(),
        type_name: "chromaticities".to_string(),
    };
    assert!(attr.is_unsupported());
    assert_eq!(attr.kind(), DecodeErrorKind::UnsupportedAttribute);
    assert!(!DecodeError::malformed("short read").is_unsupported());
    assert_eq!(
        DecodeError::malformed("x").kind(),
        DecodeErrorKind::MalformedStructure
    );
}
