use super::*;

#[test]
fn fixed_size_types_check_their_payload_size() {
    let err = parse_value("x", "int", &[0, 0, 0], 31).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedStructure(_)));
    assert_eq!(
        parse_value("x", "v3f", &[0; 12], 31).unwrap(),
        AttributeValue::V3f(Vec3::ZERO)
    );
}

#[test]
fn string_vector_entries_are_length_prefixed() {
    let mut payload = Vec::new();
    for s in ["left", "right"] {
        payload.extend_from_slice(&(s.len() as i32).to_le_bytes());
        payload.extend_from_slice(s.as_bytes());
    }
    let v = parse_value("multiView", "stringvector", &payload, 31).unwrap();
    assert_eq!(v.as_string_vector().unwrap(), ["left", "right"]);

    payload.truncate(payload.len() - 1);
    assert!(parse_value("multiView", "stringvector", &payload, 31).is_err());
}

#[test]
fn channel_list_entries() {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"Depth.left.V\0");
    payload.extend_from_slice(&2i32.to_le_bytes());
    payload.extend_from_slice(&[1, 0, 0, 0]);
    payload.extend_from_slice(&1i32.to_le_bytes());
    payload.extend_from_slice(&1i32.to_le_bytes());
    payload.push(0);

    let AttributeValue::ChannelList(list) = parse_value("channels", "chlist", &payload, 31).unwrap()
    else {
        panic!("expected chlist");
    };
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Depth.left.V");
    assert_eq!(list[0].pixel_type, PixelType::Float);
    assert!(list[0].p_linear);

    // a name longer than 31 bytes needs the long-names flag
    let mut long = b"Image.a_rather_long_view_name_here.R\0".to_vec();
    long.extend_from_slice(&payload[13..]);
    assert!(parse_value("channels", "chlist", &long, 31).is_err());
    assert!(parse_value("channels", "chlist", &long, 255).is_ok());
}

#[test]
fn bad_enum_bytes_are_malformed() {
    assert!(matches!(
        parse_value("compression", "compression", &[200], 31),
        Err(DecodeError::MalformedStructure(_))
    ));
    assert!(matches!(
        parse_value("channels", "chlist", &[b'R', 0, 9, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0], 31),
        Err(DecodeError::MalformedStructure(_))
    ));
}

#[test]
fn known_type_set_is_closed() {
    for t in [
        "int", "float", "string", "compression", "lineOrder", "v2i", "v2f", "v3i", "v3f",
        "box2i", "box2f", "stringvector", "chlist",
    ] {
        assert!(is_known_type(t), "{t}");
    }
    assert!(!is_known_type("chromaticities"));
    assert!(!is_known_type("m44f"));
}
