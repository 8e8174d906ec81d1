use super::*;

#[test]
fn reads_little_endian_scalars_in_sequence() {
    let mut bytes = vec![7u8];
    bytes.extend_from_slice(&(-2i32).to_le_bytes());
    bytes.extend_from_slice(&1.5f32.to_le_bytes());
    let mut c = Cursor::new(&bytes);
    assert_eq!(c.read_u8().unwrap(), 7);
    assert_eq!(c.read_i32().unwrap(), -2);
    assert_eq!(c.read_f32().unwrap(), 1.5);
    assert_eq!(c.remaining(), 0);
    assert!(c.read_u8().is_err());
}

#[test]
fn offsets_keep_only_48_bits() {
    let raw = 0xABCD_0000_0000_0123u64.to_le_bytes();
    let mut c = Cursor::new(&raw);
    assert_eq!(c.read_u64_48().unwrap(), 0x0123);
}

#[test]
fn cstr_requires_terminator_and_respects_limit() {
    let mut c = Cursor::new(b"name\0type\0");
    assert_eq!(c.read_cstr(31).unwrap(), "name");
    assert_eq!(c.read_cstr(3).unwrap_err().kind(), crate::DecodeErrorKind::MalformedStructure);

    let mut c = Cursor::new(b"abc");
    assert!(c.read_cstr(31).is_err());
}

#[test]
fn seek_bounds() {
    let bytes = [0u8; 4];
    let mut c = Cursor::new(&bytes);
    assert!(c.seek(4).is_ok());
    assert!(c.seek(5).is_err());
    c.seek(1).unwrap();
    assert_eq!(c.position(), 1);
    assert!(c.read_bytes(4).is_err());
    assert_eq!(c.position(), 1);
}
