use super::*;

#[test]
fn lines_per_block_table() {
    let expected = [
        (0, 1),
        (1, 1),
        (2, 1),
        (3, 16),
        (4, 32),
        (5, 16),
        (6, 32),
        (7, 32),
        (8, 32),
        (9, 256),
    ];
    for (byte, lines) in expected {
        assert_eq!(Compression::from_byte(byte).unwrap().lines_per_block(), lines);
    }
    assert!(Compression::from_byte(10).is_err());
}

#[test]
fn only_none_zip_zips_are_supported() {
    let supported: Vec<_> = (0..=9)
        .map(|b| Compression::from_byte(b).unwrap())
        .filter(|c| c.is_supported())
        .collect();
    assert_eq!(supported, [Compression::None, Compression::Zips, Compression::Zip]);
}

#[test]
fn box_size_is_inclusive() {
    let b = Box2i {
        min: IVec2::new(-2, 5),
        max: IVec2::new(1, 5),
    };
    assert_eq!(b.size(), Some((4, 1)));
    let inverted = Box2i {
        min: IVec2::new(3, 0),
        max: IVec2::new(2, 0),
    };
    assert_eq!(inverted.size(), None);
}

#[test]
fn bad_magic_and_version() {
    let mut bytes = 0x0131_2F77u32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&2u32.to_le_bytes());
    let err = read_header(&mut Cursor::new(&bytes), &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedStructure(_)));

    let mut bytes = MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    let err = read_header(&mut Cursor::new(&bytes), &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
}

#[test]
fn block_count_rounds_up() {
    let h = Header {
        attributes: BTreeMap::new(),
        channels: Vec::new(),
        compression: Compression::Zip,
        data_window: Box2i {
            min: IVec2::ZERO,
            max: IVec2::new(0, 32),
        },
        width: 1,
        height: 33,
    };
    assert_eq!(h.block_count(), 3);
}
