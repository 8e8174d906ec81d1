use super::*;

fn numbered(dims: Dims) -> SynthesizedPanorama {
    let n = dims.stereo().pixel_count();
    let rgba = (0..n).flat_map(|i| [i as u8, 0, 0, 255]).collect();
    let depth = (0..n).map(|i| i as f32).collect();
    SynthesizedPanorama::from_parts(dims, rgba, depth).unwrap()
}

#[test]
fn buffers_are_stacked_left_over_right() {
    let dims = Dims::new(4, 2).unwrap();
    let p = numbered(dims);
    assert_eq!(p.dims(), Dims::new(4, 4).unwrap());
    assert_eq!(p.eye_dims(), dims);
    assert_eq!(p.eye_depth(Eye::Left), [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    assert_eq!(p.eye_depth(Eye::Right)[0], 8.0);
    assert_eq!(p.eye_rgba(Eye::Right)[..4], [8, 0, 0, 255]);
}

#[test]
fn readback_copies_a_region() {
    let p = numbered(Dims::new(4, 2).unwrap());
    let region = Region {
        x: 1,
        y: 2,
        width: 2,
        height: 2,
    };
    assert_eq!(p.readback_depth(region).unwrap(), [9.0, 10.0, 13.0, 14.0]);
    let rgba = p.readback_rgba(region).unwrap();
    assert_eq!(rgba.len(), 16);
    assert_eq!(rgba[0], 9);
    assert_eq!(rgba[12], 14);

    let full = p.readback_depth(Region::full(p.dims())).unwrap();
    assert_eq!(full, p.depth());
}

#[test]
fn readback_rejects_out_of_bounds_regions() {
    let p = numbered(Dims::new(4, 2).unwrap());
    for region in [
        Region {
            x: 3,
            y: 0,
            width: 2,
            height: 1,
        },
        Region {
            x: 0,
            y: 4,
            width: 1,
            height: 1,
        },
        Region {
            x: 0,
            y: 0,
            width: 0,
            height: 1,
        },
    ] {
        assert!(matches!(
            p.readback_rgba(region),
            Err(OdsError::Validation(_))
        ));
        assert!(p.readback_depth(region).is_err());
    }
}

#[test]
fn mismatched_parts_are_rejected() {
    let dims = Dims::new(2, 1).unwrap();
    assert!(SynthesizedPanorama::from_parts(dims, vec![0; 16], vec![0.0; 3]).is_err());
    assert!(SynthesizedPanorama::from_parts(dims, vec![0; 12], vec![0.0; 4]).is_err());
}

#[test]
fn exports_an_rgba_image() {
    let p = numbered(Dims::new(4, 2).unwrap());
    let img = p.to_rgba_image().unwrap();
    assert_eq!(img.dimensions(), (4, 4));
    assert_eq!(img.get_pixel(1, 2).0, [9, 0, 0, 255]);
}
