use super::*;
use crate::{
    collection::node::NodeInput,
    foundation::core::{Eye, Vec3},
};
use glam::DVec3;

fn node(dims: Dims, rgb: [u8; 3], depth: f32) -> SourceNode {
    let n = dims.pixel_count();
    let color = (0..n).flat_map(|_| [rgb[0], rgb[1], rgb[2], 255]).collect();
    SourceNode::from_input(NodeInput::new(Vec3::ZERO, dims, color, vec![depth; n]))
}

fn identity(dims: Dims, eye: Eye, depth_hint: f64) -> ViewParams {
    ViewParams {
        dims,
        camera_offset: DVec3::ZERO,
        ipd: 0.0,
        focal_dist: 1.95,
        z_max: 10.0,
        depth_hint,
        eye,
        cone: None,
    }
}

#[test]
fn keeps_full_color_precision() {
    let dims = Dims::new(8, 4).unwrap();
    let mut b = OrderedBackend::new();
    b.clear(dims);
    for eye in Eye::BOTH {
        b.merge_view(&node(dims, [3, 129, 251], 2.0), &identity(dims, eye, 0.0))
            .unwrap();
    }
    let out = b.extract(10.0).unwrap();
    assert!(out.rgba().chunks(4).all(|px| px == [3, 129, 251, 255]));
    for d in out.depth() {
        assert!((d - 2.0).abs() < 1e-5, "{d}");
    }
}

#[test]
fn exact_ties_go_to_the_first_merged_view() {
    let dims = Dims::new(8, 4).unwrap();
    let mut b = OrderedBackend::new();
    b.clear(dims);
    b.merge_view(&node(dims, [1, 1, 1], 2.0), &identity(dims, Eye::Left, 0.0))
        .unwrap();
    b.merge_view(&node(dims, [2, 2, 2], 2.0), &identity(dims, Eye::Left, 0.0))
        .unwrap();
    let out = b.extract(10.0).unwrap();
    assert!(out.eye_rgba(Eye::Left).chunks(4).all(|px| px == [1, 1, 1, 255]));
    // right eye never merged
    assert!(out.eye_rgba(Eye::Right).chunks(4).all(|px| px == [0, 0, 0, 255]));
    assert!(out.eye_depth(Eye::Right).iter().all(|d| *d == 10.0));
}

#[test]
fn depth_hint_lets_a_later_nearer_view_win() {
    let dims = Dims::new(8, 4).unwrap();
    let mut b = OrderedBackend::new();
    b.clear(dims);
    b.merge_view(&node(dims, [1, 1, 1], 2.0), &identity(dims, Eye::Left, 0.015))
        .unwrap();
    b.merge_view(&node(dims, [2, 2, 2], 2.0), &identity(dims, Eye::Left, 0.0))
        .unwrap();
    let out = b.extract(10.0).unwrap();
    assert!(out.eye_rgba(Eye::Left).chunks(4).all(|px| px == [2, 2, 2, 255]));
}

#[test]
fn merge_requires_clear() {
    let dims = Dims::new(4, 2).unwrap();
    let mut b = OrderedBackend::new();
    assert!(
        b.merge_view(&node(dims, [0; 3], 1.0), &identity(dims, Eye::Left, 0.0))
            .is_err()
    );
    assert!(b.extract(1.0).is_err());
}
