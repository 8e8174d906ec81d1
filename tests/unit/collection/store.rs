use super::*;
use crate::container::half::f32_to_f16_bits;

#[path = "../../support/exr_builder.rs"]
mod builder;

use builder::{ExrBuilder, TestSamples, ZIP};

fn flat_input(position: Vec3, width: u32, height: u32) -> NodeInput {
    let dims = Dims::new(width, height).unwrap();
    NodeInput::new(
        position,
        dims,
        vec![255; dims.pixel_count() * 4],
        vec![2.0; dims.pixel_count()],
    )
}

#[test]
fn build_requires_nodes_and_shared_dims() {
    assert!(PanoramaCollection::build(Vec::new()).is_err());
    let err = PanoramaCollection::build(vec![
        flat_input(Vec3::ZERO, 4, 2),
        flat_input(Vec3::X, 8, 4),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("node 1"));

    let c = PanoramaCollection::build(vec![flat_input(Vec3::ZERO, 4, 2), flat_input(Vec3::X, 4, 2)])
        .unwrap();
    assert_eq!(c.len(), 2);
    assert_eq!(c.dims(), Dims::new(4, 2).unwrap());
    assert_eq!(c.positions().collect::<Vec<_>>(), [Vec3::ZERO, Vec3::X]);
}

fn view_channels(b: ExrBuilder, view: &str, value: f32, depth: f32, n: usize) -> ExrBuilder {
    let h = |v: f32| TestSamples::Half(vec![f32_to_f16_bits(v); n]);
    b.channel(&format!("Image.{view}.R"), h(value))
        .channel(&format!("Image.{view}.G"), h(value))
        .channel(&format!("Image.{view}.B"), h(value))
        .channel(&format!("Image.{view}.A"), h(1.0))
        .channel(&format!("Depth.{view}.V"), TestSamples::Float(vec![depth; n]))
}

#[test]
fn multi_view_container_yields_one_node_per_view() {
    let b = ExrBuilder::new(4, 2).compression(ZIP);
    let b = view_channels(b, "a", 0.0, 1.0, 8);
    let b = view_channels(b, "b", 1.0, 3.0, 8)
        .string_vector("multiView", &["a", "b"])
        .string(
            "Note",
            r#"{"camera_positions":[{"x":0,"y":0,"z":0},{"x":1,"y":0,"z":0}]}"#,
        );
    let image = crate::container::decode::decode_container(&b.build()).unwrap();
    let meta = CaptureMetadata::from_image(&image).unwrap().unwrap();

    let mut builder = CollectionBuilder::new();
    builder
        .add_multi_view(&image, &meta, &ToneMapOptions::default())
        .unwrap();
    let c = builder.build().unwrap();
    assert_eq!(c.len(), 2);
    assert_eq!(c.node(1).unwrap().position(), Vec3::X);
    assert_eq!(c.node(0).unwrap().color_at(0, 0), [0, 0, 0, 255]);
    assert_eq!(c.node(1).unwrap().color_at(3, 1), [255, 255, 255, 255]);
    assert_eq!(c.node(1).unwrap().depth_at(0, 0), 3.0);
}

#[test]
fn multi_view_requires_positions() {
    let b = view_channels(ExrBuilder::new(2, 1), "a", 0.5, 1.0, 2).string_vector("multiView", &["a"]);
    let image = crate::container::decode::decode_container(&b.build()).unwrap();
    let err = CollectionBuilder::new()
        .add_multi_view(&image, &CaptureMetadata::default(), &ToneMapOptions::default())
        .unwrap_err();
    assert!(matches!(err, OdsError::Validation(_)));
}

fn single_view(depth: f32, note: Option<&str>) -> Vec<u8> {
    let n = 8;
    let h = |v: f32| TestSamples::Half(vec![f32_to_f16_bits(v); n]);
    let mut b = ExrBuilder::new(4, 2)
        .channel("A", h(1.0))
        .channel("B", h(0.5))
        .channel("G", h(0.5))
        .channel("R", h(0.5))
        .channel("Z", TestSamples::Float(vec![depth; n]));
    if let Some(note) = note {
        b = b.string("Note", note);
    }
    b.build()
}

#[test]
fn decode_nodes_in_parallel() {
    let a = single_view(1.0, None);
    let b = single_view(2.0, Some(r#"{"camera_position":{"x":0,"y":2,"z":0}}"#));
    let sources = [
        ContainerSource {
            bytes: &a,
            position: Some(Vec3::X),
        },
        ContainerSource {
            bytes: &b,
            position: None,
        },
    ];
    let mut builder = CollectionBuilder::new();
    builder
        .decode_nodes(&sources, &NodeChannels::default(), &ToneMapOptions::default())
        .unwrap();
    assert_eq!(builder.len(), 2);
    let c = builder.build().unwrap();
    assert_eq!(c.node(0).unwrap().position(), Vec3::X);
    assert_eq!(c.node(1).unwrap().position(), Vec3::new(0.0, 2.0, 0.0));
    assert_eq!(c.node(1).unwrap().depth()[5], 2.0);
}

#[test]
fn decode_nodes_is_all_or_nothing() {
    let good = single_view(1.0, None);
    let sources = [
        ContainerSource {
            bytes: &good,
            position: Some(Vec3::ZERO),
        },
        ContainerSource {
            bytes: &good[..20],
            position: Some(Vec3::ZERO),
        },
        ContainerSource {
            bytes: &good,
            position: None,
        },
    ];
    let mut builder = CollectionBuilder::new();
    let err = builder
        .decode_nodes(&sources, &NodeChannels::default(), &ToneMapOptions::default())
        .unwrap_err();
    assert!(matches!(err, OdsError::Decode(_) | OdsError::Validation(_)));
    assert!(builder.is_empty());
}
