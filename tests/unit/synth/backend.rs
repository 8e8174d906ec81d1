use super::*;
use crate::{
    collection::node::NodeInput,
    foundation::core::Vec3,
    synth::plan::{SynthesisRequest, plan_synthesis},
};

fn gradient_collection(dims: Dims, positions: &[Vec3]) -> PanoramaCollection {
    let inputs = positions
        .iter()
        .map(|p| {
            let mut color = Vec::with_capacity(dims.pixel_count() * 4);
            for y in 0..dims.height {
                for x in 0..dims.width {
                    color.extend_from_slice(&[(x * 30) as u8, (y * 60) as u8, 200, 255]);
                }
            }
            NodeInput::new(*p, dims, color, vec![2.0; dims.pixel_count()])
        })
        .collect();
    PanoramaCollection::build(inputs).unwrap()
}

fn pool(threads: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .unwrap()
}

#[test]
fn detection_follows_worker_count() {
    assert_eq!(pool(1).install(detect_backend), BackendKind::Ordered);
    assert_eq!(pool(2).install(detect_backend), BackendKind::AtomicMin);
}

#[test]
fn create_backend_reports_its_kind() {
    for kind in [BackendKind::AtomicMin, BackendKind::Ordered] {
        assert_eq!(create_backend(kind).unwrap().kind(), kind);
    }
    assert_eq!(BackendKind::AtomicMin.name(), "atomic-min");
    assert_eq!(
        serde_json::from_str::<BackendKind>("\"ordered\"").unwrap(),
        BackendKind::Ordered
    );
}

#[test]
fn identity_synthesis_reproduces_the_node_in_both_eyes() {
    let dims = Dims::new(8, 4).unwrap();
    let c = gradient_collection(dims, &[Vec3::new(0.2, 0.1, -0.3)]);
    let request = SynthesisRequest {
        ipd: 0.0,
        ..SynthesisRequest::at(Vec3::new(0.2, 0.1, -0.3))
    };
    let plan = plan_synthesis(&c, &request).unwrap();

    for kind in [BackendKind::AtomicMin, BackendKind::Ordered] {
        let mut backend = create_backend(kind).unwrap();
        let out = execute_synthesis(backend.as_mut(), &c, &plan).unwrap();
        let src = c.node(0).unwrap().color();
        for eye in Eye::BOTH {
            let got = out.eye_rgba(eye);
            for (i, (g, s)) in got.iter().zip(src).enumerate() {
                let tol = match (kind, i % 4) {
                    (BackendKind::Ordered, _) | (_, 3) => 0,
                    (_, 2) => 2,
                    _ => 1,
                };
                assert!(
                    (i32::from(*g) - i32::from(*s)).abs() <= tol,
                    "{kind:?} {eye:?} byte {i}: {g} vs {s}"
                );
            }
            for d in out.eye_depth(eye) {
                assert!((f64::from(*d) - 2.0).abs() <= 10.0 / 4095.0 + 1e-5);
            }
        }
    }
}

#[test]
fn backends_agree_on_coverage_and_depth() {
    let dims = Dims::new(32, 16).unwrap();
    let c = gradient_collection(
        dims,
        &[Vec3::new(0.5, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.2)],
    );
    let request = SynthesisRequest::at(Vec3::new(0.1, 0.05, 0.0));
    let plan = plan_synthesis(&c, &request).unwrap();

    let mut atomic = create_backend(BackendKind::AtomicMin).unwrap();
    let mut ordered = create_backend(BackendKind::Ordered).unwrap();
    let a = execute_synthesis(atomic.as_mut(), &c, &plan).unwrap();
    let o = execute_synthesis(ordered.as_mut(), &c, &plan).unwrap();

    for (da, dord) in a.depth().iter().zip(o.depth()) {
        let hole_a = *da == 10.0;
        let hole_o = *dord == 10.0;
        assert_eq!(hole_a, hole_o);
        assert!(*da <= *dord + 1e-5);
        assert!(f64::from(dord - da) <= 10.0 / 4095.0 + 1e-5, "{da} vs {dord}");
    }
}
