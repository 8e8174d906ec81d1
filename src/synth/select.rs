use std::cmp::Ordering;

use glam::DVec3;

use crate::{collection::store::PanoramaCollection, foundation::core::Vec3};

fn distances(collection: &PanoramaCollection, eye: Vec3) -> Vec<f64> {
    let eye = eye.as_dvec3();
    collection
        .positions()
        .map(|p| (p.as_dvec3() - eye).length_squared())
        .collect()
}

fn by_distance(dist: &[f64]) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a: &usize, b: &usize| dist[*a].total_cmp(&dist[*b]).then(a.cmp(b))
}

/// Order nodes by relevance to `eye`, nearest first, at most `max_views` entries.
///
/// The list is seeded with the two globally nearest nodes (ties broken by index) and grown by
/// inserting the nearest remaining node at its ascending-distance position, which amounts to a
/// stable sort by squared distance.
///
/// # Panics
///
/// Panics when the collection holds fewer than two nodes.
pub fn select_views(collection: &PanoramaCollection, eye: Vec3, max_views: usize) -> Vec<usize> {
    assert!(
        collection.len() >= 2,
        "view selection needs at least two nodes, got {}",
        collection.len()
    );
    let dist = distances(collection, eye);
    let mut order: Vec<usize> = (0..dist.len()).collect();
    order.sort_by(by_distance(&dist));
    order.truncate(max_views);
    order
}

/// Sign pattern of `eye - node` on each axis.
fn side_of(eye: DVec3, node: DVec3) -> [bool; 3] {
    let d = eye - node;
    [
        d.x.is_sign_negative(),
        d.y.is_sign_negative(),
        d.z.is_sign_negative(),
    ]
}

/// Like [`select_views`], but after the nearest node prefer nodes that surround the eye.
///
/// Each pick maximizes the number of axes on which some selected node lies on the opposite side
/// of the eye from the nearest one; ties go to the nearer node. The result is sorted by distance.
///
/// # Panics
///
/// Panics when the collection holds fewer than two nodes.
pub fn select_views_axis_diverse(
    collection: &PanoramaCollection,
    eye: Vec3,
    max_views: usize,
) -> Vec<usize> {
    assert!(
        collection.len() >= 2,
        "view selection needs at least two nodes, got {}",
        collection.len()
    );
    let dist = distances(collection, eye);
    let positions: Vec<DVec3> = collection.positions().map(|p| p.as_dvec3()).collect();
    let eye = eye.as_dvec3();
    let cmp = by_distance(&dist);

    let Some(nearest) = (0..dist.len()).min_by(&cmp) else {
        return Vec::new();
    };
    let reference = side_of(eye, positions[nearest]);
    let mut covered = [false; 3];
    let mut chosen = vec![nearest];

    while chosen.len() < max_views.min(dist.len()) {
        let score = |i: usize| -> (usize, [bool; 3]) {
            let side = side_of(eye, positions[i]);
            let axes: [bool; 3] = std::array::from_fn(|k| covered[k] || side[k] != reference[k]);
            (axes.iter().filter(|a| **a).count(), axes)
        };
        let best = (0..dist.len())
            .filter(|i| !chosen.contains(i))
            .min_by(|a, b| score(*b).0.cmp(&score(*a).0).then_with(|| cmp(a, b)));
        let Some(best) = best else { break };
        let axes = score(best).1;
        covered = axes;
        chosen.push(best);
    }

    chosen.sort_by(&cmp);
    chosen.truncate(max_views);
    chosen
}

#[cfg(test)]
#[path = "../../tests/unit/synth/select.rs"]
mod tests;
