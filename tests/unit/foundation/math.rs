use super::*;

#[test]
fn fmod_wraps_negative_angles() {
    assert!((fmod(-0.5, TAU) - (TAU - 0.5)).abs() < 1e-12);
    assert!((fmod(TAU + 0.25, TAU) - 0.25).abs() < 1e-12);
}

#[test]
fn azimuth_polar_guard() {
    assert_eq!(azimuth(DVec3::new(0.0, 0.0, 1.0)), 0.5 * PI);
    assert_eq!(azimuth(DVec3::new(0.0, 0.0, -1.0)), 1.5 * PI);
    assert_eq!(azimuth(DVec3::ZERO), PI);
}

#[test]
fn azimuth_is_wrapped_into_full_turn() {
    let a = azimuth(DVec3::new(1.0, -1.0, 0.0));
    assert!((a - 1.75 * PI).abs() < 1e-12);
    let b = azimuth(DVec3::new(-1.0, 1e-3, 0.0));
    assert!(b > 0.0 && b < PI + 1e-3);
}

#[test]
fn spherical_point_roundtrips_angles() {
    let (az, inc) = (1.2, 2.1);
    let p = spherical_point(az, inc, 3.0);
    assert!((p.length() - 3.0).abs() < 1e-12);
    assert!((azimuth(p) - az).abs() < 1e-12);
    assert!((inclination(p, p.length()) - inc).abs() < 1e-12);
}

#[test]
fn pixel_size_peaks_at_equator_and_vanishes_at_poles() {
    let rows = 64;
    let equator = spherical_pixel_size(FRAC_PI_2, rows);
    let near_pole = spherical_pixel_size(0.5 * PI / f64::from(rows), rows);
    assert!(equator > near_pole);
    assert!(spherical_pixel_size(0.0, rows).abs() < 1e-12);
}
