use glam::DVec2;
use kiseki::geometry::{
    catmull_rom, cubic_bezier, generate_spline, lerp, path_length, simplify_path,
};
use kiseki::sim::Pose;

const EPS: f64 = 1e-9;

#[test]
fn lerp_endpoints_and_midpoint() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(10.0, 20.0);
    assert!(lerp(a, b, 0.0).distance(a) < EPS);
    assert!(lerp(a, b, 1.0).distance(b) < EPS);
    assert!(lerp(a, b, 0.5).distance(DVec2::new(5.0, 10.0)) < EPS);
}

#[test]
fn cubic_bezier_hits_its_endpoints() {
    let p0 = DVec2::new(0.0, 0.0);
    let p1 = DVec2::new(10.0, 30.0);
    let p2 = DVec2::new(20.0, -30.0);
    let p3 = DVec2::new(30.0, 0.0);
    assert!(cubic_bezier(p0, p1, p2, p3, 0.0).distance(p0) < EPS);
    assert!(cubic_bezier(p0, p1, p2, p3, 1.0).distance(p3) < EPS);
}

#[test]
fn catmull_rom_interpolates_its_inner_knots() {
    let p0 = DVec2::new(0.0, 0.0);
    let p1 = DVec2::new(10.0, 10.0);
    let p2 = DVec2::new(20.0, 0.0);
    let p3 = DVec2::new(30.0, 10.0);
    assert!(catmull_rom(p0, p1, p2, p3, 0.0).distance(p1) < EPS);
    assert!(catmull_rom(p0, p1, p2, p3, 1.0).distance(p2) < EPS);
}

#[test]
fn spline_with_fewer_than_two_points_is_unchanged() {
    assert!(generate_spline(&[], 20).is_empty());
    let single = [Pose::new(1.0, 2.0, 3.0)];
    assert_eq!(generate_spline(&single, 20), single.to_vec());
}

#[test]
fn spline_through_two_points_is_a_lerp() {
    let points = [Pose::new(0.0, 0.0, 0.0), Pose::new(10.0, 0.0, 90.0)];
    let steps = 10;
    let samples = generate_spline(&points, steps);
    assert_eq!(samples.len(), steps + 1);
    for (i, sample) in samples.iter().enumerate() {
        let t = i as f64 / steps as f64;
        let expected = lerp(points[0].position(), points[1].position(), t);
        assert!(sample.position().distance(expected) < EPS);
        assert!((sample.heading - 90.0 * t).abs() < EPS);
    }
}

#[test]
fn spline_passes_through_every_input_point() {
    let points = [
        Pose::new(0.0, 0.0, 0.0),
        Pose::new(24.0, 24.0, 45.0),
        Pose::new(48.0, 0.0, 0.0),
        Pose::new(72.0, 24.0, 90.0),
    ];
    let samples = generate_spline(&points, 30);
    for point in &points {
        let hit = samples
            .iter()
            .any(|s| s.position().distance(point.position()) < 1e-6);
        assert!(hit, "spline must pass through ({}, {})", point.x, point.y);
    }
    // First and last samples are the exact endpoints.
    assert!(samples[0].position().distance(points[0].position()) < EPS);
    assert!(
        samples
            .last()
            .unwrap()
            .position()
            .distance(points[3].position())
            < EPS
    );
}

#[test]
fn simplify_collapses_collinear_runs() {
    let points: Vec<DVec2> = (0..10).map(|i| DVec2::new(i as f64, 0.0)).collect();
    let simplified = simplify_path(&points, 0.5);
    assert_eq!(simplified, vec![points[0], points[9]]);
}

#[test]
fn simplify_keeps_corners_beyond_epsilon() {
    // An L-shape: jitter along each leg stays under epsilon, the corner
    // itself deviates far beyond it.
    let points = [
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.1),
        DVec2::new(20.0, 0.05),
        DVec2::new(30.0, 0.0),
        DVec2::new(30.05, 10.0),
        DVec2::new(30.0, 20.0),
    ];
    let simplified = simplify_path(&points, 1.0);
    assert_eq!(
        simplified,
        vec![points[0], points[3], points[5]],
        "legs collapse to their endpoints, the corner survives"
    );
}

#[test]
fn simplify_is_idempotent() {
    let points: Vec<DVec2> = (0..50)
        .map(|i| {
            let t = i as f64 / 49.0;
            DVec2::new(t * 100.0, (t * std::f64::consts::TAU).sin() * 20.0)
        })
        .collect();
    let once = simplify_path(&points, 2.0);
    let twice = simplify_path(&once, 2.0);
    assert_eq!(once, twice);
}

#[test]
fn simplify_leaves_short_inputs_alone() {
    let points = [DVec2::new(0.0, 0.0), DVec2::new(5.0, 5.0)];
    assert_eq!(simplify_path(&points, 1.0), points.to_vec());
}

#[test]
fn path_length_sums_segments() {
    let points = [
        DVec2::new(0.0, 0.0),
        DVec2::new(3.0, 4.0),
        DVec2::new(3.0, 10.0),
    ];
    assert!((path_length(&points) - 11.0).abs() < EPS);
    assert_eq!(path_length(&points[..1]), 0.0);
    assert_eq!(path_length(&[]), 0.0);
}
