//! Pure curve math: interpolation primitives, Catmull-Rom spline sampling
//! and Ramer-Douglas-Peucker path simplification.
//!
//! Everything here is deterministic and allocation-light; the preview layer
//! re-runs these functions on every edit frame.

use crate::sim::Pose;
use glam::DVec2;

/// Default simplification tolerance for freehand strokes, in inches.
pub const DEFAULT_EPSILON_IN: f64 = 2.0;

/// Linear interpolation between two points.
pub fn lerp(a: DVec2, b: DVec2, t: f64) -> DVec2 {
    a.lerp(b, t)
}

/// A point on the cubic bezier defined by `p0..p3` at `t` in `[0, 1]`.
pub fn cubic_bezier(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, t: f64) -> DVec2 {
    let u = 1.0 - t;
    let u2 = u * u;
    let t2 = t * t;
    u2 * u * p0 + 3.0 * u2 * t * p1 + 3.0 * u * t2 * p2 + t2 * t * p3
}

/// A point on the Catmull-Rom segment from `p1` to `p2` at `t` in `[0, 1]`,
/// using the standard 0.5-weighted t/t²/t³ basis.
pub fn catmull_rom(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, t: f64) -> DVec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Samples a dense preview path through `points`.
///
/// Fewer than two points are returned unchanged; exactly two are linearly
/// interpolated over `steps` samples; more run a Catmull-Rom spline with
/// clamped end control points and `ceil(steps / (n - 1))` samples per
/// segment. Headings are linearly interpolated within each segment rather
/// than derived from curvature.
pub fn generate_spline(points: &[Pose], steps: usize) -> Vec<Pose> {
    if points.len() < 2 || steps == 0 {
        return points.to_vec();
    }

    if points.len() == 2 {
        let mut samples = Vec::with_capacity(steps + 1);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let p = lerp(points[0].position(), points[1].position(), t);
            let heading = points[0].heading + (points[1].heading - points[0].heading) * t;
            samples.push(Pose::new(p.x, p.y, heading));
        }
        return samples;
    }

    let n = points.len();
    let per_segment = steps.div_ceil(n - 1).max(1);
    let mut samples = Vec::with_capacity((n - 1) * per_segment + 1);

    for seg in 0..(n - 1) {
        let p0 = points[seg.saturating_sub(1)].position();
        let p1 = points[seg].position();
        let p2 = points[seg + 1].position();
        let p3 = points[(seg + 2).min(n - 1)].position();

        let include_end = seg == n - 2;
        let last = if include_end { per_segment } else { per_segment - 1 };
        for i in 0..=last {
            let t = i as f64 / per_segment as f64;
            let p = catmull_rom(p0, p1, p2, p3, t);
            let heading =
                points[seg].heading + (points[seg + 1].heading - points[seg].heading) * t;
            samples.push(Pose::new(p.x, p.y, heading));
        }
    }

    samples
}

/// Ramer-Douglas-Peucker simplification of a point list.
///
/// Finds the point farthest from the chord between the endpoints; if it
/// deviates more than `epsilon`, both halves are simplified recursively,
/// otherwise the whole run collapses to its two endpoints. Fewer than three
/// points are returned unchanged. Idempotent for a fixed `epsilon`.
pub fn simplify_path(points: &[DVec2], epsilon: f64) -> Vec<DVec2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let (farthest, max_dist) = points
        .iter()
        .enumerate()
        .skip(1)
        .take(points.len() - 2)
        .map(|(i, p)| (i, perpendicular_distance(*p, first, last)))
        .fold((0, 0.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

    if max_dist > epsilon {
        let mut left = simplify_path(&points[..=farthest], epsilon);
        let right = simplify_path(&points[farthest..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Distance from `p` to the infinite line through `a` and `b`, degrading to
/// point distance when the chord is degenerate.
fn perpendicular_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let chord = b - a;
    let len = chord.length();
    if len < f64::EPSILON {
        return p.distance(a);
    }
    (chord.perp_dot(p - a)).abs() / len
}

/// Total length of a polyline.
pub fn path_length(points: &[DVec2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
