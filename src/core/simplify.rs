use crate::core::Action;

/// Perpendicular distance from `point` to the line through `start` and `end`
/// in the `(at, pos)` plane.
///
/// When `start` and `end` coincide this is the plain euclidean distance from
/// `point` to `start`.
#[must_use]
pub fn perpendicular_distance(point: Action, start: Action, end: Action) -> f64 {
    let dx = f64::from(end.at) - f64::from(start.at);
    let dy = f64::from(end.pos) - f64::from(start.pos);
    let pvx = f64::from(point.at) - f64::from(start.at);
    let pvy = f64::from(point.pos) - f64::from(start.pos);

    let magnitude = dx.hypot(dy);
    if magnitude > 0.0 {
        // the cross product is exact for integer inputs, so collinear points
        // measure exactly zero
        (dx * pvy - dy * pvx).abs() / magnitude
    } else {
        pvx.hypot(pvy)
    }
}

/// Ramer-Douglas-Peucker simplification.
///
/// The first and last input points are always kept and the output is an
/// order-preserving subsequence of `points`. Inputs shorter than two points
/// are returned unchanged.
#[must_use]
pub fn simplify(points: &[Action], epsilon: f64) -> Vec<Action> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(points.len());
    simplify_span(points, epsilon, &mut out);
    out
}

fn simplify_span(points: &[Action], epsilon: f64, out: &mut Vec<Action>) {
    let last = points.len() - 1;
    let (start, end) = (points[0], points[last]);

    let mut max_distance = 0.0;
    let mut split = 0;
    for (index, point) in points.iter().enumerate().take(last).skip(1) {
        let distance = perpendicular_distance(*point, start, end);
        // strict `>` keeps the lowest index on ties
        if distance > max_distance {
            max_distance = distance;
            split = index;
        }
    }

    if max_distance > epsilon {
        simplify_span(&points[..=split], epsilon, out);
        // both halves share the split point
        out.pop();
        simplify_span(&points[split..], epsilon, out);
    } else {
        out.push(start);
        out.push(end);
    }
}
