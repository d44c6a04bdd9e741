//! Closed-contour simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! A traced contour is a closed ring. It is split at the vertex farthest
//! from the first vertex; each half is simplified as an open chain and
//! the halves are rejoined. The tolerance is scaled to the contour's
//! perimeter by the caller (`epsilon = ratio * perimeter`).

use crate::types::Point;

/// Perimeter of a closed ring, including the closing segment.
#[must_use]
pub fn closed_perimeter(points: &[Point]) -> f64 {
    match points {
        [] | [_] => 0.0,
        [first, .., last] => {
            let open: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
            open + last.distance(*first)
        }
    }
}

/// Simplify a closed ring so that no removed vertex lies farther than
/// `epsilon` from the simplified outline.
///
/// The result does not repeat the first vertex at the end. Rings with
/// fewer than 3 distinct vertices come back deduplicated but otherwise
/// unchanged; callers reject them as degenerate.
#[must_use = "returns the simplified ring"]
pub fn simplify_closed(points: &[Point], epsilon: f64) -> Vec<Point> {
    let ring = dedup_ring(points);
    if ring.len() < 3 {
        return ring;
    }

    let first = ring[0];
    let split = ring
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0), |(best, best_d), (i, p)| {
            let d = p.distance_squared(first);
            if d > best_d { (i, d) } else { (best, best_d) }
        })
        .0;

    // First half: ring[0..=split]. Second half: ring[split..] then back to ring[0].
    let head = simplify_open(&ring[..=split], epsilon);
    let mut tail_chain = ring[split..].to_vec();
    tail_chain.push(first);
    let tail = simplify_open(&tail_chain, epsilon);

    let mut result = head;
    // `tail` starts at ring[split] (already the last of `head`) and ends at ring[0].
    if tail.len() > 2 {
        result.extend_from_slice(&tail[1..tail.len() - 1]);
    }
    result
}

/// Simplify an open chain, keeping both endpoints.
#[must_use = "returns the simplified chain"]
pub fn simplify_open(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, epsilon, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `epsilon`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, epsilon: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, epsilon, kept);
        rdp_recurse(points, max_idx, end, epsilon, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

/// Drop consecutive duplicates, including a closing vertex equal to the
/// first.
fn dedup_ring(points: &[Point]) -> Vec<Point> {
    let mut ring: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if ring.last() != Some(&p) {
            ring.push(p);
        }
    }
    while ring.len() > 1 && ring.last() == ring.first() {
        ring.pop();
    }
    ring
}
