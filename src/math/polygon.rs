//! Operations on polygons stored as rings of vertices.
//!
//! Rings produced by this module are always closed, i.e. the first vertex is
//! repeated at the end. Functions accepting rings work with either form.

use super::{cross, Point2d, Vector2d};
use cgmath::prelude::*;
use itertools::Itertools;

/// Distance below which two vertices are treated as the same point.
const EPSILON: f64 = 1e-9;

/// Returns the ring without its closing vertex.
pub fn open_ring(ring: &[Point2d]) -> &[Point2d] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Appends the first vertex to the end of the ring if it is not already closed.
pub fn close_ring(mut ring: Vec<Point2d>) -> Vec<Point2d> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last || ring.len() == 1 {
            ring.push(first);
        }
    }
    ring
}

/// Computes the signed area of a ring via the shoelace formula.
/// Positive when the vertices wind counter-clockwise in a y-up frame.
pub fn signed_area(ring: &[Point2d]) -> f64 {
    let ring = open_ring(ring);
    0.5 * ring
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
}

/// Computes the unsigned area enclosed by a ring.
pub fn polygon_area(ring: &[Point2d]) -> f64 {
    signed_area(ring).abs()
}

/// Returns true if `point` lies inside the ring or on its boundary.
pub fn contains_point(ring: &[Point2d], point: Point2d) -> bool {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return false;
    }

    let on_edge = ring.iter().circular_tuple_windows().any(|(&a, &b)| {
        let ab = b - a;
        let ap = point - a;
        cross(ab, ap).abs() <= EPSILON * ab.magnitude().max(1.0)
            && ap.dot(ab) >= -EPSILON
            && ap.dot(ab) <= ab.magnitude2() + EPSILON
    });
    if on_edge {
        return true;
    }

    // Even-odd ray cast towards positive x
    let mut inside = false;
    for (&a, &b) in ring.iter().circular_tuple_windows() {
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Clips a polygon against a convex polygon using Sutherland-Hodgman clipping.
///
/// The subject may be concave; the result can then contain zero-width bridges
/// along the clip boundary, which do not affect its area.
pub fn clip_to_convex(subject: &[Point2d], clip: &[Point2d]) -> Vec<Point2d> {
    let orientation = signed_area(clip).signum();
    if orientation == 0.0 {
        return vec![];
    }

    let mut output = open_ring(subject).to_vec();
    for (&a, &b) in open_ring(clip).iter().circular_tuple_windows() {
        if output.is_empty() {
            break;
        }
        let edge = b - a;
        let inside = |p: Point2d| orientation * cross(edge, p - a) >= 0.0;
        let input = std::mem::take(&mut output);
        for (&p, &q) in input.iter().circular_tuple_windows() {
            match (inside(p), inside(q)) {
                (true, true) => output.push(q),
                (true, false) => output.push(line_intersection(p, q, a, edge)),
                (false, true) => {
                    output.push(line_intersection(p, q, a, edge));
                    output.push(q);
                }
                (false, false) => {}
            }
        }
    }
    close_ring(output)
}

/// Computes the area of the intersection between a polygon and a convex polygon.
pub fn intersection_area(subject: &[Point2d], convex: &[Point2d]) -> f64 {
    polygon_area(&clip_to_convex(subject, convex))
}

/// Intersects the segment `p`-`q` with the infinite line through `a` along `dir`.
fn line_intersection(p: Point2d, q: Point2d, a: Point2d, dir: Vector2d) -> Point2d {
    let pq = q - p;
    let denom = cross(dir, pq);
    if denom.abs() < EPSILON {
        return p;
    }
    let t = cross(dir, a - p) / denom;
    p + t * pq
}

/// Distance within which a vertex is treated as lying on an edge.
const SNAP: f64 = 1e-7;

/// Distance within which the ends of two boundary segments are joined.
const CHAIN: f64 = 1e-6;

/// A convex polygon wound counter-clockwise in a y-up frame, with its bounding box.
struct ConvexPiece {
    ring: Vec<Point2d>,
    min: Point2d,
    max: Point2d,
}

/// Where a point lies relative to a convex piece.
enum Location {
    Outside,
    Inside,
    /// On the boundary, along the given edge.
    Boundary(Vector2d),
}

impl ConvexPiece {
    /// Returns `None` for pieces without area.
    fn new(ring: &[Point2d]) -> Option<Self> {
        let mut ring = open_ring(ring)
            .iter()
            .copied()
            .dedup_by(|a, b| (*b - *a).magnitude() < SNAP)
            .collect::<Vec<_>>();
        while ring.len() > 1 && (ring[ring.len() - 1] - ring[0]).magnitude() < SNAP {
            ring.pop();
        }
        if ring.len() < 3 {
            return None;
        }
        let area = signed_area(&ring);
        if area.abs() < SNAP {
            return None;
        }
        if area < 0.0 {
            ring.reverse();
        }
        let min = ring.iter().fold(ring[0], |m, p| Point2d::new(m.x.min(p.x), m.y.min(p.y)));
        let max = ring.iter().fold(ring[0], |m, p| Point2d::new(m.x.max(p.x), m.y.max(p.y)));
        Some(Self { ring, min, max })
    }

    fn locate(&self, point: Point2d) -> Location {
        if point.x < self.min.x - SNAP
            || point.x > self.max.x + SNAP
            || point.y < self.min.y - SNAP
            || point.y > self.max.y + SNAP
        {
            return Location::Outside;
        }
        let mut nearest: Option<(f64, Vector2d)> = None;
        for (&a, &b) in self.ring.iter().circular_tuple_windows() {
            let edge = b - a;
            let dist = cross(edge, point - a) / edge.magnitude();
            if dist < -SNAP {
                return Location::Outside;
            }
            if nearest.map_or(true, |(d, _)| dist < d) {
                nearest = Some((dist, edge));
            }
        }
        match nearest {
            Some((dist, edge)) if dist <= SNAP => Location::Boundary(edge),
            Some(_) => Location::Inside,
            None => Location::Outside,
        }
    }
}

/// Computes the outline of the union of convex polygons.
///
/// Edges are split wherever they meet an edge of another polygon, and the parts
/// covered on both sides are discarded. The remaining parts are chained into rings
/// and the ring enclosing the largest area is returned, closed and without
/// collinear vertices. Holes are not reported, and if the union has several
/// components only the largest is returned.
///
/// Returns `None` if no polygon has any area.
pub fn union_outline(polygons: &[Vec<Point2d>]) -> Option<Vec<Point2d>> {
    let pieces = polygons
        .iter()
        .filter_map(|ring| ConvexPiece::new(ring))
        .collect::<Vec<_>>();

    let edges = pieces
        .iter()
        .enumerate()
        .flat_map(|(idx, piece)| {
            piece
                .ring
                .iter()
                .copied()
                .circular_tuple_windows()
                .map(move |(a, b)| (idx, a, b))
        })
        .collect::<Vec<_>>();

    let mut splits = vec![Vec::new(); edges.len()];
    for (e, f) in (0..edges.len()).tuple_combinations() {
        let ((i, a, b), (j, c, d)) = (edges[e], edges[f]);
        if i == j || !boxes_overlap(a, b, c, d) {
            continue;
        }
        for p in [c, d] {
            if on_segment_interior(a, b, p) {
                splits[e].push(p);
            }
        }
        for p in [a, b] {
            if on_segment_interior(c, d, p) {
                splits[f].push(p);
            }
        }
        if let Some(x) = crossing(a, b, c, d) {
            splits[e].push(x);
            splits[f].push(x);
        }
    }

    let mut boundary = Vec::new();
    for (&(owner, a, b), mut points) in edges.iter().zip(splits) {
        let dir = b - a;
        points.sort_by(|p, q| (*p - a).dot(dir).total_cmp(&(*q - a).dot(dir)));
        let mut prev = a;
        for next in points.into_iter().chain(std::iter::once(b)) {
            if (next - prev).magnitude() < SNAP {
                continue;
            }
            if on_union_boundary(&pieces, owner, prev, next) {
                boundary.push((prev, next));
            }
            prev = next;
        }
    }

    chain_rings(&boundary)
        .into_iter()
        .max_by(|a, b| signed_area(a).total_cmp(&signed_area(b)))
        .filter(|ring| signed_area(ring) > 0.0)
        .map(|ring| close_ring(drop_collinear(ring)))
}

/// Returns true if the part of an edge of `pieces[owner]` from `a` to `b`
/// separates the union from the outside.
fn on_union_boundary(pieces: &[ConvexPiece], owner: usize, a: Point2d, b: Point2d) -> bool {
    let dir = b - a;
    let mid = a + 0.5 * dir;
    pieces
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != owner)
        .all(|(idx, piece)| match piece.locate(mid) {
            Location::Outside => true,
            Location::Inside => false,
            // Pieces on opposite sides of a shared edge hide it.
            // Pieces on the same side share it, and the first one keeps it.
            Location::Boundary(edge) => edge.dot(dir) > 0.0 && idx > owner,
        })
}

/// Links directed segments end to start into closed rings.
/// Where several segments leave the same point, the rightmost turn is taken.
fn chain_rings(segments: &[(Point2d, Point2d)]) -> Vec<Vec<Point2d>> {
    let mut used = vec![false; segments.len()];
    let mut rings = Vec::new();
    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let (start, mut end) = segments[first];
        let mut dir = end - start;
        let mut ring = vec![start];
        loop {
            if (end - start).magnitude() < CHAIN {
                rings.push(ring);
                break;
            }
            let next = (0..segments.len())
                .filter(|&idx| !used[idx] && (segments[idx].0 - end).magnitude() < CHAIN)
                .map(|idx| {
                    let d = segments[idx].1 - segments[idx].0;
                    (idx, cross(dir, d).atan2(dir.dot(d)))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let idx = match next {
                Some((idx, _)) => idx,
                // Open chains only arise from rounding and are dropped
                None => break,
            };
            used[idx] = true;
            ring.push(segments[idx].0);
            dir = segments[idx].1 - segments[idx].0;
            end = segments[idx].1;
        }
    }
    rings
}

/// Removes vertices lying on a straight line between their neighbours from an open ring.
fn drop_collinear(ring: Vec<Point2d>) -> Vec<Point2d> {
    let collinear = |a: Point2d, b: Point2d, c: Point2d| {
        let (ab, bc) = (b - a, c - b);
        cross(ab, bc).abs() <= EPSILON * ab.magnitude() * bc.magnitude() && ab.dot(bc) > 0.0
    };
    let mut out: Vec<Point2d> = Vec::with_capacity(ring.len());
    for p in ring {
        while out.len() >= 2 && collinear(out[out.len() - 2], out[out.len() - 1], p) {
            out.pop();
        }
        out.push(p);
    }
    while out.len() > 3 {
        let n = out.len();
        if collinear(out[n - 2], out[n - 1], out[0]) {
            out.pop();
        } else if collinear(out[n - 1], out[0], out[1]) {
            out.remove(0);
        } else {
            break;
        }
    }
    out
}

fn boxes_overlap(a: Point2d, b: Point2d, c: Point2d, d: Point2d) -> bool {
    a.x.min(b.x) <= c.x.max(d.x) + SNAP
        && c.x.min(d.x) <= a.x.max(b.x) + SNAP
        && a.y.min(b.y) <= c.y.max(d.y) + SNAP
        && c.y.min(d.y) <= a.y.max(b.y) + SNAP
}

/// Returns true if `p` lies on the segment `a`-`b` away from both of its ends.
fn on_segment_interior(a: Point2d, b: Point2d, p: Point2d) -> bool {
    let ab = b - a;
    let len = ab.magnitude();
    let along = (p - a).dot(ab) / len;
    cross(ab, p - a).abs() / len < SNAP && along > SNAP && along < len - SNAP
}

/// The point where the segments `p`-`q` and `a`-`b` cross,
/// if they cross away from the ends of both.
fn crossing(p: Point2d, q: Point2d, a: Point2d, b: Point2d) -> Option<Point2d> {
    let (r, s) = (q - p, b - a);
    let (lr, ls) = (r.magnitude(), s.magnitude());
    let denom = cross(r, s);
    if denom.abs() <= EPSILON * lr * ls {
        return None;
    }
    let t = cross(a - p, s) / denom;
    let u = cross(a - p, r) / denom;
    let interior = |t: f64, len: f64| t * len > SNAP && (1.0 - t) * len > SNAP;
    (interior(t, lr) && interior(u, ls)).then(|| p + t * r)
}
