//! Widening polylines into solid polygons.

use super::{cross, rot90, rotate_deg, try_normalize, union_outline, Point2d, Vector2d};
use cgmath::prelude::*;
use itertools::Itertools;
use std::f64::consts::{FRAC_PI_2, PI};

/// The number of segments used to approximate a quarter circle in round joins.
const QUARTER_CIRCLE_SEGMENTS: f64 = 16.0;

/// Distance below which two points of a polyline are merged.
const EPSILON: f64 = 1e-9;

/// A single leg of a polyline.
#[derive(Clone, Copy)]
struct Leg {
    dir: Vector2d,
    normal: Vector2d,
}

/// Splits the buffer of a polyline into convex pieces whose union is the buffer.
///
/// Each leg becomes a rectangle `2 * half_width` wide, extended by `half_width`
/// past the first and last points for square caps. Each bend adds a circular
/// sector on the outer side of the turn for a round join.
///
/// Returns `None` if the polyline has fewer than two distinct points.
pub fn buffer_pieces(points: &[Point2d], half_width: f64) -> Option<Vec<Vec<Point2d>>> {
    let points = points
        .iter()
        .copied()
        .dedup_by(|a, b| (*b - *a).magnitude() < EPSILON)
        .collect::<Vec<_>>();
    if points.len() < 2 {
        return None;
    }

    let legs = points
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| {
            let dir = try_normalize(b - a)?;
            Some(Leg { dir, normal: rot90(dir) })
        })
        .collect::<Option<Vec<_>>>()?;

    let last = legs.len() - 1;
    let mut pieces = Vec::with_capacity(2 * legs.len());
    for (idx, leg) in legs.iter().enumerate() {
        let mut start = points[idx];
        let mut end = points[idx + 1];
        if idx == 0 {
            start = start - half_width * leg.dir;
        }
        if idx == last {
            end = end + half_width * leg.dir;
        }
        let side = half_width * leg.normal;
        pieces.push(vec![start - side, end - side, end + side, start + side]);
    }

    for (idx, (a, b)) in legs.iter().tuple_windows().enumerate() {
        let p = points[idx + 1];
        let turn = cross(a.dir, b.dir);
        let cos = a.dir.dot(b.dir);
        let sweep = if turn.abs() > EPSILON {
            turn.atan2(cos)
        } else if cos < 0.0 {
            PI
        } else {
            continue;
        };
        // The outer side is opposite to the direction of turning
        let offset = if sweep > 0.0 { -half_width } else { half_width };
        let steps = ((sweep.abs() / (FRAC_PI_2 / QUARTER_CIRCLE_SEGMENTS)).ceil() as usize).max(1);
        let from = offset * a.normal;

        let mut sector = vec![p, p + from];
        for k in 1..steps {
            let angle = sweep * k as f64 / steps as f64;
            sector.push(p + rotate_deg(from, angle.to_degrees()));
        }
        sector.push(p + offset * b.normal);
        pieces.push(sector);
    }
    Some(pieces)
}

/// Widens a polyline into a closed polygon with the given half-width.
///
/// The ends use square caps, extending the line by `half_width` past each end point.
/// Joins are round on the outer side of each turn.
/// Returns `None` if the polyline has fewer than two distinct points.
pub fn buffer_polyline(points: &[Point2d], half_width: f64) -> Option<Vec<Point2d>> {
    union_outline(&buffer_pieces(points, half_width)?)
}
