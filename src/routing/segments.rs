use crate::config::Tolerances;

use super::types::{PathSegment, Point};

/// Straights shorter than this are kept for continuity but not hit-tested.
const DEGENERATE_LENGTH: f32 = 1e-4;

/// Turn a polyline into drawable segments, rounding right-angle corners by
/// `corner_radius`.
pub fn to_segments(waypoints: &[Point], corner_radius: f32) -> Vec<PathSegment> {
    to_segments_with(waypoints, corner_radius, &Tolerances::default())
}

pub fn to_segments_with(
    waypoints: &[Point],
    corner_radius: f32,
    tol: &Tolerances,
) -> Vec<PathSegment> {
    if waypoints.len() < 2 {
        return Vec::new();
    }
    let last = waypoints.len() - 1;
    let mut segments = Vec::with_capacity(waypoints.len() * 2);
    let mut cursor = waypoints[0];

    for idx in 1..last {
        let corner = waypoints[idx];
        let rounded = if corner_radius > 0.0 {
            round_corner(waypoints[idx - 1], corner, waypoints[idx + 1], corner_radius, tol)
        } else {
            None
        };
        match rounded {
            Some(RoundedCorner { entry, exit }) => {
                segments.push(straight(cursor, entry));
                segments.push(PathSegment::quadratic(corner, exit));
                cursor = exit;
            }
            None => {
                segments.push(straight(cursor, corner));
                cursor = corner;
            }
        }
    }
    segments.push(straight(cursor, waypoints[last]));
    segments
}

fn straight(from: Point, to: Point) -> PathSegment {
    PathSegment::straight(to).with_hit_test(from.distance(to) > DEGENERATE_LENGTH)
}

struct RoundedCorner {
    entry: Point,
    exit: Point,
}

/// `Some(true)` for a horizontal vector, `Some(false)` for a vertical one.
fn axis_of(vector: Point, tolerance: f32) -> Option<bool> {
    if vector.y.abs() < tolerance {
        Some(true)
    } else if vector.x.abs() < tolerance {
        Some(false)
    } else {
        None
    }
}

fn round_corner(
    prev: Point,
    corner: Point,
    next: Point,
    radius: f32,
    tol: &Tolerances,
) -> Option<RoundedCorner> {
    let incoming = corner - prev;
    let outgoing = next - corner;
    let in_len = incoming.length();
    let out_len = outgoing.length();
    if in_len <= tol.axis || out_len <= tol.axis {
        return None;
    }
    if axis_of(incoming, tol.axis)? == axis_of(outgoing, tol.axis)? {
        return None;
    }
    let radius = radius.min(in_len / 2.0).min(out_len / 2.0);
    if radius < tol.min_corner_radius {
        return None;
    }
    Some(RoundedCorner {
        entry: corner - incoming.normalized() * radius,
        exit: corner + outgoing.normalized() * radius,
    })
}
