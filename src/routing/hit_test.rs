use std::f32::consts::FRAC_PI_2;

use crate::config::Tolerances;

use super::geometry::distance_to_line;
use super::types::{HitRect, PathSegment, Point, Rect};

/// Lower bound for the subdivision budget so a zero tolerance still yields a
/// finite number of pieces.
const MIN_HIT_BUDGET: f32 = 1.0;
const MAX_CUBIC_SUBDIVISIONS: usize = 64;
const DEGENERATE_LENGTH: f32 = 1e-4;
/// A rounded corner's arc strays at most this fraction of its radius past the
/// ends of the two straight runs it joins.
const CORNER_ARC_REACH: f32 = 0.75;

/// Tolerance-inflated boxes covering the drawn footprint of `segments`.
pub fn hit_rects(start: Point, segments: &[PathSegment], tolerance: f32) -> Vec<HitRect> {
    hit_rects_with(start, segments, tolerance, &Tolerances::default())
}

pub fn hit_rects_with(
    start: Point,
    segments: &[PathSegment],
    tolerance: f32,
    tol: &Tolerances,
) -> Vec<HitRect> {
    let budget = (tolerance * tol.hit_budget_factor).max(MIN_HIT_BUDGET);
    let mut starts = Vec::with_capacity(segments.len());
    let mut cursor = start;
    for segment in segments {
        starts.push(cursor);
        cursor = segment.end();
    }

    let mut rects = Vec::with_capacity(segments.len());
    for (idx, segment) in segments.iter().enumerate() {
        let from = starts[idx];
        if !segment.contributes_to_hit_test() {
            continue;
        }
        match *segment {
            PathSegment::Straight { end, .. } => {
                straight_rects(from, end, tolerance, budget, tol.axis, &mut rects);
            }
            PathSegment::Quadratic { control, end, .. } => {
                let before = idx.checked_sub(1).map(|prev| (starts[prev], &segments[prev]));
                let after = segments.get(idx + 1).map(|next| (end, next));
                if corner_is_covered([from, control, end], before, after, tolerance, tol.axis) {
                    continue;
                }
                if let Some(bounds) = Rect::bounding(&[from, control, end]) {
                    rects.push(HitRect {
                        bounds: bounds.inflate(tolerance),
                    });
                }
            }
            PathSegment::Cubic {
                control1,
                control2,
                end,
                ..
            } => cubic_rects([from, control1, control2, end], tolerance, budget, &mut rects),
        }
    }
    rects
}

/// `Some(true)` for a horizontal vector, `Some(false)` for a vertical one.
fn axis_of(vector: Point, axis_tolerance: f32) -> Option<bool> {
    if vector.y.abs() <= axis_tolerance {
        Some(true)
    } else if vector.x.abs() <= axis_tolerance {
        Some(false)
    } else {
        None
    }
}

/// Whether the boxes of the straight runs on either side of a right-angle
/// corner already contain its whole arc at `tolerance`.
fn corner_is_covered(
    corner: [Point; 3],
    before: Option<(Point, &PathSegment)>,
    after: Option<(Point, &PathSegment)>,
    tolerance: f32,
    axis_tolerance: f32,
) -> bool {
    let [entry, control, exit] = corner;
    let incoming = control - entry;
    let outgoing = exit - control;
    let radius = incoming.length().max(outgoing.length());
    if radius * CORNER_ARC_REACH > tolerance {
        return false;
    }
    let (Some(in_axis), Some(out_axis)) = (
        axis_of(incoming, axis_tolerance),
        axis_of(outgoing, axis_tolerance),
    ) else {
        return false;
    };
    if in_axis == out_axis {
        return false;
    }
    // The run must be a hit-tested straight along the same leg, heading the
    // same way.
    let runs_along = |run: Option<(Point, &PathSegment)>, leg: Point, leg_axis: bool| {
        let Some((from, segment)) = run else {
            return false;
        };
        let PathSegment::Straight { end, .. } = *segment else {
            return false;
        };
        let delta = end - from;
        segment.contributes_to_hit_test()
            && axis_of(delta, axis_tolerance) == Some(leg_axis)
            && delta.dot(leg) > 0.0
    };
    runs_along(before, incoming, in_axis) && runs_along(after, outgoing, out_axis)
}

fn straight_rects(
    from: Point,
    to: Point,
    tolerance: f32,
    budget: f32,
    axis_tolerance: f32,
    rects: &mut Vec<HitRect>,
) {
    let delta = to - from;
    let length = delta.length();
    if length <= DEGENERATE_LENGTH {
        return;
    }
    if delta.x.abs() <= axis_tolerance || delta.y.abs() <= axis_tolerance {
        rects.push(HitRect {
            bounds: Rect::new(
                from.x.min(to.x),
                from.y.min(to.y),
                from.x.max(to.x),
                from.y.max(to.y),
            )
            .inflate(tolerance),
        });
        return;
    }
    let pieces = diagonal_pieces(length, delta, tolerance, budget);
    for idx in 0..pieces {
        let a = lerp(from, to, idx as f32 / pieces as f32);
        let b = lerp(from, to, (idx + 1) as f32 / pieces as f32);
        rects.push(oriented_box(a, b, tolerance));
    }
}

/// How many pieces a diagonal run of `length` along `direction` needs so each
/// piece's box stays within `budget` of its own width.
fn diagonal_pieces(length: f32, direction: Point, tolerance: f32, budget: f32) -> usize {
    let sin = (direction.y / length).abs();
    let cos = (direction.x / length).abs();
    let expansion = length * sin.min(cos) + 2.0 * tolerance;
    if expansion > budget {
        (expansion / budget).ceil() as usize
    } else {
        1
    }
}

fn cubic_rects(control: [Point; 4], tolerance: f32, budget: f32, rects: &mut Vec<HitRect>) {
    let [p0, p1, p2, p3] = control;
    let net_length = p0.distance(p1) + p1.distance(p2) + p2.distance(p3);
    if net_length <= DEGENERATE_LENGTH {
        return;
    }

    let by_turn = (control_polygon_turn(&control) * 3.0).ceil() as usize;
    let deviation = distance_to_line(p1, p0, p3).max(distance_to_line(p2, p0, p3));
    let by_deviation = (deviation / budget).ceil() as usize;
    let chord = p3 - p0;
    let chord_length = chord.length();
    let arc_estimate = (chord_length + net_length) / 2.0;
    let by_length = if chord_length > DEGENERATE_LENGTH {
        diagonal_pieces(arc_estimate, chord * (arc_estimate / chord_length), tolerance, budget)
    } else {
        1
    };
    let pieces = by_turn
        .max(by_deviation)
        .max(by_length)
        .clamp(1, MAX_CUBIC_SUBDIVISIONS);

    let mut prev = p0;
    for idx in 1..=pieces {
        let next = cubic_at(&control, idx as f32 / pieces as f32);
        if prev.distance(next) > DEGENERATE_LENGTH {
            rects.push(oriented_box(prev, next, tolerance));
        }
        prev = next;
    }
}

/// Total turning of the control polygon, in quarter turns.
fn control_polygon_turn(control: &[Point; 4]) -> f32 {
    let legs: Vec<Point> = control
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|leg| leg.length() > DEGENERATE_LENGTH)
        .collect();
    let turn: f32 = legs
        .windows(2)
        .map(|pair| pair[0].cross(pair[1]).atan2(pair[0].dot(pair[1])).abs())
        .sum();
    turn / FRAC_PI_2
}

fn cubic_at(control: &[Point; 4], t: f32) -> Point {
    let mt = 1.0 - t;
    let b0 = mt * mt * mt;
    let b1 = 3.0 * mt * mt * t;
    let b2 = 3.0 * mt * t * t;
    let b3 = t * t * t;
    control[0] * b0 + control[1] * b1 + control[2] * b2 + control[3] * b3
}

fn lerp(a: Point, b: Point, t: f32) -> Point {
    a + (b - a) * t
}

/// Box around the segment offset by `tolerance` along its normal, flattened
/// to axis-aligned bounds.
fn oriented_box(a: Point, b: Point, tolerance: f32) -> HitRect {
    let dir = (b - a).normalized();
    let normal = Point::new(-dir.y, dir.x) * tolerance;
    let corners = [a + normal, a - normal, b + normal, b - normal];
    let bounds = Rect::bounding(&corners).unwrap_or(Rect::new(a.x, a.y, b.x, b.y));
    HitRect { bounds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::segments::to_segments;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn hit(rects: &[HitRect], point: Point) -> bool {
        rects.iter().any(|rect| rect.contains(point))
    }

    #[test]
    fn axis_aligned_straight_is_one_box() {
        let rects = hit_rects(p(0.0, 0.0), &[PathSegment::straight(p(100.0, 0.0))], 5.0);
        assert_eq!(
            rects,
            vec![HitRect {
                bounds: Rect::new(-5.0, -5.0, 105.0, 5.0)
            }]
        );
    }

    #[test]
    fn zero_length_straight_is_skipped() {
        let rects = hit_rects(p(3.0, 3.0), &[PathSegment::straight(p(3.0, 3.0))], 5.0);
        assert!(rects.is_empty());
    }

    #[test]
    fn long_diagonal_is_subdivided() {
        let rects = hit_rects(p(0.0, 0.0), &[PathSegment::straight(p(100.0, 100.0))], 5.0);
        // expansion 100 + 10 against a budget of 15
        assert_eq!(rects.len(), 8);
        assert!(hit(&rects, p(50.0, 50.0)));
        assert!(hit(&rects, p(52.0, 48.0)));
        assert!(!hit(&rects, p(100.0, 0.0)));
        assert!(!hit(&rects, p(0.0, 100.0)));
    }

    #[test]
    fn short_diagonal_stays_whole() {
        let rects = hit_rects(p(0.0, 0.0), &[PathSegment::straight(p(3.0, 4.0))], 5.0);
        assert_eq!(rects.len(), 1);
    }

    #[test]
    fn quadratic_gets_single_bounding_box() {
        let rects = hit_rects(
            p(0.0, 0.0),
            &[PathSegment::quadratic(p(10.0, 0.0), p(10.0, 10.0))],
            2.0,
        );
        assert_eq!(
            rects,
            vec![HitRect {
                bounds: Rect::new(-2.0, -2.0, 12.0, 12.0)
            }]
        );
    }

    #[test]
    fn excluded_segments_produce_nothing() {
        let segments = [
            PathSegment::straight(p(50.0, 0.0)),
            PathSegment::quadratic(p(55.0, 0.0), p(55.0, 5.0)).with_hit_test(false),
            PathSegment::straight(p(55.0, 60.0)),
        ];
        let rects = hit_rects(p(0.0, 0.0), &segments, 5.0);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[1].bounds, Rect::new(50.0, 0.0, 60.0, 65.0));
    }

    fn quadratic_midpoint(from: Point, control: Point, end: Point) -> Point {
        from * 0.25 + control * 0.5 + end * 0.25
    }

    #[test]
    fn small_rounded_corner_is_hit_at_any_tolerance() {
        let waypoints = [p(0.0, 0.0), p(10.0, 0.0), p(100.0, 0.0), p(100.0, 90.0), p(100.0, 100.0)];
        let segments = to_segments(&waypoints, 5.0);
        let PathSegment::Quadratic { control, end, .. } = segments[2] else {
            panic!("expected a rounded corner, got {:?}", segments[2]);
        };
        let arc_mid = quadratic_midpoint(segments[1].end(), control, end);
        assert_eq!(arc_mid, p(98.75, 1.25));
        for tolerance in [0.0, 1.0, 2.0, 3.0, 5.0] {
            let rects = hit_rects(p(0.0, 0.0), &segments, tolerance);
            assert!(hit(&rects, arc_mid), "arc midpoint missed at tolerance {tolerance}");
        }
    }

    #[test]
    fn corner_box_is_skipped_only_when_straights_cover_it() {
        let waypoints = [p(0.0, 0.0), p(10.0, 0.0), p(100.0, 0.0), p(100.0, 90.0), p(100.0, 100.0)];
        let segments = to_segments(&waypoints, 5.0);
        // 3.75 is the reach of a radius-5 arc past its straights.
        assert_eq!(hit_rects(p(0.0, 0.0), &segments, 3.75).len(), 4);
        assert_eq!(hit_rects(p(0.0, 0.0), &segments, 3.0).len(), 5);
    }

    #[test]
    fn corner_between_touching_corners_keeps_its_box() {
        // The middle leg is used up by two corners, leaving a zero-length
        // straight that contributes no box.
        let waypoints = [p(0.0, 0.0), p(20.0, 0.0), p(20.0, 4.0), p(40.0, 4.0)];
        let segments = to_segments(&waypoints, 2.0);
        let rects = hit_rects(p(0.0, 0.0), &segments, 5.0);
        for (idx, segment) in segments.iter().enumerate() {
            if let PathSegment::Quadratic { control, end, .. } = *segment {
                let from = segments[idx - 1].end();
                assert!(hit(&rects, quadratic_midpoint(from, control, end)));
            }
        }
    }

    #[test]
    fn cubic_follows_the_curve() {
        let segment = PathSegment::cubic(p(50.0, 0.0), p(50.0, 100.0), p(100.0, 100.0));
        let rects = hit_rects(p(0.0, 0.0), &[segment], 5.0);
        assert!(rects.len() >= 2);
        assert!(rects.len() <= MAX_CUBIC_SUBDIVISIONS);
        assert!(hit(&rects, p(50.0, 50.0)));
        assert!(hit(&rects, p(0.0, 0.0)));
        assert!(hit(&rects, p(100.0, 100.0)));
        assert!(!hit(&rects, p(0.0, 100.0)));
        assert!(!hit(&rects, p(100.0, 0.0)));
    }

    #[test]
    fn zero_tolerance_is_finite_and_capped() {
        let segment = PathSegment::cubic(p(5000.0, -3000.0), p(-4000.0, 9000.0), p(800.0, 800.0));
        let rects = hit_rects(p(0.0, 0.0), &[segment], 0.0);
        assert!(!rects.is_empty());
        assert!(rects.len() <= MAX_CUBIC_SUBDIVISIONS);
        assert!(rects.iter().all(|rect| rect.bounds.is_finite()));
    }

    #[test]
    fn straight_cubic_needs_one_piece() {
        let segment = PathSegment::cubic(p(30.0, 0.0), p(70.0, 0.0), p(100.0, 0.0));
        let rects = hit_rects(p(0.0, 0.0), &[segment], 5.0);
        assert_eq!(rects.len(), 1);
    }

    #[test]
    fn quarter_turn_counts_one() {
        let control = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(10.0, 20.0)];
        assert!((control_polygon_turn(&control) - 1.0).abs() < 1e-5);
    }
}
