use super::types::{Point, Rect};

/// Smallest rect containing whichever inputs are present.
pub fn union(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (Some(rect), None) | (None, Some(rect)) => Some(rect),
        (None, None) => None,
    }
}

/// Three points on one horizontal or one vertical line, within `tolerance`.
pub fn collinear(a: Point, b: Point, c: Point, tolerance: f32) -> bool {
    let horizontal = (b.y - a.y).abs() < tolerance && (c.y - b.y).abs() < tolerance;
    let vertical = (b.x - a.x).abs() < tolerance && (c.x - b.x).abs() < tolerance;
    horizontal || vertical
}

pub fn path_length(points: &[Point]) -> f32 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// A segment touches the rect if either end is inside or it crosses an edge.
/// Near-collinear and touching contacts count as intersections.
pub fn segment_intersects_rect(a: Point, b: Point, rect: &Rect, epsilon: f32) -> bool {
    let min_x = a.x.min(b.x);
    let max_x = a.x.max(b.x);
    let min_y = a.y.min(b.y);
    let max_y = a.y.max(b.y);
    if max_x < rect.left - epsilon
        || min_x > rect.right + epsilon
        || max_y < rect.top - epsilon
        || min_y > rect.bottom + epsilon
    {
        return false;
    }
    if rect.contains(a) || rect.contains(b) {
        return true;
    }
    let corners = rect.corners();
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    edges
        .iter()
        .any(|&(c, d)| segments_intersect(a, b, c, d, epsilon))
}

/// Whether any segment of `points` touches `rect`.
pub fn path_intersects_rect(points: &[Point], rect: &Rect, epsilon: f32) -> bool {
    points
        .windows(2)
        .any(|pair| segment_intersects_rect(pair[0], pair[1], rect, epsilon))
}

pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point, epsilon: f32) -> bool {
    fn orient(a: Point, b: Point, c: Point) -> f32 {
        (b - a).cross(c - a)
    }
    fn on_segment(a: Point, b: Point, c: Point, epsilon: f32) -> bool {
        c.x >= a.x.min(b.x) - epsilon
            && c.x <= a.x.max(b.x) + epsilon
            && c.y >= a.y.min(b.y) - epsilon
            && c.y <= a.y.max(b.y) + epsilon
    }
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    if (o1 > epsilon && o2 < -epsilon || o1 < -epsilon && o2 > epsilon)
        && (o3 > epsilon && o4 < -epsilon || o3 < -epsilon && o4 > epsilon)
    {
        return true;
    }
    if o1.abs() <= epsilon && on_segment(a, b, c, epsilon) {
        return true;
    }
    if o2.abs() <= epsilon && on_segment(a, b, d, epsilon) {
        return true;
    }
    if o3.abs() <= epsilon && on_segment(c, d, a, epsilon) {
        return true;
    }
    if o4.abs() <= epsilon && on_segment(c, d, b, epsilon) {
        return true;
    }
    false
}

/// Perpendicular distance from `point` to the infinite line through `a` and `b`.
pub fn distance_to_line(point: Point, a: Point, b: Point) -> f32 {
    let chord = b - a;
    let len = chord.length();
    if len <= f32::EPSILON {
        return point.distance(a);
    }
    (chord.cross(point - a) / len).abs()
}
