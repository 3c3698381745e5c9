use tracing::{debug, trace};

use crate::config::Tolerances;

use super::geometry::{collinear, path_intersects_rect, path_length, segment_intersects_rect, union};
use super::types::{Orientation, Point, Rect, RouteParameters};

/// Points closer than this on both axes are treated as the same waypoint.
const SAME_POINT_EPSILON: f32 = 1e-4;
/// Loop-side priority for self-connections whose ports are not a facing pair.
const SELF_LOOP_PRIORITY: [Orientation; 4] = [
    Orientation::Right,
    Orientation::Left,
    Orientation::Bottom,
    Orientation::Top,
];

/// The decision-table entry that produced a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteBranch {
    SelfConnection,
    Collinear,
    SameSide,
    Opposite,
    LShape,
    Fallback,
}

struct RouteContext<'a> {
    start: Point,
    end: Point,
    source: Orientation,
    target: Orientation,
    source_ext: Point,
    target_ext: Point,
    source_bounds: Option<Rect>,
    target_bounds: Option<Rect>,
    union: Option<Rect>,
    gap: f32,
    tol: &'a Tolerances,
}

impl<'a> RouteContext<'a> {
    fn new(params: &RouteParameters, tol: &'a Tolerances) -> Self {
        Self {
            start: params.start,
            end: params.end,
            source: params.source_orientation,
            target: params.target_orientation,
            source_ext: params.source_extension(),
            target_ext: params.target_extension(),
            source_bounds: params.source_bounds,
            target_bounds: params.target_bounds,
            union: union(params.source_bounds, params.target_bounds),
            gap: params.back_edge_gap,
            tol,
        }
    }

    fn bounds(&self) -> impl Iterator<Item = &Rect> {
        self.source_bounds.iter().chain(self.target_bounds.iter())
    }

    fn hits_any_bounds(&self, a: Point, b: Point) -> bool {
        self.bounds()
            .any(|rect| segment_intersects_rect(a, b, rect, self.tol.intersection_epsilon))
    }

    /// `[start, source_ext, interior..., target_ext, end]`
    fn framed(&self, interior: &[Point]) -> Vec<Point> {
        let mut points = Vec::with_capacity(interior.len() + 4);
        points.push(self.start);
        points.push(self.source_ext);
        points.extend_from_slice(interior);
        points.push(self.target_ext);
        points.push(self.end);
        points
    }
}

type Predicate = fn(&RouteContext<'_>) -> bool;
type Handler = fn(&RouteContext<'_>) -> Option<Vec<Point>>;

/// Evaluated top to bottom; the first entry whose predicate holds and whose
/// handler produces a path wins. Anything left over takes the fallback.
const DECISION_TABLE: [(RouteBranch, Predicate, Handler); 5] = [
    (RouteBranch::SelfConnection, is_self_connection, route_self_connection),
    (RouteBranch::Collinear, is_collinear_and_clear, route_collinear),
    (RouteBranch::SameSide, is_same_side, route_same_side),
    (RouteBranch::Opposite, is_opposite, route_opposite),
    (RouteBranch::LShape, is_perpendicular, route_l_shape),
];

/// Route with the default tolerances.
pub fn route(params: &RouteParameters) -> Vec<Point> {
    route_with(params, &Tolerances::default())
}

pub fn route_with(params: &RouteParameters, tol: &Tolerances) -> Vec<Point> {
    route_traced(params, tol).1
}

/// Which branch of the decision table handles `params`.
pub fn select_branch(params: &RouteParameters, tol: &Tolerances) -> RouteBranch {
    route_traced(params, tol).0
}

pub fn route_traced(params: &RouteParameters, tol: &Tolerances) -> (RouteBranch, Vec<Point>) {
    let ctx = RouteContext::new(params, tol);
    let (branch, points) = DECISION_TABLE
        .iter()
        .filter(|(_, predicate, _)| predicate(&ctx))
        .find_map(|&(branch, _, handler)| {
            let points = handler(&ctx);
            if points.is_none() {
                trace!(?branch, "branch declined");
            }
            points.map(|points| (branch, points))
        })
        .unwrap_or_else(|| (RouteBranch::Fallback, fallback_path(&ctx)));
    let points = optimize_waypoints(&points, tol.optimize);
    debug!(?branch, waypoints = points.len(), "routed connection");
    (branch, points)
}

/// True when the path has to turn back on itself: a self-connection, or an
/// endpoint sitting behind the other end's stub.
pub fn needs_loopback_routing(params: &RouteParameters) -> bool {
    if is_same_bounds(params.source_bounds, params.target_bounds) {
        return true;
    }
    let source_ext = params.source_extension();
    let target_ext = params.target_extension();
    (target_ext - source_ext).dot(params.source_orientation.unit()) < 0.0
        || (source_ext - target_ext).dot(params.target_orientation.unit()) < 0.0
}

fn is_same_bounds(a: Option<Rect>, b: Option<Rect>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

// ── 1. Self-connection ──────────────────────────────────────────────

fn is_self_connection(ctx: &RouteContext<'_>) -> bool {
    is_same_bounds(ctx.source_bounds, ctx.target_bounds)
}

fn route_self_connection(ctx: &RouteContext<'_>) -> Option<Vec<Point>> {
    let rect = ctx.source_bounds?;
    let side = self_loop_side(ctx, &rect);
    debug!(?side, "self-connection loop side");
    Some(ring_route(ctx, &rect, side))
}

fn self_loop_side(ctx: &RouteContext<'_>, rect: &Rect) -> Orientation {
    let center = rect.center();
    let (s, t) = (ctx.source_ext, ctx.target_ext);
    match (ctx.source, ctx.target) {
        (Orientation::Left, Orientation::Right) | (Orientation::Right, Orientation::Left) => {
            if s.y < center.y && t.y < center.y {
                Orientation::Top
            } else {
                Orientation::Bottom
            }
        }
        (Orientation::Top, Orientation::Bottom) | (Orientation::Bottom, Orientation::Top) => {
            if s.x < center.x && t.x < center.x {
                Orientation::Left
            } else {
                Orientation::Right
            }
        }
        (source, target) => SELF_LOOP_PRIORITY
            .into_iter()
            .find(|side| *side == source || *side == target)
            .unwrap_or(Orientation::Right),
    }
}

// ── 2. Collinear and clear ──────────────────────────────────────────

fn is_collinear_and_clear(ctx: &RouteContext<'_>) -> bool {
    if ctx.source.opposite() != ctx.target {
        return false;
    }
    if (ctx.target_ext - ctx.source_ext).dot(ctx.source.unit()) < 0.0 {
        return false;
    }
    let points = [ctx.start, ctx.source_ext, ctx.target_ext, ctx.end];
    let tolerance = ctx.tol.collinear;
    let on_axis = points.windows(2).all(|pair| {
        if ctx.source.is_horizontal() {
            (pair[1].y - pair[0].y).abs() < tolerance
        } else {
            (pair[1].x - pair[0].x).abs() < tolerance
        }
    });
    on_axis && !ctx.hits_any_bounds(ctx.source_ext, ctx.target_ext)
}

fn route_collinear(ctx: &RouteContext<'_>) -> Option<Vec<Point>> {
    Some(ctx.framed(&[]))
}

// ── 3. Same side ────────────────────────────────────────────────────

fn is_same_side(ctx: &RouteContext<'_>) -> bool {
    ctx.source == ctx.target
}

fn route_same_side(ctx: &RouteContext<'_>) -> Option<Vec<Point>> {
    let obstacle = ctx.union.or_else(|| Rect::bounding(&[ctx.source_ext, ctx.target_ext]))?;
    Some(ring_route(ctx, &obstacle, ctx.source))
}

// ── 4. Opposite-facing ports ────────────────────────────────────────

fn is_opposite(ctx: &RouteContext<'_>) -> bool {
    ctx.source.opposite() == ctx.target
}

fn route_opposite(ctx: &RouteContext<'_>) -> Option<Vec<Point>> {
    let (s, t) = (ctx.source_ext, ctx.target_ext);
    let horizontal = ctx.source.is_horizontal();
    let clearance = (t - s).dot(ctx.source.unit()) >= 0.0;

    if clearance {
        return Some(if horizontal {
            let mid_x = (s.x + t.x) / 2.0;
            ctx.framed(&[Point::new(mid_x, s.y), Point::new(mid_x, t.y)])
        } else {
            let mid_y = (s.y + t.y) / 2.0;
            ctx.framed(&[Point::new(s.x, mid_y), Point::new(t.x, mid_y)])
        });
    }

    let (p1, p2) = if horizontal {
        let mid_y = (s.y + t.y) / 2.0;
        (Point::new(s.x, mid_y), Point::new(t.x, mid_y))
    } else {
        let mid_x = (s.x + t.x) / 2.0;
        (Point::new(mid_x, s.y), Point::new(mid_x, t.y))
    };
    let Some(combined) = ctx.union else {
        return Some(ctx.framed(&[p1, p2]));
    };
    if !path_intersects_rect(&[s, p1, p2, t], &combined, ctx.tol.intersection_epsilon) {
        return Some(ctx.framed(&[p1, p2]));
    }
    trace!("cross-axis S-bend blocked by node bounds");

    let side = if horizontal {
        if (t.y - combined.top).abs() < (t.y - combined.bottom).abs() {
            Orientation::Top
        } else {
            Orientation::Bottom
        }
    } else if (t.x - combined.left).abs() < (t.x - combined.right).abs() {
        Orientation::Left
    } else {
        Orientation::Right
    };
    Some(ring_route(ctx, &combined, side))
}

// ── 5. L-shape ──────────────────────────────────────────────────────

fn is_perpendicular(ctx: &RouteContext<'_>) -> bool {
    ctx.source.is_horizontal() != ctx.target.is_horizontal()
}

fn route_l_shape(ctx: &RouteContext<'_>) -> Option<Vec<Point>> {
    let (s, t) = (ctx.source_ext, ctx.target_ext);
    let corner = if ctx.source.is_horizontal() {
        Point::new(t.x, s.y)
    } else {
        Point::new(s.x, t.y)
    };
    let leaves_forward = (corner - s).dot(ctx.source.unit()) >= 0.0;
    let arrives_forward = (t - corner).dot(ctx.target.unit()) <= 0.0;
    if !leaves_forward || !arrives_forward {
        return None;
    }
    if ctx.hits_any_bounds(s, corner) || ctx.hits_any_bounds(corner, t) {
        return None;
    }
    Some(ctx.framed(&[corner]))
}

// ── 6. Fallback ─────────────────────────────────────────────────────

/// The approach side is fixed by the target port: a Top port is entered from
/// above, a Left port from the left, and so on.
fn fallback_path(ctx: &RouteContext<'_>) -> Vec<Point> {
    let approach = ctx.target;
    if let Some(combined) = ctx.union {
        return ring_route(ctx, &combined, approach);
    }

    let (s, t) = (ctx.source_ext, ctx.target_ext);
    let (mid, target_coord, source_coord) = if approach.is_horizontal() {
        ((s.x + t.x) / 2.0, t.x, s.x)
    } else {
        ((s.y + t.y) / 2.0, t.y, s.y)
    };
    let sign = match approach {
        Orientation::Left | Orientation::Top => -1.0,
        Orientation::Right | Orientation::Bottom => 1.0,
    };
    // The channel has to sit on the approach side of the target stub.
    let channel = if (mid - target_coord) * sign >= 0.0 {
        mid
    } else {
        match approach {
            Orientation::Left | Orientation::Top => source_coord.min(target_coord) - ctx.gap,
            Orientation::Right | Orientation::Bottom => source_coord.max(target_coord) + ctx.gap,
        }
    };
    if approach.is_horizontal() {
        ctx.framed(&[Point::new(channel, s.y), Point::new(channel, t.y)])
    } else {
        ctx.framed(&[Point::new(s.x, channel), Point::new(t.x, channel)])
    }
}

// ── Ring walk ───────────────────────────────────────────────────────

struct RingCandidate {
    escapes: usize,
    corners: usize,
    length: f32,
    points: Vec<Point>,
}

/// Route around `obstacle` (inflated by the back-edge gap) so that the path
/// passes along `loop_side`.
fn ring_route(ctx: &RouteContext<'_>, obstacle: &Rect, loop_side: Orientation) -> Vec<Point> {
    let ring = obstacle
        .inflate(ctx.gap)
        .include(ctx.source_ext)
        .include(ctx.target_ext);
    let exits = escape_candidates(ctx, ctx.source_ext, ctx.source, ctx.target_bounds, &ring);
    let entries = escape_candidates(ctx, ctx.target_ext, ctx.target, ctx.source_bounds, &ring);

    let mut best: Option<RingCandidate> = None;
    for &(exit_side, exit_point, exit_penalty) in &exits {
        for &(entry_side, entry_point, entry_penalty) in &entries {
            for clockwise in [true, false] {
                let Some(sides) = walk_sides(exit_side, entry_side, loop_side, clockwise) else {
                    continue;
                };
                let mut interior = Vec::with_capacity(sides.len() + 1);
                interior.push(exit_point);
                interior.extend(sides.windows(2).map(|pair| ring_corner(&ring, pair[0], pair[1])));
                interior.push(entry_point);
                let points = ctx.framed(&interior);
                let candidate = RingCandidate {
                    escapes: exit_penalty + entry_penalty,
                    corners: sides.len() - 1,
                    length: path_length(&points),
                    points,
                };
                if best.as_ref().is_none_or(|current| candidate.beats(current)) {
                    best = Some(candidate);
                }
            }
        }
    }
    match best {
        Some(candidate) => candidate.points,
        None => ctx.framed(&[]),
    }
}

impl RingCandidate {
    fn beats(&self, other: &RingCandidate) -> bool {
        (self.escapes, self.corners)
            .cmp(&(other.escapes, other.corners))
            .then_with(|| self.length.total_cmp(&other.length))
            .is_lt()
    }
}

/// Sides from which a stub end can reach the ring, with the point where it
/// meets the ring and a penalty for not leaving along the port's own facing.
/// Escapes crossing the other node are dropped unless nothing else is left.
fn escape_candidates(
    ctx: &RouteContext<'_>,
    from: Point,
    facing: Orientation,
    other: Option<Rect>,
    ring: &Rect,
) -> Vec<(Orientation, Point, usize)> {
    let [first, second] = facing.perpendicular();
    let all = [(facing, 0), (first, 1), (second, 1)];
    let clear: Vec<_> = all
        .iter()
        .map(|&(side, penalty)| (side, ring_projection(ring, from, side), penalty))
        .filter(|&(_, point, _)| {
            other.is_none_or(|rect| {
                !segment_intersects_rect(from, point, &rect, ctx.tol.intersection_epsilon)
            })
        })
        .collect();
    if clear.is_empty() {
        trace!(?facing, "every escape crosses the other node");
        return vec![(facing, ring_projection(ring, from, facing), 0)];
    }
    clear
}

fn ring_projection(ring: &Rect, from: Point, side: Orientation) -> Point {
    if side.is_horizontal() {
        Point::new(ring.side(side), from.y)
    } else {
        Point::new(from.x, ring.side(side))
    }
}

/// Corner shared by two adjacent sides.
fn ring_corner(ring: &Rect, a: Orientation, b: Orientation) -> Point {
    let (vertical_side, horizontal_side) = if a.is_horizontal() { (a, b) } else { (b, a) };
    Point::new(ring.side(vertical_side), ring.side(horizontal_side))
}

/// Sides visited walking from `from` to `to` in one direction, if the walk
/// passes `via`. A walk that starts and ends on the same side goes all the
/// way round when `via` is elsewhere.
fn walk_sides(
    from: Orientation,
    to: Orientation,
    via: Orientation,
    clockwise: bool,
) -> Option<Vec<Orientation>> {
    let step = |side: Orientation| {
        if clockwise {
            side.clockwise()
        } else {
            side.counter_clockwise()
        }
    };
    let mut sides = vec![from];
    let mut current = from;
    if from == to && via != from {
        for _ in 0..4 {
            current = step(current);
            sides.push(current);
        }
    } else {
        while current != to {
            current = step(current);
            sides.push(current);
        }
    }
    sides.contains(&via).then_some(sides)
}

// ── Optimisation ────────────────────────────────────────────────────

/// Drop duplicate and collinear interior waypoints. The endpoints and the two
/// stub points are kept, as are direction reversals. Runs to a fixpoint.
pub fn optimize_waypoints(points: &[Point], tolerance: f32) -> Vec<Point> {
    let mut current = points.to_vec();
    loop {
        let next = optimize_pass(&current, tolerance);
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

fn same_point(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= SAME_POINT_EPSILON && (a.y - b.y).abs() <= SAME_POINT_EPSILON
}

fn optimize_pass(points: &[Point], tolerance: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let last_idx = points.len() - 1;
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    out.push(points[0]);
    for idx in 1..last_idx {
        let prev = out[out.len() - 1];
        let curr = points[idx];
        if same_point(prev, curr) {
            continue;
        }
        if idx == 1 || idx == last_idx - 1 {
            out.push(curr);
            continue;
        }
        let next = points[idx + 1];
        let reverses = (curr - prev).dot(next - curr) < 0.0;
        if collinear(prev, curr, next, tolerance) && !reverses {
            continue;
        }
        out.push(curr);
    }
    let last = points[last_idx];
    if out.len() > 1 && same_point(out[out.len() - 1], last) {
        let tail = out.len() - 1;
        out[tail] = last;
    } else {
        out.push(last);
    }
    out
}
