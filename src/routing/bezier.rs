use super::types::{Orientation, PathSegment, Point, Rect, RouteParameters};

/// A single cubic from `start` to `end`, pulled out along each port's facing.
pub fn bezier(params: &RouteParameters) -> PathSegment {
    let control1 = control_point(
        params.start,
        params.source_orientation,
        params.end,
        params.source_bounds.as_ref(),
        params,
    );
    let control2 = control_point(
        params.end,
        params.target_orientation,
        params.start,
        params.target_bounds.as_ref(),
        params,
    );
    PathSegment::cubic(control1, control2, params.end)
}

/// How far a control point sits from its anchor: the axis distance to the
/// other end scaled by curvature, never less than the port extension.
pub fn control_offset(
    anchor: Point,
    orientation: Orientation,
    other: Point,
    extension: f32,
    curvature: f32,
) -> f32 {
    extension.max(orientation.axis_distance(anchor, other).abs() * curvature)
}

fn control_point(
    anchor: Point,
    orientation: Orientation,
    other: Point,
    own_bounds: Option<&Rect>,
    params: &RouteParameters,
) -> Point {
    let offset = control_offset(anchor, orientation, other, params.offset, params.curvature);
    let control = anchor + orientation.unit() * offset;
    match own_bounds {
        Some(rect) => clear_node(control, orientation, rect, params.node_clearance()),
        None => control,
    }
}

/// Push a control point that has not cleared its node's facing edge out to
/// `edge + clearance`.
fn clear_node(control: Point, orientation: Orientation, rect: &Rect, clearance: f32) -> Point {
    let edge = rect.side(orientation);
    match orientation {
        Orientation::Right if control.x < edge + clearance => Point::new(edge + clearance, control.y),
        Orientation::Left if control.x > edge - clearance => Point::new(edge - clearance, control.y),
        Orientation::Bottom if control.y < edge + clearance => Point::new(control.x, edge + clearance),
        Orientation::Top if control.y > edge - clearance => Point::new(control.x, edge - clearance),
        _ => control,
    }
}
