use serde::{Deserialize, Serialize};

use crate::config::Tolerances;

use super::bezier::bezier;
use super::segments::to_segments_with;
use super::types::{ConnectionPath, PathSegment, RouteParameters};
use super::waypoints::route_with;

/// How a connection is drawn between its two ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStyle {
    Straight,
    #[default]
    Step,
    Bezier,
}

impl ConnectionStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStyle::Straight => "straight",
            ConnectionStyle::Step => "step",
            ConnectionStyle::Bezier => "bezier",
        }
    }
}

impl std::str::FromStr for ConnectionStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "straight" | "line" => Ok(ConnectionStyle::Straight),
            "step" | "orthogonal" => Ok(ConnectionStyle::Step),
            "bezier" | "curve" => Ok(ConnectionStyle::Bezier),
            other => Err(format!("unknown connection style: {other}")),
        }
    }
}

pub trait PathStrategy {
    fn produce_segments(&self, params: &RouteParameters, tol: &Tolerances) -> Vec<PathSegment>;
}

/// One segment straight from start to end.
pub struct StraightStrategy;

/// Orthogonal routing through the waypoint router.
pub struct StepStrategy;

pub struct BezierStrategy;

/// Follows the caller's control points, ignoring the style.
pub struct UserEditedStrategy;

impl PathStrategy for StraightStrategy {
    fn produce_segments(&self, params: &RouteParameters, _tol: &Tolerances) -> Vec<PathSegment> {
        vec![PathSegment::straight(params.end)]
    }
}

impl PathStrategy for StepStrategy {
    fn produce_segments(&self, params: &RouteParameters, tol: &Tolerances) -> Vec<PathSegment> {
        let waypoints = route_with(params, tol);
        to_segments_with(&waypoints, params.corner_radius, tol)
    }
}

impl PathStrategy for BezierStrategy {
    fn produce_segments(&self, params: &RouteParameters, _tol: &Tolerances) -> Vec<PathSegment> {
        vec![bezier(params)]
    }
}

impl PathStrategy for UserEditedStrategy {
    fn produce_segments(&self, params: &RouteParameters, tol: &Tolerances) -> Vec<PathSegment> {
        let control_points = params.control_points.as_deref().unwrap_or_default();
        let mut points = Vec::with_capacity(control_points.len() + 2);
        points.push(params.start);
        points.extend_from_slice(control_points);
        points.push(params.end);
        to_segments_with(&points, params.corner_radius, tol)
    }
}

/// The strategy that draws `params` in `style`.
pub fn strategy_for(style: ConnectionStyle, params: &RouteParameters) -> &'static dyn PathStrategy {
    if params.control_points.as_ref().is_some_and(|points| !points.is_empty()) {
        return &UserEditedStrategy;
    }
    match style {
        ConnectionStyle::Straight => &StraightStrategy,
        ConnectionStyle::Step => &StepStrategy,
        ConnectionStyle::Bezier => &BezierStrategy,
    }
}

pub fn produce_segments(style: ConnectionStyle, params: &RouteParameters) -> Vec<PathSegment> {
    produce_segments_with(style, params, &Tolerances::default())
}

pub fn produce_segments_with(
    style: ConnectionStyle,
    params: &RouteParameters,
    tol: &Tolerances,
) -> Vec<PathSegment> {
    strategy_for(style, params).produce_segments(params, tol)
}

pub fn connection_path(style: ConnectionStyle, params: &RouteParameters) -> ConnectionPath {
    connection_path_with(style, params, &Tolerances::default())
}

pub fn connection_path_with(
    style: ConnectionStyle,
    params: &RouteParameters,
    tol: &Tolerances,
) -> ConnectionPath {
    ConnectionPath {
        start: params.start,
        segments: produce_segments_with(style, params, tol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::types::{Orientation, Point};

    fn params() -> RouteParameters {
        RouteParameters::new(
            Point::new(0.0, 0.0),
            Orientation::Right,
            Point::new(100.0, 50.0),
            Orientation::Left,
        )
    }

    #[test]
    fn straight_is_one_segment() {
        assert_eq!(
            produce_segments(ConnectionStyle::Straight, &params()),
            vec![PathSegment::straight(Point::new(100.0, 50.0))]
        );
    }

    #[test]
    fn step_goes_through_router() {
        let segments = produce_segments(ConnectionStyle::Step, &params());
        assert_eq!(segments.len(), 5);
        assert!(segments.iter().all(|seg| matches!(seg, PathSegment::Straight { .. })));
    }

    #[test]
    fn step_rounds_corners_with_radius() {
        let segments = produce_segments(ConnectionStyle::Step, &params().with_corner_radius(6.0));
        assert!(segments.iter().any(|seg| matches!(seg, PathSegment::Quadratic { .. })));
    }

    #[test]
    fn bezier_is_one_cubic() {
        let segments = produce_segments(ConnectionStyle::Bezier, &params());
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], PathSegment::Cubic { .. }));
    }

    #[test]
    fn control_points_override_style() {
        let edited = params().with_control_points(vec![Point::new(40.0, 0.0), Point::new(40.0, 50.0)]);
        for style in [ConnectionStyle::Straight, ConnectionStyle::Step, ConnectionStyle::Bezier] {
            let path = connection_path(style, &edited);
            let ends: Vec<Point> = path.segments.iter().map(PathSegment::end).collect();
            assert_eq!(
                ends,
                vec![Point::new(40.0, 0.0), Point::new(40.0, 50.0), Point::new(100.0, 50.0)]
            );
        }
    }

    #[test]
    fn empty_control_points_fall_back_to_style() {
        let edited = params().with_control_points(Vec::new());
        assert_eq!(produce_segments(ConnectionStyle::Straight, &edited).len(), 1);
    }

    #[test]
    fn every_style_ends_at_end() {
        for style in [ConnectionStyle::Straight, ConnectionStyle::Step, ConnectionStyle::Bezier] {
            let path = connection_path(style, &params());
            assert_eq!(path.start, Point::new(0.0, 0.0));
            assert_eq!(path.end(), Point::new(100.0, 50.0));
        }
    }

    #[test]
    fn style_parses_aliases() {
        assert_eq!("Curve".parse::<ConnectionStyle>(), Ok(ConnectionStyle::Bezier));
        assert_eq!("step".parse::<ConnectionStyle>(), Ok(ConnectionStyle::Step));
        assert!("zigzag".parse::<ConnectionStyle>().is_err());
        assert_eq!(ConnectionStyle::default(), ConnectionStyle::Step);
    }
}
