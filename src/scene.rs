use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, RoutingConfig};
use crate::routing::{
    self, ConnectionPath, ConnectionStyle, HitRect, Orientation, Point, Rect, RouteBranch,
    RouteParameters,
};

/// A batch of connections to route, as read from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub connections: Vec<SceneConnection>,
}

/// One connection in a scene. Styling fields left out fall back to the
/// routing config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConnection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub style: Option<ConnectionStyle>,
    pub start: Point,
    pub end: Point,
    pub source_orientation: Orientation,
    pub target_orientation: Orientation,
    #[serde(default)]
    pub curvature: Option<f32>,
    #[serde(default)]
    pub corner_radius: Option<f32>,
    #[serde(default)]
    pub offset: Option<f32>,
    #[serde(default)]
    pub back_edge_gap: Option<f32>,
    #[serde(default)]
    pub control_points: Option<Vec<Point>>,
    #[serde(default)]
    pub source_bounds: Option<Rect>,
    #[serde(default)]
    pub target_bounds: Option<Rect>,
    #[serde(default)]
    pub node_clearance: Option<f32>,
}

impl SceneConnection {
    pub fn parameters(&self, routing: &RoutingConfig) -> RouteParameters {
        RouteParameters {
            start: self.start,
            end: self.end,
            source_orientation: self.source_orientation,
            target_orientation: self.target_orientation,
            curvature: self.curvature.unwrap_or(routing.curvature),
            corner_radius: self.corner_radius.unwrap_or(routing.corner_radius),
            offset: self.offset.unwrap_or(routing.offset),
            back_edge_gap: self.back_edge_gap.unwrap_or(routing.back_edge_gap),
            control_points: self.control_points.clone(),
            source_bounds: self.source_bounds,
            target_bounds: self.target_bounds,
            node_clearance: self.node_clearance,
        }
    }
}

/// A connection after routing, with everything the renderers need.
#[derive(Debug, Clone)]
pub struct RoutedConnection {
    pub id: Option<String>,
    pub style: ConnectionStyle,
    pub params: RouteParameters,
    /// Set when the orthogonal router drew the path.
    pub branch: Option<RouteBranch>,
    pub waypoints: Vec<Point>,
    pub path: ConnectionPath,
    pub hit_rects: Vec<HitRect>,
}

impl RoutedConnection {
    /// Every point the drawing can reach: endpoints, segment controls and
    /// node bounds.
    pub fn extent(&self) -> Option<Rect> {
        let mut points = vec![self.path.start];
        for segment in &self.path.segments {
            match *segment {
                routing::PathSegment::Straight { end, .. } => points.push(end),
                routing::PathSegment::Quadratic { control, end, .. } => {
                    points.extend([control, end]);
                }
                routing::PathSegment::Cubic {
                    control1,
                    control2,
                    end,
                    ..
                } => points.extend([control1, control2, end]),
            }
        }
        for rect in self.params.source_bounds.iter().chain(&self.params.target_bounds) {
            points.extend(rect.corners());
        }
        Rect::bounding(&points)
    }
}

pub fn parse_scene(input: &str) -> anyhow::Result<Scene> {
    let scene: Scene = serde_json::from_str(input)?;
    Ok(scene)
}

/// Route every connection of `scene`. `style_override` wins over per-connection
/// styles.
pub fn route_scene(
    scene: &Scene,
    config: &Config,
    style_override: Option<ConnectionStyle>,
) -> routing::Result<Vec<RoutedConnection>> {
    routing::validate_tolerance(config.routing.hit_tolerance)?;
    let tol = &config.routing.tolerances;
    let mut routed = Vec::with_capacity(scene.connections.len());
    for connection in &scene.connections {
        let params = connection.parameters(&config.routing);
        routing::validate(&params)?;
        let style = style_override.or(connection.style).unwrap_or_default();
        let edited = params
            .control_points
            .as_ref()
            .is_some_and(|points| !points.is_empty());
        let (branch, waypoints) = if style == ConnectionStyle::Step && !edited {
            let (branch, waypoints) = routing::route_traced(&params, tol);
            (Some(branch), waypoints)
        } else {
            (None, Vec::new())
        };
        let path = routing::connection_path_with(style, &params, tol);
        let hit_rects =
            routing::hit_rects_with(path.start, &path.segments, config.routing.hit_tolerance, tol);
        debug!(
            id = connection.id.as_deref().unwrap_or("-"),
            style = style.as_str(),
            segments = path.segments.len(),
            hit_rects = hit_rects.len(),
            "connection ready"
        );
        routed.push(RoutedConnection {
            id: connection.id.clone(),
            style,
            params,
            branch,
            waypoints,
            path,
            hit_rects,
        });
    }
    Ok(routed)
}
